use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{Credential, PreferenceSet, Recommendations, SeedSelection},
    services::{
        catalog::CatalogProvider,
        fallback::FallbackRecommender,
        generation::TextGenerator,
        parser::{numbering_is_complete, parse_reply},
        prompt::build_prompt,
    },
};

/// Stages of one recommendation run
///
/// Each stage owns exactly the data the next transition needs. `Done` carries
/// the final result; every other stage has a single outgoing step in
/// [`Recommender::advance`].
#[derive(Debug)]
enum Stage {
    Idle,
    Prompting,
    Generating { prompt: String },
    Validating { raw: String },
    FallingBack { reason: AppError },
    Success(Recommendations),
    Done(AppResult<Recommendations>),
}

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Prompting => "prompting",
            Stage::Generating { .. } => "generating",
            Stage::Validating { .. } => "validating",
            Stage::FallingBack { .. } => "falling_back",
            Stage::Success(_) => "success",
            Stage::Done(_) => "done",
        }
    }
}

/// Inputs of a single run, borrowed for its duration
struct Request<'a> {
    seeds: &'a SeedSelection,
    genre: &'a str,
    preferences: &'a PreferenceSet,
    credential: Option<&'a Credential>,
}

/// Generates 15 movie recommendations for a seed selection
///
/// One generation attempt per request. A failed call or an untrustworthy
/// reply switches to the catalog fallback; only a fallback failure reaches
/// the caller.
#[derive(Clone)]
pub struct Recommender {
    generator: Arc<dyn TextGenerator>,
    fallback: Arc<FallbackRecommender>,
}

impl Recommender {
    pub fn new(generator: Arc<dyn TextGenerator>, catalog: Arc<dyn CatalogProvider>) -> Self {
        Self {
            generator,
            fallback: Arc::new(FallbackRecommender::new(catalog)),
        }
    }

    pub async fn get_recommendations(
        &self,
        seeds: &SeedSelection,
        genre: &str,
        preferences: &PreferenceSet,
        credential: Option<&Credential>,
    ) -> AppResult<Recommendations> {
        let request = Request {
            seeds,
            genre,
            preferences,
            credential,
        };

        let mut stage = Stage::Idle;
        loop {
            stage = self.advance(stage, &request).await;
            tracing::debug!(stage = stage.name(), "Recommendation stage");

            if let Stage::Done(result) = stage {
                return result;
            }
        }
    }

    async fn advance(&self, stage: Stage, request: &Request<'_>) -> Stage {
        match stage {
            Stage::Idle => Stage::Prompting,

            Stage::Prompting => Stage::Generating {
                prompt: build_prompt(request.seeds, request.genre, request.preferences),
            },

            Stage::Generating { prompt } => {
                let Some(credential) = request.credential else {
                    return Stage::FallingBack {
                        reason: AppError::MissingCredential,
                    };
                };

                match self.generator.generate(&prompt, credential).await {
                    Ok(raw) => Stage::Validating { raw },
                    Err(reason) => Stage::FallingBack { reason },
                }
            }

            Stage::Validating { raw } => match parse_reply(&raw, request.seeds) {
                Ok(recommendations) if numbering_is_complete(&raw) => {
                    Stage::Success(recommendations)
                }
                Ok(_) => Stage::FallingBack {
                    reason: AppError::StructuralValidation(
                        "reply numbering does not cover 1 through 15".to_string(),
                    ),
                },
                Err(reason) => Stage::FallingBack { reason },
            },

            Stage::FallingBack { reason } => {
                tracing::warn!(
                    error = %reason,
                    generator = self.generator.name(),
                    "Generated recommendations unusable, using catalog fallback"
                );

                match self.fallback.recommend(request.seeds).await {
                    Ok(recommendations) => Stage::Success(recommendations),
                    Err(e) => {
                        tracing::error!(error = %e, "Fallback recommendations failed");
                        Stage::Done(Err(e))
                    }
                }
            }

            Stage::Success(recommendations) => {
                tracing::info!(
                    source = ?recommendations.source,
                    count = recommendations.items.len(),
                    "Recommendations ready"
                );
                Stage::Done(Ok(recommendations))
            }

            done @ Stage::Done(_) => done,
        }
    }
}
