use std::sync::Arc;

use crate::{
    models::Credential,
    services::{catalog::CatalogProvider, generation::TextGenerator, Recommender},
};

/// Shared application state
///
/// Everything inside is read-only after startup; recommendation runs share no
/// mutable state.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Recommender,
    pub catalog: Arc<dyn CatalogProvider>,
    /// Generation credential from configuration
    pub credential: Option<Credential>,
}

impl AppState {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        catalog: Arc<dyn CatalogProvider>,
        credential: Option<Credential>,
    ) -> Self {
        Self {
            recommender: Recommender::new(generator, catalog.clone()),
            catalog,
            credential,
        }
    }
}
