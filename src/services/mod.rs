pub mod catalog;
pub mod fallback;
pub mod generation;
pub mod http_client;
pub mod parser;
pub mod prompt;
pub mod recommendations;
pub mod title_search;

pub use recommendations::Recommender;
