use std::sync::Arc;

use crate::{
    catalog::Catalog,
    error::AppResult,
    services::{recommendations::RecommendationService, transcript::TranscriptScraper},
};

/// Shared application state
///
/// Everything here is built before the server starts and never written
/// afterwards, so handlers share it without locking.
#[derive(Clone)]
pub struct AppState {
    pub recommender: RecommendationService,
    pub scraper: Arc<TranscriptScraper>,
}

impl AppState {
    /// Creates application state around a fully loaded catalog
    pub fn new(catalog: Arc<Catalog>) -> AppResult<Self> {
        Ok(Self {
            recommender: RecommendationService::new(catalog),
            scraper: Arc::new(TranscriptScraper::new()?),
        })
    }
}
