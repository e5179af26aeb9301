pub mod embedding;
pub mod pdf;
pub mod profile;
pub mod ranker;
pub mod recommendations;
pub mod review_aggregator;
pub mod transcript;
pub mod vector;

pub use recommendations::RecommendationService;
