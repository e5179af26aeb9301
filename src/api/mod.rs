mod handlers;
mod routes;
mod state;

pub use routes::{cors_layer, create_router};
pub use state::AppState;
