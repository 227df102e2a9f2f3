pub mod handlers;
pub mod router;
pub mod state;

pub use router::{create_router, start_server};
pub use state::AppState;
