pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod state;
pub mod views;

pub use router::router;
pub use state::AppState;
