pub mod bootstrap;
pub mod state;

pub use bootstrap::build_state;
pub use state::AppState;
