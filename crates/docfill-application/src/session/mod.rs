//! Session application services.

mod store;

pub use store::SessionStore;
