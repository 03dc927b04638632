pub mod ai;
pub mod generate;
pub mod health;
pub mod session;
pub mod upload;
