pub mod error;
pub mod progress;
pub mod server;
pub mod types;

pub use server::ScrivenerServer;
pub use types::*;
