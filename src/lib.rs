pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod init;
pub mod llm;
pub mod mcp;
pub mod models;
pub mod services;
pub mod session;
pub mod utils;

pub use error::ScrivenerError;
