pub mod artifact;
pub mod assets;
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod generator;
pub mod llm;
pub mod server;
pub mod service;
pub mod storage;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use generator::context::GeneratorContext;
pub use server::{build_router, serve};
