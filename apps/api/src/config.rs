use anyhow::{Context, Result};
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
/// Every field has a local-development default, so a bare `cargo run`
/// talks to an Ollama instance on the same machine.
#[derive(Debug, Clone)]
pub struct Config {
    /// Chat endpoint of the local inference service.
    pub ollama_url: String,
    /// Model identifier passed on every chat request.
    pub model_name: String,
    /// Directory uploads are spooled to between save and extraction.
    pub upload_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            ollama_url: env_or("OLLAMA_API_URL", "http://localhost:11434/api/chat"),
            model_name: env_or("MODEL_NAME", "llama3.1:8b"),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
