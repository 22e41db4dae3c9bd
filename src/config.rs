use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the JSON test blueprint the player loads.
    pub test_file: String,
    /// Fixed student identity; a fresh one is generated when unset.
    pub student_id: Option<Uuid>,
    /// Clock period in milliseconds. 1000 is real time; smaller values play
    /// an attempt back accelerated.
    pub tick_ms: u64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            test_file: get_env("EXAM_TEST_FILE")?,
            student_id: match env::var("EXAM_STUDENT_ID") {
                Ok(raw) => Some(raw.parse().map_err(|e| {
                    Error::Config(format!("Invalid value for EXAM_STUDENT_ID: {}", e))
                })?),
                Err(_) => None,
            },
            tick_ms: match env::var("EXAM_TICK_MS") {
                Ok(raw) => raw
                    .parse()
                    .map_err(|e| Error::Config(format!("Invalid value for EXAM_TICK_MS: {}", e)))?,
                Err(_) => 1000,
            },
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
