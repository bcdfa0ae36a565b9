use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::llm_client::GenerationParams;
use crate::scoring::hybrid::ScoringWeights;

/// Application configuration loaded from environment variables.
/// Fails at startup if a value is present but malformed, or if the scoring
/// weights do not sum to 1.0.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Optional: without a key the service still ingests and serves storage,
    /// but ranking requests are rejected.
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub llm_timeout_secs: u64,
    pub llm_max_tokens: u32,
    pub llm_temperature: f32,
    pub use_llm_parsing: bool,
    pub weights: ScoringWeights,
    pub storage_path: PathBuf,
    pub cache_path: PathBuf,
    pub output_dir: PathBuf,
    pub resumes_raw_dir: PathBuf,
    pub jd_raw_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            port: parse_env("PORT", 8000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            anthropic_model: std::env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| crate::llm_client::DEFAULT_MODEL.to_string()),
            llm_timeout_secs: parse_env("LLM_TIMEOUT", 60)?,
            llm_max_tokens: parse_env("LLM_MAX_TOKENS", crate::llm_client::DEFAULT_MAX_TOKENS)?,
            llm_temperature: parse_env("LLM_TEMPERATURE", 0.0)?,
            use_llm_parsing: parse_env("USE_LLM_PARSING", false)?,
            weights: ScoringWeights {
                similarity: parse_env("SIMILARITY_WEIGHT", 0.6)?,
                must_have: parse_env("MUST_HAVE_BOOST_WEIGHT", 0.3)?,
                recency: parse_env("RECENCY_BOOST_WEIGHT", 0.1)?,
            },
            storage_path: path_env("STORAGE_PATH", "./data/storage"),
            cache_path: path_env("CACHE_PATH", "./data/cache"),
            output_dir: path_env("OUTPUT_DIR", "./data/output"),
            resumes_raw_dir: path_env("RESUMES_RAW_DIR", "./data/resumes/raw"),
            jd_raw_dir: path_env("JD_RAW_DIR", "./data/job_descriptions/raw"),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        if !(0.0..=1.0).contains(&self.llm_temperature) {
            bail!("LLM_TEMPERATURE must be in [0.0, 1.0], got {}", self.llm_temperature);
        }
        if self.llm_max_tokens == 0 {
            bail!("LLM_MAX_TOKENS must be positive");
        }
        if self.use_llm_parsing && self.anthropic_api_key.is_none() {
            bail!("USE_LLM_PARSING=true requires ANTHROPIC_API_KEY to be set");
        }
        Ok(())
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_tokens: self.llm_max_tokens,
            temperature: self.llm_temperature,
        }
    }

    /// Location of the processed-files ledger.
    pub fn ledger_path(&self) -> PathBuf {
        self.cache_path.join("processed_files.json")
    }

    /// Creates every directory the service reads from or writes to.
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [
            &self.storage_path,
            &self.cache_path,
            &self.output_dir,
            &self.resumes_raw_dir,
            &self.jd_raw_dir,
        ] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
        Ok(())
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => Ok(default),
    }
}

fn path_env(key: &str, default: &str) -> PathBuf {
    PathBuf::from(std::env::var(key).unwrap_or_else(|_| default.to_string()))
}

#[cfg(test)]
pub(crate) fn test_config(root: &std::path::Path) -> Config {
    Config {
        port: 0,
        rust_log: "debug".to_string(),
        anthropic_api_key: None,
        anthropic_model: crate::llm_client::DEFAULT_MODEL.to_string(),
        llm_timeout_secs: 5,
        llm_max_tokens: crate::llm_client::DEFAULT_MAX_TOKENS,
        llm_temperature: 0.0,
        use_llm_parsing: false,
        weights: ScoringWeights::default(),
        storage_path: root.join("storage"),
        cache_path: root.join("cache"),
        output_dir: root.join("output"),
        resumes_raw_dir: root.join("resumes/raw"),
        jd_raw_dir: root.join("job_descriptions/raw"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_validate() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(test_config(dir.path()).validate().is_ok());
    }

    #[test]
    fn test_weights_not_summing_to_one_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = test_config(dir.path());
        config.weights.recency = 0.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sum to 1.0"), "{err}");
    }

    #[test]
    fn test_llm_parsing_requires_api_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = test_config(dir.path());
        config.use_llm_parsing = true;
        assert!(config.validate().is_err());
        config.anthropic_api_key = Some("sk-test".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generation_settings_validated() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = test_config(dir.path());
        config.llm_temperature = 1.5;
        assert!(config.validate().is_err());
        config.llm_temperature = 0.7;
        config.llm_max_tokens = 0;
        assert!(config.validate().is_err());
        config.llm_max_tokens = 1024;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ensure_directories_creates_tree() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = test_config(dir.path());
        config.ensure_directories().unwrap();
        assert!(config.resumes_raw_dir.is_dir());
        assert!(config.jd_raw_dir.is_dir());
        assert!(config.output_dir.is_dir());
        assert_eq!(
            config.ledger_path(),
            dir.path().join("cache/processed_files.json")
        );
    }

    #[test]
    fn test_parse_env_falls_back_to_default() {
        let port: u16 = parse_env("TALENT_API_TEST_UNSET_PORT", 8123).unwrap();
        assert_eq!(port, 8123);
    }
}
