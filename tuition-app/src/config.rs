//! Configuration loading from environment.

use std::env;
use std::path::PathBuf;

use tuition_types::billing::DEFAULT_ADMISSION_FEE;

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Root of uploaded files, served under `/uploads`
    pub upload_dir: PathBuf,
    pub cors_origin: String,
    /// Charged when a branch has no admission fee of its own
    pub default_admission_fee: i64,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = var("PORT")
            .unwrap_or_else(|| "5000".to_string())
            .parse()?;

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let upload_dir = var("UPLOAD_DIR")
            .unwrap_or_else(|| "Uploads".to_string())
            .into();

        let cors_origin =
            var("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        let default_admission_fee = match var("DEFAULT_ADMISSION_FEE") {
            Some(raw) => raw.parse()?,
            None => DEFAULT_ADMISSION_FEE,
        };
        if default_admission_fee < 0 {
            anyhow::bail!("DEFAULT_ADMISSION_FEE cannot be negative");
        }

        Ok(Self {
            port,
            database_url,
            upload_dir,
            cors_origin,
            default_admission_fee,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("DATABASE_URL", "sqlite::memory:")]).unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.upload_dir, PathBuf::from("Uploads"));
        assert_eq!(config.cors_origin, "http://localhost:3000");
        assert_eq!(config.default_admission_fee, DEFAULT_ADMISSION_FEE);
    }

    #[test]
    fn database_url_is_required() {
        assert!(load(&[("PORT", "8080")]).is_err());
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(load(&[("DATABASE_URL", "x"), ("PORT", "http")]).is_err());
        assert!(load(&[("DATABASE_URL", "x"), ("DEFAULT_ADMISSION_FEE", "-1")]).is_err());
    }
}
