use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    /// Baseline every score replay starts from.
    pub base_score: i64,
    /// Payout percentage applied to wins with no recorded roll.
    pub default_payout_pct: i32,
    /// Seconds between expiry sweeps; 0 disables the sweeper.
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let base_score = env_map
            .get("BASE_SCORE")
            .map(|s| s.as_str())
            .unwrap_or("10000")
            .parse::<i64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "BASE_SCORE".to_string(),
                    "must be a valid i64".to_string(),
                )
            })?;

        let default_payout_pct = env_map
            .get("DEFAULT_PAYOUT_PCT")
            .map(|s| s.as_str())
            .unwrap_or("20")
            .parse::<i32>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "DEFAULT_PAYOUT_PCT".to_string(),
                    "must be a valid i32".to_string(),
                )
            })?;
        if !(0..=100).contains(&default_payout_pct) {
            return Err(ConfigError::InvalidValue(
                "DEFAULT_PAYOUT_PCT".to_string(),
                "must be between 0 and 100".to_string(),
            ));
        }

        let sweep_interval_secs = env_map
            .get("SWEEP_INTERVAL_SECS")
            .map(|s| s.as_str())
            .unwrap_or("60")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "SWEEP_INTERVAL_SECS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        Ok(Config {
            port,
            database_path,
            base_score,
            default_payout_pct,
            sweep_interval_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("DATABASE_PATH".to_string(), "/tmp/test.db".to_string());
        map
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.base_score, 10_000);
        assert_eq!(config.default_payout_pct, 20);
        assert_eq!(config.sweep_interval_secs, 60);
    }

    #[test]
    fn test_missing_database_path() {
        let mut env_map = setup_required_env();
        env_map.remove("DATABASE_PATH");
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "DATABASE_PATH"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = setup_required_env();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_base_score() {
        let mut env_map = setup_required_env();
        env_map.insert("BASE_SCORE".to_string(), "plenty".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "BASE_SCORE"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_default_payout_pct_out_of_range() {
        let mut env_map = setup_required_env();
        env_map.insert("DEFAULT_PAYOUT_PCT".to_string(), "150".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "DEFAULT_PAYOUT_PCT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }
}
