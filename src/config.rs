use crate::polling::DEFAULT_POLL_INTERVAL;
use std::{path::PathBuf, time::Duration};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_DATA_PATH: &str = "data/session.json";

/// Client settings. The binary fills these from flags or `HARD75_*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub data_path: PathBuf,
    pub poll_interval: Duration,
}

impl Config {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_poll_every_thirty_seconds() {
        let config = Config::new("http://127.0.0.1:9/api");
        assert_eq!(config.api_url, "http://127.0.0.1:9/api");
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.data_path, PathBuf::from("data/session.json"));
    }
}
