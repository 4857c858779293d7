use std::time::Duration;

/// Default seconds between scheduled-close sweeps.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SWEEP_INTERVAL_SECS must be a positive integer, got '{0}'")]
    InvalidInterval(String),

    #[error("LOG_FORMAT must be 'pretty' or 'json', got '{0}'")]
    InvalidLogFormat(String),
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Time between sweeps (default: 60 seconds).
    pub sweep_interval: Duration,
    /// Log output format (default: pretty).
    pub log_format: LogFormat,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default  |
    /// |-----------------------|----------|
    /// | `SWEEP_INTERVAL_SECS` | `60`     |
    /// | `LOG_FORMAT`          | `pretty` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sweep_interval_secs = match lookup("SWEEP_INTERVAL_SECS") {
            None => DEFAULT_SWEEP_INTERVAL_SECS,
            Some(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidInterval(value))?,
        };

        let log_format = match lookup("LOG_FORMAT") {
            None => LogFormat::default(),
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "pretty" | "" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => return Err(ConfigError::InvalidLogFormat(value)),
            },
        };

        Ok(Self {
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            log_format,
        })
    }
}
