#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a non-negative integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key} must be a boolean (1/0, true/false, yes/no, on/off), got '{value}'")]
    InvalidBool { key: &'static str, value: String },

    #[error("OUTPUT_FORMAT must be 'text' or 'json', got '{0}'")]
    InvalidOutputFormat(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LimiterError {
    #[error("Concurrency for limiter '{label}' must be at least 1")]
    ZeroConcurrency { label: String },

    #[error("Limiter '{label}' is closed")]
    Closed { label: String },
}
