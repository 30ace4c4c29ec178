use thiserror::Error;

/// Failures of the accounts file and the other JSON files this tool owns.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed data in {path}: {source}")]
    Serialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("account already exists: {0}")]
    Duplicate(String),

    #[error("account not found: {0}")]
    NotFound(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidOverride { key: String, value: String },

    #[error("missing required setting: {key}")]
    Missing { key: String },
}
