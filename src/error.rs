use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScoutError>;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Retrieval error{}: {message}", class_suffix(.class))]
    Retrieval {
        class: Option<String>,
        message: String,
    },

    #[error("No class selector given: pass a class name or request all classes")]
    NoSelector,

    #[error("A class name and the all-classes flag are mutually exclusive")]
    ConflictingSelector,

    #[error("Unknown data type '{0}' (run `wmiscout types` for the supported list)")]
    InvalidDataType(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScoutError {
    pub fn exit_code(&self) -> i32 {
        2
    }

    /// Wrap a provider failure, keeping its original message.
    pub fn retrieval(class: Option<&str>, err: ProviderError) -> Self {
        Self::Retrieval {
            class: class.map(str::to_owned),
            message: err.message,
        }
    }
}

fn class_suffix(class: &Option<String>) -> String {
    class.as_ref().map(|c| format!(" ({c})")).unwrap_or_default()
}

/// Failure reported by a management-instrumentation provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
