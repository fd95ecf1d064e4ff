use thiserror::Error;

#[derive(Debug, Error)]
pub enum EfClawError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Perception error: {0}")]
    Perception(String),

    #[error("Executor error: {0}")]
    Executor(String),

    #[error("Unsupported capture aspect ratio {width}x{height}")]
    CalibrationUnsupported { width: u32, height: u32 },

    #[error("Failed to center '{target}' within {iterations} iterations")]
    AlignmentFailed { target: String, iterations: u32 },

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Budget exhausted: {0}")]
    BudgetExhausted(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

pub type EfClawResult<T> = Result<T, EfClawError>;
