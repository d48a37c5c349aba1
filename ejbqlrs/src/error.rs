use thiserror::Error;

pub type Result<T> = std::result::Result<T, TranslationError>;

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("catalog error: {0}")]
    Catalog(String),
    #[error("unmapped reference: {0}")]
    UnmappedReference(String),
    #[error("unsupported construct: {0}")]
    Unsupported(String),
    #[error("malformed literal: {0}")]
    MalformedLiteral(String),
    #[error("invalid expression: {0}")]
    InvalidAst(String),
    #[error("internal translator error: {0}")]
    Internal(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
