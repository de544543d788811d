use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeneratorError>;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Unknown type index: {0}")]
    UnknownType(u32),

    #[error("Unknown method index: {0}")]
    UnknownMethod(u32),

    #[error("Invalid program model: {0}")]
    Model(#[from] serde_json::Error),

    #[error("Cannot render '{text}' as Rust tokens: {source}")]
    Tokens {
        text: String,
        #[source]
        source: syn::Error,
    },

    #[error("Invalid configuration value for {key}: {value}")]
    Config { key: String, value: String },

    #[error("Failed to build analysis pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
