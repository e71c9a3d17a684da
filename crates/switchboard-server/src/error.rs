use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Invalid tool endpoint URL for service `{name}`: {source}")]
    InvalidToolUrl {
        name: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

/// Map a dotted settings field like `upstream.api_key` to the
/// environment variable a user has to set.
pub fn to_env_var(field: &str) -> String {
    format!("SWITCHBOARD_{}", field.replace('.', "__").to_uppercase())
}
