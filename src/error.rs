//! Error types shared by every stage of an export.
//!
//! Nothing in the exporter retries: each variant is surfaced to the caller,
//! and the binary aborts the run with the message.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed configuration, e.g. an invalid glob in a page rule.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A document path matched none of the configured page rules.
    #[error("No page config matches '{0}'; add a rule (e.g. name: '*') covering it")]
    NoPageConfig(String),

    /// A child id (or root id) is absent from its node index.
    #[error("Node '{0}' is referenced but missing from the index")]
    MissingNode(String),

    /// The API answered with a non-success HTTP status.
    #[error("Dynalist API error: {status}")]
    Api { status: u16 },

    /// The API answered 200 but reported a failure code in the body.
    #[error("Dynalist API error {code}: {message}")]
    ApiCode { code: String, message: String },

    #[error("Invalid API key: see https://dynalist.io/developer")]
    InvalidToken,

    /// The output directory is already populated and overwrite was not requested.
    #[error("Directory exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Transport and credential failures abort the whole export.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Api { .. } | Self::ApiCode { .. } | Self::InvalidToken | Self::Network(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_distinguishable() {
        assert!(Error::Api { status: 500 }.is_transport());
        assert!(Error::InvalidToken.is_transport());
        assert!(!Error::MissingNode("x".into()).is_transport());
        assert!(!Error::NoPageConfig("a/b".into()).is_transport());
    }

    #[test]
    fn messages_name_the_offender() {
        let err = Error::OutputExists(PathBuf::from("dynalist"));
        assert_eq!(err.to_string(), "Directory exists: dynalist");
        let err = Error::Api { status: 403 };
        assert_eq!(err.to_string(), "Dynalist API error: 403");
    }
}
