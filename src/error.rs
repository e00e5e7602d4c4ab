//! Failure taxonomy for a sampling cycle.
//!
//! Every variant maps to a short tag the widget shows in place of a rate.
//! State-file problems are deliberately absent: they never fail a cycle.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Problems reading the settings file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Missing [{0}] section in config")]
    MissingSection(String),

    #[error("Config read error: {0}")]
    Read(#[from] io::Error),

    #[error("Config read error: invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },

    #[error("Config read error: could not determine config directory")]
    NoConfigDir,
}

/// Failure reported by a counter source while reading counters
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SourceError(pub String);

impl SourceError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Fatal failure of one sampling cycle
#[derive(Debug, Error)]
pub enum SampleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("API call failed: {0}")]
    Api(#[from] SourceError),
}

impl SampleError {
    /// Tag placed in the `upload`/`download` fields of the failure record
    pub fn tag(&self) -> &'static str {
        match self {
            SampleError::Config(ConfigError::NotFound(_)) => "NoCfg",
            SampleError::Config(ConfigError::MissingSection(_)) => "CfgKeyErr",
            SampleError::Config(_) => "CfgReadErr",
            SampleError::Connection(_) => "ConErr",
            SampleError::Api(_) => "APIErr",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_per_phase() {
        let cases: Vec<(SampleError, &str)> = vec![
            (ConfigError::NotFound(PathBuf::from("/x.ini")).into(), "NoCfg"),
            (ConfigError::MissingSection("credentials".into()).into(), "CfgKeyErr"),
            (
                ConfigError::Read(io::Error::new(io::ErrorKind::PermissionDenied, "denied")).into(),
                "CfgReadErr",
            ),
            (SampleError::Connection("refused".into()), "ConErr"),
            (SourceError::new("bad response").into(), "APIErr"),
        ];
        for (err, tag) in cases {
            assert_eq!(err.tag(), tag, "{err}");
        }
    }

    #[test]
    fn messages_name_the_phase() {
        let err: SampleError = SourceError::new("timeout").into();
        assert_eq!(err.to_string(), "API call failed: timeout");
        let err = SampleError::Connection("no route".into());
        assert_eq!(err.to_string(), "Connection failed: no route");
        let err: SampleError = ConfigError::NotFound(PathBuf::from("/etc/a.ini")).into();
        assert_eq!(err.to_string(), "Config file not found: /etc/a.ini");
    }
}
