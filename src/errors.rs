use std::time::Duration;
use thiserror::Error;

/// Why a source contributed nothing. Never fatal for a run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{source_name} unavailable: {reason}")]
    Unavailable { source_name: String, reason: String },

    #[error("{source_name} timed out after {}s", .after.as_secs())]
    Timeout { source_name: String, after: Duration },

    #[error("{source_name} http error: {reason}")]
    Http { source_name: String, reason: String },

    #[error("{source_name} io error: {err}")]
    Io { source_name: String, #[source] err: std::io::Error },

    #[error("{source_name} parse error: {reason}")]
    Parse { source_name: String, reason: String },
}

impl SourceError {
    pub fn unavailable(source_name: &str, reason: impl ToString) -> Self {
        SourceError::Unavailable { source_name: source_name.to_string(), reason: reason.to_string() }
    }

    pub fn io(source_name: &str, err: std::io::Error) -> Self {
        SourceError::Io { source_name: source_name.to_string(), err }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid target domain: {0:?}")]
    InvalidTarget(String),

    #[error("unknown tool: {0} (expected one of amass, subfinder, waymore, gau)")]
    UnknownTool(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("no source enabled: pass --input/--crtsh-json/--stdin or enable a tool")]
    NoSources,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = SourceError::Timeout { source_name: "amass".into(), after: Duration::from_secs(30) };
        assert_eq!(e.to_string(), "amass timed out after 30s");
        let e = SourceError::unavailable("gau", "not found");
        assert_eq!(e.to_string(), "gau unavailable: not found");
        assert_eq!(ConfigError::InvalidTarget("a b".into()).to_string(), "invalid target domain: \"a b\"");
    }
}
