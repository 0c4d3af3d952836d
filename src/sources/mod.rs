//! Hostname sources. Every external collaborator (enumeration tools, crt.sh,
//! saved files, stdin) is reached only through [`Source::produce`].

pub mod crtsh;
pub mod file;
pub mod tool;

use crate::errors::SourceError;
use async_trait::async_trait;

pub use crtsh::{CrtShFileSource, CrtShSource};
pub use file::FileSource;
pub use tool::{ToolKind, ToolSource};

#[async_trait]
pub trait Source: Send + Sync {
    fn name(&self) -> &str;
    /// Raw candidate lines, unvalidated.
    async fn produce(&self) -> Result<Vec<String>, SourceError>;
}

/// In-memory collection (stdin, fixtures).
pub struct StaticSource {
    name: String,
    lines: Vec<String>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, lines: Vec<String>) -> Self {
        Self { name: name.into(), lines }
    }
}

#[async_trait]
impl Source for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn produce(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.lines.clone())
    }
}

/// Reduce `https://api.example.com:8443/x?y` to `api.example.com`; non-URL lines pass through.
pub fn host_from_line(line: &str) -> String {
    let t = line.trim();
    if t.contains("://") {
        if let Ok(u) = url::Url::parse(t) {
            if let Some(h) = u.host_str() {
                return h.to_string();
            }
        }
    }
    t.to_string()
}
