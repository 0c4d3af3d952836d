use super::Source;
use crate::errors::SourceError;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

/// One candidate per line of a previously written tool artifact.
pub struct FileSource {
    name: String,
    path: PathBuf,
    url_lines: bool,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        let name = path.display().to_string();
        Self { name, path, url_lines: false }
    }

    pub fn named(name: impl Into<String>, path: PathBuf) -> Self {
        Self { name: name.into(), path, url_lines: false }
    }

    /// Treat each line as a URL and keep only its host (waymore/gau output).
    pub fn url_lines(mut self, yes: bool) -> Self {
        self.url_lines = yes;
        self
    }
}

pub(crate) async fn read_lines(name: &str, path: &std::path::Path, url_lines: bool) -> Result<Vec<String>, SourceError> {
    // 缺失的产物视为零贡献
    if !path.exists() {
        log::debug!("[{}] no artifact at {}", name, path.display());
        return Ok(Vec::new());
    }
    let data = fs::read(path).await.map_err(|e| SourceError::io(name, e))?;
    let text = String::from_utf8_lossy(&data);
    Ok(text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| if url_lines { super::host_from_line(l) } else { l.trim().to_string() })
        .collect())
}

#[async_trait]
impl Source for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn produce(&self) -> Result<Vec<String>, SourceError> {
        read_lines(&self.name, &self.path, self.url_lines).await
    }
}
