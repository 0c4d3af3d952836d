use super::Source;
use crate::errors::SourceError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const CRTSH_ENDPOINT: &str = "https://crt.sh/";

#[derive(Deserialize, Debug)]
struct CrtEntry {
    #[serde(default)]
    name_value: Option<String>,
}

/// Extract candidate names from a crt.sh JSON response.
/// `name_value` may pack several SANs separated by newlines.
pub fn parse_response(source_name: &str, body: &str) -> Result<Vec<String>, SourceError> {
    let entries: Vec<CrtEntry> = serde_json::from_str(body)
        .map_err(|e| SourceError::Parse { source_name: source_name.to_string(), reason: e.to_string() })?;
    let mut out = Vec::new();
    for e in entries {
        if let Some(v) = e.name_value {
            out.extend(v.lines().map(str::trim).filter(|s| !s.is_empty()).map(str::to_lowercase));
        }
    }
    Ok(out)
}

/// Live certificate-transparency query for `%.<domain>`.
pub struct CrtShSource {
    domain: String,
    timeout: Duration,
    raw_out: Option<PathBuf>,
}

impl CrtShSource {
    pub fn new(domain: &str, timeout: Duration, raw_out: Option<PathBuf>) -> Self {
        Self { domain: domain.to_string(), timeout, raw_out }
    }

    async fn fetch(&self) -> Result<String, SourceError> {
        let http_err = |reason: String| SourceError::Http { source_name: "crt.sh".into(), reason };
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("rusub-merge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| http_err(e.to_string()))?;
        let q = format!("%.{}", self.domain);
        let resp = client
            .get(CRTSH_ENDPOINT)
            .query(&[("q", q.as_str()), ("output", "json")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::Timeout { source_name: "crt.sh".into(), after: self.timeout }
                } else {
                    http_err(e.to_string())
                }
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(http_err(format!("status {}", status)));
        }
        resp.text().await.map_err(|e| http_err(e.to_string()))
    }
}

#[async_trait]
impl Source for CrtShSource {
    fn name(&self) -> &str {
        "crt.sh"
    }

    async fn produce(&self) -> Result<Vec<String>, SourceError> {
        log::info!("Fetching crt.sh data for {}...", self.domain);
        let body = self.fetch().await?;
        // 原始响应旁路保存，失败不影响聚合
        if let Some(p) = &self.raw_out {
            match save_raw(p, &body).await {
                Ok(()) => log::info!("Raw crt.sh response: {}", p.display()),
                Err(e) => log::warn!("[crt.sh] could not save raw response to {}: {}", p.display(), e),
            }
        }
        parse_response(self.name(), &body)
    }
}

async fn save_raw(path: &std::path::Path, body: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, body).await?;
    Ok(())
}

/// A crt.sh response saved by an earlier run.
pub struct CrtShFileSource {
    path: PathBuf,
}

impl CrtShFileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Source for CrtShFileSource {
    fn name(&self) -> &str {
        "crt.sh (saved)"
    }

    async fn produce(&self) -> Result<Vec<String>, SourceError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let body = tokio::fs::read_to_string(&self.path).await.map_err(|e| SourceError::io(self.name(), e))?;
        parse_response(self.name(), &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"issuer_ca_id": 1, "name_value": "*.Example.com\nexample.com", "id": 10},
        {"name_value": "api.example.com"},
        {"common_name": "no-name-value.example.com"},
        {"name_value": ""}
    ]"#;

    #[test]
    fn test_parse_response_splits_sans() {
        let v = parse_response("crt.sh", SAMPLE).unwrap();
        assert_eq!(v, vec!["*.example.com", "example.com", "api.example.com"]);
    }

    #[test]
    fn test_parse_response_rejects_garbage() {
        let e = parse_response("crt.sh", "<html>busy</html>").unwrap_err();
        assert!(matches!(e, SourceError::Parse { .. }));
        assert!(parse_response("crt.sh", "[]").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_saved_response() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("crtsh_domains.json");
        std::fs::write(&p, SAMPLE).unwrap();
        let v = CrtShFileSource::new(p).produce().await.unwrap();
        assert_eq!(v.len(), 3);
        let missing = CrtShFileSource::new(dir.path().join("none.json"));
        assert!(missing.produce().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_raw_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("out").join("raw.json");
        let body = r#"[{"name_value":"a.example.com"}]"#;
        save_raw(&p, body).await.unwrap();
        let back = std::fs::read_to_string(&p).unwrap();
        assert_eq!(back, body);
        assert_eq!(parse_response("t", &back).unwrap(), vec!["a.example.com"]);
    }

    #[tokio::test]
    async fn test_save_raw_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();
        let p = blocker.join("raw.json");
        assert!(save_raw(&p, "[]").await.is_err());
        assert!(!p.exists());
    }
}
