use super::file::read_lines;
use super::Source;
use crate::errors::{ConfigError, SourceError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::str::FromStr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

/// Supported external enumeration tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Amass,
    Subfinder,
    Waymore,
    Gau,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    /// tool writes its own output file
    File,
    /// stdout is the result
    Stdout,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [ToolKind::Amass, ToolKind::Subfinder, ToolKind::Waymore, ToolKind::Gau];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Amass => "amass",
            ToolKind::Subfinder => "subfinder",
            ToolKind::Waymore => "waymore",
            ToolKind::Gau => "gau",
        }
    }

    pub fn artifact_name(self) -> &'static str {
        match self {
            ToolKind::Amass => "amass_output.txt",
            ToolKind::Subfinder => "subfinder_output.txt",
            ToolKind::Waymore => "waymore_urls.txt",
            ToolKind::Gau => "gau_output.txt",
        }
    }

    fn capture(self) -> Capture {
        match self {
            ToolKind::Gau => Capture::Stdout,
            _ => Capture::File,
        }
    }

    /// waymore/gau emit URLs rather than bare hostnames
    pub fn url_lines(self) -> bool {
        matches!(self, ToolKind::Waymore | ToolKind::Gau)
    }

    pub fn args(self, domain: &str, out: &Path) -> Vec<String> {
        let out = out.display().to_string();
        let d = domain.to_string();
        match self {
            ToolKind::Amass => vec!["enum".into(), "-v".into(), "-passive".into(), "-d".into(), d, "-o".into(), out],
            ToolKind::Subfinder => vec!["-d".into(), d, "-o".into(), out],
            ToolKind::Waymore => vec!["-i".into(), d, "-oU".into(), out, "-mode".into(), "U".into(), "-v".into()],
            ToolKind::Gau => vec![d],
        }
    }
}

impl FromStr for ToolKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let l = s.trim().to_ascii_lowercase();
        ToolKind::ALL
            .into_iter()
            .find(|k| k.name() == l)
            .ok_or_else(|| ConfigError::UnknownTool(s.to_string()))
    }
}

/// One external tool run. The artifact lands in `work_dir` and is read back
/// with the same rules as [`super::FileSource`].
pub struct ToolSource {
    kind: ToolKind,
    program: String,
    domain: String,
    work_dir: PathBuf,
    timeout: Duration,
}

impl ToolSource {
    pub fn new(kind: ToolKind, domain: &str, work_dir: &Path, timeout: Duration) -> Self {
        Self {
            kind,
            program: kind.name().to_string(),
            domain: domain.to_string(),
            work_dir: work_dir.to_path_buf(),
            timeout,
        }
    }

    /// Override the executable (custom install path).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.work_dir.join(self.kind.artifact_name())
    }
}

#[async_trait]
impl Source for ToolSource {
    fn name(&self) -> &str {
        self.kind.name()
    }

    async fn produce(&self) -> Result<Vec<String>, SourceError> {
        let name = self.kind.name();
        let out_path = self.artifact_path();
        let args = self.kind.args(&self.domain, &out_path);
        log::info!("Running {}...", name);
        log::debug!("[{}] {} {}", name, self.program, args.join(" "));

        // 上次运行遗留的产物不能算作本次结果
        match tokio::fs::remove_file(&out_path).await {
            Ok(()) => log::debug!("[{}] removed stale {}", name, out_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(SourceError::io(name, e)),
        }

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SourceError::unavailable(name, format!("`{}` not found in PATH", self.program))
                } else {
                    SourceError::io(name, e)
                }
            })?;

        // stderr 单独排空，避免管道写满阻塞子进程
        let stderr_task = child.stderr.take().map(|mut err| {
            tokio::spawn(async move {
                let mut buf = String::new();
                let _ = err.read_to_string(&mut buf).await;
                buf
            })
        });
        let stdout = child.stdout.take();
        let capture = self.kind.capture() == Capture::Stdout;

        let run = async {
            let mut captured: Vec<String> = Vec::new();
            if let Some(out) = stdout {
                // 按字节读行：进度输出里的非 UTF-8 字节不能中断工具
                let mut reader = BufReader::new(out);
                let mut buf = Vec::new();
                loop {
                    buf.clear();
                    match reader.read_until(b'\n', &mut buf).await {
                        Ok(0) => break,
                        Ok(_) => {
                            let line = String::from_utf8_lossy(&buf);
                            let line = line.trim_end_matches(['\n', '\r']);
                            log::debug!("[{}] {}", name, line);
                            if capture {
                                captured.push(line.to_string());
                            }
                        }
                        Err(e) => {
                            log::warn!("[{}] stopped reading output: {}", name, e);
                            break;
                        }
                    }
                }
            }
            let status = child.wait().await.map_err(|e| SourceError::io(name, e))?;
            Ok::<_, SourceError>((status, captured))
        };

        let outcome = tokio::time::timeout(self.timeout, run).await;
        let (status, captured) = match outcome {
            Ok(res) => res?,
            Err(_) => {
                let _ = child.kill().await;
                return Err(SourceError::Timeout { source_name: name.to_string(), after: self.timeout });
            }
        };

        let stderr = match stderr_task {
            Some(t) => t.await.unwrap_or_default(),
            None => String::new(),
        };
        if !status.success() {
            log::warn!("Error running {}: exit {} {}", name, status, stderr.trim());
        }

        if capture {
            let mut body = captured.join("\n");
            body.push('\n');
            tokio::fs::write(&out_path, body).await.map_err(|e| SourceError::io(name, e))?;
        }
        read_lines(name, &out_path, self.kind.url_lines()).await
    }
}
