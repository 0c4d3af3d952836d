use crate::errors::ConfigError;
use crate::normalize::Hostname;
use crate::root::RootStrategy;
use crate::sources::ToolKind;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionMethod {
    /// run tools + crt.sh
    Recon,
    /// aggregate existing artifacts only
    Merge,
}

#[derive(Debug, Clone)]
pub struct Options {
    pub method: OptionMethod,
    pub target: String,
    pub tools: Vec<ToolKind>,
    pub crtsh: bool,
    pub tool_timeout: u64,
    pub crtsh_timeout: u64,
    pub crtsh_raw: Option<PathBuf>,
    pub work_dir: Option<PathBuf>,
    pub inputs: Vec<PathBuf>,
    pub crtsh_json: Option<PathBuf>,
    pub stdin_lines: Vec<String>,
    pub output: PathBuf,
    pub output_type: String,
    pub gzip: bool,
    pub root_strategy: RootStrategy,
    pub log_level: String,
}

impl Options {
    /// Validate once before a run; returns the normalized target.
    pub fn check(&self) -> Result<Hostname, ConfigError> {
        let target = Hostname::parse(&self.target).ok_or_else(|| ConfigError::InvalidTarget(self.target.clone()))?;
        match self.method {
            OptionMethod::Recon => {
                if self.tool_timeout == 0 {
                    return Err(ConfigError::ZeroTimeout("--tool-timeout"));
                }
                if self.crtsh && self.crtsh_timeout == 0 {
                    return Err(ConfigError::ZeroTimeout("--crtsh-timeout"));
                }
                if self.tools.is_empty() && !self.crtsh {
                    return Err(ConfigError::NoSources);
                }
            }
            OptionMethod::Merge => {
                if self.inputs.is_empty() && self.crtsh_json.is_none() && self.stdin_lines.is_empty() {
                    return Err(ConfigError::NoSources);
                }
            }
        }
        Ok(target)
    }
}

/// Parse a `--tools amass,gau` list, keeping first-seen order and dropping repeats.
pub fn parse_tools(list: &[String]) -> Result<Vec<ToolKind>, ConfigError> {
    let mut out: Vec<ToolKind> = Vec::new();
    for item in list.iter().flat_map(|s| s.split(',')) {
        if item.trim().is_empty() {
            continue;
        }
        let k: ToolKind = item.parse()?;
        if !out.contains(&k) {
            out.push(k);
        }
    }
    Ok(out)
}

/// `.gz` suffix implies gzip, as for scan output.
pub fn gzip_for(path: &std::path::Path, flag: bool) -> bool {
    flag || path.as_os_str().to_str().map(|s| s.ends_with(".gz")).unwrap_or(false)
}

pub fn log_filter(level: &str) -> log::LevelFilter {
    match level.to_lowercase().as_str() {
        "silent" | "off" => log::LevelFilter::Off,
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    }
}
