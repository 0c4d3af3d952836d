use crate::organize::DomainMap;
use crate::runner::RunSummary;
use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const ROOT_SEPARATOR: &str = "--------";

#[cfg(unix)]
const REPORT_MODE: u32 = 0o644;

#[derive(Serialize, Debug, Clone)]
pub struct RootBlock<'a> {
    pub root: &'a str,
    pub subdomains: Vec<&'a str>,
}

#[derive(Serialize, Debug)]
pub struct JsonReport<'a> {
    pub target: &'a str,
    pub roots: Vec<RootBlock<'a>>,
    pub summary: &'a RunSummary,
}

pub trait ReportWriter {
    /// Persist the whole map. Either the destination holds the new report afterwards or it is untouched.
    fn write(&self, map: &DomainMap, summary: &RunSummary) -> Result<()>;
    fn path(&self) -> &Path;
}

/// `ROOT:` / `SUBS:` / separator layout.
pub fn render_plain<W: Write + ?Sized>(map: &DomainMap, w: &mut W) -> std::io::Result<()> {
    for (root, subs) in map.iter() {
        writeln!(w, "ROOT: {}", root)?;
        if !subs.is_empty() {
            writeln!(w, "SUBS:")?;
            // BTreeSet 迭代即字典序
            for s in subs {
                writeln!(w, "{}", s)?;
            }
        }
        writeln!(w, "{}", ROOT_SEPARATOR)?;
    }
    Ok(())
}

pub fn render_json<W: Write + ?Sized>(map: &DomainMap, summary: &RunSummary, w: &mut W) -> Result<()> {
    let report = JsonReport {
        target: &summary.target,
        roots: map
            .iter()
            .map(|(root, subs)| RootBlock { root, subdomains: subs.iter().map(|s| s.as_str()).collect() })
            .collect(),
        summary,
    };
    serde_json::to_writer_pretty(&mut *w, &report)?;
    writeln!(w)?;
    Ok(())
}

/// Write through a temp file in the destination directory, then rename over `path`.
fn persist_atomically<F>(path: &Path, gzip: bool, body: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut tmp = NamedTempFile::new_in(&dir)
        .with_context(|| format!("cannot create temp file in {}", dir.display()))?;
    {
        let file = tmp.as_file_mut();
        if gzip {
            let mut enc = GzEncoder::new(BufWriter::new(file), Compression::default());
            body(&mut enc)?;
            enc.finish()?.flush()?;
        } else {
            let mut w = BufWriter::new(file);
            body(&mut w)?;
            w.flush()?;
        }
    }
    // NamedTempFile 默认 0600，报告应与普通创建的文件一致
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(REPORT_MODE))
            .with_context(|| format!("cannot set permissions on {}", tmp.path().display()))?;
    }
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("cannot write report to {}", path.display()))?;
    Ok(())
}

pub struct PlainReportWriter {
    path: PathBuf,
    gzip: bool,
}

impl PlainReportWriter {
    pub fn new(path: PathBuf, gzip: bool) -> Self {
        Self { path, gzip }
    }
}

impl ReportWriter for PlainReportWriter {
    fn write(&self, map: &DomainMap, _summary: &RunSummary) -> Result<()> {
        persist_atomically(&self.path, self.gzip, |w| {
            render_plain(map, w)?;
            Ok(())
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

pub struct JsonReportWriter {
    path: PathBuf,
    gzip: bool,
}

impl JsonReportWriter {
    pub fn new(path: PathBuf, gzip: bool) -> Self {
        Self { path, gzip }
    }
}

impl ReportWriter for JsonReportWriter {
    fn write(&self, map: &DomainMap, summary: &RunSummary) -> Result<()> {
        persist_atomically(&self.path, self.gzip, |w| render_json(map, summary, w))
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

pub fn build_writer(path: PathBuf, output_type: &str, gzip: bool) -> Result<Box<dyn ReportWriter>> {
    match output_type {
        "txt" => Ok(Box::new(PlainReportWriter::new(path, gzip))),
        "json" => Ok(Box::new(JsonReportWriter::new(path, gzip))),
        other => Err(anyhow::anyhow!("unsupported output type: {}", other)),
    }
}
