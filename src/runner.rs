use crate::aggregate::{AggregationContext, SourceStats};
use crate::normalize::{normalize, normalize_all, Hostname};
use crate::options::{OptionMethod, Options};
use crate::organize::{organize, DomainMap};
use crate::output::build_writer;
use crate::root::RootResolver;
use crate::sources::{CrtShFileSource, CrtShSource, FileSource, Source, StaticSource, ToolSource};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Counters for one run, logged at the end and embedded in the JSON report.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunSummary {
    pub target: String,
    pub root_strategy: String,
    pub sources: IndexMap<String, SourceStats>,
    pub candidates: usize,
    pub normalized: usize,
    pub dropped: usize,
    pub in_scope: usize,
    pub out_of_scope: usize,
    pub roots: usize,
    pub subdomains: usize,
}

/// The synchronous core: normalize every aggregated candidate and group it under the target's root.
pub fn build_domain_map(ctx: AggregationContext, target: &Hostname, resolver: &dyn RootResolver) -> (DomainMap, RunSummary) {
    let (candidates, sources) = ctx.into_candidates();
    let candidate_count = candidates.len();
    let (normalized, nstats) = normalize_all(&candidates);
    log::info!("Total unique normalized domains: {}", normalized.len());
    let (map, ostats) = organize(&normalized, target, resolver);
    let summary = RunSummary {
        target: target.to_string(),
        root_strategy: resolver.name().to_string(),
        sources,
        candidates: candidate_count,
        normalized: normalized.len(),
        dropped: nstats.dropped,
        in_scope: ostats.in_scope,
        out_of_scope: ostats.out_of_scope,
        roots: map.root_count(),
        subdomains: map.subdomain_count(),
    };
    (map, summary)
}

/// `host\troot` for each valid host; invalid ones are skipped.
pub fn root_lines<S: AsRef<str>>(hosts: &[S], resolver: &dyn RootResolver) -> Vec<String> {
    hosts
        .iter()
        .filter_map(|h| normalize(h.as_ref()))
        .map(|h| format!("{}\t{}", h, resolver.root_of(h.as_str())))
        .collect()
}

pub struct Runner {
    pub options: Options,
    target: Hostname,
    resolver: Box<dyn RootResolver>,
}

impl Runner {
    pub fn new(opt: Options) -> Result<Self> {
        let target = opt.check()?;
        let resolver = opt.root_strategy.resolver();
        Ok(Runner { options: opt, target, resolver })
    }

    pub fn target(&self) -> &Hostname {
        &self.target
    }

    fn build_sources(&self, work_dir: Option<&Path>) -> Vec<Box<dyn Source>> {
        let opt = &self.options;
        let mut v: Vec<Box<dyn Source>> = Vec::new();
        match opt.method {
            OptionMethod::Recon => {
                if let Some(dir) = work_dir {
                    for kind in opt.tools.iter() {
                        v.push(Box::new(ToolSource::new(*kind, self.target.as_str(), dir, Duration::from_secs(opt.tool_timeout))));
                    }
                }
                if opt.crtsh {
                    v.push(Box::new(CrtShSource::new(
                        self.target.as_str(),
                        Duration::from_secs(opt.crtsh_timeout),
                        opt.crtsh_raw.clone(),
                    )));
                }
            }
            OptionMethod::Merge => {
                for p in opt.inputs.iter() {
                    v.push(Box::new(FileSource::new(p.clone()).url_lines(true)));
                }
                if let Some(p) = &opt.crtsh_json {
                    v.push(Box::new(CrtShFileSource::new(p.clone())));
                }
            }
        }
        if !opt.stdin_lines.is_empty() {
            v.push(Box::new(StaticSource::new("stdin", opt.stdin_lines.clone())));
        }
        v
    }

    /// Pull every source, then run the core and write the report.
    pub async fn run(&self) -> Result<RunSummary> {
        log::info!("Starting reconnaissance for {}...", self.target);
        // 未指定 --work-dir 时使用临时目录，运行结束自动清理
        let mut _temp = None;
        let work_dir = match (&self.options.method, &self.options.work_dir) {
            (OptionMethod::Recon, Some(d)) => {
                std::fs::create_dir_all(d).with_context(|| format!("cannot create work dir {}", d.display()))?;
                Some(d.clone())
            }
            (OptionMethod::Recon, None) => {
                let t = tempfile::Builder::new().prefix("rusub-merge-").tempdir().context("cannot create temp dir")?;
                let p = t.path().to_path_buf();
                _temp = Some(t);
                Some(p)
            }
            (OptionMethod::Merge, _) => None,
        };

        let sources = self.build_sources(work_dir.as_deref());
        let mut ctx = AggregationContext::new();
        ctx.collect(&sources).await;
        log::info!("Total unique domains after all sources: {}", ctx.len());

        let (map, summary) = build_domain_map(ctx, &self.target, self.resolver.as_ref());
        let gzip = crate::options::gzip_for(&self.options.output, self.options.gzip);
        let writer = build_writer(self.options.output.clone(), &self.options.output_type, gzip)?;
        writer.write(&map, &summary)?;

        log::info!(
            "Reconnaissance complete: {} root(s), {} subdomain(s), {} out of scope, {} malformed dropped. Results saved to {}",
            summary.roots,
            summary.subdomains,
            summary.out_of_scope,
            summary.dropped,
            writer.path().display()
        );
        Ok(summary)
    }
}
