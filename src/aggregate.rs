use crate::errors::SourceError;
use crate::sources::Source;
use fnv::FnvHashSet;
use indexmap::IndexMap;
use serde::Serialize;

/// Per-source ledger entry.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    /// non-blank lines the source produced
    pub lines: usize,
    /// entries not seen from any earlier source
    pub new_unique: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run-scoped aggregation state: the union of raw candidates plus what each source contributed.
/// Created per run and consumed by [`AggregationContext::into_candidates`].
#[derive(Debug, Default)]
pub struct AggregationContext {
    seen: FnvHashSet<String>,
    sources: IndexMap<String, SourceStats>,
}

impl AggregationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one source's lines. Blank entries are skipped, the rest stored trimmed.
    pub fn absorb<I, S>(&mut self, source: &str, lines: I) -> &SourceStats
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stats = SourceStats::default();
        for l in lines {
            let t = l.as_ref().trim();
            if t.is_empty() {
                continue;
            }
            stats.lines += 1;
            if self.seen.insert(t.to_string()) {
                stats.new_unique += 1;
            }
        }
        self.merge_stats(source, stats)
    }

    /// A failed source counts as an empty contribution.
    pub fn absorb_failure(&mut self, source: &str, err: &SourceError) -> &SourceStats {
        let stats = SourceStats { error: Some(err.to_string()), ..Default::default() };
        self.merge_stats(source, stats)
    }

    fn merge_stats(&mut self, source: &str, stats: SourceStats) -> &SourceStats {
        let entry = self.sources.entry(source.to_string()).or_default();
        entry.lines += stats.lines;
        entry.new_unique += stats.new_unique;
        if stats.error.is_some() {
            entry.error = stats.error;
        }
        entry
    }

    /// Pull every source in order, one to completion before the next.
    pub async fn collect(&mut self, sources: &[Box<dyn Source>]) {
        for src in sources {
            match src.produce().await {
                Ok(lines) => {
                    let stats = self.absorb(src.name(), lines).clone();
                    log::info!(
                        "Loaded {} entries from {} ({} new), total unique: {}",
                        stats.lines,
                        src.name(),
                        stats.new_unique,
                        self.len()
                    );
                }
                Err(e) => {
                    log::warn!("{}; continuing without it", e);
                    self.absorb_failure(src.name(), &e);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn source_stats(&self) -> &IndexMap<String, SourceStats> {
        &self.sources
    }

    pub fn into_candidates(self) -> (FnvHashSet<String>, IndexMap<String, SourceStats>) {
        (self.seen, self.sources)
    }
}

/// Union of all collections without the bookkeeping.
pub fn aggregate(sources: &[Vec<String>]) -> FnvHashSet<String> {
    let mut ctx = AggregationContext::new();
    for (i, s) in sources.iter().enumerate() {
        ctx.absorb(&format!("source-{}", i), s);
    }
    ctx.into_candidates().0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::StaticSource;

    #[test]
    fn test_duplicates_across_sources_collapse() {
        let a = vec!["api.example.com".to_string(), "www.example.com".to_string()];
        let b = vec!["api.example.com".to_string()];
        let c = vec![" api.example.com ".to_string(), "".to_string(), "   ".to_string()];
        let set = aggregate(&[a, b, c]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("api.example.com"));
    }

    #[test]
    fn test_all_empty() {
        let empty: Vec<Vec<String>> = vec![vec![], vec![]];
        assert!(aggregate(&empty).is_empty());
        let none: [Vec<String>; 0] = [];
        assert!(aggregate(&none).is_empty());
    }

    #[test]
    fn test_ledger() {
        let mut ctx = AggregationContext::new();
        ctx.absorb("amass", ["a.example.com", "b.example.com"]);
        ctx.absorb("subfinder", ["b.example.com", "c.example.com", ""]);
        ctx.absorb_failure("gau", &SourceError::unavailable("gau", "not found"));
        let stats = ctx.source_stats();
        assert_eq!(stats["amass"], SourceStats { lines: 2, new_unique: 2, error: None });
        assert_eq!(stats["subfinder"].lines, 2);
        assert_eq!(stats["subfinder"].new_unique, 1);
        assert_eq!(stats["gau"].lines, 0);
        assert!(stats["gau"].error.as_deref().unwrap().contains("not found"));
        assert_eq!(stats.keys().collect::<Vec<_>>(), vec!["amass", "subfinder", "gau"]);
        assert_eq!(ctx.len(), 3);
    }

    struct Broken;

    #[async_trait::async_trait]
    impl Source for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        async fn produce(&self) -> Result<Vec<String>, SourceError> {
            Err(SourceError::unavailable("broken", "exploded"))
        }
    }

    #[tokio::test]
    async fn test_collect_tolerates_failures() {
        let sources: Vec<Box<dyn Source>> = vec![
            Box::new(StaticSource::new("one", vec!["x.example.com".into()])),
            Box::new(Broken),
            Box::new(StaticSource::new("two", vec!["x.example.com".into(), "y.example.com".into()])),
        ];
        let mut ctx = AggregationContext::new();
        ctx.collect(&sources).await;
        assert_eq!(ctx.len(), 2);
        assert!(ctx.source_stats()["broken"].error.is_some());
    }
}
