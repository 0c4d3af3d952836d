use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::ops::Deref;

static HOSTNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9-]*(\.[a-z0-9][a-z0-9-]*)*$").expect("hostname pattern is valid")
});

const WILDCARD_MARKER: &str = "*.";

/// A validated, lowercase, wildcard-free hostname.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Hostname(String);

impl Hostname {
    /// Normalize a raw candidate. `None` means the input is malformed and should be dropped.
    pub fn parse(raw: &str) -> Option<Self> {
        // 单次替换，不递归：`*.*.a.com` -> `a.com`，`**..a.com` -> `*.a.com`(非法)
        let unwild = raw.replace(WILDCARD_MARKER, "");
        let lowered = unwild.trim().to_lowercase();
        if HOSTNAME_RE.is_match(&lowered) {
            Some(Hostname(lowered))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Hostname {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Hostname {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn normalize(raw: &str) -> Option<Hostname> {
    Hostname::parse(raw)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NormalizeStats {
    pub accepted: usize,
    pub dropped: usize,
}

/// Normalize every candidate, collapsing entries that only differed by case or wildcard.
pub fn normalize_all<I, S>(candidates: I) -> (fnv::FnvHashSet<Hostname>, NormalizeStats)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = fnv::FnvHashSet::default();
    let mut stats = NormalizeStats::default();
    for c in candidates {
        match Hostname::parse(c.as_ref()) {
            Some(h) => {
                stats.accepted += 1;
                out.insert(h);
            }
            None => {
                log::trace!("dropped malformed hostname {:?}", c.as_ref());
                stats.dropped += 1;
            }
        }
    }
    (out, stats)
}
