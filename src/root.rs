//! Root-domain resolution strategies.
//!
//! The default is the "last two labels" heuristic, which is what the report
//! format was built around. It gets multi-part suffixes such as `co.uk` wrong,
//! so the Public Suffix List variant can be selected with `--root-strategy psl`.

use clap::ValueEnum;
use serde::Serialize;

/// Derives the root a hostname is grouped under. Must be pure.
pub trait RootResolver: Send + Sync {
    fn root_of(&self, host: &str) -> String;
    fn name(&self) -> &'static str;
}

/// `api.sub.example.com` -> `example.com`; hosts with two or fewer labels are returned as-is.
pub fn root_of(host: &str) -> String {
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() > 2 {
        parts[parts.len() - 2..].join(".")
    } else {
        host.to_string()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LastTwoLabels;

impl RootResolver for LastTwoLabels {
    fn root_of(&self, host: &str) -> String {
        root_of(host)
    }
    fn name(&self) -> &'static str {
        "heuristic-last-two"
    }
}

/// Registrable domain per the Public Suffix List, falling back to [`root_of`]
/// when the list has no answer (the host is a bare suffix or single label).
#[derive(Debug, Default, Clone, Copy)]
pub struct PublicSuffix;

impl RootResolver for PublicSuffix {
    fn root_of(&self, host: &str) -> String {
        match psl::domain_str(host) {
            Some(d) => d.to_string(),
            None => root_of(host),
        }
    }
    fn name(&self) -> &'static str {
        "public-suffix-list-aware"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootStrategy {
    #[default]
    #[value(alias = "last-two")]
    Heuristic,
    #[value(alias = "public-suffix")]
    Psl,
}

impl RootStrategy {
    pub fn resolver(self) -> Box<dyn RootResolver> {
        match self {
            RootStrategy::Heuristic => Box::new(LastTwoLabels),
            RootStrategy::Psl => Box::new(PublicSuffix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_two() {
        assert_eq!(root_of("api.sub.example.com"), "example.com");
        assert_eq!(root_of("www.example.com"), "example.com");
        assert_eq!(root_of("example.com"), "example.com");
        assert_eq!(root_of("localhost"), "localhost");
        // heuristic limitation kept on purpose
        assert_eq!(root_of("shop.example.co.uk"), "co.uk");
    }

    #[test]
    fn test_root_is_fixed_point() {
        for h in ["a.b.c.d.example.org", "x.io", "single", "m.n.o"] {
            let r = root_of(h);
            assert!(r.split('.').count() <= 2);
            assert_eq!(root_of(&r), r);
        }
    }

    #[test]
    fn test_public_suffix() {
        let psl = PublicSuffix;
        assert_eq!(psl.root_of("shop.example.co.uk"), "example.co.uk");
        assert_eq!(psl.root_of("api.sub.example.com"), "example.com");
        assert_eq!(psl.root_of("example.com"), "example.com");
        // bare suffix: no registrable domain, fall back to the heuristic
        assert_eq!(psl.root_of("co.uk"), "co.uk");
    }

    #[test]
    fn test_strategy_dispatch() {
        assert_eq!(RootStrategy::Heuristic.resolver().name(), "heuristic-last-two");
        assert_eq!(RootStrategy::Psl.resolver().root_of("a.b.example.co.uk"), "example.co.uk");
        assert_eq!(RootStrategy::default(), RootStrategy::Heuristic);
    }
}
