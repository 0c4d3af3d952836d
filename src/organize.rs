use crate::normalize::Hostname;
use crate::root::RootResolver;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeSet;

/// Root domain -> subdomains. Roots keep insertion order, subdomains are kept sorted.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DomainMap {
    roots: IndexMap<String, BTreeSet<String>>,
}

impl DomainMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `root` is present, even with no subdomains.
    pub fn ensure_root(&mut self, root: &str) -> &mut BTreeSet<String> {
        self.roots.entry(root.to_string()).or_default()
    }

    /// Returns false if the subdomain was already recorded.
    pub fn insert_sub(&mut self, root: &str, sub: &str) -> bool {
        self.ensure_root(root).insert(sub.to_string())
    }

    pub fn get(&self, root: &str) -> Option<&BTreeSet<String>> {
        self.roots.get(root)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.roots.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub fn subdomain_count(&self) -> usize {
        self.roots.values().map(|s| s.len()).sum()
    }
}

/// `api.sub.example.com` under `example.com` -> `api.sub`.
/// Plain suffix strip anchored at the end, not label-aware.
pub fn subdomain_label<'a>(host: &'a str, root: &str) -> &'a str {
    let suffix = format!(".{}", root);
    host.strip_suffix(suffix.as_str()).unwrap_or(host)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrganizeStats {
    pub in_scope: usize,
    pub out_of_scope: usize,
}

/// Group hostnames under the target's root. Hostnames whose root differs are dropped.
/// The subdomain set stores full hostnames, not the stripped label chain.
pub fn organize<'h, I>(hosts: I, target: &Hostname, resolver: &dyn RootResolver) -> (DomainMap, OrganizeStats)
where
    I: IntoIterator<Item = &'h Hostname>,
{
    let scope_root = resolver.root_of(target.as_str());
    let mut map = DomainMap::new();
    let mut stats = OrganizeStats::default();
    for h in hosts {
        if resolver.root_of(h.as_str()) != scope_root {
            stats.out_of_scope += 1;
            continue;
        }
        stats.in_scope += 1;
        if h.as_str() == scope_root {
            map.ensure_root(&scope_root);
        } else {
            log::trace!("{} -> {} under {}", h, subdomain_label(h.as_str(), &scope_root), scope_root);
            map.insert_sub(&scope_root, h.as_str());
        }
    }
    (map, stats)
}
