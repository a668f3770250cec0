use std::collections::HashSet;
use std::fmt;

use crate::config::LIST_SEPARATOR;

/// An unordered set of address strings for one policy role (allow or block).
///
/// Entries are trimmed on insert and matched by exact string equality; no
/// canonicalization or subnet expansion happens here, so textual variants of
/// the same address are distinct entries. An empty pool means the role
/// imposes no constraint.
#[derive(Debug, Clone, Default)]
pub struct IpPool {
    entries: HashSet<String>,
}

impl IpPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_list<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pool = Self::new();
        for address in addresses {
            pool.add(address.as_ref());
        }
        pool
    }

    pub fn add(&mut self, address: &str) {
        self.entries.insert(address.trim().to_string());
    }

    /// Exact membership test; the caller pre-trims the queried value.
    pub fn contains(&self, address: &str) -> bool {
        self.entries.contains(address)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Display for IpPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.entries.iter().map(String::as_str).collect();
        keys.sort_unstable();
        write!(f, "{}", keys.join(&LIST_SEPARATOR.to_string()))
    }
}
