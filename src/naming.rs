//! District name post-processing: sanitization and whitelisting.

use anyhow::{Context, Result};
use hashbrown::HashSet;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::info;

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s-]+").unwrap());

/// Turn a district name into a plain lowercase identifier.
///
/// "Döhren-Wülfel" becomes "doehrenwuelfel".
pub fn sanitize_district(name: &str) -> String {
    let name = name.to_lowercase();
    let name = SEPARATORS.replace_all(&name, "");

    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            'ä' => out.push_str("ae"),
            'ö' => out.push_str("oe"),
            'ü' => out.push_str("ue"),
            'ß' => out.push_str("ss"),
            _ => out.push(c),
        }
    }
    out
}

/// Set of accepted district names, one per line in its source file.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    names: HashSet<String>,
}

impl Whitelist {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read whitelist file: {}", path.display()))?;
        let whitelist = Self::from_lines(content.lines());
        info!(
            "Loaded {} whitelisted districts from {}",
            whitelist.len(),
            path.display()
        );
        Ok(whitelist)
    }

    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let names = lines
            .into_iter()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Returns `name` if whitelisted, otherwise `fallback`.
    /// An empty whitelist accepts everything.
    pub fn filter<'a>(&self, name: &'a str, fallback: &'a str) -> &'a str {
        if self.is_empty() || self.contains(name) {
            name
        } else {
            fallback
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_district("Döhren-Wülfel"), "doehrenwuelfel");
        assert_eq!(sanitize_district("Groß Buchholz"), "grossbuchholz");
        assert_eq!(
            sanitize_district("Ahlem - Badenstedt - Davenstedt"),
            "ahlembadenstedtdavenstedt"
        );
        assert_eq!(sanitize_district("ÄÖÜ"), "aeoeue");
        assert_eq!(sanitize_district("Default"), "default");
        assert_eq!(sanitize_district("Mitte\t"), "mitte");
    }

    #[test]
    fn test_whitelist_parsing() {
        let whitelist = Whitelist::from_lines("mitte\n  nord \n\n\nsued\n".lines());
        assert_eq!(whitelist.len(), 3);
        assert!(whitelist.contains("nord"));
        assert!(!whitelist.contains(" nord "));
    }

    #[test]
    fn test_whitelist_filter() {
        let whitelist = Whitelist::from_lines(["mitte", "nord"]);
        assert_eq!(whitelist.filter("mitte", "Default"), "mitte");
        assert_eq!(whitelist.filter("linden", "Default"), "Default");

        let empty = Whitelist::from_lines("\n\n".lines());
        assert!(empty.is_empty());
        assert_eq!(empty.filter("linden", "Default"), "linden");
    }

    #[test]
    fn test_whitelist_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("whitelist.txt");
        fs::write(&path, "mitte\nnord\n").unwrap();
        let whitelist = Whitelist::load(&path).unwrap();
        assert!(whitelist.contains("mitte"));

        assert!(Whitelist::load(&dir.path().join("missing.txt")).is_err());
    }
}
