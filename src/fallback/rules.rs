//! Content-type fallback rules.
//!
//! # Responsibilities
//! - Parse content-type specifiers (`*`, `type/*`, `type/subtype`)
//! - Compile a rule mapping into exact, top-type and global buckets
//! - Look up the fallback target for a classified request
//!
//! # Design Decisions
//! - Priority is structural: exact > top-type > global, declaration order
//!   only matters for duplicate keys (last write wins)
//! - Specifiers are lowercased at compile time; content types compare
//!   case-insensitively
//! - Compiled once, immutable afterwards

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use mime_guess::Mime;

use crate::config::ConfigError;

/// A content-type pattern used as a fallback rule key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentTypeSpecifier {
    /// `*`: matches anything, including unclassified requests.
    Any,
    /// `image/*`: matches every subtype of a top type.
    TopType(String),
    /// `text/html`: matches one content type exactly.
    Exact(String),
}

impl FromStr for ContentTypeSpecifier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidSpecifier(s.to_string());
        let normalized = s.trim().to_ascii_lowercase();

        if normalized == "*" {
            return Ok(Self::Any);
        }

        let (top, sub) = normalized.split_once('/').ok_or_else(invalid)?;
        if top.is_empty() || sub.is_empty() || sub.contains('/') || top.contains('*') {
            return Err(invalid());
        }

        match sub {
            "*" => Ok(Self::TopType(top.to_string())),
            _ if sub.contains('*') => Err(invalid()),
            _ => Ok(Self::Exact(normalized)),
        }
    }
}

impl fmt::Display for ContentTypeSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::TopType(top) => write!(f, "{}/*", top),
            Self::Exact(essence) => write!(f, "{}", essence),
        }
    }
}

/// Compiled fallback rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    exact: HashMap<String, String>,
    top_type: HashMap<String, String>,
    global: Option<String>,
}

impl RuleTable {
    /// Compile `(specifier, target)` pairs.
    ///
    /// Fails on the first specifier that does not parse.
    pub fn compile<I, K, V>(rules: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut table = Self::default();

        for (key, target) in rules {
            let target = target.into();
            match key.as_ref().parse::<ContentTypeSpecifier>()? {
                ContentTypeSpecifier::Any => table.global = Some(target),
                ContentTypeSpecifier::TopType(top) => {
                    table.top_type.insert(top, target);
                }
                ContentTypeSpecifier::Exact(essence) => {
                    table.exact.insert(essence, target);
                }
            }
        }

        tracing::debug!(
            exact = table.exact.len(),
            top_type = table.top_type.len(),
            global = table.global.is_some(),
            "Fallback rules compiled"
        );

        Ok(table)
    }

    /// Find the fallback target for a content type.
    ///
    /// `None` means the request could not be classified; only the global
    /// rule applies then.
    pub fn lookup(&self, content_type: Option<&Mime>) -> Option<&str> {
        let Some(mime) = content_type else {
            return self.global.as_deref();
        };

        let essence = mime.essence_str().to_ascii_lowercase();
        if let Some(target) = self.exact.get(&essence) {
            return Some(target.as_str());
        }

        let top = mime.type_().as_str().to_ascii_lowercase();
        self.top_type
            .get(&top)
            .map(String::as_str)
            .or(self.global.as_deref())
    }

    /// Every target path in the table, in no particular order.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.exact
            .values()
            .chain(self.top_type.values())
            .chain(self.global.iter())
            .map(String::as_str)
    }

    /// Returns true if the table has no rules at all.
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.top_type.is_empty() && self.global.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mime(s: &str) -> Mime {
        s.parse().unwrap()
    }

    fn sample() -> RuleTable {
        RuleTable::compile([
            ("text/html", "/application.html"),
            ("image/*", "/images/lockness.jpg"),
            ("*", "/404.html"),
        ])
        .unwrap()
    }

    #[test]
    fn test_specifier_shapes() {
        assert_eq!("*".parse::<ContentTypeSpecifier>().unwrap(), ContentTypeSpecifier::Any);
        assert_eq!(
            "image/*".parse::<ContentTypeSpecifier>().unwrap(),
            ContentTypeSpecifier::TopType("image".into())
        );
        assert_eq!(
            "Text/HTML".parse::<ContentTypeSpecifier>().unwrap(),
            ContentTypeSpecifier::Exact("text/html".into())
        );
    }

    #[test]
    fn test_invalid_specifiers() {
        for bad in ["*/json", "*/*", "json", "", "text/", "/html", "a/b/c", "text/ht*ml"] {
            let err = bad.parse::<ContentTypeSpecifier>().unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidSpecifier(_)),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_compile_rejects_invalid_key() {
        let err = RuleTable::compile([("text/html", "/a.html"), ("*/json", "/b.json")]).unwrap_err();
        assert!(err.to_string().contains("invalid mime type specifier"));
    }

    #[test]
    fn test_lookup_priority() {
        let table = sample();
        assert_eq!(table.lookup(Some(&mime("text/html"))), Some("/application.html"));
        assert_eq!(table.lookup(Some(&mime("image/jpeg"))), Some("/images/lockness.jpg"));
        assert_eq!(table.lookup(Some(&mime("image/png"))), Some("/images/lockness.jpg"));
        assert_eq!(table.lookup(Some(&mime("application/json"))), Some("/404.html"));
        assert_eq!(table.lookup(None), Some("/404.html"));
    }

    #[test]
    fn test_exact_beats_top_type_regardless_of_order() {
        let table = RuleTable::compile([
            ("*", "/any.html"),
            ("image/*", "/image.jpg"),
            ("image/png", "/exact.png"),
        ])
        .unwrap();
        assert_eq!(table.lookup(Some(&mime("image/png"))), Some("/exact.png"));
        assert_eq!(table.lookup(Some(&mime("image/gif"))), Some("/image.jpg"));
    }

    #[test]
    fn test_unclassified_skips_buckets() {
        let table = RuleTable::compile([("text/html", "/app.html")]).unwrap();
        assert_eq!(table.lookup(None), None);
        assert_eq!(table.lookup(Some(&mime("text/css"))), None);
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let table = RuleTable::compile([
            ("text/html", "/first.html"),
            ("*", "/first-any.html"),
            ("TEXT/HTML", "/second.html"),
            ("*", "/second-any.html"),
        ])
        .unwrap();
        assert_eq!(table.lookup(Some(&mime("text/html"))), Some("/second.html"));
        assert_eq!(table.lookup(None), Some("/second-any.html"));
    }

    #[test]
    fn test_compile_is_idempotent() {
        let first = sample();
        let second = sample();
        assert_eq!(first, second);
        for ct in ["text/html", "image/gif", "application/wasm", "font/woff2"] {
            assert_eq!(first.lookup(Some(&mime(ct))), second.lookup(Some(&mime(ct))));
        }
    }

    #[test]
    fn test_empty_table() {
        let table = RuleTable::compile(Vec::<(String, String)>::new()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.lookup(Some(&mime("text/html"))), None);
        assert_eq!(sample().targets().count(), 3);
    }
}
