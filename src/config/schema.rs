//! Configuration schema definitions.
//!
//! This module defines the on-disk configuration for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the SPA server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Directory to serve files from.
    pub path: String,

    /// Port to listen on.
    pub port: u16,

    /// Host name or address to bind; all interfaces when unset.
    pub hostname: Option<String>,

    /// Fallback for missing files: a path, or a table of
    /// content-type specifier → path.
    pub fallback: Option<FallbackSetting>,

    /// Optional TLS configuration; presence switches the listener to TLS.
    pub tls: Option<TlsConfig>,

    /// Emit lifecycle log lines.
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Delay between bind attempts while the port is in use.
    pub retry_delay_ms: u64,

    /// Upper bound on graceful shutdown, in seconds.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            path: ".".to_string(),
            port: 8888,
            hostname: None,
            fallback: None,
            tls: None,
            verbose: true,
            log_level: "info".to_string(),
            retry_delay_ms: 3000,
            shutdown_timeout_secs: 5,
        }
    }
}

/// Fallback as written in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FallbackSetting {
    /// `fallback = "/index.html"`
    Path(String),
    /// `[fallback]` table of specifier → path, in document order.
    Rules(#[serde(with = "ordered_table")] Vec<(String, String)>),
}

/// A string table kept as `(key, value)` pairs in the order written.
///
/// Specifiers are case-insensitive, so `"text/html"` and `"TEXT/HTML"` are
/// distinct keys in the file but the same rule; the later one must win.
mod ordered_table {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(entries: &[(String, String)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(entries.iter().map(|(k, v)| (k, v)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = Vec<(String, String)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of content-type specifier to path")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, String>()? {
                    entries.push(entry);
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}
