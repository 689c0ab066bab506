//! Server configuration
//!
//! `main.rs` parses command line arguments (with environment fallbacks) and
//! builds a [`Config`] through [`Config::new`], which checks the combination.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Key-value store selection as given on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum KvKind {
    /// No external store: decks are read from and written to files only
    None,
    /// In-process store, lost on restart
    Memory,
    /// SQLite file
    Sqlite,
    /// Redis over HTTP (Upstash / Vercel KV)
    Rest,
}

/// Resolved key-value store settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvBackend {
    None,
    Memory,
    Sqlite { path: PathBuf },
    Rest { url: String, token: String },
}

impl KvBackend {
    pub fn from_parts(
        kind: KvKind,
        sqlite_path: PathBuf,
        rest_url: Option<String>,
        rest_token: Option<String>,
    ) -> Result<Self, ConfigError> {
        Ok(match kind {
            KvKind::None => KvBackend::None,
            KvKind::Memory => KvBackend::Memory,
            KvKind::Sqlite => KvBackend::Sqlite { path: sqlite_path },
            KvKind::Rest => KvBackend::Rest {
                url: non_blank(rest_url).ok_or(ConfigError::MissingRestUrl)?,
                token: non_blank(rest_token).ok_or(ConfigError::MissingRestToken)?,
            },
        })
    }

    pub fn is_configured(&self) -> bool {
        !matches!(self, KvBackend::None)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one JSON file per deck
    pub data_dir: PathBuf,
    pub bind: String,
    pub port: u16,
    pub kv: KvBackend,
    /// Also write cache updates to the deck files
    pub write_through: bool,
    /// Shared secret for the `/api/gpts` endpoints
    pub gpt_api_key: Option<String>,
    /// Directory of static client files served for non-API paths
    pub static_dir: Option<PathBuf>,
}

impl Config {
    pub fn new(
        data_dir: PathBuf,
        bind: String,
        port: u16,
        kv: KvBackend,
        write_through: bool,
        gpt_api_key: Option<String>,
        static_dir: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        if port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        Ok(Self {
            data_dir,
            bind,
            port,
            kv,
            write_through,
            gpt_api_key: non_blank(gpt_api_key),
            static_dir,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Returns the default deck directory: ~/.local/share/deck_server/decks
pub fn default_data_dir() -> PathBuf {
    base_dir().join("decks")
}

/// Returns the default SQLite store path: ~/.local/share/deck_server/kv.db
pub fn default_sqlite_path() -> PathBuf {
    base_dir().join("kv.db")
}

fn base_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("deck_server")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_backend_requires_url_and_token() {
        let missing_url = KvBackend::from_parts(KvKind::Rest, PathBuf::new(), None, Some("t".into()));
        assert!(matches!(missing_url, Err(ConfigError::MissingRestUrl)));

        let blank_token = KvBackend::from_parts(
            KvKind::Rest,
            PathBuf::new(),
            Some("https://kv.example.com".into()),
            Some("  ".into()),
        );
        assert!(matches!(blank_token, Err(ConfigError::MissingRestToken)));

        let ok = KvBackend::from_parts(
            KvKind::Rest,
            PathBuf::new(),
            Some("https://kv.example.com".into()),
            Some("secret".into()),
        )
        .unwrap();
        assert_eq!(
            ok,
            KvBackend::Rest {
                url: "https://kv.example.com".into(),
                token: "secret".into()
            }
        );
    }

    #[test]
    fn sqlite_backend_uses_given_path() {
        let backend =
            KvBackend::from_parts(KvKind::Sqlite, PathBuf::from("/tmp/kv.db"), None, None).unwrap();
        assert_eq!(backend, KvBackend::Sqlite { path: PathBuf::from("/tmp/kv.db") });
        assert!(backend.is_configured());
        assert!(!KvBackend::None.is_configured());
    }

    #[test]
    fn config_rejects_port_zero() {
        let result = Config::new(
            PathBuf::from("decks"),
            "0.0.0.0".into(),
            0,
            KvBackend::None,
            true,
            None,
            None,
        );
        assert!(matches!(result, Err(ConfigError::InvalidPort)));
    }

    #[test]
    fn blank_gpt_key_is_treated_as_unset() {
        let config = Config::new(
            PathBuf::from("decks"),
            "127.0.0.1".into(),
            3000,
            KvBackend::Memory,
            false,
            Some(String::new()),
            None,
        )
        .unwrap();
        assert!(config.gpt_api_key.is_none());
        assert_eq!(config.addr(), "127.0.0.1:3000");
    }

    #[test]
    fn default_paths_share_base_dir() {
        assert!(default_data_dir().ends_with("deck_server/decks"));
        assert!(default_sqlite_path().ends_with("deck_server/kv.db"));
    }
}
