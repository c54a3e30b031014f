use crate::error::CallNotesError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// callnotes configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Host the Chroma client connects to
    pub chroma_host: String,

    /// Chroma server port (client and launcher)
    pub chroma_port: u16,

    /// Chroma persist directory used when launching the server
    pub chroma_db_path: PathBuf,

    /// Address the launched server binds to
    pub server_bind_host: String,

    /// Python interpreter that has chromadb installed
    pub python_bin: String,

    /// Chroma tenant
    pub tenant: String,

    /// Chroma database
    pub database: String,

    /// Collection holding transcript summaries
    pub collection: String,

    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,

    /// Log directory (console only when unset)
    pub log_dir: Option<PathBuf>,

    /// Log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chroma_host: "localhost".to_string(),
            chroma_port: 8000,
            chroma_db_path: PathBuf::from("./chroma_db"),
            server_bind_host: "0.0.0.0".to_string(),
            python_bin: "python3".to_string(),
            tenant: "default_tenant".to_string(),
            database: "default_database".to_string(),
            collection: "transcript_summaries".to_string(),
            request_timeout_secs: 30,
            log_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, CallNotesError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Unset keys fall back to [`AppConfig::default`]. Numeric values that fail
    /// to parse are rejected instead of silently ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CallNotesError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            chroma_host: lookup("CHROMA_HOST").unwrap_or(defaults.chroma_host),
            chroma_port: Self::parse_var(&lookup, "CHROMA_PORT")?
                .unwrap_or(defaults.chroma_port),
            chroma_db_path: lookup("CHROMA_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.chroma_db_path),
            server_bind_host: lookup("CHROMA_BIND_HOST").unwrap_or(defaults.server_bind_host),
            python_bin: lookup("CHROMA_PYTHON").unwrap_or(defaults.python_bin),
            tenant: lookup("CHROMA_TENANT").unwrap_or(defaults.tenant),
            database: lookup("CHROMA_DATABASE").unwrap_or(defaults.database),
            collection: lookup("SUMMARY_COLLECTION").unwrap_or(defaults.collection),
            request_timeout_secs: Self::parse_var(&lookup, "CHROMA_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout_secs),
            log_dir: lookup("LOG_DIR").map(PathBuf::from),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
        };

        Ok(config)
    }

    fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, CallNotesError>
    where
        F: Fn(&str) -> Option<String>,
        T: std::str::FromStr,
    {
        match lookup(key) {
            None => Ok(None),
            Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
                CallNotesError::config(format!("{} has an invalid value: {:?}", key, raw))
            }),
        }
    }

    /// Base URL of the Chroma HTTP API (scheme://host:port)
    pub fn chroma_base_url(&self) -> String {
        format!("http://{}:{}", self.chroma_host, self.chroma_port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), CallNotesError> {
        if self.chroma_host.trim().is_empty() {
            return Err(CallNotesError::config("Chroma host cannot be empty"));
        }

        if self.chroma_host.contains("://") {
            return Err(CallNotesError::config(
                "Chroma host must be a bare host name, without scheme",
            ));
        }

        if self.chroma_port == 0 {
            return Err(CallNotesError::config("Chroma port cannot be 0"));
        }

        if self.collection.trim().is_empty() {
            return Err(CallNotesError::config("Collection name cannot be empty"));
        }

        if self.tenant.trim().is_empty() || self.database.trim().is_empty() {
            return Err(CallNotesError::config("Tenant and database cannot be empty"));
        }

        if self.request_timeout_secs == 0 {
            return Err(CallNotesError::config("Request timeout must be at least 1 second"));
        }

        Ok(())
    }
}
