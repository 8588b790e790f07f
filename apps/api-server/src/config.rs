//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use quill_infra::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the server on the in-memory store.
    pub database: Option<DatabaseConfig>,
    /// Apply pending schema migrations before serving.
    pub auto_migrate: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .map(|url| {
                let mut db = DatabaseConfig::new(url);
                if let Some(max) = parsed(&lookup, "DB_MAX_CONNECTIONS") {
                    db.max_connections = max;
                }
                if let Some(min) = parsed(&lookup, "DB_MIN_CONNECTIONS") {
                    db.min_connections = min;
                }
                db
            });

        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parsed(&lookup, "PORT").unwrap_or(8080),
            database,
            auto_migrate: lookup("AUTO_MIGRATE")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|raw| raw.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = config(&[]);
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 8080);
        assert!(cfg.database.is_none());
        assert!(!cfg.auto_migrate);
    }

    #[test]
    fn database_settings_are_read() {
        let cfg = config(&[
            ("DATABASE_URL", "postgres://localhost/blog"),
            ("DB_MAX_CONNECTIONS", "25"),
            ("PORT", "3000"),
            ("AUTO_MIGRATE", "true"),
        ]);

        let db = cfg.database.unwrap();
        assert_eq!(db.url, "postgres://localhost/blog");
        assert_eq!(db.max_connections, 25);
        assert_eq!(db.min_connections, 1);
        assert_eq!(cfg.port, 3000);
        assert!(cfg.auto_migrate);
    }

    #[test]
    fn malformed_numbers_fall_back_to_defaults() {
        let cfg = config(&[("PORT", "eighty"), ("DATABASE_URL", "  ")]);
        assert_eq!(cfg.port, 8080);
        assert!(cfg.database.is_none());
    }
}
