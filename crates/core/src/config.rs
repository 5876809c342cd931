//! Process configuration
//!
//! Defaults mirror the service flags; each field can be overridden from the
//! environment (`ROCKETFS_*`). Unparseable overrides fall back to the
//! default rather than failing startup.

use std::env;
use std::path::PathBuf;

/// Namenode configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory of the embedded KV store
    pub kv_store_db_path: PathBuf,
    /// Preallocated bytes of each request's arena
    pub request_arena_prealloc_bytes: usize,
    /// Page size used when a list request carries no limit
    pub list_dir_default_limit: usize,
    /// Listen address of the client-namenode service
    pub listen_address: String,
    /// This server's node number within the cluster (0..=15)
    pub node_id: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            kv_store_db_path: PathBuf::from("/tmp/rocketfs"),
            request_arena_prealloc_bytes: 4096,
            list_dir_default_limit: 100,
            listen_address: "0.0.0.0:50051".to_string(),
            node_id: 0,
        }
    }
}

impl Config {
    /// Build a configuration from defaults plus `ROCKETFS_*` environment
    /// overrides
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Config {
            kv_store_db_path: env::var("ROCKETFS_KV_STORE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.kv_store_db_path),
            request_arena_prealloc_bytes: parse_env(
                "ROCKETFS_REQUEST_ARENA_PREALLOC_BYTES",
                defaults.request_arena_prealloc_bytes,
            ),
            list_dir_default_limit: parse_env(
                "ROCKETFS_LIST_DIR_DEFAULT_LIMIT",
                defaults.list_dir_default_limit,
            ),
            listen_address: env::var("ROCKETFS_LISTEN_ADDRESS")
                .unwrap_or(defaults.listen_address),
            node_id: parse_env("ROCKETFS_NODE_ID", defaults.node_id),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.kv_store_db_path, PathBuf::from("/tmp/rocketfs"));
        assert_eq!(config.request_arena_prealloc_bytes, 4096);
        assert_eq!(config.list_dir_default_limit, 100);
        assert_eq!(config.listen_address, "0.0.0.0:50051");
        assert_eq!(config.node_id, 0);
    }

    #[test]
    fn test_parse_env_falls_back_on_garbage() {
        // Unset variable yields the default.
        assert_eq!(parse_env("ROCKETFS_TEST_UNSET_VAR", 17usize), 17);
    }
}
