use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level node configuration, read from a JSON file at startup.
///
/// Every section and field has a default, so an empty object `{}` is a valid
/// configuration for a standalone master.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub node: NodeOptions,
    pub service: ServiceOptions,
    pub wal: WalOptions,
    pub snapshot: SnapshotOptions,
    pub logger: LoggerOptions,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read config file {}: {}", path.display(), e))?;
        Self::from_json(&raw)
            .map_err(|e| anyhow::anyhow!("Error parsing config file {}: {}", path.display(), e))
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// Cluster identity and membership settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeOptions {
    /// Identity of this node. Peers address each other by name.
    pub name: String,
    /// Name of the master to register with. Empty means this node starts as master.
    pub master_id: String,
    /// Port of the node API (registration, heartbeat, replication).
    pub port: u16,
    pub heartbeat_interval_secs: u64,
    /// Upper bound on a single heartbeat probe.
    pub heartbeat_timeout_secs: u64,
    /// Capacity of the master's forwarding channel.
    pub forwarding_capacity: usize,
    pub registration_attempts: usize,
    pub registration_interval_ms: u64,
}

impl Default for NodeOptions {
    fn default() -> Self {
        Self {
            name: "localhost".to_string(),
            master_id: String::new(),
            port: 8081,
            heartbeat_interval_secs: 5,
            heartbeat_timeout_secs: 5,
            forwarding_capacity: 128,
            registration_attempts: 5,
            registration_interval_ms: 1000,
        }
    }
}

impl NodeOptions {
    pub fn is_master(&self) -> bool {
        self.master_id.is_empty()
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs.max(1))
    }

    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_secs(self.heartbeat_timeout_secs.max(1))
    }

    pub fn registration_interval(&self) -> Duration {
        Duration::from_millis(self.registration_interval_ms)
    }
}

/// Client-facing word API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceOptions {
    pub port: u16,
    /// Number of ingestion workers used per registered text.
    pub pool_size: usize,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            port: 8080,
            pool_size: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WalOptions {
    pub file_path: PathBuf,
    pub sync_interval_secs: u64,
    /// Replay an existing log on startup instead of starting empty.
    pub restore: bool,
}

impl Default for WalOptions {
    fn default() -> Self {
        Self {
            file_path: PathBuf::from("data/wal.log"),
            sync_interval_secs: 2,
            restore: true,
        }
    }
}

impl WalOptions {
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SnapshotOptions {
    pub dir_path: PathBuf,
    pub interval_secs: u64,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            dir_path: PathBuf::from("data/snapshots"),
            interval_secs: 60,
        }
    }
}

impl SnapshotOptions {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggerOptions {
    /// Filter directive, e.g. `info` or `mem_db=debug`.
    pub level: String,
    pub console: bool,
    /// Log file used when `console` is false.
    pub file_path: PathBuf,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: true,
            file_path: PathBuf::from("data/mem-db.log"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let cfg = Config::from_json("{}").unwrap();
        assert_eq!(cfg.node.name, "localhost");
        assert!(cfg.node.is_master());
        assert_eq!(cfg.node.port, 8081);
        assert_eq!(cfg.service.port, 8080);
        assert_eq!(cfg.service.pool_size, 15);
        assert_eq!(cfg.wal.file_path, PathBuf::from("data/wal.log"));
        assert!(cfg.wal.restore);
        assert_eq!(cfg.snapshot.interval_secs, 60);
        assert_eq!(cfg.logger.level, "info");
        assert!(cfg.logger.console);
    }

    #[test]
    fn worker_config_parses() {
        let raw = r#"{
            "node": {
                "name": "worker-1",
                "masterId": "master-0",
                "port": 9081,
                "heartbeatIntervalSecs": 3
            },
            "service": { "port": 9080, "poolSize": 4 },
            "wal": { "filePath": "/tmp/wal.log", "syncIntervalSecs": 1, "restore": false },
            "snapshot": { "dirPath": "/tmp/snaps", "intervalSecs": 10 },
            "logger": { "level": "debug", "console": false, "filePath": "/tmp/node.log" }
        }"#;

        let cfg = Config::from_json(raw).unwrap();
        assert_eq!(cfg.node.name, "worker-1");
        assert!(!cfg.node.is_master());
        assert_eq!(cfg.node.heartbeat_interval(), Duration::from_secs(3));
        assert_eq!(cfg.node.heartbeat_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.service.pool_size, 4);
        assert!(!cfg.wal.restore);
        assert_eq!(cfg.snapshot.dir_path, PathBuf::from("/tmp/snaps"));
        assert!(!cfg.logger.console);
    }

    #[test]
    fn keys_are_camel_case() {
        let cfg = Config::from_json(
            r#"{"node": {"heartbeatTimeoutSecs": 2, "forwardingCapacity": 8,
                         "registrationAttempts": 7, "registrationIntervalMs": 50}}"#,
        )
        .unwrap();
        assert_eq!(cfg.node.heartbeat_timeout(), Duration::from_secs(2));
        assert_eq!(cfg.node.forwarding_capacity, 8);
        assert_eq!(cfg.node.registration_attempts, 7);
        assert_eq!(cfg.node.registration_interval(), Duration::from_millis(50));

        // snake_case spellings are unknown keys and leave the defaults in place
        let cfg = Config::from_json(
            r#"{"node": {"master_id": "node-0"}, "service": {"pool_size": 2}}"#,
        )
        .unwrap();
        assert!(cfg.node.is_master());
        assert_eq!(cfg.service.pool_size, 15);
    }

    #[test]
    fn zero_intervals_are_clamped() {
        let cfg = Config::from_json(
            r#"{"wal": {"syncIntervalSecs": 0}, "snapshot": {"intervalSecs": 0}}"#,
        )
        .unwrap();
        assert_eq!(cfg.wal.sync_interval(), Duration::from_secs(1));
        assert_eq!(cfg.snapshot.interval(), Duration::from_secs(1));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(Config::from_json("{\"node\": ").is_err());
        assert!(Config::from_json("{\"node\": {\"port\": \"abc\"}}").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Config::from_file("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("Cannot read config file"));
    }

    #[test]
    fn bundled_configs_parse() {
        let master = Config::from_json(include_str!("../config/master.json")).unwrap();
        assert!(master.node.is_master());

        let worker = Config::from_json(include_str!("../config/worker.json")).unwrap();
        assert_eq!(worker.node.master_id, "node-0");
        assert!(!worker.logger.console);
    }
}
