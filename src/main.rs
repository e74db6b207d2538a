use clap::Parser;
use mem_db::config::{Config, LoggerOptions};
use mem_db::membership::Node;
use mem_db::server::ApiServer;
use mem_db::service::{WordService, handlers};
use mem_db::shutdown::install_shutdown_handler;
use mem_db::storage::{Database, Snapshotter};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mem-db")]
#[command(version)]
#[command(about = "Distributed in-memory word occurrence store")]
struct Args {
    /// Path to the JSON configuration file
    #[arg(long, short, default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_file(&args.config)?;
    init_logging(&config.logger)?;

    tracing::info!(
        "Starting node {} (node port {}, word port {})",
        config.node.name,
        config.node.port,
        config.service.port
    );

    let shutdown = CancellationToken::new();
    install_shutdown_handler(shutdown.clone())?;

    // 1. Storage (recovery runs before anything is served):
    let db = Arc::new(Database::open(&config.wal).await?);
    tracing::info!("Database ready with {} words", db.store().len());

    // Storage loops stop only after both servers have drained, so their final
    // flush and snapshot include every accepted write.
    let storage_cancel = CancellationToken::new();

    let wal = db.wal().clone();
    let token = storage_cancel.clone();
    let wal_task = tokio::spawn(async move { wal.keep_syncing(token).await });

    let snapshotter = Snapshotter::new(&config.snapshot.dir_path, config.snapshot.interval());
    let store = db.store().clone();
    let token = storage_cancel.clone();
    let snapshot_task = tokio::spawn(async move { snapshotter.run(store, token).await });

    // 2. Word API and cluster node:
    let service = WordService::new(db.clone(), config.service.pool_size);
    let node = Node::new(config.node.clone(), service.clone(), &shutdown);

    let outcome: anyhow::Result<()> = async {
        let word_addr = SocketAddr::from(([0, 0, 0, 0], config.service.port));
        let word_server =
            ApiServer::start("word API", word_addr, handlers::router(service.clone())).await?;

        let started = node.start().await;
        match &started {
            Ok(()) => {
                tracing::info!("Node {} is up, press Ctrl+C to shutdown", node.name());
                shutdown.cancelled().await;
            }
            Err(e) => tracing::error!("Node failed to start: {:#}", e),
        }

        node.stop().await;
        word_server.stop().await;
        started
    }
    .await;

    // 3. Final WAL flush and snapshot:
    shutdown.cancel();
    storage_cancel.cancel();
    for (name, task) in [("WAL sync", wal_task), ("snapshot", snapshot_task)] {
        if let Err(e) = task.await {
            tracing::error!("{} task terminated abnormally: {}", name, e);
        }
    }

    outcome?;
    if node.leadership_lost() {
        anyhow::bail!("Node {} lost leadership", node.name());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_logging(options: &LoggerOptions) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&options.level)
            .map_err(|e| anyhow::anyhow!("Invalid log level {:?}: {}", options.level, e))?,
    };

    if options.console {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return Ok(());
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&options.file_path)
        .map_err(|e| {
            anyhow::anyhow!(
                "Cannot open log file {}: {}",
                options.file_path.display(),
                e
            )
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
