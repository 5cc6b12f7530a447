//! CLI entrypoint: subcommand dispatch over the photopull library.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use photopull::cli::{self, Command, DeleteArgs, SyncArgs};
use photopull::phone::{HttpPhone, Phone};
use photopull::{config, retention, sync, types};

async fn run_sync_cmd(host: &str, args: SyncArgs) -> anyhow::Result<()> {
    let storage = config::storage_from(&args.archive);
    let phone = HttpPhone::new(host)?;
    sync::run_sync(&phone, &storage, args.no_progress_bar).await
}

async fn run_delete_cmd(host: &str, args: DeleteArgs) -> anyhow::Result<()> {
    // Usage errors fail before any network call.
    let retain_secs = retention::parse_retain_duration(&args.retain_duration)?;
    let storage = config::storage_from(&args.archive);
    let phone = HttpPhone::new(host)?;
    retention::run_delete(&phone, &storage, retain_secs, args.ignore_integrity).await
}

/// Connectivity smoke check: list collections, count assets, and retrieve
/// the last one. Not part of the durable contract.
async fn run_test_cmd(host: &str) -> anyhow::Result<()> {
    let phone = HttpPhone::new(host)?;

    let collections = phone.get_asset_collections().await?;
    println!(
        "Collections: {} albums, {} smart albums, {} moments",
        collections.albums.len(),
        collections.smart_albums.len(),
        collections.moments.len()
    );

    let metadata = phone.get_all_metadata().await?;
    let images = metadata
        .iter()
        .filter(|a| a.media_type == types::MediaType::Image)
        .count();
    println!(
        "Assets: {} total ({} images, {} other)",
        metadata.len(),
        images,
        metadata.len() - images
    );

    if let Some(last) = metadata.last() {
        let retrieved = phone.retrieve_asset_by_local_id(&last.local_id).await?;
        println!(
            "Retrieved {}: {} bytes, md5 {}",
            retrieved.asset.filename, retrieved.filesize, retrieved.md5
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    let host = config::resolve_host(&cli.host);
    tracing::debug!(%host, "phone endpoint");

    match cli.command {
        Command::Sync(args) => run_sync_cmd(&host, args).await,
        Command::Delete(args) => run_delete_cmd(&host, args).await,
        Command::Test => run_test_cmd(&host).await,
    }
}
