use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "photopull",
    about = "Sync a phone's photo library to local storage, with checksum-proven remote pruning",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Phone RPC endpoint. `$PHONE_HOST` is substituted from the PHONE_HOST
    /// environment variable.
    #[arg(long, global = true, default_value = "http://$PHONE_HOST:1338")]
    pub host: String,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Incrementally download new and changed assets
    Sync(SyncArgs),
    /// Prune phone assets whose verified local copy is old enough
    Delete(DeleteArgs),
    /// Ad hoc connectivity smoke check
    Test,
}

#[derive(Args, Debug)]
pub struct ArchiveArgs {
    /// Directory to write output to
    #[arg(long, default_value = "/tmp/storage")]
    pub dir: String,

    /// Path template for data files
    #[arg(long, default_value = "{Y_create}-{m_create}/{filename}")]
    pub path: String,

    /// Path template for metadata sidecars; extension is replaced with .json
    #[arg(long, default_value = "{Y_create}-{m_create}/metadata/{filename}")]
    pub metadata_path: String,
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub archive: ArchiveArgs,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress_bar: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub archive: ArchiveArgs,

    /// Prune assets not modified for this long: integer or float plus
    /// d (days), w (weeks) or m (months, = 31d)
    #[arg(long, default_value = "30d")]
    pub retain_duration: String,

    /// Delete even when a proof mismatches the phone's live state
    #[arg(long)]
    pub ignore_integrity: bool,
}
