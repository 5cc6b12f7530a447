//! CLI argument resolution: host placeholder substitution and path expansion,
//! all of which happens before any network call.

use std::path::PathBuf;

use crate::archive::Storage;
use crate::cli::ArchiveArgs;

/// Expand `~` to the user's home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

fn substitute_host(raw: &str, phone_host: Option<&str>) -> String {
    match phone_host {
        Some(value) => raw.replace("$PHONE_HOST", value),
        None => raw.to_string(),
    }
}

/// Resolve the `$PHONE_HOST` placeholder in `--host` from the environment.
pub fn resolve_host(raw: &str) -> String {
    substitute_host(raw, std::env::var("PHONE_HOST").ok().as_deref())
}

/// Build the archive layout from the shared `--dir`/`--path`/`--metadata-path`
/// arguments.
pub fn storage_from(args: &ArchiveArgs) -> Storage {
    Storage::new(
        expand_tilde(&args.dir),
        args.path.clone(),
        args.metadata_path.clone(),
    )
}
