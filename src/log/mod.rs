use fs_err as fs;
use serde::Serialize;
use serde_json::to_string_pretty;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

pub struct SavedPaths {
    pub dir: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Installs the global fmt subscriber. `RUST_LOG` wins over `debug`.
pub fn init_tracing(debug: bool) {
    let default = if debug { "vibe_site=debug,info" } else { "vibe_site=info,warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn tx_dir(root: &Path, tx: Uuid) -> PathBuf {
    root.join(".vibe").join("tx").join(tx.to_string())
}

/// Writes `<stage>.input.json` and `<stage>.output.json` under the
/// transaction directory.
pub fn save_stage<I: Serialize, O: Serialize>(
    root: &Path,
    tx: Uuid,
    stage: &str,
    input: &I,
    output: &O,
) -> anyhow::Result<SavedPaths> {
    let dir = tx_dir(root, tx);
    fs::create_dir_all(&dir)?;

    let input_path = dir.join(format!("{stage}.input.json"));
    fs::write(&input_path, to_string_pretty(input)?)?;

    let output_path = dir.join(format!("{stage}.output.json"));
    fs::write(&output_path, to_string_pretty(output)?)?;

    debug!(stage, dir = %dir.display(), "saved stage artifacts");
    Ok(SavedPaths { dir, input: input_path, output: output_path })
}
