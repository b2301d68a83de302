use super::types::PolicySettings;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Get the default policy settings file path (~/.config/stock-scout/settings.json)
pub fn get_settings_path() -> PathBuf {
    crate::config::get_config_dir().join("settings.json")
}

/// Load policy settings from a JSON file
///
/// If the file doesn't exist, returns the first-run defaults (high rates,
/// shrinking balance sheet). If the file exists but has an unsupported
/// version, returns an error.
pub fn load_settings(path: &Path) -> Result<PolicySettings> {
    if !path.exists() {
        return Ok(PolicySettings::default());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open settings file at {}", path.display()))?;

    let settings: PolicySettings =
        serde_json::from_reader(file).context("Failed to load policy settings")?;

    // Version check
    if settings.version != 1 {
        anyhow::bail!("Unsupported settings version: {}", settings.version);
    }

    Ok(settings)
}

/// Save policy settings to a JSON file atomically
///
/// Uses atomic-write-file so the file is never left in a corrupted state.
/// Creates the config directory if it doesn't exist.
pub fn save_settings(path: &Path, settings: &PolicySettings) -> Result<()> {
    crate::config::ensure_config_dir()?;

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, settings).context("Failed to serialize settings")?;

    file.commit().context("Failed to save policy settings")?;

    Ok(())
}
