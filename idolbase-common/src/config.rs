//! Configuration loading and root folder resolution

use crate::Result;
use std::path::{Path, PathBuf};

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "idolbase.db";

/// Seed document directory inside the root folder
pub const SEED_DIR: &str = "seed";

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `IDOLBASE_ROOT` environment variable
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("IDOLBASE_ROOT") {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Some(config_path) = config_file_path() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Locate the configuration file for the platform, if one exists
fn config_file_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("idolbase").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/idolbase/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("idolbase"))
        .unwrap_or_else(|| PathBuf::from("./idolbase_data"))
}

/// Create the root folder if it does not exist yet
pub fn ensure_root_folder(root: &Path) -> Result<()> {
    std::fs::create_dir_all(root)?;
    Ok(())
}

/// Path of the SQLite database inside the root folder
pub fn database_path(root: &Path) -> PathBuf {
    root.join(DATABASE_FILE)
}

/// Path of the seed document directory inside the root folder
pub fn seed_data_dir(root: &Path) -> PathBuf {
    root.join(SEED_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_argument_takes_priority() {
        let root = resolve_root_folder(Some("/tmp/idolbase-test"));
        assert_eq!(root, PathBuf::from("/tmp/idolbase-test"));
    }

    #[test]
    fn derived_paths_join_root() {
        let root = PathBuf::from("/data/idolbase");
        assert_eq!(database_path(&root), PathBuf::from("/data/idolbase/idolbase.db"));
        assert_eq!(seed_data_dir(&root), PathBuf::from("/data/idolbase/seed"));
    }
}
