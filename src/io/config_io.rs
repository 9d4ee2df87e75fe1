use std::fs;
use std::path::{Path, PathBuf};

use crate::io::slot::atomic_write;
use crate::model::config::{Config, ThemeName};

/// Environment variable naming the data directory
pub const DATA_DIR_ENV: &str = "TASKLIST_DIR";

/// Error type for config I/O operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("invalid storage key '{0}' (must be a plain file name)")]
    InvalidKey(String),
    #[error("could not edit config.toml: {0}")]
    EditError(#[from] toml_edit::TomlError),
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Resolve the data directory: explicit override, then `$TASKLIST_DIR`,
/// then `$XDG_DATA_HOME/tasklist`, then `$HOME/.local/share/tasklist`.
pub fn data_dir(override_dir: Option<&Path>) -> PathBuf {
    resolve_data_dir(override_dir, |name| std::env::var(name).ok())
}

/// Same as [`data_dir`] with an injectable environment lookup
pub fn resolve_data_dir<F>(override_dir: Option<&Path>, env: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }
    if let Some(dir) = env(DATA_DIR_ENV).filter(|s| !s.is_empty()) {
        return PathBuf::from(dir);
    }
    let data_home = env("XDG_DATA_HOME")
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            env("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/"))
                .join(".local")
                .join("share")
        });
    data_home.join("tasklist")
}

/// Path of config.toml inside the data directory
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

/// Read the raw config text, treating a missing file as empty
fn read_config_text(data_dir: &Path) -> Result<String, ConfigError> {
    let path = config_path(data_dir);
    match fs::read_to_string(&path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(source) => Err(ConfigError::ReadError { path, source }),
    }
}

/// Read config.toml; a missing file yields the defaults
pub fn read_config(data_dir: &Path) -> Result<Config, ConfigError> {
    let text = read_config_text(data_dir)?;
    let config: Config = toml::from_str(&text)?;
    check_storage_key(&config.storage.key)?;
    Ok(config)
}

/// The key becomes `<key>.json` inside the data dir, so it must name a
/// file there and nothing else
fn check_storage_key(key: &str) -> Result<(), ConfigError> {
    let trimmed = key.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || key.contains(['/', '\\', '\0'])
    {
        return Err(ConfigError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Read config.toml as an editable document that preserves comments and layout
pub fn read_config_doc(data_dir: &Path) -> Result<toml_edit::DocumentMut, ConfigError> {
    let text = read_config_text(data_dir)?;
    Ok(text.parse()?)
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(data_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    let path = config_path(data_dir);
    fs::create_dir_all(data_dir).map_err(|source| ConfigError::WriteError {
        path: path.clone(),
        source,
    })?;
    atomic_write(&path, doc.to_string().as_bytes())
        .map_err(|source| ConfigError::WriteError { path, source })
}

/// Update the ui.theme field in the config document
pub fn set_theme(doc: &mut toml_edit::DocumentMut, theme: ThemeName) {
    if !doc.contains_key("ui") {
        doc["ui"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["ui"]["theme"] = toml_edit::value(theme.as_str());
}

/// Persist a theme choice into config.toml
pub fn save_theme(data_dir: &Path, theme: ThemeName) -> Result<(), ConfigError> {
    let mut doc = read_config_doc(data_dir)?;
    set_theme(&mut doc, theme);
    write_config(data_dir, &doc)
}
