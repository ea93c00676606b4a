// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{RawShopFile, ShopFile};
use crate::errors::Result;

/// Load a shop file from a given path and return the raw `RawShopFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (references, cycles, policies). Use [`load_and_validate`] for
/// that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawShopFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let raw: RawShopFile = toml::from_str(&contents)?;
    debug!(
        path = %path.display(),
        items = raw.item.len(),
        resources = raw.resource.len(),
        policies = raw.policy.len(),
        "shop file parsed"
    );

    Ok(raw)
}

/// Load a shop file from path and validate it.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - `[config]` sanity,
///   - unknown resource, parent and predecessor references,
///   - predecessor and parent cycles,
///   - invalid work item fields,
///   - invalid policies and more than one default policy.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ShopFile> {
    let raw = load_from_path(&path)?;
    let shop = ShopFile::try_from(raw)?;
    Ok(shop)
}

/// Default shop file location: `Shopsched.toml` in the current working
/// directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Shopsched.toml")
}
