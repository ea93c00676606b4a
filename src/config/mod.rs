// src/config/mod.rs

//! Shop file loading and validation for shopsched.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a shop file from disk (`loader.rs`).
//! - Validate it into a [`ShopFile`] whose references all resolve
//!   (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    AvailabilityEntry, ConfigSection, ItemConfig, RawShopFile, ResourceConfig, ShopFile,
};
