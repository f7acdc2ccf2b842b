//! Configuration loading for mnemo (`~/.config/mnemo/config.toml`).

pub mod config;

pub use config::{ChunkingSettings, MnemoConfig, StoreSettings};
