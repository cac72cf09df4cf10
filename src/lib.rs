//! Wi-Fi, tethering and cellular settings panel.
//!
//! This crate provides:
//! - View models for the network list, network detail and advanced screens
//! - The controller that routes user input and connection-manager signals,
//!   and a shared handle that defers work while a prompt is open
//! - Connection-manager backends (NetworkManager over D-Bus, in-memory mock)
//! - A persistent key/value settings store
//! - Configuration parsing from TOML and logging setup

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod models;
pub mod prompt;
pub mod settings;
pub mod shared;
pub mod views;

pub use backend::{BackendError, BackendResult, ConnectionManager, ManagerSignal};
pub use config::{BackendKind, PanelConfig};
pub use controller::{NetworkingController, PanelIntent, Screen};
pub use error::{Error, Result};
pub use models::{ConnectedType, NetworkEntry, SecurityType, SeenNetworks, SignalBucket, Ssid};
pub use prompt::{Prompter, TextPrompt};
pub use settings::{FileSettingsStore, MemorySettingsStore, SettingsStore};
pub use shared::SharedController;
