//! Configuration module for quiver.
//!
//! Handles transport and store settings, with environment variable
//! expansion in string values.

mod settings;

pub use settings::{
    expand_env_vars, Settings, SettingsError, StoreSettings, TransportSettings,
};
