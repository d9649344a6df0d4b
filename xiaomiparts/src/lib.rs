// Copyright 2024 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! # Device parts settings for Xiaomi SDM660 devices.
//!
//! This crate keeps the device "parts" controls (camera HAL3 and EIS,
//! fingerprint gestures, torch brightness, vibration strength, Spectrum
//! profile, the Dirac audio enhancer and links to the doze and KCAL apps)
//! in sync with the system properties and sysfs nodes behind them.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use xiaomiparts::{ControlKey, PartsConfig, SettingsSyncController, Value};
//!
//! let backends = xiaomiparts::system_backends(&PartsConfig::default(), None)?;
//! let mut controller = SettingsSyncController::load(backends)?;
//!
//! // Enable the Camera2 API.
//! controller.on_change(ControlKey::Hal3, Value::Bool(true))?;
//!
//! // 50% vibration strength.
//! controller.on_change(ControlKey::VibrationStrength, Value::Int(50))?;
//! # Ok::<(), xiaomiparts::Error>(())
//! ```
//!
//! ## Testing
//!
//! Every backend is a trait object. [`MemoryPropertyStore`],
//! [`MemoryPreferences`] and [`InstalledPackages`] stand in for the device,
//! and [`DevicePaths::with_root`] points the sysfs nodes at a scratch tree.

use std::path::PathBuf;

pub mod errors;
pub use errors::{Error, Result};

mod controller;
mod enhancer;
mod nodes;
mod packages;
mod preferences;
mod properties;
pub mod scaling;
pub mod schema;

pub use controller::{Backends, ControlState, SettingsSyncController};
pub use enhancer::{AudioEnhancer, EnhancerConnector, EnhancerLauncher};
pub use nodes::{
    parse_node_int, DeviceNodes, DevicePaths, Node, SysfsNodes, SYSFS_ROOT_ENV,
    TORCH_1_BRIGHTNESS_PATH, TORCH_2_BRIGHTNESS_PATH, VIBRATION_STRENGTH_PATH,
};
pub use packages::{InstalledPackages, PackageManagerProbe, PackageProbe};
pub use preferences::{FilePreferences, MemoryPreferences, PreferenceStore};
pub use properties::{MemoryPropertyStore, PropertyStore, SystemPropertyStore};
pub use schema::{Category, ControlKey, ControlKind, Value};

/// Default location of the host-persisted preferences.
pub const DEFAULT_PREFERENCES_FILE: &str =
    "/data/data/org.lineageos.settings.device/shared_prefs/parts.prefs";

/// Configuration for the system backends.
#[derive(Debug, Clone, Default)]
pub struct PartsConfig {
    /// Directory for reading system properties (default: "/dev/__properties__")
    pub properties_dir: Option<PathBuf>,
    /// Directory for property service sockets (default: "/dev/socket")
    pub socket_dir: Option<PathBuf>,
    /// Root the sysfs nodes are rebased under (default: `$PARTS_SYSFS_ROOT` or "/")
    pub sysfs_root: Option<PathBuf>,
    /// Preferences file (default: [`DEFAULT_PREFERENCES_FILE`])
    pub preferences_file: Option<PathBuf>,
}

impl From<PathBuf> for PartsConfig {
    fn from(sysfs_root: PathBuf) -> Self {
        Self {
            sysfs_root: Some(sysfs_root),
            ..Self::default()
        }
    }
}

impl PartsConfig {
    /// Create config with only the sysfs root
    pub fn with_sysfs_root<P: Into<PathBuf>>(root: P) -> Self {
        Self::from(root.into())
    }

    /// Create config with both property system directories
    pub fn with_property_dirs<P1: Into<PathBuf>, P2: Into<PathBuf>>(
        properties_dir: P1,
        socket_dir: P2,
    ) -> Self {
        Self {
            properties_dir: Some(properties_dir.into()),
            socket_dir: Some(socket_dir.into()),
            ..Self::default()
        }
    }

    pub fn properties_dir(&self) -> PathBuf {
        self.properties_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(rsproperties::PROP_DIRNAME))
    }

    pub fn preferences_file(&self) -> PathBuf {
        self.preferences_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PREFERENCES_FILE))
    }

    pub fn device_paths(&self) -> DevicePaths {
        match &self.sysfs_root {
            Some(root) => DevicePaths::with_root(root),
            None => DevicePaths::from_env(),
        }
    }
}

/// Initialize the property system from `config` and resolve the device
/// node paths.
///
/// Only the first call initializes the property system; later calls are
/// logged and ignored.
pub fn init(config: &PartsConfig) -> DevicePaths {
    let properties_dir = config.properties_dir();
    log::info!("Using properties directory: {:?}", properties_dir);

    rsproperties::init(rsproperties::PropertyConfig {
        properties_dir: Some(properties_dir),
        socket_dir: config.socket_dir.clone(),
    });

    config.device_paths()
}

/// Backends for the running device: the property system, sysfs, the package
/// manager and the preferences file.
///
/// Calls [`init`] with `config`.
pub fn system_backends(
    config: &PartsConfig,
    enhancer: Option<EnhancerConnector>,
) -> Result<Backends> {
    let paths = init(config);

    let preferences = FilePreferences::open(config.preferences_file())?;
    log::debug!("Preferences file: {:?}", preferences.path());

    Ok(Backends {
        properties: Box::new(SystemPropertyStore::new(config.properties_dir())),
        nodes: Box::new(SysfsNodes),
        paths,
        packages: Box::new(PackageManagerProbe::new()),
        preferences: Box::new(preferences),
        enhancer,
    })
}
