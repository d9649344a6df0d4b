// Copyright 2024 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! Controller against real files in an emulated sysfs tree.

use std::fs;

use xiaomiparts::{
    Backends, ControlKey, DevicePaths, FilePreferences, InstalledPackages, MemoryPropertyStore,
    PartsConfig, SettingsSyncController, SysfsNodes, Value,
};

mod common;
use common::{enable_logger, ScratchDir};

fn backends(paths: DevicePaths, scratch: &ScratchDir) -> anyhow::Result<Backends> {
    Ok(Backends {
        properties: Box::new(MemoryPropertyStore::new()),
        nodes: Box::new(SysfsNodes),
        paths,
        packages: Box::new(InstalledPackages::default()),
        preferences: Box::new(FilePreferences::open(scratch.path.join("parts.prefs"))?),
        enhancer: None,
    })
}

#[test]
fn test_slider_changes_reach_the_nodes() -> anyhow::Result<()> {
    enable_logger();
    let scratch = ScratchDir::new("sysfs");
    let paths = scratch.device_tree("200\n", "2900\n");
    let mut controller = SettingsSyncController::load(backends(paths.clone(), &scratch)?)?;

    assert!(controller.is_enabled(ControlKey::TorchBrightness));
    assert_eq!(controller.value(ControlKey::TorchBrightness), Some(&Value::Int(200)));
    assert_eq!(controller.value(ControlKey::VibrationStrength), Some(&Value::Int(80)));

    assert!(controller.on_change(ControlKey::TorchBrightness, Value::Int(350))?);
    assert_eq!(fs::read_to_string(&paths.torch_0)?, "350");
    assert_eq!(fs::read_to_string(&paths.torch_1)?, "350");

    assert!(controller.on_change(ControlKey::VibrationStrength, Value::Int(50))?);
    assert_eq!(fs::read_to_string(&paths.vibration)?, "1856.0");
    Ok(())
}

#[test]
fn test_missing_torch_channel_disables_torch() -> anyhow::Result<()> {
    enable_logger();
    let scratch = ScratchDir::new("sysfs-missing");
    let paths = scratch.device_tree("100", "116");
    fs::remove_file(&paths.torch_1)?;

    let mut controller = SettingsSyncController::load(backends(paths.clone(), &scratch)?)?;

    assert!(!controller.is_enabled(ControlKey::TorchBrightness));
    assert!(controller.is_enabled(ControlKey::VibrationStrength));
    assert!(!controller.on_change(ControlKey::TorchBrightness, Value::Int(10))?);
    assert_eq!(fs::read_to_string(&paths.torch_0)?, "100");
    Ok(())
}

#[test]
fn test_fingerprint_preferences_survive_reload() -> anyhow::Result<()> {
    enable_logger();
    let scratch = ScratchDir::new("sysfs-prefs");
    let paths = scratch.device_tree("100", "116");

    let mut controller = SettingsSyncController::load(backends(paths.clone(), &scratch)?)?;
    controller.on_change(ControlKey::FpActionEnabled, Value::Bool(true))?;
    controller.on_change(ControlKey::FpAction, Value::Text("2".to_owned()))?;
    drop(controller);

    let controller = SettingsSyncController::load(backends(paths, &scratch)?)?;
    assert_eq!(controller.value(ControlKey::FpActionEnabled), Some(&Value::Bool(true)));
    assert!(controller.is_enabled(ControlKey::FpAction));
    assert_eq!(
        controller.control(ControlKey::FpAction).unwrap().summary.as_deref(),
        Some("Recent apps")
    );
    Ok(())
}

#[test]
fn test_config_rebases_nodes() {
    let scratch = ScratchDir::new("sysfs-config");
    let config = PartsConfig::with_sysfs_root(&scratch.path);
    assert_eq!(config.device_paths(), DevicePaths::with_root(&scratch.path));
}
