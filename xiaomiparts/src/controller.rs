// Copyright 2024 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use crate::enhancer::EnhancerConnector;
use crate::errors::*;
use crate::nodes::{parse_node_int, DeviceNodes, DevicePaths, Node};
use crate::packages::PackageProbe;
use crate::preferences::PreferenceStore;
use crate::properties::PropertyStore;
use crate::scaling::{encode_vibration, percent_to_vibration, vibration_to_percent};
use crate::schema::{
    encode_bool, parse_bool, Category, ControlKey, ControlKind, Target, Value, DEPENDENCIES,
};

/// Everything the controller reads from and writes to.
pub struct Backends {
    pub properties: Box<dyn PropertyStore>,
    pub nodes: Box<dyn DeviceNodes>,
    pub paths: DevicePaths,
    pub packages: Box<dyn PackageProbe>,
    pub preferences: Box<dyn PreferenceStore>,
    /// `None` when no enhancer service exists on this device; the audio
    /// controls are then left out.
    pub enhancer: Option<EnhancerConnector>,
}

/// Displayed state of one control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    /// `None` for links.
    pub value: Option<Value>,
    pub enabled: bool,
    /// Label of the current entry for list controls.
    pub summary: Option<String>,
}

/// Keeps the parts controls in sync with their backing stores.
///
/// Controls whose backing is missing are either disabled (unwritable device
/// nodes) or absent altogether (companion app not installed, no enhancer).
pub struct SettingsSyncController {
    backends: Backends,
    states: BTreeMap<ControlKey, ControlState>,
}

impl SettingsSyncController {
    /// Read every control's backing value and build the initial state.
    ///
    /// # Errors
    ///
    /// [`Error::ServiceUnavailable`] if the enhancer service cannot be
    /// reached even after starting it.
    pub fn load(backends: Backends) -> Result<Self> {
        let mut controller = Self {
            backends,
            states: BTreeMap::new(),
        };

        for key in ControlKey::ALL {
            if let Some(state) = controller.read_control(key)? {
                log::debug!("Loaded {}: {:?}", key, state);
                controller.states.insert(key, state);
            }
        }

        for link in DEPENDENCIES {
            if let Some(Value::Bool(enabled)) = controller.value(link.source).cloned() {
                controller.set_dependents_enabled(link.source, enabled);
            }
        }

        log::info!("Loaded {} controls", controller.states.len());
        Ok(controller)
    }

    fn read_control(&self, key: ControlKey) -> Result<Option<ControlState>> {
        let control = key.control();
        let prefs = &self.backends.preferences;

        let (value, enabled) = match control.target {
            Target::Property { name, default } => {
                let value = match control.kind {
                    ControlKind::Switch => Value::Bool(
                        self.backends
                            .properties
                            .get_bool(name, parse_bool(default).unwrap_or(false)),
                    ),
                    _ => Value::Text(self.backends.properties.get_or(name, default)),
                };
                (Some(value), true)
            }
            Target::Local { default } => {
                let raw = prefs.get(key.as_str()).unwrap_or_else(|| default.to_owned());
                (Some(decode_local(control.kind, raw, default)), true)
            }
            Target::Nodes(nodes) => {
                let writable = nodes.iter().all(|node| {
                    let path = self.backends.paths.resolve(*node);
                    self.backends.nodes.is_writable(path)
                });
                if !writable {
                    log::info!("{} disabled: device node not writable", key);
                }
                (Some(self.read_slider(key, nodes)), writable)
            }
            Target::Enhancer { default } => {
                let Some(connector) = &self.backends.enhancer else {
                    log::info!("{} removed: no audio enhancer", key);
                    return Ok(None);
                };
                let value = if key == ControlKey::EnhancerEnabled {
                    let service = connector.ready()?;
                    Value::Bool(service.is_enabled().unwrap_or_else(|e| {
                        log::warn!("Failed to query enhancer state: {}", e);
                        false
                    }))
                } else {
                    let raw = prefs.get(key.as_str()).unwrap_or_else(|| default.to_owned());
                    decode_local(control.kind, raw, default)
                };
                (Some(value), true)
            }
            Target::App(package) => {
                if !self.backends.packages.is_installed(package) {
                    log::info!("{} removed: {} not installed", key, package);
                    return Ok(None);
                }
                (None, true)
            }
        };

        let summary = value.as_ref().and_then(|value| summary_for(key, value));
        Ok(Some(ControlState {
            value,
            enabled,
            summary,
        }))
    }

    fn read_slider(&self, key: ControlKey, nodes: &[Node]) -> Value {
        let ControlKind::Slider { default, .. } = key.control().kind else {
            unreachable!("node-backed controls are sliders");
        };

        let raw = nodes
            .first()
            .map(|node| self.backends.paths.resolve(*node))
            .ok_or_else(|| Error::new_parse(format!("{key} has no node")))
            .and_then(|path| self.backends.nodes.read(path))
            .and_then(|content| parse_node_int(&content));

        match raw {
            Ok(raw) if key == ControlKey::VibrationStrength => {
                Value::Int(vibration_to_percent(raw))
            }
            Ok(raw) => Value::Int(raw),
            Err(e) => {
                log::debug!("Using default for {}: {}", key, e);
                Value::Int(default)
            }
        }
    }

    /// Apply a user change to `key`.
    ///
    /// Returns `Ok(false)` when the change is rejected: the control is absent
    /// or disabled, the value has the wrong type, a slider value is out of
    /// range or a list value is not one of the control's entries.
    /// Write failures are logged and do not reject the change.
    ///
    /// # Errors
    ///
    /// [`Error::ServiceUnavailable`] if an audio control cannot reach the
    /// enhancer service.
    pub fn on_change(&mut self, key: ControlKey, value: Value) -> Result<bool> {
        let control = key.control();
        let Some(state) = self.states.get(&key) else {
            log::debug!("Ignoring change to absent control {}", key);
            return Ok(false);
        };
        if !state.enabled {
            log::debug!("Ignoring change to disabled control {}", key);
            return Ok(false);
        }
        if !value.matches(control.kind) {
            log::warn!("Rejecting {:?} for {}", value, key);
            return Ok(false);
        }
        if let (ControlKind::Slider { min, max, .. }, Value::Int(v)) = (control.kind, &value) {
            if !(min..=max).contains(v) {
                log::warn!("Rejecting {} for {}: outside {}-{}", v, key, min, max);
                return Ok(false);
            }
        }
        if let (ControlKind::List(_), Value::Text(text)) = (control.kind, &value) {
            if control.label_for(text).is_none() {
                log::warn!("Rejecting {:?} for {}: not one of its entries", text, key);
                return Ok(false);
            }
        }

        match (key, &value) {
            (ControlKey::Hal3 | ControlKey::Eis | ControlKey::Spectrum, _) => {
                let Target::Property { name, .. } = control.target else {
                    unreachable!("{key} is property backed");
                };
                let encoded = match &value {
                    Value::Bool(b) => encode_bool(*b).to_owned(),
                    other => other.to_string(),
                };
                best_effort(self.backends.properties.set(name, &encoded), key);
            }
            (ControlKey::FpActionEnabled | ControlKey::FpShutter, Value::Bool(b)) => {
                best_effort(self.backends.preferences.set(key.as_str(), encode_bool(*b)), key);
            }
            (ControlKey::FpAction, Value::Text(text)) => {
                best_effort(self.backends.preferences.set(key.as_str(), text), key);
            }
            (ControlKey::TorchBrightness | ControlKey::VibrationStrength, Value::Int(level)) => {
                let Target::Nodes(nodes) = control.target else {
                    unreachable!("{key} is node backed");
                };
                let encoded = if key == ControlKey::VibrationStrength {
                    encode_vibration(percent_to_vibration(*level))
                } else {
                    level.to_string()
                };
                for node in nodes {
                    let path = self.backends.paths.resolve(*node);
                    best_effort(self.backends.nodes.write(path, &encoded), key);
                }
            }
            (ControlKey::EnhancerEnabled, Value::Bool(b)) => {
                let service = self.enhancer()?.ready()?;
                best_effort(service.set_enabled(*b), key);
            }
            (ControlKey::HeadsetType, Value::Text(text)) => {
                let Ok(headset_type) = text.trim().parse::<i32>() else {
                    log::warn!("Rejecting headset type {:?}", text);
                    return Ok(false);
                };
                let service = self.enhancer()?.ready()?;
                best_effort(service.set_headset_type(headset_type), key);
                best_effort(self.backends.preferences.set(key.as_str(), text), key);
            }
            (ControlKey::Preset, Value::Text(text)) => {
                let service = self.enhancer()?.ready()?;
                best_effort(service.set_level(text), key);
                best_effort(self.backends.preferences.set(key.as_str(), text), key);
            }
            _ => {
                log::debug!("{} carries no value", key);
                return Ok(false);
            }
        }

        if let Value::Bool(enabled) = value {
            self.set_dependents_enabled(key, enabled);
        }

        let summary = summary_for(key, &value);
        if let Some(state) = self.states.get_mut(&key) {
            state.value = Some(value);
            state.summary = summary;
        }
        Ok(true)
    }

    fn enhancer(&self) -> Result<&EnhancerConnector> {
        self.backends.enhancer.as_ref().ok_or_else(|| {
            Error::new_service_unavailable("no audio enhancer on this device".to_owned())
        })
    }

    fn set_dependents_enabled(&mut self, source: ControlKey, enabled: bool) {
        for dependent in source.dependents() {
            if let Some(state) = self.states.get_mut(dependent) {
                let action = if enabled { "enabled" } else { "disabled" };
                log::debug!("{} {} by {}", dependent, action, source);
                state.enabled = enabled;
            }
        }
    }

    pub fn control(&self, key: ControlKey) -> Option<&ControlState> {
        self.states.get(&key)
    }

    pub fn value(&self, key: ControlKey) -> Option<&Value> {
        self.states.get(&key).and_then(|state| state.value.as_ref())
    }

    pub fn is_present(&self, key: ControlKey) -> bool {
        self.states.contains_key(&key)
    }

    pub fn is_enabled(&self, key: ControlKey) -> bool {
        self.states.get(&key).is_some_and(|state| state.enabled)
    }

    /// Present controls in screen order.
    pub fn controls(&self) -> impl Iterator<Item = (ControlKey, &ControlState)> {
        self.states.iter().map(|(key, state)| (*key, state))
    }

    /// Present controls of one category, in screen order.
    pub fn category(&self, category: Category) -> Vec<ControlKey> {
        self.states
            .keys()
            .copied()
            .filter(|key| key.control().category == category)
            .collect()
    }
}

impl std::fmt::Debug for SettingsSyncController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsSyncController")
            .field("paths", &self.backends.paths)
            .field("states", &self.states)
            .finish_non_exhaustive()
    }
}

fn decode_local(kind: ControlKind, raw: String, default: &str) -> Value {
    match kind {
        ControlKind::Switch => Value::Bool(
            parse_bool(&raw)
                .or_else(|| parse_bool(default))
                .unwrap_or(false),
        ),
        _ => Value::Text(raw),
    }
}

fn summary_for(key: ControlKey, value: &Value) -> Option<String> {
    match value {
        Value::Text(text) => key.control().label_for(text).map(str::to_owned),
        _ => None,
    }
}

// Writes are optimistic: the displayed value follows the request either way.
fn best_effort(result: Result<()>, key: ControlKey) {
    if let Err(e) = result {
        log::warn!("Write for {} failed: {}", key, e);
    }
}
