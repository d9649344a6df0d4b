// Copyright 2024 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! The fixed control schema of the parts screen.
//!
//! Every control is identified by a [`ControlKey`]. The key resolves to a
//! static [`Control`] describing how the control is displayed ([`ControlKind`])
//! and where its value lives ([`Target`]). The schema never changes at runtime;
//! only the per-control state held by the controller does.

use std::fmt;
use std::str::FromStr;

use crate::errors::*;
use crate::nodes::Node;

pub const HAL3_SYSTEM_PROPERTY: &str = "persist.camera.HAL3.enabled";
pub const EIS_SYSTEM_PROPERTY: &str = "persist.camera.eis.enable";
pub const SPECTRUM_SYSTEM_PROPERTY: &str = "persist.spectrum.profile";

pub const DEVICE_DOZE_PACKAGE_NAME: &str = "org.lineageos.settings.doze";
pub const DEVICE_KCAL_PACKAGE_NAME: &str = "org.lineageos.settings.kcal";

/// Lower end of the vibrator `vtg_level` register.
pub const MIN_VIBRATION: i32 = 116;
/// Upper end of the vibrator `vtg_level` register.
pub const MAX_VIBRATION: i32 = 3596;

pub const MIN_TORCH_BRIGHTNESS: i32 = 0;
pub const MAX_TORCH_BRIGHTNESS: i32 = 500;
pub const DEFAULT_TORCH_BRIGHTNESS: i32 = 200;
pub const DEFAULT_VIBRATION_STRENGTH: i32 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControlKey {
    Hal3,
    Eis,
    FpActionEnabled,
    FpShutter,
    FpAction,
    TorchBrightness,
    VibrationStrength,
    DeviceDoze,
    DeviceKcal,
    Spectrum,
    EnhancerEnabled,
    HeadsetType,
    Preset,
}

impl ControlKey {
    /// All keys in screen order.
    pub const ALL: [ControlKey; 13] = [
        ControlKey::Hal3,
        ControlKey::Eis,
        ControlKey::FpActionEnabled,
        ControlKey::FpShutter,
        ControlKey::FpAction,
        ControlKey::TorchBrightness,
        ControlKey::VibrationStrength,
        ControlKey::DeviceDoze,
        ControlKey::DeviceKcal,
        ControlKey::Spectrum,
        ControlKey::EnhancerEnabled,
        ControlKey::HeadsetType,
        ControlKey::Preset,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ControlKey::Hal3 => "hal3",
            ControlKey::Eis => "eis",
            ControlKey::FpActionEnabled => "fpaction_enabled",
            ControlKey::FpShutter => "fp_shutter",
            ControlKey::FpAction => "fpaction",
            ControlKey::TorchBrightness => "torch_brightness",
            ControlKey::VibrationStrength => "vibration_strength",
            ControlKey::DeviceDoze => "device_doze",
            ControlKey::DeviceKcal => "device_kcal",
            ControlKey::Spectrum => "spectrum",
            ControlKey::EnhancerEnabled => "dirac_enabled",
            ControlKey::HeadsetType => "dirac_headset_pref",
            ControlKey::Preset => "dirac_preset_pref",
        }
    }

    /// The static description of this control.
    pub fn control(self) -> &'static Control {
        match self {
            ControlKey::Hal3 => &HAL3,
            ControlKey::Eis => &EIS,
            ControlKey::FpActionEnabled => &FPACTION_ENABLED,
            ControlKey::FpShutter => &FP_SHUTTER,
            ControlKey::FpAction => &FPACTION,
            ControlKey::TorchBrightness => &TORCH_BRIGHTNESS,
            ControlKey::VibrationStrength => &VIBRATION_STRENGTH,
            ControlKey::DeviceDoze => &DEVICE_DOZE,
            ControlKey::DeviceKcal => &DEVICE_KCAL,
            ControlKey::Spectrum => &SPECTRUM,
            ControlKey::EnhancerEnabled => &ENHANCER_ENABLED,
            ControlKey::HeadsetType => &HEADSET_TYPE,
            ControlKey::Preset => &PRESET,
        }
    }

    /// Controls whose enabled flag follows this control's boolean value.
    pub fn dependents(self) -> &'static [ControlKey] {
        DEPENDENCIES
            .iter()
            .find(|link| link.source == self)
            .map(|link| link.dependents)
            .unwrap_or(&[])
    }
}

impl fmt::Display for ControlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ControlKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| Error::new_unknown_control(s.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Camera,
    Fingerprint,
    Hardware,
    Display,
    Performance,
    Audio,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Camera => "camera",
            Category::Fingerprint => "fingerprint",
            Category::Hardware => "hardware",
            Category::Display => "display",
            Category::Performance => "performance",
            Category::Audio => "audio",
        }
    }
}

/// One selectable entry of a list control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Switch,
    List(&'static [Choice]),
    Slider { min: i32, max: i32, default: i32 },
    /// Opens a companion app; carries no value.
    Link,
}

/// Where the value of a control is read from and written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A system property with the value used when it is absent.
    Property { name: &'static str, default: &'static str },
    /// Device files; every node receives the same encoded value.
    Nodes(&'static [Node]),
    /// The audio enhancer companion service. The last chosen value is kept
    /// in local preferences for display.
    Enhancer { default: &'static str },
    /// Host-persisted only.
    Local { default: &'static str },
    /// Presence of a companion app package.
    App(&'static str),
}

#[derive(Debug)]
pub struct Control {
    pub key: ControlKey,
    pub title: &'static str,
    pub category: Category,
    pub kind: ControlKind,
    pub target: Target,
}

impl Control {
    /// Label of `value` if this is a list control that offers it.
    pub fn label_for(&self, value: &str) -> Option<&'static str> {
        match self.kind {
            ControlKind::List(choices) => choices
                .iter()
                .find(|choice| choice.value == value)
                .map(|choice| choice.label),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct DependencyLink {
    pub source: ControlKey,
    pub dependents: &'static [ControlKey],
}

pub const DEPENDENCIES: &[DependencyLink] = &[
    DependencyLink {
        source: ControlKey::FpActionEnabled,
        dependents: &[ControlKey::FpAction],
    },
    DependencyLink {
        source: ControlKey::EnhancerEnabled,
        dependents: &[ControlKey::HeadsetType, ControlKey::Preset],
    },
];

const FPACTION_ENTRIES: &[Choice] = &[
    Choice { value: "0", label: "Home" },
    Choice { value: "1", label: "Back" },
    Choice { value: "2", label: "Recent apps" },
    Choice { value: "3", label: "Toggle flashlight" },
    Choice { value: "4", label: "Take screenshot" },
    Choice { value: "5", label: "Launch camera" },
];

const SPECTRUM_ENTRIES: &[Choice] = &[
    Choice { value: "0", label: "Balance" },
    Choice { value: "1", label: "Performance" },
    Choice { value: "2", label: "Battery" },
    Choice { value: "3", label: "Gaming" },
];

const HEADSET_ENTRIES: &[Choice] = &[
    Choice { value: "0", label: "Default" },
    Choice { value: "1", label: "Mi In-Ear Headphones Basic" },
    Choice { value: "2", label: "Mi In-Ear Headphones Pro" },
    Choice { value: "3", label: "Mi Piston Headphones" },
    Choice { value: "4", label: "Mi Capsule Earphones" },
    Choice { value: "5", label: "Mi Headphones" },
];

const PRESET_ENTRIES: &[Choice] = &[
    Choice { value: "0,0,0,0,0,0,0", label: "Default" },
    Choice { value: "4,3,1,0,0,0,0", label: "Bass" },
    Choice { value: "6,5,3,0,0,0,0", label: "Bass extreme" },
    Choice { value: "4,2,0,0,0,2,4", label: "Bass and treble" },
    Choice { value: "0,0,0,0,1,3,4", label: "Treble" },
    Choice { value: "-1,1,3,3,1,-1,-1", label: "Pop" },
    Choice { value: "3,2,0,-1,0,2,3", label: "Rock" },
    Choice { value: "2,1,0,0,1,2,2", label: "Jazz" },
];

static HAL3: Control = Control {
    key: ControlKey::Hal3,
    title: "Camera2 API (HAL3)",
    category: Category::Camera,
    kind: ControlKind::Switch,
    target: Target::Property { name: HAL3_SYSTEM_PROPERTY, default: "0" },
};

static EIS: Control = Control {
    key: ControlKey::Eis,
    title: "Electronic image stabilization",
    category: Category::Camera,
    kind: ControlKind::Switch,
    target: Target::Property { name: EIS_SYSTEM_PROPERTY, default: "0" },
};

static FPACTION_ENABLED: Control = Control {
    key: ControlKey::FpActionEnabled,
    title: "Fingerprint gestures",
    category: Category::Fingerprint,
    kind: ControlKind::Switch,
    target: Target::Local { default: "0" },
};

static FP_SHUTTER: Control = Control {
    key: ControlKey::FpShutter,
    title: "Fingerprint camera shutter",
    category: Category::Fingerprint,
    kind: ControlKind::Switch,
    target: Target::Local { default: "0" },
};

static FPACTION: Control = Control {
    key: ControlKey::FpAction,
    title: "Fingerprint tap action",
    category: Category::Fingerprint,
    kind: ControlKind::List(FPACTION_ENTRIES),
    target: Target::Local { default: "0" },
};

static TORCH_BRIGHTNESS: Control = Control {
    key: ControlKey::TorchBrightness,
    title: "Torch brightness",
    category: Category::Hardware,
    kind: ControlKind::Slider {
        min: MIN_TORCH_BRIGHTNESS,
        max: MAX_TORCH_BRIGHTNESS,
        default: DEFAULT_TORCH_BRIGHTNESS,
    },
    target: Target::Nodes(&[Node::Torch0, Node::Torch1]),
};

static VIBRATION_STRENGTH: Control = Control {
    key: ControlKey::VibrationStrength,
    title: "Vibration strength",
    category: Category::Hardware,
    kind: ControlKind::Slider {
        min: 0,
        max: 100,
        default: DEFAULT_VIBRATION_STRENGTH,
    },
    target: Target::Nodes(&[Node::Vibration]),
};

static DEVICE_DOZE: Control = Control {
    key: ControlKey::DeviceDoze,
    title: "Ambient display",
    category: Category::Display,
    kind: ControlKind::Link,
    target: Target::App(DEVICE_DOZE_PACKAGE_NAME),
};

static DEVICE_KCAL: Control = Control {
    key: ControlKey::DeviceKcal,
    title: "Display color calibration",
    category: Category::Display,
    kind: ControlKind::Link,
    target: Target::App(DEVICE_KCAL_PACKAGE_NAME),
};

static SPECTRUM: Control = Control {
    key: ControlKey::Spectrum,
    title: "Spectrum profile",
    category: Category::Performance,
    kind: ControlKind::List(SPECTRUM_ENTRIES),
    target: Target::Property { name: SPECTRUM_SYSTEM_PROPERTY, default: "0" },
};

static ENHANCER_ENABLED: Control = Control {
    key: ControlKey::EnhancerEnabled,
    title: "Dirac sound enhancer",
    category: Category::Audio,
    kind: ControlKind::Switch,
    target: Target::Enhancer { default: "0" },
};

static HEADSET_TYPE: Control = Control {
    key: ControlKey::HeadsetType,
    title: "Headset type",
    category: Category::Audio,
    kind: ControlKind::List(HEADSET_ENTRIES),
    target: Target::Enhancer { default: "0" },
};

static PRESET: Control = Control {
    key: ControlKey::Preset,
    title: "Equalizer preset",
    category: Category::Audio,
    kind: ControlKind::List(PRESET_ENTRIES),
    target: Target::Enhancer { default: "0,0,0,0,0,0,0" },
};

/// A control value in its native representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Text(String),
    Int(i32),
}

impl Value {
    /// Parse user input for the given kind of control.
    pub fn parse_for(kind: ControlKind, raw: &str) -> Result<Value> {
        match kind {
            ControlKind::Switch => parse_bool(raw)
                .map(Value::Bool)
                .ok_or_else(|| Error::new_parse(format!("Not a boolean: {raw}"))),
            ControlKind::List(_) => Ok(Value::Text(raw.to_owned())),
            ControlKind::Slider { .. } => Ok(Value::Int(raw.trim().parse()?)),
            ControlKind::Link => Err(Error::new_parse("Links carry no value".to_owned())),
        }
    }

    pub fn matches(&self, kind: ControlKind) -> bool {
        matches!(
            (self, kind),
            (Value::Bool(_), ControlKind::Switch)
                | (Value::Text(_), ControlKind::List(_))
                | (Value::Int(_), ControlKind::Slider { .. })
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Text(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
        }
    }
}

/// Decode a property string the way Android's `SystemProperties.getBoolean`
/// does. Returns `None` for anything it does not recognise.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "y" | "yes" | "on" | "true" => Some(true),
        "0" | "n" | "no" | "off" | "false" => Some(false),
        _ => None,
    }
}

pub fn encode_bool(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}
