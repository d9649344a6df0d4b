// Copyright 2024 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! Sysfs device nodes behind the torch and vibration sliders.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rustix::fs::{access, Access};

use crate::errors::*;

pub const TORCH_1_BRIGHTNESS_PATH: &str = "/sys/devices/soc/800f000.qcom,spmi/spmi-0/spmi0-03/800f000.qcom,spmi:qcom,pm660l@3:qcom,leds@d300/leds/led:torch_0/max_brightness";
pub const TORCH_2_BRIGHTNESS_PATH: &str = "/sys/devices/soc/800f000.qcom,spmi/spmi-0/spmi0-03/800f000.qcom,spmi:qcom,pm660l@3:qcom,leds@d300/leds/led:torch_1/max_brightness";
pub const VIBRATION_STRENGTH_PATH: &str = "/sys/devices/virtual/timed_output/vibrator/vtg_level";

/// Environment variable that rebases every node under another root.
pub const SYSFS_ROOT_ENV: &str = "PARTS_SYSFS_ROOT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    Torch0,
    Torch1,
    Vibration,
}

/// Resolved locations of the device nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePaths {
    pub torch_0: PathBuf,
    pub torch_1: PathBuf,
    pub vibration: PathBuf,
}

impl Default for DevicePaths {
    fn default() -> Self {
        Self {
            torch_0: PathBuf::from(TORCH_1_BRIGHTNESS_PATH),
            torch_1: PathBuf::from(TORCH_2_BRIGHTNESS_PATH),
            vibration: PathBuf::from(VIBRATION_STRENGTH_PATH),
        }
    }
}

impl DevicePaths {
    /// Rebase the stock node paths under `root`.
    ///
    /// `/sys/devices/...` becomes `<root>/sys/devices/...`, which lets the
    /// whole node tree be emulated in a scratch directory.
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        let rebase = |path: &str| root.join(path.trim_start_matches('/'));
        Self {
            torch_0: rebase(TORCH_1_BRIGHTNESS_PATH),
            torch_1: rebase(TORCH_2_BRIGHTNESS_PATH),
            vibration: rebase(VIBRATION_STRENGTH_PATH),
        }
    }

    /// Stock paths, or paths under `$PARTS_SYSFS_ROOT` when it is set.
    pub fn from_env() -> Self {
        match std::env::var_os(SYSFS_ROOT_ENV) {
            Some(root) if !root.is_empty() => {
                log::debug!("Rebasing device nodes under {:?}", root);
                Self::with_root(root)
            }
            _ => Self::default(),
        }
    }

    pub fn resolve(&self, node: Node) -> &Path {
        match node {
            Node::Torch0 => &self.torch_0,
            Node::Torch1 => &self.torch_1,
            Node::Vibration => &self.vibration,
        }
    }
}

/// Access to device files.
pub trait DeviceNodes {
    fn is_writable(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> Result<String>;

    fn write(&self, path: &Path, value: &str) -> Result<()>;
}

/// [`DeviceNodes`] on the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysfsNodes;

impl DeviceNodes for SysfsNodes {
    fn is_writable(&self, path: &Path) -> bool {
        match access(path, Access::WRITE_OK) {
            Ok(()) => true,
            Err(errno) => {
                log::debug!("{} is not writable: {}", path.display(), errno);
                false
            }
        }
    }

    fn read(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).map_err(Error::new_io)?;
        log::trace!("Read {:?} from {}", content.trim(), path.display());
        Ok(content.trim().to_owned())
    }

    fn write(&self, path: &Path, value: &str) -> Result<()> {
        log::debug!("Writing {:?} to {}", value, path.display());
        fs::write(path, value).map_err(Error::new_io)
    }
}

impl<T: DeviceNodes + ?Sized> DeviceNodes for Rc<T> {
    fn is_writable(&self, path: &Path) -> bool {
        (**self).is_writable(path)
    }

    fn read(&self, path: &Path) -> Result<String> {
        (**self).read(path)
    }

    fn write(&self, path: &Path, value: &str) -> Result<()> {
        (**self).write(path, value)
    }
}

/// Parse the leading integer of a node's content (`"1856.0"` reads as 1856).
pub fn parse_node_int(content: &str) -> Result<i32> {
    let trimmed = content.trim();
    let numeric: &str = match trimmed.find(|c: char| c != '-' && !c.is_ascii_digit()) {
        Some(end) => &trimmed[..end],
        None => trimmed,
    };
    Ok(numeric.parse()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebased_paths() {
        let paths = DevicePaths::with_root("/tmp/emu");
        assert_eq!(
            paths.vibration,
            PathBuf::from("/tmp/emu/sys/devices/virtual/timed_output/vibrator/vtg_level")
        );
        assert!(paths.torch_0.ends_with("led:torch_0/max_brightness"));
        assert!(paths.torch_1.ends_with("led:torch_1/max_brightness"));
        assert_eq!(paths.resolve(Node::Torch1), paths.torch_1.as_path());
    }

    #[test]
    fn test_parse_node_int() {
        assert_eq!(parse_node_int("200\n").unwrap(), 200);
        assert_eq!(parse_node_int("1856.0").unwrap(), 1856);
        assert_eq!(parse_node_int("-3").unwrap(), -3);
        assert!(parse_node_int("abc").is_err());
        assert!(parse_node_int("").is_err());
    }

    #[test]
    fn test_sysfs_nodes_missing_file() {
        let nodes = SysfsNodes;
        let missing = Path::new("/nonexistent/xiaomiparts/node");
        assert!(!nodes.is_writable(missing));
        assert!(nodes.read(missing).is_err());
        assert!(nodes.write(missing, "1").is_err());
    }
}
