// Copyright 2024 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! Host-persisted control state.
//!
//! Some controls (the fingerprint gesture switches, the chosen enhancer
//! preset) have no system-side backing value; the settings host keeps them.
//! [`FilePreferences`] stores them as `key=value` lines in the same format as
//! a `build.prop` file.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::warn;

use crate::errors::*;

pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: RefCell<BTreeMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Preferences backed by a `key=value` file, rewritten on every change.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: RefCell<BTreeMap<String, String>>,
}

impl FilePreferences {
    /// Open `path`, starting empty if it does not exist yet.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        let values = match File::open(&path) {
            Ok(file) => parse_preferences(BufReader::new(file), &path)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No preferences at {:?}, starting empty", path);
                BTreeMap::new()
            }
            Err(e) => return Err(Error::new_io(e)),
        };

        Ok(Self {
            path,
            values: RefCell::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let mut content = String::new();
        for (key, value) in self.values.borrow().iter() {
            content.push_str(key);
            content.push('=');
            content.push_str(value);
            content.push('\n');
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(Error::new_io)?;
            }
        }
        fs::write(&self.path, content).map_err(Error::new_io)
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        self.flush()
    }
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for Rc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

fn parse_preferences<R: BufRead>(reader: R, origin: &Path) -> Result<BTreeMap<String, String>> {
    let mut values = BTreeMap::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(Error::from)?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (key, value) = match line.find('=') {
            Some(pos) => (line[..pos].trim(), line[pos + 1..].trim()),
            None => {
                warn!("Line {}: Ignoring malformed entry in {:?}: {}", index + 1, origin, line);
                continue;
            }
        };

        if let Some(old_value) = values.insert(key.to_string(), value.to_string()) {
            warn!(
                "Line {}: Overriding previous preference '{}':'{}' with new value '{}'",
                index + 1,
                key,
                old_value,
                value
            );
        }
    }

    Ok(values)
}
