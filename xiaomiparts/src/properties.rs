// Copyright 2024 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use crate::errors::*;
use crate::schema::parse_bool;

/// Key-value access to system properties.
pub trait PropertyStore {
    /// Value of the property, `None` when it is unset or unreadable.
    fn get(&self, name: &str) -> Option<String>;

    fn set(&self, name: &str, value: &str) -> Result<()>;

    fn get_or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_owned())
    }

    /// Boolean property with the Android truthy/falsy convention.
    fn get_bool(&self, name: &str, default: bool) -> bool {
        self.get(name)
            .and_then(|value| parse_bool(&value))
            .unwrap_or(default)
    }
}

/// The device property area, read through the shared memory map and written
/// through the property service socket.
#[derive(Debug)]
pub struct SystemPropertyStore {
    properties_dir: PathBuf,
}

impl SystemPropertyStore {
    /// `properties_dir` must be the directory the property system was
    /// initialised with (see [`crate::init`]).
    pub fn new<P: Into<PathBuf>>(properties_dir: P) -> Self {
        Self {
            properties_dir: properties_dir.into(),
        }
    }

    // Reading from a missing area would abort the process.
    fn area_available(&self) -> bool {
        self.properties_dir.join("property_info").exists()
    }
}

impl PropertyStore for SystemPropertyStore {
    fn get(&self, name: &str) -> Option<String> {
        if !self.area_available() {
            log::debug!(
                "No property area under {:?}, '{}' reads as unset",
                self.properties_dir,
                name
            );
            return None;
        }
        let value: String = rsproperties::get_or(name, String::new());
        log::trace!("Property '{}' = '{}'", name, value);
        set_value(value)
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        log::info!("Setting property '{}' = '{}'", name, value);
        rsproperties::set(name, value)?;
        Ok(())
    }
}

// Unset properties read back as empty.
fn set_value(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Process-local property store.
#[derive(Debug, Default)]
pub struct MemoryPropertyStore {
    values: RefCell<HashMap<String, String>>,
    writes: RefCell<Vec<(String, String)>>,
}

impl MemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: RefCell::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            writes: RefCell::new(Vec::new()),
        }
    }

    /// Every `(name, value)` passed to `set`, in order.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.borrow().clone()
    }
}

impl PropertyStore for MemoryPropertyStore {
    fn get(&self, name: &str) -> Option<String> {
        self.values.borrow().get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        log::info!("Setting property '{}' = '{}'", name, value);
        self.writes
            .borrow_mut()
            .push((name.to_owned(), value.to_owned()));
        self.values
            .borrow_mut()
            .insert(name.to_owned(), value.to_owned());
        Ok(())
    }
}

impl<T: PropertyStore + ?Sized> PropertyStore for Rc<T> {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        (**self).set(name, value)
    }
}
