// Copyright 2024 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fs::{create_dir_all, remove_dir_all};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use xiaomiparts::{
    AudioEnhancer, Backends, DeviceNodes, DevicePaths, EnhancerConnector, EnhancerLauncher,
    Error, InstalledPackages, MemoryPreferences, MemoryPropertyStore, Result,
};

pub fn enable_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A scratch directory removed on drop.
pub struct ScratchDir {
    pub path: PathBuf,
}

impl ScratchDir {
    pub fn new(name: &str) -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let path = std::env::temp_dir().join(format!(
            "xiaomiparts-{}-{}-{}",
            name,
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        remove_dir_all(&path).unwrap_or_default();
        create_dir_all(&path).expect("Failed to create scratch directory");
        Self { path }
    }

    /// Create the stock node tree under this directory with the given
    /// initial contents.
    pub fn device_tree(&self, torch: &str, vibration: &str) -> DevicePaths {
        let paths = DevicePaths::with_root(&self.path);
        for (path, content) in [
            (&paths.torch_0, torch),
            (&paths.torch_1, torch),
            (&paths.vibration, vibration),
        ] {
            create_dir_all(path.parent().expect("node has a parent"))
                .expect("Failed to create node directory");
            std::fs::write(path, content).expect("Failed to create node");
        }
        paths
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        remove_dir_all(&self.path).unwrap_or_default();
    }
}

/// In-memory device nodes that record every write attempt.
#[derive(Default)]
pub struct RecordingNodes {
    contents: RefCell<HashMap<PathBuf, String>>,
    read_only: HashSet<PathBuf>,
    failing: HashSet<PathBuf>,
    writes: RefCell<Vec<(PathBuf, String)>>,
}

impl RecordingNodes {
    pub fn new(paths: &DevicePaths) -> Self {
        let nodes = Self::default();
        for path in [&paths.torch_0, &paths.torch_1, &paths.vibration] {
            nodes.contents.borrow_mut().insert(path.clone(), String::new());
        }
        nodes
    }

    pub fn with_content(self, path: &Path, content: &str) -> Self {
        self.contents
            .borrow_mut()
            .insert(path.to_path_buf(), content.to_owned());
        self
    }

    /// Reported as not writable.
    pub fn read_only(mut self, path: &Path) -> Self {
        self.read_only.insert(path.to_path_buf());
        self
    }

    /// Reported writable, but every write fails.
    pub fn failing(mut self, path: &Path) -> Self {
        self.failing.insert(path.to_path_buf());
        self
    }

    pub fn writes(&self) -> Vec<(PathBuf, String)> {
        self.writes.borrow().clone()
    }
}

impl DeviceNodes for RecordingNodes {
    fn is_writable(&self, path: &Path) -> bool {
        self.contents.borrow().contains_key(path) && !self.read_only.contains(path)
    }

    fn read(&self, path: &Path) -> Result<String> {
        self.contents
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::new_parse(format!("no node at {}", path.display())))
    }

    fn write(&self, path: &Path, value: &str) -> Result<()> {
        self.writes
            .borrow_mut()
            .push((path.to_path_buf(), value.to_owned()));
        if self.failing.contains(path) {
            return Err(Error::new_io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "write refused",
            )));
        }
        self.contents
            .borrow_mut()
            .insert(path.to_path_buf(), value.to_owned());
        Ok(())
    }
}

/// Enhancer service that records the calls it receives.
#[derive(Default)]
pub struct FakeEnhancer {
    pub enabled: Cell<bool>,
    pub headset_types: RefCell<Vec<i32>>,
    pub levels: RefCell<Vec<String>>,
}

impl AudioEnhancer for FakeEnhancer {
    fn is_enabled(&self) -> Result<bool> {
        Ok(self.enabled.get())
    }

    fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.enabled.set(enabled);
        Ok(())
    }

    fn set_headset_type(&self, headset_type: i32) -> Result<()> {
        self.headset_types.borrow_mut().push(headset_type);
        Ok(())
    }

    fn set_level(&self, level: &str) -> Result<()> {
        self.levels.borrow_mut().push(level.to_owned());
        Ok(())
    }
}

/// Launcher whose service only becomes reachable once `starts` reaches
/// `starts_needed`.
pub struct FakeLauncher {
    pub service: Rc<FakeEnhancer>,
    pub starts_needed: Rc<Cell<usize>>,
    pub starts: Rc<Cell<usize>>,
    pub connects: Rc<Cell<usize>>,
}

impl EnhancerLauncher for FakeLauncher {
    fn connect(&self) -> Option<Rc<dyn AudioEnhancer>> {
        self.connects.set(self.connects.get() + 1);
        if self.starts.get() >= self.starts_needed.get() {
            Some(self.service.clone() as Rc<dyn AudioEnhancer>)
        } else {
            None
        }
    }

    fn start(&self) -> Result<()> {
        self.starts.set(self.starts.get() + 1);
        Ok(())
    }
}

/// Handles the tests keep after the backends move into the controller.
pub struct Handles {
    pub properties: Rc<MemoryPropertyStore>,
    pub nodes: Rc<RecordingNodes>,
    pub preferences: Rc<MemoryPreferences>,
    pub service: Rc<FakeEnhancer>,
    pub starts: Rc<Cell<usize>>,
    pub connects: Rc<Cell<usize>>,
    pub starts_needed: Rc<Cell<usize>>,
    pub paths: DevicePaths,
}

impl Handles {
    /// Stop the enhancer service. It comes back after `starts_to_recover`
    /// further start requests.
    pub fn stop_service(&self, starts_to_recover: usize) {
        self.starts_needed.set(self.starts.get() + starts_to_recover);
    }
}

pub struct Fixture {
    pub properties: MemoryPropertyStore,
    pub nodes: Option<RecordingNodes>,
    pub packages: Vec<&'static str>,
    pub enhancer_enabled: bool,
    pub starts_needed: usize,
    pub with_enhancer: bool,
    pub paths: DevicePaths,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            properties: MemoryPropertyStore::new(),
            nodes: None,
            packages: vec![
                xiaomiparts::schema::DEVICE_DOZE_PACKAGE_NAME,
                xiaomiparts::schema::DEVICE_KCAL_PACKAGE_NAME,
            ],
            enhancer_enabled: false,
            starts_needed: 0,
            with_enhancer: true,
            paths: DevicePaths::with_root("/emulated"),
        }
    }
}

impl Fixture {
    pub fn build(self) -> (Backends, Handles) {
        enable_logger();

        let properties = Rc::new(self.properties);
        let nodes = Rc::new(
            self.nodes
                .unwrap_or_else(|| RecordingNodes::new(&self.paths)),
        );
        let preferences = Rc::new(MemoryPreferences::new());
        let service = Rc::new(FakeEnhancer::default());
        service.enabled.set(self.enhancer_enabled);
        let starts = Rc::new(Cell::new(0));
        let connects = Rc::new(Cell::new(0));
        let starts_needed = Rc::new(Cell::new(self.starts_needed));

        let enhancer = self.with_enhancer.then(|| {
            EnhancerConnector::new(Box::new(FakeLauncher {
                service: service.clone(),
                starts_needed: starts_needed.clone(),
                starts: starts.clone(),
                connects: connects.clone(),
            }))
        });

        let backends = Backends {
            properties: Box::new(properties.clone()),
            nodes: Box::new(nodes.clone()),
            paths: self.paths.clone(),
            packages: Box::new(InstalledPackages::new(self.packages)),
            preferences: Box::new(preferences.clone()),
            enhancer,
        };

        let handles = Handles {
            properties,
            nodes,
            preferences,
            service,
            starts,
            connects,
            starts_needed,
            paths: self.paths,
        };
        (backends, handles)
    }
}
