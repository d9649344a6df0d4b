// Copyright 2024 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! Audio enhancer (Dirac) companion service access.
//!
//! The service is not guaranteed to be running when the parts screen opens.
//! [`EnhancerConnector::ready`] hides that: it returns a connected handle,
//! starting the service and reconnecting exactly once when the first attempt
//! finds nothing.

use std::rc::Rc;

use crate::errors::*;

/// Control surface of the running enhancer service.
pub trait AudioEnhancer {
    fn is_enabled(&self) -> Result<bool>;

    fn set_enabled(&self, enabled: bool) -> Result<()>;

    fn set_headset_type(&self, headset_type: i32) -> Result<()>;

    fn set_level(&self, level: &str) -> Result<()>;
}

/// Finds and starts the enhancer service.
pub trait EnhancerLauncher {
    /// Handle to the running service, `None` if it is not running.
    fn connect(&self) -> Option<Rc<dyn AudioEnhancer>>;

    /// Ask the host to start the service. Returns once the start request has
    /// been delivered.
    fn start(&self) -> Result<()>;
}

pub struct EnhancerConnector {
    launcher: Box<dyn EnhancerLauncher>,
}

impl EnhancerConnector {
    pub fn new(launcher: Box<dyn EnhancerLauncher>) -> Self {
        Self { launcher }
    }

    /// Connect to the service, starting it first if it is not running.
    ///
    /// # Errors
    ///
    /// [`Error::ServiceUnavailable`] when the service is still unreachable
    /// after one start request, or the start request's own error.
    pub fn ready(&self) -> Result<Rc<dyn AudioEnhancer>> {
        if let Some(service) = self.launcher.connect() {
            return Ok(service);
        }

        log::info!("Enhancer service not running, starting it");
        self.launcher.start()?;

        self.launcher.connect().ok_or_else(|| {
            log::error!("Enhancer service still unreachable after start");
            Error::new_service_unavailable("audio enhancer did not come up".to_owned())
        })
    }
}

impl std::fmt::Debug for EnhancerConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnhancerConnector").finish_non_exhaustive()
    }
}
