// Copyright 2024 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;
use std::process::Command;

/// Answers whether a companion app package is installed.
pub trait PackageProbe {
    fn is_installed(&self, package: &str) -> bool;
}

/// Asks the package manager through `pm path <package>`.
///
/// `pm` prints `package:<apk path>` and exits with 0 only for installed
/// packages. Any failure to run it counts as not installed.
#[derive(Debug, Clone)]
pub struct PackageManagerProbe {
    program: String,
}

impl Default for PackageManagerProbe {
    fn default() -> Self {
        Self {
            program: "pm".to_owned(),
        }
    }
}

impl PackageManagerProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another executable in place of `pm`.
    pub fn with_program<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl PackageProbe for PackageManagerProbe {
    fn is_installed(&self, package: &str) -> bool {
        let output = Command::new(&self.program).arg("path").arg(package).output();

        match output {
            Ok(out) if out.status.success() => {
                let stdout = String::from_utf8_lossy(&out.stdout);
                let installed = stdout.lines().any(|line| line.starts_with("package:"));
                log::debug!("Package {} installed: {}", package, installed);
                installed
            }
            Ok(out) => {
                log::debug!(
                    "'{} path {}' failed: {}",
                    self.program,
                    package,
                    String::from_utf8_lossy(&out.stderr).trim()
                );
                false
            }
            Err(e) => {
                log::warn!("Failed to execute '{}': {}", self.program, e);
                false
            }
        }
    }
}

/// A fixed set of installed packages.
#[derive(Debug, Default, Clone)]
pub struct InstalledPackages {
    packages: HashSet<String>,
}

impl InstalledPackages {
    pub fn new<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            packages: packages.into_iter().map(Into::into).collect(),
        }
    }
}

impl PackageProbe for InstalledPackages {
    fn is_installed(&self, package: &str) -> bool {
        self.packages.contains(package)
    }
}
