// Copyright 2024 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! `parts` - device parts settings from the command line
//!
//! Lists the parts controls with their current state, and applies changes
//! the same way the settings screen does.
//!
//! Usage:
//!   parts list
//!   parts get <control>
//!   parts set <control> <value>
//!
//! Examples:
//!   parts set hal3 true                        # Enable the Camera2 API
//!   parts set vibration_strength 50            # Half vibration strength
//!   parts --sysfs-root ./emu set torch_brightness 300

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use xiaomiparts::{ControlKey, ControlState, PartsConfig, SettingsSyncController, Value};

#[derive(Parser, Debug)]
#[command(name = "parts")]
#[command(about = "Device parts settings")]
#[command(
    long_about = "Reads and changes the device parts controls.\nChanges are written to system properties and sysfs nodes."
)]
struct Args {
    /// Custom properties directory
    #[arg(long, help = "Custom properties directory")]
    properties_dir: Option<std::path::PathBuf>,

    /// Custom socket directory
    #[arg(long, help = "Custom socket directory")]
    socket_dir: Option<std::path::PathBuf>,

    /// Root the sysfs nodes are rebased under
    #[arg(long, help = "Root directory for emulated sysfs nodes")]
    sysfs_root: Option<std::path::PathBuf>,

    /// Preferences file
    #[arg(long, help = "File holding host-persisted preferences")]
    prefs: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every control
    List,
    /// Show one control
    Get {
        #[arg(help = "Control key, e.g. hal3 or vibration_strength")]
        control: String,
    },
    /// Change a control
    Set {
        #[arg(help = "Control key, e.g. hal3 or vibration_strength")]
        control: String,
        #[arg(help = "New value")]
        value: String,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = PartsConfig {
        properties_dir: args.properties_dir,
        socket_dir: args.socket_dir,
        sysfs_root: args.sysfs_root,
        preferences_file: args.prefs,
    };

    // The enhancer service is only reachable from inside the settings app.
    let backends = xiaomiparts::system_backends(&config, None)?;
    let mut controller = SettingsSyncController::load(backends)?;

    match args.command {
        Command::List => {
            for (key, state) in controller.controls() {
                print_control(key, state);
            }
        }
        Command::Get { control } => {
            let key: ControlKey = control.parse()?;
            match controller.control(key) {
                Some(state) => print_control(key, state),
                None => bail!("'{key}' is not available on this device"),
            }
        }
        Command::Set { control, value } => {
            let key: ControlKey = control.parse()?;
            let value = Value::parse_for(key.control().kind, &value)
                .with_context(|| format!("Invalid value for '{key}'"))?;

            if !controller.on_change(key, value.clone())? {
                bail!("'{key}' did not accept '{value}'");
            }
            println!("{key} set to {value}");
        }
    }

    Ok(())
}

fn print_control(key: ControlKey, state: &ControlState) {
    let control = key.control();
    let value = state
        .value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_owned());

    let mut line = format!("{:<20} {:<12} {:<16}", key.as_str(), control.category.as_str(), value);
    if let Some(summary) = &state.summary {
        line.push_str(&format!(" ({summary})"));
    }
    if !state.enabled {
        line.push_str(" [disabled]");
    }
    println!("{line}  # {}", control.title);
}
