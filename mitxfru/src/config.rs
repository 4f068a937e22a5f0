// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::{path::PathBuf, time::Duration};

use ::config::{Config, Manager};
use fru::{DecodeOptions, LengthUnit};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

const PROGRAM: &str = "mitxfru";

/// Contents of `eeprom.yaml`, every field optional so files can be layered
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EepromConfig {
    pub device: Option<PathBuf>,
    pub page_size: Option<usize>,
    pub page_delay_ms: Option<u64>,
    pub settle_secs: Option<u64>,
    pub length_unit: Option<Unit>,
    pub retain_unreliable: Option<bool>,
}

impl Config for EepromConfig {
    fn domain() -> String {
        "eeprom".into()
    }

    fn merge(self, other: Self) -> Self {
        Self {
            device: other.device.or(self.device),
            page_size: other.page_size.or(self.page_size),
            page_delay_ms: other.page_delay_ms.or(self.page_delay_ms),
            settle_secs: other.settle_secs.or(self.settle_secs),
            length_unit: other.length_unit.or(self.length_unit),
            retain_unreliable: other.retain_unreliable.or(self.retain_unreliable),
        }
    }
}

/// Unit of the multirecord length byte as spelled in config files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Bytes,
    Blocks,
}

impl From<Unit> for LengthUnit {
    fn from(unit: Unit) -> Self {
        match unit {
            Unit::Bytes => LengthUnit::Bytes,
            Unit::Blocks => LengthUnit::Blocks,
        }
    }
}

/// Resolved settings with defaults filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub device: PathBuf,
    pub page_size: usize,
    pub page_delay: Duration,
    pub settle_secs: u64,
    pub length_unit: LengthUnit,
    pub retain_unreliable: bool,
}

impl Settings {
    pub const DEFAULT_DEVICE: &'static str = "/sys/bus/i2c/devices/1-0053/eeprom";

    /// Merge system, user and `config_dir` configuration, `device` overrides all
    pub fn load(config_dir: Option<&PathBuf>, device: Option<&PathBuf>) -> Self {
        let mut managers = vec![Manager::system("/", PROGRAM)];

        match Manager::user(PROGRAM) {
            Ok(manager) => managers.push(manager),
            Err(error) => debug!("Skipping user config: {error}"),
        }
        managers.extend(config_dir.map(Manager::custom));

        let config = managers
            .iter()
            .filter_map(Manager::load::<EepromConfig>)
            .reduce(EepromConfig::merge)
            .unwrap_or_default();

        let mut settings = Self::from(config);
        if let Some(device) = device {
            settings.device = device.clone();
        }

        debug!("Using {settings:?}");
        settings
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            length_unit: self.length_unit,
            retain_unreliable: self.retain_unreliable,
        }
    }
}

impl From<EepromConfig> for Settings {
    fn from(config: EepromConfig) -> Self {
        let page_size = match config.page_size {
            Some(0) => {
                warn!("Ignoring page_size of 0");
                None
            }
            size => size,
        };

        Self {
            device: config.device.unwrap_or_else(|| PathBuf::from(Self::DEFAULT_DEVICE)),
            page_size: page_size.unwrap_or(32),
            page_delay: Duration::from_millis(config.page_delay_ms.unwrap_or(5)),
            settle_secs: config.settle_secs.unwrap_or(10),
            length_unit: config.length_unit.map(LengthUnit::from).unwrap_or_default(),
            retain_unreliable: config.retain_unreliable.unwrap_or_default(),
        }
    }
}
