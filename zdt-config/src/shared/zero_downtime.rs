use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::Config;
use crate::shared::{ProbeConfig, TargetConfig, ValidationError};

/// Configuration of a zero-downtime check.
///
/// Typically deserialized with [`crate::load_config_from`] by the driver that performs the disruptive
/// operation, and handed to the probe runner before the operation starts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ZeroDowntimeConfig {
    /// Probe engine settings applied to every target.
    #[serde(default)]
    pub probe: ProbeConfig,
    /// Targets probed concurrently for the whole disruption window.
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

impl ZeroDowntimeConfig {
    /// Validates the probe settings and every target.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.probe.validate()?;

        let mut hosts = HashSet::new();
        for target in &self.targets {
            target.validate()?;

            if !hosts.insert(target.host.as_str()) {
                return Err(ValidationError::DuplicateTargetHost(target.host.clone()));
            }
        }

        Ok(())
    }
}

impl Config for ZeroDowntimeConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &["targets"];
}
