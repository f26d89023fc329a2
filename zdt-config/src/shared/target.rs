use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// A host exposed through the mesh ingress that should keep serving during a disruption.
///
/// Can be written either as a plain host, which probes `/`, or as a `host`/`path` map. The plain
/// form is what list overrides like `APP_TARGETS=a.local,b.local` produce.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "RawTargetConfig")]
pub struct TargetConfig {
    /// Value of the `Host` header the probe sends.
    pub host: String,
    /// Path requested on the host.
    pub path: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTargetConfig {
    Host(String),
    Full {
        host: String,
        #[serde(default = "default_path")]
        path: String,
    },
}

fn default_path() -> String {
    "/".to_string()
}

impl From<RawTargetConfig> for TargetConfig {
    fn from(raw: RawTargetConfig) -> Self {
        match raw {
            RawTargetConfig::Host(host) => Self::from(host),
            RawTargetConfig::Full { host, path } => Self { host, path },
        }
    }
}

impl From<String> for TargetConfig {
    fn from(host: String) -> Self {
        Self {
            host,
            path: default_path(),
        }
    }
}

impl From<&str> for TargetConfig {
    fn from(host: &str) -> Self {
        Self::from(host.to_string())
    }
}

impl TargetConfig {
    /// Returns the path without leading slashes, ready to be appended to an address.
    pub fn trimmed_path(&self) -> &str {
        self.path.trim_start_matches('/')
    }

    /// Validates the [`TargetConfig`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.host.trim().is_empty() {
            return Err(ValidationError::EmptyTargetHost);
        }

        Ok(())
    }
}
