use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use zdt_config::shared::{ProbeConfig, TargetConfig};

use crate::bail;
use crate::error::{ErrorKind, ZdtResult};
use crate::probe::ProbeFactory;
use crate::test_utils::probe::ScriptedProbe;

/// A [`ProbeFactory`] that hands out preconfigured [`ScriptedProbe`]s by target host.
///
/// Hosts without a probe behave like hosts whose address cannot be resolved. Clones share the
/// record of requested targets.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProbeFactory {
    probes: HashMap<String, ScriptedProbe>,
    requested: Arc<Mutex<Vec<TargetConfig>>>,
}

impl ScriptedProbeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `probe` for `host`. The caller keeps a clone to inspect the calls.
    pub fn with_target(mut self, host: impl Into<String>, probe: ScriptedProbe) -> Self {
        self.probes.insert(host.into(), probe);
        self
    }

    /// Returns every target a probe was requested for, in request order.
    pub fn requested_targets(&self) -> Vec<TargetConfig> {
        self.requested.lock().unwrap().clone()
    }
}

impl ProbeFactory for ScriptedProbeFactory {
    type Probe = ScriptedProbe;

    async fn create(&self, target: &TargetConfig, _config: &ProbeConfig) -> ZdtResult<ScriptedProbe> {
        self.requested.lock().unwrap().push(target.clone());

        let Some(probe) = self.probes.get(&target.host) else {
            bail!(
                ErrorKind::TargetResolutionFailed,
                "No address found for target",
                target.host
            );
        };

        Ok(probe.clone())
    }
}
