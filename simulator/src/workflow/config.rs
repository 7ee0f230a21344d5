use crate::generator::profile::GeneratorConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use tubecore::SessionConfig;

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(bind: Option<SocketAddr>, seed: u64) -> Self {
        Self {
            session: SessionConfig::default(),
            generator: GeneratorConfig {
                seed,
                ..Default::default()
            },
            bind: bind.unwrap_or_else(default_bind),
        }
    }
}
