use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::contract::Domain;
use crate::download::DownloadConfig;

/// Everything the core pipeline needs for one run. Output location is the
/// publisher's business and is not part of this struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynchroniseConfig {
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub discover: DiscoverConfig,
    #[serde(default)]
    pub classify: ClassifyConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl SynchroniseConfig {
    pub fn trace_loaded(&self) {
        info!(
            sources_dir = %self.download.sources_dir.display(),
            sources_count = self.download.sources.len(),
            offline = self.download.offline,
            default_domain = %self.classify.default_domain,
            strict_validation = self.validation.strict,
            "Loaded SynchroniseConfig"
        );
        debug!(?self, "SynchroniseConfig loaded (full debug)");
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoverConfig {
    /// Extra glob patterns, matched against the path inside each source.
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyConfig {
    #[serde(default = "default_domain")]
    pub default_domain: Domain,
    /// Added to (or overriding) the built-in repository table.
    #[serde(default)]
    pub repo_domains: BTreeMap<String, Domain>,
}

fn default_domain() -> Domain {
    Domain::Primitives
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            default_domain: default_domain(),
            repo_domains: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Abort before publishing when validation fails.
    #[serde(default)]
    pub strict: bool,
}
