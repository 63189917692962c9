use crate::error::{FleetError, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Service name → definition, as stored under the compose `services:` key.
pub type ServiceMap = BTreeMap<String, ServiceDefinition>;

// ---------------------------------------------------------------------------
// ServiceDefinition
// ---------------------------------------------------------------------------

/// One entry in a compose `services:` map.
///
/// The registry treats definitions as opaque values: the named fields exist
/// only so scaffolding code can read an image name or a build remote, and
/// anything else round-trips through `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ServiceDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

// ---------------------------------------------------------------------------
// ComposeDoc
// ---------------------------------------------------------------------------

/// A parsed compose file: the `services:` map plus every other top-level
/// field preserved verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ComposeDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub services: ServiceMap,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ComposeDoc {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let doc: ComposeDoc = serde_yaml::from_str(&data)?;
        Ok(doc)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    /// Load the template document with its predefined services stripped.
    /// This is the initial shape for any environment file that does not
    /// exist yet.
    pub fn from_template(template: &Path) -> Result<Self> {
        if !template.exists() {
            return Err(FleetError::TemplateMissing(template.to_path_buf()));
        }
        let mut doc = Self::load(template)?;
        doc.services.clear();
        Ok(doc)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
