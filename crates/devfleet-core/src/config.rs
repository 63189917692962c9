use crate::error::{FleetError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ScaffoldDefaults
// ---------------------------------------------------------------------------

/// Defaults applied when wiring a service into the develop environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaffoldDefaults {
    /// First port handed out; each scaffolded service gets the next one.
    #[serde(default = "default_base_port")]
    pub base_port: u16,
    #[serde(default = "default_dev_command")]
    pub dev_command: String,
    #[serde(default = "default_install_command")]
    pub install_command: String,
}

fn default_base_port() -> u16 {
    3030
}

fn default_dev_command() -> String {
    "npm run dev".to_string()
}

fn default_install_command() -> String {
    "npm install".to_string()
}

impl Default for ScaffoldDefaults {
    fn default() -> Self {
        Self {
            base_port: default_base_port(),
            dev_command: default_dev_command(),
            install_command: default_install_command(),
        }
    }
}

// ---------------------------------------------------------------------------
// FleetConfig (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    pub project: String,
    /// Environment name → compose file, relative to the project root.
    #[serde(default = "default_environments")]
    pub environments: BTreeMap<String, PathBuf>,
    #[serde(default = "default_template")]
    pub template: PathBuf,
    #[serde(default = "default_dockerfile_template")]
    pub dockerfile_template: PathBuf,
    #[serde(default = "default_repos_dir")]
    pub repos_dir: PathBuf,
    #[serde(default)]
    pub scaffold: ScaffoldDefaults,
}

fn default_environments() -> BTreeMap<String, PathBuf> {
    let mut envs = BTreeMap::new();
    envs.insert("default".to_string(), PathBuf::from(paths::COMPOSE_DEFAULT));
    envs.insert("develop".to_string(), PathBuf::from(paths::COMPOSE_DEVELOP));
    envs.insert("stage".to_string(), PathBuf::from(paths::COMPOSE_STAGE));
    envs.insert(
        "production".to_string(),
        PathBuf::from(paths::COMPOSE_PRODUCTION),
    );
    envs
}

fn default_template() -> PathBuf {
    PathBuf::from(paths::COMPOSE_TEMPLATE)
}

fn default_dockerfile_template() -> PathBuf {
    PathBuf::from(paths::DOCKERFILE_TEMPLATE)
}

fn default_repos_dir() -> PathBuf {
    PathBuf::from(paths::REPOS_DIR)
}

impl FleetConfig {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            environments: default_environments(),
            template: default_template(),
            dockerfile_template: default_dockerfile_template(),
            repos_dir: default_repos_dir(),
            scaffold: ScaffoldDefaults::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(FleetError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: FleetConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Environment → compose file, resolved against the project root.
    pub fn environment_files(&self, root: &Path) -> BTreeMap<String, PathBuf> {
        self.environments
            .iter()
            .map(|(name, file)| (name.clone(), root.join(file)))
            .collect()
    }

    pub fn template_path(&self, root: &Path) -> PathBuf {
        root.join(&self.template)
    }

    pub fn dockerfile_template_path(&self, root: &Path) -> PathBuf {
        root.join(&self.dockerfile_template)
    }

    pub fn repos_path(&self, root: &Path) -> PathBuf {
        root.join(&self.repos_dir)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
