//! Per-environment service registry over compose files.
//!
//! Every environment maps to one compose document on disk plus an in-memory
//! mirror of its `services:` map. Reads are served from the mirror; every
//! mutation re-reads the document, applies the change, writes it back, and
//! refreshes the mirror, so external edits between calls are picked up.
//! A per-environment mutex keeps one read-mutate-write cycle from
//! interleaving with another inside this process; the outcome under
//! sequential calls is unchanged (last write wins).

use crate::compose::{ComposeDoc, ServiceDefinition, ServiceMap};
use crate::config::FleetConfig;
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

// ---------------------------------------------------------------------------
// EnvSelector
// ---------------------------------------------------------------------------

/// Which environments an operation targets: one, every configured one, or an
/// explicit list.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvSelector {
    One(String),
    All,
    Many(Vec<String>),
}

impl EnvSelector {
    /// Parse CLI text: `all`, a single name, or a comma-separated list.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text == "all" {
            return Self::All;
        }
        if text.contains(',') {
            return Self::Many(
                text.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            );
        }
        Self::One(text.to_string())
    }
}

// ---------------------------------------------------------------------------
// Outcome / FanOut
// ---------------------------------------------------------------------------

/// Disposition of one operation against one environment. Domain failures are
/// values, not errors: only I/O and parse problems surface as `Err`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome<T> {
    Applied(T),
    UnknownEnvironment,
    PreconditionFailed,
}

impl<T> Outcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnvOutcome<T> {
    pub environment: String,
    pub outcome: Outcome<T>,
}

/// Per-environment outcomes of a fanned-out operation.
///
/// `applied()` gives the best-effort view: the successful values only,
/// inapplicable environments silently dropped. The full list stays available
/// for callers that want to know which environments were skipped and why.
#[derive(Debug, Clone, Serialize)]
pub struct FanOut<T> {
    pub outcomes: Vec<EnvOutcome<T>>,
}

impl<T> FanOut<T> {
    pub fn applied(self) -> Vec<T> {
        self.outcomes
            .into_iter()
            .filter_map(|o| o.outcome.applied())
            .collect()
    }
}

/// One `get` hit during selector fan-out.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHit {
    pub environment: String,
    pub definition: ServiceDefinition,
}

// ---------------------------------------------------------------------------
// ServiceRegistry
// ---------------------------------------------------------------------------

struct EnvSlot {
    path: PathBuf,
    mirror: Mutex<ServiceMap>,
}

impl EnvSlot {
    fn lock(&self) -> MutexGuard<'_, ServiceMap> {
        self.mirror.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct ServiceRegistry {
    envs: BTreeMap<String, EnvSlot>,
}

impl ServiceRegistry {
    /// Open the registry over `files` (environment name → compose file).
    ///
    /// Missing files are created from `template` with its services stripped;
    /// a missing template is fatal when any file needs creating. Every file
    /// is then parsed and its service map mirrored in memory.
    pub fn open(files: BTreeMap<String, PathBuf>, template: &Path) -> Result<Self> {
        let mut envs = BTreeMap::new();
        for (name, path) in files {
            if !path.exists() {
                let doc = ComposeDoc::from_template(template)?;
                doc.save(&path)?;
            }
            let doc = ComposeDoc::load(&path)?;
            envs.insert(
                name,
                EnvSlot {
                    path,
                    mirror: Mutex::new(doc.services),
                },
            );
        }
        Ok(Self { envs })
    }

    pub fn from_config(root: &Path, cfg: &FleetConfig) -> Result<Self> {
        Self::open(cfg.environment_files(root), &cfg.template_path(root))
    }

    pub fn environments(&self) -> Vec<&str> {
        self.envs.keys().map(String::as_str).collect()
    }

    /// Backing compose file for an environment, if it is configured.
    pub fn compose_path(&self, env: &str) -> Option<&Path> {
        self.envs.get(env).map(|slot| slot.path.as_path())
    }

    fn resolve(&self, selector: &EnvSelector) -> Vec<String> {
        match selector {
            EnvSelector::All => self.envs.keys().cloned().collect(),
            EnvSelector::One(name) => vec![name.clone()],
            EnvSelector::Many(names) => names.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Reads (served from the mirror)
    // -----------------------------------------------------------------------

    /// Copy of one environment's service map, `None` for an unknown
    /// environment.
    pub fn find_one(&self, env: &str) -> Option<ServiceMap> {
        self.envs.get(env).map(|slot| slot.lock().clone())
    }

    /// Service maps for every resolved, known environment, keyed by
    /// environment name. Unknown names are omitted.
    pub fn find(&self, selector: &EnvSelector) -> BTreeMap<String, ServiceMap> {
        self.resolve(selector)
            .into_iter()
            .filter_map(|env| self.find_one(&env).map(|map| (env, map)))
            .collect()
    }

    /// Copy of one service's definition, `None` if the environment or the
    /// service is absent.
    pub fn get_one(&self, service: &str, env: &str) -> Option<ServiceDefinition> {
        self.envs
            .get(env)
            .and_then(|slot| slot.lock().get(service).cloned())
    }

    /// Every environment in which `service` is defined, in selector order.
    pub fn get(&self, service: &str, selector: &EnvSelector) -> Vec<ServiceHit> {
        self.resolve(selector)
            .into_iter()
            .filter_map(|env| {
                self.get_one(service, &env).map(|definition| ServiceHit {
                    environment: env,
                    definition,
                })
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Mutations (read-mutate-write per call)
    // -----------------------------------------------------------------------

    /// One guarded read-mutate-write cycle against a single environment.
    /// The closure sees the freshly re-read service map and returns the
    /// value to report, or `None` for a precondition failure (in which case
    /// nothing is written).
    fn mutate_one<F>(&self, env: &str, mutate: F) -> Result<Outcome<ServiceDefinition>>
    where
        F: FnOnce(&mut ServiceMap) -> Option<ServiceDefinition>,
    {
        let Some(slot) = self.envs.get(env) else {
            return Ok(Outcome::UnknownEnvironment);
        };
        let mut mirror = slot.lock();
        let mut doc = ComposeDoc::load(&slot.path)?;
        let Some(value) = mutate(&mut doc.services) else {
            // Still refresh the mirror: the re-read may have picked up
            // external edits even though we wrote nothing.
            *mirror = doc.services;
            return Ok(Outcome::PreconditionFailed);
        };
        doc.save(&slot.path)?;
        *mirror = doc.services;
        Ok(Outcome::Applied(value))
    }

    fn fan_out<F>(&self, selector: &EnvSelector, mut op: F) -> Result<FanOut<ServiceDefinition>>
    where
        F: FnMut(&str) -> Result<Outcome<ServiceDefinition>>,
    {
        let mut outcomes = Vec::new();
        for env in self.resolve(selector) {
            let outcome = op(&env)?;
            outcomes.push(EnvOutcome {
                environment: env,
                outcome,
            });
        }
        Ok(FanOut { outcomes })
    }

    /// Insert a new service. Fails the precondition if it already exists.
    pub fn create_one(
        &self,
        service: &str,
        definition: &ServiceDefinition,
        env: &str,
    ) -> Result<Outcome<ServiceDefinition>> {
        self.mutate_one(env, |services| {
            if services.contains_key(service) {
                return None;
            }
            services.insert(service.to_string(), definition.clone());
            Some(definition.clone())
        })
    }

    pub fn create(
        &self,
        service: &str,
        definition: &ServiceDefinition,
        selector: &EnvSelector,
    ) -> Result<FanOut<ServiceDefinition>> {
        self.fan_out(selector, |env| self.create_one(service, definition, env))
    }

    /// Replace an existing service wholesale. Fails the precondition if it
    /// does not exist.
    pub fn update_one(
        &self,
        service: &str,
        definition: &ServiceDefinition,
        env: &str,
    ) -> Result<Outcome<ServiceDefinition>> {
        self.mutate_one(env, |services| {
            if !services.contains_key(service) {
                return None;
            }
            services.insert(service.to_string(), definition.clone());
            Some(definition.clone())
        })
    }

    pub fn update(
        &self,
        service: &str,
        definition: &ServiceDefinition,
        selector: &EnvSelector,
    ) -> Result<FanOut<ServiceDefinition>> {
        self.fan_out(selector, |env| self.update_one(service, definition, env))
    }

    /// Upsert: insert or replace, no existence precondition.
    pub fn put_one(
        &self,
        service: &str,
        definition: &ServiceDefinition,
        env: &str,
    ) -> Result<Outcome<ServiceDefinition>> {
        self.mutate_one(env, |services| {
            services.insert(service.to_string(), definition.clone());
            Some(definition.clone())
        })
    }

    pub fn put(
        &self,
        service: &str,
        definition: &ServiceDefinition,
        selector: &EnvSelector,
    ) -> Result<FanOut<ServiceDefinition>> {
        self.fan_out(selector, |env| self.put_one(service, definition, env))
    }

    /// Remove a service, returning its pre-delete definition.
    pub fn delete_one(&self, service: &str, env: &str) -> Result<Outcome<ServiceDefinition>> {
        self.mutate_one(env, |services| services.remove(service))
    }

    pub fn delete(
        &self,
        service: &str,
        selector: &EnvSelector,
    ) -> Result<FanOut<ServiceDefinition>> {
        self.fan_out(selector, |env| self.delete_one(service, env))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
