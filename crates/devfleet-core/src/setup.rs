//! The environment bootstrap pipeline.
//!
//! Walks every service declared in the `default` environment and runs the
//! enabled scaffolding steps: clone the repository, check out the working
//! branch, install dependencies, seed `.env` and `Dockerfile`, and wire the
//! service into the develop compose file. Steps are best-effort — a failing
//! step is logged, recorded in the report, and the pipeline moves on.

use crate::compose::ServiceDefinition;
use crate::config::FleetConfig;
use crate::error::Result;
use crate::registry::{Outcome, ServiceRegistry};
use crate::{git, io, paths, process};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::warn;

pub const DEFAULT_ENV: &str = "default";
pub const DEVELOP_ENV: &str = "develop";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Which pipeline steps run. All on by default.
#[derive(Debug, Clone)]
pub struct SetupOptions {
    pub clone: bool,
    pub checkout: bool,
    pub install: bool,
    pub copy_env: bool,
    pub dockerfile: bool,
    pub append: bool,
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            clone: true,
            checkout: true,
            install: true,
            copy_env: true,
            dockerfile: true,
            append: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStep {
    Clone,
    Checkout,
    Install,
    CopyEnv,
    Dockerfile,
    Append,
    ProjectEnv,
}

impl SetupStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clone => "clone",
            Self::Checkout => "checkout",
            Self::Install => "install",
            Self::CopyEnv => "copy-env",
            Self::Dockerfile => "dockerfile",
            Self::Append => "append",
            Self::ProjectEnv => "project-env",
        }
    }
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Done,
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub service: String,
    pub step: SetupStep,
    pub status: StepStatus,
}

#[derive(Debug, Default, Serialize)]
pub struct SetupReport {
    pub steps: Vec<StepReport>,
}

impl SetupReport {
    fn record(&mut self, service: &str, step: SetupStep, status: StepStatus) {
        if let StepStatus::Failed(reason) = &status {
            warn!(service, step = %step, reason = %reason, "setup step failed");
        }
        self.steps.push(StepReport {
            service: service.to_string(),
            step,
            status,
        });
    }

    /// Record `result` as done/failed for one step.
    fn record_result(&mut self, service: &str, step: SetupStep, result: Result<()>) {
        let status = match result {
            Ok(()) => StepStatus::Done,
            Err(e) => StepStatus::Failed(e.to_string()),
        };
        self.record(service, step, status);
    }

    pub fn failures(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Failed(_)))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Definition builders
// ---------------------------------------------------------------------------

/// The definition `service add` writes into the default environment.
pub fn default_definition(name: &str, repo: &str) -> ServiceDefinition {
    ServiceDefinition {
        image: Some(name.to_string()),
        build: Some(repo.to_string()),
        networks: vec!["backend".to_string()],
        ..Default::default()
    }
}

/// The development definition wired into the develop environment: build from
/// the local checkout, mount it over the container, expose one port.
pub fn develop_definition(cfg: &FleetConfig, name: &str, port: u16) -> ServiceDefinition {
    let checkout = format!("./{}/{name}", cfg.repos_dir.display());
    ServiceDefinition {
        build: Some(checkout.clone()),
        command: Some(cfg.scaffold.dev_command.clone()),
        ports: vec![format!("{port}:{port}")],
        volumes: vec![format!("{checkout}:/usr/src/app")],
        environment: vec![
            "NODE_ENV=development".to_string(),
            format!("PORT={port}"),
        ],
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub fn run(
    root: &Path,
    cfg: &FleetConfig,
    registry: &ServiceRegistry,
    opts: &SetupOptions,
) -> Result<SetupReport> {
    let mut report = SetupReport::default();

    let services = registry.find_one(DEFAULT_ENV).unwrap_or_default();
    let repos_dir = cfg.repos_path(root);
    io::ensure_dir(&repos_dir)?;
    let dockerfile_template = cfg.dockerfile_template_path(root);

    let mut port = cfg.scaffold.base_port;
    for (name, service) in &services {
        let image = service.image.as_deref().unwrap_or(name);
        let repo_dir = repos_dir.join(image);

        if opts.clone {
            match service.build.as_deref() {
                _ if repo_dir.exists() => report.record(
                    name,
                    SetupStep::Clone,
                    StepStatus::Skipped("already cloned".to_string()),
                ),
                Some(remote) => {
                    report.record_result(name, SetupStep::Clone, git::clone(remote, &repo_dir));
                }
                None => report.record(
                    name,
                    SetupStep::Clone,
                    StepStatus::Skipped("no build remote".to_string()),
                ),
            }
        }

        if opts.checkout {
            if repo_dir.exists() {
                let result = git::fetch(&repo_dir)
                    .and_then(|()| git::checkout_with_fallback(&repo_dir, "develop", "master"))
                    .map(|_| ());
                report.record_result(name, SetupStep::Checkout, result);
            } else {
                report.record(
                    name,
                    SetupStep::Checkout,
                    StepStatus::Skipped("repository not cloned".to_string()),
                );
            }
        }

        if opts.install {
            if repo_dir.exists() {
                report.record_result(
                    name,
                    SetupStep::Install,
                    process::run_line(&repo_dir, &cfg.scaffold.install_command),
                );
            } else {
                report.record(
                    name,
                    SetupStep::Install,
                    StepStatus::Skipped("repository not cloned".to_string()),
                );
            }
        }

        if opts.copy_env {
            let src = repo_dir.join(paths::EXAMPLE_ENV_FILE);
            let dest = repo_dir.join(paths::ENV_FILE);
            let status = match io::copy_if_missing(&src, &dest) {
                Ok(true) => StepStatus::Done,
                Ok(false) if !src.exists() => {
                    StepStatus::Skipped("no example.env".to_string())
                }
                Ok(false) => StepStatus::Skipped(".env already present".to_string()),
                Err(e) => StepStatus::Failed(e.to_string()),
            };
            report.record(name, SetupStep::CopyEnv, status);
        }

        if opts.dockerfile {
            if dockerfile_template.exists() {
                report.record_result(
                    name,
                    SetupStep::Dockerfile,
                    io::copy_overwrite(&dockerfile_template, &repo_dir.join(paths::DOCKERFILE)),
                );
            } else {
                report.record(
                    name,
                    SetupStep::Dockerfile,
                    StepStatus::Skipped("no Dockerfile template".to_string()),
                );
            }
        }

        if opts.append {
            let definition = develop_definition(cfg, image, port);
            let status = match registry.put_one(name, &definition, DEVELOP_ENV) {
                Ok(Outcome::Applied(_)) => StepStatus::Done,
                Ok(_) => StepStatus::Skipped("no develop environment".to_string()),
                Err(e) => StepStatus::Failed(e.to_string()),
            };
            report.record(name, SetupStep::Append, status);
        }

        port += 1;
    }

    // Seed the project-level .env from example.env, once.
    let status = match io::copy_if_missing(
        &root.join(paths::EXAMPLE_ENV_FILE),
        &root.join(paths::ENV_FILE),
    ) {
        Ok(true) => StepStatus::Done,
        Ok(false) => StepStatus::Skipped("nothing to copy".to_string()),
        Err(e) => StepStatus::Failed(e.to_string()),
    };
    report.record(&cfg.project, SetupStep::ProjectEnv, status);

    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
