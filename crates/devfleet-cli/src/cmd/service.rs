use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use devfleet_core::{
    config::FleetConfig,
    paths,
    registry::{EnvSelector, ServiceRegistry},
    setup,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum ServiceSubcommand {
    /// Register a service: wires it into the default environment and a
    /// development definition into develop
    Add {
        /// Service name (dash-case)
        name: String,

        /// Git remote the service builds from
        #[arg(long)]
        repo: String,

        /// Development port
        #[arg(long, default_value_t = 3030)]
        port: u16,
    },

    /// List services per environment
    List {
        /// Environment: a name, a comma-separated list, or 'all'
        #[arg(long, default_value = "default")]
        env: String,
    },

    /// Show a service's definition
    Show {
        name: String,

        /// Environment: a name, a comma-separated list, or 'all'
        #[arg(long, default_value = "default")]
        env: String,
    },

    /// Remove a service
    Remove {
        name: String,

        /// Environment: a name, a comma-separated list, or 'all'
        #[arg(long, default_value = "default")]
        env: String,
    },
}

pub fn run(root: &Path, subcmd: ServiceSubcommand, json: bool) -> anyhow::Result<()> {
    let cfg = FleetConfig::load(root).context("failed to load devfleet.yaml")?;
    let registry =
        ServiceRegistry::from_config(root, &cfg).context("failed to open compose files")?;

    match subcmd {
        ServiceSubcommand::Add { name, repo, port } => {
            add(&cfg, &registry, &name, &repo, port, json)
        }
        ServiceSubcommand::List { env } => list(&registry, &env, json),
        ServiceSubcommand::Show { name, env } => show(&registry, &name, &env, json),
        ServiceSubcommand::Remove { name, env } => remove(&registry, &name, &env, json),
    }
}

fn add(
    cfg: &FleetConfig,
    registry: &ServiceRegistry,
    name: &str,
    repo: &str,
    port: u16,
    json: bool,
) -> anyhow::Result<()> {
    paths::validate_service_name(name)?;
    paths::validate_repo_url(repo)?;

    let default = registry
        .put_one(name, &setup::default_definition(name, repo), setup::DEFAULT_ENV)
        .context("failed to write default environment")?;
    let develop = registry
        .put_one(
            name,
            &setup::develop_definition(cfg, name, port),
            setup::DEVELOP_ENV,
        )
        .context("failed to write develop environment")?;

    if json {
        return print_json(&serde_json::json!({
            "service": name,
            "default": default,
            "develop": develop,
        }));
    }

    for (env, outcome) in [(setup::DEFAULT_ENV, &default), (setup::DEVELOP_ENV, &develop)] {
        if outcome.is_applied() {
            let file = registry
                .compose_path(env)
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            println!("Wrote {name} to {env} ({file})");
        } else {
            println!("Skipped {env}: environment not configured");
        }
    }
    Ok(())
}

fn list(registry: &ServiceRegistry, env: &str, json: bool) -> anyhow::Result<()> {
    let selector = EnvSelector::parse(env);
    let found = registry.find(&selector);

    if json {
        return print_json(&found);
    }

    if found.values().all(|services| services.is_empty()) {
        println!("No services.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = found
        .iter()
        .flat_map(|(env, services)| {
            services.iter().map(move |(name, def)| {
                vec![
                    env.clone(),
                    name.clone(),
                    def.image.clone().unwrap_or_default(),
                    def.ports.join(", "),
                    def.build.clone().unwrap_or_default(),
                ]
            })
        })
        .collect();
    print_table(&["ENV", "SERVICE", "IMAGE", "PORTS", "BUILD"], rows);
    Ok(())
}

fn show(registry: &ServiceRegistry, name: &str, env: &str, json: bool) -> anyhow::Result<()> {
    let selector = EnvSelector::parse(env);
    let hits = registry.get(name, &selector);

    if json {
        return print_json(&hits);
    }

    if hits.is_empty() {
        println!("Service '{name}' not found in {env}.");
        return Ok(());
    }

    for hit in hits {
        println!("# {}", hit.environment);
        print!("{}", serde_yaml::to_string(&hit.definition)?);
    }
    Ok(())
}

fn remove(registry: &ServiceRegistry, name: &str, env: &str, json: bool) -> anyhow::Result<()> {
    let selector = EnvSelector::parse(env);
    let fan = registry.delete(name, &selector)?;

    if json {
        return print_json(&fan);
    }

    for item in &fan.outcomes {
        if item.outcome.is_applied() {
            println!("Removed {name} from {}", item.environment);
        } else {
            println!("Nothing to remove in {}", item.environment);
        }
    }
    Ok(())
}
