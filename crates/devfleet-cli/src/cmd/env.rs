use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use devfleet_core::{config::FleetConfig, registry::ServiceRegistry};
use std::path::Path;

#[derive(Subcommand)]
pub enum EnvSubcommand {
    /// List configured environments and their compose files
    List,
}

pub fn run(root: &Path, subcmd: EnvSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        EnvSubcommand::List => list(root, json),
    }
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let cfg = FleetConfig::load(root).context("failed to load devfleet.yaml")?;
    let registry =
        ServiceRegistry::from_config(root, &cfg).context("failed to open compose files")?;

    if json {
        let entries: Vec<_> = cfg
            .environments
            .iter()
            .map(|(env, file)| {
                serde_json::json!({
                    "environment": env,
                    "file": file,
                    "services": registry.find_one(env).map(|m| m.len()).unwrap_or(0),
                })
            })
            .collect();
        return print_json(&entries);
    }

    let rows: Vec<Vec<String>> = cfg
        .environments
        .iter()
        .map(|(env, file)| {
            let count = registry.find_one(env).map(|m| m.len()).unwrap_or(0);
            vec![env.clone(), file.display().to_string(), count.to_string()]
        })
        .collect();
    print_table(&["ENV", "FILE", "SERVICES"], rows);
    Ok(())
}
