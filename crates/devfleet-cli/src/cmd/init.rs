use anyhow::Context;
use devfleet_core::{config::FleetConfig, io, paths, registry::ServiceRegistry};
use std::path::Path;

/// Initial compose template: shared networks, no services. Environment files
/// are stamped from this the first time they are created.
const COMPOSE_TEMPLATE: &str = r#"version: "3.7"

networks:
  backend:
    driver: bridge

services: {}
"#;

const DOCKERFILE_TEMPLATE: &str = r#"FROM node:20-alpine

WORKDIR /usr/src/app

COPY package*.json ./
RUN npm install

COPY . .

CMD ["npm", "run", "dev"]
"#;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let project_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());

    println!("Initializing devfleet in: {}", root.display());

    // 1. Write devfleet.yaml if missing
    let config_path = paths::config_path(root);
    if !config_path.exists() {
        let cfg = FleetConfig::new(&project_name);
        cfg.save(root).context("failed to write devfleet.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }
    let cfg = FleetConfig::load(root).context("failed to load devfleet.yaml")?;

    // 2. Seed the template files
    let template = cfg.template_path(root);
    if io::write_if_missing(&template, COMPOSE_TEMPLATE.as_bytes())? {
        println!("  created: {}", cfg.template.display());
    } else {
        println!("  exists:  {}", cfg.template.display());
    }
    let dockerfile = cfg.dockerfile_template_path(root);
    if io::write_if_missing(&dockerfile, DOCKERFILE_TEMPLATE.as_bytes())? {
        println!("  created: {}", cfg.dockerfile_template.display());
    } else {
        println!("  exists:  {}", cfg.dockerfile_template.display());
    }

    // 3. Repositories directory
    io::ensure_dir(&cfg.repos_path(root)).context("failed to create repositories directory")?;

    // 4. Opening the registry creates any missing environment file from the
    //    template.
    let missing: Vec<String> = cfg
        .environment_files(root)
        .into_iter()
        .filter(|(_, path)| !path.exists())
        .map(|(env, _)| env)
        .collect();
    ServiceRegistry::from_config(root, &cfg).context("failed to open compose files")?;
    for (env, file) in &cfg.environments {
        if missing.contains(env) {
            println!("  created: {} ({env})", file.display());
        } else {
            println!("  exists:  {} ({env})", file.display());
        }
    }

    println!("\ndevfleet initialized.");
    println!("Next: devfleet service add <name> --repo <git-url>");

    Ok(())
}
