mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{env::EnvSubcommand, service::ServiceSubcommand};
use devfleet_core::setup::SetupOptions;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "devfleet",
    about = "Scaffold a fleet of service repositories and their compose environments",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from devfleet.yaml or .git/)
    #[arg(long, global = true, env = "DEVFLEET_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize devfleet in the current project
    Init,

    /// Clone, configure, and wire every service declared in the default
    /// environment
    Setup {
        /// Skip cloning repositories
        #[arg(long)]
        no_clone: bool,

        /// Skip fetching and checking out the develop branch
        #[arg(long)]
        no_checkout: bool,

        /// Skip installing dependencies
        #[arg(long)]
        no_install: bool,

        /// Skip seeding .env files from example.env
        #[arg(long)]
        no_copy_env: bool,

        /// Skip copying the Dockerfile template into repositories
        #[arg(long)]
        no_dockerfile: bool,

        /// Skip wiring services into the develop compose file
        #[arg(long)]
        no_append: bool,
    },

    /// Manage services across environments
    Service {
        #[command(subcommand)]
        subcommand: ServiceSubcommand,
    },

    /// Inspect configured environments
    Env {
        #[command(subcommand)]
        subcommand: EnvSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Setup {
            no_clone,
            no_checkout,
            no_install,
            no_copy_env,
            no_dockerfile,
            no_append,
        } => {
            let opts = SetupOptions {
                clone: !no_clone,
                checkout: !no_checkout,
                install: !no_install,
                copy_env: !no_copy_env,
                dockerfile: !no_dockerfile,
                append: !no_append,
            };
            cmd::setup::run(&root, &opts, cli.json)
        }
        Commands::Service { subcommand } => cmd::service::run(&root, subcommand, cli.json),
        Commands::Env { subcommand } => cmd::env::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
