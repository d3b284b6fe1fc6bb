mod cmd;
mod output;
mod prompt;
mod root;

use clap::{Parser, Subcommand};
use cmd::{firebase_sync::SyncArgs, github::GithubSubcommand, init::InitArgs};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "shipwright",
    about = "Release automation bootstrapper for Flutter projects: Firebase linking, fastlane and CI scaffolding",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from shipwright.yaml, pubspec.yaml or .git/)
    #[arg(long, global = true, env = "SHIPWRIGHT_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold release tooling, then link the project to Firebase
    Init(InitArgs),

    /// Resolve the Firebase project and record its app ids for fastlane
    FirebaseSync(SyncArgs),

    /// Print app version and git position as JSON
    Metadata,

    /// Query releases and workflow runs on GitHub
    Github {
        /// GitHub REST API base URL
        #[arg(long, env = "GITHUB_API_URL", default_value = shipwright_core::github::DEFAULT_API_URL)]
        api_url: String,

        #[command(subcommand)]
        subcommand: GithubSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Init(_) | Commands::FirebaseSync(_) => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init(args) => cmd::init::run(&root, args, cli.json),
        Commands::FirebaseSync(args) => cmd::firebase_sync::run(&root, args, cli.json),
        Commands::Metadata => cmd::metadata::run(&root),
        Commands::Github {
            api_url,
            subcommand,
        } => cmd::github::run(&root, &api_url, subcommand),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
