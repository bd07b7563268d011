mod check_cmd;
mod config;
mod kinds_cmd;
mod serve_cmd;

use clap::{Parser, Subcommand};

use config::{LivecardConfig, Overrides};

#[derive(Parser)]
#[command(name = "livecard", about = "Live activity card bridge")]
struct Cli {
    /// Host OS version to simulate (overrides LIVECARD_HOST_VERSION)
    #[arg(long, global = true)]
    host_version: Option<String>,

    /// Host platform to simulate (overrides LIVECARD_HOST_PLATFORM)
    #[arg(long, global = true)]
    host_platform: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default livecard config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Serve JSON-lines requests on stdin, replies on stdout
    Serve,
    /// List the registered activity kinds and their fields
    Kinds,
    /// Report whether the configured host supports live activities
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries protocol replies, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let overrides = Overrides {
        host_version: cli.host_version.as_deref(),
        host_platform: cli.host_platform.as_deref(),
    };

    let result = match cli.command {
        Commands::Init { force } => {
            let path = config::config_path();
            config::init_config(&path, force).map(|()| {
                println!("Wrote {}", path.display());
            })
        }
        Commands::Serve => match LivecardConfig::resolve(overrides) {
            Ok(resolved) => serve_cmd::run_serve(&resolved).await,
            Err(e) => Err(e),
        },
        Commands::Kinds => {
            kinds_cmd::run_kinds();
            Ok(())
        }
        Commands::Check => LivecardConfig::resolve(overrides).map(|resolved| {
            check_cmd::run_check(&resolved);
        }),
    };

    if let Err(e) = result {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
    Ok(())
}
