//! CLI entry point for spacetraveling

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "spacetraveling")]
#[command(version)]
#[command(about = "A blog front-end for the Prismic headless CMS", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate static files
    #[command(alias = "g")]
    Generate,

    /// Start the blog server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// Clean the public folder
    Clean,

    /// List published posts
    List {
        /// Follow pagination to the last post
        #[arg(short, long)]
        all: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Local `.env` may carry the CMS endpoint and token
    let env_file = dotenvy::dotenv().ok();

    // Initialize logging
    let filter = if cli.debug {
        "spacetraveling=debug,info"
    } else {
        "spacetraveling=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(path) = env_file {
        tracing::debug!("Loaded environment from {:?}", path);
    }

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot determine the current directory")?,
    };

    match cli.command {
        Commands::Generate => {
            let blog = spacetraveling::Blog::new(&base_dir)?;
            tracing::info!("Generating static files...");
            blog.generate().await?;
            println!("Generated successfully!");
        }

        Commands::Server { port, ip } => {
            let blog = spacetraveling::Blog::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            spacetraveling::server::start(&blog, &ip, port).await?;
        }

        Commands::Clean => {
            let blog = spacetraveling::Blog::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { all } => {
            let blog = spacetraveling::Blog::new(&base_dir)?;
            spacetraveling::commands::list::run(&blog, all).await?;
        }

        Commands::Version => {
            println!("spacetraveling {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
