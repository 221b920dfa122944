//! CLI entry point for worksite

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "worksite")]
#[command(author = "Yukang Chen")]
#[command(version)]
#[command(about = "Content pipeline for a portfolio of creative works", long_about = None)]
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
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new work
    New {
        /// Title of the new work
        title: String,

        /// Category (defaults to the release category)
        #[arg(short = 'C', long)]
        category: Option<String>,

        /// File name to use instead of the slugified title
        #[arg(short, long)]
        slug: Option<String>,
    },

    /// List entries
    List {
        /// What to list (all, works)
        #[arg(default_value = "all")]
        r#type: String,
    },

    /// Print the HTML of one work
    Render {
        slug: String,

        /// Leave link list, video and image tokens unresolved
        #[arg(long)]
        raw: bool,
    },

    /// Build the output documents
    #[command(alias = "b")]
    Build {
        /// Rebuild on changes
        #[arg(short, long)]
        watch: bool,

        /// Rendering threads
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Remove the output directory
    Clean,

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "worksite=debug,info"
    } else {
        "worksite=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot read the current directory")?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            worksite::commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::New {
            title,
            category,
            slug,
        } => {
            let site = worksite::Worksite::new(&base_dir)?;
            let path = worksite::commands::new::create_work(
                &site,
                &title,
                category.as_deref(),
                slug.as_deref(),
            )?;
            println!("Created: {:?}", path);
        }

        Commands::List { r#type } => {
            let site = worksite::Worksite::new(&base_dir)?;
            worksite::commands::list::run(&site, &r#type)?;
        }

        Commands::Render { slug, raw } => {
            let site = worksite::Worksite::new(&base_dir)?;
            worksite::commands::render::run(&site, &slug, raw)?;
        }

        Commands::Build { watch, jobs } => {
            let site = worksite::Worksite::new(&base_dir)?;
            tracing::info!("Building...");
            worksite::commands::build::run(&site, jobs)?;
            println!("Built successfully!");

            if watch {
                worksite::commands::build::watch(&base_dir, jobs)?;
            }
        }

        Commands::Clean => {
            let site = worksite::Worksite::new(&base_dir)?;
            tracing::info!("Cleaning output folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("worksite version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
