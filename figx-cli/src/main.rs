use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use figx_core::Session;

mod commands;

#[derive(Parser)]
#[command(name = "figx")]
#[command(about = "Figure-mention mining over datasheet corpora", long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    #[arg(long, short, global = true, help = "Show verbose debug output")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show configuration and corpus information")]
    Info,

    #[command(about = "Scan the corpus directory and list discovered documents")]
    Corpus,

    #[command(about = "Partition the corpus into train/dev/test splits")]
    Split {
        #[arg(long, help = "Train boundary fraction (defaults to config)")]
        train: Option<f64>,

        #[arg(long, help = "Dev boundary fraction (defaults to config)")]
        dev: Option<f64>,

        #[arg(long, help = "Write the split manifest to this path")]
        manifest: Option<PathBuf>,
    },

    #[command(about = "List recorded workflow runs")]
    Runs {
        #[arg(long, help = "Show per-split stage counts for each run")]
        detailed: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let session = Session::load("figx")?;
    init_tracing(&session, cli.verbose)?;

    match cli.command {
        Commands::Info => commands::handle_info(&session)?,
        Commands::Corpus => commands::handle_corpus(&session)?,
        Commands::Split {
            train,
            dev,
            manifest,
        } => commands::handle_split(&session, train, dev, manifest.as_deref())?,
        Commands::Runs { detailed } => commands::handle_runs(&session, detailed)?,
    }

    Ok(())
}

fn init_tracing(session: &Session, verbose: bool) -> Result<()> {
    let directive = if verbose {
        "figx_core=debug".to_string()
    } else {
        session.config().logging.directive.clone()
    };

    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(directive.parse().with_context(|| {
            format!("invalid logging directive '{directive}' in configuration")
        })?);

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}
