//! Trellis CLI entry point

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trellis_core::{AssociationKind, TypeKind};
use trellis_structure::Strategy;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Explore the containment structure of policy and product models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Model snapshot to load (.json, .yaml or .yml)
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Engine configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the root types of a project or of one type
    Roots {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Print the expanded structure below the roots
    Tree {
        #[command(flatten)]
        target: TargetArgs,

        /// Stop expanding below this depth
        #[arg(short, long)]
        depth: Option<usize>,
    },
    /// Print every route from the roots to a type
    Paths {
        /// Qualified name of the type to find
        to: String,

        #[command(flatten)]
        target: TargetArgs,
    },
}

/// What to compute the structure for.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Project whose structure is shown
    #[arg(short, long)]
    pub project: String,

    /// Restrict the roots to those containing this type
    #[arg(short = 't', long = "type")]
    pub type_name: Option<String>,

    #[arg(long, value_enum, default_value_t = StrategyArg::Strict)]
    pub strategy: StrategyArg,

    #[arg(long, value_enum, default_value_t = SideArg::Policy)]
    pub side: SideArg,

    /// Association kinds treated as containment (overrides the config)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub kinds: Vec<KindArg>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum StrategyArg {
    Strict,
    Inherited,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Strict => Strategy::Strict,
            StrategyArg::Inherited => Strategy::InheritedAssociation,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum SideArg {
    Policy,
    Product,
}

impl From<SideArg> for TypeKind {
    fn from(arg: SideArg) -> Self {
        match arg {
            SideArg::Policy => TypeKind::PolicySide,
            SideArg::Product => TypeKind::ProductSide,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum KindArg {
    Aggregation,
    Composition,
}

impl From<KindArg> for AssociationKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Aggregation => AssociationKind::Aggregation,
            KindArg::Composition => AssociationKind::CompositionMasterToDetail,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("trellis={}", log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Trellis v{}", env!("CARGO_PKG_VERSION"));

    let (repository, config) = commands::load(&cli.snapshot, cli.config.as_deref())?;
    let output = match cli.command {
        Commands::Roots { target } => commands::roots(repository, config, target).await?,
        Commands::Tree { target, depth } => commands::tree(repository, config, target, depth).await?,
        Commands::Paths { to, target } => commands::paths(repository, config, target, &to).await?,
    };
    print!("{}", output);
    Ok(())
}
