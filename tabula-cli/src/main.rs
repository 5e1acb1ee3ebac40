use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::PathBuf;
use std::sync::Arc;
use tabula::{Config, FileCatalog, SchemaShell};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "tabula")]
#[command(about = "Tabula CLI - declarative table and namespace schema administration")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.tabula/config.toml)
    #[arg(short, long, global = true, env = "TABULA_CONFIG")]
    config: Option<PathBuf>,

    /// Catalog directory, overrides the config file
    #[arg(long, global = true, env = "TABULA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Dump Prometheus metrics to stderr before exiting
    #[arg(long, global = true)]
    print_metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a table from family and table argument bags
    Create {
        /// Table name, optionally namespace-qualified (ns:table)
        table: String,

        /// Arguments as YAML: a family name or a bag such as "{NAME: cf1, VERSIONS: 3}"
        args: Vec<String>,

        /// YAML or JSON file with a list of arguments
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Compile and print the plan without creating the table
        #[arg(long)]
        dry_run: bool,
    },

    /// Alter an existing table
    Alter {
        table: String,

        /// Arguments as YAML, e.g. "{NAME: cf1, METHOD: delete}"
        args: Vec<String>,

        #[arg(short, long)]
        file: Option<PathBuf>,

        #[arg(long)]
        dry_run: bool,
    },

    /// Show a table descriptor
    Describe {
        table: String,

        /// Only print the table attributes
        #[arg(long)]
        attributes: bool,
    },

    /// List tables, optionally filtered by a regex
    List { pattern: Option<String> },

    /// Create a namespace
    CreateNamespace {
        name: String,

        /// Configuration bags, e.g. "{PROPERTY_NAME: value}"
        args: Vec<String>,

        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Alter a namespace with METHOD set/unset bags
    AlterNamespace {
        name: String,

        args: Vec<String>,

        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Show a namespace descriptor
    DescribeNamespace { name: String },

    /// Compute the split keys an algorithm would produce
    Splits {
        /// Split algorithm name (HexStringSplit, DecimalStringSplit, UniformSplit)
        #[arg(short, long)]
        algorithm: Option<String>,

        /// Number of regions
        #[arg(short = 'n', long)]
        regions: Option<i64>,

        /// List registered algorithms
        #[arg(long)]
        list: bool,
    },
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.observability.log_level.clone()),
    );
    let format = std::env::var("LOG_FORMAT")
        .unwrap_or_else(|_| config.observability.log_format.clone());

    if format.eq_ignore_ascii_case("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn init_metrics(config: &Config) -> Result<Option<PrometheusHandle>> {
    if !config.observability.metrics_enabled {
        return Ok(None);
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    Ok(Some(handle))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    if let Some(dir) = cli.data_dir.clone() {
        config.catalog.data_dir = tabula::config::expand_tilde(&dir)?;
    }

    init_tracing(&config);
    let metrics = init_metrics(&config)?;

    let ctx = Arc::new(config.compile_context()?);
    let output = commands::Output { json: cli.json };

    let catalog = FileCatalog::open(&config.catalog.data_dir)
        .await
        .with_context(|| format!("Failed to open catalog at {:?}", config.catalog.data_dir))?;
    let shell = SchemaShell::new(Arc::new(catalog), ctx);
    let result = run(&shell, cli.command, output).await;

    if cli.print_metrics {
        if let Some(handle) = metrics {
            eprintln!("{}", handle.render());
        }
    }

    result
}

async fn run(shell: &SchemaShell, command: Commands, output: commands::Output) -> Result<()> {
    match command {
        Commands::Create {
            table,
            args,
            file,
            dry_run,
        } => {
            let args = commands::load_args(&args, file.as_deref())?;
            commands::run_create(shell, &table, &args, dry_run, output).await
        }
        Commands::Alter {
            table,
            args,
            file,
            dry_run,
        } => {
            let args = commands::load_args(&args, file.as_deref())?;
            commands::run_alter(shell, &table, &args, dry_run, output).await
        }
        Commands::Describe { table, attributes } => {
            commands::run_describe(shell, &table, attributes, output).await
        }
        Commands::List { pattern } => commands::run_list(shell, pattern.as_deref(), output).await,
        Commands::CreateNamespace { name, args, file } => {
            let args = commands::load_args(&args, file.as_deref())?;
            commands::run_create_namespace(shell, &name, &args, output).await
        }
        Commands::AlterNamespace { name, args, file } => {
            let args = commands::load_args(&args, file.as_deref())?;
            commands::run_alter_namespace(shell, &name, &args, output).await
        }
        Commands::DescribeNamespace { name } => {
            commands::run_describe_namespace(shell, &name, output).await
        }
        Commands::Splits {
            algorithm,
            regions,
            list,
        } => commands::run_splits(shell.context(), algorithm.as_deref(), regions, list, output),
    }
}
