use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dataforge::config::Config;
use dataforge::data::{catalog, loader, schema};
use dataforge::error::{ForgeError, Result};
use dataforge::processing::aggregator;
use dataforge::processing::statistics::StdConvention;
use dataforge::state::store::StatsStore;

#[derive(Parser)]
#[command(name = "dataforge", version, about = "Descriptive statistics for tabular datasets")]
struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true, env = "DATAFORGE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override the statistics directory.
    #[arg(long, global = true)]
    stats_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute statistics for a dataset file and store them.
    Analyze {
        file: PathBuf,
        /// Dataset id to store under (defaults to the file stem).
        #[arg(long)]
        id: Option<String>,
        /// Use the population standard deviation instead of the sample one.
        #[arg(long)]
        population_std: bool,
        /// Also print the result envelope.
        #[arg(long)]
        print: bool,
    },
    /// List dataset files in the data directory.
    List,
    /// Print a markdown preview of a dataset file.
    Preview { file: PathBuf },
    /// Print stored statistics for a dataset id.
    Show { id: String },
    /// Print the autodetected schema of a JSON file.
    Schema { file: PathBuf },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = cli.stats_dir {
        config.stats_dir = dir;
    }

    match cli.command {
        Command::Analyze {
            file,
            id,
            population_std,
            print,
        } => {
            let path = resolve(&config, &file)?;
            let convention = if population_std {
                StdConvention::Population
            } else {
                config.std_convention
            };

            let store = StatsStore::new(&config.stats_dir);
            let (stored, saved) =
                aggregator::analyze_file(&path, id.as_deref(), &store, config.max_file_size, convention)?;
            if print {
                println!("{}", serde_json::to_string_pretty(&stored.envelope)?);
            }
            println!("{}", saved.display());

            if stored.envelope.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::List => {
            for file in catalog::list_datasets(&config.data_dir)? {
                println!("{}", file.name);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Preview { file } => {
            let path = resolve(&config, &file)?;
            let dataset = loader::load_file(&path, config.max_file_size)?;
            println!("{}", catalog::preview(&dataset, &file_name(&path)));
            Ok(ExitCode::SUCCESS)
        }
        Command::Show { id } => {
            let stored = StatsStore::new(&config.stats_dir).load(&id)?;
            println!("{}", serde_json::to_string_pretty(&stored)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Schema { file } => {
            let path = resolve(&config, &file)?;
            let value = loader::read_json(&path)?;
            println!("{}", serde_json::to_string_pretty(&schema::autodetect_schema(&value))?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Use `file` as given if it exists, otherwise look it up in the data
/// directory.
fn resolve(config: &Config, file: &Path) -> Result<PathBuf> {
    if file.is_file() {
        return Ok(file.to_path_buf());
    }
    let in_data_dir = config.data_dir.join(file);
    if in_data_dir.is_file() {
        return Ok(in_data_dir);
    }
    Err(ForgeError::NotFound(format!("file {:?}", file)))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
