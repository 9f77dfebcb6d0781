use clap::{Parser, Subcommand};
use routegen::config::{self, ConfigError, GeneratorConfig, Overrides};
use routegen::{generate, output};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Flags that override `routegen.toml`. Shared by every pipeline command.
#[derive(clap::Args, Clone, Default)]
struct OverrideArgs {
    /// Hand-authored route file (overrides `source`)
    #[arg(long, global = true)]
    source: Option<String>,

    /// Primary generated route module (overrides `routes_output`)
    #[arg(long, global = true)]
    routes_output: Option<String>,

    /// Generated guarded-path module (overrides `guarded_output`)
    #[arg(long, global = true)]
    guarded_output: Option<String>,

    /// Copy the source through untouched, ignoring `[routes]`
    #[arg(long, global = true, conflicts_with = "filter")]
    no_filter: bool,

    /// Apply `[routes]` even if the config disables filtering
    #[arg(long, global = true)]
    filter: bool,
}

impl OverrideArgs {
    fn into_overrides(self) -> Overrides {
        Overrides {
            source: self.source,
            routes_output: self.routes_output,
            guarded_output: self.guarded_output,
            filtering: match (self.filter, self.no_filter) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            },
        }
    }
}

/// Release version on a tag, `dev@<hash>` otherwise (both set by `build.rs`).
fn version_string() -> &'static str {
    if env!("ON_RELEASE_TAG") == "true" {
        return env!("CARGO_PKG_VERSION");
    }
    match env!("GIT_HASH") {
        "" => "dev@unknown",
        hash => Box::leak(format!("dev@{hash}").into_boxed_str()),
    }
}

#[derive(Parser)]
#[command(name = "routegen")]
#[command(about = "Generate a feature-filtered route table from a hand-authored route file")]
#[command(long_about = "\
Generate a feature-filtered route table from a hand-authored route file

The source file holds one exported array of route objects:

  export const routes: Routes = [
    { path: '', component: HomeComponent },
    { path: 'content', component: ContentComponent },
    { path: 'special', component: SpecialComponent, canActivate: [AuthGuard] },
    { path: '**', component: NotFoundComponent },
  ];

routegen.toml decides which paths survive:

  [routes]
  content = false        # dropped
  special = true         # kept
                         # unlisted paths are kept and reported

Two modules are written:
  routes_output   the array with only enabled routes (drop-in replacement)
  guarded_output  sorted paths of kept routes whose canActivate lists AuthGuard

The root ('') and fallback ('**') routes are mandatory: setting either to
false fails the build without writing anything.

Run 'routegen gen-config' to generate a documented routegen.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file; relative paths inside it resolve against its directory
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Log pipeline stages at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    overrides: OverrideArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Extract, filter, validate, and write both modules (default)
    Generate,
    /// Run every step except writing
    Check,
    /// Show every route block with its filtering decision
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print a stock routegen.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(cli.verbose)?;

    match cli.command.unwrap_or(Command::Generate) {
        Command::Generate => {
            let config = load_config(&cli.config, cli.overrides)?;
            let report = generate::run(&config)?;
            output::print_report(&report);
        }
        Command::Check => {
            let config = load_config(&cli.config, cli.overrides)?;
            let report = generate::check(&config)?;
            output::print_report(&report);
        }
        Command::List { json } => {
            let config = load_config(&cli.config, cli.overrides)?;
            let blocks = generate::list(&config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&blocks)?);
            } else {
                output::print_block_listing(&blocks);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load `routegen.toml` (stock defaults if absent) and apply CLI overrides.
fn load_config(path: &Path, overrides: OverrideArgs) -> Result<GeneratorConfig, ConfigError> {
    let mut config = config::load_config(path)?;
    config.apply_overrides(overrides.into_overrides())?;
    tracing::debug!(
        config = %path.display(),
        source = %config.source,
        filtering = config.filtering.enabled,
        "config loaded"
    );
    Ok(config)
}

/// Log to stderr. `RUST_LOG` wins over `--verbose` when set.
fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
