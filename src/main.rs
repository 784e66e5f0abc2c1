use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokensmith::app::{self, AppConfig};
use tokensmith::build::{BuildReport, ConsoleReporter, Reporter, SilentReporter};
use tokensmith::TokenSmith;
use tracing::debug;

/// Build platform-specific style files from design tokens
#[derive(Parser)]
#[command(name = "tokensmith", version)]
#[command(about = "Build platform-specific style files from design tokens", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the configured platforms
    Build(TargetArgs),
    /// Remove the files a build would produce
    Clean(TargetArgs),
}

#[derive(Args)]
struct TargetArgs {
    /// Path to the build configuration (.json, .yaml, .yml or .toml)
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Only process these platforms (repeatable)
    #[arg(short, long = "platform")]
    platforms: Vec<String>,

    /// Suppress the build transcript
    #[arg(short, long)]
    silent: bool,
}

fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::new(cli.verbose) {
        Ok(config) => config,
        Err(e) => app::handle_fatal_error(e, cli.verbose),
    };
    app::init_logging(&config);

    let result = match cli.command {
        Commands::Build(args) => run(&config, &args, Operation::Build),
        Commands::Clean(args) => run(&config, &args, Operation::Clean),
    };

    if let Err(e) = result {
        app::handle_fatal_error(e, cli.verbose);
    }
}

#[derive(Clone, Copy)]
enum Operation {
    Build,
    Clean,
}

fn run(config: &AppConfig, args: &TargetArgs, operation: Operation) -> Result<()> {
    let config_path = config.working_dir.join(&args.config);
    debug!("Loading configuration from {}", config_path.display());

    let reporter: Arc<dyn Reporter> = if args.silent {
        Arc::new(SilentReporter)
    } else {
        Arc::new(ConsoleReporter)
    };
    let smith = TokenSmith::from_config_file(&config_path, &config.working_dir)
        .with_context(|| format!("Failed to load {}", args.config.display()))?
        .with_reporter(reporter);

    let report = if args.platforms.is_empty() {
        match operation {
            Operation::Build => smith.build_all_platforms()?,
            Operation::Clean => smith.clean_all_platforms()?,
        }
    } else {
        let mut report = BuildReport::default();
        for platform in &args.platforms {
            let platform_report = match operation {
                Operation::Build => smith.build_platform(platform)?,
                Operation::Clean => smith.clean_platform(platform)?,
            };
            report.platforms.push(platform_report);
        }
        report
    };

    debug!(
        "Processed {} platforms, {} files",
        report.platforms.len(),
        report.files().count()
    );
    Ok(())
}
