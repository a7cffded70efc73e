//! Buck2 Explorer back end: serves the six explorer operations over a local
//! socket and offers a small CLI around them.

mod app;
mod dir_picker;
mod invoke;
mod ipc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use explorer_config_and_utils::{init_logging, Config, Paths};
use explorer_ipc::Operation;

/// Buck2 Explorer back-end command-line interface.
#[derive(Parser)]
#[command(name = "buck2-explorer")]
#[command(about = "Privileged back end for the Buck2 explorer")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error) or a filter directive.
    /// Defaults to the configured level.
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Base directory for runtime files (socket, logs, config). Defaults to ~/.buck2-explorer
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the back end
    Start {
        /// Mirror logs to stderr
        #[arg(short, long)]
        foreground: bool,
    },
    /// Stop a running back end
    Stop,
    /// Check back-end status
    Status,
    /// Run one explorer operation and print its JSON result
    Invoke {
        /// Operation name, e.g. buck2-targets or targets
        #[arg(value_parser = invoke::parse_operation)]
        operation: Operation,
        /// Target label or pattern for targets, attributes and providers
        target: Option<String>,
        /// Host platform passed as --fake-host
        #[arg(long)]
        host: Option<String>,
        /// Build mode flagfile, with or without the leading @
        #[arg(long)]
        mode: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    let config = Config::load(&paths)?;

    let foreground = match &cli.command {
        Some(Commands::Start { foreground }) => *foreground,
        None => true,
        Some(_) => false,
    };
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging(level, &paths, foreground)?;

    match cli.command {
        Some(Commands::Start { .. }) | None => {
            app::run_daemon(config, paths).await?;
        }
        Some(Commands::Stop) => {
            app::stop_daemon(&paths).await?;
        }
        Some(Commands::Status) => {
            app::check_status(&paths).await?;
        }
        Some(Commands::Invoke {
            operation,
            target,
            host,
            mode,
        }) => {
            let args = invoke::InvokeArgs {
                operation,
                target,
                host,
                mode,
            };
            invoke::run_invoke(config, paths, args).await?;
        }
    }

    Ok(())
}
