//! Plinth CLI - validate and inspect extension models.

mod colors;
mod describe;
mod validate;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "plinth")]
#[command(about = "Validate and inspect Plinth extension models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the static checks over a model document
    Validate {
        /// Path to the model document (.json file)
        model: String,

        /// Also check models produced at runtime
        #[arg(long)]
        runtime: bool,

        /// Fail when any warning is reported
        #[arg(long)]
        deny_warnings: bool,
    },

    /// Print the component tree of a model document
    Describe {
        /// Path to the model document (.json file)
        model: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Render plinth-core errors with their recovery hints
    let format_error = |err: anyhow::Error| -> anyhow::Error {
        if let Some(plinth_err) = err.downcast_ref::<plinth_core::Error>() {
            anyhow::anyhow!("{}", plinth_err.with_hint())
        } else {
            err
        }
    };

    match cli.command {
        Commands::Validate {
            model,
            runtime,
            deny_warnings,
        } => validate::execute(&model, runtime, deny_warnings).map_err(format_error)?,

        Commands::Describe { model } => describe::execute(&model).map_err(format_error)?,
    }

    Ok(())
}
