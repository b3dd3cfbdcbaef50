//! strfmt - render brace and dollar templates from the command line

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod bindings;
mod commands;

#[derive(Parser)]
#[command(name = "strfmt")]
#[command(version)]
#[command(about = "Render brace-style and dollar-style string templates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a brace template such as "Hello, {name}!"
    Format {
        /// Template text
        template: String,

        /// Positional values, in order
        args: Vec<String>,

        /// Named value (KEY=VALUE)
        #[arg(short = 'n', long = "named")]
        named: Vec<String>,

        /// JSON file with bindings (object for named, array for positional)
        #[arg(long)]
        bindings: Option<PathBuf>,

        /// Leave placeholders with missing keys in the output
        #[arg(long)]
        safe: bool,

        /// Fail when a binding is not used by the template
        #[arg(long)]
        check_unused: bool,

        /// Value to use for missing keys instead of failing
        #[arg(long, conflicts_with = "safe")]
        missing: Option<String>,

        /// JSON file with formatter options
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Render a dollar template such as "Hello, $name!"
    Dollar {
        /// Template text
        template: String,

        /// Named value (KEY=VALUE)
        #[arg(short = 'n', long = "named")]
        named: Vec<String>,

        /// JSON object file with bindings
        #[arg(long)]
        bindings: Option<PathBuf>,

        /// Leave missing and invalid placeholders in the output
        #[arg(long)]
        safe: bool,

        /// Placeholder delimiter
        #[arg(long, default_value = "$")]
        delimiter: String,
    },

    /// List the identifiers used by a dollar template
    Identifiers {
        /// Template text
        template: String,

        /// Placeholder delimiter
        #[arg(long, default_value = "$")]
        delimiter: String,
    },

    /// Capitalize each word of TEXT
    Capwords {
        /// Text to capitalize
        text: String,

        /// Word separator (defaults to runs of whitespace)
        #[arg(long)]
        sep: Option<String>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "strfmt=warn,quarto_strfmt=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Format {
            template,
            args,
            named,
            bindings,
            safe,
            check_unused,
            missing,
            config,
        } => commands::format::execute(commands::format::FormatArgs {
            template,
            positional: args,
            named,
            bindings,
            safe,
            check_unused,
            missing,
            config,
        }),
        Commands::Dollar {
            template,
            named,
            bindings,
            safe,
            delimiter,
        } => commands::dollar::execute(commands::dollar::DollarArgs {
            template,
            named,
            bindings,
            safe,
            delimiter,
        }),
        Commands::Identifiers {
            template,
            delimiter,
        } => commands::dollar::identifiers(&template, &delimiter),
        Commands::Capwords { text, sep } => commands::capwords::execute(&text, sep.as_deref()),
    }
}
