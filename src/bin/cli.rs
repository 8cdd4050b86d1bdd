use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wmiscout::config::Config;
use wmiscout::error::ScoutError;
use wmiscout::output::{self, OutputFormat};
use wmiscout::retriever::ClassSelector;
use wmiscout::schema::DataType;
use wmiscout::AuditOptions;

#[derive(Parser)]
#[command(
    name = "wmiscout",
    about = "Find writable management-instrumentation properties",
    version,
    author
)]
struct Cli {
    /// Show diagnostic output (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where classes come from and which ones to take.
#[derive(Args)]
struct Target {
    /// Class to inspect
    #[arg(long, short = 'n', conflicts_with = "all")]
    class: Option<String>,

    /// Inspect every class in the namespace
    #[arg(long, short = 'a')]
    all: bool,

    /// Namespace under root (default: cimv2)
    #[arg(long)]
    namespace: Option<String>,

    /// Remote host to query
    #[arg(long)]
    computer: Option<String>,

    /// Read classes from a snapshot file instead of the live provider
    #[arg(long, short = 's')]
    snapshot: Option<PathBuf>,

    /// Config file path
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

impl Target {
    fn into_parts(self) -> Result<(AuditOptions, ClassSelector), ScoutError> {
        let selector = ClassSelector::from_args(self.class, self.all)?;
        let options = AuditOptions {
            config_path: self.config,
            namespace: self.namespace,
            computer_name: self.computer,
            snapshot: self.snapshot,
            fail_on_match_override: None,
        };
        Ok((options, selector))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Find writable properties of a data type
    Writable {
        /// Data type to match (run `wmiscout types` for the list)
        #[arg(long = "type", short = 't')]
        data_type: String,

        #[command(flatten)]
        target: Target,

        /// Output format (console, json)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,

        /// Exit with status 1 when any writable property is found
        #[arg(long)]
        fail_on_match: bool,

        /// Write output to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Retrieve class definitions
    Classes {
        #[command(flatten)]
        target: Target,

        /// Output format (console, json)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,
    },

    /// Capture a namespace into a snapshot file for offline audits
    Snapshot {
        /// Namespace under root (default: cimv2)
        #[arg(long)]
        namespace: Option<String>,

        /// Remote host to query
        #[arg(long)]
        computer: Option<String>,

        /// Config file path
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Snapshot file to write
        #[arg(long, short = 'o')]
        output: PathBuf,
    },

    /// List the data types `writable --type` accepts
    Types,

    /// Generate a starter .wmiscout.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "wmiscout=debug" } else { "wmiscout=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Writable {
            data_type,
            target,
            format,
            fail_on_match,
            output,
        } => cmd_writable(data_type, target, format, fail_on_match, output),
        Commands::Classes { target, format } => cmd_classes(target, format),
        Commands::Snapshot {
            namespace,
            computer,
            config,
            output,
        } => cmd_snapshot(namespace, computer, config, output),
        Commands::Types => cmd_types(),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn parse_format(format_str: &str) -> OutputFormat {
    OutputFormat::from_str_lenient(format_str).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", format_str);
        OutputFormat::Console
    })
}

fn cmd_writable(
    data_type_str: String,
    target: Target,
    format_str: String,
    fail_on_match: bool,
    output_path: Option<PathBuf>,
) -> Result<i32, ScoutError> {
    // Validate everything before touching the provider.
    let data_type = DataType::from_str_lenient(&data_type_str)
        .ok_or(ScoutError::InvalidDataType(data_type_str))?;
    let format = parse_format(&format_str);
    let (mut options, selector) = target.into_parts()?;
    if fail_on_match {
        options.fail_on_match_override = Some(true);
    }

    let report = wmiscout::audit(&options, &selector, data_type)?;
    let rendered = wmiscout::render_report(&report, format)?;

    match output_path {
        Some(out) => std::fs::write(&out, &rendered)?,
        None => print!("{}", rendered),
    }

    // Exit code: 0 = pass, 1 = writable properties found under fail_on_match
    Ok(if report.verdict.pass { 0 } else { 1 })
}

fn cmd_classes(target: Target, format_str: String) -> Result<i32, ScoutError> {
    let format = parse_format(&format_str);
    let (options, selector) = target.into_parts()?;

    let (namespace, classes) = wmiscout::list_classes(&options, &selector)?;
    let rendered = output::render_classes(&namespace, &classes, format)?;
    println!("{}", rendered);

    Ok(0)
}

fn cmd_snapshot(
    namespace: Option<String>,
    computer: Option<String>,
    config: Option<PathBuf>,
    output_path: PathBuf,
) -> Result<i32, ScoutError> {
    let options = AuditOptions {
        config_path: config,
        namespace,
        computer_name: computer,
        ..AuditOptions::default()
    };

    let count = wmiscout::capture_snapshot(&options, &output_path)?;
    println!(
        "Captured {} class(es) into {}",
        count,
        output_path.display()
    );

    Ok(0)
}

fn cmd_types() -> Result<i32, ScoutError> {
    for data_type in DataType::ALL {
        println!("{}", data_type);
    }
    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, ScoutError> {
    let path = PathBuf::from(".wmiscout.toml");

    if path.exists() && !force {
        eprintln!(".wmiscout.toml already exists. Use --force to overwrite.");
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created .wmiscout.toml");

    Ok(0)
}
