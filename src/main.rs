//! pepver CLI: inspect and rewrite the version keys of a pyproject.toml.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use pepver::{Field, PyProject, Version};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pepver", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the pyproject.toml to operate on
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        default_value = "pyproject.toml"
    )]
    pyproject: PathBuf,

    /// Output a JSON object instead of `key: value` lines
    #[arg(long, global = true, conflicts_with = "text")]
    json: bool,

    /// Output bare values, one per line
    #[arg(long, global = true)]
    text: bool,

    /// More log detail on stderr (repeatable; e.g. -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a version string and write it to the pyproject version keys
    Version {
        /// The version to store, in any accepted spelling
        value: Version,

        /// Compute and print without writing the file
        #[arg(long)]
        dry_run: bool,
    },

    /// Print version keys from the pyproject.toml
    ///
    /// With neither flag, prints project.version plus tool.poetry.version
    /// when present. An explicitly requested key that is missing is an
    /// error.
    Get {
        /// Print project.version
        #[arg(long)]
        project: bool,

        /// Print tool.poetry.version
        #[arg(long)]
        poetry: bool,
    },

    /// Set one field of the current version
    Set {
        /// The field to write (epoch, major, minor, micro, release.N, pre,
        /// a, b, rc, post, dev, local)
        field: Field,

        /// The value, validated against the field's own rules
        value: String,

        /// Discard every field to the right of FIELD
        #[arg(long)]
        clear_right: bool,

        /// Compute and print without writing the file
        #[arg(long)]
        dry_run: bool,
    },

    /// Increment one field of the current version
    ///
    /// Clears everything to the right of the bumped field, except when
    /// bumping the epoch, which preserves the rest of the version.
    Bump {
        /// The field to increment
        field: Field,

        /// Compute and print without writing the file
        #[arg(long)]
        dry_run: bool,
    },

    /// Drop pre/post/dev/local, leaving a final release version
    Release {
        /// Compute and print without writing the file
        #[arg(long)]
        dry_run: bool,
    },
}

/// How results are rendered on stdout.
#[derive(Clone, Copy, Debug)]
enum OutputMode {
    /// `key: value` lines.
    Plain,
    /// One JSON object.
    Json,
    /// Bare values, newline-separated.
    Text,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Log filter priority: quiet > verbose > RUST_LOG > warn. Logs go to
/// stderr; stdout is reserved for command output.
fn init_logging(quiet: bool, verbose: u8) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose > 0 {
        EnvFilter::new(match verbose {
            1 => "debug",
            _ => "trace",
        })
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mode = if cli.json {
        OutputMode::Json
    } else if cli.text {
        OutputMode::Text
    } else {
        OutputMode::Plain
    };
    debug!(pyproject = %cli.pyproject.display(), ?mode, "starting");

    match cli.command {
        Commands::Version { value, dry_run } => {
            let mut pyproject = PyProject::load(&cli.pyproject)?;
            write_back(&mut pyproject, &value, dry_run)?;
            output(mode, &[("version", value.to_string())]);
        }
        Commands::Get { project, poetry } => {
            let pyproject = PyProject::load(&cli.pyproject)?;
            let mut report: Vec<(&str, String)> = Vec::new();
            if project || !poetry {
                let version = pyproject.project_version()?;
                report.push(("project.version", version.to_string()));
            }
            if poetry {
                let version = pyproject
                    .poetry_version()?
                    .context("no `tool.poetry.version` key")?;
                report.push(("tool.poetry.version", version.to_string()));
            } else if !project {
                if let Some(version) = pyproject.poetry_version()? {
                    report.push(("tool.poetry.version", version.to_string()));
                }
            }
            output(mode, &report);
        }
        Commands::Set {
            field,
            value,
            clear_right,
            dry_run,
        } => {
            let mut pyproject = PyProject::load(&cli.pyproject)?;
            let parsed = field.parse_value(&value)?;
            let next = pyproject.version()?.set(field, parsed, clear_right)?;
            write_back(&mut pyproject, &next, dry_run)?;
            output(mode, &[("version", next.to_string())]);
        }
        Commands::Bump { field, dry_run } => {
            let mut pyproject = PyProject::load(&cli.pyproject)?;
            let next = pyproject.version()?.bump(field)?;
            write_back(&mut pyproject, &next, dry_run)?;
            output(mode, &[("version", next.to_string())]);
        }
        Commands::Release { dry_run } => {
            let mut pyproject = PyProject::load(&cli.pyproject)?;
            let next = pyproject.version()?.bump_release();
            write_back(&mut pyproject, &next, dry_run)?;
            output(mode, &[("version", next.to_string())]);
        }
    }
    Ok(())
}

fn write_back(pyproject: &mut PyProject, version: &Version, dry_run: bool) -> anyhow::Result<()> {
    if dry_run {
        debug!(version = %version, "dry run, not writing");
        return Ok(());
    }
    pyproject.set_version(version);
    pyproject.save()?;
    Ok(())
}

fn output(mode: OutputMode, report: &[(&str, String)]) {
    match mode {
        OutputMode::Plain => {
            for (key, value) in report {
                println!("{key}: {value}");
            }
        }
        OutputMode::Text => {
            for (_, value) in report {
                println!("{value}");
            }
        }
        OutputMode::Json => {
            let object: serde_json::Map<String, serde_json::Value> = report
                .iter()
                .map(|(key, value)| ((*key).to_owned(), serde_json::Value::String(value.clone())))
                .collect();
            println!("{}", serde_json::Value::Object(object));
        }
    }
}
