use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use regex::Regex;
use serde_json::Value;

use hieradata::output::{write_human, write_json};
use hieradata::{
    CheckFailure, DocumentStore, KeySpec, LoadOptions, RuleSet, SourceId, StoreConfig,
    ValidationReport, ValueKind, check,
};

use crate::logging;

#[derive(Parser)]
#[command(
    name = "hieradata",
    about = "Load and validate hierarchical YAML configuration data",
    version,
    long_about = None
)]
struct Cli {
    /// Enable verbose output (use -vv for debug output)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StoreArgs {
    /// Root directory of the hieradata tree
    #[arg(long, env = "HIERADATA_ROOT", default_value = "hieradata")]
    root: PathBuf,

    /// File extension to load (repeatable; default: yaml, yml)
    #[arg(long = "ext", value_name = "EXT")]
    extensions: Vec<String>,

    /// Glob pattern of files to skip (repeatable)
    #[arg(long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Skip empty documents instead of reporting them
    #[arg(long)]
    ignore_empty: bool,

    /// Follow symbolic links while walking the tree
    #[arg(long)]
    follow_links: bool,
}

impl StoreArgs {
    fn load(&self) -> Result<DocumentStore> {
        let mut config = StoreConfig::new(&self.root);
        if !self.extensions.is_empty() {
            config.extensions.clone_from(&self.extensions);
        }
        config.exclude.clone_from(&self.exclude);
        config.follow_links = self.follow_links;

        let options = if self.ignore_empty {
            LoadOptions::ignore_empty()
        } else {
            LoadOptions::default()
        };
        let mut store = DocumentStore::new(config)?;
        store.load(options);
        Ok(store)
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    #[default]
    Human,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the tree and report every file that could not be loaded
    Load {
        #[command(flatten)]
        store: StoreArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Human)]
        format: Format,
    },

    /// Validate one key (or `/pattern/`) across every source
    Check {
        #[command(flatten)]
        store: StoreArgs,

        /// Exact key, or a regex between slashes (e.g. `/^apache::/`).
        /// A key beginning with `/` needs an anchored pattern: `/^[/]etc$/`
        #[arg(long)]
        key: String,

        /// Source that must contain a match (repeatable, e.g. `common.yaml`)
        #[arg(long = "require", value_name = "SOURCE")]
        required: Vec<String>,

        /// Required value type: string, number, integer, bool, array, mapping, null
        #[arg(long = "type", value_name = "KIND")]
        kind: Option<ValueKind>,

        /// Regex string values must match
        #[arg(long, value_name = "REGEX")]
        matches: Option<String>,

        /// Reject null and empty strings, sequences and mappings
        #[arg(long)]
        non_empty: bool,
    },

    /// Run a YAML rule file against the tree
    Rules {
        #[command(flatten)]
        store: StoreArgs,

        /// Rule file
        #[arg(long)]
        rules: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Human)]
        format: Format,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Load { store, format } => {
            let store = store.load()?;
            let report = ValidationReport::from_dataset(store.dataset());
            emit(&report, format)?;
            if !report.ok {
                bail!("{} file(s) could not be loaded", report.load_errors.len());
            }
        }
        Commands::Check {
            store,
            key,
            required,
            kind,
            matches,
            non_empty,
        } => {
            let store = store.load()?;
            let spec: KeySpec = key.parse()?;
            let required: Vec<SourceId> = required.into_iter().map(SourceId::from).collect();
            let pattern = matches
                .map(|p| Regex::new(&p).with_context(|| format!("invalid --matches '{p}'")))
                .transpose()?;

            let kind_check = kind.map(check::is_kind);
            let pattern_check = pattern.map(check::matches);
            let empty_check = non_empty.then(check::non_empty);
            store.validate(&spec, &required, |value: &Value| -> Result<(), CheckFailure> {
                if let Some(c) = &kind_check {
                    c(value)?;
                }
                if let Some(c) = &pattern_check {
                    c(value)?;
                }
                if let Some(c) = &empty_check {
                    c(value)?;
                }
                Ok(())
            })?;
            println!("{} {spec} is valid", "\u{2713}".green());
        }
        Commands::Rules {
            store,
            rules,
            format,
        } => {
            let rules = RuleSet::from_file(&rules)?;
            tracing::debug!(rules = rules.rules.len(), "rule file parsed");
            let store = store.load()?;
            let report = rules.run(store.dataset())?;
            emit(&report, format)?;
            if !report.ok {
                if report.load_errors.is_empty() {
                    bail!("{} rule(s) failed", report.failed_rules());
                }
                bail!("{} file(s) could not be loaded", report.load_errors.len());
            }
        }
    }

    Ok(())
}

fn emit(report: &ValidationReport, format: Format) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        Format::Human => write_human(report, &mut out)?,
        Format::Json => write_json(report, &mut out)?,
    }
    out.flush()?;
    Ok(())
}
