use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use deskcrafter::codec::{self, GenerateOptions, ParseError};
use deskcrafter::config::{Config, load_config};
use deskcrafter::model::{EntryDraft, EntryMetadata};
use deskcrafter::sources::desktop::{DesktopSource, output_target, write_desktop_file};
use deskcrafter::sources::Source;
use deskcrafter::validators::validate_entry_value;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a managed .desktop file and print it as JSON
    Parse {
        /// File to read, or `-` for stdin
        file: PathBuf,
        /// Attach this id and the current time, printing a full entry
        #[arg(long)]
        id: Option<String>,
    },
    /// Generate .desktop text from a JSON draft
    Generate {
        /// JSON draft to read, or `-` for stdin
        draft: PathBuf,
        #[arg(long)]
        no_managed_flag: bool,
        #[arg(long)]
        no_try_exec: bool,
        #[arg(long)]
        no_startup_class: bool,
        /// Write to this file, or into this directory using the entry's file name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a JSON draft and report every failing field
    Validate {
        /// JSON draft to read, or `-` for stdin
        draft: PathBuf,
        /// Only accept the built-in categories
        #[arg(long)]
        strict: bool,
    },
    /// Quick check that a file looks like a desktop entry
    Check {
        /// File to read, or `-` for stdin
        file: PathBuf,
    },
    /// List managed entries in the applications directory
    List,
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf).context("reading stdin")?;
        Ok(buf)
    } else {
        fs::read(path).with_context(|| format!("reading {}", path.display()))
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Parse { file, id } => parse(&file, id),
        Command::Generate {
            draft,
            no_managed_flag,
            no_try_exec,
            no_startup_class,
            output,
        } => {
            let options = config
                .generate
                .with_overrides(no_managed_flag, no_try_exec, no_startup_class);
            generate(&draft, &options, output.as_deref())
        }
        Command::Validate { draft, strict } => {
            validate(&draft, strict || config.general.strict_categories)
        }
        Command::Check { file } => check(&file),
        Command::List => list(&config),
    }
}

fn parse(file: &Path, id: Option<String>) -> Result<()> {
    let bytes = read_input(file)?;
    let text = std::str::from_utf8(&bytes)
        .map_err(|_| ParseError::NotText)
        .with_context(|| format!("parsing {}", file.display()))?;

    let json = match id {
        Some(id) => {
            let entry = codec::parse_with_metadata(text, EntryMetadata::new(id, Utc::now()))
                .with_context(|| format!("parsing {}", file.display()))?;
            serde_json::to_string_pretty(&entry)?
        }
        None => {
            let draft = codec::parse(text).with_context(|| format!("parsing {}", file.display()))?;
            serde_json::to_string_pretty(&draft)?
        }
    };
    println!("{}", json);
    Ok(())
}

fn generate(draft_path: &Path, options: &GenerateOptions, output: Option<&Path>) -> Result<()> {
    let bytes = read_input(draft_path)?;
    let draft: EntryDraft = serde_json::from_slice(&bytes)
        .with_context(|| format!("reading draft from {}", draft_path.display()))?;
    let content = codec::generate(&draft, options);

    match output {
        Some(path) => {
            let target = output_target(path, &draft.name);
            write_desktop_file(&target, &content)?;
            println!("{}", target.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn validate(draft_path: &Path, strict: bool) -> Result<()> {
    let bytes = read_input(draft_path)?;
    let value: serde_json::Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("reading draft from {}", draft_path.display()))?;
    let result = validate_entry_value(&value, strict);

    if result.valid {
        println!("valid");
        return Ok(());
    }
    for (field, message) in &result.errors {
        println!("{}: {}", field.as_str(), message);
    }
    bail!("{} field(s) failed validation", result.errors.len())
}

fn check(file: &Path) -> Result<()> {
    let bytes = read_input(file)?;
    if codec::looks_like_valid_format_bytes(&bytes) {
        println!("ok");
        Ok(())
    } else {
        println!("invalid");
        bail!("{} does not look like a desktop entry", file.display())
    }
}

fn list(config: &Config) -> Result<()> {
    let Some(dir) = config.applications_dir() else {
        bail!("could not determine the applications directory");
    };
    for entry in DesktopSource::new(vec![dir]).scan()? {
        println!("{}\t{}", entry.draft.name, entry.path.display());
    }
    Ok(())
}
