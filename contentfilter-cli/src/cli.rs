use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use contentfilter::output::{write_human, write_json};
use contentfilter::{
    ContentFilter, ContentFilterConfig, FsSourceConfig, InputSource, MultiContentFilter,
    TEXT_PLAIN, format_to, validate_fs,
};
use url::Url;

use crate::logging;

#[derive(Parser, Debug)]
#[command(
    name = "contentfilter",
    version,
    about = "Validate and render user-submitted text and XHTML"
)]
struct Cli {
    /// JSON filter configuration (allowed classes, fallback policy)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate and render one document as XHTML
    Format(FormatArgs),
    /// Validate every content file under the given paths
    Validate(ValidateArgs),
}

#[derive(Args, Debug)]
struct FormatArgs {
    /// MIME type of the content
    #[arg(long = "type", value_name = "MIME", default_value = TEXT_PLAIN)]
    content_type: String,
    /// Base URL relative links are rebased onto
    #[arg(long, value_name = "URL")]
    base_url: Option<Url>,
    /// Input file; reads stdin when omitted
    file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
    /// Glob of files to skip (repeatable)
    #[arg(long = "exclude", action = ArgAction::Append, value_name = "GLOB")]
    exclude: Vec<String>,
    /// Maximum file size in bytes
    #[arg(long, value_name = "BYTES", default_value_t = 1_048_576)]
    max_file_size: u64,
    /// Files or directories to validate
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,
}

/// Parse the command line and run the selected command.
///
/// # Errors
///
/// Returns an error if the config, input or output cannot be handled.
pub fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => ContentFilterConfig::from_file(path)?,
        None => ContentFilterConfig::default(),
    };
    let filter = MultiContentFilter::from_config(&config);
    tracing::debug!(?filter, "Filters configured");

    match cli.command {
        Commands::Format(args) => run_format(&args, &filter),
        Commands::Validate(args) => run_validate(args, &filter),
    }
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn run_format(args: &FormatArgs, filter: &MultiContentFilter) -> anyhow::Result<ExitCode> {
    let text = read_input(args.file.as_deref())?;
    let mime = args.content_type.as_str();
    let prefix = filter.prefix(mime);
    let suffix = filter.suffix(mime);

    let mut source = InputSource::framed(prefix, &text, suffix);
    if let Err(err) = filter.validate(mime, source.reader()) {
        eprintln!("Invalid content: {err}");
        return Ok(ExitCode::FAILURE);
    }

    let mut out = Vec::new();
    format_to(
        mime,
        args.base_url.as_ref(),
        InputSource::framed(prefix, &text, suffix),
        filter,
        &mut out,
    )?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&out)?;
    writeln!(stdout)?;
    Ok(ExitCode::SUCCESS)
}

fn run_validate(args: ValidateArgs, filter: &MultiContentFilter) -> anyhow::Result<ExitCode> {
    let mut fs_config = FsSourceConfig::default();
    fs_config.paths = args.paths;
    fs_config.exclude = args.exclude;
    fs_config.max_file_size = args.max_file_size;

    let report = validate_fs(&fs_config, filter)?;

    let mut stdout = io::stdout().lock();
    if args.json {
        write_json(&report, &mut stdout)?;
    } else {
        write_human(&report, &mut stdout)?;
    }

    Ok(if report.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
