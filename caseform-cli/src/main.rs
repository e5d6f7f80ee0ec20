use std::path::PathBuf;

use clap::{ArgAction, Parser};
use color_eyre::eyre::{Report, Result};

use caseform::{
    DRAFT_TTL_HOURS, FileDraftStore, FormUi, OutputDestination, OutputOptions, UiOptions,
    collected_to_value, emit,
};

#[derive(Debug, Parser)]
#[command(
    name = "caseform",
    version,
    about = "Run the CCTV footage-recovery request form in the terminal"
)]
struct Cli {
    /// Directory where in-progress drafts are kept
    #[arg(long = "draft-dir", value_name = "DIR")]
    draft_dir: Option<PathBuf>,

    /// Disable draft persistence entirely
    #[arg(long = "no-drafts")]
    no_drafts: bool,

    /// Draft lifetime in hours
    #[arg(long = "draft-ttl", value_name = "HOURS", default_value_t = DRAFT_TTL_HOURS)]
    draft_ttl: i64,

    /// Title shown above the form
    #[arg(long = "title", value_name = "TEXT")]
    title: Option<String>,

    /// Output destinations for the submitted data ("-" writes to stdout)
    #[arg(short = 'o', long = "output", value_name = "DEST", num_args = 1.., action = ArgAction::Append)]
    outputs: Vec<String>,

    /// Emit compact JSON rather than pretty formatting
    #[arg(long = "no-pretty")]
    no_pretty: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();
    let cli = Cli::parse();

    let mut ui = FormUi::recovery().with_options(UiOptions::default());
    if let Some(title) = cli.title {
        ui = ui.with_title(title);
    }
    if !cli.no_drafts {
        let dir = cli.draft_dir.unwrap_or_else(default_draft_dir);
        ui = ui
            .with_store(Box::new(FileDraftStore::new(dir)))
            .with_draft_ttl(chrono::Duration::hours(cli.draft_ttl));
    }

    let Some(values) = ui.run().map_err(Report::msg)? else {
        eprintln!("exited without submitting");
        return Ok(());
    };

    let destinations = if cli.outputs.is_empty() {
        vec![OutputDestination::Stdout]
    } else {
        cli.outputs
            .iter()
            .map(|spec| {
                if spec == "-" {
                    OutputDestination::Stdout
                } else {
                    OutputDestination::file(spec)
                }
            })
            .collect()
    };
    let options = OutputOptions::default()
        .with_pretty(!cli.no_pretty)
        .with_destinations(destinations);
    emit(&collected_to_value(&values), &options).map_err(Report::msg)?;
    Ok(())
}

fn default_draft_dir() -> PathBuf {
    std::env::temp_dir().join("caseform-drafts")
}
