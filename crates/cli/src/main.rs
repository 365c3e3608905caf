// ABOUTME: CLI entry point for the boon compendium pipeline.
// ABOUTME: Each subcommand runs one batch stage; `run` chains fetch through combine.

mod logging;
mod settings;
mod stages;
mod summary;

use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand};
use compendium_store::Store;

use crate::settings::{GlobalArgs, Settings};
use crate::summary::StageSummary;

/// Scrape boon tables into a local database and render them for the site.
#[derive(Parser, Debug)]
#[command(name = "compendium")]
#[command(about = "Scrape, store and export boon tables", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    stage: Stage,
}

#[derive(Subcommand, Debug)]
enum Stage {
    /// Download each source page and save its boon table under boons/
    Fetch,
    /// Extract records from the saved tables and replace the database contents
    Seed,
    /// Download referenced images and point fragments at the local copies
    Images {
        /// Scan every field, not just the boon cell
        #[arg(long, default_value_t = false)]
        all_fields: bool,
    },
    /// Write public/data/boons.json
    Export,
    /// Write combined-boons.html
    Combine,
    /// Print stored boons, optionally filtered by a search term
    Query {
        term: Option<String>,
    },
    /// List boons that have no local image
    Missing,
    /// Rename icon files to <source>_<slug>_icon.<ext>
    NormalizeIcons,
    /// Delete every stored record and asset
    Reset,
    /// fetch, seed, images, export and combine in order
    Run,
}

fn open_store(settings: &Settings) -> Result<Store> {
    Ok(Store::open(&settings.db_path)?)
}

async fn dispatch(stage: Stage, settings: &Settings) -> Result<Vec<StageSummary>> {
    let summaries = match stage {
        Stage::Fetch => vec![stages::fetch::run(settings).await?],
        Stage::Seed => {
            let mut store = open_store(settings)?;
            vec![stages::seed::run(settings, &mut store).await?]
        }
        Stage::Images { all_fields } => {
            let mut store = open_store(settings)?;
            vec![stages::images::run(settings, &mut store, all_fields).await?]
        }
        Stage::Export => vec![stages::export::run_export(settings, &open_store(settings)?)?],
        Stage::Combine => vec![stages::export::run_combine(settings, &open_store(settings)?)?],
        Stage::Query { term } => {
            let store = open_store(settings)?;
            let mut out = io::stdout().lock();
            vec![stages::query::run(&store, term.as_deref(), &mut out)?]
        }
        Stage::Missing => {
            let store = open_store(settings)?;
            let mut out = io::stdout().lock();
            vec![stages::missing::run(settings, &store, &mut out)?]
        }
        Stage::NormalizeIcons => {
            let mut store = open_store(settings)?;
            vec![stages::normalize::run(settings, &mut store)?]
        }
        Stage::Reset => {
            let mut store = open_store(settings)?;
            vec![stages::reset::run(&mut store)?]
        }
        Stage::Run => {
            let mut summaries = vec![stages::fetch::run(settings).await?];
            let mut store = open_store(settings)?;
            summaries.push(stages::seed::run(settings, &mut store).await?);
            summaries.push(stages::images::run(settings, &mut store, false).await?);
            summaries.push(stages::export::run_export(settings, &store)?);
            summaries.push(stages::export::run_combine(settings, &store)?);
            summaries
        }
    };
    Ok(summaries)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing("info")?;

    let settings = Settings::from_args(cli.global)?;
    for summary in dispatch(cli.stage, &settings).await? {
        println!("{}", summary);
    }
    Ok(())
}
