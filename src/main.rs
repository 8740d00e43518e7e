use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use argo_ingest_service::basin::BasinMask;
use argo_ingest_service::config::{ServiceConfig, DEFAULT_CONFIG_PATH};
use argo_ingest_service::db;
use argo_ingest_service::ingest::profile::{self, ProfileAssembler, ProfileDocument};
use argo_ingest_service::ingest::IngestTally;
use argo_ingest_service::logging::{self, Component};
use argo_ingest_service::summaries;

#[derive(clap::Parser)]
#[command(about = "Ingest BGC-Argo+ float profiles with cleaned positions and basin tags")]
struct ClArgs {
    /// Float file exports (JSON) to ingest
    #[arg()]
    profile_files: Vec<PathBuf>,

    /// Service configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Assemble documents and print them, with the summaries they would
    /// produce, instead of writing to the database
    #[arg(long)]
    dry_run: bool,

    /// Only recompute the summary documents
    #[arg(long)]
    summaries_only: bool,
}

fn main() -> ExitCode {
    let args = ClArgs::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logging::error(Component::System, None, &e.to_string());
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &ClArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::load(&args.config)?;
    logging::init_logger(
        config.logging.min_level(),
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );

    if args.summaries_only {
        let mut client = db::connect(&config.database_url()?)?;
        db::update_summaries(&mut client)?;
        return Ok(());
    }

    let grid = BasinMask::load(&config.basin_grid.path)?;
    logging::info(
        Component::Basin,
        None,
        &format!(
            "Loaded basin grid {}: {} of {} points tagged",
            config.basin_grid.path,
            grid.ocean_cell_count(),
            grid.cell_count()
        ),
    );

    let normalizer = config.normalizer.build();
    let assembler = ProfileAssembler::new(&normalizer, &grid, config.normalizer.suppress_warnings);

    let mut client = if args.dry_run {
        None
    } else {
        let mut client = db::connect(&config.database_url()?)?;
        db::ensure_schema(&mut client)?;
        Some(client)
    };

    let mut tally = IngestTally::new();
    let mut previewed: Vec<ProfileDocument> = Vec::new();

    for path in &args.profile_files {
        let file = match profile::read_float_file(path) {
            Ok(file) => file,
            Err(e) => {
                logging::error(Component::Ingest, None, &format!("{}: {}", path.display(), e));
                tally.record_unreadable_file();
                continue;
            }
        };

        let assembled = assembler.assemble_file(&file, Utc::now());
        tally.record_assembled(&assembled);

        match client.as_mut() {
            Some(client) => {
                if let Err(e) = db::upsert_metadata(client, &assembled.metadata) {
                    logging::error(
                        Component::Database,
                        Some(&assembled.metadata.id),
                        &format!("metadata upsert failure: {}", e),
                    );
                }
                let (ok, bad) = db::upsert_profiles(client, &assembled.documents);
                tally.record_stored(ok, bad);
            }
            None => {
                println!("{}", serde_json::to_string_pretty(&assembled.metadata)?);
                for doc in &assembled.documents {
                    println!("{}", serde_json::to_string_pretty(doc)?);
                }
                tally.record_stored(assembled.documents.len(), 0);
                previewed.extend(assembled.documents);
            }
        }
    }

    tally.log_summary();

    if args.dry_run {
        // Summaries this batch alone would produce; nothing is merged with stored rows.
        let keys = summaries::collect_data_keys(&previewed);
        println!("{}", serde_json::to_string_pretty(&summaries::data_keys_summary(&keys))?);
        if let Some(window) = summaries::qc_time_window(&previewed) {
            println!("{}", serde_json::to_string_pretty(&summaries::merge_rate_limit(None, &window))?);
        }
    }

    if let Some(client) = client.as_mut() {
        db::update_summaries(client)?;
    }
    Ok(())
}
