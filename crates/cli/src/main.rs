// stationsplit CLI - split ADIF logs per station profile, reconciled
// against a Wavelog station registry.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use stationsplit_cli::exit_codes::EXIT_SUCCESS;
use stationsplit_cli::pipeline::{self, Pipeline};
use stationsplit_cli::CliError;
use stationsplit_config::{normalize_url, Settings};
use stationsplit_engine::model::{MatchStatus, ID_ERROR, ID_UNCLEAR};
use stationsplit_engine::partition::partition_buckets;
use stationsplit_registry::{CreationResult, NewStation, RegistryClient};

#[derive(Parser)]
#[command(name = "stationsplit")]
#[command(about = "Split ADIF logs per station profile, reconciled against a Wavelog registry")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every station in a log against the registry
    #[command(after_help = "\
Exit code 30 indicates stations with more than one matching registry
profile; resolve them with --resolve and re-run.

Examples:
  stationsplit check worklog.adi
  stationsplit check worklog.adi --json
  stationsplit check worklog.adi --resolve 'DG9VH|JO31=43'
  stationsplit check worklog.adi --resolve 'DG9VH|JO31=new' --create 'DL1AB|JN48'")]
    Check {
        /// ADIF log file
        log: PathBuf,

        /// Registry base URL (overrides stored settings)
        #[arg(long, env = "STATIONSPLIT_URL")]
        url: Option<String>,

        /// Registry API token (overrides stored settings)
        #[arg(long, env = "STATIONSPLIT_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Pick one profile for an ambiguous station. Repeatable.
        #[arg(long, value_name = "KEY=ID|new")]
        resolve: Vec<String>,

        /// Mark an unmatched station for creation. Repeatable.
        #[arg(long, value_name = "KEY")]
        create: Vec<String>,

        /// Profile name to use for a station. Repeatable.
        #[arg(long, value_name = "KEY=NAME")]
        name: Vec<String>,

        /// Output the report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Create marked stations in the registry and recover their ids
    #[command(after_help = "\
Creations run one by one; a failure never aborts the rest of the batch.
After the batch the registry is re-fetched once to look up the new ids.

Examples:
  stationsplit create worklog.adi --create 'DL1AB|JN48' --name 'DL1AB|JN48=Portable'
  stationsplit create worklog.adi --resolve 'DG9VH|JO31=new'")]
    Create {
        /// ADIF log file
        log: PathBuf,

        /// Registry base URL (overrides stored settings)
        #[arg(long, env = "STATIONSPLIT_URL")]
        url: Option<String>,

        /// Registry API token (overrides stored settings)
        #[arg(long, env = "STATIONSPLIT_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Pick one profile for an ambiguous station. Repeatable.
        #[arg(long, value_name = "KEY=ID|new")]
        resolve: Vec<String>,

        /// Mark an unmatched station for creation. Repeatable.
        #[arg(long, value_name = "KEY")]
        create: Vec<String>,

        /// Profile name to use for a station. Repeatable.
        #[arg(long, value_name = "KEY=NAME")]
        name: Vec<String>,

        /// Output per-station outcomes as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Split the log into one ADIF file per station
    #[command(after_help = "\
Stations that are still ambiguous are skipped with a warning and never
exported. File names follow the derived export key, e.g.
ID_42_Home_JO31.adi or NOID_NA_DL1AB_JN48.adi.

Examples:
  stationsplit export worklog.adi -o ./split
  stationsplit export worklog.adi -o ./split --resolve 'DG9VH|JO31=43'")]
    Export {
        /// ADIF log file
        log: PathBuf,

        /// Output directory (created when missing)
        #[arg(long, short = 'o')]
        out: PathBuf,

        /// Registry base URL (overrides stored settings)
        #[arg(long, env = "STATIONSPLIT_URL")]
        url: Option<String>,

        /// Registry API token (overrides stored settings)
        #[arg(long, env = "STATIONSPLIT_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Pick one profile for an ambiguous station. Repeatable.
        #[arg(long, value_name = "KEY=ID|new")]
        resolve: Vec<String>,

        /// Mark an unmatched station for creation. Repeatable.
        #[arg(long, value_name = "KEY")]
        create: Vec<String>,

        /// Profile name to use for a station. Repeatable.
        #[arg(long, value_name = "KEY=NAME")]
        name: Vec<String>,

        /// Output the written file list as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Show or change stored settings
    #[command(after_help = "\
Examples:
  stationsplit config
  stationsplit config --url log.example.com --token SECRET
  stationsplit config --dxcc ~/dxcc.csv")]
    Config {
        /// Registry base URL (normalized to end in /api)
        #[arg(long)]
        url: Option<String>,

        /// Registry API token
        #[arg(long)]
        token: Option<String>,

        /// Path to a DXCC reference CSV
        #[arg(long)]
        dxcc: Option<PathBuf>,
    },

    /// Validate and summarize a DXCC reference table
    Dxcc {
        /// CSV file (defaults to the configured dxcc path)
        file: Option<PathBuf>,

        /// Output entries and warnings as JSON on stdout
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { log, url, token, resolve, create, name, json } => {
            cmd_check(log, url, token, resolve, create, name, json)
        }
        Commands::Create { log, url, token, resolve, create, name, json } => {
            cmd_create(log, url, token, resolve, create, name, json)
        }
        Commands::Export { log, out, url, token, resolve, create, name, json } => {
            cmd_export(log, out, url, token, resolve, create, name, json)
        }
        Commands::Config { url, token, dxcc } => cmd_config(url, token, dxcc),
        Commands::Dxcc { file, json } => cmd_dxcc(file, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Load stored settings, reporting problems with the settings file.
fn load_settings() -> Settings {
    let (settings, warnings) = Settings::load();
    pipeline::render_warnings(&warnings);
    settings
}

/// Merge flag/env overrides with stored settings.
fn effective_connection(
    settings: &Settings,
    url: Option<String>,
    token: Option<String>,
) -> (String, String) {
    let url = url
        .map(|u| normalize_url(&u))
        .unwrap_or_else(|| settings.url.clone());
    let token = token.unwrap_or_else(|| settings.token.clone());
    (url, token)
}

/// Parse the log, fetch the snapshot, classify and apply directives.
fn run_pipeline(
    log: &PathBuf,
    client: &RegistryClient,
    resolve: &[String],
    create: &[String],
    name: &[String],
) -> Result<Pipeline, CliError> {
    let parsed = pipeline::load_log(log)?;
    pipeline::render_warnings(&parsed.warnings);

    let snapshot = pipeline::fetch_snapshot(client)?;
    eprintln!("{} station profiles loaded from the registry", snapshot.len());

    let mut p = pipeline::classify(&parsed.records, &snapshot);
    pipeline::render_warnings(&p.warnings);
    pipeline::apply_directives(&mut p.buckets, name, resolve, create)?;
    Ok(p)
}

// ============================================================================
// check
// ============================================================================

fn cmd_check(
    log: PathBuf,
    url: Option<String>,
    token: Option<String>,
    resolve: Vec<String>,
    create: Vec<String>,
    name: Vec<String>,
    json: bool,
) -> Result<(), CliError> {
    let settings = load_settings();
    let (url, token) = effective_connection(&settings, url, token);
    let client = pipeline::connect(&url, &token)?;
    let p = run_pipeline(&log, &client, &resolve, &create, &name)?;

    // DXCC names show up in the table when a reference table is configured.
    let (dxcc, dxcc_warnings) = pipeline::load_dxcc(settings.dxcc_path.as_deref());
    pipeline::render_warnings(&dxcc_warnings);

    let report = pipeline::check_report(&p, dxcc.as_ref());
    pipeline::render_table(&report.buckets);
    eprintln!(
        "{} records, {} stations, {} unassigned",
        report.grouping.total_records,
        report.grouping.distinct_stations,
        report.grouping.unassigned_records,
    );

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).map_err(|e| CliError::general(e.to_string()))?
        );
    }

    if report.summary.ambiguous > 0 {
        return Err(CliError::unresolved(format!(
            "{} station(s) match more than one registry profile",
            report.summary.ambiguous
        ))
        .with_hint("pick one with --resolve 'CALL|LOC=<id>' or --resolve 'CALL|LOC=new'"));
    }
    Ok(())
}

// ============================================================================
// create
// ============================================================================

fn cmd_create(
    log: PathBuf,
    url: Option<String>,
    token: Option<String>,
    resolve: Vec<String>,
    create: Vec<String>,
    name: Vec<String>,
    json: bool,
) -> Result<(), CliError> {
    let settings = load_settings();
    let (url, token) = effective_connection(&settings, url, token);
    let client = pipeline::connect(&url, &token)?;
    let mut p = run_pipeline(&log, &client, &resolve, &create, &name)?;

    let marked: Vec<usize> = p
        .buckets
        .iter()
        .enumerate()
        .filter(|(_, b)| b.create_flag && b.status == MatchStatus::MarkedNew)
        .map(|(i, _)| i)
        .collect();

    if marked.is_empty() {
        eprintln!("no stations marked for creation");
        if json {
            println!("{}", serde_json::json!({ "results": [] }));
        }
        return Ok(());
    }

    let stations: Vec<NewStation> = marked
        .iter()
        .map(|&i| {
            let b = &p.buckets[i];
            NewStation {
                callsign: b.key.callsign().to_string(),
                locator: b.key.locator().to_string(),
                profile_name: b.profile_name.clone(),
                dxcc: b.dxcc.clone(),
                cq_zone: b.cq_zone.clone(),
                itu_zone: b.itu_zone.clone(),
            }
        })
        .collect();

    eprintln!("creating {} station profile(s)...", stations.len());
    let outcome = client.create_and_identify(&stations);
    pipeline::render_warnings(&outcome.warnings);

    let mut failed = 0usize;
    let mut results = Vec::new();
    for (&i, result) in marked.iter().zip(outcome.results.iter()) {
        let bucket = &mut p.buckets[i];
        let key = bucket.key.to_string();
        match result {
            CreationResult::Identified(id) => {
                bucket.station_id = id.clone();
                bucket.status = MatchStatus::Created;
                bucket.create_flag = false;
                eprintln!("{key}: created, id {id}");
            }
            CreationResult::IdUnclear => {
                bucket.station_id = ID_UNCLEAR.to_string();
                bucket.status = MatchStatus::CreatedIdUnclear;
                bucket.create_flag = false;
                eprintln!("{key}: created, but no unambiguous id found");
            }
            CreationResult::Failed(msg) => {
                bucket.station_id = ID_ERROR.to_string();
                failed += 1;
                eprintln!("{key}: creation failed: {msg}");
            }
        }
        results.push(serde_json::json!({
            "key": key,
            "station_id": p.buckets[i].station_id,
            "status": p.buckets[i].status,
            "outcome": result,
        }));
    }

    pipeline::render_table(&pipeline::bucket_rows(&p.buckets, None));

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "results": results }))
                .map_err(|e| CliError::general(e.to_string()))?
        );
    }

    if failed > 0 {
        return Err(CliError::creation(format!(
            "{failed} of {} creation(s) failed",
            marked.len()
        )));
    }
    Ok(())
}

// ============================================================================
// export
// ============================================================================

fn cmd_export(
    log: PathBuf,
    out: PathBuf,
    url: Option<String>,
    token: Option<String>,
    resolve: Vec<String>,
    create: Vec<String>,
    name: Vec<String>,
    json: bool,
) -> Result<(), CliError> {
    let settings = load_settings();
    let (url, token) = effective_connection(&settings, url, token);
    let client = pipeline::connect(&url, &token)?;
    let p = run_pipeline(&log, &client, &resolve, &create, &name)?;

    let partitioned = partition_buckets(&p.buckets);
    for key in &partitioned.skipped {
        eprintln!("warning: {key} skipped (still ambiguous, use --resolve)");
    }

    let report = stationsplit_adif::write_partitions(&out, &partitioned.partitions)
        .map_err(|e| CliError::export_io(e.to_string()))?;
    pipeline::render_warnings(&report.warnings);
    for file in &report.files {
        eprintln!("wrote {} ({} records)", file.path.display(), file.record_count);
    }

    if json {
        let files: Vec<serde_json::Value> = report
            .files
            .iter()
            .map(|f| {
                serde_json::json!({
                    "export_key": f.export_key,
                    "path": f.path,
                    "records": f.record_count,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "files": files,
                "skipped": partitioned.skipped,
            }))
            .map_err(|e| CliError::general(e.to_string()))?
        );
    }

    if !report.warnings.is_empty() {
        return Err(CliError::export_io(format!(
            "{} file(s) could not be written",
            report.warnings.len()
        )));
    }
    Ok(())
}

// ============================================================================
// config
// ============================================================================

fn cmd_config(
    url: Option<String>,
    token: Option<String>,
    dxcc: Option<PathBuf>,
) -> Result<(), CliError> {
    let mut settings = load_settings();

    if url.is_none() && token.is_none() && dxcc.is_none() {
        eprintln!("settings file: {}", Settings::config_path_display());
        eprintln!("url:   {}", if settings.url.is_empty() { "(not set)" } else { &settings.url });
        eprintln!("token: {}", if settings.token.is_empty() { "(not set)" } else { "(set)" });
        eprintln!(
            "dxcc:  {}",
            settings.dxcc_path.as_deref().unwrap_or("(not set)")
        );
        return Ok(());
    }

    if let Some(url) = url {
        settings.url = normalize_url(&url);
        eprintln!("url normalized to {}", settings.url);
    }
    if let Some(token) = token {
        settings.token = token;
    }
    if let Some(dxcc) = dxcc {
        settings.dxcc_path = Some(dxcc.to_string_lossy().to_string());
    }

    settings
        .save()
        .map_err(|e| CliError::general(format!("cannot save settings: {e}")))?;
    eprintln!("settings saved to {}", Settings::config_path_display());
    Ok(())
}

// ============================================================================
// dxcc
// ============================================================================

fn cmd_dxcc(file: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let settings = load_settings();
    let path = file
        .or_else(|| settings.dxcc_path.as_deref().map(PathBuf::from))
        .ok_or_else(|| {
            CliError::usage("no reference table given")
                .with_hint("pass a file or set one with `stationsplit config --dxcc <path>`")
        })?;

    let loaded = stationsplit_adif::load_reference_table(&path)
        .map_err(|e| CliError::reference_table(e.to_string()))?;
    pipeline::render_warnings(&loaded.warnings);
    eprintln!("{} entries loaded from {}", loaded.table.len(), path.display());

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "entries": loaded.table.len(),
                "labels": loaded.table.combo_list(),
                "warnings": loaded.warnings,
            }))
            .map_err(|e| CliError::general(e.to_string()))?
        );
    }
    Ok(())
}
