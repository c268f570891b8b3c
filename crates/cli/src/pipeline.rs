//! Reconciliation pipeline shared by the `check`, `create` and `export`
//! subcommands: parse the log, fetch the registry snapshot, classify
//! buckets and apply command-line resolution directives.

use std::path::Path;

use serde::Serialize;

use stationsplit_adif::read::{read_file, ParseOutput};
use stationsplit_adif::{load_reference_table, AdifError, ReferenceTable};
use stationsplit_engine::grouper::{group_records, GroupingSummary};
use stationsplit_engine::model::{Bucket, LogRecord, MatchStatus, ProfileRecord};
use stationsplit_engine::resolve::{resolve, set_create_flag, ResolutionTarget};
use stationsplit_engine::summary::{compute_summary, ProcessSummary};
use stationsplit_registry::{RegistryClient, RegistryError};

use crate::CliError;

/// Classified buckets plus everything worth reporting about how they
/// got that way.
pub struct Pipeline {
    pub buckets: Vec<Bucket>,
    pub grouping: GroupingSummary,
    pub warnings: Vec<String>,
}

/// Parse the log file. An unreadable file is fatal; malformed tags
/// surface as warnings on the output.
pub fn load_log(path: &Path) -> Result<ParseOutput, CliError> {
    let parsed = read_file(path).map_err(|e| CliError::log_parse(e.to_string()))?;
    if parsed.records.is_empty() {
        let err = AdifError::Malformed(format!("no records found in {}", path.display()));
        return Err(CliError::log_parse(err.to_string()));
    }
    Ok(parsed)
}

pub fn connect(url: &str, token: &str) -> Result<RegistryClient, CliError> {
    RegistryClient::new(url, token).map_err(|e| match e {
        RegistryError::NotConfigured => CliError::usage("registry URL or token missing")
            .with_hint("run `stationsplit config --url <URL> --token <TOKEN>` first"),
        other => CliError::network(other.to_string()),
    })
}

pub fn fetch_snapshot(client: &RegistryClient) -> Result<Vec<ProfileRecord>, CliError> {
    client.fetch_all().map_err(registry_error)
}

/// Load the configured DXCC reference table, if any. No configured path
/// is fine; an unreadable file degrades to a warning.
pub fn load_dxcc(path: Option<&str>) -> (Option<ReferenceTable>, Vec<String>) {
    let Some(path) = path else {
        return (None, Vec::new());
    };
    match load_reference_table(Path::new(path)) {
        Ok(loaded) => (Some(loaded.table), loaded.warnings),
        Err(e) => (None, vec![format!("reference table ignored: {e}")]),
    }
}

pub fn registry_error(e: RegistryError) -> CliError {
    match e {
        RegistryError::NotConfigured => CliError::usage("registry URL or token missing")
            .with_hint("run `stationsplit config --url <URL> --token <TOKEN>` first"),
        RegistryError::Protocol(msg) | RegistryError::Parse(msg) => CliError::protocol(msg),
        RegistryError::Rejected(msg) => CliError::creation(msg),
        other => CliError::network(other.to_string()),
    }
}

/// Group records and classify every bucket against the snapshot.
pub fn classify(records: &[LogRecord], snapshot: &[ProfileRecord]) -> Pipeline {
    let mut grouped = group_records(records);
    stationsplit_engine::matcher::classify_buckets(&mut grouped.buckets, snapshot);
    Pipeline {
        buckets: grouped.buckets,
        grouping: grouped.summary,
        warnings: grouped.warnings,
    }
}

// ---------------------------------------------------------------------------
// Command-line directives
// ---------------------------------------------------------------------------

/// Parse a `--resolve` argument: `CALL|LOC=<id>` or `CALL|LOC=new`.
pub fn parse_resolve(arg: &str) -> Result<(String, ResolutionTarget), CliError> {
    let (key, value) = split_directive(arg, "--resolve")?;
    let target = if value.eq_ignore_ascii_case("new") {
        ResolutionTarget::CreateNew
    } else {
        ResolutionTarget::Existing(value.to_string())
    };
    Ok((key, target))
}

/// Parse a `--name` argument: `CALL|LOC=<profile name>`.
pub fn parse_name(arg: &str) -> Result<(String, String), CliError> {
    let (key, value) = split_directive(arg, "--name")?;
    Ok((key, value.to_string()))
}

fn split_directive<'a>(arg: &'a str, flag: &str) -> Result<(String, &'a str), CliError> {
    let Some((key, value)) = arg.split_once('=') else {
        return Err(CliError::usage(format!("missing `=` in {flag} {arg:?}"))
            .with_hint(format!("syntax: {flag} 'CALL|LOC=value'")));
    };
    let key = key.trim().to_uppercase();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return Err(CliError::usage(format!("empty key or value in {flag} {arg:?}")));
    }
    Ok((key, value))
}

fn find_bucket<'a>(buckets: &'a mut [Bucket], key: &str) -> Result<&'a mut Bucket, CliError> {
    let known: Vec<String> = buckets.iter().map(|b| b.key.to_string()).collect();
    buckets
        .iter_mut()
        .find(|b| b.key.to_string() == key)
        .ok_or_else(|| {
            CliError::usage(format!("unknown station {key:?}"))
                .with_hint(format!("stations in this log: {}", known.join(", ")))
        })
}

/// Apply `--name`, `--resolve` and `--create` directives, in that order.
///
/// Names first, so a profile renamed on the command line is what a later
/// creation sends to the registry.
pub fn apply_directives(
    buckets: &mut [Bucket],
    names: &[String],
    resolves: &[String],
    creates: &[String],
) -> Result<(), CliError> {
    for arg in names {
        let (key, name) = parse_name(arg)?;
        let bucket = find_bucket(buckets, &key)?;
        if bucket.key.is_unassigned() {
            return Err(CliError::usage("cannot rename the UNASSIGNED bucket"));
        }
        bucket.profile_name = name;
    }

    for arg in resolves {
        let (key, target) = parse_resolve(arg)?;
        let bucket = find_bucket(buckets, &key)?;
        resolve(bucket, &target).map_err(|e| CliError::usage(e.to_string()))?;
    }

    for key in creates {
        let key = key.trim().to_uppercase();
        let bucket = find_bucket(buckets, &key)?;
        set_create_flag(bucket, true).map_err(|e| {
            CliError::usage(e.to_string())
                .with_hint("only unmatched stations can be marked for creation")
        })?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// One table/JSON row per bucket, mirroring the classification state.
#[derive(Debug, Serialize)]
pub struct BucketRow {
    pub key: String,
    pub callsign: String,
    pub locator: String,
    pub records: usize,
    pub profile_name: String,
    pub dxcc: String,
    /// `dxcc` rendered through the reference table, when one is loaded.
    pub dxcc_label: String,
    pub cq_zone: String,
    pub itu_zone: String,
    pub status: MatchStatus,
    pub station_id: String,
    pub create: bool,
}

pub fn bucket_rows(buckets: &[Bucket], dxcc: Option<&ReferenceTable>) -> Vec<BucketRow> {
    buckets
        .iter()
        .map(|b| BucketRow {
            key: b.key.to_string(),
            callsign: b.key.callsign().to_string(),
            locator: b.key.locator().to_string(),
            records: b.record_count(),
            profile_name: b.profile_name.clone(),
            dxcc: b.dxcc.clone(),
            dxcc_label: match dxcc {
                Some(table) => table.label_for(&b.dxcc),
                None => b.dxcc.clone(),
            },
            cq_zone: b.cq_zone.clone(),
            itu_zone: b.itu_zone.clone(),
            status: b.status,
            station_id: b.station_id.clone(),
            create: b.create_flag,
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub grouping: GroupingSummary,
    pub summary: ProcessSummary,
    pub buckets: Vec<BucketRow>,
    pub warnings: Vec<String>,
}

pub fn check_report(pipeline: &Pipeline, dxcc: Option<&ReferenceTable>) -> CheckReport {
    CheckReport {
        grouping: pipeline.grouping.clone(),
        summary: compute_summary(&pipeline.buckets),
        buckets: bucket_rows(&pipeline.buckets, dxcc),
        warnings: pipeline.warnings.clone(),
    }
}

/// Human-readable station table on stderr.
pub fn render_table(rows: &[BucketRow]) {
    let dxcc_width = rows
        .iter()
        .map(|r| r.dxcc_label.len())
        .chain(std::iter::once(4))
        .max()
        .unwrap_or(4);
    eprintln!(
        "{:<2} {:<10} {:<8} {:>5}  {:<24} {:<dxcc_width$} {:>3} {:>3}  {:<18} {}",
        "", "CALLSIGN", "LOCATOR", "QSOS", "PROFILE", "DXCC", "CQ", "ITU", "STATUS", "ID"
    );
    for row in rows {
        eprintln!(
            "{:<2} {:<10} {:<8} {:>5}  {:<24} {:<dxcc_width$} {:>3} {:>3}  {:<18} {}",
            if row.create { "X" } else { "" },
            row.callsign,
            row.locator,
            row.records,
            row.profile_name,
            row.dxcc_label,
            row.cq_zone,
            row.itu_zone,
            row.status.to_string(),
            row.station_id,
        );
    }
}

pub fn render_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stationsplit_engine::model::{CALLSIGN_FIELD, LOCATOR_FIELD};

    fn record(call: &str, loc: &str) -> LogRecord {
        LogRecord::from_pairs([(CALLSIGN_FIELD, call), (LOCATOR_FIELD, loc)])
    }

    fn ambiguous_snapshot() -> Vec<ProfileRecord> {
        vec![
            ProfileRecord::new("42", "DG9VH", "JO31", "Home"),
            ProfileRecord::new("43", "DG9VH", "JO31", "Fieldday"),
        ]
    }

    #[test]
    fn parse_resolve_existing_and_new() {
        let (key, target) = parse_resolve("dg9vh|jo31=43").unwrap();
        assert_eq!(key, "DG9VH|JO31");
        assert_eq!(target, ResolutionTarget::Existing("43".into()));

        let (_, target) = parse_resolve("DG9VH|JO31=NEW").unwrap();
        assert_eq!(target, ResolutionTarget::CreateNew);
    }

    #[test]
    fn parse_resolve_rejects_missing_separator() {
        let err = parse_resolve("DG9VH|JO31").unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_USAGE);
    }

    #[test]
    fn directives_resolve_ambiguity() {
        let mut pipeline = classify(&[record("DG9VH", "JO31")], &ambiguous_snapshot());
        assert_eq!(pipeline.buckets[0].status, MatchStatus::Ambiguous);

        apply_directives(&mut pipeline.buckets, &[], &["DG9VH|JO31=43".into()], &[]).unwrap();
        assert_eq!(pipeline.buckets[0].status, MatchStatus::Resolved);
        assert_eq!(pipeline.buckets[0].station_id, "43");
    }

    #[test]
    fn directives_mark_unmatched_for_creation_with_name() {
        let mut pipeline = classify(&[record("DL1AB", "JN48")], &[]);
        apply_directives(
            &mut pipeline.buckets,
            &["DL1AB|JN48=Portable".into()],
            &[],
            &["dl1ab|jn48".into()],
        )
        .unwrap();

        let bucket = &pipeline.buckets[0];
        assert_eq!(bucket.status, MatchStatus::MarkedNew);
        assert!(bucket.create_flag);
        assert_eq!(bucket.profile_name, "Portable");
    }

    #[test]
    fn unknown_station_is_usage_error_with_hint() {
        let mut pipeline = classify(&[record("DL1AB", "JN48")], &[]);
        let err =
            apply_directives(&mut pipeline.buckets, &[], &["ZZ9ZZ|AA00=7".into()], &[]).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_USAGE);
        assert!(err.hint.unwrap().contains("DL1AB|JN48"));
    }

    #[test]
    fn report_rows_follow_bucket_order() {
        let pipeline = classify(
            &[record("DG9VH", "JO31"), record("DL1AB", "JN48")],
            &[ProfileRecord::new("42", "DG9VH", "JO31", "Home")],
        );
        let report = check_report(&pipeline, None);
        assert_eq!(report.buckets.len(), 2);
        assert_eq!(report.buckets[0].station_id, "42");
        assert_eq!(report.buckets[0].status, MatchStatus::UniqueMatch);
        assert_eq!(report.buckets[1].status, MatchStatus::Unmatched);
        assert_eq!(report.summary.unique_matches, 1);
    }

    #[test]
    fn rows_carry_reference_labels_when_table_given() {
        let mut r = record("DG9VH", "JO31");
        r.set(stationsplit_engine::model::DXCC_FIELD, "230".into());
        let pipeline = classify(&[r], &[]);

        let mut table = ReferenceTable::new();
        table.insert("230", "Germany");
        let report = check_report(&pipeline, Some(&table));
        assert_eq!(report.buckets[0].dxcc, "230");
        assert_eq!(report.buckets[0].dxcc_label, "Germany (ID: 230)");

        // Without a table the label is just the code.
        let plain = check_report(&pipeline, None);
        assert_eq!(plain.buckets[0].dxcc_label, "230");
    }

    #[test]
    fn empty_log_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.adi");
        std::fs::write(&path, "nothing resembling a tag").unwrap();

        let err = load_log(&path).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_LOG_PARSE);
        assert!(err.message.contains("no records found"));
    }

    #[test]
    fn missing_dxcc_path_loads_nothing() {
        let (table, warnings) = load_dxcc(None);
        assert!(table.is_none());
        assert!(warnings.is_empty());

        let (table, warnings) = load_dxcc(Some("/nonexistent/dxcc.csv"));
        assert!(table.is_none());
        assert_eq!(warnings.len(), 1);
    }
}
