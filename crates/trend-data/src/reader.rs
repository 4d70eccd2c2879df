//! Snapshot discovery and CSV loading for the epi-trend pipeline.
//!
//! Reads per-date case snapshots from a data checkout and converts them into
//! [`CaseRecord`] structs for downstream processing. Each snapshot's report
//! date is encoded in its filename (`MM-DD-YYYY.csv`), not in row content.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use regex::Regex;
use tracing::{debug, info, warn};

use trend_core::error::{PipelineError, Result};
use trend_core::models::CaseRecord;

/// Subdirectory of the data checkout holding one snapshot CSV per date.
pub const DAILY_REPORTS_SUBDIR: &str = "csse_covid_19_data/csse_covid_19_daily_reports";

// ── Public API ────────────────────────────────────────────────────────────────

/// The combined record set from one full directory scan.
#[derive(Debug, Clone)]
pub struct SnapshotBatch {
    /// All rows across all snapshot files, tagged with their report date.
    pub records: Vec<CaseRecord>,
    /// Number of snapshot files read.
    pub files_read: usize,
}

/// Find all `.csv` files under `reports_dir`, sorted by path.
///
/// Sorting makes iteration deterministic; downstream aggregation does not
/// depend on read order.
pub fn find_snapshot_files(reports_dir: &Path) -> Vec<PathBuf> {
    if !reports_dir.exists() {
        warn!("Reports path does not exist: {}", reports_dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(reports_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "csv")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Parse the report date embedded in a snapshot filename.
///
/// Accepts a `MM-DD-YYYY` triple, dash- or dot-delimited, with an optional
/// `.csv` suffix. Anything else is [`PipelineError::MalformedFilename`]:
/// rows from an undatable file cannot be placed in the series, so the whole
/// run aborts.
pub fn date_from_filename(name: &str) -> Result<NaiveDate> {
    let stem = name.strip_suffix(".csv").unwrap_or(name);

    let re = Regex::new(r"^(\d{1,2})[-.](\d{1,2})[-.](\d{4})$").expect("regex is valid");
    let Some(cap) = re.captures(stem) else {
        return Err(PipelineError::MalformedFilename(name.to_string()));
    };

    let (Ok(month), Ok(day), Ok(year)) = (
        cap[1].parse::<u32>(),
        cap[2].parse::<u32>(),
        cap[3].parse::<i32>(),
    ) else {
        return Err(PipelineError::MalformedFilename(name.to_string()));
    };

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| PipelineError::MalformedFilename(name.to_string()))
}

/// Read one snapshot file into [`CaseRecord`]s, tagging every row with `date`.
///
/// The header row is matched through a normalized name map, reconciling the
/// schema drift between snapshot generations (`Country/Region` vs
/// `Country_Region`, `Province/State` vs `Province_State`, extra columns).
/// Missing or blank numeric cells read as 0.
pub fn load_snapshot(path: &Path, date: NaiveDate) -> Result<Vec<CaseRecord>> {
    let file = std::fs::File::open(path).map_err(|e| PipelineError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::UnreadableSnapshot {
            path: path.to_path_buf(),
            source: e,
        })?
        .clone();
    let header_map = build_header_map(&headers);

    if !header_map.contains_key(COL_COUNTRY) {
        warn!(
            "Snapshot {} has no country column; rows will carry an empty label",
            path.display()
        );
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| PipelineError::UnreadableSnapshot {
            path: path.to_path_buf(),
            source: e,
        })?;

        records.push(CaseRecord {
            date,
            province: get_field(&record, &header_map, COL_PROVINCE).map(str::to_string),
            country: get_field(&record, &header_map, COL_COUNTRY)
                .unwrap_or_default()
                .to_string(),
            confirmed: parse_count(get_field(&record, &header_map, COL_CONFIRMED)),
            deaths: parse_count(get_field(&record, &header_map, COL_DEATHS)),
            recovered: parse_count(get_field(&record, &header_map, COL_RECOVERED)),
        });
    }

    debug!("Snapshot {}: {} rows", path.display(), records.len());
    Ok(records)
}

/// Resolve the directory holding the snapshot files.
///
/// Prefers the fixed [`DAILY_REPORTS_SUBDIR`] under `root` (the layout of the
/// upstream data checkout); when that is absent, `root` itself is used so the
/// tool can be pointed straight at a folder of snapshots.
pub fn resolve_reports_dir(root: &Path) -> Result<PathBuf> {
    let sub = root.join(DAILY_REPORTS_SUBDIR);
    if sub.is_dir() {
        return Ok(sub);
    }
    if root.is_dir() {
        return Ok(root.to_path_buf());
    }
    Err(PipelineError::DataPathNotFound(root.to_path_buf()))
}

/// Load every daily snapshot under `root` into one combined record set.
///
/// Structural failures (an undatable filename, an unparseable file) abort the
/// whole run: a partial record set would silently under-represent the time
/// series and corrupt every derived ratio.
pub fn load_daily_cases(root: &Path) -> Result<SnapshotBatch> {
    let reports_dir = resolve_reports_dir(root)?;
    let files = find_snapshot_files(&reports_dir);
    if files.is_empty() {
        return Err(PipelineError::NoSnapshotFiles(reports_dir));
    }

    let mut records: Vec<CaseRecord> = Vec::new();
    for path in &files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PipelineError::MalformedFilename(path.display().to_string()))?;
        let date = date_from_filename(name)?;

        info!("Reading: {}", name);
        records.extend(load_snapshot(path, date)?);
    }

    info!(
        "Daily records read: {} rows from {} files",
        records.len(),
        files.len()
    );

    Ok(SnapshotBatch {
        records,
        files_read: files.len(),
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

const COL_PROVINCE: &str = "province_state";
const COL_COUNTRY: &str = "country_region";
const COL_CONFIRMED: &str = "confirmed";
const COL_DEATHS: &str = "deaths";
const COL_RECOVERED: &str = "recovered";

/// Map normalized header names to their column index.
fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

/// Normalize one header name: strip any BOM prefix, lowercase, and unify the
/// `/`-style and `_`-style column naming used by different snapshot
/// generations.
fn normalize_header_name(name: &str) -> String {
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase().replace(['/', ' '], "_")
}

/// Fetch a field by normalized column name; `None` when the column is absent
/// or the cell is empty.
fn get_field<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a count cell, treating absent / blank / unparseable values as 0.
///
/// Some snapshot generations serialize counts as floats ("10.0").
fn parse_count(field: Option<&str>) -> u64 {
    let Some(s) = field else { return 0 };
    if let Ok(v) = s.parse::<u64>() {
        return v;
    }
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v as u64)
        .unwrap_or(0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_snapshot(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    // ── date_from_filename ────────────────────────────────────────────────────

    #[test]
    fn test_date_from_filename_dash_delimited() {
        assert_eq!(date_from_filename("03-01-2020.csv").unwrap(), date("2020-03-01"));
        assert_eq!(date_from_filename("12-31-2019.csv").unwrap(), date("2019-12-31"));
    }

    #[test]
    fn test_date_from_filename_dot_delimited() {
        assert_eq!(date_from_filename("03.01.2020.csv").unwrap(), date("2020-03-01"));
    }

    #[test]
    fn test_date_from_filename_without_extension() {
        assert_eq!(date_from_filename("03-01-2020").unwrap(), date("2020-03-01"));
    }

    #[test]
    fn test_date_from_filename_rejects_non_date() {
        let err = date_from_filename("bad.csv").unwrap_err();
        assert!(matches!(err, PipelineError::MalformedFilename(name) if name == "bad.csv"));
    }

    #[test]
    fn test_date_from_filename_rejects_two_components() {
        assert!(matches!(
            date_from_filename("03-2020.csv").unwrap_err(),
            PipelineError::MalformedFilename(_)
        ));
    }

    #[test]
    fn test_date_from_filename_rejects_impossible_date() {
        assert!(matches!(
            date_from_filename("02-30-2020.csv").unwrap_err(),
            PipelineError::MalformedFilename(_)
        ));
    }

    // ── find_snapshot_files ───────────────────────────────────────────────────

    #[test]
    fn test_find_snapshot_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        write_snapshot(dir.path(), "03-02-2020.csv", "a,b\n");
        write_snapshot(dir.path(), "03-01-2020.csv", "a,b\n");
        write_snapshot(dir.path(), "README.md", "not a snapshot\n");

        let files = find_snapshot_files(dir.path());
        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["03-01-2020.csv", "03-02-2020.csv"]);
    }

    #[test]
    fn test_find_snapshot_files_nonexistent_path() {
        let files = find_snapshot_files(Path::new("/tmp/does-not-exist-epi-trend-test"));
        assert!(files.is_empty());
    }

    // ── load_snapshot ─────────────────────────────────────────────────────────

    #[test]
    fn test_load_snapshot_slash_headers() {
        let dir = TempDir::new().unwrap();
        let path = write_snapshot(
            dir.path(),
            "03-01-2020.csv",
            "Province/State,Country/Region,Last Update,Confirmed,Deaths,Recovered\n\
             Hubei,Mainland China,2020-03-01T10:00:00,100,3,40\n\
             ,Thailand,2020-03-01T10:00:00,42,1,10\n",
        );

        let records = load_snapshot(&path, date("2020-03-01")).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].province.as_deref(), Some("Hubei"));
        assert_eq!(records[0].country, "Mainland China");
        assert_eq!(records[0].confirmed, 100);
        assert_eq!(records[1].province, None);
        assert_eq!(records[1].country, "Thailand");
        assert_eq!(records[1].recovered, 10);
        assert!(records.iter().all(|r| r.date == date("2020-03-01")));
    }

    #[test]
    fn test_load_snapshot_underscore_headers_with_extra_columns() {
        let dir = TempDir::new().unwrap();
        let path = write_snapshot(
            dir.path(),
            "04-01-2020.csv",
            "FIPS,Admin2,Province_State,Country_Region,Last_Update,Lat,Long_,Confirmed,Deaths,Recovered,Active,Combined_Key\n\
             48001,Anderson,Texas,US,2020-04-01 21:58:49,31.8,-95.6,5,0,0,5,\"Anderson, Texas, US\"\n",
        );

        let records = load_snapshot(&path, date("2020-04-01")).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].province.as_deref(), Some("Texas"));
        assert_eq!(records[0].country, "US");
        assert_eq!(records[0].confirmed, 5);
    }

    #[test]
    fn test_load_snapshot_missing_counts_read_as_zero() {
        let dir = TempDir::new().unwrap();
        let path = write_snapshot(
            dir.path(),
            "03-01-2020.csv",
            "Province/State,Country/Region,Confirmed,Deaths\n\
             ,Ireland,7,\n",
        );

        let records = load_snapshot(&path, date("2020-03-01")).unwrap();
        assert_eq!(records[0].confirmed, 7);
        assert_eq!(records[0].deaths, 0);
        // Recovered column absent entirely.
        assert_eq!(records[0].recovered, 0);
    }

    #[test]
    fn test_load_snapshot_float_counts() {
        let dir = TempDir::new().unwrap();
        let path = write_snapshot(
            dir.path(),
            "03-01-2020.csv",
            "Country/Region,Confirmed,Deaths,Recovered\n\
             Thailand,42.0,1.0,10.0\n",
        );

        let records = load_snapshot(&path, date("2020-03-01")).unwrap();
        assert_eq!(records[0].confirmed, 42);
        assert_eq!(records[0].deaths, 1);
    }

    #[test]
    fn test_load_snapshot_bom_header() {
        let dir = TempDir::new().unwrap();
        let path = write_snapshot(
            dir.path(),
            "03-01-2020.csv",
            "\u{feff}Province/State,Country/Region,Confirmed,Deaths,Recovered\n\
             ,Thailand,42,1,10\n",
        );

        let records = load_snapshot(&path, date("2020-03-01")).unwrap();
        assert_eq!(records[0].country, "Thailand");
        assert_eq!(records[0].confirmed, 42);
    }

    #[test]
    fn test_load_snapshot_invalid_utf8_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("03-01-2020.csv");
        std::fs::write(
            &path,
            b"Province/State,Country/Region,Confirmed\n\xff\xfe,Thailand,1\n",
        )
        .unwrap();

        let err = load_snapshot(&path, date("2020-03-01")).unwrap_err();
        assert!(matches!(err, PipelineError::UnreadableSnapshot { .. }));
    }

    #[test]
    fn test_load_snapshot_missing_file_is_file_read() {
        let err = load_snapshot(Path::new("/tmp/epi-trend-missing.csv"), date("2020-03-01"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::FileRead { .. }));
    }

    // ── resolve_reports_dir ───────────────────────────────────────────────────

    #[test]
    fn test_resolve_reports_dir_prefers_fixed_subdir() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join(DAILY_REPORTS_SUBDIR);
        std::fs::create_dir_all(&sub).unwrap();

        assert_eq!(resolve_reports_dir(dir.path()).unwrap(), sub);
    }

    #[test]
    fn test_resolve_reports_dir_falls_back_to_root() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_reports_dir(dir.path()).unwrap(), dir.path());
    }

    #[test]
    fn test_resolve_reports_dir_missing_path() {
        let err = resolve_reports_dir(Path::new("/tmp/epi-trend-no-such-dir")).unwrap_err();
        assert!(matches!(err, PipelineError::DataPathNotFound(_)));
    }

    // ── load_daily_cases ──────────────────────────────────────────────────────

    #[test]
    fn test_load_daily_cases_concatenates_and_tags_dates() {
        let dir = TempDir::new().unwrap();
        write_snapshot(
            dir.path(),
            "03-01-2020.csv",
            "Country/Region,Confirmed,Deaths,Recovered\nThailand,42,1,10\n",
        );
        write_snapshot(
            dir.path(),
            "03-02-2020.csv",
            "Country/Region,Confirmed,Deaths,Recovered\nThailand,50,1,12\nItaly,1694,34,83\n",
        );

        let batch = load_daily_cases(dir.path()).unwrap();
        assert_eq!(batch.files_read, 2);
        assert_eq!(batch.records.len(), 3);
        assert_eq!(batch.records[0].date, date("2020-03-01"));
        assert_eq!(batch.records[1].date, date("2020-03-02"));
        assert_eq!(batch.records[2].country, "Italy");
    }

    #[test]
    fn test_load_daily_cases_malformed_filename_aborts_run() {
        let dir = TempDir::new().unwrap();
        write_snapshot(
            dir.path(),
            "03-01-2020.csv",
            "Country/Region,Confirmed,Deaths,Recovered\nThailand,42,1,10\n",
        );
        write_snapshot(dir.path(), "notes.csv", "Country/Region,Confirmed\nX,1\n");

        let err = load_daily_cases(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedFilename(_)));
    }

    #[test]
    fn test_load_daily_cases_empty_directory() {
        let dir = TempDir::new().unwrap();
        let err = load_daily_cases(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::NoSnapshotFiles(_)));
    }

    #[test]
    fn test_load_daily_cases_uses_fixed_subdir_when_present() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join(DAILY_REPORTS_SUBDIR);
        std::fs::create_dir_all(&sub).unwrap();
        write_snapshot(
            &sub,
            "03-01-2020.csv",
            "Country/Region,Confirmed,Deaths,Recovered\nThailand,42,1,10\n",
        );
        // A stray CSV at the root must not be picked up.
        write_snapshot(dir.path(), "bad.csv", "a,b\n1,2\n");

        let batch = load_daily_cases(dir.path()).unwrap();
        assert_eq!(batch.files_read, 1);
        assert_eq!(batch.records[0].country, "Thailand");
    }
}
