//! Export service domain logic for the finance tracker.
//!
//! This module contains the file-format side of export, import and backups:
//! building and writing the export envelope, reading an import file and
//! reducing it to admissible records, normalizing those records, and
//! rendering the import report. The transaction service drives the steps and
//! owns everything that touches the live collection.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared::{ExportInfo, TransactionSummary, EXPORT_FORMAT_VERSION};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::domain::balance_service::BalanceService;
use crate::backend::domain::models::{Transaction, TransactionId};
use crate::backend::domain::validator::is_valid_transaction_structure;
use crate::backend::storage::{write_json_atomic, StoreError};

/// File name prefix of backups the user asked for
pub const BACKUP_PREFIX: &str = "backup";
/// File name prefix of the automatic snapshot taken before an import
pub const PRE_IMPORT_BACKUP_PREFIX: &str = "pre_import_backup";

const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const REPORT_DATE_FORMAT: &str = "%d.%m.%Y %H:%M";
const UNKNOWN: &str = "Unknown";

/// Export and backup file layout: metadata plus the full transaction list.
/// Backups carry the stored elements as raw JSON (`ExportEnvelope<Value>`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEnvelope<T = Transaction> {
    pub export_info: ExportInfo,
    pub transactions: Vec<T>,
}

/// Why an import was refused. The current collection is untouched in every case
/// except `Storage`, which can only happen while writing the new collection.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Backup directory not found: {}", .0.display())]
    NoBackups(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON format: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Unsupported file format: expected a list of transactions or an export file")]
    Format,

    #[error("File contains no valid transactions")]
    EmptyImport,

    #[error("Failed to store imported transactions: {0}")]
    Storage(#[from] StoreError),
}

/// Where an imported envelope said it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSource {
    pub application: String,
    /// Export timestamp, reformatted for display when it could be parsed
    pub export_date: String,
}

/// Outcome of a successful import
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub summary: TransactionSummary,
    /// Candidates dropped by the structural check
    pub skipped: usize,
    pub source: Option<ImportSource>,
    /// Snapshot of the collection taken before it was replaced, if that worked
    pub backup_path: Option<PathBuf>,
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Import completed successfully!\n\nImported data:\n{}", self.summary)?;
        if self.skipped > 0 {
            write!(f, "\n• Skipped invalid records: {}", self.skipped)?;
        }
        if let Some(source) = &self.source {
            write!(
                f,
                "\n\nData source:\n• Application: {}\n• Export date: {}",
                source.application, source.export_date
            )?;
        }
        Ok(())
    }
}

/// Contents of an import file after the shape check
#[derive(Debug, Clone, PartialEq)]
pub struct ImportCandidates {
    pub records: Vec<Value>,
    /// Present only for envelopes with a non-empty `export_info` object
    pub export_info: Option<Map<String, Value>>,
}

/// Export service that handles the file-format side of export and import
#[derive(Clone, Debug)]
pub struct ExportService {
    application_name: String,
    balance_service: BalanceService,
}

impl ExportService {
    pub fn new(application_name: &str) -> Self {
        Self {
            application_name: application_name.to_string(),
            balance_service: BalanceService::new(),
        }
    }

    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    /// Wrap transactions with export metadata stamped now
    pub fn build_envelope<T>(&self, transactions: Vec<T>) -> ExportEnvelope<T> {
        ExportEnvelope {
            export_info: ExportInfo {
                version: EXPORT_FORMAT_VERSION.to_string(),
                export_date: Local::now().to_rfc3339(),
                transaction_count: transactions.len(),
                application: self.application_name.clone(),
            },
            transactions,
        }
    }

    /// Write an export envelope to `path`, returning the number of transactions written
    pub fn write_export<T: Serialize>(&self, path: &Path, transactions: Vec<T>) -> Result<usize> {
        let envelope = self.build_envelope(transactions);
        let count = envelope.export_info.transaction_count;

        write_json_atomic(path, &envelope)
            .with_context(|| format!("Failed to write export file {}", path.display()))?;

        info!("📤 EXPORT: Wrote {} transactions to {}", count, path.display());
        Ok(count)
    }

    /// Existence check, JSON decode and shape check of an import file
    pub fn read_import_file(&self, path: &Path) -> Result<ImportCandidates, ImportError> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ImportError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let data: Value = serde_json::from_str(&content).map_err(ImportError::Parse)?;

        Self::extract_candidates(data)
    }

    /// Accept a bare array or an envelope object with a `transactions` array
    pub fn extract_candidates(data: Value) -> Result<ImportCandidates, ImportError> {
        match data {
            Value::Array(records) => Ok(ImportCandidates {
                records,
                export_info: None,
            }),
            Value::Object(mut envelope) => match envelope.remove("transactions") {
                Some(Value::Array(records)) => {
                    let export_info = match envelope.remove("export_info") {
                        Some(Value::Object(info)) if !info.is_empty() => Some(info),
                        _ => None,
                    };
                    Ok(ImportCandidates { records, export_info })
                }
                _ => Err(ImportError::Format),
            },
            _ => Err(ImportError::Format),
        }
    }

    /// Keep the structurally valid candidates. Returns them with the number dropped.
    pub fn admit(&self, records: Vec<Value>) -> (Vec<Map<String, Value>>, usize) {
        let mut admitted = Vec::with_capacity(records.len());
        let mut skipped = 0;

        for (index, record) in records.into_iter().enumerate() {
            if !is_valid_transaction_structure(&record) {
                warn!("Skipping invalid transaction #{}: {}", index, record);
                skipped += 1;
                continue;
            }
            if let Value::Object(map) = record {
                admitted.push(map);
            }
        }

        (admitted, skipped)
    }

    /// Turn admitted records into transactions, issuing fresh identifiers for
    /// records with a missing, blank or repeated `id`
    pub fn normalize_all(&self, records: Vec<Map<String, Value>>) -> Vec<Transaction> {
        let mut seen_ids = HashSet::new();
        records
            .iter()
            .map(|record| Self::normalize(record, &mut seen_ids))
            .collect()
    }

    /// Coerce one record: string amounts are parsed (0.0 when unparseable),
    /// category and description are trimmed, description defaults to empty.
    pub fn normalize(record: &Map<String, Value>, seen_ids: &mut HashSet<String>) -> Transaction {
        let amount = match record.get("amount") {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    warn!("Unparseable amount {:?} imported as 0.0", s);
                    0.0
                }
            },
            _ => 0.0,
        };

        let text = |key: &str| record.get(key).and_then(Value::as_str).unwrap_or_default();

        let description = match record.get("description") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(other) => other.to_string().trim().to_string(),
        };

        let id = match record.get("id").and_then(Value::as_str).map(str::trim) {
            Some(id) if !id.is_empty() && !seen_ids.contains(id) => TransactionId::from(id),
            _ => TransactionId::generate(),
        };
        seen_ids.insert(id.as_str().to_string());

        Transaction {
            amount,
            category: text("category").trim().to_string(),
            date: text("date").to_string(),
            description,
            id,
        }
    }

    pub fn build_report(
        &self,
        transactions: &[Transaction],
        export_info: Option<&Map<String, Value>>,
        skipped: usize,
        backup_path: Option<PathBuf>,
    ) -> ImportReport {
        let source = export_info.map(|info| ImportSource {
            application: info_text(info, "application").unwrap_or_else(|| UNKNOWN.to_string()),
            export_date: info_text(info, "export_date")
                .map(|date| format_export_date(&date))
                .unwrap_or_else(|| UNKNOWN.to_string()),
        });

        ImportReport {
            summary: self.balance_service.summarize(transactions),
            skipped,
            source,
            backup_path,
        }
    }
}

fn info_text(info: &Map<String, Value>, key: &str) -> Option<String> {
    match info.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Render an ISO-8601 timestamp as local `dd.mm.YYYY HH:MM`; anything
/// unparseable is returned verbatim
pub fn format_export_date(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format(REPORT_DATE_FORMAT).to_string();
    }
    for layout in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, layout) {
            return dt.format(REPORT_DATE_FORMAT).to_string();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return format!("{} 00:00", date.format("%d.%m.%Y"));
    }
    raw.to_string()
}

/// `<prefix>_<YYYYmmdd_HHMMSS>.json`
pub fn backup_file_name(prefix: &str, now: &DateTime<Local>) -> String {
    format!("{}_{}.json", prefix, now.format(FILE_TIMESTAMP_FORMAT))
}

/// `backup_file_name` inside `directory`, with `_1`, `_2`, ... appended to the
/// stem when a file of that name already exists
pub fn unique_backup_path(directory: &Path, prefix: &str, now: &DateTime<Local>) -> PathBuf {
    let stem = format!("{}_{}", prefix, now.format(FILE_TIMESTAMP_FORMAT));
    let mut candidate = directory.join(format!("{}.json", stem));
    let mut counter = 1;
    while candidate.exists() {
        candidate = directory.join(format!("{}_{}.json", stem, counter));
        counter += 1;
    }
    candidate
}

/// Default file name offered when the user exports
pub fn suggested_export_file_name() -> String {
    backup_file_name("financial_data", &Local::now())
}

/// Append `.json` unless the path already ends with it (any case)
pub fn with_json_extension(path: &Path) -> PathBuf {
    let has_json_extension = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if has_json_extension {
        path.to_path_buf()
    } else {
        let mut name = OsString::from(path.as_os_str());
        name.push(".json");
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use tempfile::TempDir;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_extract_candidates_accepts_both_shapes() {
        let bare = ExportService::extract_candidates(json!([{ "amount": 1 }])).unwrap();
        assert_eq!(bare.records.len(), 1);
        assert!(bare.export_info.is_none());

        let envelope = ExportService::extract_candidates(json!({
            "export_info": { "application": "Finance Manager" },
            "transactions": [{ "amount": 1 }, { "amount": 2 }]
        }))
        .unwrap();
        assert_eq!(envelope.records.len(), 2);
        assert!(envelope.export_info.is_some());

        let no_info = ExportService::extract_candidates(json!({ "transactions": [] })).unwrap();
        assert!(no_info.records.is_empty());
        assert!(no_info.export_info.is_none());
    }

    #[test]
    fn test_extract_candidates_rejects_other_shapes() {
        for data in [
            json!({ "records": [] }),
            json!({ "transactions": { "amount": 1 } }),
            json!("transactions"),
            json!(42),
        ] {
            assert!(matches!(ExportService::extract_candidates(data), Err(ImportError::Format)));
        }
    }

    #[test]
    fn test_admit_drops_invalid_records() {
        let service = ExportService::new("Finance Manager");
        let records = vec![
            json!({ "amount": 10, "category": "Food", "date": "2024-01-01" }),
            json!({ "amount": "10", "category": "Food", "date": "2024-01-01" }),
            json!("not a record"),
            json!({ "amount": -3, "category": "Bus", "date": "2024-01-02" }),
        ];

        let (admitted, skipped) = service.admit(records);

        assert_eq!(admitted.len(), 2);
        assert_eq!(skipped, 2);
        assert_eq!(admitted[1]["category"], "Bus");
    }

    #[test]
    fn test_normalize_coerces_fields() {
        let mut seen = HashSet::new();
        let record = as_map(json!({
            "amount": " 12.5 ",
            "category": "  Food ",
            "date": "2024-01-01",
            "description": 42,
            "extra": true
        }));

        let tx = ExportService::normalize(&record, &mut seen);

        assert_eq!(tx.amount, 12.5);
        assert_eq!(tx.category, "Food");
        assert_eq!(tx.date, "2024-01-01");
        assert_eq!(tx.description, "42");

        let unparseable = as_map(json!({ "amount": "lots", "category": "A", "date": "d", "description": null }));
        let tx = ExportService::normalize(&unparseable, &mut seen);
        assert_eq!(tx.amount, 0.0);
        assert_eq!(tx.description, "");
    }

    #[test]
    fn test_normalize_all_keeps_unique_ids_only() {
        let service = ExportService::new("Finance Manager");
        let records = vec![
            as_map(json!({ "amount": 1, "category": "A", "date": "d", "id": "keep-me" })),
            as_map(json!({ "amount": 2, "category": "B", "date": "d", "id": "keep-me" })),
            as_map(json!({ "amount": 3, "category": "C", "date": "d", "id": "  " })),
        ];

        let transactions = service.normalize_all(records);

        assert_eq!(transactions[0].id.as_str(), "keep-me");
        assert_ne!(transactions[1].id.as_str(), "keep-me");
        assert!(!transactions[2].id.as_str().trim().is_empty());
        assert_ne!(transactions[1].id, transactions[2].id);
    }

    #[test]
    fn test_report_display() {
        let service = ExportService::new("Finance Manager");
        let transactions = vec![
            Transaction::new(100.0, "Salary", "2024-01-01", ""),
            Transaction::new(-30.0, "Food", "2024-01-02", ""),
            Transaction::new(-20.0, "Food", "2024-01-03", ""),
        ];
        let info = as_map(json!({
            "application": "Finance Manager",
            "export_date": "2024-03-01T14:30:00.123456"
        }));

        let report = service.build_report(&transactions, Some(&info), 1, None);
        let text = report.to_string();

        assert!(text.starts_with("Import completed successfully!"));
        assert!(text.contains("• Total transactions: 3"));
        assert!(text.contains("• Income: 1"));
        assert!(text.contains("• Expenses: 2"));
        assert!(text.contains("• Unique categories: 2"));
        assert!(text.contains("• Skipped invalid records: 1"));
        assert!(text.contains("• Application: Finance Manager"));
        assert!(text.contains("• Export date: 01.03.2024 14:30"));
    }

    #[test]
    fn test_report_without_source() {
        let service = ExportService::new("Finance Manager");
        let transactions = vec![Transaction::new(1.0, "A", "2024-01-01", "")];

        let report = service.build_report(&transactions, None, 0, None);

        assert!(report.source.is_none());
        assert!(!report.to_string().contains("Data source"));

        let partial = as_map(json!({ "version": "1.0" }));
        let report = service.build_report(&transactions, Some(&partial), 0, None);
        assert_eq!(
            report.source,
            Some(ImportSource {
                application: "Unknown".to_string(),
                export_date: "Unknown".to_string(),
            })
        );
    }

    #[test]
    fn test_format_export_date() {
        assert_eq!(format_export_date("2024-03-01T14:30:00"), "01.03.2024 14:30");
        assert_eq!(format_export_date("2024-03-01 09:05:59.5"), "01.03.2024 09:05");
        assert_eq!(format_export_date("2024-03-01"), "01.03.2024 00:00");
        assert_eq!(format_export_date("yesterday"), "yesterday");

        let aware = "2024-03-01T14:30:00+00:00";
        let expected = DateTime::parse_from_rfc3339(aware)
            .unwrap()
            .with_timezone(&Local)
            .format("%d.%m.%Y %H:%M")
            .to_string();
        assert_eq!(format_export_date(aware), expected);
    }

    #[test]
    fn test_file_names() {
        let now = Local.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap();
        assert_eq!(backup_file_name(BACKUP_PREFIX, &now), "backup_20240301_090507.json");
        assert_eq!(
            backup_file_name(PRE_IMPORT_BACKUP_PREFIX, &now),
            "pre_import_backup_20240301_090507.json"
        );
        assert!(suggested_export_file_name().starts_with("financial_data_"));
    }

    #[test]
    fn test_with_json_extension() {
        assert_eq!(with_json_extension(Path::new("out")), PathBuf::from("out.json"));
        assert_eq!(with_json_extension(Path::new("out.JSON")), PathBuf::from("out.JSON"));
        assert_eq!(with_json_extension(Path::new("data.txt")), PathBuf::from("data.txt.json"));
    }

    #[test]
    fn test_write_export_produces_envelope() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("export.json");
        let service = ExportService::new("Finance Manager");
        let transactions = vec![Transaction::new(-5.0, "Кофе", "2024-01-01", "")];

        let count = service.write_export(&path, transactions.clone()).unwrap();

        assert_eq!(count, 1);
        let envelope: ExportEnvelope = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(envelope.export_info.version, "1.0");
        assert_eq!(envelope.export_info.transaction_count, 1);
        assert_eq!(envelope.export_info.application, "Finance Manager");
        assert!(DateTime::parse_from_rfc3339(&envelope.export_info.export_date).is_ok());
        assert_eq!(envelope.transactions, transactions);
    }

    #[test]
    fn test_write_export_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("export.json");
        let service = ExportService::new("Finance Manager");

        assert!(service.write_export(&path, Vec::<Transaction>::new()).is_err());
    }

    #[test]
    fn test_unique_backup_path_never_reuses_a_name() {
        let temp_dir = TempDir::new().unwrap();
        let now = Local.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap();

        let first = unique_backup_path(temp_dir.path(), PRE_IMPORT_BACKUP_PREFIX, &now);
        assert_eq!(first, temp_dir.path().join("pre_import_backup_20240301_090507.json"));
        fs::write(&first, "[]").unwrap();

        let second = unique_backup_path(temp_dir.path(), PRE_IMPORT_BACKUP_PREFIX, &now);
        assert_eq!(second, temp_dir.path().join("pre_import_backup_20240301_090507_1.json"));
        fs::write(&second, "[]").unwrap();

        let third = unique_backup_path(temp_dir.path(), PRE_IMPORT_BACKUP_PREFIX, &now);
        assert_eq!(third, temp_dir.path().join("pre_import_backup_20240301_090507_2.json"));
    }

    #[test]
    fn test_write_export_accepts_raw_records() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("snapshot.json");
        let service = ExportService::new("Finance Manager");
        let records = vec![json!({ "amount": "25", "category": "Gift" })];

        assert_eq!(service.write_export(&path, records.clone()).unwrap(), 1);

        let envelope: ExportEnvelope<Value> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(envelope.transactions, records);
    }
}
