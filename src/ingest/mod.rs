//! Bulk roster ingestion from pasted text or an uploaded spreadsheet.
//!
//! Rows are parsed and committed one at a time, in order. A bad row is
//! reported and skipped; the rows that parsed stay committed. Only an
//! unreadable upload fails the whole batch.

mod row;
mod sheet;
mod text;

pub use row::{parse_row, RowError, RowErrorReason};
pub use sheet::{read_sheet, sheet_rows, Columns, SHEET_EXTENSIONS};
pub use text::text_rows;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::Result,
    store::{events::owned_event, people::insert_person},
};

/// Reported when a batch holds nothing but blank lines or a header.
pub const NO_ROWS: &str = "no rows to import";

/// One row of input reduced to ordered fields, ready for [`parse_row`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    /// 1-based line or row number in the original input.
    pub position: usize,
    pub raw_line: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum IngestSource {
    Text(String),
    Spreadsheet {
        bytes: Vec<u8>,
        file_name: Option<String>,
    },
}

impl IngestSource {
    fn label(&self) -> &'static str {
        match self {
            IngestSource::Text(_) => "Line",
            IngestSource::Spreadsheet { .. } => "Row",
        }
    }

    fn into_rows(self) -> Result<Vec<SourceRow>> {
        match self {
            IngestSource::Text(text) => Ok(text_rows(&text)),
            IngestSource::Spreadsheet { bytes, file_name } => sheet_rows(read_sheet(bytes, file_name.as_deref())?),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestResult {
    pub admitted_count: usize,
    pub total_requested: usize,
    /// One message per rejected row, in row order.
    pub errors: Vec<String>,
}

/// Spreadsheet uploads report `total_rows` where text batches say `total_requested`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetIngestResult {
    pub admitted_count: usize,
    pub total_rows: usize,
    pub errors: Vec<String>,
}

impl From<IngestResult> for SheetIngestResult {
    fn from(result: IngestResult) -> Self {
        Self {
            admitted_count: result.admitted_count,
            total_rows: result.total_requested,
            errors: result.errors,
        }
    }
}

/// Parses every row of `source` and adds the valid ones to the event's roster.
///
/// Never fails because of a bad row. A result with zero admitted rows is
/// still `Ok` and always carries at least one error; deciding that nothing
/// useful happened is up to the caller.
pub async fn ingest(db_pool: &SqlitePool, owner_id: &str, event_id: Uuid, source: IngestSource) -> Result<IngestResult> {
    owned_event(db_pool, owner_id, event_id).await?;

    let label = source.label();
    let rows = source.into_rows()?;
    if rows.is_empty() {
        info!(%event_id, "roster batch had no rows");
        return Ok(IngestResult {
            admitted_count: 0,
            total_requested: 0,
            errors: vec![NO_ROWS.to_owned()],
        });
    }

    let mut result = IngestResult {
        admitted_count: 0,
        total_requested: rows.len(),
        errors: Vec::new(),
    };

    for row in rows {
        match parse_row(row.fields.as_slice(), &row.raw_line) {
            Ok(draft) => {
                insert_person(db_pool, event_id, draft.name, draft.contact, draft.tags).await?;
                result.admitted_count += 1;
            }
            Err(err) => {
                debug!(%event_id, position = row.position, "rejected row: {err}");
                result.errors.push(format!("{label} {}: {err}", row.position));
            }
        }
    }

    info!(
        %event_id,
        admitted = result.admitted_count,
        total = result.total_requested,
        rejected = result.errors.len(),
        "ingested roster batch"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use rust_xlsxwriter::Workbook;

    use super::*;
    use crate::{
        db::test_pool,
        error::Error,
        model::NewEvent,
        store::{events::create_event, people::list_people},
    };

    async fn event(db_pool: &SqlitePool) -> Uuid {
        create_event(db_pool, "owner", NewEvent {
            title: "Flood".to_owned(),
            description: String::new(),
            calamity_type: "flood".to_owned(),
        })
        .await
        .unwrap()
        .id
    }

    fn workbook(rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (r, cells) in rows.iter().enumerate() {
            for (c, cell) in cells.iter().enumerate() {
                worksheet.write_string(r as u32, c as u16, *cell).unwrap();
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[tokio::test]
    async fn text_batch_admits_valid_rows_and_reports_the_rest() {
        let db_pool = test_pool().await;
        let event_id = event(&db_pool).await;

        let source = IngestSource::Text("A,1\nB,2,tagX\n,\ninvalid".to_owned());
        let result = ingest(&db_pool, "owner", event_id, source).await.unwrap();

        assert_eq!(result.admitted_count, 2);
        assert_eq!(result.total_requested, 4);
        assert_eq!(result.errors, [
            "Line 3: insufficient fields (\",\")",
            "Line 4: insufficient fields (\"invalid\")",
        ]);

        let people = list_people(&db_pool, "owner", event_id).await.unwrap();
        let names: Vec<_> = people.iter().map(|p| (p.name.as_str(), p.contact.as_str(), p.tags.clone())).collect();
        assert_eq!(names, [("A", "1", vec![]), ("B", "2", vec!["tagX".to_owned()])]);
    }

    #[tokio::test]
    async fn blank_lines_are_not_counted() {
        let db_pool = test_pool().await;
        let event_id = event(&db_pool).await;

        let source = IngestSource::Text("\nAna, 0917, IT, IT\n   \n".to_owned());
        let result = ingest(&db_pool, "owner", event_id, source).await.unwrap();
        assert_eq!((result.admitted_count, result.total_requested), (1, 1));
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn nothing_admitted_is_still_a_result() {
        let db_pool = test_pool().await;
        let event_id = event(&db_pool).await;

        let result = ingest(&db_pool, "owner", event_id, IngestSource::Text("x\ny".to_owned())).await.unwrap();
        assert_eq!(result.admitted_count, 0);
        assert_eq!(result.errors.len(), 2);
    }

    #[tokio::test]
    async fn blank_text_reports_no_rows() {
        let db_pool = test_pool().await;
        let event_id = event(&db_pool).await;

        let result = ingest(&db_pool, "owner", event_id, IngestSource::Text("  \n\n".to_owned())).await.unwrap();
        assert_eq!(result, IngestResult { admitted_count: 0, total_requested: 0, errors: vec![NO_ROWS.to_owned()] });
    }

    #[tokio::test]
    async fn header_only_sheet_reports_no_rows() {
        let db_pool = test_pool().await;
        let event_id = event(&db_pool).await;

        let bytes = workbook(&[&["Name", "Contact"]]);
        let source = IngestSource::Spreadsheet { bytes, file_name: Some("roster.xlsx".to_owned()) };
        let result = ingest(&db_pool, "owner", event_id, source).await.unwrap();
        assert_eq!(result.admitted_count, 0);
        assert_eq!(result.total_requested, 0);
        assert_eq!(result.errors, [NO_ROWS]);
    }

    #[tokio::test]
    async fn spreadsheet_binds_headers_and_reports_missing_name() {
        let db_pool = test_pool().await;
        let event_id = event(&db_pool).await;

        let bytes = workbook(&[&["Name", "Contact", "Tags"], &["Jo", "j@x.com", "A, B"], &["", "k@x.com"]]);
        let source = IngestSource::Spreadsheet { bytes, file_name: Some("roster.xlsx".to_owned()) };
        let result = ingest(&db_pool, "owner", event_id, source).await.unwrap();

        assert_eq!(result.admitted_count, 1);
        assert_eq!(result.total_requested, 2);
        assert_eq!(result.errors, ["Row 3: missing name (\", k@x.com\")"]);

        let people = list_people(&db_pool, "owner", event_id).await.unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].name, "Jo");
        assert_eq!(people[0].tags, ["A", "B"]);
    }

    #[tokio::test]
    async fn unreadable_upload_fails_whole_batch() {
        let db_pool = test_pool().await;
        let event_id = event(&db_pool).await;

        let source = IngestSource::Spreadsheet { bytes: vec![0, 1, 2, 3], file_name: None };
        let err = ingest(&db_pool, "owner", event_id, source).await.unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
        assert!(list_people(&db_pool, "owner", event_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn foreign_owner_cannot_ingest() {
        let db_pool = test_pool().await;
        let event_id = event(&db_pool).await;
        let err = ingest(&db_pool, "intruder", event_id, IngestSource::Text("A,1".to_owned())).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden));
    }

    #[test]
    fn sheet_result_renames_total() {
        let sheet = SheetIngestResult::from(IngestResult { admitted_count: 1, total_requested: 2, errors: vec!["x".to_owned()] });
        let json = serde_json::to_value(&sheet).unwrap();
        assert_eq!(json["total_rows"], 2);
        assert!(json.get("total_requested").is_none());
    }
}
