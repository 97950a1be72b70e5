use crate::error::LoadError;
use crate::models::ResponseRow;
use csv::StringRecord;
use std::io::Read;
use std::path::Path;

/// Columns the table must carry, in the order they are looked up.
/// `question_id` comes first so a table without identifiers reports that column.
pub const REQUIRED_COLUMNS: [&str; 4] = ["question_id", "question_text", "llm", "response"];

/// Read the response table from a CSV file.
///
/// Every cell is read as text. Extra columns are ignored.
pub fn load_responses(path: &Path) -> Result<Vec<ResponseRow>, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::io(path, e))?;
    let rows = read_responses(file, path)?;

    tracing::info!(path = %path.display(), rows = rows.len(), "Loaded response table");
    Ok(rows)
}

/// Parse a response table from any reader. `origin` only labels errors.
pub fn read_responses<R: Read>(reader: R, origin: &Path) -> Result<Vec<ResponseRow>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| LoadError::parse(origin, e))?
        .clone();
    if headers.is_empty() {
        return Err(LoadError::Empty(origin.to_path_buf()));
    }
    let columns = ColumnIndex::resolve(&headers)?;

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|e| LoadError::parse(origin, e))?;
        rows.push(columns.row(&record));
    }

    if rows.is_empty() {
        return Err(LoadError::Empty(origin.to_path_buf()));
    }

    Ok(rows)
}

/// Positions of the required columns within a header record
struct ColumnIndex {
    question_id: usize,
    question_text: usize,
    llm: usize,
    response: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self, LoadError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}') == name)
                .ok_or(LoadError::MissingColumn(name))
        };

        let [question_id, question_text, llm, response] = REQUIRED_COLUMNS;
        Ok(Self {
            question_id: find(question_id)?,
            question_text: find(question_text)?,
            llm: find(llm)?,
            response: find(response)?,
        })
    }

    fn row(&self, record: &StringRecord) -> ResponseRow {
        let cell = |i: usize| record.get(i).unwrap_or_default().to_string();
        ResponseRow {
            question_id: cell(self.question_id),
            question_text: cell(self.question_text),
            llm: cell(self.llm),
            response: cell(self.response),
        }
    }
}
