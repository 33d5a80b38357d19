use crate::error::DataLoadError;
use crate::types::{Dataset, DeficiencyRecord, RawRow, REQUIRED_COLUMNS};
use crate::util::{clean_text, normalize_header, parse_year_safe};
use calamine::{Data, Reader, Xlsx};
use csv::ReaderBuilder;
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    /// Empty cells per required column.
    pub absent_cells: BTreeMap<&'static str, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceFormat {
    Workbook,
    Csv,
}

impl SourceFormat {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" => Some(SourceFormat::Workbook),
            "csv" => Some(SourceFormat::Csv),
            _ => None,
        }
    }
}

/// Position of each required column in the header row.
struct ColumnIndex([usize; 7]);

impl ColumnIndex {
    /// Fails with every required header the file lacks.
    fn from_headers<S: AsRef<str>>(path: &Path, headers: &[S]) -> Result<Self, DataLoadError> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| normalize_header(h.as_ref()))
            .collect();
        let mut positions = [0usize; 7];
        let mut missing = Vec::new();
        for (slot, col) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            match normalized.iter().position(|h| h == col) {
                Some(p) => *slot = p,
                None => missing.push(col.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(DataLoadError::MissingColumns {
                path: path.to_path_buf(),
                missing,
            });
        }
        Ok(ColumnIndex(positions))
    }

    /// Pick the required cells out of a row. Short rows yield `None` for the tail.
    fn raw_row<F>(&self, mut cell: F) -> RawRow
    where
        F: FnMut(usize) -> Option<String>,
    {
        let [year, identified_by, issue_type, segment, location, rating, mw] = self.0;
        RawRow {
            year: cell(year),
            identified_by: cell(identified_by),
            issue_type: cell(issue_type),
            business_segment: cell(segment),
            location: cell(location),
            rating: cell(rating),
            material_weakness: cell(mw),
        }
    }
}

/// Read the deficiency spreadsheet into a [`Dataset`].
///
/// `.xlsx`/`.xlsm` files are read from their first worksheet; `.csv` exports
/// are read as text. Any failure aborts the whole load; there is no partial
/// result.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<(Dataset, LoadReport), DataLoadError> {
    let path = path.as_ref();
    let format = SourceFormat::from_path(path).ok_or_else(|| DataLoadError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let file = File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let rows = match format {
        SourceFormat::Workbook => read_workbook(path, file)?,
        SourceFormat::Csv => read_csv(path, file)?,
    };

    let mut dataset: Dataset = Vec::with_capacity(rows.len());
    let mut report = LoadReport::default();
    for (row_no, raw) in rows {
        let record = clean_row(raw, row_no)?;
        count_absent(&record, &mut report.absent_cells);
        dataset.push(record);
    }
    report.total_rows = dataset.len();

    info!(
        "loaded {} deficiency records from {}",
        report.total_rows,
        path.display()
    );
    for (col, n) in &report.absent_cells {
        debug!("column {col:?}: {n} empty cell(s)");
    }
    Ok((dataset, report))
}

/// Rows of the first worksheet, numbered as the spreadsheet shows them.
fn read_workbook(path: &Path, file: File) -> Result<Vec<(usize, RawRow)>, DataLoadError> {
    let workbook_err = |source| DataLoadError::Workbook {
        path: path.to_path_buf(),
        source,
    };
    let mut workbook: Xlsx<_> =
        calamine::open_workbook_from_rs(BufReader::new(file)).map_err(workbook_err)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DataLoadError::NoWorksheet {
            path: path.to_path_buf(),
        })?
        .map_err(workbook_err)?;

    // Sheet row of the header, 1-based. Leading blank rows are not part of the range.
    let first_row = range.start().map(|(r, _)| r as usize + 1).unwrap_or(1);
    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(cells) => cells.iter().map(|c| cell_text(c).unwrap_or_default()).collect(),
        None => Vec::new(),
    };
    let index = ColumnIndex::from_headers(path, &headers)?;

    Ok(sheet_rows
        .enumerate()
        .map(|(i, cells)| {
            let raw = index.raw_row(|col| cells.get(col).and_then(cell_text));
            (first_row + i + 1, raw)
        })
        .collect())
}

/// Cell text as the workbook displays it. Empty and error cells have none.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// CSV records, numbered by the line each one starts on.
fn read_csv(path: &Path, file: File) -> Result<Vec<(usize, RawRow)>, DataLoadError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(file);
    let headers: Vec<String> = rdr
        .headers()
        .map_err(|source| csv_error(path, source))?
        .iter()
        .map(str::to_string)
        .collect();
    let index = ColumnIndex::from_headers(path, &headers)?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|source| csv_error(path, source))?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        let raw = index.raw_row(|col| record.get(col).map(str::to_string));
        rows.push((line, raw));
    }
    Ok(rows)
}

fn clean_row(raw: RawRow, row: usize) -> Result<DeficiencyRecord, DataLoadError> {
    let year = parse_year_safe(raw.year.as_deref()).map_err(|()| DataLoadError::InvalidYear {
        row,
        value: raw.year.clone().unwrap_or_default(),
    })?;
    Ok(DeficiencyRecord {
        year,
        identified_by: clean_text(raw.identified_by),
        issue_type: clean_text(raw.issue_type),
        business_segment: clean_text(raw.business_segment),
        location: clean_text(raw.location),
        rating: clean_text(raw.rating),
        material_weakness: clean_text(raw.material_weakness),
    })
}

fn count_absent(record: &DeficiencyRecord, counts: &mut BTreeMap<&'static str, usize>) {
    let absent = [
        record.year.is_none(),
        record.identified_by.is_none(),
        record.issue_type.is_none(),
        record.business_segment.is_none(),
        record.location.is_none(),
        record.rating.is_none(),
        record.material_weakness.is_none(),
    ];
    for (col, is_absent) in REQUIRED_COLUMNS.iter().zip(absent) {
        if is_absent {
            *counts.entry(*col).or_insert(0) += 1;
        }
    }
}

/// Wrap a CSV error with the line it was raised on (0 when the reader has none).
fn csv_error(path: &Path, source: csv::Error) -> DataLoadError {
    let row = source.position().map_or(0, |p| p.line() as usize);
    DataLoadError::Csv {
        path: path.to_path_buf(),
        row,
        source,
    }
}
