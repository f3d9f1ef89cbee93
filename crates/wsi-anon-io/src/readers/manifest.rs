//! Batch manifest reader.
//!
//! Rows are kept as raw CSV records until the schema has been validated;
//! [`ManifestTable::records`] then decodes them positionally, in file order.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use wsi_anon_core::record::ManifestRecord;
use wsi_anon_core::runlog::ErrorEntry;
use wsi_anon_core::schema::ManifestSchema;
use wsi_anon_core::taxonomy::ErrorKind;

/// A loaded manifest: header plus undecoded rows.
#[derive(Debug, Clone)]
pub struct ManifestTable {
    pub schema: ManifestSchema,
    rows: Vec<StringRecord>,
}

/// Open and parse a comma-separated manifest with a header row.
///
/// An unopenable file is `missing_file`; a malformed one is `file_format`.
pub fn load_batch(path: &Path) -> Result<ManifestTable, ErrorEntry> {
    let file = File::open(path).map_err(|_| ErrorKind::MissingFile.entry_with(path.display()))?;

    let mut reader = ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(BufReader::new(file));

    let headers = reader
        .headers()
        .map_err(|e| ErrorKind::FileFormat.entry_with(format!("header: {e}")))?
        .clone();

    let mut rows = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row.map_err(|e| ErrorKind::FileFormat.entry_with(format!("row {idx}: {e}")))?;
        rows.push(row);
    }

    Ok(ManifestTable {
        schema: ManifestSchema::new(headers.iter()),
        rows,
    })
}

impl ManifestTable {
    /// Decode every row. Absent columns read as empty cells, so call this
    /// only after the schema has passed validation.
    pub fn records(&self) -> Result<Vec<ManifestRecord>, ErrorEntry> {
        let col = |name: &str| self.schema.index_of(name);
        let (path, uuid, ext) = (col("path"), col("file_uuid"), col("file_ext"));
        let (code, msg) = (col("manifest_error_code"), col("manifest_error_msg"));

        let cell = |row: &StringRecord, idx: Option<usize>| -> String {
            idx.and_then(|i| row.get(i)).unwrap_or_default().to_string()
        };

        self.rows
            .iter()
            .enumerate()
            .map(|(idx, row)| -> Result<ManifestRecord, ErrorEntry> {
                let manifest_error_code = ManifestRecord::parse_error_code(&cell(row, code))
                    .map_err(|e| ErrorKind::FileFormat.entry_with(format!("row {idx}: {e}")))?;
                Ok(ManifestRecord {
                    path: cell(row, path),
                    file_uuid: cell(row, uuid),
                    file_ext: cell(row, ext),
                    manifest_error_code,
                    manifest_error_msg: cell(row, msg),
                })
            })
            .collect()
    }
}
