//! Single-record mode: one record passed inline as a JSON object.

use std::collections::BTreeMap;

use serde_json::Value;

use wsi_anon_core::record::ManifestRecord;
use wsi_anon_core::runlog::ErrorEntry;
use wsi_anon_core::schema::ManifestSchema;
use wsi_anon_core::taxonomy::ErrorKind;

/// Inline key/value fields of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineRecord {
    pub schema: ManifestSchema,
    fields: BTreeMap<String, String>,
}

/// Parse an inline JSON object. Anything other than an object is `file_format`.
pub fn load_single(payload: &str) -> Result<InlineRecord, ErrorEntry> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| ErrorKind::FileFormat.entry_with(format!("slide payload: {e}")))?;
    let Value::Object(map) = value else {
        return Err(ErrorKind::FileFormat.entry_with("slide payload is not a JSON object"));
    };
    Ok(InlineRecord::from_fields(
        map.into_iter().map(|(k, v)| (k, render(v))),
    ))
}

fn render(v: Value) -> String {
    match v {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl InlineRecord {
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields: BTreeMap<String, String> = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            schema: ManifestSchema::new(fields.keys().cloned()),
            fields,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Build the record. No upstream error code is expected in this mode.
    pub fn record(&self) -> ManifestRecord {
        let field = |k: &str| self.get(k).unwrap_or_default().to_string();
        ManifestRecord::new(field("path"), field("file_uuid"), field("file_ext"))
    }
}
