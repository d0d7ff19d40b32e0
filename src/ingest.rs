use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::error::IngestError;
use crate::models::Document;

const REQUIRED: [&str; 5] = ["id", "url", "ts", "platform", "text"];

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn field_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse an ISO-8601 timestamp; a trailing `Z` means UTC, naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, IngestError> {
    let s = raw.trim();
    let s = match s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        Some(head) => format!("{head}+00:00"),
        None => s.to_string(),
    };

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(&s, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(IngestError::InvalidTimestamp { value: raw.to_string() })
}

/// Validate one raw record and turn it into a canonical [`Document`]. A `null`
/// required value is reported as missing.
pub fn ingest_record(payload: &Map<String, Value>) -> Result<Document, IngestError> {
    let mut missing: Vec<String> = REQUIRED
        .iter()
        .filter(|k| payload.get(**k).map_or(true, Value::is_null))
        .map(|k| k.to_string())
        .collect();
    if !missing.is_empty() {
        missing.sort();
        let id = payload
            .get("id")
            .filter(|v| !v.is_null())
            .map(field_text)
            .unwrap_or_else(|| "?".to_string());
        return Err(IngestError::MissingFields { id, fields: missing });
    }

    let ts = match &payload["ts"] {
        Value::String(s) => parse_timestamp(s)?,
        other => return Err(IngestError::TimestampType { found: json_type(other) }),
    };

    let meta = match payload.get("meta") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(m)) => m.clone(),
        Some(other) => return Err(IngestError::MetaType { found: json_type(other) }),
    };

    let mut doc = Document::new(
        field_text(&payload["id"]),
        field_text(&payload["url"]),
        ts,
        field_text(&payload["platform"]),
        field_text(&payload["text"]),
    );
    if let Some(kind) = payload.get("kind").filter(|v| !v.is_null()) {
        doc.kind = field_text(kind);
    }
    doc.meta = meta;
    Ok(doc)
}

/// Reject a batch in which two documents share an id.
pub fn ensure_unique_ids(documents: &[Document]) -> Result<(), IngestError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(documents.len());
    for doc in documents {
        if !seen.insert(doc.id.as_str()) {
            return Err(IngestError::DuplicateId(doc.id.clone()));
        }
    }
    Ok(())
}

/// Ingest a whole batch. The first invalid record aborts; ids must be unique.
pub fn ingest_batch(records: &[Value]) -> Result<Vec<Document>, IngestError> {
    let start = std::time::Instant::now();
    let mut docs = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let Value::Object(map) = record else {
            return Err(IngestError::NotAnObject { index });
        };
        let doc = ingest_record(map)?;
        debug!("Ingested document - id={}, platform={}, ts={}", doc.id, doc.platform, doc.ts);
        docs.push(doc);
    }
    ensure_unique_ids(&docs)?;

    info!(
        "Ingestion completed - duration={:.3}s, documents={}",
        start.elapsed().as_secs_f32(),
        docs.len()
    );
    Ok(docs)
}
