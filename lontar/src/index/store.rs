//! Flat-file persistence for embedded chunk records.
//!
//! The writer renders each vector on a single line as a flat numeric array
//! at fixed 8-decimal precision; every other field keeps standard JSON
//! encoding. The reader accepts any valid JSON rendering of the records.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::models::ChunkRecord;

/// Load chunk records from a store file. Accepts any valid JSON rendering
/// of the record array, not just the writer's layout.
pub fn load_records(path: &Path) -> Result<Vec<ChunkRecord>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Write chunk records with inline fixed-precision vectors.
pub fn save_records(path: &Path, records: &[ChunkRecord]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);

    out.write_all(b"[\n")?;
    for (idx, record) in records.iter().enumerate() {
        out.write_all(b"  {\n")?;
        writeln!(out, "    \"conv_id\": {},", serde_json::to_string(&record.conv_id)?)?;
        writeln!(out, "    \"session_index\": {},", record.session_index)?;
        writeln!(out, "    \"chunk_index\": {},", record.chunk_index)?;
        writeln!(out, "    \"bubble_count\": {},", record.bubble_count)?;
        writeln!(out, "    \"text\": {},", serde_json::to_string(&record.text)?)?;
        writeln!(out, "    \"vector\": [{}]", format_vector(&record.vector))?;
        out.write_all(b"  }")?;
        if idx != records.len() - 1 {
            out.write_all(b",")?;
        }
        out.write_all(b"\n")?;
    }
    out.write_all(b"]")?;
    out.flush()?;

    Ok(())
}

fn format_vector(vector: &[f32]) -> String {
    vector
        .iter()
        .map(|v| format!("{v:.8}"))
        .collect::<Vec<_>>()
        .join(",")
}
