// ============================================================
// Layer 4 — Persisted ID Files
// ============================================================
// Reads and writes the integer-sequence files shared by the
// corpus build and the training run.
//
// Format (plain text, one example per line):
//
//   3,4,5        ← example 0
//   6            ← example 1
//                ← example 2 (empty sequence)
//   7,3,8,9      ← example 3
//
// Feature and label files are row-aligned: line i of each file
// belongs to example i. An empty line is a real, zero-length
// sequence, which is why a generic CSV reader (which drops blank
// records) is not used here. Optional header rows at the top are
// skipped on read.
//
// A row that does not parse aborts the load.
//
// Reference: Rust Book §12 (I/O), §9 (Error Handling)

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use crate::domain::error::{PipelineError, Result};

/// Render one sequence as a `,`-joined line (without newline).
pub fn format_id_row(ids: &[u32]) -> String {
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse one line back into IDs. `line_no` is only used for errors.
pub fn parse_id_row(path: &Path, line_no: usize, line: &str) -> Result<Vec<u32>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Vec::new());
    }
    line.split(',')
        .map(|field| {
            let field = field.trim();
            field.parse::<u32>().map_err(|_| PipelineError::MalformedRow {
                path:   path.to_path_buf(),
                line:   line_no,
                reason: format!("not a token id: {field:?}"),
            })
        })
        .collect()
}

/// Write `header_rows` blank lines, then one line per sequence.
pub fn write_id_rows<I, R>(path: &Path, header_rows: usize, rows: I) -> Result<usize>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[u32]>,
{
    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    let mut out = BufWriter::new(file);
    let io_err = |e| PipelineError::io(path, e);

    for _ in 0..header_rows {
        writeln!(out).map_err(io_err)?;
    }

    let mut written = 0usize;
    for row in rows {
        writeln!(out, "{}", format_id_row(row.as_ref())).map_err(io_err)?;
        written += 1;
    }
    out.flush().map_err(io_err)?;

    tracing::debug!("Wrote {} rows to '{}'", written, path.display());
    Ok(written)
}

/// Read every sequence after the first `header_rows` lines.
pub fn read_id_rows(path: &Path, header_rows: usize) -> Result<Vec<Vec<u32>>> {
    let content = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    content
        .lines()
        .enumerate()
        .skip(header_rows)
        .map(|(idx, line)| parse_id_row(path, idx + 1, line))
        .collect()
}
