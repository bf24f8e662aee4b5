use std::io::{self, BufRead, Write};

use log::{debug, error, warn};
use noodles::fasta::{
    self as fasta,
    record::{Definition, Sequence},
    Record,
};
use thiserror::Error;

use crate::{
    coords::{self, CoordinateError, Grammar},
    registry::Registry,
    window::{self, PromoterWindow, WindowError},
};

// Bases per line in the output FASTA.
pub const LINE_WIDTH: usize = 80;

// Why a single coordinate line produced no output. None of these stop the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("malformed coordinate line: {0}")]
    Malformed(#[from] CoordinateError),
    #[error("no genome named '{0}' in the genome source")]
    UnknownGenome(String),
    #[error(transparent)]
    Window(WindowError),
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    pub window_len: usize,
    pub grammar: Grammar,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            window_len: 100,
            grammar: Grammar::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub line: usize,
    pub reason: RecordError,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub success: usize,
    pub wrapped: usize,
    pub degraded: usize,
    pub skipped: Vec<SkippedRecord>,
}

// Resolve one coordinate line against the registry. Ok(None) means the line
// was blank.
fn resolve(
    line: &str,
    registry: &Registry,
    settings: &BatchSettings,
) -> Result<Option<(String, PromoterWindow)>, RecordError> {
    let Some(record) = coords::parse_line(line, settings.grammar)? else {
        return Ok(None);
    };
    let entry = registry
        .get(&record.genome_name)
        .ok_or_else(|| RecordError::UnknownGenome(record.genome_name.clone()))?;
    let promoter = window::extract_upstream_window(entry, record.cds_start, settings.window_len)
        .map_err(RecordError::Window)?;

    if promoter.degraded {
        warn!(
            "genome '{}' is {} bp, shorter than the {} bp window; writing the whole genome for '{}'",
            entry.name(),
            entry.len(),
            settings.window_len,
            record.label
        );
    } else if promoter.wrapped {
        let cds = match record.cds_end {
            Some(end) => format!("{}-{end}", record.cds_start),
            None => record.cds_start.to_string(),
        };
        debug!(
            "window for CDS {cds} of '{}' crosses the origin ({} bp from the tail, {} bp from the head)",
            entry.name(),
            settings.window_len - (record.cds_start - 1),
            record.cds_start - 1
        );
    }
    Ok(Some((record.label, promoter)))
}

impl BatchSummary {
    // Count a line that produced no output. A window of the wrong length is an
    // arithmetic bug rather than bad input, so it is reported as an error, but
    // the batch still carries on.
    fn skip(&mut self, line: usize, text: &str, reason: RecordError) {
        self.total += 1;
        match reason {
            RecordError::Window(WindowError::InternalLengthMismatch { .. }) => {
                error!("skipping line {line} ({}): {reason}", text.trim())
            }
            _ => warn!("skipping line {line} ({}): {reason}", text.trim()),
        }
        self.skipped.push(SkippedRecord { line, reason });
    }
}

// Run a whole coordinate file. Each non-blank line counts toward the total;
// a line that cannot be resolved is logged and skipped. Only I/O failures
// abort the run.
pub fn run<R: BufRead, W: Write>(
    coords: R,
    registry: &Registry,
    output: W,
    settings: &BatchSettings,
) -> io::Result<BatchSummary> {
    let mut writer = fasta::writer::Builder::default()
        .set_line_base_count(LINE_WIDTH)
        .build_with_writer(output);
    let mut summary = BatchSummary::default();

    for (index, line) in coords.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;

        let (label, promoter) = match resolve(&line, registry, settings) {
            Ok(None) => continue,
            Ok(Some(resolved)) => resolved,
            Err(reason) => {
                summary.skip(line_number, &line, reason);
                continue;
            }
        };
        summary.total += 1;

        let definition = Definition::new(label, None);
        let record = Record::new(definition, Sequence::from(promoter.sequence));
        writer.write_record(&record)?;

        summary.success += 1;
        summary.wrapped += usize::from(promoter.wrapped);
        summary.degraded += usize::from(promoter.degraded);
    }

    Ok(summary)
}
