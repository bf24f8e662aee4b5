use clap::ValueEnum;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    #[error("line does not start with '>'")]
    MissingMarker,
    #[error("expected at least {needed} '_'-separated fields, found {found}")]
    TooFewFields { found: usize, needed: usize },
    #[error("genome name is empty")]
    EmptyGenomeName,
    #[error("no ':' between genome name and coordinates")]
    MissingColon,
    #[error("'{0}' is not a START-END range")]
    BadRange(String),
    #[error("{field} '{value}' is not a positive integer")]
    InvalidPosition { field: &'static str, value: String },
}

// The two header layouts coordinate files come in. Only one is active per run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Grammar {
    /// >NAME_INDEX_START_..., e.g. >AMDV_1_620_3127_1_ID=2_1
    #[default]
    Homer,
    /// >NAME:START-END[_START-END...], e.g. >NC_001802.1:336-1838
    Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateRecord {
    pub genome_name: String,
    pub cds_start: usize,
    pub cds_end: Option<usize>,
    // Header text after '>', reused verbatim as the output header.
    pub label: String,
}

const HOMER_FIELDS: usize = 3;

// Tokenize one line of a coordinate file.
//
// Blank lines give Ok(None). Anything else must start with '>' and match the
// selected grammar; the text after '>' (whitespace-trimmed) becomes the label.
pub fn parse_line(line: &str, grammar: Grammar) -> Result<Option<CoordinateRecord>, CoordinateError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let header = line
        .strip_prefix('>')
        .ok_or(CoordinateError::MissingMarker)?;

    let record = match grammar {
        Grammar::Homer => parse_homer(header)?,
        Grammar::Range => parse_range(header)?,
    };
    Ok(Some(record))
}

fn parse_homer(header: &str) -> Result<CoordinateRecord, CoordinateError> {
    let fields: Vec<&str> = header.split('_').collect();
    if fields.len() < HOMER_FIELDS {
        return Err(CoordinateError::TooFewFields {
            found: fields.len(),
            needed: HOMER_FIELDS,
        });
    }
    Ok(CoordinateRecord {
        genome_name: genome_name(fields[0])?,
        cds_start: position("CDS start", fields[2])?,
        cds_end: None,
        label: header.to_string(),
    })
}

// Only the first START-END pair is used; later segments are ignored.
fn parse_range(header: &str) -> Result<CoordinateRecord, CoordinateError> {
    let (name, coordinates) = header
        .split_once(':')
        .ok_or(CoordinateError::MissingColon)?;
    let first = coordinates
        .split(['_', ','])
        .next()
        .unwrap_or_default();
    let (start, end) = first
        .split_once('-')
        .ok_or_else(|| CoordinateError::BadRange(first.to_string()))?;

    Ok(CoordinateRecord {
        genome_name: genome_name(name)?,
        cds_start: position("CDS start", start)?,
        cds_end: Some(position("CDS end", end)?),
        label: header.to_string(),
    })
}

fn genome_name(field: &str) -> Result<String, CoordinateError> {
    if field.is_empty() {
        Err(CoordinateError::EmptyGenomeName)
    } else {
        Ok(field.to_string())
    }
}

// Positions are 1-based; zero and signs are rejected here, range checks
// against the genome happen at extraction time.
fn position(field: &'static str, value: &str) -> Result<usize, CoordinateError> {
    let invalid = || CoordinateError::InvalidPosition {
        field,
        value: value.to_string(),
    };
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match value.parse::<usize>() {
        Ok(0) | Err(_) => Err(invalid()),
        Ok(n) => Ok(n),
    }
}
