//! Therapist roster import from CSV exports of the provider directory.

mod parser;

use crate::workflows::matching::domain::Therapist;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row { line: u64, message: String },
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster export: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
            RosterImportError::Row { line, message } => {
                write!(f, "invalid roster row at line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::Row { .. } => None,
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct RosterImporter;

impl RosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Therapist>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse a roster export. Rows with a blank therapist id are skipped;
    /// duplicate ids keep the first row seen.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Therapist>, RosterImportError> {
        let parsed = parser::parse_roster(reader)?;

        let mut seen = HashSet::new();
        let mut roster = Vec::with_capacity(parsed.len());
        for therapist in parsed {
            if seen.insert(therapist.therapist_id.clone()) {
                roster.push(therapist);
            }
        }

        Ok(roster)
    }
}
