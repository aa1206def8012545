//! Medication directory: maps item names to storage slot codes.
//!
//! Loaded from a two-column CSV (`name,location`) with no header row. The
//! navigation core never reads this directly; the host resolves a name to a
//! location string here and hands the string to the navigator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Csv(#[from] csv::Error),
    #[error("catalog row {0} is missing the location column")]
    MissingLocation(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub location: String,
}

#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn load(path: &str) -> Result<Self, CatalogError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut entries = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let name = match record.get(0) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => continue,
            };
            let location = record
                .get(1)
                .filter(|s| !s.is_empty())
                .ok_or(CatalogError::MissingLocation(index + 1))?
                .to_string();
            entries.push(CatalogEntry { name, location });
        }
        tracing::info!("catalog loaded: {} entries", entries.len());
        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Exact name lookup, case-insensitive.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| e.location.as_str())
    }

    /// Case-insensitive substring search over names, in file order.
    pub fn search(&self, term: &str) -> Vec<&CatalogEntry> {
        let term = term.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&term))
            .collect()
    }
}
