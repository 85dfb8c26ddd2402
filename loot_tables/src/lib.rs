//! loot_tables - Weighted loot table resolution
//!
//! This library provides:
//! - LootTable: ordered weighted entries with a with/without replacement policy
//! - Entry: an item drop or a reference to another table, with a drop range
//! - LootRegistry: immutable name -> table mapping loaded from JSON or TOML
//! - LootDrops: the item name -> quantity multiset a resolution produces
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use loot_tables::LootRegistry;
//! use std::path::Path;
//!
//! let registry = LootRegistry::load_dir(Path::new("config/loot/")).unwrap();
//! let mut rng = rand::thread_rng();
//! let drops = registry.generate("BossChest", 3, &mut rng).unwrap();
//! println!("{}", drops);
//! ```

mod config;
mod drops;
mod entry;
mod registry;
mod resolve;
mod select;
mod table;

pub use drops::LootDrops;
pub use entry::{Entry, EntryKind};
pub use registry::LootRegistry;
pub use resolve::resolve_table;
pub use select::pick_weighted;
pub use table::{LootTable, SelectionPolicy};

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Position of a table or entry inside a batch of definitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Table name, or `#<index>` when the name could not be read
    pub table: String,
    /// Index of the entry within the table, if the problem is entry-level
    pub entry: Option<usize>,
}

impl Location {
    pub fn table(table: impl Into<String>) -> Self {
        Location {
            table: table.into(),
            entry: None,
        }
    }

    pub fn entry(&self, index: usize) -> Self {
        Location {
            table: self.table.clone(),
            entry: Some(index),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "table '{}'", self.table)?;
        if let Some(index) = self.entry {
            write!(f, ", entry {}", index)?;
        }
        Ok(())
    }
}

/// Error constructing a single entry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntryError {
    #[error("min_drops {min} exceeds max_drops {max}")]
    InvalidRange { min: u32, max: u32 },
    #[error("selection weight must be finite and non-negative, got {0}")]
    InvalidWeight(f64),
}

impl EntryError {
    /// Attach the location of the offending entry
    pub fn at(self, location: Location) -> DefinitionError {
        match self {
            EntryError::InvalidRange { min, max } => {
                DefinitionError::InvalidRange { location, min, max }
            }
            EntryError::InvalidWeight(weight) => {
                DefinitionError::InvalidWeight { location, weight }
            }
        }
    }
}

/// Error building tables or the registry from definitions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefinitionError {
    #[error("Parse error in {location}: {message}")]
    Parse { location: Location, message: String },
    #[error("Invalid drop range in {location}: min_drops {min} exceeds max_drops {max}")]
    InvalidRange { location: Location, min: u32, max: u32 },
    #[error("Invalid selection weight in {location}: {weight}")]
    InvalidWeight { location: Location, weight: f64 },
    #[error("Table '{0}' has no entries")]
    EmptyTable(String),
    #[error("Duplicate table name: {0}")]
    DuplicateTableName(String),
}

/// Error loading loot table definitions from a string or file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading '{path:?}': {error}")]
    Io {
        error: std::io::Error,
        path: Option<PathBuf>,
    },
    #[error("JSON error in '{path:?}': {error}")]
    Json {
        error: serde_json::Error,
        path: Option<PathBuf>,
    },
    #[error("TOML error in '{path:?}': {error}")]
    Toml {
        error: toml::de::Error,
        path: Option<PathBuf>,
    },
    #[error("Unsupported table file '{0:?}', expected .json or .toml")]
    UnsupportedFormat(PathBuf),
    #[error("{} invalid definition(s) in '{:?}': {}", .errors.len(), .path, join_errors(.errors))]
    Invalid {
        errors: Vec<DefinitionError>,
        path: Option<PathBuf>,
    },
}

fn join_errors(errors: &[DefinitionError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error resolving a table into drops
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Unknown table: {0}")]
    TableNotFound(String),
    #[error("Cycle detected in table references: {}", .0.join(" -> "))]
    CyclicReference(Vec<String>),
}
