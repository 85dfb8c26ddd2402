use crate::config;
use crate::drops::LootDrops;
use crate::resolve::resolve_table;
use crate::table::LootTable;
use crate::{ConfigError, DefinitionError, ResolveError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::Value;
use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Registry of all loot tables, keyed by table name
#[derive(Debug, Default)]
pub struct LootRegistry {
    tables: HashMap<String, LootTable>,
}

impl LootRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from already constructed tables
    pub fn build(tables: impl IntoIterator<Item = LootTable>) -> Result<Self, DefinitionError> {
        let mut registry = Self::new();
        for table in tables {
            registry.insert(table)?;
        }
        tracing::debug!(tables = registry.len(), "built loot registry");
        Ok(registry)
    }

    /// Parse a JSON document: an array of tables, or `{ "tables": [...] }`
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let values =
            config::parse_json(content).map_err(|error| ConfigError::Json { error, path: None })?;
        let mut registry = Self::new();
        registry.add_definitions(values, None)?;
        Ok(registry)
    }

    /// Parse a TOML document made of `[[tables]]` with `[[tables.entries]]`
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let values =
            config::parse_toml(content).map_err(|error| ConfigError::Toml { error, path: None })?;
        let mut registry = Self::new();
        registry.add_definitions(values, None)?;
        Ok(registry)
    }

    /// Load a single `.json` or `.toml` table file
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        registry.load_file_into(path)?;
        Ok(registry)
    }

    /// Load all table files from a directory (recursively)
    pub fn load_dir(dir: &Path) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        registry.load_dir_into(dir)?;
        Ok(registry)
    }

    fn load_dir_into(&mut self, dir: &Path) -> Result<(), ConfigError> {
        if !dir.exists() {
            return Ok(());
        }

        let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::Io {
            error: e,
            path: Some(dir.to_path_buf()),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ConfigError::Io {
                error: e,
                path: Some(dir.to_path_buf()),
            })?;
            paths.push(entry.path());
        }
        // Stable order so duplicate errors always name the same file
        paths.sort();

        for path in paths {
            if path.is_dir() {
                self.load_dir_into(&path)?;
            } else if is_table_file(&path) {
                self.load_file_into(&path)?;
            }
        }

        Ok(())
    }

    fn load_file_into(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            error: e,
            path: Some(path.to_path_buf()),
        })?;

        let values = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => config::parse_json(&content).map_err(|error| ConfigError::Json {
                error,
                path: Some(path.to_path_buf()),
            })?,
            Some("toml") => config::parse_toml(&content).map_err(|error| ConfigError::Toml {
                error,
                path: Some(path.to_path_buf()),
            })?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };

        self.add_definitions(values, Some(path.to_path_buf()))
    }

    fn add_definitions(
        &mut self,
        values: Vec<Value>,
        path: Option<PathBuf>,
    ) -> Result<(), ConfigError> {
        let tables = match config::parse_tables(values) {
            Ok(tables) => tables,
            Err(errors) => return Err(ConfigError::Invalid { errors, path }),
        };

        let mut errors = Vec::new();
        for table in tables {
            tracing::debug!(table = table.name(), path = ?path, "loaded loot table");
            if let Err(e) = self.insert(table) {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid { errors, path })
        }
    }

    fn insert(&mut self, table: LootTable) -> Result<(), DefinitionError> {
        match self.tables.entry(table.name().to_string()) {
            MapEntry::Occupied(slot) => {
                Err(DefinitionError::DuplicateTableName(slot.key().clone()))
            }
            MapEntry::Vacant(slot) => {
                slot.insert(table);
                Ok(())
            }
        }
    }

    /// Get a table by name
    pub fn get(&self, name: &str) -> Option<&LootTable> {
        self.tables.get(name)
    }

    /// Check if a table exists
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// All table names, sorted
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Make `count` picks from a table by name
    pub fn generate<R: Rng>(
        &self,
        table_name: &str,
        count: u32,
        rng: &mut R,
    ) -> Result<LootDrops, ResolveError> {
        resolve_table(self, table_name, count, rng)
    }

    /// Same as `generate`, with a fresh rng seeded from `seed`
    pub fn generate_seeded(
        &self,
        table_name: &str,
        count: u32,
        seed: u64,
    ) -> Result<LootDrops, ResolveError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.generate(table_name, count, &mut rng)
    }
}

fn is_table_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "json" || ext == "toml")
}
