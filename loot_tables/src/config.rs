use crate::entry::{Entry, EntryKind};
use crate::table::{LootTable, SelectionPolicy};
use crate::{DefinitionError, Location};
use serde::Deserialize;
use serde_json::Value;

/// TOML layout of a loot table file: a list of `[[tables]]`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableFileConfig {
    pub tables: Vec<Value>,
}

/// JSON files may be a bare array of tables or the same `{ "tables": [...] }` layout
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonDocument {
    List(Vec<Value>),
    File(TableFileConfig),
}

/// Configuration for a single table
#[derive(Debug, Deserialize)]
pub struct TableConfig {
    #[serde(alias = "TableName")]
    pub name: String,
    #[serde(alias = "TableType")]
    pub policy: PolicyConfig,
    // Kept raw so each entry is converted, and reported, on its own
    #[serde(alias = "TableEntryCollection")]
    pub entries: Vec<Value>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyConfig {
    #[serde(alias = "Random")]
    WithReplacement,
    #[serde(alias = "UniqueRandom")]
    WithoutReplacement,
}

impl From<PolicyConfig> for SelectionPolicy {
    fn from(config: PolicyConfig) -> Self {
        match config {
            PolicyConfig::WithReplacement => SelectionPolicy::WithReplacement,
            PolicyConfig::WithoutReplacement => SelectionPolicy::WithoutReplacement,
        }
    }
}

/// Configuration for a single entry in a table
#[derive(Debug, Deserialize)]
pub struct EntryConfig {
    #[serde(rename = "type", alias = "EntryType")]
    pub entry_type: EntryTypeConfig,
    #[serde(alias = "EntryName")]
    pub name: String,
    #[serde(alias = "SelectionWeight")]
    pub weight: f64,
    // Read as numbers so whole-valued floats like `1.0` are accepted
    #[serde(default, alias = "MinDrops")]
    pub min_drops: Option<f64>,
    #[serde(default, alias = "MaxDrops")]
    pub max_drops: Option<f64>,
    // Shorthand for min_drops/max_drops
    #[serde(default)]
    pub count: Option<CountConfig>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryTypeConfig {
    #[serde(alias = "Item")]
    Item,
    #[serde(alias = "Table", alias = "reference")]
    Table,
}

impl From<EntryTypeConfig> for EntryKind {
    fn from(config: EntryTypeConfig) -> Self {
        match config {
            EntryTypeConfig::Item => EntryKind::Item,
            EntryTypeConfig::Table => EntryKind::Reference,
        }
    }
}

/// Count can be a single value or a range [min, max]
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CountConfig {
    Single(u32),
    Range([u32; 2]),
}

impl CountConfig {
    pub fn min(&self) -> u32 {
        match self {
            CountConfig::Single(v) => *v,
            CountConfig::Range([min, _]) => *min,
        }
    }

    pub fn max(&self) -> u32 {
        match self {
            CountConfig::Single(v) => *v,
            CountConfig::Range([_, max]) => *max,
        }
    }
}

impl EntryConfig {
    fn drop_range(&self) -> Result<(u32, u32), String> {
        let explicit = self.min_drops.is_some() || self.max_drops.is_some();
        if let Some(count) = &self.count {
            if explicit {
                return Err("both `count` and `min_drops`/`max_drops` given".to_string());
            }
            return Ok((count.min(), count.max()));
        }
        match (self.min_drops, self.max_drops) {
            (Some(min), Some(max)) => {
                Ok((drop_bound("min_drops", min)?, drop_bound("max_drops", max)?))
            }
            (None, _) => Err("missing field `min_drops`".to_string()),
            (_, None) => Err("missing field `max_drops`".to_string()),
        }
    }
}

/// A drop bound must be a whole number that fits in a u32
fn drop_bound(field: &str, value: f64) -> Result<u32, String> {
    if value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value) {
        Ok(value as u32)
    } else {
        Err(format!("`{}` must be a non-negative whole number, got {}", field, value))
    }
}

pub(crate) fn parse_json(content: &str) -> Result<Vec<Value>, serde_json::Error> {
    let document: JsonDocument = serde_json::from_str(content)?;
    Ok(match document {
        JsonDocument::List(tables) => tables,
        JsonDocument::File(file) => file.tables,
    })
}

pub(crate) fn parse_toml(content: &str) -> Result<Vec<Value>, toml::de::Error> {
    let file: TableFileConfig = toml::from_str(content)?;
    Ok(file.tables)
}

/// Convert raw table definitions, collecting every failure instead of stopping at the first
pub(crate) fn parse_tables(values: Vec<Value>) -> Result<Vec<LootTable>, Vec<DefinitionError>> {
    let mut tables = Vec::with_capacity(values.len());
    let mut errors = Vec::new();

    for (index, value) in values.into_iter().enumerate() {
        match parse_table(index, value) {
            Ok(table) => tables.push(table),
            Err(table_errors) => errors.extend(table_errors),
        }
    }

    if errors.is_empty() {
        Ok(tables)
    } else {
        Err(errors)
    }
}

fn parse_table(index: usize, value: Value) -> Result<LootTable, Vec<DefinitionError>> {
    let location = Location::table(table_label(index, &value));

    let config: TableConfig =
        serde_json::from_value(value).map_err(|e| vec![parse_error(&location, e)])?;

    let mut entries = Vec::with_capacity(config.entries.len());
    let mut errors = Vec::new();
    for (i, raw) in config.entries.into_iter().enumerate() {
        match parse_entry(raw, location.entry(i)) {
            Ok(entry) => entries.push(entry),
            Err(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    LootTable::new(config.name, config.policy.into(), entries).map_err(|e| vec![e])
}

fn parse_entry(value: Value, location: Location) -> Result<Entry, DefinitionError> {
    let config: EntryConfig =
        serde_json::from_value(value).map_err(|e| parse_error(&location, e))?;

    let (min, max) = config
        .drop_range()
        .map_err(|message| DefinitionError::Parse {
            location: location.clone(),
            message,
        })?;

    Entry::new(config.entry_type.into(), config.name, config.weight, min, max)
        .map_err(|e| e.at(location))
}

/// Name used to report errors for a table whose definition may be broken
fn table_label(index: usize, value: &Value) -> String {
    ["name", "TableName"]
        .iter()
        .find_map(|key| value.get(key)?.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", index))
}

fn parse_error(location: &Location, error: serde_json::Error) -> DefinitionError {
    DefinitionError::Parse {
        location: location.clone(),
        message: error.to_string(),
    }
}
