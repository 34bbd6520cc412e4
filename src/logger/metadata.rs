//! Column type map persisted next to the data table.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MnemosyneError, Result};

/// The type a column holds for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    #[serde(rename = "scalar")]
    Scalar,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "img")]
    Image,
}

impl ColumnType {
    /// The on-disk tag for this type.
    pub fn tag(&self) -> &'static str {
        match self {
            ColumnType::Scalar => "scalar",
            ColumnType::Text => "text",
            ColumnType::Image => "img",
        }
    }

    /// Parse an on-disk tag. Returns `None` for anything outside the
    /// known kinds.
    pub fn from_tag(tag: &str) -> Option<ColumnType> {
        match tag {
            "scalar" => Some(ColumnType::Scalar),
            "text" => Some(ColumnType::Text),
            "img" => Some(ColumnType::Image),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Load the column type map from `path`.
///
/// The file is a JSON object mapping column names to type tags. A tag
/// outside the known kinds is a fatal corruption error.
pub(crate) fn load(path: &Path) -> Result<BTreeMap<String, ColumnType>> {
    let raw = fs::read_to_string(path)
        .map_err(|e| MnemosyneError::corrupt(format!("cannot read {}: {}", path.display(), e)))?;
    let tags: BTreeMap<String, String> = serde_json::from_str(&raw)
        .map_err(|e| MnemosyneError::corrupt(format!("cannot parse {}: {}", path.display(), e)))?;

    let mut types = BTreeMap::new();
    for (column, tag) in tags {
        match ColumnType::from_tag(&tag) {
            Some(ty) => {
                types.insert(column, ty);
            }
            None => return Err(MnemosyneError::UnknownDataType { column, tag }),
        }
    }
    Ok(types)
}

/// Write the column type map to `path` as JSON.
pub(crate) fn write(path: &Path, types: &BTreeMap<String, ColumnType>) -> Result<()> {
    let json = serde_json::to_string_pretty(types)?;
    fs::write(path, json)?;
    Ok(())
}
