//! Tool table

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::Display;
use thiserror::Error;

/// Wear above which a tool is reported as worn
pub const WORN_PERCENT: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ToolKind {
    General,
    Grooving,
    Threading,
}

/// Static tool descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolEntry {
    pub id: u32,
    pub kind: ToolKind,
    /// Presentation only
    #[serde(default)]
    pub insert_color: String,
    /// Grooving insert width, mm
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub length_offset: f64,
    #[serde(default)]
    pub nose_radius: f64,
    #[serde(default)]
    pub wear_percent: f64,
}

impl ToolEntry {
    pub fn new(id: u32, kind: ToolKind) -> Self {
        Self {
            id,
            kind,
            insert_color: String::new(),
            width: 0.0,
            length_offset: 0.0,
            nose_radius: 0.0,
            wear_percent: 0.0,
        }
    }

    pub fn with_nose_radius(mut self, r: f64) -> Self {
        self.nose_radius = r;
        self
    }

    pub fn with_length_offset(mut self, l: f64) -> Self {
        self.length_offset = l;
        self
    }

    pub fn with_width(mut self, w: f64) -> Self {
        self.width = w;
        self
    }

    pub fn with_color(mut self, c: &str) -> Self {
        self.insert_color = c.into();
        self
    }

    pub fn is_worn(&self) -> bool {
        self.wear_percent >= WORN_PERCENT
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    #[error("Tool T{0} is not in the tool table")]
    UnknownTool(u32),
    #[error("Wear {0} is outside of 0..=100 %")]
    InvalidWear(f64),
}

/// Tool id to descriptor lookup. The interpreter only reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ToolEntry>", into = "Vec<ToolEntry>")]
pub struct ToolTable {
    tools: BTreeMap<u32, ToolEntry>,
}

impl ToolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tool: ToolEntry) -> Option<ToolEntry> {
        self.tools.insert(tool.id, tool)
    }

    pub fn get(&self, id: u32) -> Option<&ToolEntry> {
        self.tools.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolEntry> {
        self.tools.values()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Nose radius of a tool, zero if unknown
    pub fn nose_radius(&self, id: u32) -> f64 {
        self.get(id).map_or(0.0, |t| t.nose_radius)
    }

    /// Set wear of a tool explicitly
    pub fn set_wear(&mut self, id: u32, percent: f64) -> Result<(), ToolError> {
        if !(0.0..=100.0).contains(&percent) {
            return Err(ToolError::InvalidWear(percent));
        }
        self.tool_mut(id)?.wear_percent = percent;
        Ok(())
    }

    /// Raise wear, saturating at 100 %. Returns the new wear.
    pub fn add_wear(&mut self, id: u32, delta: f64) -> Result<f64, ToolError> {
        let tool = self.tool_mut(id)?;
        if delta.is_finite() {
            tool.wear_percent = (tool.wear_percent + delta).clamp(0.0, 100.0);
        }
        Ok(tool.wear_percent)
    }

    pub fn reset_wear(&mut self, id: u32) -> Result<(), ToolError> {
        self.set_wear(id, 0.0)
    }

    fn tool_mut(&mut self, id: u32) -> Result<&mut ToolEntry, ToolError> {
        self.tools.get_mut(&id).ok_or(ToolError::UnknownTool(id))
    }
}

impl From<Vec<ToolEntry>> for ToolTable {
    fn from(tools: Vec<ToolEntry>) -> Self {
        Self {
            tools: tools.into_iter().map(|t| (t.id, t)).collect(),
        }
    }
}

impl From<ToolTable> for Vec<ToolEntry> {
    fn from(t: ToolTable) -> Self {
        t.tools.into_values().collect()
    }
}

impl FromIterator<ToolEntry> for ToolTable {
    fn from_iter<I: IntoIterator<Item = ToolEntry>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ToolTable {
        [
            ToolEntry::new(1, ToolKind::General).with_nose_radius(0.8),
            ToolEntry::new(3, ToolKind::Grooving).with_width(3.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn lookup() {
        let t = table();
        assert_eq!(t.len(), 2);
        assert_eq!(t.nose_radius(1), 0.8);
        assert_eq!(t.nose_radius(2), 0.0);
        assert_eq!(t.get(3).map(|t| t.kind), Some(ToolKind::Grooving));
    }

    #[test]
    fn wear_saturates() {
        let mut t = table();
        assert_eq!(t.add_wear(1, 70.0), Ok(70.0));
        assert!(!t.get(1).unwrap().is_worn());
        assert_eq!(t.add_wear(1, 70.0), Ok(100.0));
        assert!(t.get(1).unwrap().is_worn());
        t.reset_wear(1).unwrap();
        assert_eq!(t.get(1).unwrap().wear_percent, 0.0);
    }

    #[test]
    fn wear_errors() {
        let mut t = table();
        assert_eq!(t.add_wear(9, 1.0), Err(ToolError::UnknownTool(9)));
        assert_eq!(t.set_wear(1, 120.0), Err(ToolError::InvalidWear(120.0)));
    }

    #[test]
    fn json_list() {
        let json = r#"[{"id": 2, "kind": "threading", "nose_radius": 0.2}]"#;
        let t: ToolTable = serde_json::from_str(json).unwrap();
        assert_eq!(t.get(2).map(|t| t.kind), Some(ToolKind::Threading));
        assert_eq!(t.nose_radius(2), 0.2);
    }
}
