//! Machine configuration

use crate::machine::{HomePosition, ToolEntry, ToolKind, ToolTable, WearAccumulator};
use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};
use strum::{Display, EnumString};
use thiserror::Error;

/// Workpiece material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Material {
    Aluminum,
    Brass,
    MildSteel,
    StainlessSteel,
    Titanium,
}

impl Material {
    /// Wear factor relative to mild steel
    pub fn hardness(self) -> f64 {
        match self {
            Material::Aluminum => 0.5,
            Material::Brass => 0.7,
            Material::MildSteel => 1.0,
            Material::StainlessSteel => 1.6,
            Material::Titanium => 2.2,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Can't read config: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Machine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub home: HomePosition,
    pub tools: ToolTable,
    pub material: Material,
    /// Wear percent per mm of cut in mild steel
    pub wear_rate: f64,
}

impl Default for MachineConfig {
    fn default() -> Self {
        let tools = [
            ToolEntry::new(1, ToolKind::General)
                .with_nose_radius(0.8)
                .with_color("gold"),
            ToolEntry::new(2, ToolKind::General)
                .with_nose_radius(0.4)
                .with_length_offset(5.0)
                .with_color("silver"),
            ToolEntry::new(3, ToolKind::Grooving)
                .with_width(3.0)
                .with_nose_radius(0.2)
                .with_length_offset(10.0)
                .with_color("black"),
            ToolEntry::new(4, ToolKind::Threading)
                .with_nose_radius(0.1)
                .with_length_offset(8.0)
                .with_color("blue"),
        ];
        Self {
            home: HomePosition::default(),
            tools: tools.into_iter().collect(),
            material: Material::MildSteel,
            wear_rate: 0.01,
        }
    }
}

impl MachineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn wear(&self) -> WearAccumulator {
        WearAccumulator::new(self.material, self.wear_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::{MachineConfig, Material};
    use crate::machine::HomePosition;

    #[test]
    fn defaults() {
        let c = MachineConfig::default();
        assert_eq!(c.home, HomePosition::new(100.0, 50.0));
        assert_eq!(c.tools.len(), 4);
        assert_eq!(c.tools.nose_radius(1), 0.8);
    }

    #[test]
    fn partial_json() {
        let c: MachineConfig =
            serde_json::from_str(r#"{"home": {"x": 200, "z": 120}, "material": "titanium"}"#)
                .unwrap();
        assert_eq!(c.home, HomePosition::new(200.0, 120.0));
        assert_eq!(c.material, Material::Titanium);
        assert_eq!(c.tools.len(), 4);
    }

    #[test]
    fn json_round_trip() {
        let c = MachineConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let back: MachineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn save_and_load() {
        let path = std::env::temp_dir().join(format!("lathesim-config-{}.json", std::process::id()));
        let c = MachineConfig {
            material: Material::Brass,
            wear_rate: 0.02,
            ..MachineConfig::default()
        };
        c.save(&path).unwrap();
        let back = MachineConfig::load(&path);
        std::fs::remove_file(&path).ok();
        assert_eq!(back.unwrap(), c);
    }

    #[test]
    fn load_errors() {
        let missing = std::env::temp_dir().join("lathesim-no-such-config.json");
        assert!(matches!(
            MachineConfig::load(missing),
            Err(super::ConfigError::Io(_))
        ));
    }

    #[test]
    fn material_names() {
        assert_eq!("stainless_steel".parse::<Material>(), Ok(Material::StainlessSteel));
        assert_eq!(Material::MildSteel.to_string(), "mild_steel");
    }
}
