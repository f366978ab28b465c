//! Tool wear accumulation

use super::{
    interpreter::WearDelta,
    state::MotionKind,
    tools::{ToolError, ToolTable},
};
use crate::config::Material;

/// Raises tool wear from cutting travel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WearAccumulator {
    pub material: Material,
    /// Wear percent per mm of cut in a material of hardness 1
    pub rate: f64,
}

impl WearAccumulator {
    pub fn new(material: Material, rate: f64) -> Self {
        Self { material, rate }
    }

    /// Wear a single move adds to its tool
    pub fn wear_of(&self, delta: &WearDelta) -> f64 {
        match delta.motion {
            MotionKind::Rapid => 0.0,
            MotionKind::Cut => delta.distance * self.rate * self.material.hardness(),
        }
    }

    /// Apply a move to the tool table, returning the tool's new wear
    pub fn apply(&self, tools: &mut ToolTable, delta: &WearDelta) -> Result<f64, ToolError> {
        let was_worn = tools.get(delta.tool).map_or(false, |t| t.is_worn());
        let wear = tools.add_wear(delta.tool, self.wear_of(delta))?;
        if !was_worn && tools.get(delta.tool).map_or(false, |t| t.is_worn()) {
            log::warn!("Tool T{} is worn ({wear:.1} %)", delta.tool);
        }
        Ok(wear)
    }

    /// Zero the wear of a tool
    pub fn reset(&self, tools: &mut ToolTable, tool: u32) -> Result<(), ToolError> {
        log::info!("Wear of tool T{tool} reset");
        tools.reset_wear(tool)
    }
}

#[cfg(test)]
mod tests {
    use super::WearAccumulator;
    use crate::{
        config::Material,
        machine::{
            interpreter::WearDelta,
            state::MotionKind,
            tools::{ToolEntry, ToolKind, ToolTable},
        },
    };
    use approx::assert_relative_eq;

    fn delta(motion: MotionKind, distance: f64) -> WearDelta {
        WearDelta {
            tool: 1,
            motion,
            distance,
        }
    }

    #[test]
    fn only_cuts_wear() {
        let mut tools: ToolTable = [ToolEntry::new(1, ToolKind::General)].into_iter().collect();
        let acc = WearAccumulator::new(Material::StainlessSteel, 0.5);

        assert_eq!(acc.apply(&mut tools, &delta(MotionKind::Rapid, 100.0)), Ok(0.0));
        let wear = acc.apply(&mut tools, &delta(MotionKind::Cut, 10.0)).unwrap();
        assert_relative_eq!(wear, 8.0, epsilon = 1e-9);

        let wear = acc.apply(&mut tools, &delta(MotionKind::Cut, 1000.0)).unwrap();
        assert_eq!(wear, 100.0);

        acc.reset(&mut tools, 1).unwrap();
        assert_eq!(tools.get(1).map(|t| t.wear_percent), Some(0.0));
    }

    #[test]
    fn harder_wears_faster() {
        let d = delta(MotionKind::Cut, 10.0);
        let soft = WearAccumulator::new(Material::Aluminum, 0.1).wear_of(&d);
        let hard = WearAccumulator::new(Material::Titanium, 0.1).wear_of(&d);
        assert!(hard > soft);
    }

    #[test]
    fn unknown_tool() {
        let mut tools = ToolTable::new();
        let acc = WearAccumulator::new(Material::Brass, 0.1);
        assert!(acc.apply(&mut tools, &delta(MotionKind::Cut, 1.0)).is_err());
    }
}
