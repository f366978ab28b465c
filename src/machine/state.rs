//! Machine state and modal values

use crate::gcode::GWord;
use derive_more::{AddAssign, Sub};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lathe point: X is a diameter, Z a signed length, both in mm
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, AddAssign, Sub)]
pub struct Point {
    pub x: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    /// Travel length with X converted to radius space
    pub fn distance_to(self, other: Point) -> f64 {
        let d = other - self;
        (d.x / 2.0).hypot(d.z)
    }
}

/// Configured reference point for start of replay and G28
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomePosition {
    pub x: f64,
    pub z: f64,
}

impl HomePosition {
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }
}

impl Default for HomePosition {
    fn default() -> Self {
        Self { x: 100.0, z: 50.0 }
    }
}

impl From<HomePosition> for Point {
    fn from(h: HomePosition) -> Self {
        Point::new(h.x, h.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum SpindleDirection {
    #[strum(serialize = "CW")]
    Cw,
    #[strum(serialize = "CCW")]
    Ccw,
    #[strum(serialize = "STOP")]
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum RadiusCompensation {
    #[strum(serialize = "G40 (off)")]
    Off,
    #[strum(serialize = "G41 (left)")]
    Left,
    #[strum(serialize = "G42 (right)")]
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum PositioningMode {
    #[strum(serialize = "G90 (absolute)")]
    Absolute,
    #[strum(serialize = "G91 (incremental)")]
    Incremental,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum Coolant {
    #[strum(serialize = "off")]
    Off,
    #[strum(serialize = "M7 (mist)")]
    Mist,
    #[strum(serialize = "M8 (flood)")]
    Flood,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum MotionKind {
    #[strum(serialize = "rapid")]
    Rapid,
    #[strum(serialize = "cut")]
    Cut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum FeedMode {
    #[strum(serialize = "G98 (per minute)")]
    PerMinute,
    #[strum(serialize = "G99 (per revolution)")]
    PerRevolution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum SpeedMode {
    #[strum(serialize = "G96 (constant surface speed)")]
    SurfaceSpeed,
    #[strum(serialize = "G97 (rpm)")]
    Rpm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum Units {
    #[strum(serialize = "G20 (inch)")]
    Inch,
    #[strum(serialize = "G21 (metric)")]
    Metric,
}

/// One committed motion endpoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathPoint {
    pub x: f64,
    pub z: f64,
    /// Contact point; equals nominal unless compensated
    pub cx: f64,
    pub cz: f64,
    pub compensated: bool,
    pub motion: MotionKind,
}

impl PathPoint {
    pub fn nominal(p: Point, motion: MotionKind) -> Self {
        Self {
            x: p.x,
            z: p.z,
            cx: p.x,
            cz: p.z,
            compensated: false,
            motion,
        }
    }

    pub fn with_contact(p: Point, contact: Point, motion: MotionKind) -> Self {
        Self {
            cx: contact.x,
            cz: contact.z,
            compensated: true,
            ..Self::nominal(p, motion)
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.z)
    }

    pub fn contact(&self) -> Point {
        Point::new(self.cx, self.cz)
    }
}

/// Manual spindle controls, used while the machine is idle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManualSpindle {
    pub direction: SpindleDirection,
    pub speed: f64,
}

impl Default for ManualSpindle {
    fn default() -> Self {
        Self {
            direction: SpindleDirection::Stop,
            speed: 0.0,
        }
    }
}

/// Fold result at a given cursor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineState {
    pub x: f64,
    pub z: f64,
    pub spindle_speed: f64,
    pub spindle_direction: SpindleDirection,
    pub active_tool: u32,
    pub tool_length_offset: f64,
    pub radius_compensation: RadiusCompensation,
    pub positioning_mode: PositioningMode,
    pub coolant: Coolant,
    pub feed_rate: f64,
    pub feed_mode: FeedMode,
    pub speed_mode: SpeedMode,
    pub max_spindle_speed: Option<f64>,
    pub units: Units,
    pub active_cycle: Option<GWord>,
    /// Source line of the last replayed statement
    pub line: Option<usize>,
    pub path: Vec<PathPoint>,
}

impl MachineState {
    /// State at the top of every replay
    pub fn new(home: HomePosition) -> Self {
        Self {
            x: home.x,
            z: home.z,
            spindle_speed: 0.0,
            spindle_direction: SpindleDirection::Stop,
            active_tool: 1,
            tool_length_offset: 0.0,
            radius_compensation: RadiusCompensation::Off,
            positioning_mode: PositioningMode::Absolute,
            coolant: Coolant::Off,
            feed_rate: 0.0,
            feed_mode: FeedMode::PerRevolution,
            speed_mode: SpeedMode::Rpm,
            max_spindle_speed: None,
            units: Units::Metric,
            active_cycle: None,
            line: None,
            path: Vec::new(),
        }
    }

    /// Idle machine: manual spindle at home, nothing replayed
    pub fn idle(home: HomePosition, manual: ManualSpindle) -> Self {
        Self {
            spindle_direction: manual.direction,
            spindle_speed: manual.speed,
            ..Self::new(home)
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.z)
    }

    pub fn set_position(&mut self, p: Point) {
        self.x = p.x;
        self.z = p.z;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_reflects_manual_spindle() {
        let manual = ManualSpindle {
            direction: SpindleDirection::Cw,
            speed: 1000.0,
        };
        let s = MachineState::idle(HomePosition::new(100.0, 50.0), manual);
        assert_eq!(s.spindle_direction, SpindleDirection::Cw);
        assert_eq!(s.spindle_speed, 1000.0);
        assert_eq!(s.position(), Point::new(100.0, 50.0));
        assert!(s.path.is_empty());
    }

    #[test]
    fn radius_space_distance() {
        let d = Point::new(40.0, 0.0).distance_to(Point::new(46.0, -4.0));
        assert_eq!(d, 5.0);
    }

    #[test]
    fn point_arith() {
        let mut p = Point::new(4.0, 2.0) - Point::new(3.0, -4.0);
        assert_eq!(p, Point::new(1.0, 6.0));
        p += Point::new(-1.0, 0.5);
        assert_eq!(p, Point::new(0.0, 6.5));
    }

    #[test]
    fn spindle_from_str() {
        assert_eq!("cw".parse::<SpindleDirection>(), Ok(SpindleDirection::Cw));
        assert_eq!(SpindleDirection::Stop.to_string(), "STOP");
    }
}
