//! Lathe G-code simulator
//!
//! Parses a lathe program and replays it up to a cursor, producing the machine state and
//! the tool path traced so far.

pub mod config;
pub mod gcode;
pub mod machine;
pub mod render;

pub use config::{MachineConfig, Material};
pub use gcode::{parse, GCodeFile, SimError, Statement};
pub use machine::{interpret, MachineState, Replay, Session};
