pub mod compensation;
pub mod interpreter;
pub mod session;
pub mod state;
pub mod tools;
pub mod wear;

pub use self::interpreter::{
    interpret, PendingToolChange, Replay, Signals, WearDelta, WearReset,
};
pub use self::session::{RunMode, Session, StepOutcome};
pub use self::state::{
    Coolant, HomePosition, MachineState, ManualSpindle, MotionKind, PathPoint, Point,
    PositioningMode, RadiusCompensation, SpindleDirection,
};
pub use self::tools::{ToolEntry, ToolError, ToolKind, ToolTable};
pub use self::wear::WearAccumulator;
