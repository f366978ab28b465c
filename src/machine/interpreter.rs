//! The lathe interpreter
//!
//! Replays statements `0..=upto` from a fresh state on every call. Nothing survives between
//! calls, so the same program, cursor, tool table and home always give the same result.

use super::{
    compensation::compensate,
    state::{
        Coolant, FeedMode, HomePosition, MachineState, MotionKind, PathPoint, Point,
        PositioningMode, RadiusCompensation, SpeedMode, SpindleDirection, Units,
    },
    tools::ToolTable,
};
use crate::gcode::{GWord, MWord, SimError, Statement, StatementKind};
use serde::Serialize;

const AXIS_WORDS: [char; 4] = ['X', 'Z', 'U', 'W'];

/// Tool statement at the cursor: the driver should wait for confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingToolChange {
    /// Statement index
    pub index: usize,
    /// 1-based source line
    pub line: usize,
    pub tool: u32,
}

/// M100 at the cursor: zero the wear of `tool`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WearReset {
    pub tool: u32,
}

/// Travel made by the statement at the cursor
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WearDelta {
    pub tool: u32,
    pub motion: MotionKind,
    /// mm, X in radius space
    pub distance: f64,
}

/// Side channel for the external driver, about the cursor statement only
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Signals {
    pub tool_change: Option<PendingToolChange>,
    pub wear_reset: Option<WearReset>,
    pub wear: Option<WearDelta>,
}

/// Result of one replay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Replay {
    pub state: MachineState,
    pub signals: Signals,
}

/// Replay `statements[0..=upto]` and return the resulting machine state.
///
/// `upto` is an index into `statements`, clamped to the last one. The first statement
/// with an unsupported G code stops the replay with its error.
///
/// Replay always starts with the spindle stopped. Manual spindle input only shows up in
/// the idle state built by [`MachineState::idle`].
pub fn interpret(
    statements: &[Statement],
    upto: usize,
    tools: &ToolTable,
    home: HomePosition,
) -> Result<Replay, SimError> {
    let mut interp = Interpreter::new(tools, home);
    let Some(last) = statements.len().checked_sub(1) else {
        return Ok(interp.finish(Signals::default()));
    };
    let upto = upto.min(last);

    for stmt in &statements[..upto] {
        interp.execute(stmt)?;
    }

    let cursor = &statements[upto];
    let start = interp.state.position();
    let committed = interp.state.path.len();
    interp.execute(cursor)?;
    let signals = interp.signals(upto, cursor, start, committed);

    Ok(interp.finish(signals))
}

#[derive(Debug)]
struct Interpreter<'t> {
    tools: &'t ToolTable,
    home: HomePosition,
    state: MachineState,
}

impl<'t> Interpreter<'t> {
    fn new(tools: &'t ToolTable, home: HomePosition) -> Self {
        Self {
            tools,
            home,
            state: MachineState::new(home),
        }
    }

    fn finish(self, signals: Signals) -> Replay {
        Replay {
            state: self.state,
            signals,
        }
    }

    fn execute(&mut self, stmt: &Statement) -> Result<(), SimError> {
        log::debug!("Line {}: {stmt}", stmt.source_line);

        let g = match stmt.kind {
            StatementKind::G => validate(stmt)?,
            _ => None,
        };

        self.state.line = Some(stmt.source_line);
        self.state.feed_rate.upd(stmt.param('F'));
        if g != Some(GWord::G50) {
            self.state.spindle_speed.upd(stmt.param('S'));
        }

        match stmt.kind {
            StatementKind::G => self.execute_g(stmt, g),
            StatementKind::M => self.execute_m(stmt),
            StatementKind::T => self.execute_t(stmt),
            StatementKind::S | StatementKind::F | StatementKind::Comment => (),
        }

        Ok(())
    }

    fn execute_g(&mut self, stmt: &Statement, g: Option<GWord>) {
        use GWord::*;

        if let Some(g) = g {
            let st = &mut self.state;
            match g {
                G90 => st.positioning_mode = PositioningMode::Absolute,
                G91 => st.positioning_mode = PositioningMode::Incremental,
                G20 => st.units = Units::Inch,
                G21 => st.units = Units::Metric,
                G40 => st.radius_compensation = RadiusCompensation::Off,
                G41 => st.radius_compensation = RadiusCompensation::Left,
                G42 => st.radius_compensation = RadiusCompensation::Right,
                G43 | G44 => {
                    let sign = if g == G43 { 1.0 } else { -1.0 };
                    if let Some(offset) = length_offset(self.tools, stmt, sign) {
                        st.tool_length_offset = offset;
                    }
                }
                G49 => st.tool_length_offset = 0.0,
                G50 => {
                    if let Some(s) = stmt.param('S') {
                        st.max_spindle_speed = Some(s);
                    }
                }
                G96 => st.speed_mode = SpeedMode::SurfaceSpeed,
                G97 => st.speed_mode = SpeedMode::Rpm,
                G98 => st.feed_mode = FeedMode::PerMinute,
                G99 => st.feed_mode = FeedMode::PerRevolution,
                g if g.draws_path() => st.active_cycle = None,
                g if g.is_canned_cycle() => st.active_cycle = Some(g),
                _ => (),
            }
        }

        match g {
            Some(G28) => self.home_return(stmt),
            // Dwell time, clamp and cycle words are not coordinates
            Some(G4 | G50) => (),
            Some(g) if g.is_canned_cycle() => (),
            Some(g) => {
                let target = self.target(stmt);
                if g.draws_path() && stmt.has_any(&AXIS_WORDS) {
                    self.commit(target, g);
                }
                self.state.set_position(target);
            }
            // Continuation lines of a cycle carry its parameters
            None if self.state.active_cycle.is_some() => (),
            // Plain continuation: the axes move, nothing is drawn
            None => {
                let target = self.target(stmt);
                self.state.set_position(target);
            }
        }
    }

    fn execute_m(&mut self, stmt: &Statement) {
        let Some(code) = stmt.code else {
            return;
        };

        use MWord::*;
        let st = &mut self.state;
        match MWord::from_number(code) {
            Some(M3) => st.spindle_direction = SpindleDirection::Cw,
            Some(M4) => st.spindle_direction = SpindleDirection::Ccw,
            Some(M5) => st.spindle_direction = SpindleDirection::Stop,
            Some(M7) => st.coolant = Coolant::Mist,
            Some(M8) => st.coolant = Coolant::Flood,
            Some(M9) => st.coolant = Coolant::Off,
            Some(m @ (M0 | M1 | M2 | M30)) => log::debug!("{m} at line {}", stmt.source_line),
            Some(M100) => (),
            None => log::debug!(
                "Ignoring unknown M code 'M{code}' at line {}",
                stmt.source_line
            ),
        }
    }

    fn execute_t(&mut self, stmt: &Statement) {
        match stmt.code_text.as_deref().and_then(tool_id) {
            Some(id) if id > 0 => self.state.active_tool = id,
            _ => log::debug!("Tool word without tool at line {}", stmt.source_line),
        }
    }

    /// Target of the axis words: X/Z follow the positioning mode, U/W are always deltas
    fn target(&self, stmt: &Statement) -> Point {
        let mut p = self.state.position();
        let absolute = self.state.positioning_mode == PositioningMode::Absolute;
        let apply = |cur: f64, v: f64| if absolute { v } else { cur + v };

        if let Some(x) = stmt.param('X') {
            p.x = apply(p.x, x);
        }
        if let Some(z) = stmt.param('Z') {
            p.z = apply(p.z, z);
        }
        p += Point::new(
            stmt.param('U').unwrap_or_default(),
            stmt.param('W').unwrap_or_default(),
        );
        p
    }

    /// Move to the programmed point, then return the named axes (or both) home
    fn home_return(&mut self, stmt: &Statement) {
        let mut p = self.target(stmt);
        self.state
            .path
            .push(PathPoint::nominal(p, MotionKind::Rapid));

        let x_named = stmt.has_any(&['X', 'U']);
        let z_named = stmt.has_any(&['Z', 'W']);
        let both = !x_named && !z_named;
        if both || x_named {
            p.x = self.home.x;
        }
        if both || z_named {
            p.z = self.home.z;
        }

        self.state
            .path
            .push(PathPoint::nominal(p, MotionKind::Rapid));
        self.state.set_position(p);
    }

    fn commit(&mut self, target: Point, g: GWord) {
        let st = &mut self.state;
        if !g.is_cut() {
            st.path.push(PathPoint::nominal(target, MotionKind::Rapid));
            return;
        }

        if st.spindle_direction == SpindleDirection::Stop {
            log::warn!(
                "Line {}: {g} cut with the spindle stopped",
                st.line.unwrap_or_default()
            );
        }

        let radius = self.tools.nose_radius(st.active_tool);
        let side = st.radius_compensation;
        let point = if side != RadiusCompensation::Off && radius > 0.0 {
            let prev = st.path.last().map_or(st.position(), PathPoint::point);
            let contact = compensate(prev, target, side, radius);
            PathPoint::with_contact(target, contact, MotionKind::Cut)
        } else {
            PathPoint::nominal(target, MotionKind::Cut)
        };
        st.path.push(point);
    }

    fn signals(&self, index: usize, stmt: &Statement, start: Point, committed: usize) -> Signals {
        let tool = self.state.active_tool;
        let tool_change = (stmt.kind == StatementKind::T).then_some(PendingToolChange {
            index,
            line: stmt.source_line,
            tool,
        });
        let wear_reset = (stmt.kind == StatementKind::M
            && stmt.code.and_then(MWord::from_number) == Some(MWord::M100))
        .then_some(WearReset { tool });

        let new_points = &self.state.path[committed..];
        let wear = new_points.last().map(|last| {
            let (distance, _) = new_points.iter().fold((0.0, start), |(d, from), p| {
                (d + from.distance_to(p.point()), p.point())
            });
            WearDelta {
                tool,
                motion: last.motion,
                distance,
            }
        });

        Signals {
            tool_change,
            wear_reset,
            wear,
        }
    }
}

/// Supported G word of a statement, `None` for parameter continuation lines
fn validate(stmt: &Statement) -> Result<Option<GWord>, SimError> {
    match &stmt.code_text {
        None => Ok(None),
        Some(text) => GWord::from_text(stmt.code, text)
            .map(Some)
            .map_err(|e| e.at_line(stmt.source_line)),
    }
}

/// Length offset selected by H, `None` when H is not given
fn length_offset(tools: &ToolTable, stmt: &Statement, sign: f64) -> Option<f64> {
    let h = stmt.param('H')?;
    let offset = match tools.get(h as u32) {
        Some(tool) => sign * tool.length_offset,
        None => {
            log::warn!(
                "Line {}: length offset H{h} names no tool, offset cleared",
                stmt.source_line
            );
            0.0
        }
    };
    Some(offset)
}

/// Tool id: first two digits of the T number as written ("0101" is tool 1)
fn tool_id(text: &str) -> Option<u32> {
    text.get(..2).unwrap_or(text).parse().ok()
}

trait Update<T> {
    fn upd(&mut self, other: Option<T>) -> bool;
}

impl<T> Update<T> for T {
    fn upd(&mut self, other: Option<T>) -> bool {
        if let Some(v) = other {
            *self = v;
            true
        } else {
            false
        }
    }
}
