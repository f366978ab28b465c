//! Program runner driving the interpreter line by line
//!
//! The interpreter itself is stateless. `Session` is the driver around it: it owns the
//! cursor, pauses on tool changes until the operator confirms them, stops in alarm on
//! errors, and feeds cut travel to the wear accumulator.

use super::{
    interpreter::{interpret, PendingToolChange, Signals},
    state::{HomePosition, MachineState, ManualSpindle},
    tools::ToolTable,
    wear::WearAccumulator,
};
use crate::{
    config::MachineConfig,
    gcode::{GCodeFile, SimError, Statement},
};
use serde::Serialize;
use std::collections::BTreeSet;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum RunMode {
    /// Not running, manual controls active
    Idle,
    Running,
    /// Stopped on a tool statement until confirmed
    AwaitingToolChange,
    /// Stopped on an error until reset
    Alarm,
    Finished,
}

/// What a call to [`Session::step`] did
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Statement at `index` replayed
    Advanced { index: usize, signals: Signals },
    /// Waiting for the tool change to be confirmed
    ToolChange(PendingToolChange),
    Alarm(SimError),
    /// Nothing left to run
    Finished,
    /// Not started
    Idle,
}

#[derive(Debug, Clone)]
pub struct Session {
    statements: Vec<Statement>,
    tools: ToolTable,
    home: HomePosition,
    wear: WearAccumulator,
    manual: ManualSpindle,
    mode: RunMode,
    /// Index of the last replayed statement
    cursor: Option<usize>,
    confirmed: BTreeSet<usize>,
    pending: Option<PendingToolChange>,
    last_good: Option<MachineState>,
    error: Option<SimError>,
}

impl Session {
    pub fn new(file: GCodeFile, config: &MachineConfig) -> Self {
        Self {
            statements: file.into_statements(),
            tools: config.tools.clone(),
            home: config.home,
            wear: config.wear(),
            manual: ManualSpindle::default(),
            mode: RunMode::Idle,
            cursor: None,
            confirmed: BTreeSet::new(),
            pending: None,
            last_good: None,
            error: None,
        }
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn error(&self) -> Option<&SimError> {
        self.error.as_ref()
    }

    pub fn tools(&self) -> &ToolTable {
        &self.tools
    }

    pub fn set_manual_spindle(&mut self, manual: ManualSpindle) {
        self.manual = manual;
    }

    /// Current machine state. Idle shows the manual controls at home.
    pub fn snapshot(&self) -> MachineState {
        match (self.mode, &self.last_good) {
            (RunMode::Idle, _) => MachineState::idle(self.home, self.manual),
            (_, None) => MachineState::new(self.home),
            (_, Some(state)) => state.clone(),
        }
    }

    /// Start running from the top
    pub fn start(&mut self) {
        if matches!(self.mode, RunMode::Idle | RunMode::Finished) {
            log::info!("Program started ({} statements)", self.statements.len());
            self.cursor = None;
            self.last_good = None;
            self.mode = RunMode::Running;
        }
    }

    /// Advance to the next statement
    pub fn step(&mut self) -> StepOutcome {
        match self.mode {
            RunMode::Idle => return StepOutcome::Idle,
            RunMode::Finished => return StepOutcome::Finished,
            RunMode::Alarm => {
                if let Some(e) = &self.error {
                    return StepOutcome::Alarm(e.clone());
                }
            }
            RunMode::AwaitingToolChange => {
                if let Some(tc) = self.pending {
                    return StepOutcome::ToolChange(tc);
                }
            }
            RunMode::Running => (),
        }

        let next = self.cursor.map_or(0, |c| c + 1);
        if next >= self.statements.len() {
            log::info!("Program finished");
            self.mode = RunMode::Finished;
            return StepOutcome::Finished;
        }
        self.advance(next)
    }

    /// Operator confirmed the tool change, continue with the next step
    pub fn confirm_tool_change(&mut self) {
        if let Some(tc) = self.pending.take() {
            log::info!("Tool change to T{} confirmed at line {}", tc.tool, tc.line);
            self.confirmed.insert(tc.index);
            self.mode = RunMode::Running;
        }
    }

    /// Move the cursor back so that `index` runs next. Forgets confirmed tool changes.
    pub fn rewind(&mut self, index: usize) {
        if matches!(self.mode, RunMode::Idle | RunMode::Alarm) {
            return;
        }
        self.confirmed.clear();
        self.pending = None;
        self.cursor = index.checked_sub(1);
        self.last_good = None;
        self.mode = RunMode::Running;
        if let Some(c) = self.cursor {
            match interpret(&self.statements, c, &self.tools, self.home) {
                Ok(r) => self.last_good = Some(r.state),
                Err(e) => {
                    self.alarm(e);
                }
            }
        }
    }

    /// Back to idle at the top, clearing any alarm
    pub fn reset(&mut self) {
        log::info!("Reset");
        self.mode = RunMode::Idle;
        self.cursor = None;
        self.confirmed.clear();
        self.pending = None;
        self.last_good = None;
        self.error = None;
    }

    fn advance(&mut self, index: usize) -> StepOutcome {
        let replay = match interpret(&self.statements, index, &self.tools, self.home) {
            Ok(r) => r,
            Err(e) => return self.alarm(e),
        };

        self.cursor = Some(index);
        self.last_good = Some(replay.state);
        let signals = replay.signals;

        if let Some(tc) = signals.tool_change {
            if !self.confirmed.contains(&index) {
                log::info!("Waiting for tool change to T{} at line {}", tc.tool, tc.line);
                self.mode = RunMode::AwaitingToolChange;
                self.pending = Some(tc);
                return StepOutcome::ToolChange(tc);
            }
        }

        if let Some(delta) = &signals.wear {
            if let Err(e) = self.wear.apply(&mut self.tools, delta) {
                log::debug!("No wear recorded: {e}");
            }
        }
        if let Some(reset) = signals.wear_reset {
            if let Err(e) = self.wear.reset(&mut self.tools, reset.tool) {
                log::warn!("{e}");
            }
        }

        StepOutcome::Advanced { index, signals }
    }

    fn alarm(&mut self, e: SimError) -> StepOutcome {
        log::error!("Alarm: {e}");
        self.mode = RunMode::Alarm;
        self.error = Some(e.clone());
        StepOutcome::Alarm(e)
    }
}
