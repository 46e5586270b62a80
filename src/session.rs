//! # Drive Session
//!
//! The blocking read → decode → update → command loop.
//!
//! One record is read at a time. Every decoded event updates the controller
//! state, goes through the button bindings, and then produces a fresh motor
//! command, in arrival order. There are no timers: a silent controller means
//! an idle loop and unchanged motor outputs.
//!
//! The loop ends when the input stream ends or fails to read. Motors are
//! stopped on the way out.

use std::io::Read;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::controller::buttons::Button;
use crate::controller::decoder::{EventReader, InputEvent, ReadOutcome};
use crate::controller::mapper::{ControllerState, EventMapper};
use crate::display::{arcade_status, tank_status, StatusDisplay};
use crate::drive::assist::StraightAssist;
use crate::drive::control::{ControlLaw, MotorCommand};
use crate::drive::params::{DriveMode, ParameterChange, ParameterController};
use crate::error::PadDriveError;
use crate::motor::{AuxMotor, MotorSink, Wheel, WheelEncoders};

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Events decoded.
    pub events: u64,
    /// Wheel commands issued to the sink.
    pub commands: u64,
    /// Sink writes or encoder reads that failed.
    pub sink_failures: u64,
}

/// One driving session from controller connect to stream end.
pub struct DriveSession<R, S, D> {
    reader: EventReader<R>,
    mapper: EventMapper,
    params: ParameterController,
    law: ControlLaw,
    assist: Option<(StraightAssist, Box<dyn WheelEncoders + Send>)>,
    sink: S,
    display: D,
    coalesce: bool,
    last_command: Option<MotorCommand>,
    aux_power: [i32; 2],
    summary: SessionSummary,
}

impl<R: Read, S: MotorSink, D: StatusDisplay> DriveSession<R, S, D> {
    /// Creates a session with the starting parameters in `config`.
    pub fn new(reader: EventReader<R>, config: &Config, sink: S, display: D) -> Self {
        Self {
            reader,
            mapper: EventMapper::new(),
            params: ParameterController::new(config.drive.parameters(), config.motors.aux_enabled),
            law: ControlLaw::new(config.drive.turn_positive),
            assist: None,
            sink,
            display,
            coalesce: config.drive.coalesce_commands,
            last_command: None,
            aux_power: [0; 2],
            summary: SessionSummary::default(),
        }
    }

    /// Enables the straight-line assist, reading wheel travel from `encoders`.
    #[must_use]
    pub fn with_assist(mut self, assist: StraightAssist, encoders: Box<dyn WheelEncoders + Send>) -> Self {
        self.assist = Some((assist, encoders));
        self
    }

    /// Counters so far.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        self.summary
    }

    /// Current controller state.
    #[must_use]
    pub fn state(&self) -> &ControllerState {
        self.mapper.state()
    }

    /// Runs until the input stream ends, then stops the motors.
    pub fn run(mut self) -> SessionSummary {
        let banner = format!("PS4 drive {}", self.params.params().status_line());
        self.display.show(&banner);
        info!("Drive loop started ({:?} records)", self.reader.layout());

        loop {
            match self.reader.next_event() {
                Ok(ReadOutcome::Event(event)) => self.step(&event),
                Ok(ReadOutcome::EndOfStream) => {
                    info!("Controller stream ended after {} records", self.reader.records_read());
                    break;
                }
                Err(e) => {
                    warn!("Controller read failed, ending session: {}", e);
                    break;
                }
            }
        }

        if let Err(e) = self.sink.stop_all() {
            self.record_failure(&e);
        }
        self.display.show("Stopped");

        info!(
            "Session finished: {} events, {} commands, {} sink failures",
            self.summary.events, self.summary.commands, self.summary.sink_failures
        );
        self.summary
    }

    /// Processes one decoded event.
    pub fn step(&mut self, event: &InputEvent) {
        self.summary.events += 1;
        self.mapper.process_event(event);

        if let Some(change) = self.params.handle(event) {
            self.apply_change(change);
        }

        let command = self.compute_command();
        self.send_command(command);

        if self.params.aux_enabled() {
            let state = self.mapper.state();
            let a = trigger_pair(state, Button::L1, Button::L2);
            let d = trigger_pair(state, Button::R1, Button::R2);
            self.send_aux(AuxMotor::A, a);
            self.send_aux(AuxMotor::D, d);
        }
    }

    fn apply_change(&mut self, change: ParameterChange) {
        match change {
            ParameterChange::Tuning(_) => {
                let line = self.params.params().status_line();
                self.display.show(&line);
            }
            ParameterChange::Mode(_) => {
                if let Some((assist, _)) = self.assist.as_mut() {
                    assist.reset();
                }
                let line = self.params.params().status_line();
                self.display.show(&line);
            }
            ParameterChange::Aux(enabled) => {
                let line = match (enabled, self.sink.aux_available()) {
                    (false, _) => "Aux:off",
                    (true, true) => "Aux:on",
                    (true, false) => "Aux:none",
                };
                self.display.show(line);
                if !enabled {
                    self.send_aux(AuxMotor::A, 0);
                    self.send_aux(AuxMotor::D, 0);
                }
            }
        }
    }

    fn compute_command(&mut self) -> MotorCommand {
        let params = *self.params.params();
        let state = self.mapper.state();

        if params.mode == DriveMode::Arcade {
            if let Some((assist, encoders)) = self.assist.as_mut() {
                match assist.command(state, &self.law, encoders.as_mut()) {
                    Ok(Some(command)) => return command,
                    Ok(None) => {}
                    Err(e) => {
                        warn!("Straight assist unavailable: {}", e);
                        self.summary.sink_failures += 1;
                    }
                }
            }
        }

        self.law.compute(state, &params)
    }

    fn send_command(&mut self, command: MotorCommand) {
        let changed = self.last_command != Some(command);
        if self.coalesce && !changed {
            return;
        }

        debug!("Command L={} R={}", command.left, command.right);
        let mut delivered = true;
        for (wheel, power) in [(Wheel::Left, command.left), (Wheel::Right, command.right)] {
            if let Err(e) = self.sink.set_power(wheel, power) {
                self.record_failure(&e);
                delivered = false;
            }
        }
        self.summary.commands += 1;

        if changed {
            let params = self.params.params();
            let line = match params.mode {
                DriveMode::Arcade => arcade_status(&self.law.arcade_mix(self.mapper.state(), params), params),
                DriveMode::Tank => tank_status(&command, params),
            };
            self.display.show(&line);
        }
        // A failed write is retried on the next event
        self.last_command = delivered.then_some(command);
    }

    fn send_aux(&mut self, aux: AuxMotor, power: i32) {
        let slot = match aux {
            AuxMotor::A => 0,
            AuxMotor::D => 1,
        };
        if self.aux_power[slot] == power {
            return;
        }
        match self.sink.set_aux_power(aux, power) {
            Ok(()) => self.aux_power[slot] = power,
            Err(e) => self.record_failure(&e),
        }
    }

    fn record_failure(&mut self, error: &PadDriveError) {
        warn!("Motor command failed: {}", error);
        self.summary.sink_failures += 1;
    }
}

/// +100 while `forward` is held, -100 while only `reverse` is held.
fn trigger_pair(state: &ControllerState, forward: Button, reverse: Button) -> i32 {
    if state.is_pressed(forward) {
        100
    } else if state.is_pressed(reverse) {
        -100
    } else {
        0
    }
}
