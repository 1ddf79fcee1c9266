//! Main loop for SenseLogger
//!
//! [`SenseLogger`] owns every collaborator and all mutable state. Each
//! iteration waits one poll window for joystick input, interprets the events
//! in arrival order, then takes one sample if a session is open.
//!
//! ```text
//!            LEFT pressed                 RIGHT pressed
//!   Idle ─────────────────▶ Recording ─────────────────▶ Idle
//!    │                          │
//!    │ DOWN held                │ DOWN held
//!    ▼                          ▼
//!   ConfirmShutdown ── UP ──▶ (close session) ──▶ OS shutdown
//!          │
//!          └─ DOWN / other / timeout ──▶ back to prior state
//! ```

use crate::config::Config;
use crate::core::driver::PowerControl;
use crate::core::types::{Action, Direction, InputEvent};
use crate::devices::DeviceSet;
use crate::display::{Color, DisplayController, DisplayState, Glyph};
use crate::error::Result;
use crate::input::InputDispatcher;
use crate::network::{DEFAULT_INTERFACE, NetworkInfo};
use crate::recorder::RecordWriter;
use crate::sensor::SensorReader;
use log::{debug, error, info, warn};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Consecutive failed samples after which the session is closed
pub const MAX_CONSECUTIVE_SAMPLE_FAILURES: u32 = 5;

/// Shown when the interface has no address
pub const NO_IP: &str = "No IP";

/// Loop pacing
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    /// Longest wait for joystick input per iteration; also bounds the
    /// shutdown confirmation wait
    pub poll_timeout: Duration,
    /// How long transient glyphs stay up
    pub hold: Duration,
    /// Ready glyph duration at startup
    pub splash: Duration,
    /// Delay between scrolling text frames
    pub scroll_frame: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_secs(2),
            hold: Duration::from_secs(2),
            splash: Duration::from_secs(5),
            scroll_frame: Duration::from_millis(100),
        }
    }
}

impl Timing {
    /// No holds or scroll delay, short poll window
    pub fn immediate(poll_timeout: Duration) -> Self {
        Self {
            poll_timeout,
            hold: Duration::ZERO,
            splash: Duration::ZERO,
            scroll_frame: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerOptions {
    pub prefix: String,
    /// Where open files are written
    pub working_dir: PathBuf,
    /// Completed-jobs directory
    pub output_dir: PathBuf,
    /// Interface whose address MIDDLE shows
    pub interface: String,
    pub timing: Timing,
}

impl LoggerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            prefix: config.recording.prefix.clone(),
            working_dir: PathBuf::from("."),
            output_dir: config.recording.output_dir.clone(),
            interface: DEFAULT_INTERFACE.to_string(),
            timing: Timing::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerState {
    Idle,
    Recording,
}

/// Why [`SenseLogger::run`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Operator confirmed shutdown and the OS command was issued
    Shutdown,
    /// Running flag cleared (Ctrl-C)
    Interrupted,
}

/// Outcome of handling one event
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Shutdown,
}

pub struct SenseLogger {
    reader: SensorReader,
    writer: RecordWriter,
    display: DisplayController,
    input: InputDispatcher,
    network: NetworkInfo,
    power: Box<dyn PowerControl>,
    prefix: String,
    timing: Timing,
    sample_failures: u32,
    running: Arc<AtomicBool>,
}

impl SenseLogger {
    pub fn new(devices: DeviceSet, options: LoggerOptions, running: Arc<AtomicBool>) -> Self {
        let DeviceSet {
            sensors,
            matrix,
            joystick,
            interfaces,
            power,
        } = devices;

        let mut display = DisplayController::new(matrix, options.timing.scroll_frame);
        display.set_low_light(true);

        Self {
            reader: SensorReader::new(sensors),
            writer: RecordWriter::new(options.working_dir, options.output_dir),
            display,
            input: InputDispatcher::new(joystick),
            network: NetworkInfo::new(interfaces, options.interface),
            power,
            prefix: options.prefix,
            timing: options.timing,
            sample_failures: 0,
            running,
        }
    }

    pub fn state(&self) -> LoggerState {
        if self.writer.is_open() {
            LoggerState::Recording
        } else {
            LoggerState::Idle
        }
    }

    pub fn is_recording(&self) -> bool {
        self.writer.is_open()
    }

    /// Name of the file being written, if recording
    pub fn active_file(&self) -> Option<&str> {
        self.writer.file_name()
    }

    /// Rows written to the open session
    pub fn rows(&self) -> u64 {
        self.writer.rows()
    }

    pub fn display_state(&self) -> DisplayState {
        self.display.state()
    }

    pub fn low_light(&self) -> bool {
        self.display.low_light()
    }

    pub fn sample_failures(&self) -> u32 {
        self.sample_failures
    }

    /// Startup greeting: scroll "Ready!" on green, hold the Ready glyph,
    /// then clear.
    pub fn splash(&mut self) {
        self.display.show_message("Ready!", Some(Color::Green));
        self.display.show_grid(Glyph::Ready);
        self.pause(self.timing.splash);
        self.display.clear();
        info!("Waiting for joystick input");
    }

    /// Loop until shutdown is confirmed, the running flag is cleared or a
    /// fatal error occurs. Any open session is finalised and the display is
    /// cleared on every exit path.
    pub fn run(&mut self) -> Result<ExitReason> {
        let result = self.run_loop();
        self.teardown();
        result
    }

    fn run_loop(&mut self) -> Result<ExitReason> {
        loop {
            if !self.running.load(Ordering::Relaxed) {
                info!("Interrupted");
                return Ok(ExitReason::Interrupted);
            }
            if let Some(reason) = self.step()? {
                return Ok(reason);
            }
        }
    }

    /// One iteration: a poll window of events, then a sample if recording.
    pub fn step(&mut self) -> Result<Option<ExitReason>> {
        let mut pending: VecDeque<InputEvent> = self.input.poll(self.timing.poll_timeout)?.into();

        while let Some(event) = pending.pop_front() {
            if self.handle_event(event, &mut pending)? == Flow::Shutdown {
                if !pending.is_empty() {
                    debug!("Discarding {} event(s) after shutdown", pending.len());
                }
                return Ok(Some(ExitReason::Shutdown));
            }
        }

        if self.writer.is_open() {
            self.record_tick();
        }
        Ok(None)
    }

    fn handle_event(&mut self, event: InputEvent, pending: &mut VecDeque<InputEvent>) -> Result<Flow> {
        match (event.direction, event.action) {
            (Direction::Left, Action::Pressed) => self.start_recording(),
            (Direction::Right, Action::Pressed) => self.stop_recording(),
            (Direction::Middle, Action::Pressed) => self.show_ip(),
            (Direction::Up, Action::Pressed) => self.toggle_brightness(),
            (Direction::Down, Action::Held) => return self.confirm_shutdown(pending),
            _ => debug!("Unused input: {}", event),
        }
        Ok(Flow::Continue)
    }

    fn start_recording(&mut self) {
        if let Some(name) = self.writer.file_name() {
            info!("Already recording to {}", name);
            return;
        }

        match self.writer.open(&self.prefix) {
            Ok(name) => {
                info!("Recording started: {}", name);
                self.sample_failures = 0;
                self.display.show_grid(Glyph::Recording);
            }
            Err(e) => {
                error!("Could not start recording: {}", e);
                self.flash_error();
            }
        }
    }

    fn stop_recording(&mut self) {
        if !self.writer.is_open() {
            debug!("RIGHT pressed while idle");
            return;
        }
        self.finish_session();
    }

    /// Close and move the open file, then show Finished followed by Ready.
    fn finish_session(&mut self) {
        match self.writer.close() {
            Ok(summary) => {
                info!(
                    "Recording finished: {} rows in {:.1}s -> {}",
                    summary.rows,
                    summary.duration.as_secs_f64(),
                    summary.path.display()
                );
                self.display.show_grid(Glyph::Finished);
                self.pause(self.timing.hold);
                self.display.show_grid(Glyph::Ready);
            }
            Err(e) => {
                error!("Could not finalise recording: {}", e);
                self.flash_error();
            }
        }
    }

    fn show_ip(&mut self) {
        let text = match self.network.resolve_ipv4() {
            Ok(addr) => format!("IP: {}", addr),
            Err(e) => {
                warn!("{}: {}", self.network.interface(), e);
                NO_IP.to_string()
            }
        };
        info!("Showing address: {}", text);
        self.display.show_message(&text, None);
        self.restore_state_glyph();
    }

    fn toggle_brightness(&mut self) {
        let low = self.display.toggle_low_light();
        info!(
            "Display brightness: {}",
            if low { "low" } else { "high" }
        );
        self.display.show_grid(Glyph::Reference);
        self.pause(self.timing.hold);
        self.restore_state_glyph();
    }

    /// DOWN held: ask for confirmation, then either shut down or go back.
    fn confirm_shutdown(&mut self, pending: &mut VecDeque<InputEvent>) -> Result<Flow> {
        info!("Shutdown requested; UP confirms, DOWN aborts");
        self.display.show_grid(Glyph::ConfirmShutdown);
        self.pause(self.timing.hold);

        let decision = self.next_decision(pending)?;
        let confirmed = matches!(
            decision,
            Some(InputEvent {
                direction: Direction::Up,
                action: Action::Pressed | Action::Held,
            })
        );
        if !confirmed {
            match decision {
                Some(event) => info!("Shutdown aborted ({})", event),
                None => info!("Shutdown aborted (no answer)"),
            }
            self.restore_state_glyph();
            return Ok(Flow::Continue);
        }

        info!("Shutdown confirmed");
        if self.writer.is_open() {
            self.finish_session();
        }
        self.display.show_message("Shutting down", Some(Color::Red));

        match self.power.shutdown() {
            Ok(()) => Ok(Flow::Shutdown),
            Err(e) => {
                error!("{}", e);
                self.flash_error();
                Ok(Flow::Continue)
            }
        }
    }

    /// First event that can answer the confirmation prompt. Events still
    /// queued from this poll window come first. Releases and the repeated
    /// DOWN-held of the triggering press are skipped. `None` on timeout.
    fn next_decision(&mut self, pending: &mut VecDeque<InputEvent>) -> Result<Option<InputEvent>> {
        let deadline = Instant::now() + self.timing.poll_timeout;
        loop {
            let event = match pending.pop_front() {
                Some(event) => event,
                None => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Ok(None);
                    }
                    match self.input.wait_for_event(remaining)? {
                        Some(event) => event,
                        None => return Ok(None),
                    }
                }
            };
            match event {
                InputEvent {
                    action: Action::Released,
                    ..
                }
                | InputEvent {
                    direction: Direction::Down,
                    action: Action::Held,
                } => debug!("Skipping {} while confirming", event),
                _ => return Ok(Some(event)),
            }
        }
    }

    fn record_tick(&mut self) {
        match self.reader.sample() {
            Ok(record) => {
                self.sample_failures = 0;
                match self.writer.append(&record) {
                    Ok(()) => debug!("Sample {}: {}", self.writer.rows(), record),
                    Err(e) => {
                        error!("Write failed, ending session: {}", e);
                        self.abort_session();
                    }
                }
            }
            Err(e) => {
                self.sample_failures += 1;
                warn!(
                    "Sample failed ({}/{}): {}",
                    self.sample_failures, MAX_CONSECUTIVE_SAMPLE_FAILURES, e
                );
                if self.sample_failures >= MAX_CONSECUTIVE_SAMPLE_FAILURES {
                    error!("Sensors not responding, ending session");
                    self.abort_session();
                }
            }
        }
    }

    /// Close the session after a fault and show the Error glyph.
    fn abort_session(&mut self) {
        self.sample_failures = 0;
        match self.writer.close() {
            Ok(summary) => info!(
                "Session closed with {} rows -> {}",
                summary.rows,
                summary.path.display()
            ),
            Err(e) => error!("Could not finalise recording: {}", e),
        }
        self.flash_error();
    }

    fn flash_error(&mut self) {
        self.display.show_grid(Glyph::Error);
        self.pause(self.timing.hold);
        self.restore_state_glyph();
    }

    fn restore_state_glyph(&mut self) {
        let glyph = match self.state() {
            LoggerState::Recording => Glyph::Recording,
            LoggerState::Idle => Glyph::Ready,
        };
        self.display.show_grid(glyph);
    }

    fn teardown(&mut self) {
        if self.writer.is_open() {
            match self.writer.close() {
                Ok(summary) => info!("Recording saved on exit: {}", summary.path.display()),
                Err(e) => error!("Could not finalise recording on exit: {}", e),
            }
        }
        self.display.clear();
    }

    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

impl Drop for SenseLogger {
    fn drop(&mut self) {
        self.display.clear();
    }
}
