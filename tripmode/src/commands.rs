//! Subcommand implementations

use std::io::{self, BufRead, Write};
use std::thread;

use clap::ValueEnum;
use thiserror::Error;
use tracing::{debug, info, trace, warn};
use tripmode_core::monitor::ButtonMonitor;
use tripmode_core::sequencer::{build_clusters, PressCluster};
use tripmode_core::traits::{Clock, FrameSink, FrameSource};
use tripmode_core::{CarState, ControllerConfig, DriveLoop, DriveMode, Event, LoopError, Tick};
use tripmode_protocol::{decode, press_frame, Signal};

use crate::clock::MonotonicClock;
use crate::config::ConfigError;
use crate::stream::{CandumpSink, CandumpSource, StreamError};

/// Where the controller's time comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ClockSource {
    /// Timestamps of the input log
    #[default]
    Capture,
    /// Wall time since start
    Monotonic,
}

/// Presses requested with the `press` subcommand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressRequest {
    /// Open the menu and step to this mode
    Mode(DriveMode),
    /// Press the button this many times
    Count(u32),
}

/// Fatal errors, mapped to the process exit code
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot open {path}: {source}")]
    Open { path: String, source: io::Error },

    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),

    #[error("frame source failed: {0}")]
    Source(#[source] StreamError),

    #[error("frame sink failed: {0}")]
    Sink(#[source] StreamError),
}

impl AppError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) => 2,
            _ => 1,
        }
    }
}

impl From<LoopError<StreamError, StreamError>> for AppError {
    fn from(e: LoopError<StreamError, StreamError>) -> Self {
        match e {
            LoopError::Source(e) => AppError::Source(e),
            LoopError::Sink(e) => AppError::Sink(e),
        }
    }
}

/// Totals for one `run` session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Frames received
    pub frames: usize,
    /// Mode switches scheduled
    pub switches: usize,
    /// Switch requests ignored during the cooldown
    pub suppressed: usize,
    /// Zero speed samples dropped
    pub discarded: usize,
    /// Switches dropped because the press queue was full
    pub dropped: usize,
    /// Button frames written
    pub frames_sent: usize,
    /// Malformed input lines skipped
    pub skipped_lines: usize,
    /// Mode at the end of the session
    pub final_mode: DriveMode,
    /// Clusters still queued when the input ended
    pub unsent_clusters: usize,
}

impl RunSummary {
    /// Report the totals at the end of a session
    fn log(&self) {
        if self.unsent_clusters > 0 {
            warn!(
                clusters = self.unsent_clusters,
                "Input ended with presses still queued"
            );
        }
        info!(
            frames = self.frames,
            switches = self.switches,
            suppressed = self.suppressed,
            discarded = self.discarded,
            dropped = self.dropped,
            frames_sent = self.frames_sent,
            skipped_lines = self.skipped_lines,
            mode = %self.final_mode,
            "Input closed"
        );
    }

    fn record(&mut self, tick: &Tick, state: &CarState) {
        self.frames += 1;
        self.frames_sent += tick.sent;

        match tick.event {
            Some(Event::SwitchScheduled {
                mode,
                presses,
                speed,
            }) => {
                self.switches += 1;
                info!(%mode, presses, speed, "Switching drive mode");
            }
            Some(Event::SwitchSuppressed { mode }) => {
                self.suppressed += 1;
                debug!(%mode, "Mode switch held back by cooldown");
            }
            Some(Event::SampleDiscarded { speed }) => {
                self.discarded += 1;
                debug!(speed, "Ignoring zero speed sample");
            }
            Some(Event::QueueFull { mode }) => {
                self.dropped += 1;
                warn!(%mode, "Press queue full, mode switch dropped");
            }
            None => {}
        }

        if tick.sent > 0 {
            debug!(
                frames = tick.sent,
                pending = state.pending_clusters(),
                "Sent button press"
            );
        }

        if let Some(Signal::Speed(speed)) = tick.signal {
            trace!(speed, mode = %state.mode(), "Speed sample");
        }
    }
}

/// Run the controller over a candump stream
///
/// Button presses are written to `output` as candump lines.
pub fn run<R: BufRead, W: Write>(
    input: R,
    output: W,
    config: ControllerConfig,
    clock: ClockSource,
) -> Result<RunSummary, AppError> {
    let source = CandumpSource::open(input).map_err(AppError::Source)?;

    match clock {
        ClockSource::Capture => {
            let clock = source.capture_clock();
            drive(source, CandumpSink::new(output, clock.clone()), clock, config)
        }
        ClockSource::Monotonic => {
            let clock = MonotonicClock::new();
            drive(source, CandumpSink::new(output, clock), clock, config)
        }
    }
}

fn drive<R: BufRead, W: Write, C: Clock>(
    source: CandumpSource<R>,
    sink: CandumpSink<W, C>,
    clock: C,
    config: ControllerConfig,
) -> Result<RunSummary, AppError> {
    info!(
        threshold = config.speed_threshold,
        bus = config.bus,
        debug = config.debug,
        "Starting drive loop"
    );

    let mut summary = RunSummary::default();
    let mut drive = DriveLoop::new(source, sink, clock, config);
    drive.run(|tick, state| summary.record(tick, state))?;

    summary.final_mode = drive.state().mode();
    summary.unsent_clusters = drive.state().pending_clusters();

    let (source, _, _) = drive.into_parts();
    summary.skipped_lines = source.skipped();

    summary.log();
    Ok(summary)
}

/// Send button presses straight to `output`
///
/// One cluster per press, spaced by the press cooldown. Returns the number of
/// presses sent.
pub fn press<W: Write>(
    output: W,
    config: ControllerConfig,
    request: PressRequest,
) -> Result<usize, AppError> {
    let clusters: Vec<PressCluster> = match request {
        PressRequest::Mode(mode) => build_clusters(mode, config.bus).into_iter().collect(),
        PressRequest::Count(count) => (0..count)
            .map(|_| PressCluster::new(press_frame(config.bus)))
            .collect(),
    };

    let mut sink = CandumpSink::new(output, MonotonicClock::new());
    for (i, cluster) in clusters.iter().enumerate() {
        if i > 0 {
            thread::sleep(config.press_cooldown());
        }
        sink.send_batch(cluster.frames()).map_err(AppError::Sink)?;
        info!(press = i + 1, total = clusters.len(), bus = config.bus, "Sent press");
    }

    Ok(clusters.len())
}

/// Print speed and button state per frame, then the press count
///
/// Returns the number of completed presses.
pub fn monitor<R: BufRead, W: Write>(input: R, mut output: W) -> Result<u32, AppError> {
    let mut source = CandumpSource::open(input).map_err(AppError::Source)?;
    let mut button = ButtonMonitor::new();
    let mut speed = 0.0_f32;

    while let Some(frame) = source.receive().map_err(AppError::Source)? {
        match decode(&frame) {
            Some(Signal::Speed(s)) => speed = s,
            Some(Signal::Button(pressed)) => {
                if button.observe(pressed) {
                    debug!(count = button.press_count(), "Button released");
                }
            }
            None => continue,
        }

        writeln!(
            output,
            "speed {:03} button {}",
            speed as i32,
            u8::from(button.is_pressed())
        )?;
    }

    writeln!(output, "press count: {}", button.press_count())?;
    output.flush()?;
    Ok(button.press_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write as _;
    use std::io::Cursor;

    fn speed_line(out: &mut String, ms: u64, speed: u16) {
        let _ = writeln!(
            out,
            "({}.{:06}) can0 3E9#{:04X}",
            ms / 1_000,
            (ms % 1_000) * 1_000,
            speed * 100
        );
    }

    /// Slow start, then highway speed once the startup cooldown is over
    fn highway_log() -> String {
        let mut log = String::from("# capture\n");
        for i in 0..=650 {
            let ms = 1_000_000 + i * 100;
            speed_line(&mut log, ms, if ms < 1_061_000 { 20 } else { 80 });
        }
        log
    }

    #[test]
    fn test_run_capture_switches_to_hold() {
        let mut out = Vec::new();
        let summary = run(
            Cursor::new(highway_log()),
            &mut out,
            ControllerConfig::default(),
            ClockSource::Capture,
        )
        .unwrap();

        assert_eq!(summary.frames, 651);
        assert_eq!(summary.switches, 1);
        assert_eq!(summary.final_mode, DriveMode::Hold);
        assert_eq!(summary.unsent_clusters, 0);
        assert_eq!(summary.frames_sent, 200);

        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.lines().count(), 200);
        assert!(out.lines().all(|l| l.ends_with("can0 1E1#00000000800000")));
        // First cluster goes out with the frame that crossed the threshold
        assert!(out.starts_with("(1061.000000) can0 1E1#"));
    }

    #[test]
    fn test_run_counts_dropouts_and_garbage() {
        let mut log = String::new();
        speed_line(&mut log, 0, 90);
        log.push_str("(0.050000) can0 garbage\n");
        log.push_str("(0.100000) can0 3E9#0000\n");

        let mut out = Vec::new();
        let summary = run(
            Cursor::new(log),
            &mut out,
            ControllerConfig::default(),
            ClockSource::Capture,
        )
        .unwrap();

        // Still inside the startup cooldown: no switch, but the dropout is seen
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.suppressed, 1);
        assert_eq!(summary.discarded, 1);
        assert_eq!(summary.skipped_lines, 1);
        assert!(out.is_empty());
    }

    #[test]
    fn test_run_debug_toggles_once_per_cooldown() {
        let mut log = String::new();
        for i in 0..5 {
            speed_line(&mut log, i * 100, 30);
        }

        let mut out = Vec::new();
        let summary = run(
            Cursor::new(log),
            &mut out,
            ControllerConfig::debug_preset(),
            ClockSource::Capture,
        )
        .unwrap();

        // The session starts at the first frame, so the second one switches;
        // the 30 s cooldown holds back the rest
        assert_eq!(summary.switches, 1);
        assert_eq!(summary.suppressed, 4);
        assert_eq!(summary.final_mode, DriveMode::Hold);
        assert_eq!(summary.frames_sent, 50);
        assert!(String::from_utf8(out).unwrap().starts_with("(0.100000) can0 1E1#"));
    }

    #[test]
    fn test_run_monotonic_clock() {
        let mut log = String::new();
        for i in 0..5 {
            speed_line(&mut log, i * 100, 90);
        }

        let summary = run(
            Cursor::new(log),
            io::sink(),
            ControllerConfig::default(),
            ClockSource::Monotonic,
        )
        .unwrap();

        // Wall time has not reached the startup cooldown
        assert_eq!(summary.frames, 5);
        assert_eq!(summary.switches, 0);
        assert_eq!(summary.final_mode, DriveMode::Normal);
    }

    #[test]
    fn test_monitor_counts_releases() {
        let log = "\
(0.0) can0 3E9#1770
(0.1) can0 1E1#0000000080000000
(0.2) can0 1E1#0000000080000000
(0.3) can0 1E1#0000000000000000
(0.4) can0 123#00
(0.5) can0 1E1#0000000080000000
(0.6) can0 1E1#0000000000000000
";
        let mut out = Vec::new();
        assert_eq!(monitor(Cursor::new(log), &mut out).unwrap(), 2);

        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "speed 060 button 0");
        assert_eq!(lines[1], "speed 060 button 1");
        assert_eq!(lines[3], "speed 060 button 0");
        assert_eq!(lines[6], "press count: 2");
    }

    fn quick_presses() -> ControllerConfig {
        ControllerConfig {
            press_cooldown_ms: 1,
            ..ControllerConfig::default()
        }
    }

    #[test]
    fn test_press_selects_mode() {
        let mut out = Vec::new();
        let request = PressRequest::Mode(DriveMode::Mountain);
        assert_eq!(press(&mut out, quick_presses(), request).unwrap(), 3);

        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.lines().count(), 3 * 50);
        assert!(out.lines().all(|l| l.ends_with(" can0 1E1#00000000800000")));
    }

    #[test]
    fn test_press_count_on_bus() {
        let config = ControllerConfig {
            bus: 1,
            ..quick_presses()
        };
        let mut out = Vec::new();
        assert_eq!(press(&mut out, config, PressRequest::Count(2)).unwrap(), 2);

        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.lines().count(), 100);
        assert!(out.lines().all(|l| l.ends_with(" can1 1E1#00000000800000")));
    }

    #[test]
    fn test_exit_codes() {
        let config = AppError::Config(ConfigError::ZeroPressCooldown);
        assert_eq!(config.exit_code(), 2);

        let io = AppError::Output(io::Error::other("closed"));
        assert_eq!(io.exit_code(), 1);
    }
}
