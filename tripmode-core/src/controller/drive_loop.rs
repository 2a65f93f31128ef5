//! Receive-decide-send loop
//!
//! One thread, one owner: block on the source, feed the frame to the
//! controller, hand any due cluster to the sink, repeat. Termination is
//! cooperative; the loop ends when the source reports it is closed.

use core::fmt;

use tripmode_protocol::{CanFrame, Signal};

use super::car_state::CarState;
use crate::config::ControllerConfig;
use crate::state::Event;
use crate::time::Instant;
use crate::traits::{Clock, FrameSink, FrameSource};

/// Fatal transport errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopError<S, K> {
    /// The frame source failed
    Source(S),
    /// The frame sink failed
    Sink(K),
}

impl<S: fmt::Display, K: fmt::Display> fmt::Display for LoopError<S, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopError::Source(e) => write!(f, "frame source failed: {}", e),
            LoopError::Sink(e) => write!(f, "frame sink failed: {}", e),
        }
    }
}

/// What happened during one loop iteration
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Time the frame was processed
    pub now: Instant,
    /// The received frame
    pub frame: CanFrame,
    /// Decoded signal, if any
    pub signal: Option<Signal>,
    /// Controller decision, if any
    pub event: Option<Event>,
    /// Number of frames handed to the sink
    pub sent: usize,
}

/// Drive loop owning the transport, the clock and the controller state
pub struct DriveLoop<S, K, C> {
    source: S,
    sink: K,
    clock: C,
    state: CarState,
}

impl<S, K, C> DriveLoop<S, K, C>
where
    S: FrameSource,
    K: FrameSink,
    C: Clock,
{
    /// Start a monitoring session
    pub fn new(source: S, sink: K, clock: C, config: ControllerConfig) -> Self {
        let state = CarState::new(config, clock.now());
        Self {
            source,
            sink,
            clock,
            state,
        }
    }

    /// Controller state
    pub fn state(&self) -> &CarState {
        &self.state
    }

    /// Receive and process one frame
    ///
    /// Returns `Ok(None)` once the source is closed.
    pub fn poll(&mut self) -> Result<Option<Tick>, LoopError<S::Error, K::Error>> {
        let Some(frame) = self.source.receive().map_err(LoopError::Source)? else {
            return Ok(None);
        };

        let now = self.clock.now();
        let update = self.state.update(&frame, now);

        let sent = match &update.batch {
            Some(cluster) => {
                self.sink
                    .send_batch(cluster.frames())
                    .map_err(LoopError::Sink)?;
                cluster.len()
            }
            None => 0,
        };

        Ok(Some(Tick {
            now,
            frame,
            signal: update.signal,
            event: update.event,
            sent,
        }))
    }

    /// Process frames until the source closes
    ///
    /// `on_tick` sees every iteration, for logging or display.
    pub fn run<F>(&mut self, mut on_tick: F) -> Result<(), LoopError<S::Error, K::Error>>
    where
        F: FnMut(&Tick, &CarState),
    {
        while let Some(tick) = self.poll()? {
            on_tick(&tick, &self.state);
        }
        Ok(())
    }

    /// Tear down the session and return the transport
    pub fn into_parts(self) -> (S, K, C) {
        (self.source, self.sink, self.clock)
    }
}
