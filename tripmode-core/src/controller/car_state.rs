//! Drive mode controller state
//!
//! `CarState` watches the speed signal and, when it crosses the threshold,
//! queues the button presses that select HOLD (above) or NORMAL (at or
//! below). Two cooldowns keep it from misbehaving:
//!
//! - mode switch cooldown: at most one switch per window (60 s default)
//! - press cooldown: at most one press cluster per window (0.5 s default)
//!
//! Only NORMAL and HOLD are switched automatically. SPORT and MOUNTAIN stay
//! in place until an explicit request moves away from them.

use heapless::Deque;
use tripmode_protocol::{decode, CanFrame, Signal};

use crate::config::ControllerConfig;
use crate::sequencer::{build_clusters, presses_to_reach, PressCluster, MAX_PRESSES};
use crate::state::{DriveMode, Event};
use crate::time::Instant;

/// Capacity of the outbound cluster queue (two full HOLD requests)
pub const MAX_PENDING_CLUSTERS: usize = 2 * MAX_PRESSES;

/// Result of feeding one received frame to the controller
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    /// Decoded signal, if the frame carried one
    pub signal: Option<Signal>,
    /// What the controller decided about the signal
    pub event: Option<Event>,
    /// Cluster to transmit now
    pub batch: Option<PressCluster>,
}

/// Controller state for one monitoring session
#[derive(Debug, Clone)]
pub struct CarState {
    /// Active configuration
    config: ControllerConfig,
    /// Last accepted speed, truncated to whole units
    speed: i32,
    /// Mode the vehicle is believed to be in
    mode: DriveMode,
    /// No new mode switch until after this time
    mode_switch_deadline: Instant,
    /// No new press cluster until after this time
    press_deadline: Instant,
    /// Clusters waiting to be sent, oldest first
    pending: Deque<PressCluster, MAX_PENDING_CLUSTERS>,
}

impl CarState {
    /// Start a session at `now`
    ///
    /// The first mode switch is allowed one cooldown after `now` (right away
    /// in debug mode), so the controller never acts on the readings taken
    /// while the vehicle is starting up.
    pub fn new(config: ControllerConfig, now: Instant) -> Self {
        let mode_switch_deadline = if config.debug {
            now
        } else {
            now + config.mode_switch_cooldown()
        };

        Self {
            config,
            speed: 0,
            mode: DriveMode::Normal,
            mode_switch_deadline,
            press_deadline: now,
            pending: Deque::new(),
        }
    }

    /// Last accepted speed
    pub fn speed(&self) -> i32 {
        self.speed
    }

    /// Mode the vehicle is believed to be in
    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    /// Earliest time a new mode switch may start (exclusive)
    pub fn mode_switch_deadline(&self) -> Instant {
        self.mode_switch_deadline
    }

    /// Earliest time the next cluster may be sent (exclusive)
    pub fn press_deadline(&self) -> Instant {
        self.press_deadline
    }

    /// Number of clusters waiting to be sent
    pub fn pending_clusters(&self) -> usize {
        self.pending.len()
    }

    /// Request a switch to `new_mode`
    ///
    /// Ignored while the mode switch cooldown is running. Otherwise the mode
    /// is updated, the cooldown restarts and the presses that select the mode
    /// from a closed menu are queued behind any still pending.
    ///
    /// `Event::QueueFull` is only possible when presses cannot drain within
    /// one mode switch cooldown (see `ControllerConfig::drains_within_cooldown`).
    pub fn attempt_switch(&mut self, new_mode: DriveMode, now: Instant) -> Event {
        if now <= self.mode_switch_deadline {
            return Event::SwitchSuppressed { mode: new_mode };
        }

        let presses = presses_to_reach(new_mode);
        if self.pending.capacity() - self.pending.len() < presses {
            return Event::QueueFull { mode: new_mode };
        }

        self.mode_switch_deadline = now + self.config.mode_switch_cooldown();
        self.mode = new_mode;

        for cluster in build_clusters(new_mode, self.config.bus) {
            // Cannot fail: room was checked above
            let _ = self.pending.push_back(cluster);
        }

        Event::SwitchScheduled {
            mode: new_mode,
            presses,
            speed: self.speed,
        }
    }

    /// Feed a speed sample
    ///
    /// Returns `None` when the sample was accepted without crossing the
    /// threshold.
    pub fn observe_speed(&mut self, raw_speed: f32, now: Instant) -> Option<Event> {
        if self.config.debug {
            return self.toggle(now);
        }

        let speed = raw_speed as i32;

        // The sensor briefly reports zero between valid frames
        if self.speed > self.config.speed_threshold && speed < 1 {
            return Some(Event::SampleDiscarded { speed: self.speed });
        }

        self.speed = speed;

        if speed > self.config.speed_threshold && self.mode == DriveMode::Normal {
            Some(self.attempt_switch(DriveMode::Hold, now))
        } else if speed <= self.config.speed_threshold && self.mode == DriveMode::Hold {
            Some(self.attempt_switch(DriveMode::Normal, now))
        } else {
            None
        }
    }

    /// Flip between NORMAL and HOLD regardless of speed
    fn toggle(&mut self, now: Instant) -> Option<Event> {
        if !self.mode.is_automatic() {
            return None;
        }

        let target = if self.mode == DriveMode::Normal {
            DriveMode::Hold
        } else {
            DriveMode::Normal
        };
        Some(self.attempt_switch(target, now))
    }

    /// Take the next cluster to send, if the press cooldown allows
    ///
    /// Call at least once per received frame so pacing stays accurate when
    /// no speed sample arrives.
    pub fn pump_sends(&mut self, now: Instant) -> Option<PressCluster> {
        if self.pending.is_empty() || now <= self.press_deadline {
            return None;
        }

        let cluster = self.pending.pop_front()?;
        self.press_deadline = now + self.config.press_cooldown();
        Some(cluster)
    }

    /// Process one received frame
    ///
    /// Speed frames go through `observe_speed`; every frame then pumps the
    /// send queue. A switch scheduled by this frame is only sent in the same
    /// call if the press cooldown has already expired.
    pub fn update(&mut self, frame: &CanFrame, now: Instant) -> Update {
        let signal = decode(frame);

        let event = match signal {
            Some(Signal::Speed(speed)) => self.observe_speed(speed, now),
            _ => None,
        };

        Update {
            signal,
            event,
            batch: self.pump_sends(now),
        }
    }
}
