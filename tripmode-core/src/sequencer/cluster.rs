//! Press clusters
//!
//! One logical button press is sent as a burst of identical frames so that
//! it survives frames dropped on the bus.

use heapless::Vec;
use tripmode_protocol::CanFrame;

/// Frames sent per logical button press
pub const CLUSTER_SIZE: usize = 50;

/// A burst of `CLUSTER_SIZE` identical press frames
///
/// Built from a single template frame, so every frame is byte-identical
/// and targets the same bus.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PressCluster {
    frames: Vec<CanFrame, CLUSTER_SIZE>,
}

impl PressCluster {
    /// Repeat `frame` `CLUSTER_SIZE` times
    pub fn new(frame: CanFrame) -> Self {
        let mut frames = Vec::new();
        for _ in 0..CLUSTER_SIZE {
            // Cannot fail: the loop stops at capacity
            let _ = frames.push(frame.clone());
        }
        Self { frames }
    }

    /// The frames to transmit, in order
    pub fn frames(&self) -> &[CanFrame] {
        &self.frames
    }

    /// Number of frames in the cluster
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false for a constructed cluster
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Bus the cluster is sent on
    pub fn bus(&self) -> Option<u8> {
        self.frames.first().map(CanFrame::bus)
    }
}
