//! Mode sequencer
//!
//! Turns a target drive mode into the button presses that select it.

pub mod cluster;

use heapless::Vec;
use tripmode_protocol::press_frame;

use crate::state::{DriveMode, MODE_COUNT};

pub use cluster::{PressCluster, CLUSTER_SIZE};

/// Most presses any mode needs (HOLD: open menu + 3 steps)
pub const MAX_PRESSES: usize = MODE_COUNT;

/// Presses needed to select `target` from a closed menu
///
/// The first press opens the menu on NORMAL; each further press advances
/// one position.
pub const fn presses_to_reach(target: DriveMode) -> usize {
    1 + target.index()
}

/// Build the press clusters that select `target`, sent on `bus`
///
/// Returns exactly `presses_to_reach(target)` clusters.
pub fn build_clusters(target: DriveMode, bus: u8) -> Vec<PressCluster, MAX_PRESSES> {
    let press = PressCluster::new(press_frame(bus));

    let mut clusters = Vec::new();
    for _ in 0..presses_to_reach(target) {
        // Cannot fail: presses_to_reach never exceeds MAX_PRESSES
        let _ = clusters.push(press.clone());
    }
    clusters
}
