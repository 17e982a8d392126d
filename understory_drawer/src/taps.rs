// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-tap recognition for tap-to-present and tap-to-dismiss.
//!
//! The controller only needs "a tap registered `N` times inside (or outside) the
//! drawer". [`TapCounter`] derives that signal from raw press and release events:
//! a release close to its press completes a tap, and a tap that follows the
//! previous one quickly, in the same region and near the first tap of the run,
//! extends the run.
//!
//! ```
//! use kurbo::Point;
//! use understory_drawer::{DrawerInput, TapCounter, TapRegion};
//!
//! let mut taps = TapCounter::new();
//! let at = Point::new(120.0, 40.0);
//!
//! taps.on_down(TapRegion::Outside, at, 1000);
//! let first = taps.on_up(at, 1060).unwrap();
//! assert_eq!(first.count, 1);
//!
//! taps.on_down(TapRegion::Outside, at, 1200);
//! let second = taps.on_up(at, 1250).unwrap();
//! assert_eq!(second.count, 2);
//! assert_eq!(second.into_input(), DrawerInput::TapOutside { count: 2 });
//! ```

use kurbo::Point;

use crate::DrawerInput;

/// Longest pause, in milliseconds, between one tap's release and the next press of a run.
pub const DEFAULT_TAP_INTERVAL: u64 = 300;

/// Largest distance, in points, a press may drift from the first tap of its run.
pub const DEFAULT_TAP_SLOP: f64 = 10.0;

/// Where a tap landed relative to the drawer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TapRegion {
    /// On the drawer's content.
    Inside,
    /// On the host surface, outside the drawer.
    Outside,
}

/// A completed tap and the length of the run it belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tap {
    /// Region the run happened in.
    pub region: TapRegion,
    /// Number of taps in the run so far, starting at 1.
    pub count: u32,
}

impl Tap {
    /// The controller input for this tap.
    #[must_use]
    pub const fn into_input(self) -> DrawerInput {
        match self.region {
            TapRegion::Inside => DrawerInput::TapInside { count: self.count },
            TapRegion::Outside => DrawerInput::TapOutside { count: self.count },
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct Press {
    region: TapRegion,
    position: Point,
    distance_exceeded: bool,
}

#[derive(Copy, Clone, Debug)]
struct Run {
    region: TapRegion,
    anchor: Point,
    count: u32,
    last_up: u64,
}

/// Counts consecutive taps from press and release events.
///
/// Timestamps are in milliseconds and positions in host points.
#[derive(Clone, Debug)]
pub struct TapCounter {
    press: Option<Press>,
    run: Option<Run>,
    /// Longest pause between taps of one run, in milliseconds.
    pub interval: u64,
    /// Largest drift, in points, from the first tap of a run.
    pub slop: f64,
}

impl Default for TapCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TapCounter {
    /// Creates a counter with a 300 ms interval and a 10 point slop.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_thresholds(DEFAULT_TAP_INTERVAL, DEFAULT_TAP_SLOP)
    }

    /// Creates a counter with custom thresholds.
    #[must_use]
    pub const fn with_thresholds(interval: u64, slop: f64) -> Self {
        Self {
            press: None,
            run: None,
            interval,
            slop,
        }
    }

    /// Records a press in `region`.
    ///
    /// A press that comes too late, lands in another region, or lands too far
    /// from the run's first tap starts a new run.
    pub fn on_down(&mut self, region: TapRegion, position: Point, timestamp: u64) {
        if self.run.is_some_and(|run| {
            run.region != region
                || timestamp.saturating_sub(run.last_up) > self.interval
                || run.anchor.distance(position) > self.slop
        }) {
            self.run = None;
        }
        self.press = Some(Press {
            region,
            position,
            distance_exceeded: false,
        });
    }

    /// Tracks pointer movement during a press.
    ///
    /// Returns `true` when the press has just drifted past the slop and will no
    /// longer complete a tap.
    pub fn on_move(&mut self, position: Point) -> bool {
        let Some(press) = self.press.as_mut() else {
            return false;
        };
        if press.distance_exceeded || press.position.distance(position) <= self.slop {
            return false;
        }
        press.distance_exceeded = true;
        self.run = None;
        true
    }

    /// Records a release and returns the completed tap, if any.
    pub fn on_up(&mut self, position: Point, timestamp: u64) -> Option<Tap> {
        let press = self.press.take()?;
        if press.distance_exceeded || press.position.distance(position) > self.slop {
            self.run = None;
            return None;
        }
        let run = match self.run {
            Some(run) => Run {
                count: run.count.saturating_add(1),
                last_up: timestamp,
                ..run
            },
            None => Run {
                region: press.region,
                anchor: press.position,
                count: 1,
                last_up: timestamp,
            },
        };
        self.run = Some(run);
        Some(Tap {
            region: run.region,
            count: run.count,
        })
    }

    /// Abandons the current press and run.
    pub fn cancel(&mut self) {
        self.press = None;
        self.run = None;
    }

    /// Returns `true` while a press is active.
    #[must_use]
    pub const fn is_pressed(&self) -> bool {
        self.press.is_some()
    }
}
