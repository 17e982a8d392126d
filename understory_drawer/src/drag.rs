// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag interpretation: deciding where a released drawer comes to rest.
//!
//! While a drag is in progress its samples only move the drawer. The decision
//! is made once, from the final sample, by [`resolve_drag`]:
//!
//! 1. **Flick**: a speed strictly above the flick threshold goes straight to
//!    [`FullyExpanded`](DrawerState::FullyExpanded) (toward expansion) or
//!    [`Collapsed`](DrawerState::Collapsed) (toward collapse), whatever the position.
//! 2. **Snap band**: a release inside the closed band around the partial
//!    position settles at [`PartiallyExpanded`](DrawerState::PartiallyExpanded).
//!    A dismissing drag from full expansion is only captured when staged
//!    dismissal is on.
//! 3. **Staged dismissal**: a dismissing drag from full expansion released
//!    above the band's lower edge stops at the partial position.
//! 4. **Nearest end**: otherwise the nearer of collapsed and fully expanded,
//!    ties going to collapsed.
//!
//! Positions are fractions of travel and velocities are travel-heights per
//! second, positive toward expansion.
//!
//! ```rust
//! use understory_drawer::{
//!     DragSample, DrawerConfig, DrawerLayout, DrawerState, PositionModel, resolve_drag,
//! };
//!
//! let config = DrawerConfig::default();
//! let model = PositionModel::new(&config, DrawerLayout::new(800.0, 320.0));
//!
//! // A slow release right at the partial position snaps there.
//! let end = DragSample::new(0.42, 0.1).unwrap();
//! let resolution = resolve_drag(&config, &model, DrawerState::Collapsed, end);
//! assert_eq!(resolution.target, DrawerState::PartiallyExpanded);
//!
//! // A fast upward flick ignores the position.
//! let end = DragSample::new(0.2, 5.0).unwrap();
//! let resolution = resolve_drag(&config, &model, DrawerState::Collapsed, end);
//! assert_eq!(resolution.target, DrawerState::FullyExpanded);
//! assert!(resolution.flicked);
//! ```

use alloc::collections::VecDeque;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::{DrawerConfig, DrawerError, DrawerState, PositionModel};

/// One validated drag reading.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DragSample {
    fraction: f64,
    velocity: f64,
}

impl DragSample {
    /// Validates a reading.
    ///
    /// `fraction` must be finite and inside `[0, 1]`; `velocity` must be finite.
    pub fn new(fraction: f64, velocity: f64) -> Result<Self, DrawerError> {
        let checked = if !fraction.is_finite() {
            Err(DrawerError::NonFinitePosition(fraction))
        } else if !(0.0..=1.0).contains(&fraction) {
            Err(DrawerError::PositionOutOfRange(fraction))
        } else if !velocity.is_finite() {
            Err(DrawerError::NonFiniteVelocity(velocity))
        } else {
            Ok(Self { fraction, velocity })
        };
        #[cfg(feature = "tracing")]
        if let Err(error) = &checked {
            tracing::warn!(%error, "rejected drag sample");
        }
        checked
    }

    /// Position as a fraction of travel.
    #[must_use]
    pub const fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Velocity in travel-heights per second, positive toward expansion.
    #[must_use]
    pub const fn velocity(&self) -> f64 {
        self.velocity
    }
}

/// Which way a gesture is heading.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GestureDirection {
    /// Toward full expansion.
    Expanding,
    /// Toward collapse.
    Collapsing,
    /// Neither moving nor displaced.
    Stationary,
}

impl GestureDirection {
    /// Direction from the velocity, or from the displacement when the velocity is zero.
    #[must_use]
    pub fn of(velocity: f64, displacement: f64) -> Self {
        let signal = if velocity != 0.0 { velocity } else { displacement };
        if signal > 0.0 {
            Self::Expanding
        } else if signal < 0.0 {
            Self::Collapsing
        } else {
            Self::Stationary
        }
    }
}

/// Outcome of a finished drag.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DragResolution {
    /// Resting position the drawer should move to.
    pub target: DrawerState,
    /// Direction the gesture was heading when released.
    pub direction: GestureDirection,
    /// The flick override decided the target.
    pub flicked: bool,
    /// Staged dismissal stopped the drawer at the partial position.
    pub staged: bool,
}

/// Decides the resting position for a drag that started at `origin` and ended with `end`.
///
/// Callers must not call this for a drawer that is not draggable.
#[must_use]
pub fn resolve_drag(
    config: &DrawerConfig,
    model: &PositionModel,
    origin: DrawerState,
    end: DragSample,
) -> DragResolution {
    let fraction = end.fraction();
    let velocity = end.velocity();
    let direction = GestureDirection::of(velocity, fraction - model.fraction_of(origin));
    let resolution = |target, flicked, staged| DragResolution {
        target,
        direction,
        flicked,
        staged,
    };

    if velocity.abs() > config.flick_speed_threshold() {
        let target = if velocity > 0.0 {
            DrawerState::FullyExpanded
        } else {
            DrawerState::Collapsed
        };
        return resolution(target, true, false);
    }

    let dismissing_from_full =
        origin == DrawerState::FullyExpanded && direction == GestureDirection::Collapsing;

    if let Some(band) = model.snap_band() {
        let band_applies = !dismissing_from_full || config.dismisses_in_stages();
        if band_applies && band.contains(fraction) {
            return resolution(DrawerState::PartiallyExpanded, false, dismissing_from_full);
        }
        if dismissing_from_full && config.dismisses_in_stages() && fraction >= band.lower {
            return resolution(DrawerState::PartiallyExpanded, false, true);
        }
    }

    resolution(model.nearest_end(fraction), false, false)
}

/// How far back readings are kept for velocity estimation, in milliseconds.
const HISTORY_LIMIT_MS: u64 = 150;

#[derive(Copy, Clone, Debug)]
struct Reading {
    fraction: f64,
    timestamp: u64,
}

/// Estimates drag velocity from timestamped positions.
///
/// For hosts whose input system reports positions but no velocity. Readings
/// older than 150 ms relative to the newest one are discarded.
#[derive(Clone, Debug, Default)]
pub struct VelocityTracker {
    history: VecDeque<Reading>,
}

impl VelocityTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a position (fraction of travel) at `timestamp` milliseconds.
    ///
    /// Readings older than the newest recorded one, and non-finite positions, are ignored.
    pub fn push(&mut self, fraction: f64, timestamp: u64) {
        if !fraction.is_finite() {
            return;
        }
        if self
            .history
            .back()
            .is_some_and(|last| timestamp < last.timestamp)
        {
            return;
        }
        self.history.push_back(Reading {
            fraction,
            timestamp,
        });
        self.trim_history();
    }

    /// Latest recorded position.
    #[must_use]
    pub fn position(&self) -> Option<f64> {
        self.history.back().map(|r| r.fraction)
    }

    /// Mean velocity over the retained history, in travel-heights per second.
    #[must_use]
    pub fn velocity(&self) -> f64 {
        let (Some(first), Some(last)) = (self.history.front(), self.history.back()) else {
            return 0.0;
        };
        let elapsed_ms = last.timestamp - first.timestamp;
        if elapsed_ms == 0 {
            return 0.0;
        }
        let elapsed = elapsed_ms as f64 / 1000.0;
        (last.fraction - first.fraction) / elapsed
    }

    /// Builds a sample from the latest position and the estimated velocity.
    ///
    /// Returns `None` if nothing has been recorded.
    pub fn sample(&self) -> Option<Result<DragSample, DrawerError>> {
        self.position()
            .map(|fraction| DragSample::new(fraction.clamp(0.0, 1.0), self.velocity()))
    }

    /// Forgets every reading.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    fn trim_history(&mut self) {
        let Some(&Reading { timestamp, .. }) = self.history.back() else {
            return;
        };
        while let Some(first) = self.history.front() {
            if timestamp <= first.timestamp.saturating_add(HISTORY_LIMIT_MS) {
                break;
            }
            self.history.pop_front();
        }
    }
}
