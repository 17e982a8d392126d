// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resting positions of the drawer and the geometry derived from them.
//!
//! Positions are fractions of the total travel distance: `0.0` is collapsed
//! (the drawer's top edge sits at the host's bottom edge, fully off-screen) and
//! `1.0` is fully expanded. The partially expanded position sits strictly
//! between them and is derived from layout.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Rect;

use crate::DrawerConfig;

/// Smallest distance, as a fraction, kept between the partial position and either end.
const MIN_PARTIAL_MARGIN: f64 = 1e-3;

/// One of the drawer's resting positions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DrawerState {
    /// Off-screen.
    Collapsed,
    /// Showing the partially expanded height. Only exists when partial expansion is supported.
    PartiallyExpanded,
    /// Covering the whole host.
    FullyExpanded,
}

/// Layout input supplied by the host surface.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DrawerLayout {
    /// Distance, in points, between the collapsed and fully expanded positions.
    pub travel_distance: f64,
    /// Visible height, in points, of the drawer at its partially expanded position.
    pub partial_height: f64,
}

impl DrawerLayout {
    /// Creates a layout description.
    #[must_use]
    pub const fn new(travel_distance: f64, partial_height: f64) -> Self {
        Self {
            travel_distance,
            partial_height,
        }
    }

    /// Travel distance with degenerate values mapped to zero.
    #[must_use]
    pub fn sanitized_travel(&self) -> f64 {
        if self.travel_distance.is_finite() && self.travel_distance > 0.0 {
            self.travel_distance
        } else {
            0.0
        }
    }

    /// Fraction of the travel distance at which the partially expanded position sits.
    ///
    /// Clamped to lie strictly inside `(0, 1)`. Degenerate layouts resolve to the midpoint.
    #[must_use]
    pub fn partial_fraction(&self) -> f64 {
        let travel = self.sanitized_travel();
        if travel == 0.0 || !self.partial_height.is_finite() {
            return 0.5;
        }
        (self.partial_height / travel).clamp(MIN_PARTIAL_MARGIN, 1.0 - MIN_PARTIAL_MARGIN)
    }
}

/// Closed interval around the partial position where a finished drag snaps back to it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SnapBand {
    /// Lower edge, as a fraction of travel (inclusive).
    pub lower: f64,
    /// Upper edge, as a fraction of travel (inclusive).
    pub upper: f64,
}

impl SnapBand {
    /// Returns `true` if `fraction` lies inside the band, edges included.
    #[must_use]
    pub fn contains(&self, fraction: f64) -> bool {
        self.lower <= fraction && fraction <= self.upper
    }
}

/// Resting positions and snap band for one configuration and layout.
///
/// This is a pure value: rebuild it when the configuration or the layout changes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PositionModel {
    travel: f64,
    partial: Option<f64>,
    band: Option<SnapBand>,
}

impl PositionModel {
    /// Derives the position model from configuration and layout.
    #[must_use]
    pub fn new(config: &DrawerConfig, layout: DrawerLayout) -> Self {
        let travel = layout.sanitized_travel();
        if !config.supports_partial_expansion() {
            return Self {
                travel,
                partial: None,
                band: None,
            };
        }
        let partial = layout.partial_fraction();
        let (upper_gap, lower_gap) = if travel > 0.0 {
            (
                config.upper_mark_gap() / travel,
                config.lower_mark_gap() / travel,
            )
        } else {
            (0.0, 0.0)
        };
        Self {
            travel,
            partial: Some(partial),
            band: Some(SnapBand {
                lower: (partial - lower_gap).max(0.0),
                upper: (partial + upper_gap).min(1.0),
            }),
        }
    }

    /// Total travel distance in points.
    #[must_use]
    pub const fn travel_distance(&self) -> f64 {
        self.travel
    }

    /// Fraction of the partially expanded position, if partial expansion is supported.
    #[must_use]
    pub const fn partial_fraction(&self) -> Option<f64> {
        self.partial
    }

    /// Snap band around the partially expanded position, if partial expansion is supported.
    #[must_use]
    pub const fn snap_band(&self) -> Option<SnapBand> {
        self.band
    }

    /// Returns `true` if `state` exists under this model.
    #[must_use]
    pub const fn supports(&self, state: DrawerState) -> bool {
        !matches!(state, DrawerState::PartiallyExpanded) || self.partial.is_some()
    }

    /// Fraction of travel at which `state` rests.
    ///
    /// Without partial expansion, [`DrawerState::PartiallyExpanded`] collapses onto
    /// the fully expanded position.
    #[must_use]
    pub fn fraction_of(&self, state: DrawerState) -> f64 {
        match state {
            DrawerState::Collapsed => 0.0,
            DrawerState::PartiallyExpanded => self.partial.unwrap_or(1.0),
            DrawerState::FullyExpanded => 1.0,
        }
    }

    /// The nearer of the two end positions. Ties go to [`DrawerState::Collapsed`].
    #[must_use]
    pub fn nearest_end(&self, fraction: f64) -> DrawerState {
        if fraction <= 0.5 {
            DrawerState::Collapsed
        } else {
            DrawerState::FullyExpanded
        }
    }

    /// The resting state whose fraction is closest to `fraction`.
    ///
    /// Ties prefer the lower state.
    #[must_use]
    pub fn nearest_state(&self, fraction: f64) -> DrawerState {
        let mut best = DrawerState::Collapsed;
        let mut best_distance = fraction.abs();
        for state in [DrawerState::PartiallyExpanded, DrawerState::FullyExpanded] {
            if !self.supports(state) {
                continue;
            }
            let distance = (self.fraction_of(state) - fraction).abs();
            if distance < best_distance {
                best = state;
                best_distance = distance;
            }
        }
        best
    }

    /// Vertical distance, in points, from the top of the host to the drawer's top edge.
    ///
    /// Assumes the host is exactly one travel distance tall.
    #[must_use]
    pub fn offset_for(&self, fraction: f64) -> f64 {
        self.travel * (1.0 - fraction)
    }

    /// Inverse of [`offset_for`](Self::offset_for), clamped into `[0, 1]`.
    ///
    /// Hosts use this to turn a dragged top-edge offset into a valid sample position.
    #[must_use]
    pub fn fraction_for_offset(&self, offset: f64) -> f64 {
        if self.travel == 0.0 || !offset.is_finite() {
            return 0.0;
        }
        (1.0 - offset / self.travel).clamp(0.0, 1.0)
    }

    /// Converts a speed in points per second into travel-heights per second.
    ///
    /// `points_per_second` follows host coordinates (y grows downward), so the
    /// sign flips: the result is positive toward expansion.
    #[must_use]
    pub fn velocity_from_points(&self, points_per_second: f64) -> f64 {
        if self.travel == 0.0 {
            0.0
        } else {
            -points_per_second / self.travel
        }
    }

    /// Drawer frame inside `host` for a given fraction.
    ///
    /// The drawer is as tall as the travel distance and slides up from the host's bottom edge.
    #[must_use]
    pub fn frame(&self, host: Rect, fraction: f64) -> Rect {
        let top = host.y1 - self.travel * fraction;
        Rect::new(host.x0, top, host.x1, top + self.travel)
    }
}
