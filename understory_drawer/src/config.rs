// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawer configuration: every tunable parameter in one value.
//!
//! [`DrawerConfig`] is built once, typically through [`Default`] plus a chain of
//! `with_*` builder calls, and then handed to a
//! [`DrawerController`](crate::DrawerController). Each field can also be changed
//! in place through a `set_*` setter before the value is handed off.
//!
//! Numeric inputs are never rejected. Out-of-range values are clamped to the
//! nearest valid value (or reset to the default where there is no nearest valid
//! value, as for a non-positive duration).
//!
//! Staged dismissal only makes sense when the partially expanded position
//! exists, so turning [`DrawerFeatures::PARTIAL_EXPANSION`] off also turns
//! [`DrawerFeatures::DISMISS_IN_STAGES`] off, and staged dismissal cannot be
//! turned on while partial expansion is off. This is enforced by every mutation,
//! so reads never need to re-derive it.
//!
//! ```rust
//! use understory_drawer::{DrawerConfig, TimingCurve, CubicTiming};
//!
//! let config = DrawerConfig::default()
//!     .with_total_duration(-1.0)
//!     .with_timing_curve(TimingCurve::CubicBezier(CubicTiming::EASE_IN_OUT))
//!     .with_supports_partial_expansion(false)
//!     .with_dismisses_in_stages(true);
//!
//! assert_eq!(config.total_duration(), 0.4);
//! assert!(!config.dismisses_in_stages());
//! ```

use kurbo::Point;

use crate::handle_view::HandleViewConfig;

/// Default total duration of a collapsed ↔ fully-expanded transition, in seconds.
pub const DEFAULT_TOTAL_DURATION: f64 = 0.4;

/// Default flick speed threshold, in travel-heights per second.
pub const DEFAULT_FLICK_SPEED_THRESHOLD: f64 = 3.0;

/// Default gap above and below the partially expanded position, in points.
pub const DEFAULT_MARK_GAP: f64 = 40.0;

/// Default maximum corner radius, in points.
pub const DEFAULT_MAXIMUM_CORNER_RADIUS: f64 = 15.0;

bitflags::bitflags! {
    /// Boolean feature switches of a drawer.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DrawerFeatures: u8 {
        /// Transitions take a time proportional to the distance they cover.
        const PROPORTIONAL_DURATION = 0b0000_0001;
        /// The drawer has a partially expanded resting position.
        const PARTIAL_EXPANSION     = 0b0000_0010;
        /// Dismissing from full expansion stops at the partially expanded position.
        const DISMISS_IN_STAGES     = 0b0000_0100;
        /// The drawer follows drag gestures.
        const DRAGGABLE             = 0b0000_1000;
        /// Tapping on the drawer presents it fully.
        const TAP_TO_PRESENT        = 0b0001_0000;
        /// Tapping outside the drawer dismisses it.
        const TAP_TO_DISMISS        = 0b0010_0000;
        /// A grab handle is drawn at the top of the drawer.
        const HANDLE_VIEW           = 0b0100_0000;
    }
}

impl Default for DrawerFeatures {
    fn default() -> Self {
        Self::PARTIAL_EXPANSION
            | Self::DISMISS_IN_STAGES
            | Self::DRAGGABLE
            | Self::TAP_TO_PRESENT
            | Self::TAP_TO_DISMISS
            | Self::HANDLE_VIEW
    }
}

impl DrawerFeatures {
    /// Drops switches that cannot hold given the other switches.
    #[must_use]
    pub fn normalized(self) -> Self {
        if self.contains(Self::PARTIAL_EXPANSION) {
            self
        } else {
            self - Self::DISMISS_IN_STAGES
        }
    }
}

/// A cubic Bézier timing curve running from `(0, 0)` to `(1, 1)`.
///
/// Control point x coordinates are kept within `[0, 1]` so the curve is a
/// function of time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicTiming {
    p1: Point,
    p2: Point,
}

impl CubicTiming {
    /// Constant speed.
    pub const LINEAR: Self = Self {
        p1: Point::new(0.0, 0.0),
        p2: Point::new(1.0, 1.0),
    };
    /// Slow start.
    pub const EASE_IN: Self = Self {
        p1: Point::new(0.42, 0.0),
        p2: Point::new(1.0, 1.0),
    };
    /// Slow finish.
    pub const EASE_OUT: Self = Self {
        p1: Point::new(0.0, 0.0),
        p2: Point::new(0.58, 1.0),
    };
    /// Slow start and finish.
    pub const EASE_IN_OUT: Self = Self {
        p1: Point::new(0.42, 0.0),
        p2: Point::new(0.58, 1.0),
    };

    /// Creates a curve from its two inner control points.
    #[must_use]
    pub fn new(p1: Point, p2: Point) -> Self {
        let clamp = |p: Point| Point::new(finite_or(p.x, 0.0).clamp(0.0, 1.0), finite_or(p.y, 0.0));
        Self {
            p1: clamp(p1),
            p2: clamp(p2),
        }
    }

    /// First inner control point.
    #[must_use]
    pub const fn p1(&self) -> Point {
        self.p1
    }

    /// Second inner control point.
    #[must_use]
    pub const fn p2(&self) -> Point {
        self.p2
    }
}

/// A damped spring timing curve, in normalized units (0 at the start, 1 at the end).
///
/// The default is critically damped: mass 1, stiffness 170, damping 26, no
/// initial velocity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringTiming {
    mass: f64,
    stiffness: f64,
    damping: f64,
    initial_velocity: f64,
}

impl SpringTiming {
    const MIN_MASS: f64 = 1e-3;
    const MIN_STIFFNESS: f64 = 0.1;

    /// Creates a spring. Mass and stiffness are kept positive, damping non-negative.
    #[must_use]
    pub fn new(mass: f64, stiffness: f64, damping: f64) -> Self {
        Self {
            mass: finite_or(mass, 1.0).max(Self::MIN_MASS),
            stiffness: finite_or(stiffness, 170.0).max(Self::MIN_STIFFNESS),
            damping: finite_or(damping, 26.0).max(0.0),
            initial_velocity: 0.0,
        }
    }

    /// Sets the initial velocity, in total-distances per second.
    #[must_use]
    pub fn with_initial_velocity(mut self, velocity: f64) -> Self {
        self.initial_velocity = finite_or(velocity, 0.0);
        self
    }

    /// Mass of the simulated body.
    #[must_use]
    pub const fn mass(&self) -> f64 {
        self.mass
    }

    /// Spring stiffness.
    #[must_use]
    pub const fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Velocity damping.
    #[must_use]
    pub const fn damping(&self) -> f64 {
        self.damping
    }

    /// Initial velocity, in total-distances per second.
    #[must_use]
    pub const fn initial_velocity(&self) -> f64 {
        self.initial_velocity
    }
}

impl Default for SpringTiming {
    fn default() -> Self {
        Self::new(1.0, 170.0, 26.0)
    }
}

/// The timing curve used for drawer transitions.
///
/// A cubic curve honors the computed duration exactly. A spring settles in its
/// own time, so the computed duration is only advisory for it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimingCurve {
    /// Duration-driven cubic Bézier easing.
    CubicBezier(CubicTiming),
    /// Physics-driven spring.
    Spring(SpringTiming),
}

impl TimingCurve {
    /// Returns `true` if a transition using this curve lasts exactly the requested duration.
    #[must_use]
    pub const fn is_duration_authoritative(&self) -> bool {
        matches!(self, Self::CubicBezier(_))
    }
}

impl Default for TimingCurve {
    fn default() -> Self {
        Self::Spring(SpringTiming::default())
    }
}

/// All the configurable parameters of a drawer.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawerConfig {
    total_duration: f64,
    timing_curve: TimingCurve,
    features: DrawerFeatures,
    taps_to_present: u32,
    taps_to_dismiss: u32,
    flick_speed_threshold: f64,
    upper_mark_gap: f64,
    lower_mark_gap: f64,
    maximum_corner_radius: f64,
    handle_view: HandleViewConfig,
}

impl Default for DrawerConfig {
    fn default() -> Self {
        Self {
            total_duration: DEFAULT_TOTAL_DURATION,
            timing_curve: TimingCurve::default(),
            features: DrawerFeatures::default(),
            taps_to_present: 1,
            taps_to_dismiss: 1,
            flick_speed_threshold: DEFAULT_FLICK_SPEED_THRESHOLD,
            upper_mark_gap: DEFAULT_MARK_GAP,
            lower_mark_gap: DEFAULT_MARK_GAP,
            maximum_corner_radius: DEFAULT_MAXIMUM_CORNER_RADIUS,
            handle_view: HandleViewConfig::default(),
        }
    }
}

impl DrawerConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- reads ---

    /// Duration of a full collapsed ↔ fully-expanded transition, in seconds. Always positive.
    #[must_use]
    pub const fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Timing curve used by every transition.
    #[must_use]
    pub const fn timing_curve(&self) -> TimingCurve {
        self.timing_curve
    }

    /// The full set of feature switches.
    #[must_use]
    pub const fn features(&self) -> DrawerFeatures {
        self.features
    }

    /// Whether partial transitions take proportionally less time than full ones.
    #[must_use]
    pub const fn duration_is_proportional_to_distance(&self) -> bool {
        self.features.contains(DrawerFeatures::PROPORTIONAL_DURATION)
    }

    /// Whether the partially expanded position exists.
    #[must_use]
    pub const fn supports_partial_expansion(&self) -> bool {
        self.features.contains(DrawerFeatures::PARTIAL_EXPANSION)
    }

    /// Whether dismissing from full expansion stops at the partially expanded position.
    ///
    /// Always `false` when [`supports_partial_expansion`](Self::supports_partial_expansion) is `false`.
    #[must_use]
    pub const fn dismisses_in_stages(&self) -> bool {
        self.features.contains(DrawerFeatures::DISMISS_IN_STAGES)
    }

    /// Whether the drawer follows drag gestures.
    #[must_use]
    pub const fn is_draggable(&self) -> bool {
        self.features.contains(DrawerFeatures::DRAGGABLE)
    }

    /// Whether tapping on the drawer presents it fully.
    #[must_use]
    pub const fn is_presentable_by_taps(&self) -> bool {
        self.features.contains(DrawerFeatures::TAP_TO_PRESENT)
    }

    /// Number of taps on the drawer that present it fully.
    #[must_use]
    pub const fn taps_to_present(&self) -> u32 {
        self.taps_to_present
    }

    /// Whether tapping outside the drawer dismisses it.
    #[must_use]
    pub const fn is_dismissable_by_outside_taps(&self) -> bool {
        self.features.contains(DrawerFeatures::TAP_TO_DISMISS)
    }

    /// Number of taps outside the drawer that dismiss it.
    #[must_use]
    pub const fn taps_to_dismiss(&self) -> u32 {
        self.taps_to_dismiss
    }

    /// Speed above which a drag skips the partially expanded position, in
    /// travel-heights per second.
    #[must_use]
    pub const fn flick_speed_threshold(&self) -> f64 {
        self.flick_speed_threshold
    }

    /// Gap above the partially expanded position inside which drags snap back to it, in points.
    #[must_use]
    pub const fn upper_mark_gap(&self) -> f64 {
        self.upper_mark_gap
    }

    /// Gap below the partially expanded position inside which drags snap back to it, in points.
    #[must_use]
    pub const fn lower_mark_gap(&self) -> f64 {
        self.lower_mark_gap
    }

    /// Corner radius of the drawer's top corners at full expansion, in points.
    #[must_use]
    pub const fn maximum_corner_radius(&self) -> f64 {
        self.maximum_corner_radius
    }

    /// Whether a grab handle is drawn.
    #[must_use]
    pub const fn has_handle_view(&self) -> bool {
        self.features.contains(DrawerFeatures::HANDLE_VIEW)
    }

    /// Grab handle configuration.
    #[must_use]
    pub const fn handle_view(&self) -> &HandleViewConfig {
        &self.handle_view
    }

    // --- mutation ---

    /// Sets the total duration. Non-positive or non-finite values reset it to
    /// [`DEFAULT_TOTAL_DURATION`].
    pub fn set_total_duration(&mut self, seconds: f64) {
        let sanitized = if seconds > 0.0 && seconds.is_finite() {
            seconds
        } else {
            DEFAULT_TOTAL_DURATION
        };
        note_clamp("total_duration", seconds, sanitized);
        self.total_duration = sanitized;
    }

    /// Sets the timing curve.
    pub fn set_timing_curve(&mut self, curve: TimingCurve) {
        self.timing_curve = curve;
    }

    /// Replaces all feature switches at once.
    pub fn set_features(&mut self, features: DrawerFeatures) {
        self.features = features.normalized();
    }

    /// Turns a single feature switch on or off.
    pub fn set_feature(&mut self, feature: DrawerFeatures, enabled: bool) {
        let mut features = self.features;
        features.set(feature, enabled);
        self.set_features(features);
    }

    /// Sets whether durations are proportional to the distance traveled.
    pub fn set_duration_is_proportional_to_distance(&mut self, enabled: bool) {
        self.set_feature(DrawerFeatures::PROPORTIONAL_DURATION, enabled);
    }

    /// Sets whether the partially expanded position exists.
    ///
    /// Turning it off also turns staged dismissal off.
    pub fn set_supports_partial_expansion(&mut self, enabled: bool) {
        self.set_feature(DrawerFeatures::PARTIAL_EXPANSION, enabled);
    }

    /// Sets whether dismissals from full expansion stop at the partial position.
    ///
    /// Has no effect while partial expansion is off.
    pub fn set_dismisses_in_stages(&mut self, enabled: bool) {
        self.set_feature(DrawerFeatures::DISMISS_IN_STAGES, enabled);
    }

    /// Sets whether the drawer follows drag gestures.
    pub fn set_draggable(&mut self, enabled: bool) {
        self.set_feature(DrawerFeatures::DRAGGABLE, enabled);
    }

    /// Enables or disables tap-to-present and sets the number of taps it needs.
    ///
    /// A tap count of zero never matches, which disables the action.
    pub fn set_tap_to_present(&mut self, enabled: bool, taps: u32) {
        self.set_feature(DrawerFeatures::TAP_TO_PRESENT, enabled);
        self.taps_to_present = taps;
    }

    /// Enables or disables tap-to-dismiss and sets the number of taps it needs.
    ///
    /// A tap count of zero never matches, which disables the action.
    pub fn set_tap_to_dismiss(&mut self, enabled: bool, taps: u32) {
        self.set_feature(DrawerFeatures::TAP_TO_DISMISS, enabled);
        self.taps_to_dismiss = taps;
    }

    /// Sets the flick speed threshold, clamped to be non-negative.
    pub fn set_flick_speed_threshold(&mut self, threshold: f64) {
        self.flick_speed_threshold =
            non_negative("flick_speed_threshold", threshold, DEFAULT_FLICK_SPEED_THRESHOLD);
    }

    /// Sets the gap above the partial position, clamped to be non-negative.
    pub fn set_upper_mark_gap(&mut self, gap: f64) {
        self.upper_mark_gap = non_negative("upper_mark_gap", gap, DEFAULT_MARK_GAP);
    }

    /// Sets the gap below the partial position, clamped to be non-negative.
    pub fn set_lower_mark_gap(&mut self, gap: f64) {
        self.lower_mark_gap = non_negative("lower_mark_gap", gap, DEFAULT_MARK_GAP);
    }

    /// Sets the maximum corner radius, clamped to be non-negative.
    pub fn set_maximum_corner_radius(&mut self, radius: f64) {
        self.maximum_corner_radius =
            non_negative("maximum_corner_radius", radius, DEFAULT_MAXIMUM_CORNER_RADIUS);
    }

    /// Sets whether a grab handle is drawn.
    pub fn set_has_handle_view(&mut self, enabled: bool) {
        self.set_feature(DrawerFeatures::HANDLE_VIEW, enabled);
    }

    /// Sets the grab handle configuration.
    pub fn set_handle_view(&mut self, handle_view: HandleViewConfig) {
        self.handle_view = handle_view;
    }

    // --- builder ---

    /// Builder form of [`set_total_duration`](Self::set_total_duration).
    #[must_use]
    pub fn with_total_duration(mut self, seconds: f64) -> Self {
        self.set_total_duration(seconds);
        self
    }

    /// Builder form of [`set_timing_curve`](Self::set_timing_curve).
    #[must_use]
    pub fn with_timing_curve(mut self, curve: TimingCurve) -> Self {
        self.set_timing_curve(curve);
        self
    }

    /// Builder form of [`set_features`](Self::set_features).
    #[must_use]
    pub fn with_features(mut self, features: DrawerFeatures) -> Self {
        self.set_features(features);
        self
    }

    /// Builder form of [`set_duration_is_proportional_to_distance`](Self::set_duration_is_proportional_to_distance).
    #[must_use]
    pub fn with_duration_proportional_to_distance(mut self, enabled: bool) -> Self {
        self.set_duration_is_proportional_to_distance(enabled);
        self
    }

    /// Builder form of [`set_supports_partial_expansion`](Self::set_supports_partial_expansion).
    #[must_use]
    pub fn with_supports_partial_expansion(mut self, enabled: bool) -> Self {
        self.set_supports_partial_expansion(enabled);
        self
    }

    /// Builder form of [`set_dismisses_in_stages`](Self::set_dismisses_in_stages).
    #[must_use]
    pub fn with_dismisses_in_stages(mut self, enabled: bool) -> Self {
        self.set_dismisses_in_stages(enabled);
        self
    }

    /// Builder form of [`set_draggable`](Self::set_draggable).
    #[must_use]
    pub fn with_draggable(mut self, enabled: bool) -> Self {
        self.set_draggable(enabled);
        self
    }

    /// Builder form of [`set_tap_to_present`](Self::set_tap_to_present).
    #[must_use]
    pub fn with_tap_to_present(mut self, enabled: bool, taps: u32) -> Self {
        self.set_tap_to_present(enabled, taps);
        self
    }

    /// Builder form of [`set_tap_to_dismiss`](Self::set_tap_to_dismiss).
    #[must_use]
    pub fn with_tap_to_dismiss(mut self, enabled: bool, taps: u32) -> Self {
        self.set_tap_to_dismiss(enabled, taps);
        self
    }

    /// Builder form of [`set_flick_speed_threshold`](Self::set_flick_speed_threshold).
    #[must_use]
    pub fn with_flick_speed_threshold(mut self, threshold: f64) -> Self {
        self.set_flick_speed_threshold(threshold);
        self
    }

    /// Sets both mark gaps (builder pattern).
    #[must_use]
    pub fn with_mark_gaps(mut self, upper: f64, lower: f64) -> Self {
        self.set_upper_mark_gap(upper);
        self.set_lower_mark_gap(lower);
        self
    }

    /// Builder form of [`set_maximum_corner_radius`](Self::set_maximum_corner_radius).
    #[must_use]
    pub fn with_maximum_corner_radius(mut self, radius: f64) -> Self {
        self.set_maximum_corner_radius(radius);
        self
    }

    /// Builder form of [`set_has_handle_view`](Self::set_has_handle_view).
    #[must_use]
    pub fn with_handle_view(mut self, enabled: bool, handle_view: HandleViewConfig) -> Self {
        self.set_has_handle_view(enabled);
        self.set_handle_view(handle_view);
        self
    }
}

pub(crate) fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

fn non_negative(field: &'static str, value: f64, fallback: f64) -> f64 {
    let sanitized = finite_or(value, fallback).max(0.0);
    note_clamp(field, value, sanitized);
    sanitized
}

#[cfg(feature = "tracing")]
fn note_clamp(field: &'static str, requested: f64, applied: f64) {
    // Bitwise comparison so a NaN request is still reported.
    if requested.to_bits() != applied.to_bits() {
        tracing::debug!(field, requested, applied, "clamped drawer configuration value");
    }
}

#[cfg(not(feature = "tracing"))]
fn note_clamp(_field: &'static str, _requested: f64, _applied: f64) {}
