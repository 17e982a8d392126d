// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transition planning: duration, timing curve, and per-frame drawer geometry.
//!
//! A [`TransitionPlan`] describes one animated move between two fractions of
//! travel. It does not run anything itself: the host's animation engine either
//! interpolates between [`TransitionPlan::start`] and [`TransitionPlan::end`]
//! with [`TransitionPlan::curve`], or pulls precomputed frames from
//! [`TransitionPlan::frames`].
//!
//! ## Duration
//!
//! By default every transition lasts the configured total duration, so shorter
//! moves are slower. With proportional durations, a move lasts the total
//! duration scaled by the fraction of travel it covers (never less than
//! [`MIN_TRANSITION_DURATION`]), so every move has the same speed.
//!
//! A [`TimingCurve::Spring`] settles in its own time. The planned duration is
//! still handed to the engine, but [`TransitionPlan::expected_duration`]
//! reports how long the spring actually takes.
//!
//! ## Corner radius
//!
//! The top corners round linearly with position: `0` when collapsed and the
//! configured maximum when fully expanded.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{CubicBez, ParamCurve, Point, Rect, RoundedRectRadii};

use crate::{CubicTiming, DrawerConfig, PositionModel, SpringTiming, TimingCurve};

/// Shortest duration a transition may have, in seconds.
pub const MIN_TRANSITION_DURATION: f64 = 0.01;

/// Frame interval used when a caller passes an unusable step.
const DEFAULT_FRAME_STEP: f64 = 1.0 / 60.0;

/// Largest spring integration step, in seconds. Larger steps are subdivided.
const MAX_SPRING_STEP: f64 = 0.001;

/// Springs still moving after this long are treated as settled.
const MAX_SPRING_DURATION: f64 = 10.0;

const SPRING_REST_POSITION: f64 = 1e-3;
const SPRING_REST_VELOCITY: f64 = 1e-2;

const BISECTION_STEPS: usize = 48;

/// Duration of a transition between two fractions of travel, in seconds.
#[must_use]
pub fn transition_duration(config: &DrawerConfig, from: f64, to: f64) -> f64 {
    let total = config.total_duration();
    if !config.duration_is_proportional_to_distance() {
        return total;
    }
    // The collapsed ↔ fully-expanded span is exactly 1 in fraction space.
    let covered = (to - from).abs().min(1.0);
    (total * covered).max(MIN_TRANSITION_DURATION)
}

/// Top corner radius for a drawer at `fraction` of travel.
#[must_use]
pub fn corner_radius_at(config: &DrawerConfig, fraction: f64) -> f64 {
    radius_for(config.maximum_corner_radius(), fraction)
}

fn radius_for(maximum: f64, fraction: f64) -> f64 {
    maximum * fraction.clamp(0.0, 1.0)
}

/// Drawer geometry at one instant.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frame {
    /// Position as a fraction of travel. Springs may overshoot `[0, 1]` briefly.
    pub fraction: f64,
    /// Distance from the host's top edge to the drawer's top edge, in points.
    pub offset: f64,
    /// Radius of the drawer's two top corners, in points.
    pub corner_radius: f64,
}

impl Frame {
    /// Geometry for a drawer resting at `fraction`.
    #[must_use]
    pub fn new(config: &DrawerConfig, model: &PositionModel, fraction: f64) -> Self {
        Self::from_parts(
            model.travel_distance(),
            config.maximum_corner_radius(),
            fraction,
        )
    }

    fn from_parts(travel: f64, maximum_radius: f64, fraction: f64) -> Self {
        Self {
            fraction,
            offset: travel * (1.0 - fraction),
            corner_radius: radius_for(maximum_radius, fraction),
        }
    }

    /// Radii for a rounded rectangle: top corners rounded, bottom corners square.
    #[must_use]
    pub fn top_radii(&self) -> RoundedRectRadii {
        RoundedRectRadii::new(self.corner_radius, self.corner_radius, 0.0, 0.0)
    }

    /// Drawer rectangle inside `host`. See [`PositionModel::frame`].
    #[must_use]
    pub fn rect(&self, model: &PositionModel, host: Rect) -> Rect {
        model.frame(host, self.fraction)
    }
}

/// Everything an animation engine needs to run one drawer transition.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TransitionPlan {
    /// Requested duration in seconds. Advisory for spring curves.
    pub duration: f64,
    /// Timing curve.
    pub curve: TimingCurve,
    /// Geometry at the start of the transition.
    pub start: Frame,
    /// Geometry at the end of the transition.
    pub end: Frame,
    travel: f64,
    maximum_radius: f64,
}

impl TransitionPlan {
    /// Plans a move from `from` to `to` (fractions of travel).
    #[must_use]
    pub fn new(config: &DrawerConfig, model: &PositionModel, from: f64, to: f64) -> Self {
        let travel = model.travel_distance();
        let maximum_radius = config.maximum_corner_radius();
        Self {
            duration: transition_duration(config, from, to),
            curve: config.timing_curve(),
            start: Frame::from_parts(travel, maximum_radius, from),
            end: Frame::from_parts(travel, maximum_radius, to),
            travel,
            maximum_radius,
        }
    }

    /// Returns `true` if the transition lasts exactly [`duration`](Self::duration).
    #[must_use]
    pub const fn is_duration_authoritative(&self) -> bool {
        self.curve.is_duration_authoritative()
    }

    /// How long the transition actually runs, in seconds.
    #[must_use]
    pub fn expected_duration(&self) -> f64 {
        match self.curve {
            TimingCurve::CubicBezier(_) => self.duration,
            TimingCurve::Spring(spring) => settling_duration(&spring),
        }
    }

    /// Eased progress (`0` at the start, `1` at the end) after `elapsed` seconds.
    ///
    /// Spring progress can overshoot `1` before settling.
    #[must_use]
    pub fn progress_at(&self, elapsed: f64) -> f64 {
        match self.curve {
            TimingCurve::CubicBezier(cubic) => cubic_progress(cubic, elapsed / self.duration),
            TimingCurve::Spring(spring) => {
                let mut state = SpringState::new(&spring);
                state.advance(&spring, elapsed.clamp(0.0, MAX_SPRING_DURATION));
                state.position
            }
        }
    }

    /// Geometry at a given eased progress.
    #[must_use]
    pub fn frame_at_progress(&self, progress: f64) -> Frame {
        let fraction = self.start.fraction + (self.end.fraction - self.start.fraction) * progress;
        Frame::from_parts(self.travel, self.maximum_radius, fraction)
    }

    /// Geometry after `elapsed` seconds.
    #[must_use]
    pub fn frame_at(&self, elapsed: f64) -> Frame {
        self.frame_at_progress(self.progress_at(elapsed))
    }

    /// Lazily yields `(time, frame)` pairs every `step` seconds, ending exactly at
    /// the end geometry.
    #[must_use]
    pub fn frames(&self, step: f64) -> Frames {
        let step = if step.is_finite() && step > 0.0 {
            step
        } else {
            DEFAULT_FRAME_STEP
        };
        let spring = match self.curve {
            TimingCurve::Spring(spring) => Some(SpringState::new(&spring)),
            TimingCurve::CubicBezier(_) => None,
        };
        Frames {
            plan: *self,
            step,
            elapsed: 0.0,
            spring,
            finished: false,
        }
    }
}

/// Iterator returned by [`TransitionPlan::frames`].
#[derive(Clone, Debug)]
pub struct Frames {
    plan: TransitionPlan,
    step: f64,
    elapsed: f64,
    spring: Option<SpringState>,
    finished: bool,
}

impl Iterator for Frames {
    type Item = (f64, Frame);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let progress = match (self.plan.curve, self.spring.as_mut()) {
            (TimingCurve::Spring(spring), Some(state)) => {
                if state.at_rest() || self.elapsed >= MAX_SPRING_DURATION {
                    None
                } else {
                    let progress = state.position;
                    state.advance(&spring, self.step);
                    Some(progress)
                }
            }
            (TimingCurve::CubicBezier(cubic), _) => {
                if self.elapsed >= self.plan.duration {
                    None
                } else {
                    Some(cubic_progress(cubic, self.elapsed / self.plan.duration))
                }
            }
            (TimingCurve::Spring(_), None) => None,
        };
        let time = self.elapsed;
        match progress {
            Some(progress) => {
                self.elapsed += self.step;
                Some((time, self.plan.frame_at_progress(progress)))
            }
            None => {
                self.finished = true;
                Some((time, self.plan.end))
            }
        }
    }
}

fn cubic_progress(timing: CubicTiming, t: f64) -> f64 {
    if t.is_nan() || t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let curve = CubicBez::new(Point::ZERO, timing.p1(), timing.p2(), Point::new(1.0, 1.0));
    // x(s) is monotone for control points with x in [0, 1]; solve x(s) = t.
    let (mut lo, mut hi) = (0.0, 1.0);
    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        if curve.eval(mid).x < t {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    curve.eval(0.5 * (lo + hi)).y
}

/// Normalized spring state: position runs from 0 toward 1.
#[derive(Copy, Clone, Debug)]
struct SpringState {
    position: f64,
    velocity: f64,
}

impl SpringState {
    fn new(spring: &SpringTiming) -> Self {
        Self {
            position: 0.0,
            velocity: spring.initial_velocity(),
        }
    }

    /// Semi-implicit Euler, subdivided into steps of at most [`MAX_SPRING_STEP`].
    fn advance(&mut self, spring: &SpringTiming, dt: f64) {
        let mut remaining = dt;
        while remaining > 0.0 {
            let h = remaining.min(MAX_SPRING_STEP);
            let force = -spring.stiffness() * (self.position - 1.0) - spring.damping() * self.velocity;
            self.velocity += force / spring.mass() * h;
            self.position += self.velocity * h;
            remaining -= h;
        }
    }

    fn at_rest(&self) -> bool {
        (1.0 - self.position).abs() < SPRING_REST_POSITION
            && self.velocity.abs() < SPRING_REST_VELOCITY
    }
}

/// Time a spring takes to come to rest, in seconds (capped).
fn settling_duration(spring: &SpringTiming) -> f64 {
    let mut state = SpringState::new(spring);
    let mut elapsed = 0.0;
    while !state.at_rest() && elapsed < MAX_SPRING_DURATION {
        state.advance(spring, MAX_SPRING_STEP * 4.0);
        elapsed += MAX_SPRING_STEP * 4.0;
    }
    elapsed
}
