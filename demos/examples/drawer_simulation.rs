// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless drawer session: a fake host drives a drawer through a few scenarios.
//!
//! This example shows how to combine:
//! - `SharedDrawer` / `DrawerHandle` for ownership (the presenter owns the drawer,
//!   input plumbing only holds a handle),
//! - `VelocityTracker` and `TapCounter` for turning raw pointer readings into
//!   drag samples and tap counts,
//! - a fake animation engine that plays each `TransitionPlan` frame by frame
//!   and reports progress and completion back.
//!
//! Set `RUST_LOG=understory_drawer=debug` to see the controller's own events.
//!
//! Run:
//! - `cargo run -p understory_drawer_demos --example drawer_simulation`

use kurbo::{Point, Rect};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use understory_drawer::{
    CubicTiming, DrawerConfig, DrawerController, DrawerHandle, DrawerInput, DrawerLayout,
    DrawerNotice, Effects, SharedDrawer, TapCounter, TapRegion, TimingCurve, Transition,
    VelocityTracker,
};

const HOST: Rect = Rect::new(0.0, 0.0, 390.0, 844.0);
const FRAME_STEP: f64 = 1.0 / 60.0;

/// The presented content. Handed back when the drawer is dismissed.
#[derive(Debug)]
struct Content {
    title: &'static str,
}

/// Stands in for the host's animation engine and view layer.
struct FakeHost {
    drawer: DrawerHandle<Content>,
    running: Option<Transition>,
    clock_ms: u64,
}

impl FakeHost {
    fn new(drawer: DrawerHandle<Content>) -> Self {
        Self {
            drawer,
            running: None,
            clock_ms: 0,
        }
    }

    fn send(&mut self, input: DrawerInput) {
        let Some(effects) = self.drawer.dispatch(input) else {
            warn!(?input, "drawer is gone");
            return;
        };
        self.apply(effects);
    }

    fn apply(&mut self, effects: Effects<Content>) {
        for notice in &effects.notices {
            match notice {
                DrawerNotice::Started(transition) => {
                    info!(
                        id = transition.id.get(),
                        from = ?transition.source,
                        to = ?transition.target,
                        direction = ?transition.direction,
                        staged = transition.staged,
                        duration = transition.plan.duration,
                        expected = transition.plan.expected_duration(),
                        "transition started"
                    );
                    self.running = Some(*transition);
                }
                DrawerNotice::Preempted { id, target } => {
                    info!(id = id.get(), ?target, "transition preempted");
                }
                DrawerNotice::Completed { id, state, path } => {
                    info!(id = id.get(), ?state, ?path, "transition completed");
                    self.running = None;
                }
            }
        }
        if let Some(frame) = effects.frame {
            let top = self
                .drawer
                .with(|d| frame.rect(d.model(), HOST).y0)
                .unwrap_or(f64::NAN);
            info!(
                fraction = format_args!("{:.3}", frame.fraction),
                top = format_args!("{top:.1}"),
                corner_radius = format_args!("{:.2}", frame.corner_radius),
                "frame"
            );
        }
        if let Some(content) = effects.released {
            info!(title = content.title, "content released");
        }
    }

    /// Plays the running transition for at most `max_frames` frames.
    ///
    /// Returns `true` if the transition finished.
    fn animate(&mut self, max_frames: usize) -> bool {
        let Some(transition) = self.running else {
            return false;
        };
        let mut frames = transition.plan.frames(FRAME_STEP);
        for (_, frame) in frames.by_ref().take(max_frames) {
            self.clock_ms += 16;
            self.send(DrawerInput::AnimationProgressed {
                id: transition.id,
                fraction: frame.fraction,
            });
        }
        if frames.next().is_some() {
            return false;
        }
        self.send(DrawerInput::AnimationFinished { id: transition.id });
        if self.running.is_some_and(|running| running.id == transition.id) {
            self.running = None;
        }
        true
    }

    fn animate_to_rest(&mut self) {
        while self.running.is_some() {
            self.animate(usize::MAX);
        }
    }

    /// Drags the drawer through `path` (fractions of travel), 16 ms apart.
    fn drag(&mut self, path: &[f64]) {
        let mut tracker = VelocityTracker::new();
        self.send(DrawerInput::DragBegan);
        for &fraction in path {
            self.clock_ms += 16;
            tracker.push(fraction, self.clock_ms);
            match tracker.sample() {
                Some(Ok(sample)) => self.send(DrawerInput::DragMoved(sample)),
                Some(Err(error)) => warn!(%error, "drag sample rejected"),
                None => {}
            }
        }
        match tracker.sample() {
            Some(Ok(sample)) => {
                info!(
                    fraction = sample.fraction(),
                    velocity = format_args!("{:.2}", sample.velocity()),
                    "drag released"
                );
                self.send(DrawerInput::DragEnded(sample));
            }
            Some(Err(error)) => warn!(%error, "drag release rejected"),
            None => {}
        }
    }

    /// Taps `times` times in `region` at `at`.
    fn tap(&mut self, taps: &mut TapCounter, region: TapRegion, at: Point, times: u32) {
        for _ in 0..times {
            self.clock_ms += 120;
            taps.on_down(region, at, self.clock_ms);
            self.clock_ms += 60;
            if let Some(tap) = taps.on_up(at, self.clock_ms) {
                info!(?region, count = tap.count, "tap");
                self.send(tap.into_input());
            }
        }
    }
}

fn scenario(name: &'static str, config: DrawerConfig, run: impl FnOnce(&mut FakeHost)) {
    info!("--- {name} ---");
    let layout = DrawerLayout::new(HOST.height(), 300.0);
    let owner = SharedDrawer::new(DrawerController::new(config, layout, Content { title: name }));
    let mut host = FakeHost::new(owner.handle());
    run(&mut host);
    let grab = owner.with(|d| {
        d.config()
            .has_handle_view()
            .then(|| d.config().handle_view().rounded_rect(d.frame().rect(d.model(), HOST)))
    });
    if let Some(grab) = grab {
        let alpha = owner.with(|d| d.handle_alpha()).unwrap_or(1.0);
        info!(alpha, handle = ?grab.rect(), "grab handle");
    }
    info!(state = ?owner.with(|d| d.state()), "scenario finished");
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drawer_simulation=info,understory_drawer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // The same knobs the presenter's switches used to toggle.
    let base = DrawerConfig::default()
        .with_total_duration(0.8)
        .with_timing_curve(TimingCurve::CubicBezier(CubicTiming::EASE_IN_OUT));

    scenario("present, expand by tap, dismiss in stages", base.clone(), |host| {
        let mut taps = TapCounter::new();
        host.send(DrawerInput::Present);
        host.animate_to_rest();
        host.tap(&mut taps, TapRegion::Inside, Point::new(195.0, 700.0), 1);
        host.animate_to_rest();
        host.tap(&mut taps, TapRegion::Outside, Point::new(195.0, 20.0), 1);
        host.animate_to_rest();
        host.tap(&mut taps, TapRegion::Outside, Point::new(195.0, 20.0), 1);
        host.animate_to_rest();
    });

    scenario("slow drag to the partial stop, then an upward flick", base.clone(), |host| {
        host.drag(&[0.3, 0.32, 0.34, 0.35, 0.36, 0.37]);
        host.animate_to_rest();
        host.drag(&[0.4, 0.48, 0.6, 0.75]);
        host.animate_to_rest();
    });

    scenario(
        "no partial expansion, two taps to dismiss",
        base.clone()
            .with_supports_partial_expansion(false)
            .with_tap_to_dismiss(true, 2),
        |host| {
            let mut taps = TapCounter::new();
            host.send(DrawerInput::Present);
            host.animate_to_rest();
            host.drag(&[0.9, 0.88, 0.86, 0.84, 0.82]);
            host.animate_to_rest();
            host.tap(&mut taps, TapRegion::Outside, Point::new(40.0, 40.0), 2);
            host.animate_to_rest();
        },
    );

    scenario("retarget mid-flight", base.with_total_duration(0.4), |host| {
        host.send(DrawerInput::Expand);
        host.animate(8);
        host.send(DrawerInput::Dismiss);
        host.animate_to_rest();
    });

    scenario(
        "spring with proportional duration",
        DrawerConfig::default().with_duration_proportional_to_distance(true),
        |host| {
            host.send(DrawerInput::Present);
            host.animate_to_rest();
            host.send(DrawerInput::Expand);
            host.animate_to_rest();
        },
    );
}
