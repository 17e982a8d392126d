// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawer state machine.
//!
//! [`DrawerController`] is sans-IO: the host feeds it [`DrawerInput`] events in
//! arrival order and applies the returned [`Effects`]. It never owns a timer.
//! When a transition starts, the host hands [`Transition::plan`] to its animation
//! engine and reports back with [`DrawerInput::AnimationProgressed`] and, exactly
//! once, [`DrawerInput::AnimationFinished`] or [`DrawerInput::AnimationCancelled`].
//!
//! A transition-altering input that arrives while a transition is in flight
//! preempts it: the running transition reports [`DrawerNotice::Preempted`] and a
//! fresh transition starts from the drawer's live position. Nothing is queued, and
//! engine callbacks carrying a superseded [`TransitionId`] are ignored. Every
//! transition therefore ends with exactly one of `Preempted` or `Completed`.
//!
//! ```rust
//! use understory_drawer::{
//!     CompletionPath, DrawerConfig, DrawerController, DrawerInput, DrawerLayout, DrawerState,
//! };
//!
//! let mut drawer = DrawerController::new(
//!     DrawerConfig::default(),
//!     DrawerLayout::new(800.0, 320.0),
//!     "content",
//! );
//!
//! let effects = drawer.handle(DrawerInput::Present);
//! let transition = *effects.started().unwrap();
//! assert_eq!(transition.target, DrawerState::PartiallyExpanded);
//!
//! let effects = drawer.handle(DrawerInput::AnimationFinished { id: transition.id });
//! assert_eq!(
//!     effects.completed(),
//!     Some((DrawerState::PartiallyExpanded, CompletionPath::PartiallyExpanded))
//! );
//! assert_eq!(drawer.state(), DrawerState::PartiallyExpanded);
//! ```

use smallvec::SmallVec;

use crate::{
    DragSample, DrawerConfig, DrawerError, DrawerLayout, DrawerState, Frame, PositionModel,
    TransitionPlan, resolve_drag,
};

/// Identifies one transition for the lifetime of its controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransitionId(u64);

impl TransitionId {
    /// Raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Whether a transition shows more of the drawer or less.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Toward full expansion.
    Presenting,
    /// Toward collapse.
    Dismissing,
}

impl Direction {
    fn between(from: f64, to: f64, target: DrawerState) -> Self {
        if to > from {
            Self::Presenting
        } else if to < from || target == DrawerState::Collapsed {
            Self::Dismissing
        } else {
            Self::Presenting
        }
    }
}

/// One animated move between resting positions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transition {
    /// Identifier echoed back by the animation engine.
    pub id: TransitionId,
    /// Resting position the drawer last occupied.
    pub source: DrawerState,
    /// Resting position the drawer is moving to.
    pub target: DrawerState,
    /// Presenting or dismissing.
    pub direction: Direction,
    /// A dismissal stopped at the partial position instead of collapsing.
    pub staged: bool,
    /// What the animation engine should play.
    pub plan: TransitionPlan,
}

/// Which completion callback a finished transition maps to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompletionPath {
    /// Came to rest fully expanded.
    Presented,
    /// Came to rest at the partial position.
    PartiallyExpanded,
    /// Came to rest collapsed.
    Dismissed,
    /// Came back to rest collapsed without ever resting on screen.
    ///
    /// The content stays with the controller.
    Withdrawn,
}

impl CompletionPath {
    /// Completion path for a transition that came to rest at `state`.
    #[must_use]
    pub const fn for_state(state: DrawerState) -> Self {
        match state {
            DrawerState::Collapsed => Self::Dismissed,
            DrawerState::PartiallyExpanded => Self::PartiallyExpanded,
            DrawerState::FullyExpanded => Self::Presented,
        }
    }
}

/// Something the host should know about.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DrawerNotice {
    /// A transition started. Hand its plan to the animation engine.
    Started(Transition),
    /// A transition was superseded or cancelled before it completed.
    Preempted {
        /// The superseded transition.
        id: TransitionId,
        /// Where it was heading.
        target: DrawerState,
    },
    /// A transition came to rest.
    Completed {
        /// The finished transition.
        id: TransitionId,
        /// New resting position.
        state: DrawerState,
        /// Completion callback to run.
        path: CompletionPath,
    },
}

/// Events delivered to the controller, in arrival order.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DrawerInput {
    /// Show the drawer at its first stop: partially expanded when supported, else fully expanded.
    ///
    /// Ignored unless the drawer is collapsed or on its way there.
    Present,
    /// Move to full expansion.
    Expand,
    /// Move straight to collapsed.
    Dismiss,
    /// Taps on the drawer. Presents fully when the count equals the configured count.
    TapInside {
        /// Taps in the run.
        count: u32,
    },
    /// Taps outside the drawer. Dismisses when the count equals the configured count.
    TapOutside {
        /// Taps in the run.
        count: u32,
    },
    /// A drag gesture started.
    DragBegan,
    /// The drawer was dragged.
    DragMoved(DragSample),
    /// The drag was released.
    DragEnded(DragSample),
    /// The animation engine moved the drawer.
    AnimationProgressed {
        /// Running transition.
        id: TransitionId,
        /// Current position as a fraction of travel.
        fraction: f64,
    },
    /// The animation engine finished a transition.
    AnimationFinished {
        /// Finished transition.
        id: TransitionId,
    },
    /// The animation engine abandoned a transition.
    AnimationCancelled {
        /// Abandoned transition.
        id: TransitionId,
    },
}

/// What the host must apply after handling one input.
#[derive(Debug)]
pub struct Effects<C> {
    /// Notices, in the order they happened.
    pub notices: SmallVec<[DrawerNotice; 2]>,
    /// New drawer geometry, if it changed.
    pub frame: Option<Frame>,
    /// Content released by a completed dismissal.
    pub released: Option<C>,
}

impl<C> Default for Effects<C> {
    fn default() -> Self {
        Self {
            notices: SmallVec::new(),
            frame: None,
            released: None,
        }
    }
}

impl<C> Effects<C> {
    /// Returns `true` if the input changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notices.is_empty() && self.frame.is_none() && self.released.is_none()
    }

    /// The transition started by this input, if any.
    #[must_use]
    pub fn started(&self) -> Option<&Transition> {
        self.notices.iter().find_map(|notice| match notice {
            DrawerNotice::Started(transition) => Some(transition),
            _ => None,
        })
    }

    /// Resting position and completion path, if a transition completed.
    #[must_use]
    pub fn completed(&self) -> Option<(DrawerState, CompletionPath)> {
        self.notices.iter().find_map(|notice| match *notice {
            DrawerNotice::Completed { state, path, .. } => Some((state, path)),
            _ => None,
        })
    }

    /// The transition preempted by this input, if any.
    #[must_use]
    pub fn preempted(&self) -> Option<TransitionId> {
        self.notices.iter().find_map(|notice| match *notice {
            DrawerNotice::Preempted { id, .. } => Some(id),
            _ => None,
        })
    }
}

/// Coarse controller state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DrawerPhase {
    /// At rest.
    Resting(DrawerState),
    /// Following a drag that started at `origin`.
    Dragging {
        /// Resting position the drag started from.
        origin: DrawerState,
    },
    /// Animating.
    InFlight {
        /// Running transition.
        id: TransitionId,
        /// Resting position it left.
        source: DrawerState,
        /// Resting position it is heading to.
        target: DrawerState,
    },
}

#[derive(Copy, Clone, Debug)]
enum Phase {
    Resting(DrawerState),
    Dragging { origin: DrawerState },
    InFlight(Transition),
}

/// Owns the drawer's position, its presented content, and the transition in flight.
///
/// `C` is the presented content. The controller holds it from construction until
/// a dismissal completes, at which point it is handed back through
/// [`Effects::released`].
#[derive(Debug)]
pub struct DrawerController<C> {
    config: DrawerConfig,
    layout: DrawerLayout,
    model: PositionModel,
    phase: Phase,
    fraction: f64,
    next_id: u64,
    content: Option<C>,
}

impl<C> DrawerController<C> {
    /// Creates a collapsed drawer holding `content`.
    #[must_use]
    pub fn new(config: DrawerConfig, layout: DrawerLayout, content: C) -> Self {
        let model = PositionModel::new(&config, layout);
        Self {
            config,
            layout,
            model,
            phase: Phase::Resting(DrawerState::Collapsed),
            fraction: 0.0,
            next_id: 1,
            content: Some(content),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &DrawerConfig {
        &self.config
    }

    /// Returns the layout input.
    #[must_use]
    pub fn layout(&self) -> DrawerLayout {
        self.layout
    }

    /// Returns the position model derived from the configuration and layout.
    #[must_use]
    pub fn model(&self) -> &PositionModel {
        &self.model
    }

    /// Coarse state.
    #[must_use]
    pub fn phase(&self) -> DrawerPhase {
        match self.phase {
            Phase::Resting(state) => DrawerPhase::Resting(state),
            Phase::Dragging { origin } => DrawerPhase::Dragging { origin },
            Phase::InFlight(transition) => DrawerPhase::InFlight {
                id: transition.id,
                source: transition.source,
                target: transition.target,
            },
        }
    }

    /// The resting position the drawer last occupied.
    #[must_use]
    pub fn state(&self) -> DrawerState {
        match self.phase {
            Phase::Resting(state) => state,
            Phase::Dragging { origin } => origin,
            Phase::InFlight(transition) => transition.source,
        }
    }

    /// The transition in flight, if any.
    #[must_use]
    pub fn transition(&self) -> Option<&Transition> {
        match &self.phase {
            Phase::InFlight(transition) => Some(transition),
            _ => None,
        }
    }

    /// Live position as a fraction of travel.
    #[must_use]
    pub fn live_fraction(&self) -> f64 {
        self.fraction
    }

    /// Live drawer geometry.
    #[must_use]
    pub fn frame(&self) -> Frame {
        Frame::new(&self.config, &self.model, self.fraction)
    }

    /// Opacity of the grab handle, or `None` when no handle is shown.
    #[must_use]
    pub fn handle_alpha(&self) -> Option<f64> {
        self.config
            .has_handle_view()
            .then(|| self.config.handle_view().alpha(&self.model, self.fraction))
    }

    /// The presented content, unless it has been released.
    #[must_use]
    pub fn content(&self) -> Option<&C> {
        self.content.as_ref()
    }

    /// Mutable access to the presented content.
    pub fn content_mut(&mut self) -> Option<&mut C> {
        self.content.as_mut()
    }

    /// Installs new content, returning the previous one.
    pub fn replace_content(&mut self, content: C) -> Option<C> {
        self.content.replace(content)
    }

    /// Applies new layout input. Returns the live geometry.
    ///
    /// A drawer at rest is moved onto its resting position under the new layout.
    /// A transition in flight keeps its plan and a drag in progress carries on.
    pub fn set_layout(&mut self, layout: DrawerLayout) -> Frame {
        self.layout = layout;
        self.model = PositionModel::new(&self.config, layout);
        if let Phase::Resting(state) = self.phase {
            self.fraction = self.model.fraction_of(state);
        }
        self.frame()
    }

    /// Replaces the configuration, keeping the layout.
    ///
    /// The returned effects always carry the live geometry. Positions the new
    /// configuration no longer supports are replaced by full expansion: a resting
    /// drawer moves there, a transition heading to one is retargeted, and a drag
    /// that started at one treats full expansion as its origin. A drag in progress
    /// when dragging is turned off animates back to its origin.
    pub fn set_config(&mut self, config: DrawerConfig) -> Effects<C> {
        let mut effects = Effects::default();
        self.config = config;
        self.model = PositionModel::new(&self.config, self.layout);
        match self.phase {
            Phase::Resting(state) => {
                let state = self.supported(state);
                self.phase = Phase::Resting(state);
                self.fraction = self.model.fraction_of(state);
            }
            Phase::Dragging { origin } => {
                self.phase = Phase::Dragging {
                    origin: self.supported(origin),
                };
                if !self.accepts_drags() {
                    self.abandon_drag(&mut effects);
                }
            }
            Phase::InFlight(mut running) => {
                running.source = self.supported(running.source);
                self.phase = Phase::InFlight(running);
                if !self.model.supports(running.target) {
                    self.move_to(DrawerState::FullyExpanded, false, true, &mut effects);
                    if self.heading() != DrawerState::FullyExpanded {
                        preempted(&running, &mut effects);
                        self.rest_at(DrawerState::FullyExpanded, &mut effects);
                    }
                }
            }
        }
        effects.frame = Some(self.frame());
        effects
    }

    /// Validates a drag reading and handles it as [`DrawerInput::DragMoved`].
    pub fn drag_moved(&mut self, fraction: f64, velocity: f64) -> Result<Effects<C>, DrawerError> {
        let sample = DragSample::new(fraction, velocity)?;
        Ok(self.handle(DrawerInput::DragMoved(sample)))
    }

    /// Validates a drag reading and handles it as [`DrawerInput::DragEnded`].
    pub fn drag_ended(&mut self, fraction: f64, velocity: f64) -> Result<Effects<C>, DrawerError> {
        let sample = DragSample::new(fraction, velocity)?;
        Ok(self.handle(DrawerInput::DragEnded(sample)))
    }

    /// Handles one input.
    pub fn handle(&mut self, input: DrawerInput) -> Effects<C> {
        let mut effects = Effects::default();
        match input {
            DrawerInput::Present => {
                if self.heading() == DrawerState::Collapsed {
                    let target = self.supported(DrawerState::PartiallyExpanded);
                    self.request(target, false, &mut effects);
                }
            }
            DrawerInput::Expand => self.request(DrawerState::FullyExpanded, false, &mut effects),
            DrawerInput::Dismiss => self.request(DrawerState::Collapsed, false, &mut effects),
            DrawerInput::TapInside { count } => {
                if self.config.is_presentable_by_taps()
                    && taps_match(count, self.config.taps_to_present())
                {
                    self.request(DrawerState::FullyExpanded, false, &mut effects);
                }
            }
            DrawerInput::TapOutside { count } => {
                if self.config.is_dismissable_by_outside_taps()
                    && taps_match(count, self.config.taps_to_dismiss())
                {
                    if self.heading() == DrawerState::FullyExpanded
                        && self.config.dismisses_in_stages()
                    {
                        self.request(DrawerState::PartiallyExpanded, true, &mut effects);
                    } else {
                        self.request(DrawerState::Collapsed, false, &mut effects);
                    }
                }
            }
            DrawerInput::DragBegan => self.drag_began(&mut effects),
            DrawerInput::DragMoved(sample) => {
                if self.accepts_drags() && matches!(self.phase, Phase::Dragging { .. }) {
                    self.fraction = sample.fraction();
                    effects.frame = Some(self.frame());
                }
            }
            DrawerInput::DragEnded(sample) => self.drag_released(sample, &mut effects),
            DrawerInput::AnimationProgressed { id, fraction } => {
                if self.is_running(id) && fraction.is_finite() {
                    self.fraction = fraction;
                    effects.frame = Some(self.frame());
                }
            }
            DrawerInput::AnimationFinished { id } => self.finish(id, &mut effects),
            DrawerInput::AnimationCancelled { id } => {
                if let Phase::InFlight(running) = self.phase
                    && running.id == id
                {
                    preempted(&running, &mut effects);
                    self.rest_at(running.source, &mut effects);
                }
            }
        }
        effects
    }

    /// Where the drawer is, or is going, absent further input.
    fn heading(&self) -> DrawerState {
        match self.phase {
            Phase::Resting(state) => state,
            Phase::Dragging { origin } => origin,
            Phase::InFlight(transition) => transition.target,
        }
    }

    fn is_running(&self, id: TransitionId) -> bool {
        matches!(self.phase, Phase::InFlight(running) if running.id == id)
    }

    fn accepts_drags(&self) -> bool {
        self.config.is_draggable() && self.content.is_some()
    }

    /// `state`, or full expansion if `state` does not exist under the current model.
    fn supported(&self, state: DrawerState) -> DrawerState {
        if self.model.supports(state) {
            state
        } else {
            DrawerState::FullyExpanded
        }
    }

    /// Discrete actions are ignored while the user holds the drawer.
    fn request(&mut self, target: DrawerState, staged: bool, effects: &mut Effects<C>) {
        if matches!(self.phase, Phase::Dragging { .. }) {
            return;
        }
        self.move_to(target, staged, false, effects);
    }

    fn drag_began(&mut self, effects: &mut Effects<C>) {
        if !self.accepts_drags() {
            return;
        }
        let origin = match self.phase {
            Phase::Resting(state) => state,
            Phase::Dragging { .. } => return,
            Phase::InFlight(running) => {
                preempted(&running, effects);
                running.source
            }
        };
        self.phase = Phase::Dragging { origin };
    }

    fn drag_released(&mut self, sample: DragSample, effects: &mut Effects<C>) {
        if !self.accepts_drags() {
            self.abandon_drag(effects);
            return;
        }
        let origin = match self.phase {
            Phase::Resting(state) => state,
            Phase::Dragging { origin } => origin,
            Phase::InFlight(running) => running.source,
        };
        let resolution = resolve_drag(&self.config, &self.model, origin, sample);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            ?origin,
            fraction = sample.fraction(),
            velocity = sample.velocity(),
            target = ?resolution.target,
            flicked = resolution.flicked,
            staged = resolution.staged,
            "drag resolved"
        );
        self.fraction = sample.fraction();
        self.move_to(resolution.target, resolution.staged, true, effects);
    }

    /// Sends a drag that can no longer be resolved back to where it started.
    fn abandon_drag(&mut self, effects: &mut Effects<C>) {
        let Phase::Dragging { origin } = self.phase else {
            return;
        };
        self.move_to(origin, false, true, effects);
        if matches!(self.phase, Phase::Dragging { .. }) {
            self.rest_at(origin, effects);
        }
    }

    /// Starts a transition toward `target`.
    ///
    /// Without `restart`, a drawer already resting at or heading to `target` is left alone.
    fn move_to(
        &mut self,
        target: DrawerState,
        staged: bool,
        restart: bool,
        effects: &mut Effects<C>,
    ) {
        if target != DrawerState::Collapsed && self.content.is_none() {
            return;
        }
        let source = match self.phase {
            Phase::Resting(state) => {
                if state == target && !restart {
                    return;
                }
                state
            }
            Phase::Dragging { origin } => origin,
            Phase::InFlight(running) => {
                if running.target == target && !restart {
                    return;
                }
                preempted(&running, effects);
                running.source
            }
        };
        let from = self.fraction;
        let to = self.model.fraction_of(target);
        let id = TransitionId(self.next_id);
        self.next_id += 1;
        let plan = TransitionPlan::new(&self.config, &self.model, from, to);
        let transition = Transition {
            id,
            source,
            target,
            direction: Direction::between(from, to, target),
            staged,
            plan,
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(
            id = id.get(),
            ?source,
            ?target,
            from,
            to,
            duration = plan.duration,
            staged,
            "drawer transition started"
        );
        self.phase = Phase::InFlight(transition);
        effects.frame = Some(plan.start);
        effects.notices.push(DrawerNotice::Started(transition));
    }

    fn finish(&mut self, id: TransitionId, effects: &mut Effects<C>) {
        let Phase::InFlight(running) = self.phase else {
            return;
        };
        if running.id != id {
            return;
        }
        let state = running.target;
        let path = if running.source == DrawerState::Collapsed && state == DrawerState::Collapsed
        {
            CompletionPath::Withdrawn
        } else {
            CompletionPath::for_state(state)
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(id = id.get(), ?state, ?path, "drawer transition completed");
        effects.notices.push(DrawerNotice::Completed { id, state, path });
        self.rest_at(state, effects);
        if path == CompletionPath::Dismissed {
            effects.released = self.content.take();
        }
    }

    fn rest_at(&mut self, state: DrawerState, effects: &mut Effects<C>) {
        self.phase = Phase::Resting(state);
        self.fraction = self.model.fraction_of(state);
        effects.frame = Some(self.frame());
    }
}

/// A run of zero taps never triggers anything.
fn taps_match(count: u32, required: u32) -> bool {
    required > 0 && count == required
}

fn preempted<C>(running: &Transition, effects: &mut Effects<C>) {
    #[cfg(feature = "tracing")]
    tracing::debug!(id = running.id.get(), target = ?running.target, "drawer transition preempted");
    effects.notices.push(DrawerNotice::Preempted {
        id: running.id,
        target: running.target,
    });
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    // Partial at 0.4, snap band [0.35, 0.45].
    const LAYOUT: DrawerLayout = DrawerLayout::new(800.0, 320.0);

    fn drawer(config: DrawerConfig) -> DrawerController<&'static str> {
        DrawerController::new(config, LAYOUT, "content")
    }

    fn started<C>(effects: &Effects<C>) -> Transition {
        *effects.started().expect("a transition should start")
    }

    fn settle<C>(drawer: &mut DrawerController<C>, effects: &Effects<C>) -> Effects<C> {
        let id = started(effects).id;
        drawer.handle(DrawerInput::AnimationFinished { id })
    }

    #[test]
    fn present_stops_at_partial_and_reports_completion() {
        let mut d = drawer(DrawerConfig::default());
        let effects = d.handle(DrawerInput::Present);
        let t = started(&effects);
        assert_eq!(t.source, DrawerState::Collapsed);
        assert_eq!(t.target, DrawerState::PartiallyExpanded);
        assert_eq!(t.direction, Direction::Presenting);
        assert!(!t.staged);
        assert_eq!(effects.frame, Some(t.plan.start));
        assert_eq!(
            d.phase(),
            DrawerPhase::InFlight {
                id: t.id,
                source: DrawerState::Collapsed,
                target: DrawerState::PartiallyExpanded
            }
        );

        let effects = d.handle(DrawerInput::AnimationProgressed {
            id: t.id,
            fraction: 0.2,
        });
        assert_eq!(effects.frame.unwrap().offset, 640.0);
        assert_eq!(d.live_fraction(), 0.2);

        let effects = d.handle(DrawerInput::AnimationFinished { id: t.id });
        assert_eq!(
            effects.notices.as_slice(),
            &[DrawerNotice::Completed {
                id: t.id,
                state: DrawerState::PartiallyExpanded,
                path: CompletionPath::PartiallyExpanded,
            }]
        );
        assert!(effects.released.is_none());
        assert_eq!(d.phase(), DrawerPhase::Resting(DrawerState::PartiallyExpanded));
        assert!((d.live_fraction() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn present_without_partial_expands_fully() {
        let mut d = drawer(DrawerConfig::default().with_supports_partial_expansion(false));
        let effects = d.handle(DrawerInput::Present);
        assert_eq!(started(&effects).target, DrawerState::FullyExpanded);
        let effects = settle(&mut d, &effects);
        assert_eq!(
            effects.completed(),
            Some((DrawerState::FullyExpanded, CompletionPath::Presented))
        );
    }

    #[test]
    fn repeated_request_for_the_same_target_is_ignored() {
        let mut d = drawer(DrawerConfig::default());
        let first = d.handle(DrawerInput::Present);
        assert!(d.handle(DrawerInput::Present).is_empty());
        settle(&mut d, &first);
        assert!(d.handle(DrawerInput::Present).is_empty());
        assert!(d.handle(DrawerInput::AnimationFinished { id: started(&first).id }).is_empty());
    }

    #[test]
    fn dismissal_releases_content() {
        let mut d = drawer(DrawerConfig::default());
        let effects = d.handle(DrawerInput::Expand);
        settle(&mut d, &effects);

        let effects = d.handle(DrawerInput::Dismiss);
        let t = started(&effects);
        assert_eq!(t.target, DrawerState::Collapsed);
        assert_eq!(t.direction, Direction::Dismissing);
        assert!(!t.staged, "programmatic dismissal goes straight to collapsed");

        let effects = settle(&mut d, &effects);
        assert_eq!(
            effects.completed(),
            Some((DrawerState::Collapsed, CompletionPath::Dismissed))
        );
        assert_eq!(effects.released, Some("content"));
        assert!(d.content().is_none());

        // Nothing to present until new content arrives.
        assert!(d.handle(DrawerInput::Present).is_empty());
        assert!(d.handle(DrawerInput::DragBegan).is_empty());
        assert_eq!(d.replace_content("next"), None);
        assert!(d.handle(DrawerInput::Present).started().is_some());
        assert_eq!(d.content(), Some(&"next"));
    }

    #[test]
    fn stale_engine_callbacks_are_ignored() {
        let mut d = drawer(DrawerConfig::default());
        let first = started(&d.handle(DrawerInput::Present));
        let effects = d.handle(DrawerInput::Expand);
        assert_eq!(effects.preempted(), Some(first.id));
        let second = started(&effects);

        assert!(
            d.handle(DrawerInput::AnimationProgressed {
                id: first.id,
                fraction: 0.9
            })
            .is_empty()
        );
        assert!(d.handle(DrawerInput::AnimationFinished { id: first.id }).is_empty());
        assert!(d.handle(DrawerInput::AnimationCancelled { id: first.id }).is_empty());
        assert_eq!(d.transition().map(|t| t.id), Some(second.id));
    }

    #[test]
    fn taps_must_match_the_configured_count() {
        let mut d = drawer(DrawerConfig::default().with_tap_to_present(true, 2));
        let effects = d.handle(DrawerInput::Present);
        settle(&mut d, &effects);

        assert!(d.handle(DrawerInput::TapInside { count: 1 }).is_empty());
        assert!(d.handle(DrawerInput::TapInside { count: 3 }).is_empty());
        let effects = d.handle(DrawerInput::TapInside { count: 2 });
        assert_eq!(started(&effects).target, DrawerState::FullyExpanded);
    }

    #[test]
    fn zero_tap_count_never_triggers() {
        let mut d = drawer(
            DrawerConfig::default()
                .with_tap_to_present(true, 0)
                .with_tap_to_dismiss(true, 0),
        );
        assert!(d.handle(DrawerInput::TapInside { count: 0 }).is_empty());
        let effects = d.handle(DrawerInput::Expand);
        settle(&mut d, &effects);
        assert!(d.handle(DrawerInput::TapOutside { count: 0 }).is_empty());
    }

    #[test]
    fn disabled_taps_are_ignored() {
        let mut d = drawer(
            DrawerConfig::default()
                .with_tap_to_present(false, 1)
                .with_tap_to_dismiss(false, 1),
        );
        assert!(d.handle(DrawerInput::TapInside { count: 1 }).is_empty());
        let effects = d.handle(DrawerInput::Expand);
        settle(&mut d, &effects);
        assert!(d.handle(DrawerInput::TapOutside { count: 1 }).is_empty());
    }

    #[test]
    fn outside_tap_dismisses_in_stages_from_full() {
        let mut d = drawer(DrawerConfig::default());
        let effects = d.handle(DrawerInput::Expand);
        settle(&mut d, &effects);

        let effects = d.handle(DrawerInput::TapOutside { count: 1 });
        let t = started(&effects);
        assert_eq!(t.target, DrawerState::PartiallyExpanded);
        assert_eq!(t.direction, Direction::Dismissing);
        assert!(t.staged);
        settle(&mut d, &effects);

        let effects = d.handle(DrawerInput::TapOutside { count: 1 });
        assert_eq!(started(&effects).target, DrawerState::Collapsed);
    }

    #[test]
    fn outside_tap_dismisses_directly_without_stages() {
        let mut d = drawer(DrawerConfig::default().with_dismisses_in_stages(false));
        let effects = d.handle(DrawerInput::Expand);
        settle(&mut d, &effects);
        let effects = d.handle(DrawerInput::TapOutside { count: 1 });
        let t = started(&effects);
        assert_eq!(t.target, DrawerState::Collapsed);
        assert!(!t.staged);
    }

    #[test]
    fn drag_moves_the_drawer_and_resolves_on_release() {
        let mut d = drawer(DrawerConfig::default());
        assert!(d.handle(DrawerInput::DragBegan).is_empty());
        assert_eq!(
            d.phase(),
            DrawerPhase::Dragging {
                origin: DrawerState::Collapsed
            }
        );

        let effects = d.drag_moved(0.3, 0.5).unwrap();
        let frame = effects.frame.unwrap();
        assert!((frame.offset - 560.0).abs() < 1e-9);
        assert!((frame.corner_radius - 4.5).abs() < 1e-9);

        let effects = d.drag_ended(0.41, 0.2).unwrap();
        let t = started(&effects);
        assert_eq!(t.source, DrawerState::Collapsed);
        assert_eq!(t.target, DrawerState::PartiallyExpanded);
        assert!((t.plan.start.fraction - 0.41).abs() < 1e-12);
    }

    #[test]
    fn drag_back_to_origin_animates_home() {
        let mut d = drawer(DrawerConfig::default());
        let effects = d.handle(DrawerInput::Expand);
        settle(&mut d, &effects);

        d.handle(DrawerInput::DragBegan);
        d.drag_moved(0.9, -0.2).unwrap();
        let effects = d.drag_ended(0.95, 0.4).unwrap();
        let t = started(&effects);
        assert_eq!(t.source, DrawerState::FullyExpanded);
        assert_eq!(t.target, DrawerState::FullyExpanded);
        assert_eq!(t.direction, Direction::Presenting);
    }

    #[test]
    fn drag_moves_outside_a_drag_are_ignored() {
        let mut d = drawer(DrawerConfig::default());
        assert!(d.drag_moved(0.5, 0.0).unwrap().is_empty());
        assert_eq!(d.live_fraction(), 0.0);
    }

    #[test]
    fn undraggable_drawer_ignores_drags() {
        let mut d = drawer(DrawerConfig::default().with_draggable(false));
        assert!(d.handle(DrawerInput::DragBegan).is_empty());
        assert!(d.drag_moved(0.3, 0.0).unwrap().is_empty());
        assert!(d.drag_ended(0.9, 5.0).unwrap().is_empty());
        assert_eq!(d.phase(), DrawerPhase::Resting(DrawerState::Collapsed));
    }

    #[test]
    fn invalid_samples_leave_state_alone() {
        let mut d = drawer(DrawerConfig::default());
        d.handle(DrawerInput::DragBegan);
        d.drag_moved(0.3, 0.0).unwrap();
        assert!(matches!(
            d.drag_ended(f64::NAN, 0.0),
            Err(DrawerError::NonFinitePosition(_))
        ));
        assert!(matches!(
            d.drag_ended(1.2, 0.0),
            Err(DrawerError::PositionOutOfRange(_))
        ));
        assert!(d.drag_ended(0.5, f64::INFINITY).is_err());
        assert_eq!(
            d.phase(),
            DrawerPhase::Dragging {
                origin: DrawerState::Collapsed
            }
        );
        assert_eq!(d.live_fraction(), 0.3);
    }

    #[test]
    fn discrete_actions_wait_for_the_drag_to_end() {
        let mut d = drawer(DrawerConfig::default());
        d.handle(DrawerInput::DragBegan);
        assert!(d.handle(DrawerInput::Present).is_empty());
        assert!(d.handle(DrawerInput::Dismiss).is_empty());
    }

    #[test]
    fn grabbing_a_moving_drawer_preempts_its_transition() {
        let mut d = drawer(DrawerConfig::default());
        let t = started(&d.handle(DrawerInput::Present));
        d.handle(DrawerInput::AnimationProgressed {
            id: t.id,
            fraction: 0.25,
        });

        let effects = d.handle(DrawerInput::DragBegan);
        assert_eq!(
            effects.notices.as_slice(),
            &[DrawerNotice::Preempted {
                id: t.id,
                target: DrawerState::PartiallyExpanded
            }]
        );
        assert_eq!(
            d.phase(),
            DrawerPhase::Dragging {
                origin: DrawerState::Collapsed
            }
        );
        assert_eq!(d.live_fraction(), 0.25);
        assert!(d.handle(DrawerInput::AnimationFinished { id: t.id }).is_empty());
    }

    #[test]
    fn second_drag_end_retargets_with_one_notice_per_transition() {
        let mut d = drawer(DrawerConfig::default());
        let mut notices = Vec::new();

        d.handle(DrawerInput::DragBegan);
        let effects = d.drag_ended(0.42, 0.1).unwrap();
        let first = started(&effects);
        assert_eq!(first.target, DrawerState::PartiallyExpanded);
        notices.extend(effects.notices);

        // A second release arrives before the engine reports completion.
        let effects = d.drag_ended(0.9, 0.0).unwrap();
        let second = started(&effects);
        assert_eq!(second.target, DrawerState::FullyExpanded);
        assert_eq!(second.source, DrawerState::Collapsed);
        assert!((second.plan.start.fraction - 0.9).abs() < 1e-12);
        notices.extend(effects.notices);

        notices.extend(d.handle(DrawerInput::AnimationFinished { id: first.id }).notices);
        notices.extend(d.handle(DrawerInput::AnimationFinished { id: second.id }).notices);

        assert_eq!(d.state(), DrawerState::FullyExpanded);
        for id in [first.id, second.id] {
            let endings = notices
                .iter()
                .filter(|notice| {
                    matches!(notice,
                        DrawerNotice::Preempted { id: n, .. } | DrawerNotice::Completed { id: n, .. }
                        if *n == id)
                })
                .count();
            assert_eq!(endings, 1, "transition {id:?}");
        }
        assert!(notices.iter().any(|notice| matches!(
            notice,
            DrawerNotice::Completed {
                state: DrawerState::FullyExpanded,
                path: CompletionPath::Presented,
                ..
            }
        )));
    }

    #[test]
    fn mid_travel_release_without_partial_picks_an_end() {
        let mut d = drawer(DrawerConfig::default().with_supports_partial_expansion(false));
        for (fraction, expected) in [
            (0.4, DrawerState::Collapsed),
            (0.45, DrawerState::Collapsed),
            (0.55, DrawerState::FullyExpanded),
        ] {
            d.handle(DrawerInput::DragBegan);
            let effects = d.drag_ended(fraction, 0.3).unwrap();
            let t = started(&effects);
            assert_eq!(t.target, expected, "fraction {fraction}");
            settle(&mut d, &effects);
            assert_eq!(d.state(), expected);
        }
        assert!(d.content().is_some());
    }

    #[test]
    fn engine_cancellation_returns_to_source() {
        let mut d = drawer(DrawerConfig::default());
        let effects = d.handle(DrawerInput::Expand);
        settle(&mut d, &effects);

        let t = started(&d.handle(DrawerInput::Dismiss));
        d.handle(DrawerInput::AnimationProgressed {
            id: t.id,
            fraction: 0.6,
        });
        let effects = d.handle(DrawerInput::AnimationCancelled { id: t.id });
        assert_eq!(effects.preempted(), Some(t.id));
        assert!(effects.completed().is_none());
        assert!(effects.released.is_none());
        assert_eq!(effects.frame.unwrap().fraction, 1.0);
        assert_eq!(d.phase(), DrawerPhase::Resting(DrawerState::FullyExpanded));
        assert!(d.content().is_some());
    }

    #[test]
    fn transition_ids_are_unique() {
        let mut d = drawer(DrawerConfig::default());
        let a = started(&d.handle(DrawerInput::Present)).id;
        let b = started(&d.handle(DrawerInput::Expand)).id;
        let c = started(&d.handle(DrawerInput::Dismiss)).id;
        assert!(a < b && b < c);
    }

    #[test]
    fn layout_changes_move_a_resting_drawer() {
        let mut d = drawer(DrawerConfig::default());
        let effects = d.handle(DrawerInput::Present);
        settle(&mut d, &effects);
        let frame = d.set_layout(DrawerLayout::new(800.0, 400.0));
        assert!((frame.fraction - 0.5).abs() < 1e-9);
        assert!((frame.offset - 400.0).abs() < 1e-9);
    }

    #[test]
    fn dropping_partial_expansion_moves_partial_drawer_to_full() {
        let mut d = drawer(DrawerConfig::default());
        let effects = d.handle(DrawerInput::Present);
        settle(&mut d, &effects);
        let effects = d.set_config(DrawerConfig::default().with_supports_partial_expansion(false));
        assert!(effects.notices.is_empty());
        assert_eq!(effects.frame.unwrap().fraction, 1.0);
        assert_eq!(d.state(), DrawerState::FullyExpanded);
        assert_eq!(d.layout(), LAYOUT);
    }

    #[test]
    fn dropping_partial_expansion_retargets_a_transition_heading_there() {
        let mut d = drawer(DrawerConfig::default());
        let first = started(&d.handle(DrawerInput::Present));
        d.handle(DrawerInput::AnimationProgressed {
            id: first.id,
            fraction: 0.2,
        });

        let effects = d.set_config(DrawerConfig::default().with_supports_partial_expansion(false));
        assert_eq!(effects.preempted(), Some(first.id));
        let second = started(&effects);
        assert_eq!(second.source, DrawerState::Collapsed);
        assert_eq!(second.target, DrawerState::FullyExpanded);
        assert!((second.plan.start.fraction - 0.2).abs() < 1e-12);

        assert!(d.handle(DrawerInput::AnimationFinished { id: first.id }).is_empty());
        let effects = d.handle(DrawerInput::AnimationFinished { id: second.id });
        assert_eq!(
            effects.completed(),
            Some((DrawerState::FullyExpanded, CompletionPath::Presented))
        );
        assert_eq!(d.phase(), DrawerPhase::Resting(DrawerState::FullyExpanded));
    }

    #[test]
    fn dropping_partial_expansion_remaps_sources_and_drag_origins() {
        let mut d = drawer(DrawerConfig::default());
        let effects = d.handle(DrawerInput::Present);
        settle(&mut d, &effects);

        // Partial to full, then cancelled by the engine: rests at full, not partial.
        let t = started(&d.handle(DrawerInput::Expand));
        let effects = d.set_config(DrawerConfig::default().with_supports_partial_expansion(false));
        assert!(effects.notices.is_empty());
        assert_eq!(
            d.phase(),
            DrawerPhase::InFlight {
                id: t.id,
                source: DrawerState::FullyExpanded,
                target: DrawerState::FullyExpanded
            }
        );
        d.handle(DrawerInput::AnimationCancelled { id: t.id });
        assert_eq!(d.phase(), DrawerPhase::Resting(DrawerState::FullyExpanded));

        let mut d = drawer(DrawerConfig::default());
        let effects = d.handle(DrawerInput::Present);
        settle(&mut d, &effects);
        d.handle(DrawerInput::DragBegan);
        d.set_config(DrawerConfig::default().with_supports_partial_expansion(false));
        assert_eq!(
            d.phase(),
            DrawerPhase::Dragging {
                origin: DrawerState::FullyExpanded
            }
        );
    }

    #[test]
    fn turning_dragging_off_mid_drag_returns_the_drawer_to_its_origin() {
        let mut d = drawer(DrawerConfig::default());
        d.handle(DrawerInput::DragBegan);
        d.drag_moved(0.3, 0.0).unwrap();

        let effects = d.set_config(DrawerConfig::default().with_draggable(false));
        let t = started(&effects);
        assert_eq!(t.source, DrawerState::Collapsed);
        assert_eq!(t.target, DrawerState::Collapsed);
        assert!((t.plan.start.fraction - 0.3).abs() < 1e-12);

        // The release that follows is ignored instead of being swallowed by a stuck drag.
        assert!(d.drag_ended(0.4, 0.0).unwrap().is_empty());
        let effects = settle(&mut d, &effects);
        assert_eq!(
            effects.completed(),
            Some((DrawerState::Collapsed, CompletionPath::Withdrawn))
        );
        assert_eq!(d.phase(), DrawerPhase::Resting(DrawerState::Collapsed));

        assert!(d.handle(DrawerInput::Present).started().is_some());
    }

    #[test]
    fn present_is_ignored_once_the_drawer_is_on_screen() {
        let mut d = drawer(DrawerConfig::default());
        let effects = d.handle(DrawerInput::Expand);
        settle(&mut d, &effects);
        assert!(d.handle(DrawerInput::Present).is_empty());
        assert_eq!(d.phase(), DrawerPhase::Resting(DrawerState::FullyExpanded));

        // On its way out, the drawer can be presented again.
        let dismissal = started(&d.handle(DrawerInput::Dismiss));
        let effects = d.handle(DrawerInput::Present);
        assert_eq!(effects.preempted(), Some(dismissal.id));
        assert_eq!(started(&effects).target, DrawerState::PartiallyExpanded);
    }

    #[test]
    fn drawer_that_never_left_collapsed_keeps_its_content() {
        let mut d = drawer(DrawerConfig::default());
        d.handle(DrawerInput::DragBegan);
        let effects = d.drag_ended(0.05, 0.0).unwrap();
        assert_eq!(started(&effects).target, DrawerState::Collapsed);
        let effects = settle(&mut d, &effects);
        assert_eq!(
            effects.completed(),
            Some((DrawerState::Collapsed, CompletionPath::Withdrawn))
        );
        assert!(effects.released.is_none());
        assert_eq!(d.content(), Some(&"content"));

        // Presenting and then dismissing before the drawer settles is the same.
        d.handle(DrawerInput::Present);
        let effects = d.handle(DrawerInput::Dismiss);
        let effects = settle(&mut d, &effects);
        assert_eq!(
            effects.completed(),
            Some((DrawerState::Collapsed, CompletionPath::Withdrawn))
        );
        assert!(effects.released.is_none());
    }

    #[test]
    fn handle_alpha_follows_position() {
        let mut d = drawer(DrawerConfig::default());
        assert_eq!(d.handle_alpha(), Some(1.0));
        let effects = d.handle(DrawerInput::Expand);
        settle(&mut d, &effects);
        assert_eq!(d.handle_alpha(), Some(0.0));

        let d = drawer(DrawerConfig::default().with_handle_view(false, crate::HandleViewConfig::default()));
        assert_eq!(d.handle_alpha(), None);
    }
}
