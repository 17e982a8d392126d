// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_drawer --heading-base-level=0

//! Understory Drawer: a bottom-drawer transition state machine.
//!
//! A drawer is a panel that slides up from the bottom edge of a host surface and
//! rests at one of three positions: collapsed (off-screen), partially expanded,
//! or fully expanded. This crate decides where the drawer goes and how it gets
//! there. It does not draw anything, own a timer, or recognize gestures.
//!
//! The core concepts are:
//!
//! - [`DrawerConfig`]: every tunable parameter, clamped on mutation, with the
//!   boolean switches stored as [`DrawerFeatures`].
//! - [`PositionModel`]: the resting positions as fractions of travel plus the
//!   [`SnapBand`] around the partial position, derived from configuration and a
//!   [`DrawerLayout`].
//! - [`resolve_drag`]: turns the final [`DragSample`] of a drag into a target
//!   [`DrawerState`], applying the flick override, the snap band, and staged
//!   dismissal.
//! - [`TransitionPlan`]: duration, timing curve, and start/end [`Frame`]s
//!   (offset and top corner radius) for one move, with a lazy [`Frames`]
//!   iterator for hosts that want precomputed geometry.
//! - [`DrawerController`]: the sans-IO state machine that sequences the above in
//!   response to [`DrawerInput`] events and reports [`DrawerNotice`]s.
//!
//! Hosts are responsible for:
//!
//! - Supplying the travel distance and partial height through [`DrawerLayout`].
//! - Turning pointer input into drag samples (see [`VelocityTracker`] and
//!   [`PositionModel::fraction_for_offset`]) and tap counts (see [`TapCounter`]).
//! - Running each [`Transition::plan`] on their animation engine and reporting
//!   progress and completion back to the controller.
//!
//! ## Minimal example
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
//! // A user drags the drawer up and lets go with a quick upward flick.
//! drawer.handle(DrawerInput::DragBegan);
//! drawer.drag_moved(0.25, 1.0).unwrap();
//! let effects = drawer.drag_ended(0.3, 4.0).unwrap();
//! let transition = *effects.started().unwrap();
//! assert_eq!(transition.target, DrawerState::FullyExpanded);
//!
//! // The host's animation engine plays `transition.plan` and reports back.
//! for (_, frame) in transition.plan.frames(1.0 / 60.0) {
//!     drawer.handle(DrawerInput::AnimationProgressed {
//!         id: transition.id,
//!         fraction: frame.fraction,
//!     });
//! }
//! let effects = drawer.handle(DrawerInput::AnimationFinished { id: transition.id });
//! assert_eq!(
//!     effects.completed(),
//!     Some((DrawerState::FullyExpanded, CompletionPath::Presented))
//! );
//! ```
//!
//! ## Features
//!
//! - `std` (default): use the standard library for floating point math.
//! - `libm`: floating point math for `no_std` builds.
//! - `tracing`: debug events for clamped configuration values and transition
//!   lifecycle, warnings for rejected gesture samples.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod animator;
mod config;
mod controller;
mod drag;
mod error;
mod handle_view;
mod position;
mod shared;
mod taps;

pub use animator::{
    Frame, Frames, MIN_TRANSITION_DURATION, TransitionPlan, corner_radius_at, transition_duration,
};
pub use config::{
    CubicTiming, DEFAULT_FLICK_SPEED_THRESHOLD, DEFAULT_MARK_GAP, DEFAULT_MAXIMUM_CORNER_RADIUS,
    DEFAULT_TOTAL_DURATION, DrawerConfig, DrawerFeatures, SpringTiming, TimingCurve,
};
pub use controller::{
    CompletionPath, Direction, DrawerController, DrawerInput, DrawerNotice, DrawerPhase, Effects,
    Transition, TransitionId,
};
pub use drag::{DragResolution, DragSample, GestureDirection, VelocityTracker, resolve_drag};
pub use error::DrawerError;
pub use handle_view::{HandleCornerRadius, HandleViewConfig};
pub use position::{DrawerLayout, DrawerState, PositionModel, SnapBand};
pub use shared::{DrawerHandle, SharedDrawer};
pub use taps::{DEFAULT_TAP_INTERVAL, DEFAULT_TAP_SLOP, Tap, TapCounter, TapRegion};
