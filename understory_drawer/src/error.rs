// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by the drawer.

/// Rejected drawer input.
///
/// Every variant describes an invalid gesture sample. A rejected sample leaves
/// the drawer in its prior state; nothing else the drawer does can fail.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum DrawerError {
    /// The sample position is NaN or infinite.
    #[error("gesture position {0} is not a finite number")]
    NonFinitePosition(f64),
    /// The sample position lies outside `[0, 1]`.
    #[error("gesture position {0} is outside the drawer's travel range [0, 1]")]
    PositionOutOfRange(f64),
    /// The sample velocity is NaN or infinite.
    #[error("gesture velocity {0} is not a finite number")]
    NonFiniteVelocity(f64),
}
