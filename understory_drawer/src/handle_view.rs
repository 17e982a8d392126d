// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The grab handle drawn near the top edge of the drawer.

use kurbo::{Rect, RoundedRect, Size};

use crate::PositionModel;

/// Corner radius of the grab handle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum HandleCornerRadius {
    /// Half the handle's height, giving fully rounded ends.
    Automatic,
    /// A fixed radius in points.
    Fixed(f64),
}

/// Appearance of the grab handle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HandleViewConfig {
    /// Handle size in points.
    pub size: Size,
    /// Distance from the drawer's top edge to the handle's top edge, in points.
    pub top: f64,
    /// Handle corner radius.
    pub corner_radius: HandleCornerRadius,
    /// Fade the handle out as the drawer moves from its partial to its full position.
    pub auto_animates_dimming: bool,
}

impl Default for HandleViewConfig {
    fn default() -> Self {
        Self {
            size: Size::new(40.0, 6.0),
            top: 8.0,
            corner_radius: HandleCornerRadius::Automatic,
            auto_animates_dimming: true,
        }
    }
}

impl HandleViewConfig {
    /// Effective corner radius in points.
    #[must_use]
    pub fn resolved_corner_radius(&self) -> f64 {
        match self.corner_radius {
            HandleCornerRadius::Automatic => self.size.height / 2.0,
            HandleCornerRadius::Fixed(radius) => radius.max(0.0),
        }
    }

    /// Handle rectangle, horizontally centered near the top of `drawer`.
    #[must_use]
    pub fn rect(&self, drawer: Rect) -> Rect {
        let x0 = drawer.center().x - self.size.width / 2.0;
        let y0 = drawer.y0 + self.top;
        Rect::new(x0, y0, x0 + self.size.width, y0 + self.size.height)
    }

    /// Handle shape, horizontally centered near the top of `drawer`.
    #[must_use]
    pub fn rounded_rect(&self, drawer: Rect) -> RoundedRect {
        RoundedRect::from_rect(self.rect(drawer), self.resolved_corner_radius())
    }

    /// Handle opacity for a drawer at `fraction` of travel.
    ///
    /// With automatic dimming, fully opaque at or below the partial position and
    /// fading linearly to transparent at full expansion. Without a partial position
    /// the fade runs over the whole travel.
    #[must_use]
    pub fn alpha(&self, model: &PositionModel, fraction: f64) -> f64 {
        if !self.auto_animates_dimming {
            return 1.0;
        }
        let start = model.partial_fraction().unwrap_or(0.0);
        let span = 1.0 - start;
        if span <= 0.0 {
            return 1.0;
        }
        (1.0 - (fraction - start) / span).clamp(0.0, 1.0)
    }
}
