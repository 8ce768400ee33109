//! Rectangles in preview coordinates and the face layout guide

use serde::{Deserialize, Serialize};
use crate::{LAYOUT_GUIDE_HEIGHT, LAYOUT_GUIDE_WIDTH};

/// Axis-aligned rectangle, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn mid_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Same size, moved so both centres coincide with `other`'s
    pub fn centered_on(&self, other: &Rect) -> Rect {
        Rect {
            x: other.mid_x() - self.width / 2.0,
            y: other.mid_y() - self.height / 2.0,
            width: self.width,
            height: self.height,
        }
    }
}

/// Target rectangle the face should fill
///
/// Only a viewport resize moves it; its size never changes after creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutGuide {
    frame: Rect,
}

impl Default for LayoutGuide {
    fn default() -> Self {
        Self::new(LAYOUT_GUIDE_WIDTH, LAYOUT_GUIDE_HEIGHT)
    }
}

impl LayoutGuide {
    /// Create a guide of the given size at the origin
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            frame: Rect::new(0.0, 0.0, width, height),
        }
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Recentre inside a new viewport, keeping width and height
    pub fn recenter(&mut self, viewport: &Rect) {
        self.frame = self.frame.centered_on(viewport);
    }
}
