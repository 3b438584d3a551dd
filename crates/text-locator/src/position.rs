//! Page-space rectangles to normalized overlay coordinates

use shared_types::Position;

use crate::error::LocatorError;
use crate::layout::Rect;

/// Fixed precision of every emitted coordinate
pub const COORDINATE_DECIMALS: i32 = 6;

/// A page whose dimensions have been checked
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    page_number: u32,
    width: f64,
    height: f64,
}

impl PageFrame {
    /// Fails with [`LocatorError::PageDimension`] on a zero, negative or
    /// non-finite width or height.
    pub fn new(page_number: u32, width: f64, height: f64) -> Result<Self, LocatorError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(LocatorError::PageDimension {
                page: page_number,
                width,
                height,
            });
        }
        Ok(Self {
            page_number,
            width,
            height,
        })
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Divide by the page size, order, clamp to [0, 1] and round.
    ///
    /// Returns `None` for rectangles with non-finite coordinates.
    pub fn normalize(&self, rect: &Rect) -> Option<Position> {
        let coords = [rect.x0, rect.y0, rect.x1, rect.y1];
        if coords.iter().any(|v| !v.is_finite()) {
            return None;
        }

        let nx = |v: f64| round_coordinate((v / self.width).clamp(0.0, 1.0));
        let ny = |v: f64| round_coordinate((v / self.height).clamp(0.0, 1.0));
        let (x0, x1) = (nx(rect.x0.min(rect.x1)), nx(rect.x0.max(rect.x1)));
        let (y0, y1) = (ny(rect.y0.min(rect.y1)), ny(rect.y0.max(rect.y1)));

        Some(Position {
            page_number: self.page_number,
            x0,
            y0,
            x1,
            y1,
        })
    }
}

/// Round to [`COORDINATE_DECIMALS`] digits
pub fn round_coordinate(value: f64) -> f64 {
    let scale = 10f64.powi(COORDINATE_DECIMALS);
    (value * scale).round() / scale
}

/// One-shot conversion of a single rectangle
pub fn to_normalized(
    rect: &Rect,
    page_number: u32,
    page_width: f64,
    page_height: f64,
) -> Result<Option<Position>, LocatorError> {
    Ok(PageFrame::new(page_number, page_width, page_height)?.normalize(rect))
}
