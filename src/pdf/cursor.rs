use crate::config::PageGeometry;

use super::surface::{DrawCommand, Surface};

/// Position of the flow: page index and top-down y offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorPos {
    pub page: usize,
    pub y: f32,
}

/// Mutable layout state for one document build. Owns the page list while
/// pass one runs and opens new pages when content would reach the footer
/// band.
pub struct FlowCursor {
    surface: Surface,
    page: usize,
    y: f32,
}

impl FlowCursor {
    /// Starts at the top margin of page 1. `geometry` must already be
    /// validated.
    pub fn new(geometry: PageGeometry) -> Self {
        FlowCursor {
            y: geometry.margin,
            surface: Surface::new(geometry),
            page: 0,
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        self.surface.geometry()
    }

    pub fn position(&self) -> CursorPos {
        CursorPos {
            page: self.page,
            y: self.y,
        }
    }

    pub fn page_index(&self) -> usize {
        self.page
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    /// Space left above the footer band on the current page.
    pub fn remaining(&self) -> f32 {
        self.geometry().content_bottom() - self.y
    }

    /// True if `required` more units fit on the current page.
    pub fn peek(&self, required: f32) -> bool {
        self.y + required <= self.geometry().content_bottom()
    }

    /// True while nothing has been placed on the current page.
    pub fn at_page_top(&self) -> bool {
        (self.y - self.geometry().margin).abs() < 0.01
    }

    /// Move down by `dy`. If that would cross into the footer band a new page
    /// is opened instead and the flow restarts at the top margin. Returns the
    /// position before the move so callers can tell whether a break happened.
    pub fn advance(&mut self, dy: f32) -> CursorPos {
        let before = self.position();
        if self.y + dy > self.geometry().content_bottom() {
            self.break_page();
        } else {
            self.y += dy;
        }
        before
    }

    /// Open a new page and move to its top margin. Returns the pre-break
    /// position.
    pub fn break_page(&mut self) -> CursorPos {
        let before = self.position();
        self.page = self.surface.push_page();
        self.y = self.geometry().margin;
        log::debug!(
            "page break: page {} → {} (left at y={:.1})",
            before.page + 1,
            self.page + 1,
            before.y
        );
        before
    }

    /// Break first unless `required` fits or the page is still empty.
    /// Returns true if a break happened.
    pub fn ensure_space(&mut self, required: f32) -> bool {
        if self.peek(required) || self.at_page_top() {
            return false;
        }
        self.break_page();
        true
    }

    /// Append a command to the current page.
    pub fn draw(&mut self, command: DrawCommand) {
        self.surface.draw(self.page, command);
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn into_surface(self) -> Surface {
        self.surface
    }
}
