//! Virtualized customer list window.
//!
//! Only rows inside the viewport (plus a buffer on either side) are rendered;
//! a spacer of `total_height` keeps the scroll extent right.

use std::ops::RangeInclusive;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualWindow {
    pub item_height: f64,
    pub buffer: usize,
}

impl Default for VirtualWindow {
    fn default() -> Self {
        Self {
            item_height: 40.0,
            buffer: 10,
        }
    }
}

impl VirtualWindow {
    /// Rows to render for the given scroll position, inclusive on both ends.
    ///
    /// `None` when the list is empty.
    pub fn visible_range(&self, total: usize, scroll_top: f64, viewport_height: f64) -> Option<RangeInclusive<usize>> {
        if total == 0 || self.item_height <= 0.0 {
            return None;
        }
        let scroll_top = scroll_top.max(0.0);
        let first = (scroll_top / self.item_height).floor() as usize;
        let start = first.saturating_sub(self.buffer);
        let last = ((scroll_top + viewport_height.max(0.0)) / self.item_height).ceil() as usize;
        let end = (last + self.buffer).min(total - 1);
        Some(start.min(end)..=end)
    }

    /// Vertical offset of the first rendered row.
    pub fn offset(&self, start: usize) -> f64 {
        start as f64 * self.item_height
    }

    /// Height of the full (unvirtualized) list.
    pub fn total_height(&self, total: usize) -> f64 {
        total as f64 * self.item_height
    }
}
