//! Zone geometry for the terminal front-end.
//!
//! The assignment core works purely on zone indices; only the UI needs to know
//! where a zone is on screen. Zones are laid out as equal-width columns.

use ratatui::layout::{Constraint, Layout};
use ratatui::prelude::Rect;

use crate::assigned::ZoneIndex;

/// Upper bound on how many zone columns the demo will lay out.
pub const MAX_ZONES: usize = 8;

pub fn zone_rects(area: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let constraints = (0..count).map(|_| Constraint::Ratio(1, count as u32));
    Layout::horizontal(constraints).split(area).to_vec()
}

/// Bounding rectangle of every zone in `zones`. Indices outside `rects` are
/// ignored; `None` if nothing remains.
pub fn zone_set_rect(rects: &[Rect], zones: &[ZoneIndex]) -> Option<Rect> {
    zones
        .iter()
        .filter_map(|zone| rects.get(*zone).copied())
        .reduce(|acc, rect| acc.union(rect))
}

/// Shift a zone-set by `delta` columns, keeping its shape. Returns `None` when
/// any zone would fall outside `0..count`.
pub fn shift_zone_set(zones: &[ZoneIndex], delta: isize, count: usize) -> Option<Vec<ZoneIndex>> {
    zones
        .iter()
        .map(|zone| {
            let moved = zone.checked_add_signed(delta)?;
            (moved < count).then_some(moved)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> Rect {
        Rect {
            x: 0,
            y: 0,
            width: 90,
            height: 20,
        }
    }

    #[test]
    fn zones_split_area_into_columns() {
        let rects = zone_rects(area(), 3);
        assert_eq!(rects.len(), 3);
        assert_eq!(rects[0].x, 0);
        assert_eq!(rects[1].x, 30);
        assert_eq!(rects[2].width, 30);
        assert!(zone_rects(area(), 0).is_empty());
    }

    #[test]
    fn zone_set_rect_spans_members() {
        let rects = zone_rects(area(), 3);
        let span = zone_set_rect(&rects, &[2, 1]).unwrap();
        assert_eq!(span.x, 30);
        assert_eq!(span.width, 60);
        assert_eq!(zone_set_rect(&rects, &[5]), None);
    }

    #[test]
    fn shift_keeps_shape_inside_bounds() {
        assert_eq!(shift_zone_set(&[0, 1], 1, 3), Some(vec![1, 2]));
        assert_eq!(shift_zone_set(&[1, 2], 1, 3), None);
        assert_eq!(shift_zone_set(&[0], -1, 3), None);
        assert_eq!(shift_zone_set(&[2, 1], -1, 3), Some(vec![1, 0]));
    }
}
