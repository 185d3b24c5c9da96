use crate::config::PenaltySettings;
use crate::geometry::{Point, Rect};
use crate::ir::{Axis, Position};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Adjusted {
    pub rect: Rect,
    pub penalty: f32,
}

/// Whether the raw rectangle stays inside `bounds` on the side it was pushed
/// out to. A `right` tooltip that already runs past the right edge cannot be
/// rescued by sliding it vertically, so such candidates are rejected before
/// any adjustment.
pub(crate) fn fits_primary_axis(rect: &Rect, position: Position, bounds: &Rect) -> bool {
    match position {
        Position::Left => rect.left() >= bounds.left(),
        Position::Right => rect.right() <= bounds.right(),
        Position::Over => rect.top() >= bounds.top(),
        Position::Under => rect.bottom() <= bounds.bottom(),
    }
}

/// Slide `rect` along `axis` until it keeps `margin` from both bounds edges.
///
/// Returns `None` when the rectangle is larger than the bounds minus margins
/// on that axis, since no translation can make it fit.
pub(crate) fn adjust_to_bounds(
    rect: &Rect,
    axis: Axis,
    bounds: &Rect,
    margin: f32,
    penalties: &PenaltySettings,
) -> Option<Adjusted> {
    let (start, extent, low, high) = match axis {
        Axis::Horizontal => (rect.left(), rect.width(), bounds.left(), bounds.right()),
        Axis::Vertical => (rect.top(), rect.height(), bounds.top(), bounds.bottom()),
    };
    let min = low + margin;
    let max = high - margin;
    if extent > max - min {
        return None;
    }
    let shift = if start < min {
        min - start
    } else if start + extent > max {
        max - (start + extent)
    } else {
        0.0
    };
    let offset = match axis {
        Axis::Horizontal => Point::new(shift, 0.0),
        Axis::Vertical => Point::new(0.0, shift),
    };
    Some(Adjusted {
        rect: rect.translate(offset),
        penalty: movement_penalty(shift, penalties),
    })
}

pub(crate) fn movement_penalty(shift: f32, penalties: &PenaltySettings) -> f32 {
    shift.abs() * penalties.movement
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    fn bounds() -> Rect {
        Rect::from_size(Size::new(100.0, 100.0))
    }

    fn unit_penalty() -> PenaltySettings {
        PenaltySettings { movement: 1.0 }
    }

    fn square(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::from_position_size(Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn moves_from_lower_horizontal_bound() {
        let adjusted = adjust_to_bounds(
            &square(-5.0, 0.0, 10.0, 10.0),
            Axis::Horizontal,
            &bounds(),
            10.0,
            &unit_penalty(),
        )
        .unwrap();
        assert_eq!(adjusted.rect.left(), 10.0);
        assert_eq!(adjusted.penalty, 15.0);
    }

    #[test]
    fn moves_from_upper_horizontal_bound() {
        let adjusted = adjust_to_bounds(
            &square(150.0, 0.0, 10.0, 10.0),
            Axis::Horizontal,
            &bounds(),
            10.0,
            &unit_penalty(),
        )
        .unwrap();
        assert_eq!(adjusted.rect.left(), 80.0);
        assert_eq!(adjusted.penalty, 70.0);
    }

    #[test]
    fn moves_from_lower_vertical_bound() {
        let adjusted = adjust_to_bounds(
            &square(-5.0, 0.0, 10.0, 10.0),
            Axis::Vertical,
            &bounds(),
            10.0,
            &unit_penalty(),
        )
        .unwrap();
        assert_eq!(adjusted.rect.top(), 10.0);
        assert_eq!(adjusted.rect.left(), -5.0, "vertical adjust keeps x");
        assert_eq!(adjusted.penalty, 10.0);
    }

    #[test]
    fn scales_penalty_by_move_cost() {
        let adjusted = adjust_to_bounds(
            &square(-5.0, 100.0, 10.0, 20.0),
            Axis::Vertical,
            &bounds(),
            10.0,
            &PenaltySettings { movement: 0.1 },
        )
        .unwrap();
        assert_eq!(adjusted.rect.top(), 70.0);
        assert!((adjusted.penalty - 3.0).abs() < 1e-5, "got {}", adjusted.penalty);
    }

    #[test]
    fn in_bounds_rect_is_untouched() {
        let rect = square(10.0, 10.0, 80.0, 80.0);
        for axis in [Axis::Horizontal, Axis::Vertical] {
            let adjusted =
                adjust_to_bounds(&rect, axis, &bounds(), 10.0, &unit_penalty()).unwrap();
            assert_eq!(adjusted.rect, rect);
            assert_eq!(adjusted.penalty, 0.0);
        }
    }

    #[test]
    fn penalty_grows_with_displacement() {
        let mut last = -1.0;
        for x in [10.0, 5.0, 0.0, -10.0, -40.0] {
            let adjusted = adjust_to_bounds(
                &square(x, 0.0, 10.0, 10.0),
                Axis::Horizontal,
                &bounds(),
                10.0,
                &unit_penalty(),
            )
            .unwrap();
            assert_eq!(adjusted.penalty, adjusted.rect.left() - x);
            assert!(adjusted.penalty >= last);
            last = adjusted.penalty;
        }
    }

    #[test]
    fn respects_offset_bounds() {
        let crop = Rect::from_edges(50.0, 50.0, 150.0, 150.0);
        let adjusted = adjust_to_bounds(
            &square(0.0, 60.0, 20.0, 20.0),
            Axis::Horizontal,
            &crop,
            5.0,
            &unit_penalty(),
        )
        .unwrap();
        assert_eq!(adjusted.rect.left(), 55.0);
    }

    #[test]
    fn oversized_rect_cannot_fit() {
        let adjusted = adjust_to_bounds(
            &square(0.0, 0.0, 90.0, 10.0),
            Axis::Horizontal,
            &bounds(),
            10.0,
            &unit_penalty(),
        );
        assert!(adjusted.is_none());
    }

    #[test]
    fn primary_axis_check() {
        let canvas = Rect::from_size(Size::new(180.0, 300.0));
        let right = Rect::from_edges(160.0, 100.0, 200.0, 120.0);
        assert!(!fits_primary_axis(&right, Position::Right, &canvas));
        let left = Rect::from_edges(-1.0, 100.0, 39.0, 120.0);
        assert!(!fits_primary_axis(&left, Position::Left, &canvas));
        assert!(fits_primary_axis(&left, Position::Right, &canvas));
    }
}
