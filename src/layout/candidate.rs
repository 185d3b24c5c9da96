use crate::geometry::{Point, Rect, Size};
use crate::ir::{Alignment, Position};

/// Raw, unclamped rectangle for a tooltip of `size` on `position` of `anchor`.
///
/// Returns `None` for pairs that are never meaningful, e.g. a `left` tooltip
/// aligned `left`.
pub(crate) fn raw_candidate(
    anchor: &Rect,
    size: Size,
    margin: f32,
    position: Position,
    alignment: Alignment,
) -> Option<Rect> {
    if !position.accepts(alignment) {
        return None;
    }
    let origin = match position {
        Position::Left => Point::new(
            anchor.left() - size.width - margin,
            vertical_align(anchor, size, alignment),
        ),
        Position::Right => Point::new(
            anchor.right() + margin,
            vertical_align(anchor, size, alignment),
        ),
        Position::Over => Point::new(
            horizontal_align(anchor, size, alignment),
            anchor.top() - size.height - margin,
        ),
        Position::Under => Point::new(
            horizontal_align(anchor, size, alignment),
            anchor.bottom() + margin,
        ),
    };
    Some(Rect::from_position_size(origin, size))
}

fn vertical_align(anchor: &Rect, size: Size, alignment: Alignment) -> f32 {
    match alignment {
        Alignment::Top => anchor.top(),
        Alignment::Bottom => anchor.bottom() - size.height,
        _ => anchor.center().y - size.height / 2.0,
    }
}

fn horizontal_align(anchor: &Rect, size: Size, alignment: Alignment) -> f32 {
    match alignment {
        Alignment::Left => anchor.left(),
        Alignment::Right => anchor.right() - size.width,
        _ => anchor.center().x - size.width / 2.0,
    }
}
