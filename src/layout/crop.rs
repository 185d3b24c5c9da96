use crate::geometry::{Rect, Size};
use crate::ir::{Crop, CropEdge};

/// Rectangle placements must respect. Without a crop this is the whole image;
/// fixed crop edges narrow it, and both sentinels fall back to the image edge
/// since content-fitting edges are only known after placement.
pub fn placement_bounds(crop: Option<&Crop>, image: Size) -> Rect {
    let image_rect = Rect::from_size(image);
    let Some(crop) = crop else {
        return image_rect;
    };
    let resolve = |edge: CropEdge, image_edge: f32| match edge {
        CropEdge::Fixed(value) => value,
        CropEdge::FitContent | CropEdge::FitImage => image_edge,
    };
    Rect::from_edges(
        resolve(crop.left, image_rect.left()),
        resolve(crop.top, image_rect.top()),
        resolve(crop.right, image_rect.right()),
        resolve(crop.bottom, image_rect.bottom()),
    )
    .intersect(&image_rect)
}

/// Smallest rectangle covering every given rectangle.
pub fn content_extent<'a, I>(rects: I) -> Option<Rect>
where
    I: IntoIterator<Item = &'a Rect>,
{
    rects
        .into_iter()
        .fold(None, |acc: Option<Rect>, rect| match acc {
            Some(extent) => Some(extent.union(rect)),
            None => Some(*rect),
        })
}

/// Final crop rectangle: fixed edges stay, image sentinels take the image edge
/// and content sentinels hug `content` inflated by `margin`. The result never
/// leaves the image.
pub fn resolve_crop(crop: &Crop, content: Option<Rect>, margin: f32, image: Size) -> Rect {
    let image_rect = Rect::from_size(image);
    let fitted = content
        .map(|rect| rect.inflate(margin).intersect(&image_rect))
        .unwrap_or(image_rect);
    let resolve = |edge: CropEdge, image_edge: f32, content_edge: f32| match edge {
        CropEdge::Fixed(value) => value,
        CropEdge::FitImage => image_edge,
        CropEdge::FitContent => content_edge,
    };
    Rect::from_edges(
        resolve(crop.left, image_rect.left(), fitted.left()),
        resolve(crop.top, image_rect.top(), fitted.top()),
        resolve(crop.right, image_rect.right(), fitted.right()),
        resolve(crop.bottom, image_rect.bottom(), fitted.bottom()),
    )
    .intersect(&image_rect)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE: Size = Size::new(400.0, 300.0);

    #[test]
    fn no_crop_uses_image() {
        assert_eq!(placement_bounds(None, IMAGE), Rect::from_size(IMAGE));
    }

    #[test]
    fn fixed_edges_narrow_bounds() {
        let crop = Crop {
            left: CropEdge::Fixed(50.0),
            top: CropEdge::FitImage,
            right: CropEdge::Fixed(350.0),
            bottom: CropEdge::FitContent,
        };
        assert_eq!(
            placement_bounds(Some(&crop), IMAGE),
            Rect::from_edges(50.0, 0.0, 350.0, 300.0)
        );
    }

    #[test]
    fn fixed_edges_are_clamped_to_image() {
        let crop = Crop {
            left: CropEdge::Fixed(-20.0),
            top: CropEdge::Fixed(10.0),
            right: CropEdge::Fixed(900.0),
            bottom: CropEdge::Fixed(200.0),
        };
        assert_eq!(
            placement_bounds(Some(&crop), IMAGE),
            Rect::from_edges(0.0, 10.0, 400.0, 200.0)
        );
    }

    #[test]
    fn content_extent_unions_everything() {
        let rects = [
            Rect::from_edges(100.0, 100.0, 150.0, 120.0),
            Rect::from_edges(160.0, 90.0, 200.0, 110.0),
        ];
        assert_eq!(
            content_extent(&rects),
            Some(Rect::from_edges(100.0, 90.0, 200.0, 120.0))
        );
        assert_eq!(content_extent(&[] as &[Rect]), None);
    }

    #[test]
    fn fit_content_hugs_inflated_extent() {
        let content = Rect::from_edges(100.0, 90.0, 200.0, 120.0);
        let crop = Crop {
            left: CropEdge::FitContent,
            top: CropEdge::FitContent,
            right: CropEdge::FitImage,
            bottom: CropEdge::Fixed(250.0),
        };
        assert_eq!(
            resolve_crop(&crop, Some(content), 10.0, IMAGE),
            Rect::from_edges(90.0, 80.0, 400.0, 250.0)
        );
    }

    #[test]
    fn fixed_crop_is_clamped_to_image() {
        let crop = Crop {
            left: CropEdge::Fixed(-20.0),
            top: CropEdge::FitImage,
            right: CropEdge::Fixed(900.0),
            bottom: CropEdge::FitImage,
        };
        let resolved = resolve_crop(&crop, None, 10.0, IMAGE);
        assert_eq!(resolved, Rect::from_edges(0.0, 0.0, 400.0, 300.0));
        assert_eq!(resolved, placement_bounds(Some(&crop), IMAGE));
    }

    #[test]
    fn fit_content_never_leaves_the_image() {
        let content = Rect::from_edges(2.0, 5.0, 395.0, 120.0);
        let fitted = resolve_crop(&Crop::fit_content(), Some(content), 10.0, IMAGE);
        assert_eq!(fitted, Rect::from_edges(0.0, 0.0, 400.0, 130.0));
    }
}
