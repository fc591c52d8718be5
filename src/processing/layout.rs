use serde::Deserialize;

/// Where a scaled image sits inside the target rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    /// Letterbox/pillarbox: equal padding on the non-touching axis.
    #[default]
    Center,
    /// Pin the image to the top-left corner.
    TopLeft,
}

/// Aspect-preserving fit of `src` inside `rect`.
///
/// A relatively wider source fits the rectangle's width, otherwise its height;
/// the other dimension is rounded to the nearest pixel and never exceeds the
/// rectangle.
pub fn fit_within(src_w: u32, src_h: u32, rect_w: u32, rect_h: u32) -> (u32, u32) {
    let rect_w = rect_w.max(1);
    let rect_h = rect_h.max(1);
    let image_ratio = f64::from(src_w.max(1)) / f64::from(src_h.max(1));
    let rect_ratio = f64::from(rect_w) / f64::from(rect_h);

    if image_ratio > rect_ratio {
        let h = (f64::from(rect_w) / image_ratio).round() as u32;
        (rect_w, h.clamp(1, rect_h))
    } else {
        let w = (f64::from(rect_h) * image_ratio).round() as u32;
        (w.clamp(1, rect_w), rect_h)
    }
}

pub fn center_offset(inner_w: u32, inner_h: u32, outer_w: u32, outer_h: u32) -> (u32, u32) {
    let ox = outer_w.saturating_sub(inner_w) / 2;
    let oy = outer_h.saturating_sub(inner_h) / 2;
    (ox, oy)
}

pub fn anchor_offset(
    anchor: Anchor,
    inner_w: u32,
    inner_h: u32,
    outer_w: u32,
    outer_h: u32,
) -> (u32, u32) {
    match anchor {
        Anchor::Center => center_offset(inner_w, inner_h, outer_w, outer_h),
        Anchor::TopLeft => (0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wider_image_fits_width() {
        assert_eq!(fit_within(1000, 500, 1920, 1080), (1920, 960));
    }

    #[test]
    fn taller_image_fits_height() {
        assert_eq!(fit_within(1000, 1000, 1920, 1080), (1080, 1080));
        assert_eq!(fit_within(3024, 4032, 1920, 1080), (810, 1080));
    }

    #[test]
    fn equal_ratio_touches_both_axes() {
        assert_eq!(fit_within(1600, 900, 1920, 1080), (1920, 1080));
        assert_eq!(fit_within(3840, 2160, 1920, 1080), (1920, 1080));
    }

    #[test]
    fn small_images_are_upscaled() {
        assert_eq!(fit_within(320, 240, 1920, 1080), (1440, 1080));
    }

    #[test]
    fn extreme_ratios_keep_one_pixel() {
        assert_eq!(fit_within(100_000, 1, 1920, 1080), (1920, 1));
        assert_eq!(fit_within(1, 100_000, 1920, 1080), (1, 1080));
    }

    #[test]
    fn width_fit_property_holds_across_shapes() {
        let rect = (1920, 1080);
        for (w, h) in [(2000, 1000), (1920, 1000), (5000, 2000), (17, 9), (1921, 1080)] {
            let (nw, nh) = fit_within(w, h, rect.0, rect.1);
            assert_eq!(nw, rect.0, "{w}x{h}");
            assert!(nh <= rect.1, "{w}x{h}");
        }
        for (w, h) in [(1000, 2000), (1080, 1080), (4, 3), (1919, 1080)] {
            let (nw, nh) = fit_within(w, h, rect.0, rect.1);
            assert_eq!(nh, rect.1, "{w}x{h}");
            assert!(nw <= rect.0, "{w}x{h}");
        }
    }

    #[test]
    fn offsets_follow_anchor() {
        assert_eq!(anchor_offset(Anchor::Center, 1920, 960, 1920, 1080), (0, 60));
        assert_eq!(anchor_offset(Anchor::Center, 1081, 1080, 1920, 1080), (419, 0));
        assert_eq!(anchor_offset(Anchor::TopLeft, 1920, 960, 1920, 1080), (0, 0));
    }
}
