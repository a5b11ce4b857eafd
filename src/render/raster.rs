//! Raster styling target
//!
//! Composites an overlay onto a bitmap of the rendered page the way a browser
//! draws it: each region's color goes through its contrast filter and is then
//! blended with `difference` over the pixels the region covers.

use crate::error::{Error, Result};
use crate::overlay::{ContrastFilter, OverlayState};
use image::{ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;
use std::ops::Range;

/// Apply a contrast filter to one color channel
pub fn contrast_channel(channel: u8, filter: ContrastFilter) -> u8 {
    let unit = channel as f64 / 255.0;
    let adjusted = ((unit - 0.5) * filter.amount() + 0.5).clamp(0.0, 1.0);
    (adjusted * 255.0).round() as u8
}

/// Pixel range covered by a percentage span of `size` pixels
fn pixel_span(start: f64, extent: f64, size: u32) -> Range<u32> {
    let to_px = |pct: f64| (pct / 100.0 * size as f64).round().clamp(0.0, size as f64) as u32;
    let from = to_px(start);
    let to = to_px(start + extent);
    from..to.max(from)
}

/// Blend a visible overlay into `page`. Hidden overlays leave it untouched,
/// and regions whose color has no single-byte channel are skipped.
pub fn composite(overlay: &OverlayState, page: &mut RgbaImage) {
    if !overlay.is_visible() {
        return;
    }
    let (width, height) = page.dimensions();

    for (region, style) in overlay.regions() {
        let Some(channel) = style.background_color.channel() else {
            tracing::debug!(
                region = region.element_id(),
                color = %style.background_color,
                "skipping region without a drawable color"
            );
            continue;
        };
        let source = contrast_channel(channel, style.filter);
        let rows = pixel_span(style.rect.top.value(), style.rect.height.value(), height);
        let cols = pixel_span(style.rect.left.value(), style.rect.width.value(), width);

        for y in rows {
            for x in cols.clone() {
                let pixel = page.get_pixel_mut(x, y);
                for c in pixel.0.iter_mut().take(3) {
                    *c = c.abs_diff(source);
                }
            }
        }
    }
}

/// Decode a page bitmap, rejecting images above `max_pixels`
pub fn decode_page(bytes: &[u8], max_pixels: u64) -> Result<RgbaImage> {
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()?;
    let pixels = width as u64 * height as u64;
    if pixels == 0 {
        return Err(Error::InvalidImage {
            reason: "image has no pixels".to_string(),
        });
    }
    if pixels > max_pixels {
        return Err(Error::ImageTooLarge { pixels, max_pixels });
    }
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

pub fn encode_png(page: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    page.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{to_contrast_filter, ParameterSet, RegionGroup, ToggleState};
    use image::Rgba;
    use rstest::rstest;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn white_page() -> RgbaImage {
        RgbaImage::from_pixel(100, 100, WHITE)
    }

    #[rstest]
    #[case(0, 50, 64)]
    #[case(255, 100, 255)]
    #[case(0, 100, 0)]
    #[case(128, 0, 128)]
    #[case(200, 200, 255)]
    fn test_contrast_channel(#[case] channel: u8, #[case] percent: i64, #[case] expected: u8) {
        assert_eq!(contrast_channel(channel, to_contrast_filter(percent)), expected);
    }

    #[test]
    fn test_pixel_span() {
        assert_eq!(pixel_span(27.58, 43.7, 100), 28..71);
        assert_eq!(pixel_span(0.0, 100.0, 10), 0..10);
        assert_eq!(pixel_span(90.0, 30.0, 10), 9..10);
        assert!(pixel_span(50.0, -10.0, 100).is_empty());
    }

    #[test]
    fn test_default_overlay_darkens_white_page() {
        let overlay = OverlayState::create(&ParameterSet::default());
        let mut page = white_page();
        composite(&overlay, &mut page);

        // pdf region: white over white gives black
        assert_eq!(page.get_pixel(50, 50), &Rgba([0, 0, 0, 255]));
        // header and sides: black at 50% contrast is 64, difference gives 191
        assert_eq!(page.get_pixel(50, 2), &Rgba([191, 191, 191, 255]));
        assert_eq!(page.get_pixel(10, 50), &Rgba([191, 191, 191, 255]));
        assert_eq!(page.get_pixel(90, 50), &Rgba([191, 191, 191, 255]));
    }

    #[test]
    fn test_hidden_overlay_leaves_page() {
        let overlay = OverlayState::create(&ParameterSet {
            toggle: ToggleState::Off,
            ..ParameterSet::default()
        });
        let mut page = white_page();
        composite(&overlay, &mut page);
        assert_eq!(page, white_page());
    }

    #[test]
    fn test_undrawable_color_is_skipped() {
        let mut overlay = OverlayState::create(&ParameterSet::default());
        overlay.set_region_color(RegionGroup::Pdf, 300);
        let mut page = white_page();
        composite(&overlay, &mut page);
        assert_eq!(page.get_pixel(50, 50), &WHITE);
    }

    #[test]
    fn test_png_round_trip_and_limits() {
        let bytes = encode_png(&white_page()).unwrap();
        let decoded = decode_page(&bytes, 10_000).unwrap();
        assert_eq!(decoded.dimensions(), (100, 100));

        let err = decode_page(&bytes, 9_999).unwrap_err();
        assert!(matches!(
            err,
            Error::ImageTooLarge {
                pixels: 10_000,
                max_pixels: 9_999
            }
        ));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_page(b"not an image", 10_000).is_err());
    }
}
