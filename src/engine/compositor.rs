//! In-place "over" alpha compositing of the overlay onto frame pixels.

use image::RgbaImage;

use crate::frame::FrameBuffer;

/// Blend `overlay` onto the frame with its top-left corner at
/// (`dst_x`, `dst_y`), clipping to the frame bounds.
///
/// Effective source alpha is `overlay alpha x opacity`, rounded. Pixels whose
/// effective alpha is 0 leave the destination byte-for-byte untouched; for
/// the rest, each color channel is blended with `+127` integer rounding and
/// the destination alpha is forced fully opaque. The overlay is RGBA while
/// the frame is BGRA-ordered, so red and blue swap on write.
///
/// No-op when the overlay is empty or lies fully off-frame. Mutates the
/// destination in place; never reallocates it.
pub fn blend_overlay(
    frame: &mut FrameBuffer<'_>,
    overlay: &RgbaImage,
    dst_x: i32,
    dst_y: i32,
    opacity: f32,
) {
    let (ow, oh) = overlay.dimensions();
    if ow == 0 || oh == 0 {
        return;
    }

    let fw = i64::from(frame.width());
    let fh = i64::from(frame.height());
    let (dst_x, dst_y) = (i64::from(dst_x), i64::from(dst_y));

    let start_x = dst_x.max(0);
    let start_y = dst_y.max(0);
    let end_x = (dst_x + i64::from(ow)).min(fw);
    let end_y = (dst_y + i64::from(oh)).min(fh);
    if start_x >= end_x || start_y >= end_y {
        return;
    }

    let stride = frame.stride();
    let data = frame.data_mut();
    let src = overlay.as_raw();
    let src_stride = ow as usize * 4;

    for fy in start_y..end_y {
        let oy = (fy - dst_y) as usize;
        let src_row = &src[oy * src_stride..][..src_stride];
        let dst_row = &mut data[fy as usize * stride..][..stride];

        for fx in start_x..end_x {
            let ox = (fx - dst_x) as usize;
            let s = &src_row[ox * 4..][..4];

            let eff = ((f32::from(s[3]) * opacity + 0.5) as u32).min(255);
            if eff == 0 {
                continue;
            }
            let inv = 255 - eff;

            let d = &mut dst_row[fx as usize * 4..][..4];
            d[0] = ((u32::from(s[2]) * eff + u32::from(d[0]) * inv + 127) / 255) as u8;
            d[1] = ((u32::from(s[1]) * eff + u32::from(d[1]) * inv + 127) / 255) as u8;
            d[2] = ((u32::from(s[0]) * eff + u32::from(d[2]) * inv + 127) / 255) as u8;
            d[3] = 255;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PixelFormat;
    use image::Rgba;
    use imageproc::rgba_image;

    const STRIDE_PAD: usize = 8;

    fn frame_bytes(width: u32, height: u32, fill: [u8; 4]) -> (Vec<u8>, usize) {
        let stride = width as usize * 4 + STRIDE_PAD;
        let mut data = vec![0xEE; stride * height as usize];
        for y in 0..height as usize {
            for x in 0..width as usize {
                data[y * stride + x * 4..][..4].copy_from_slice(&fill);
            }
        }
        (data, stride)
    }

    #[test]
    fn clips_to_right_edge() {
        let (mut data, stride) = frame_bytes(10, 10, [0, 0, 0, 255]);
        let reference = data.clone();
        let mut frame = FrameBuffer::from_raw(&mut data, 10, 10, stride, PixelFormat::Bgra).unwrap();
        let overlay = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));

        // One visible column at x = 9.
        blend_overlay(&mut frame, &overlay, 9, 0, 1.0);

        for y in 0..10usize {
            for x in 0..10usize {
                let px = &data[y * stride + x * 4..][..4];
                if x == 9 {
                    assert_eq!(px, &[255, 255, 255, 255], "({x},{y}) should be blended");
                } else {
                    assert_eq!(px, &reference[y * stride + x * 4..][..4], "({x},{y}) must be untouched");
                }
            }
            // Row padding is never written.
            assert_eq!(&data[y * stride + 40..][..STRIDE_PAD], &reference[y * stride + 40..][..STRIDE_PAD]);
        }
    }

    #[test]
    fn fully_off_frame_is_a_no_op() {
        let (mut data, stride) = frame_bytes(10, 10, [1, 2, 3, 255]);
        let reference = data.clone();
        let mut frame = FrameBuffer::from_raw(&mut data, 10, 10, stride, PixelFormat::Bgra).unwrap();
        let overlay = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));

        blend_overlay(&mut frame, &overlay, -4, 0, 1.0);
        blend_overlay(&mut frame, &overlay, 0, 10, 1.0);
        blend_overlay(&mut frame, &overlay, 10, 10, 1.0);
        assert_eq!(data, reference);
    }

    #[test]
    fn empty_overlay_is_a_no_op() {
        let (mut data, stride) = frame_bytes(4, 4, [1, 2, 3, 255]);
        let reference = data.clone();
        let mut frame = FrameBuffer::from_raw(&mut data, 4, 4, stride, PixelFormat::Bgra).unwrap();
        let overlay = RgbaImage::new(0, 0);

        blend_overlay(&mut frame, &overlay, 0, 0, 1.0);
        assert_eq!(data, reference);
    }

    #[test]
    fn zero_effective_alpha_leaves_destination_untouched() {
        let (mut data, stride) = frame_bytes(4, 4, [9, 8, 7, 6]);
        let reference = data.clone();
        let mut frame = FrameBuffer::from_raw(&mut data, 4, 4, stride, PixelFormat::Bgra).unwrap();

        // Transparent source pixels at full opacity.
        let overlay = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 0]));
        blend_overlay(&mut frame, &overlay, 0, 0, 1.0);
        assert_eq!(data, reference);

        // Opaque source pixels at zero opacity.
        let mut frame = FrameBuffer::from_raw(&mut data, 4, 4, stride, PixelFormat::Bgra).unwrap();
        let overlay = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        blend_overlay(&mut frame, &overlay, 0, 0, 0.0);
        assert_eq!(data, reference);
    }

    #[test]
    fn half_opacity_uses_specified_rounding() {
        let (mut data, stride) = frame_bytes(1, 1, [40, 60, 80, 10]);
        let mut frame = FrameBuffer::from_raw(&mut data, 1, 1, stride, PixelFormat::Bgra).unwrap();
        // RGBA source (200, 100, 50, 255): eff = round(255 * 0.5) = 128.
        let overlay = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 50, 255]));

        blend_overlay(&mut frame, &overlay, 0, 0, 0.5);

        let blend = |s: u32, d: u32| ((s * 128 + d * 127 + 127) / 255) as u8;
        // Destination is BGRA: B blends with source blue, R with source red.
        assert_eq!(data[0], blend(50, 40));
        assert_eq!(data[1], blend(100, 60));
        assert_eq!(data[2], blend(200, 80));
        assert_eq!(data[3], 255, "destination alpha is forced opaque");
    }

    #[test]
    fn partial_alpha_pixels_blend_individually() {
        let (mut data, stride) = frame_bytes(2, 1, [0, 0, 0, 255]);
        let mut frame = FrameBuffer::from_raw(&mut data, 2, 1, stride, PixelFormat::Bgra).unwrap();
        let overlay = rgba_image!(
            [255, 255, 255, 0], [255, 255, 255, 255]);

        blend_overlay(&mut frame, &overlay, 0, 0, 1.0);

        assert_eq!(&data[0..4], &[0, 0, 0, 255], "alpha-0 pixel untouched");
        assert_eq!(&data[4..8], &[255, 255, 255, 255]);
    }

    #[test]
    fn negative_offsets_clip_on_the_top_left() {
        let (mut data, stride) = frame_bytes(4, 4, [0, 0, 0, 255]);
        let mut frame = FrameBuffer::from_raw(&mut data, 4, 4, stride, PixelFormat::Bgra).unwrap();
        let overlay = RgbaImage::from_pixel(3, 3, Rgba([10, 20, 30, 255]));

        blend_overlay(&mut frame, &overlay, -2, -2, 1.0);

        // Only the 1x1 bottom-right corner of the overlay lands on (0, 0).
        assert_eq!(&data[0..4], &[30, 20, 10, 255]);
        assert_eq!(&data[4..8], &[0, 0, 0, 255]);
        assert_eq!(&data[stride..stride + 4], &[0, 0, 0, 255]);
    }
}
