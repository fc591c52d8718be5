use crate::processing::ScaledImage;

/// Pack an RGBA pixel into softbuffer's `0RGB` word.
fn pack_rgb([r, g, b, _]: [u8; 4]) -> u32 {
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// Fill `buffer` (row-major, `width` x `height`) with black and blit `image`
/// at its offset. Anything outside the frame is clipped.
pub fn compose_frame(image: &ScaledImage, width: u32, height: u32, buffer: &mut [u32]) {
    buffer.fill(0);

    let frame_w = width as usize;
    let frame_h = height as usize;
    let x0 = image.offset_x as usize;
    let y0 = image.offset_y as usize;
    if x0 >= frame_w || y0 >= frame_h {
        return;
    }
    let cols = (image.pixels.width() as usize).min(frame_w - x0);
    let rows = (image.pixels.height() as usize).min(frame_h - y0);

    for row in 0..rows {
        let dst_start = (y0 + row) * frame_w + x0;
        let Some(dst) = buffer.get_mut(dst_start..dst_start + cols) else {
            return;
        };
        for (col, out) in dst.iter_mut().enumerate() {
            *out = pack_rgb(image.pixels.get_pixel(col as u32, row as u32).0);
        }
    }
}
