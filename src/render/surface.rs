use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::foundation::math::{PremulRgba8, over};

/// Fill every pixel with one premultiplied color.
pub(crate) fn fill(dst: &mut FrameRGBA, color: PremulRgba8) {
    for px in dst.data.chunks_exact_mut(4) {
        px.copy_from_slice(&color);
    }
}

/// Composite `src` over `dst` with both at the same size.
pub(crate) fn draw_full(dst: &mut FrameRGBA, src: &FrameRGBA) -> DrapeResult<()> {
    if dst.width != src.width || dst.height != src.height || dst.data.len() != src.data.len() {
        return Err(DrapeError::render(
            "draw_full expects equal-size rgba8 buffers",
        ));
    }
    for (d, s) in dst.data.chunks_exact_mut(4).zip(src.data.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Composite a `src_w`x`src_h` premultiplied image over `dst` with its top-left at `(x, y)`.
///
/// Parts falling outside `dst` are clipped.
pub(crate) fn blit_over(
    dst: &mut FrameRGBA,
    src: &[u8],
    src_w: u32,
    src_h: u32,
    x: i64,
    y: i64,
) -> DrapeResult<()> {
    let expected = (src_w as usize)
        .checked_mul(src_h as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| DrapeError::render("blit buffer size overflow"))?;
    if src.len() != expected {
        return Err(DrapeError::render(
            "blit_over expects a buffer matching src_w*src_h*4",
        ));
    }

    let dw = i64::from(dst.width);
    let dh = i64::from(dst.height);
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + i64::from(src_w)).min(dw);
    let y1 = (y + i64::from(src_h)).min(dh);
    if x0 >= x1 || y0 >= y1 {
        return Ok(());
    }

    let row_bytes = ((x1 - x0) as usize) * 4;
    for dy in y0..y1 {
        let sy = (dy - y) as usize;
        let sx0 = (x0 - x) as usize;
        let s_start = (sy * src_w as usize + sx0) * 4;
        let src_row = &src[s_start..s_start + row_bytes];
        let d_start = ((dy as usize) * (dst.width as usize) + x0 as usize) * 4;
        for (d, s) in dst.data[d_start..d_start + row_bytes]
            .chunks_exact_mut(4)
            .zip(src_row.chunks_exact(4))
        {
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
            d.copy_from_slice(&out);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
