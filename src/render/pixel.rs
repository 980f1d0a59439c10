use crate::foundation::core::PremulRgba8;
use crate::foundation::error::{FrameIdError, FrameIdResult};

/// Source-over for premultiplied pixels.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> FrameIdResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(FrameIdError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

pub fn premultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        for c in &mut px[..3] {
            *c = mul_div255(u16::from(*c), a);
        }
    }
}

pub fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

/// Bilinear sample of a premultiplied buffer.
///
/// `x`/`y` are in pixel-index space (pixel centers at integers) and are clamped to
/// `[min, max]` so samples never pull from outside the allowed source window.
pub fn sample_bilinear(
    data: &[u8],
    width: u32,
    x: f64,
    y: f64,
    min: (u32, u32),
    max: (u32, u32),
) -> PremulRgba8 {
    let x = x.clamp(f64::from(min.0), f64::from(max.0));
    let y = y.clamp(f64::from(min.1), f64::from(max.1));

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(max.0);
    let y1 = (y0 + 1).min(max.1);
    let fx = x - f64::from(x0);
    let fy = y - f64::from(y0);

    let at = |px: u32, py: u32| {
        let idx = ((py as usize) * (width as usize) + (px as usize)) * 4;
        [data[idx], data[idx + 1], data[idx + 2], data[idx + 3]]
    };
    let (p00, p10, p01, p11) = (at(x0, y0), at(x1, y0), at(x0, y1), at(x1, y1));

    let mut out = [0u8; 4];
    for i in 0..4 {
        let top = f64::from(p00[i]) * (1.0 - fx) + f64::from(p10[i]) * fx;
        let bottom = f64::from(p01[i]) * (1.0 - fx) + f64::from(p11[i]) * fx;
        out[i] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    // Keep the premultiplied invariant (color <= alpha) after rounding.
    for i in 0..3 {
        out[i] = out[i].min(out[3]);
    }
    out
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/pixel.rs"]
mod tests;
