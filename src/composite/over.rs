/// Straight (non-premultiplied) RGBA8 pixel.
pub type Rgba8 = [u8; 4];

/// Porter-Duff source-over on straight alpha.
///
/// `out_a = ta + ba*(1-ta)` and `out_c = (tc*ta + bc*ba*(1-ta)) / out_a`, evaluated in integers
/// with weights scaled by 255*255 and rounded to nearest. Where the result is fully transparent
/// the base pixel is returned untouched.
pub fn over(base: Rgba8, top: Rgba8) -> Rgba8 {
    let ta = u32::from(top[3]);
    if ta == 0 {
        return base;
    }
    if ta == 255 {
        return top;
    }

    let w_top = ta * 255;
    let w_base = u32::from(base[3]) * (255 - ta);
    let denom = w_top + w_base;

    let mut out = [0u8; 4];
    for i in 0..3 {
        let num = u32::from(top[i]) * w_top + u32::from(base[i]) * w_base;
        out[i] = ((num + denom / 2) / denom).min(255) as u8;
    }
    out[3] = ((denom + 127) / 255).min(255) as u8;
    out
}

#[cfg(test)]
#[path = "../../tests/unit/composite/over.rs"]
mod tests;
