/// Rounded `x * y / 255` for 8-bit operands.
pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Clamp a signed intermediate into the channel range.
pub(crate) fn clamp_u8(v: i64) -> u8 {
    v.clamp(0, 255) as u8
}

/// Scale an 8-bit alpha by an opacity factor in `[0, 1]`, rounding to nearest.
pub(crate) fn scale_alpha(alpha: u8, opacity: f32) -> u8 {
    let opacity = if opacity.is_nan() {
        0.0
    } else {
        opacity.clamp(0.0, 1.0)
    };
    (f32::from(alpha) * opacity).round().clamp(0.0, 255.0) as u8
}

/// Opacity in 0..=255 as a `[0, 1]` factor.
pub(crate) fn opacity_factor(opacity: u8) -> f32 {
    f32::from(opacity) / 255.0
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
