//! Per-channel blend formulas on straight 8-bit channel values.
//!
//! `a` is always the base (canvas) channel and `b` the top (layer) channel. Every formula works
//! in integer arithmetic with truncating division, widening to `i64` so intermediates never
//! wrap; results are clamped into `[0, 255]`.

use crate::blend::mode::BlendMode;
use crate::foundation::math::clamp_u8;

/// Channel kernel signature.
pub type ChannelFn = fn(u8, u8) -> u8;

/// Select the kernel for `mode`.
///
/// Callers pick the kernel once per layer, outside the pixel loop.
pub fn channel_fn(mode: BlendMode) -> ChannelFn {
    match mode {
        BlendMode::Normal | BlendMode::PassThrough => normal,
        BlendMode::Multiply => multiply,
        BlendMode::Screen => screen,
        BlendMode::Darken => darken,
        BlendMode::Lighten => lighten,
        BlendMode::Overlay => overlay,
        BlendMode::SoftLight => soft_light,
        BlendMode::HardLight => hard_light,
        BlendMode::ColorDodge => color_dodge,
        BlendMode::ColorBurn => color_burn,
    }
}

/// Blend a single channel.
pub fn blend_channel(mode: BlendMode, a: u8, b: u8) -> u8 {
    channel_fn(mode)(a, b)
}

/// Blend the RGB part of two pixels; alpha is the compositor's business.
pub fn blend_rgb(mode: BlendMode, base: [u8; 3], top: [u8; 3]) -> [u8; 3] {
    let f = channel_fn(mode);
    [f(base[0], top[0]), f(base[1], top[1]), f(base[2], top[2])]
}

fn normal(_a: u8, b: u8) -> u8 {
    b
}

fn multiply(a: u8, b: u8) -> u8 {
    let (a, b) = widen(a, b);
    clamp_u8(a * b / 255)
}

fn screen(a: u8, b: u8) -> u8 {
    let (a, b) = widen(a, b);
    clamp_u8(255 - (255 - a) * (255 - b) / 255)
}

fn darken(a: u8, b: u8) -> u8 {
    a.min(b)
}

fn lighten(a: u8, b: u8) -> u8 {
    a.max(b)
}

fn overlay(a: u8, b: u8) -> u8 {
    let (a, b) = widen(a, b);
    if a > 128 {
        clamp_u8(255 - 2 * (255 - a) * (255 - b) / 255)
    } else {
        clamp_u8(2 * a * b / 255)
    }
}

fn soft_light(a: u8, b: u8) -> u8 {
    let (a, b) = widen(a, b);
    if b < 128 {
        clamp_u8(2 * a * b / 255 + (a * a / 255) * (255 - 2 * b) / 255)
    } else {
        // sqrt(a/255) * c == sqrt(a * 255 * c^2) / 255, floored exactly in integers.
        let c = 2 * b - 255;
        let radicand = (a * 255 * c * c) as u64;
        let root = radicand.isqrt() as i64;
        clamp_u8(2 * a * (255 - b) / 255 + root / 255)
    }
}

fn hard_light(a: u8, b: u8) -> u8 {
    let (a, b) = widen(a, b);
    if b < 128 {
        clamp_u8(2 * a * b / 255)
    } else {
        clamp_u8(255 - 2 * (255 - a) * (255 - b) / 255)
    }
}

fn color_dodge(a: u8, b: u8) -> u8 {
    if b == 255 {
        return 255;
    }
    let (a, b) = widen(a, b);
    clamp_u8((a * 255 / (255 - b)).min(255))
}

fn color_burn(a: u8, b: u8) -> u8 {
    if b == 0 {
        return 0;
    }
    let (a, b) = widen(a, b);
    clamp_u8(255 - ((255 - a) * 255 / b).min(255))
}

fn widen(a: u8, b: u8) -> (i64, i64) {
    (i64::from(a), i64::from(b))
}

#[cfg(test)]
#[path = "../../tests/unit/blend/algebra.rs"]
mod tests;
