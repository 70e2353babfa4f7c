//! Decorative backdrop: a bar visualizer with a scanning line, accent
//! strokes, two rotating rings and drifting dots.
//!
//! Everything here is a pure function of elapsed time. There is no state
//! to keep between frames, so a renderer can start, stop or skip at will.

use std::f32::consts::PI;
use std::time::Duration;

pub const BAR_COUNT: usize = 40;
pub const ACCENT_COUNT: usize = 6;
pub const DOT_COUNT: usize = 15;

const SCAN_PERIOD: f32 = 8.0;
const ACCENT_PERIOD: f32 = 3.0;
const ACCENT_STAGGER: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accent {
    /// Vertical offset as a fraction of the surface height.
    pub offset: f32,
    pub opacity: f32,
    pub scale_x: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ring {
    pub rotation_deg: f32,
    pub scale: f32,
}

/// One rendered instant. Positions and heights are normalized to `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub bars: Vec<f32>,
    pub scan_line: f32,
    pub accents: Vec<Accent>,
    pub rings: [Ring; 2],
    pub dots: Vec<(f32, f32)>,
}

/// Computes the backdrop at `elapsed` since the animation started.
pub fn frame_at(elapsed: Duration) -> Frame {
    let t = elapsed.as_secs_f32();

    let bars = (0..BAR_COUNT).map(|i| bar_height(i, t)).collect();

    let scan_line = keyframes(t / SCAN_PERIOD, 0.0, 1.0, linear);

    let accents = (0..ACCENT_COUNT)
        .map(|i| {
            let delay = i as f32 * ACCENT_STAGGER;
            let phase = if t < delay {
                0.0
            } else {
                (t - delay) / ACCENT_PERIOD
            };
            Accent {
                offset: (i + 1) as f32 * 0.15,
                opacity: keyframes(phase, 0.1, 0.3, ease_in_out),
                scale_x: keyframes(phase, 1.0, 1.2, ease_in_out),
            }
        })
        .collect();

    let rings = [
        Ring {
            rotation_deg: (t / 10.0).fract() * 360.0,
            scale: keyframes(t / 2.0, 1.0, 1.1, ease_in_out),
        },
        Ring {
            rotation_deg: -(t / 15.0).fract() * 360.0,
            scale: keyframes(t / 3.0, 1.0, 1.2, ease_in_out),
        },
    ];

    let dots = (0..DOT_COUNT).map(|i| dot_position(i, t)).collect();

    Frame {
        bars,
        scan_line,
        accents,
        rings,
        dots,
    }
}

/// Renders the bar row as block characters, resampled to `width` columns.
pub fn render_bars(frame: &Frame, width: usize) -> String {
    const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    if frame.bars.is_empty() {
        return String::new();
    }
    (0..width)
        .map(|col| {
            let idx = col * frame.bars.len() / width.max(1);
            let h = frame.bars[idx.min(frame.bars.len() - 1)].clamp(0.0, 1.0);
            let level = ((h * LEVELS.len() as f32) as usize).min(LEVELS.len() - 1);
            LEVELS[level]
        })
        .collect()
}

fn bar_height(i: usize, t: f32) -> f32 {
    let wave = (i as f32 * 0.5).sin();
    let low = 0.2 + wave * 0.1;
    let high = 0.6 + wave * 0.3;
    let period = 2.0 + jitter(i as u32, 0) * 2.0;
    keyframes(t / period, low, high, ease_in_out)
}

fn dot_position(i: usize, t: f32) -> (f32, f32) {
    let seed = i as u32;
    let from = (jitter(seed, 1), jitter(seed, 2));
    let to = (jitter(seed, 3), jitter(seed, 4));
    let period = 10.0 + jitter(seed, 5) * 20.0;
    let p = (t / period).fract();
    (lerp(from.0, to.0, p), lerp(from.1, to.1, p))
}

/// Three evenly spaced keyframes `low -> high -> low` over one cycle.
fn keyframes(phase: f32, low: f32, high: f32, ease: fn(f32) -> f32) -> f32 {
    let p = phase.rem_euclid(1.0);
    if p < 0.5 {
        lerp(low, high, ease(p * 2.0))
    } else {
        lerp(high, low, ease((p - 0.5) * 2.0))
    }
}

fn linear(p: f32) -> f32 {
    p
}

fn ease_in_out(p: f32) -> f32 {
    0.5 - 0.5 * (PI * p).cos()
}

fn lerp(a: f32, b: f32, p: f32) -> f32 {
    a + (b - a) * p
}

/// Stable pseudo-random value in `[0, 1)` for `(seed, salt)`.
/// Deterministic stand-in for random per-element timing so frames stay pure.
fn jitter(seed: u32, salt: u32) -> f32 {
    let mut x = seed.wrapping_mul(0x9E37_79B9) ^ salt.wrapping_mul(0x85EB_CA6B);
    x ^= x >> 16;
    x = x.wrapping_mul(0x7FEB_352D);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846C_A68B);
    x ^= x >> 16;
    (x >> 8) as f32 / (1u32 << 24) as f32
}
