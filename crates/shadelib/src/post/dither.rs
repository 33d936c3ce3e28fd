use nodegraph::{int, lookup, resolution, splat, GraphError, Node, Table, ValueType};
use serde::Deserialize;

use super::{effect_uv, rgba};

/// Ordered-dither thresholds, row-major, in [0, 1).
#[rustfmt::skip]
pub static BAYER_8X8: [f32; 64] = [
    0.0 / 64.0, 48.0 / 64.0, 12.0 / 64.0, 60.0 / 64.0, 3.0 / 64.0, 51.0 / 64.0, 15.0 / 64.0, 63.0 / 64.0,
    32.0 / 64.0, 16.0 / 64.0, 44.0 / 64.0, 28.0 / 64.0, 35.0 / 64.0, 19.0 / 64.0, 47.0 / 64.0, 31.0 / 64.0,
    8.0 / 64.0, 56.0 / 64.0, 4.0 / 64.0, 52.0 / 64.0, 11.0 / 64.0, 59.0 / 64.0, 7.0 / 64.0, 55.0 / 64.0,
    40.0 / 64.0, 24.0 / 64.0, 36.0 / 64.0, 20.0 / 64.0, 43.0 / 64.0, 27.0 / 64.0, 39.0 / 64.0, 23.0 / 64.0,
    2.0 / 64.0, 50.0 / 64.0, 14.0 / 64.0, 62.0 / 64.0, 1.0 / 64.0, 49.0 / 64.0, 13.0 / 64.0, 61.0 / 64.0,
    34.0 / 64.0, 18.0 / 64.0, 46.0 / 64.0, 30.0 / 64.0, 33.0 / 64.0, 17.0 / 64.0, 45.0 / 64.0, 29.0 / 64.0,
    10.0 / 64.0, 58.0 / 64.0, 6.0 / 64.0, 54.0 / 64.0, 9.0 / 64.0, 57.0 / 64.0, 5.0 / 64.0, 53.0 / 64.0,
    42.0 / 64.0, 26.0 / 64.0, 38.0 / 64.0, 22.0 / 64.0, 41.0 / 64.0, 25.0 / 64.0, 37.0 / 64.0, 21.0 / 64.0,
];

const LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DitherConfig {
    /// Screen pixels per dither cell.
    pub pixel_size: f32,
    /// Quantisation level count; each channel snaps to multiples of
    /// `1 / (color_threshold - 1)`.
    pub color_threshold: f32,
    /// Subtracted from every threshold.
    pub bias: f32,
    /// When set, the result is dithered luminance tinted by this colour.
    pub color: Option<[f32; 3]>,
    #[serde(skip)]
    pub input_uv: Option<Node>,
}

impl Default for DitherConfig {
    fn default() -> Self {
        Self {
            pixel_size: 2.0,
            color_threshold: 0.35,
            bias: 0.25,
            color: None,
            input_uv: None,
        }
    }
}

/// 8x8 Bayer ordered dither. Alpha passes through untouched.
pub fn dither(input: &Node, config: &DitherConfig) -> Result<Node, GraphError> {
    let color = rgba(input, "dither")?;
    let coord = effect_uv(&config.input_uv, "dither")?;
    let table = Table::from_static(&BAYER_8X8, ValueType::Float)?;

    let cells = resolution() / config.pixel_size;
    let x = (coord.x() * cells.x()).to_int() % int(8);
    let y = (coord.y() * cells.y()).to_int() % int(8);
    let threshold = lookup(&table, (y * int(8) + x).to_float()) - config.bias;

    let rgb = color.xyz();
    let source = match config.color {
        Some(_) => splat(ValueType::Vec3, rgb.dot(LUMA)),
        None => rgb,
    };
    let steps = config.color_threshold - 1.0;
    let quantised = ((source + threshold) * steps + 0.5).floor() / steps;
    let tinted = match config.color {
        Some(tint) => quantised * tint,
        None => quantised,
    };
    Ok(tinted.extend(color.w()))
}
