/*
MIT License

Copyright (c) 2021, 2022, 2024, 2025 Vincent Hiribarren

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

use anyhow::{Context, bail};

pub const COLOR_WHITE: [f32; 3] = [1.0, 1.0, 1.0];
pub const COLOR_RED: [f32; 3] = [1.0, 0.0, 0.0];
pub const COLOR_GREEN: [f32; 3] = [0.0, 1.0, 0.0];
pub const COLOR_BLUE: [f32; 3] = [0.0, 0.0, 1.0];

/// RGB color in the sRGB space, components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.077_399_38
    } else {
        (c * 0.947_867_3 + 0.052_132_703).powf(2.4)
    }
}

impl Color {
    pub const WHITE: Self = Self::from_hex(0xff_ff_ff);

    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self::from_rgb8([
            ((hex >> 16) & 0xff) as u8,
            ((hex >> 8) & 0xff) as u8,
            (hex & 0xff) as u8,
        ])
    }

    #[must_use]
    pub const fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self {
            r: rgb[0] as f32 / 255.0,
            g: rgb[1] as f32 / 255.0,
            b: rgb[2] as f32 / 255.0,
        }
    }

    /// Parses `#rrggbb`, `rgb(r, g, b)` with 0-255 components, or a few
    /// color names.
    pub fn parse(value: &str) -> anyhow::Result<Self> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            if hex.len() != 6 {
                bail!("Expected 6 hexadecimal digits in {value:?}");
            }
            let hex = u32::from_str_radix(hex, 16)
                .with_context(|| format!("Invalid hexadecimal color {value:?}"))?;
            return Ok(Self::from_hex(hex));
        }
        if let Some(components) = value
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let components = components
                .split(',')
                .map(|c| {
                    c.trim()
                        .parse::<u8>()
                        .with_context(|| format!("Invalid color component {c:?} in {value:?}"))
                })
                .collect::<anyhow::Result<Vec<u8>>>()?;
            let [r, g, b] = components[..] else {
                bail!("Expected 3 components in {value:?}");
            };
            return Ok(Self::from_rgb8([r, g, b]));
        }
        match value.to_ascii_lowercase().as_str() {
            "white" => Ok(Self::from_hex(0xff_ff_ff)),
            "black" => Ok(Self::from_hex(0x00_00_00)),
            "red" => Ok(Self::from_hex(0xff_00_00)),
            "lime" => Ok(Self::from_hex(0x00_ff_00)),
            "blue" => Ok(Self::from_hex(0x00_00_ff)),
            _ => bail!("Unsupported color {value:?}"),
        }
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_rgb8(&self) -> [u8; 3] {
        let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [to_u8(self.r), to_u8(self.g), to_u8(self.b)]
    }

    #[must_use]
    pub fn to_hex(&self) -> u32 {
        let [r, g, b] = self.to_rgb8();
        (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
    }

    /// Six lowercase hexadecimal digits, without a leading `#`.
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        format!("{:06x}", self.to_hex())
    }

    /// Components converted to linear light, as shaders expect them.
    #[must_use]
    pub fn to_linear(&self) -> [f32; 3] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        ]
    }

    #[must_use]
    pub fn to_linear_rgba(&self) -> [f32; 4] {
        let [r, g, b] = self.to_linear();
        [r, g, b, 1.0]
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn hex_round_trip_keeps_digits() {
        assert_eq!(Color::from_hex(0x00ff00).to_hex_string(), "00ff00");
        assert_eq!(Color::from_hex(0xfc7e01).to_hex(), 0xfc7e01);
    }

    #[test]
    fn parses_css_rgb_function() {
        let color = Color::parse("rgb(252, 126, 1)").expect("valid color");
        assert_eq!(color.to_rgb8(), [252, 126, 1]);
        assert_eq!(color.to_hex_string(), "fc7e01");
    }

    #[test]
    fn parses_hash_notation_and_names() {
        assert_eq!(
            Color::parse("#FC7E01").expect("valid color"),
            Color::from_hex(0xfc7e01)
        );
        assert_eq!(Color::parse("White").expect("valid color"), Color::WHITE);
    }

    #[test]
    fn rejects_malformed_colors() {
        assert!(Color::parse("rgb(252, 126)").is_err());
        assert!(Color::parse("rgb(300, 0, 0)").is_err());
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("hsl(0, 100%, 50%)").is_err());
    }

    #[test]
    fn linear_conversion_keeps_extremes() {
        let [r, g, b] = Color::from_hex(0x00ff00).to_linear();
        assert_abs_diff_eq!(r, 0.0);
        assert_abs_diff_eq!(g, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(b, 0.0);
        let mid = Color::from_rgb8([128, 128, 128]).to_linear();
        assert_abs_diff_eq!(mid[0], 0.2158, epsilon = 1e-3);
        assert_abs_diff_eq!(srgb_to_linear(0.02), 0.02 / 12.92, epsilon = 1e-6);
    }

    #[test]
    fn out_of_range_components_are_clamped_on_output() {
        let color = Color {
            r: 1.5,
            g: -0.2,
            b: 0.5,
        };
        assert_eq!(color.to_rgb8(), [255, 0, 128]);
    }
}
