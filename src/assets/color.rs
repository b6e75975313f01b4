use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{LoveNotesError, LoveNotesResult};

/// Straight-alpha color with normalized `0..1` channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorDef {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
    /// Alpha.
    pub a: f64,
}

impl ColorDef {
    /// Opaque black, the canvas default fill.
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    /// Build from normalized channels.
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a CSS color expression.
    ///
    /// Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()/rgba()`, `hsl()/hsla()` and a set of
    /// common named colors.
    pub fn parse_css(s: &str) -> LoveNotesResult<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).map_err(LoveNotesError::validation);
        }
        let lower = s.to_ascii_lowercase();
        if let Some(args) = function_args(&lower, &["rgba", "rgb"]) {
            return parse_rgb_args(args).map_err(LoveNotesError::validation);
        }
        if let Some(args) = function_args(&lower, &["hsla", "hsl"]) {
            return parse_hsl_args(args).map_err(LoveNotesError::validation);
        }
        named(&lower).ok_or_else(|| LoveNotesError::validation(format!("unknown color \"{s}\"")))
    }

    /// Straight-alpha RGBA8.
    pub fn to_rgba8(self) -> [u8; 4] {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }

    /// Premultiplied RGBA8, the pixmap byte layout.
    pub fn to_rgba8_premul(self) -> Rgba8Premul {
        let [r, g, b, a] = self.to_rgba8();
        Rgba8Premul::from_straight_rgba(r, g, b, a)
    }

    /// Linear interpolation in straight-alpha space.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self::rgba(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

fn function_args<'a>(s: &'a str, names: &[&str]) -> Option<&'a str> {
    for name in names {
        if let Some(rest) = s.strip_prefix(name) {
            let rest = rest.trim_start();
            if let Some(inner) = rest.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
                return Some(inner);
            }
        }
    }
    None
}

fn split_args(args: &str) -> Vec<&str> {
    // Both `rgb(1, 2, 3)` and `rgb(1 2 3 / 0.5)` are accepted.
    args.split([',', '/', ' '])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

fn parse_channel(part: &str) -> Result<f64, String> {
    if let Some(pct) = part.strip_suffix('%') {
        let v: f64 = pct.parse().map_err(|_| format!("invalid channel \"{part}\""))?;
        return Ok((v / 100.0).clamp(0.0, 1.0));
    }
    let v: f64 = part.parse().map_err(|_| format!("invalid channel \"{part}\""))?;
    Ok((v / 255.0).clamp(0.0, 1.0))
}

fn parse_alpha(part: &str) -> Result<f64, String> {
    if let Some(pct) = part.strip_suffix('%') {
        let v: f64 = pct.parse().map_err(|_| format!("invalid alpha \"{part}\""))?;
        return Ok((v / 100.0).clamp(0.0, 1.0));
    }
    let v: f64 = part.parse().map_err(|_| format!("invalid alpha \"{part}\""))?;
    Ok(v.clamp(0.0, 1.0))
}

fn parse_rgb_args(args: &str) -> Result<ColorDef, String> {
    let parts = split_args(args);
    match parts.as_slice() {
        [r, g, b] => Ok(ColorDef::rgba(
            parse_channel(r)?,
            parse_channel(g)?,
            parse_channel(b)?,
            1.0,
        )),
        [r, g, b, a] => Ok(ColorDef::rgba(
            parse_channel(r)?,
            parse_channel(g)?,
            parse_channel(b)?,
            parse_alpha(a)?,
        )),
        _ => Err("rgb() expects 3 or 4 components".to_owned()),
    }
}

fn parse_hsl_args(args: &str) -> Result<ColorDef, String> {
    let parts = split_args(args);
    let (h, s, l, a) = match parts.as_slice() {
        [h, s, l] => (*h, *s, *l, None),
        [h, s, l, a] => (*h, *s, *l, Some(*a)),
        _ => return Err("hsl() expects 3 or 4 components".to_owned()),
    };
    let h: f64 = h
        .trim_end_matches("deg")
        .parse()
        .map_err(|_| format!("invalid hue \"{h}\""))?;
    let pct = |p: &str| -> Result<f64, String> {
        let v: f64 = p
            .trim_end_matches('%')
            .parse()
            .map_err(|_| format!("invalid percentage \"{p}\""))?;
        Ok(v / 100.0)
    };
    let a = match a {
        Some(a) => parse_alpha(a)?,
        None => 1.0,
    };
    Ok(hsla_to_rgba(h, pct(s)?, pct(l)?, a))
}

fn parse_hex(s: &str) -> Result<ColorDef, String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }
    fn hex_nibble(c: &str) -> Result<u8, String> {
        let v = u8::from_str_radix(c, 16).map_err(|_| format!("invalid hex digit \"{c}\""))?;
        Ok(v * 17)
    }

    if !s.is_ascii() {
        return Err("hex color must be ascii".to_owned());
    }

    let (r, g, b, a) = match s.len() {
        3 | 4 => {
            let r = hex_nibble(&s[0..1])?;
            let g = hex_nibble(&s[1..2])?;
            let b = hex_nibble(&s[2..3])?;
            let a = if s.len() == 4 {
                hex_nibble(&s[3..4])?
            } else {
                255
            };
            (r, g, b, a)
        }
        6 | 8 => {
            let r = hex_byte(&s[0..2])?;
            let g = hex_byte(&s[2..4])?;
            let b = hex_byte(&s[4..6])?;
            let a = if s.len() == 8 {
                hex_byte(&s[6..8])?
            } else {
                255
            };
            (r, g, b, a)
        }
        _ => {
            return Err("hex color must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA".to_owned());
        }
    };

    Ok(ColorDef::rgba(
        (r as f64) / 255.0,
        (g as f64) / 255.0,
        (b as f64) / 255.0,
        (a as f64) / 255.0,
    ))
}

fn named(s: &str) -> Option<ColorDef> {
    let rgb = |r: u8, g: u8, b: u8| {
        ColorDef::rgba(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            1.0,
        )
    };
    Some(match s {
        "transparent" => ColorDef::rgba(0.0, 0.0, 0.0, 0.0),
        "black" => rgb(0, 0, 0),
        "white" => rgb(255, 255, 255),
        "red" => rgb(255, 0, 0),
        "green" => rgb(0, 128, 0),
        "blue" => rgb(0, 0, 255),
        "yellow" => rgb(255, 255, 0),
        "orange" => rgb(255, 165, 0),
        "purple" => rgb(128, 0, 128),
        "gray" | "grey" => rgb(128, 128, 128),
        "pink" => rgb(255, 192, 203),
        "lightpink" => rgb(255, 182, 193),
        "hotpink" => rgb(255, 105, 180),
        "deeppink" => rgb(255, 20, 147),
        "crimson" => rgb(220, 20, 60),
        "maroon" => rgb(128, 0, 0),
        "gold" => rgb(255, 215, 0),
        "lavender" => rgb(230, 230, 250),
        "ivory" => rgb(255, 255, 240),
        "beige" => rgb(245, 245, 220),
        "salmon" => rgb(250, 128, 114),
        "coral" => rgb(255, 127, 80),
        _ => return None,
    })
}

fn hsla_to_rgba(h: f64, s: f64, l: f64, a: f64) -> ColorDef {
    // Standard HSL -> RGB conversion (sRGB space, normalized 0..1 inputs).
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return ColorDef::rgba(l, l, l, a);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);
    ColorDef::rgba(r, g, b, a)
}
