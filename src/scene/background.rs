use serde::{Deserialize, Serialize};

use crate::assets::color::ColorDef;
use crate::assets::source::AssetRef;
use crate::foundation::error::{LoveNotesError, LoveNotesResult};

/// The card background. Exactly one variant is active.
///
/// Persisted as the CSS-like expression the editor uses: a color, a `linear-gradient(...)`, or
/// `url(...)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Background {
    /// Solid fill.
    Color(ColorDef),
    /// Linear gradient fill over the whole canvas.
    LinearGradient(LinearGradient),
    /// Image stretched to the full canvas (no aspect preservation).
    Image(AssetRef),
}

impl Default for Background {
    fn default() -> Self {
        Self::Color(ColorDef::rgba(1.0, 1.0, 1.0, 1.0))
    }
}

/// A CSS-style linear gradient.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient {
    /// Gradient line direction.
    pub direction: GradientDirection,
    /// At least two stops, in order.
    pub stops: Vec<ColorStop>,
}

/// Color at an optional position along the gradient line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    /// Stop color.
    pub color: ColorDef,
    /// Position in `0..1`; `None` means evenly spaced between neighbors.
    pub position: Option<f64>,
}

/// Horizontal side keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HSide {
    /// `left`
    Left,
    /// `right`
    Right,
}

/// Vertical side keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VSide {
    /// `top`
    Top,
    /// `bottom`
    Bottom,
}

/// Direction of the gradient line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradientDirection {
    /// Degrees clockwise from "to top".
    Angle(f64),
    /// `to <side>` or `to <corner>`; at least one side is set.
    To {
        /// Horizontal side, if any.
        h: Option<HSide>,
        /// Vertical side, if any.
        v: Option<VSide>,
    },
}

impl GradientDirection {
    /// Angle in degrees for a box of `w × h`; corners depend on the aspect ratio.
    pub fn angle_deg(self, w: f64, h: f64) -> f64 {
        match self {
            Self::Angle(a) => a,
            Self::To { h: hs, v: vs } => {
                let sx = match hs {
                    Some(HSide::Left) => -1.0,
                    Some(HSide::Right) => 1.0,
                    None => 0.0,
                };
                let sy = match vs {
                    Some(VSide::Top) => -1.0,
                    Some(VSide::Bottom) => 1.0,
                    None => 0.0,
                };
                match (hs, vs) {
                    (Some(_), Some(_)) => (sx * h).atan2(-sy * w).to_degrees(),
                    _ => sx.atan2(-sy).to_degrees(),
                }
            }
        }
    }
}

impl LinearGradient {
    /// Stops with every position filled in and non-decreasing.
    pub fn resolved_stops(&self) -> Vec<(f64, ColorDef)> {
        let n = self.stops.len();
        let mut pos: Vec<Option<f64>> = self.stops.iter().map(|s| s.position).collect();
        if n == 0 {
            return Vec::new();
        }
        if pos[0].is_none() {
            pos[0] = Some(0.0);
        }
        if pos[n - 1].is_none() {
            pos[n - 1] = Some(1.0);
        }
        let mut max_so_far = f64::NEG_INFINITY;
        for p in pos.iter_mut().flatten() {
            max_so_far = max_so_far.max(*p);
            *p = max_so_far;
        }

        let mut i = 0;
        while i < n {
            if pos[i].is_some() {
                i += 1;
                continue;
            }
            let start = i - 1;
            let mut end = i;
            while pos[end].is_none() {
                end += 1;
            }
            let (a, b) = (pos[start].unwrap_or(0.0), pos[end].unwrap_or(1.0));
            let span = (end - start) as f64;
            for (k, slot) in pos.iter_mut().enumerate().take(end).skip(start + 1) {
                *slot = Some(a + (b - a) * ((k - start) as f64) / span);
            }
            i = end;
        }

        pos.into_iter()
            .zip(self.stops.iter())
            .map(|(p, s)| (p.unwrap_or(0.0), s.color))
            .collect()
    }

    /// Color at gradient parameter `t`, clamped to the end stops.
    pub fn color_at(stops: &[(f64, ColorDef)], t: f64) -> ColorDef {
        let Some(first) = stops.first() else {
            return ColorDef::rgba(0.0, 0.0, 0.0, 0.0);
        };
        if t <= first.0 {
            return first.1;
        }
        for w in stops.windows(2) {
            let (p0, c0) = w[0];
            let (p1, c1) = w[1];
            if t <= p1 {
                if p1 - p0 <= f64::EPSILON {
                    return c1;
                }
                return c0.lerp(c1, (t - p0) / (p1 - p0));
            }
        }
        stops[stops.len() - 1].1
    }
}

impl Background {
    /// Parse a background expression.
    pub fn parse(expr: &str) -> LoveNotesResult<Self> {
        let s = expr.trim();
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("url(") {
            return parse_url(s).map(Self::Image);
        }
        if lower.starts_with("linear-gradient(") {
            return parse_linear_gradient(s).map(Self::LinearGradient);
        }
        ColorDef::parse_css(s).map(Self::Color)
    }

    /// Image background convenience.
    pub fn image(source: impl Into<AssetRef>) -> Self {
        Self::Image(source.into())
    }

    /// Canonical expression text.
    pub fn to_css(&self) -> String {
        match self {
            Self::Color(c) => color_to_css(*c),
            Self::Image(r) => format!("url({})", r.as_str()),
            Self::LinearGradient(g) => {
                let dir = match g.direction {
                    GradientDirection::Angle(a) => format!("{a}deg"),
                    GradientDirection::To { h, v } => {
                        let mut parts = vec!["to"];
                        if let Some(v) = v {
                            parts.push(match v {
                                VSide::Top => "top",
                                VSide::Bottom => "bottom",
                            });
                        }
                        if let Some(h) = h {
                            parts.push(match h {
                                HSide::Left => "left",
                                HSide::Right => "right",
                            });
                        }
                        parts.join(" ")
                    }
                };
                let stops = g.stops.iter().map(|s| match s.position {
                    Some(p) => format!("{} {}%", color_to_css(s.color), p * 100.0),
                    None => color_to_css(s.color),
                });
                let mut out = format!("linear-gradient({dir}");
                for s in stops {
                    out.push_str(", ");
                    out.push_str(&s);
                }
                out.push(')');
                out
            }
        }
    }

    /// Asset the rasterizer must resolve, if any.
    pub fn asset(&self) -> Option<&AssetRef> {
        match self {
            Self::Image(r) => Some(r),
            _ => None,
        }
    }
}

impl TryFrom<String> for Background {
    type Error = LoveNotesError;

    fn try_from(s: String) -> LoveNotesResult<Self> {
        Self::parse(&s)
    }
}

impl From<Background> for String {
    fn from(b: Background) -> Self {
        b.to_css()
    }
}

impl std::str::FromStr for Background {
    type Err = LoveNotesError;

    fn from_str(s: &str) -> LoveNotesResult<Self> {
        Self::parse(s)
    }
}

fn color_to_css(c: ColorDef) -> String {
    let [r, g, b, a] = c.to_rgba8();
    if a == 255 {
        format!("#{r:02x}{g:02x}{b:02x}")
    } else {
        format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

fn inner_args<'a>(s: &'a str, name_len: usize) -> LoveNotesResult<&'a str> {
    let rest = &s[name_len..];
    rest.strip_suffix(')')
        .ok_or_else(|| LoveNotesError::validation(format!("unterminated expression \"{s}\"")))
}

fn parse_url(s: &str) -> LoveNotesResult<AssetRef> {
    let inner = inner_args(s, "url(".len())?.trim();
    let inner = inner
        .strip_prefix('"')
        .and_then(|x| x.strip_suffix('"'))
        .or_else(|| inner.strip_prefix('\'').and_then(|x| x.strip_suffix('\'')))
        .unwrap_or(inner)
        .trim();
    if inner.is_empty() {
        return Err(LoveNotesError::validation("url() background is empty"));
    }
    Ok(AssetRef::new(inner))
}

/// Split on commas that are not nested inside parentheses.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                out.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(s[start..].trim());
    out
}

fn parse_direction(arg: &str) -> Option<LoveNotesResult<GradientDirection>> {
    let lower = arg.to_ascii_lowercase();
    if let Some(sides) = lower.strip_prefix("to ") {
        let mut h = None;
        let mut v = None;
        for word in sides.split_whitespace() {
            match word {
                "left" if h.is_none() => h = Some(HSide::Left),
                "right" if h.is_none() => h = Some(HSide::Right),
                "top" if v.is_none() => v = Some(VSide::Top),
                "bottom" if v.is_none() => v = Some(VSide::Bottom),
                _ => {
                    return Some(Err(LoveNotesError::validation(format!(
                        "invalid gradient direction \"{arg}\""
                    ))));
                }
            }
        }
        if h.is_none() && v.is_none() {
            return Some(Err(LoveNotesError::validation(
                "gradient direction needs a side",
            )));
        }
        return Some(Ok(GradientDirection::To { h, v }));
    }

    let units: [(&str, f64); 4] = [
        ("deg", 1.0),
        ("grad", 0.9),
        ("rad", 180.0 / std::f64::consts::PI),
        ("turn", 360.0),
    ];
    for (unit, factor) in units {
        if let Some(num) = lower.strip_suffix(unit) {
            // `grad` also ends in `rad`; the table order tries `grad` first.
            return Some(
                num.trim()
                    .parse::<f64>()
                    .map(|v| GradientDirection::Angle(v * factor))
                    .map_err(|_| {
                        LoveNotesError::validation(format!("invalid gradient angle \"{arg}\""))
                    }),
            );
        }
    }
    None
}

fn parse_stop(arg: &str) -> LoveNotesResult<ColorStop> {
    if let Some((color, pos)) = arg.rsplit_once(char::is_whitespace)
        && let Some(pct) = pos.trim().strip_suffix('%')
    {
        let p: f64 = pct
            .parse()
            .map_err(|_| LoveNotesError::validation(format!("invalid stop position \"{pos}\"")))?;
        return Ok(ColorStop {
            color: ColorDef::parse_css(color)?,
            position: Some((p / 100.0).clamp(0.0, 1.0)),
        });
    }
    Ok(ColorStop {
        color: ColorDef::parse_css(arg)?,
        position: None,
    })
}

fn parse_linear_gradient(s: &str) -> LoveNotesResult<LinearGradient> {
    let inner = inner_args(s, "linear-gradient(".len())?;
    let mut args = split_top_level(inner);
    if args.iter().any(|a| a.is_empty()) {
        return Err(LoveNotesError::validation("empty gradient argument"));
    }

    let direction = match args.first().and_then(|a| parse_direction(a)) {
        Some(dir) => {
            args.remove(0);
            dir?
        }
        None => GradientDirection::To {
            h: None,
            v: Some(VSide::Bottom),
        },
    };

    let stops = args
        .into_iter()
        .map(parse_stop)
        .collect::<LoveNotesResult<Vec<_>>>()?;
    if stops.len() < 2 {
        return Err(LoveNotesError::validation(
            "linear-gradient needs at least two color stops",
        ));
    }
    Ok(LinearGradient { direction, stops })
}

#[cfg(test)]
#[path = "../../tests/unit/scene/background.rs"]
mod tests;
