use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::SoundjamError;

const NAMED: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("orange", [255, 165, 0]),
    ("purple", [128, 0, 128]),
    ("gray", [190, 190, 190]),
    ("grey", [190, 190, 190]),
];

/// Colour with straight alpha, every channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Rgba {
    pub const fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self::new(
            f64::from(red) / 255.0,
            f64::from(green) / 255.0,
            f64::from(blue) / 255.0,
            1.0,
        )
    }

    /// `#rrggbb` notation, alpha dropped.
    pub fn to_hex(&self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            to_byte(self.red),
            to_byte(self.green),
            to_byte(self.blue)
        )
    }

    /// Returns true when `value` is accepted by [`Rgba::from_str`].
    pub fn is_valid(value: &str) -> bool {
        value.parse::<Rgba>().is_ok()
    }
}

impl fmt::Display for Rgba {
    /// Formats as `rgb(..)` when opaque and `rgba(..)` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = (to_byte(self.red), to_byte(self.green), to_byte(self.blue));
        if self.alpha >= 1.0 {
            write!(f, "rgb({r},{g},{b})")
        } else {
            write!(f, "rgba({r},{g},{b},{})", self.alpha)
        }
    }
}

impl FromStr for Rgba {
    type Err = SoundjamError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim().to_ascii_lowercase();
        let parsed = if let Some(hex) = trimmed.strip_prefix('#') {
            parse_hex(hex)
        } else if let Some(args) = function_args(&trimmed, "rgba") {
            parse_components(args, true)
        } else if let Some(args) = function_args(&trimmed, "rgb") {
            parse_components(args, false)
        } else {
            NAMED
                .iter()
                .find(|(name, _)| *name == trimmed)
                .map(|(_, [r, g, b])| Rgba::from_rgb8(*r, *g, *b))
        };

        parsed.ok_or_else(|| SoundjamError::InvalidColor(value.to_string()))
    }
}

fn to_byte(channel: f64) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let short = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
    let long = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    let (r, g, b, a) = match hex.len() {
        3 => (short(0)?, short(1)?, short(2)?, 255),
        4 => (short(0)?, short(1)?, short(2)?, short(3)?),
        6 => (long(0)?, long(2)?, long(4)?, 255),
        8 => (long(0)?, long(2)?, long(4)?, long(6)?),
        _ => return None,
    };

    let mut color = Rgba::from_rgb8(r, g, b);
    color.alpha = f64::from(a) / 255.0;
    Some(color)
}

fn function_args<'a>(value: &'a str, name: &str) -> Option<&'a str> {
    value
        .strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_components(args: &str, with_alpha: bool) -> Option<Rgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }

    let red = parse_channel(parts[0])?;
    let green = parse_channel(parts[1])?;
    let blue = parse_channel(parts[2])?;
    let alpha = if with_alpha {
        let alpha: f64 = parts[3].parse().ok()?;
        if !alpha.is_finite() {
            return None;
        }
        alpha.clamp(0.0, 1.0)
    } else {
        1.0
    };

    Some(Rgba::new(red, green, blue, alpha))
}

fn parse_channel(part: &str) -> Option<f64> {
    let value = match part.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f64>().ok()? / 100.0,
        None => part.parse::<f64>().ok()? / 255.0,
    };
    value.is_finite().then(|| value.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: &str) -> Rgba {
        value.parse().unwrap()
    }

    #[test]
    fn parses_hex_notations() {
        assert_eq!(parse("#4a90d9"), Rgba::from_rgb8(0x4a, 0x90, 0xd9));
        assert_eq!(parse("#fff"), Rgba::from_rgb8(255, 255, 255));
        assert_eq!(parse("#ADADAD").to_hex(), "#adadad");

        let translucent = parse("#00000080");
        assert!((translucent.alpha - 128.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn parses_functional_notations() {
        assert_eq!(parse("rgb(255, 0, 0)"), Rgba::from_rgb8(255, 0, 0));
        assert_eq!(parse("rgba(0,0,255,0.5)").alpha, 0.5);
        assert_eq!(parse("rgb(100%, 0%, 0%)"), Rgba::from_rgb8(255, 0, 0));
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!(parse(" Orange "), Rgba::from_rgb8(255, 165, 0));
    }

    #[test]
    fn rejects_garbage() {
        for junk in ["", "#12", "#ggg", "rgb(1,2)", "rgba(1,2,3)", "not-a-colour", "rgb(a,b,c)"] {
            assert!(!Rgba::is_valid(junk), "{junk} should be rejected");
        }

        let err = "nope".parse::<Rgba>().unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn rejects_non_finite_alpha() {
        for junk in ["rgba(0,0,0,nan)", "rgba(0, 0, 0, NaN)", "rgba(0,0,0,inf)"] {
            assert!(!Rgba::is_valid(junk), "{junk} should be rejected");
        }
        assert_eq!(parse("rgba(0,0,0,2)").alpha, 1.0);
    }

    #[test]
    fn display_matches_css_functions() {
        assert_eq!(parse("#ff0000").to_string(), "rgb(255,0,0)");
        assert_eq!(parse("rgba(0,0,0,0.25)").to_string(), "rgba(0,0,0,0.25)");
    }
}
