//! Built-in transforms and transform groups
//!
//! Names follow the `<kind>/<scheme>[/<variant>]` convention; `cti` refers
//! to the category / type / item structure of token paths.

use super::case;
use super::Transform;
use crate::config::PlatformConfig;
use crate::registry::Registry;
use crate::tokens::Token;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

const CTI_ATTRIBUTES: [&str; 5] = ["category", "type", "item", "subitem", "state"];
const DEFAULT_BASE_FONT_SIZE: f64 = 16.0;

static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)").expect("Valid regex pattern")
});

static COLOR_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(rgba?|hsla?)\(\s*([^)]*?)\s*\)\s*$").expect("Valid regex pattern")
});

static COLOR_ARGUMENT_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*[,/]\s*|\s+").expect("Valid regex pattern"));

/// CSS named colours accepted by the colour transforms.
const NAMED_COLORS: [(&str, [u8; 4]); 20] = [
    ("transparent", [0, 0, 0, 0]),
    ("black", [0, 0, 0, 255]),
    ("white", [255, 255, 255, 255]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 128, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("orange", [255, 165, 0, 255]),
    ("purple", [128, 0, 128, 255]),
    ("gray", [128, 128, 128, 255]),
    ("grey", [128, 128, 128, 255]),
    ("silver", [192, 192, 192, 255]),
    ("maroon", [128, 0, 0, 255]),
    ("olive", [128, 128, 0, 255]),
    ("lime", [0, 255, 0, 255]),
    ("navy", [0, 0, 128, 255]),
    ("teal", [0, 128, 128, 255]),
    ("aqua", [0, 255, 255, 255]),
    ("cyan", [0, 255, 255, 255]),
    ("fuchsia", [255, 0, 255, 255]),
];

/// Register every built-in transform and transform group.
pub fn register_defaults(registry: &mut Registry) {
    registry.register_transform(attribute_cti());
    registry.register_transform(name_transform("name/cti/camel", case::camel_case));
    registry.register_transform(name_transform("name/cti/kebab", case::kebab_case));
    registry.register_transform(name_transform("name/cti/snake", case::snake_case));
    registry.register_transform(name_transform("name/cti/constant", case::constant_case));
    registry.register_transform(name_transform("name/cti/pascal", case::pascal_case));

    registry.register_transform(size_with_unit("size/px", "px", 1.0, is_size));
    registry.register_transform(size_with_unit("size/rem", "rem", 1.0, is_size));
    registry.register_transform(
        Transform::value("size/remToPx", |token, platform| {
            let n = number(token)?;
            Ok(Value::String(format!("{}px", n * base_font_size(platform))))
        })
        .with_matcher(is_size),
    );
    registry.register_transform(
        Transform::value("size/remToDp", |token, platform| {
            let n = number(token)?;
            Ok(Value::String(format!("{}dp", n * base_font_size(platform))))
        })
        .with_matcher(|token| is_size(token) && token.attribute("type") != Some("font")),
    );
    registry.register_transform(
        Transform::value("size/remToSp", |token, platform| {
            let n = number(token)?;
            Ok(Value::String(format!("{}sp", n * base_font_size(platform))))
        })
        .with_matcher(|token| is_size(token) && token.attribute("type") == Some("font")),
    );

    registry.register_transform(
        Transform::value("color/hex", |token, _| {
            Ok(convert_color(token, |rgba| rgba.hex6()))
        })
        .with_matcher(is_color),
    );
    registry.register_transform(
        Transform::value("color/css", |token, _| {
            Ok(convert_color(token, |rgba| rgba.css()))
        })
        .with_matcher(is_color),
    );
    registry.register_transform(
        Transform::value("color/hex8android", |token, _| {
            Ok(convert_color(token, |rgba| rgba.hex8_alpha_first()))
        })
        .with_matcher(is_color),
    );

    registry.register_transform(
        Transform::value("content/quote", |token, _| {
            Ok(Value::String(format!("'{}'", token.value_string())))
        })
        .with_matcher(|token| token.attribute("category") == Some("content")),
    );
    registry.register_transform(
        Transform::value("time/seconds", |token, _| {
            let n = number(token)?;
            Ok(Value::String(format!("{:.2}s", n / 1000.0)))
        })
        .with_matcher(|token| token.attribute("category") == Some("time")),
    );

    let css = [
        "attribute/cti",
        "name/cti/kebab",
        "time/seconds",
        "size/rem",
        "color/css",
    ];
    registry.register_transform_group("web", ["attribute/cti", "name/cti/kebab", "size/px", "color/css"]);
    registry.register_transform_group("js", ["attribute/cti", "name/cti/pascal", "size/rem", "color/hex"]);
    registry.register_transform_group("css", css);
    registry.register_transform_group("scss", css);
    registry.register_transform_group("less", css);
    registry.register_transform_group(
        "android",
        [
            "attribute/cti",
            "name/cti/snake",
            "color/hex8android",
            "size/remToSp",
            "size/remToDp",
        ],
    );
}

/// Assigns `category`, `type`, `item`, `subitem` and `state` from the token
/// path. Attributes the token already carries are kept.
fn attribute_cti() -> Transform {
    Transform::attribute("attribute/cti", |token, _| {
        token
            .path
            .iter()
            .zip(CTI_ATTRIBUTES)
            .filter(|(_, key)| !token.attributes.contains_key(*key))
            .map(|(segment, key)| (key.to_string(), Value::String(segment.clone())))
            .collect::<Map<String, Value>>()
    })
}

fn name_transform(name: &str, convert: fn(&str) -> String) -> Transform {
    Transform::name(name, move |token, platform| {
        let mut parts: Vec<&str> = Vec::with_capacity(token.path.len() + 1);
        if let Some(prefix) = platform.prefix.as_deref() {
            parts.push(prefix);
        }
        parts.extend(token.path.iter().map(String::as_str));
        convert(&parts.join(" "))
    })
}

fn size_with_unit(
    name: &str,
    unit: &'static str,
    scale: f64,
    matcher: fn(&Token) -> bool,
) -> Transform {
    Transform::value(name, move |token, _| {
        let n = number(token)?;
        Ok(Value::String(format!("{}{unit}", n * scale)))
    })
    .with_matcher(matcher)
}

fn is_size(token: &Token) -> bool {
    token.attribute("category") == Some("size")
}

fn is_color(token: &Token) -> bool {
    token.attribute("category") == Some("color")
}

fn base_font_size(platform: &PlatformConfig) -> f64 {
    platform
        .options
        .get("basePxFontSize")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_BASE_FONT_SIZE)
}

/// Leading numeric part of the token value (`"1.5rem"` -> 1.5).
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(text) => LEADING_NUMBER
            .captures(text)
            .and_then(|captures| captures.get(1))
            .and_then(|m| m.as_str().parse().ok()),
        _ => None,
    }
}

fn number(token: &Token) -> std::result::Result<f64, String> {
    parse_number(&token.value).ok_or_else(|| format!("Invalid number: {}", token.value_string()))
}

/// Re-render a colour value. Values that are not a recognised colour (CSS
/// variables, `currentColor`, gradients) are passed through unchanged.
fn convert_color(token: &Token, render: impl Fn(&Rgba) -> String) -> Value {
    match Rgba::parse(&token.value_string()) {
        Some(rgba) => Value::String(render(&rgba)),
        None => {
            debug!(
                "Leaving colour of {} unchanged: {}",
                token.path_string(),
                token.value_string()
            );
            token.value.clone()
        }
    }
}

/// 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Parse hex, `rgb()`/`rgba()`, `hsl()`/`hsla()` (comma or space
    /// separated, optional `/ alpha`) or a named colour.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.starts_with('#') {
            return Self::parse_hex(input);
        }
        if let Some(captures) = COLOR_FUNCTION.captures(input) {
            let function = captures[1].to_ascii_lowercase();
            let arguments: Vec<&str> = COLOR_ARGUMENT_SEPARATOR
                .split(&captures[2])
                .filter(|argument| !argument.is_empty())
                .collect();
            return if function.starts_with("rgb") {
                Self::from_rgb_arguments(&arguments)
            } else {
                Self::from_hsl_arguments(&arguments)
            };
        }
        let lower = input.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, [r, g, b, a])| Self { r: *r, g: *g, b: *b, a: *a })
    }

    /// `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
    pub fn parse_hex(input: &str) -> Option<Self> {
        let hex = input.trim().strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let expanded: String = match hex.len() {
            3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 | 8 => hex.to_string(),
            _ => return None,
        };
        let channel = |index: usize| u8::from_str_radix(&expanded[index..index + 2], 16).ok();
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if expanded.len() == 8 { channel(6)? } else { 255 },
        })
    }

    fn from_rgb_arguments(arguments: &[&str]) -> Option<Self> {
        let (channels, alpha) = split_alpha(arguments)?;
        let channel = |text: &str| -> Option<u8> {
            let value = match text.strip_suffix('%') {
                Some(percent) => percent.parse::<f64>().ok()? / 100.0 * 255.0,
                None => text.parse::<f64>().ok()?,
            };
            Some(to_byte(value))
        };
        Some(Self {
            r: channel(channels[0])?,
            g: channel(channels[1])?,
            b: channel(channels[2])?,
            a: alpha,
        })
    }

    fn from_hsl_arguments(arguments: &[&str]) -> Option<Self> {
        let (channels, alpha) = split_alpha(arguments)?;
        let hue = channels[0].trim_end_matches("deg").parse::<f64>().ok()?;
        let fraction = |text: &str| -> Option<f64> {
            let percent = text.strip_suffix('%').unwrap_or(text).parse::<f64>().ok()?;
            Some((percent / 100.0).clamp(0.0, 1.0))
        };
        let saturation = fraction(channels[1])?;
        let lightness = fraction(channels[2])?;

        let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let sector = hue.rem_euclid(360.0) / 60.0;
        let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
        let (r, g, b) = match sector as u8 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = lightness - chroma / 2.0;
        Some(Self {
            r: to_byte((r + m) * 255.0),
            g: to_byte((g + m) * 255.0),
            b: to_byte((b + m) * 255.0),
            a: alpha,
        })
    }

    pub fn hex6(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn hex8_alpha_first(&self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.a, self.r, self.g, self.b)
    }

    /// Hex when opaque, `rgba()` otherwise.
    pub fn css(&self) -> String {
        if self.a == 255 {
            self.hex6()
        } else {
            let alpha = (f64::from(self.a) / 255.0 * 100.0).round() / 100.0;
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
        }
    }
}

/// Three colour channels plus the alpha byte (255 when omitted).
fn split_alpha<'a>(arguments: &[&'a str]) -> Option<([&'a str; 3], u8)> {
    let alpha = match arguments.len() {
        3 => 255,
        4 => {
            let text = arguments[3];
            let value = match text.strip_suffix('%') {
                Some(percent) => percent.parse::<f64>().ok()? / 100.0,
                None => text.parse::<f64>().ok()?,
            };
            to_byte(value.clamp(0.0, 1.0) * 255.0)
        }
        _ => return None,
    };
    Some(([arguments[0], arguments[1], arguments[2]], alpha))
}

fn to_byte(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
