use crate::foundation::{
    core::Rgba8,
    error::{CoverError, CoverResult},
};

/// Parse a CSS color value: hex, `rgb()`/`rgba()` or a named keyword.
pub fn parse_css_color(value: &str) -> CoverResult<Rgba8> {
    let s = value.trim();
    let lower = s.to_ascii_lowercase();

    let parsed = if let Some(hex) = lower.strip_prefix('#') {
        parse_hex(hex)
    } else if let Some(args) = functional_args(&lower, "rgba").or_else(|| functional_args(&lower, "rgb")) {
        parse_rgb_args(args)
    } else {
        named_color(&lower)
    };

    parsed.ok_or_else(|| CoverError::malformed("<color>", value))
}

fn parse_hex(s: &str) -> Option<Rgba8> {
    fn nibble(c: u8) -> Option<u8> {
        (c as char).to_digit(16).map(|d| d as u8)
    }
    fn byte(pair: &[u8]) -> Option<u8> {
        Some(nibble(pair[0])? << 4 | nibble(pair[1])?)
    }

    let b = s.as_bytes();
    match b.len() {
        3 | 4 => {
            let mut ch = [255u8; 4];
            for (i, &c) in b.iter().enumerate() {
                let n = nibble(c)?;
                ch[i] = n << 4 | n;
            }
            Some(Rgba8::new(ch[0], ch[1], ch[2], ch[3]))
        }
        6 => Some(Rgba8::opaque(byte(&b[0..2])?, byte(&b[2..4])?, byte(&b[4..6])?)),
        8 => Some(Rgba8::new(
            byte(&b[0..2])?,
            byte(&b[2..4])?,
            byte(&b[4..6])?,
            byte(&b[6..8])?,
        )),
        _ => None,
    }
}

fn functional_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_rgb_args(args: &str) -> Option<Rgba8> {
    let parts: Vec<&str> = args
        .split([',', ' ', '/'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    fn channel(p: &str) -> Option<u8> {
        let v = match p.strip_suffix('%') {
            Some(pct) => pct.trim().parse::<f64>().ok()? / 100.0 * 255.0,
            None => p.parse::<f64>().ok()?,
        };
        v.is_finite().then(|| v.clamp(0.0, 255.0).round() as u8)
    }
    fn alpha(p: &str) -> Option<u8> {
        let v = match p.strip_suffix('%') {
            Some(pct) => pct.trim().parse::<f64>().ok()? / 100.0,
            None => p.parse::<f64>().ok()?,
        };
        v.is_finite().then(|| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    let a = match parts.get(3) {
        Some(p) => alpha(p)?,
        None => 255,
    };
    Some(Rgba8::new(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        a,
    ))
}

fn named_color(name: &str) -> Option<Rgba8> {
    let (r, g, b) = match name {
        "transparent" => return Some(Rgba8::new(0, 0, 0, 0)),
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "lime" => (0, 255, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "silver" => (192, 192, 192),
        "gray" | "grey" => (128, 128, 128),
        "darkgray" | "darkgrey" => (169, 169, 169),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "dimgray" | "dimgrey" => (105, 105, 105),
        "maroon" => (128, 0, 0),
        "olive" => (128, 128, 0),
        "purple" => (128, 0, 128),
        "teal" => (0, 128, 128),
        "navy" => (0, 0, 128),
        "orange" => (255, 165, 0),
        "orangered" => (255, 69, 0),
        "gold" => (255, 215, 0),
        "pink" => (255, 192, 203),
        "hotpink" => (255, 105, 180),
        "crimson" => (220, 20, 60),
        "brown" => (165, 42, 42),
        "chocolate" => (210, 105, 30),
        "coral" => (255, 127, 80),
        "tomato" => (255, 99, 71),
        "salmon" => (250, 128, 114),
        "khaki" => (240, 230, 140),
        "beige" => (245, 245, 220),
        "ivory" => (255, 255, 240),
        "indigo" => (75, 0, 130),
        "violet" => (238, 130, 238),
        "orchid" => (218, 112, 214),
        "plum" => (221, 160, 221),
        "skyblue" => (135, 206, 235),
        "steelblue" => (70, 130, 180),
        "royalblue" => (65, 105, 225),
        "deepskyblue" => (0, 191, 255),
        "dodgerblue" => (30, 144, 255),
        "turquoise" => (64, 224, 208),
        "seagreen" => (46, 139, 87),
        "forestgreen" => (34, 139, 34),
        "darkgreen" => (0, 100, 0),
        "darkred" => (139, 0, 0),
        "darkblue" => (0, 0, 139),
        "whitesmoke" => (245, 245, 245),
        "gainsboro" => (220, 220, 220),
        _ => return None,
    };
    Some(Rgba8::opaque(r, g, b))
}
