use ratatui::style::Color;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TuiTheme {
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub border_fg: Color,
    pub help_fg: Color,
    pub selected_fg: Color,
}

impl Default for TuiTheme {
    fn default() -> Self {
        Self {
            highlight_fg: Color::Black,
            highlight_bg: Color::Cyan,
            border_fg: Color::Gray,
            help_fg: Color::Yellow,
            selected_fg: Color::Green,
        }
    }
}

#[derive(Deserialize)]
struct RawTheme {
    highlight_fg: Option<String>,
    highlight_bg: Option<String>,
    border_fg: Option<String>,
    help_fg: Option<String>,
    selected_fg: Option<String>,
}

pub fn load_tui_theme() -> TuiTheme {
    let path = crate::config::config_dir().join("tui_theme.toml");
    match std::fs::read_to_string(&path) {
        Ok(s) => parse_theme(&s),
        Err(_) => TuiTheme::default(),
    }
}

/// Unknown or unparsable colours fall back to the default for that slot.
pub fn parse_theme(s: &str) -> TuiTheme {
    let d = TuiTheme::default();
    let Ok(raw) = toml::from_str::<RawTheme>(s) else {
        tracing::warn!("ignoring unparsable tui_theme.toml");
        return d;
    };
    let pick = |v: Option<String>, fallback: Color| {
        v.as_deref().and_then(parse_color).unwrap_or(fallback)
    };
    TuiTheme {
        highlight_fg: pick(raw.highlight_fg, d.highlight_fg),
        highlight_bg: pick(raw.highlight_bg, d.highlight_bg),
        border_fg: pick(raw.border_fg, d.border_fg),
        help_fg: pick(raw.help_fg, d.help_fg),
        selected_fg: pick(raw.selected_fg, d.selected_fg),
    }
}

pub fn parse_color(s: &str) -> Option<Color> {
    let k = s.trim().to_ascii_lowercase();
    match k.as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Gray),
        _ => {
            if let Some(hex) = k.strip_prefix('#') { return parse_hex(hex); }
            if let Some(rest) = k.strip_prefix("rgb(") { return parse_rgb_tuple(rest); }
            None
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

fn parse_rgb_tuple(rest: &str) -> Option<Color> {
    let t = rest.strip_suffix(')')?;
    let parts: Vec<_> = t.split(',').map(|p| p.trim()).collect();
    if parts.len() != 3 { return None; }
    let r = parts[0].parse::<u8>().ok()?;
    let g = parts[1].parse::<u8>().ok()?;
    let b = parts[2].parse::<u8>().ok()?;
    Some(Color::Rgb(r, g, b))
}
