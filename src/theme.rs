//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::piece::TetrominoKind;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// One Dark defaults, one colour per piece kind (I, O, T, S, Z, J, L).
const ONEDARK_PIECES: [Color; 7] = [
    Color::from_u32(0x0056_B6C2), // cyan
    Color::from_u32(0x00E5_C07B), // yellow
    Color::from_u32(0x00C6_78DD), // magenta
    Color::from_u32(0x0098_C379), // green
    Color::from_u32(0x00E0_6C75), // red
    Color::from_u32(0x00D1_9A66), // orange
    Color::from_u32(0x0061_AFEF), // blue
];

/// Playfield colours and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Piece colours, indexed by `TetrominoKind::color_index`.
    pub pieces: [Color; 7],
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Outline drawn inside every block.
    pub stroke: Color,
    /// Text (score, lines).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Disabled buttons, greyed-out board.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    pub fn onedark_default() -> Self {
        Self {
            pieces: ONEDARK_PIECES,
            bg: Color::from_u32(0x0031_353F),
            div_line: Color::from_u32(0x003F_444F),
            stroke: Color::from_u32(0x002C_3E50),
            main_fg: Color::from_u32(0x00AB_B2BF),
            title: Color::from_u32(0x00E5_C07B),
            inactive_fg: Color::from_u32(0x005C_6370),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    /// `palette` then overrides piece colours for HighContrast / Colorblind.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                // Classic pure hues
                self.pieces = [
                    Color::from_u32(0x0000_FFFF), // I cyan
                    Color::from_u32(0x00FF_FF00), // O yellow
                    Color::from_u32(0x0080_0080), // T purple
                    Color::from_u32(0x0000_FF00), // S green
                    Color::from_u32(0x00FF_0000), // Z red
                    Color::from_u32(0x00FF_A500), // J orange
                    Color::from_u32(0x0000_00FF), // L blue
                ];
            }
            crate::Palette::Colorblind => {
                // Paul Tol "bright" qualitative scheme plus grey
                self.pieces = [
                    Color::from_u32(0x0066_CCEE),
                    Color::from_u32(0x00CC_BB44),
                    Color::from_u32(0x00AA_3377),
                    Color::from_u32(0x0022_8833),
                    Color::from_u32(0x00EE_6677),
                    Color::from_u32(0x00BB_BBBB),
                    Color::from_u32(0x0044_77AA),
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let d = Self::onedark_default();
        // piece_* keys first, then the closest btop keys.
        let piece = |i: usize, key: &str, fallback: &str| {
            get(key).or_else(|| get(fallback)).unwrap_or(d.pieces[i])
        };
        Self {
            pieces: [
                piece(0, "piece_i", "hi_fg"),
                piece(1, "piece_o", "title"),
                piece(2, "piece_t", "net_box"),
                piece(3, "piece_s", "mem_box"),
                piece(4, "piece_z", "cpu_end"),
                piece(5, "piece_j", "temp_mid"),
                piece(6, "piece_l", "cpu_box"),
            ],
            bg: get("meter_bg").unwrap_or(d.bg),
            div_line: get("div_line").unwrap_or(d.div_line),
            stroke: get("stroke").unwrap_or(d.stroke),
            main_fg: get("main_fg").unwrap_or(d.main_fg),
            title: get("title").unwrap_or(d.title),
            inactive_fg: get("inactive_fg").unwrap_or(d.inactive_fg),
        }
    }

    #[inline]
    pub fn piece_color(&self, kind: TetrominoKind) -> Color {
        self.pieces[kind.color_index()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(invalid)
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}
