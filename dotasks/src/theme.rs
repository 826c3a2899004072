//! Theme and status palette values handed to the presentation layer.

use crossterm::style::Color;
use dotasks_proto::task::DEFAULT_PALETTE;

/// Errors from building a palette.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ThemeError {
    /// The palette has no colors.
    #[error("palette must contain at least one color")]
    EmptyPalette,
    /// A color is not a `#RRGGBB` or `#RRGGBBAA` hex string.
    #[error("invalid palette color: {0}")]
    InvalidColor(String),
}

/// Light or dark appearance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    /// Light background, dark text.
    #[default]
    Light,
    /// Dark background, light text.
    Dark,
}

/// Console colors for one appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Task text.
    pub text: Color,
    /// Header line.
    pub accent: Color,
    /// Marker of the task under edit.
    pub focus: Color,
    /// Marker of a task selected for deletion.
    pub delete: Color,
}

impl Theme {
    /// Dark text for light terminals.
    #[must_use]
    pub const fn light() -> Self {
        Self {
            text: Color::Rgb { r: 0x11, g: 0x11, b: 0x11 },
            accent: Color::Rgb { r: 0x58, g: 0x65, b: 0xF2 },
            focus: Color::Rgb { r: 0x50, g: 0x57, b: 0xE9 },
            delete: Color::Rgb { r: 0xED, g: 0x42, b: 0x45 },
        }
    }

    /// Light text for dark terminals.
    #[must_use]
    pub const fn dark() -> Self {
        Self {
            text: Color::Rgb { r: 0xED, g: 0xED, b: 0xED },
            accent: Color::Rgb { r: 0x66, g: 0x70, b: 0xE2 },
            focus: Color::Rgb { r: 0x5A, g: 0x61, b: 0xE9 },
            delete: Color::Rgb { r: 0xED, g: 0x42, b: 0x45 },
        }
    }

    /// The theme for a configured [`Appearance`].
    #[must_use]
    pub const fn for_appearance(appearance: Appearance) -> Self {
        match appearance {
            Appearance::Light => Self::light(),
            Appearance::Dark => Self::dark(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

/// Status colors, indexed by task status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    /// Builds a palette from hex color strings.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::EmptyPalette`] for an empty list and
    /// [`ThemeError::InvalidColor`] for a malformed entry.
    pub fn new(colors: Vec<String>) -> Result<Self, ThemeError> {
        if colors.is_empty() {
            return Err(ThemeError::EmptyPalette);
        }
        if let Some(bad) = colors.iter().find(|c| hex_color(c).is_none()) {
            return Err(ThemeError::InvalidColor(bad.clone()));
        }
        Ok(Self { colors })
    }

    /// Number of statuses.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn len(&self) -> u32 {
        self.colors.len() as u32
    }

    /// Always `false`; a palette has at least one color.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color for a status, wrapping past the end.
    #[must_use]
    pub fn color(&self, status: u32) -> &str {
        let index = status as usize % self.colors.len();
        &self.colors[index]
    }

    /// Terminal color for a status.
    #[must_use]
    pub fn term_color(&self, status: u32) -> Color {
        hex_color(self.color(status)).unwrap_or(Color::Reset)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE.iter().map(|c| (*c).to_string()).collect(),
        }
    }
}

/// `#RRGGBB` or `#RRGGBBAA` as a truecolor value; alpha is dropped.
fn hex_color(color: &str) -> Option<Color> {
    let hex = color.strip_prefix('#')?;
    if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}
