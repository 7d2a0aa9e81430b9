//! Color symbols and commander color identity.
//!
//! A commander's colors are stored as a serialized list (`['W', 'U']` or
//! `["W","U"]`). [`ColorIdentity::parse`] turns that field into an ordered,
//! de-duplicated set and falls back to colorless for anything it cannot read.
//!
//! Catalog loaders also write plain comma-joined symbols (`W,U`).
//! [`ColorIdentity::from_card_field`] reads both forms and is what the
//! color filters use.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five colors of mana.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "W")]
    White,
    #[serde(rename = "U")]
    Blue,
    #[serde(rename = "B")]
    Black,
    #[serde(rename = "R")]
    Red,
    #[serde(rename = "G")]
    Green,
}

impl Color {
    /// Canonical W, U, B, R, G order.
    pub const ALL: [Color; 5] = [
        Color::White,
        Color::Blue,
        Color::Black,
        Color::Red,
        Color::Green,
    ];

    /// Parses a single color symbol. Only the upper-case letters are recognized.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "W" => Some(Self::White),
            "U" => Some(Self::Blue),
            "B" => Some(Self::Black),
            "R" => Some(Self::Red),
            "G" => Some(Self::Green),
            _ => None,
        }
    }

    /// The one-letter symbol for this color.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::White => "W",
            Self::Blue => "U",
            Self::Black => "B",
            Self::Red => "R",
            Self::Green => "G",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::White => 1 << 0,
            Self::Blue => 1 << 1,
            Self::Black => 1 << 2,
            Self::Red => 1 << 3,
            Self::Green => 1 << 4,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Ordered set of colors, in first-appearance order.
///
/// An empty identity means colorless.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorIdentity(Vec<Color>);

impl ColorIdentity {
    /// The colorless identity.
    #[must_use]
    pub const fn colorless() -> Self {
        Self(Vec::new())
    }

    /// Builds an identity from colors, dropping repeats.
    #[must_use]
    pub fn from_colors(colors: impl IntoIterator<Item = Color>) -> Self {
        let mut out = Vec::new();
        for color in colors {
            if !out.contains(&color) {
                out.push(color);
            }
        }
        Self(out)
    }

    /// Parses a stored color field.
    ///
    /// Never fails: absent, empty, malformed or non-list input is colorless.
    /// Unknown symbols and non-string elements are dropped.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::colorless();
        };

        let symbols = match parse_json_list(raw).or_else(|| parse_literal_list(raw)) {
            Some(symbols) => symbols,
            None => {
                tracing::debug!(raw, "unparsable color field, treating as colorless");
                return Self::colorless();
            }
        };

        Self::from_colors(symbols.iter().filter_map(|s| Color::from_symbol(s)))
    }

    /// Reads a catalog card's color field for filtering.
    ///
    /// List forms are read as in [`Self::parse`]. Anything else is split on
    /// commas and whitespace, and tokens that are not a color symbol are
    /// dropped, so `"R"` and `"W,U"` keep their colors.
    #[must_use]
    pub fn from_card_field(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::colorless();
        };
        if let Some(symbols) = parse_json_list(raw).or_else(|| parse_literal_list(raw)) {
            return Self::from_colors(symbols.iter().filter_map(|s| Color::from_symbol(s)));
        }
        Self::from_colors(
            raw.split(|c: char| c == ',' || c.is_whitespace())
                .map(|token| token.trim_matches(|c: char| c == '\'' || c == '"'))
                .filter_map(Color::from_symbol),
        )
    }

    /// Returns true if no colors are present.
    #[must_use]
    pub fn is_colorless(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct colors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no colors are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if the color is part of this identity.
    #[must_use]
    pub fn contains(&self, color: Color) -> bool {
        self.0.contains(&color)
    }

    /// Returns true if any color is shared with `other`.
    #[must_use]
    pub fn intersects(&self, other: &ColorIdentity) -> bool {
        self.mask() & other.mask() != 0
    }

    /// Returns true if every color of `other` is part of this identity.
    #[must_use]
    pub fn contains_all(&self, other: &ColorIdentity) -> bool {
        self.mask() & other.mask() == other.mask()
    }

    /// Bit mask (W=1, U=2, B=4, R=8, G=16).
    #[must_use]
    pub fn mask(&self) -> u8 {
        self.0.iter().fold(0, |acc, c| acc | c.bit())
    }

    /// Iterates colors in identity order.
    pub fn iter(&self) -> impl Iterator<Item = Color> + '_ {
        self.0.iter().copied()
    }

    /// Parses a string of symbols such as `"WUB"`. Unknown letters are skipped.
    #[must_use]
    pub fn from_symbols(symbols: &str) -> Self {
        Self::from_colors(
            symbols
                .chars()
                .filter_map(|c| Color::from_symbol(&c.to_ascii_uppercase().to_string())),
        )
    }
}

impl FromIterator<Color> for ColorIdentity {
    fn from_iter<T: IntoIterator<Item = Color>>(iter: T) -> Self {
        Self::from_colors(iter)
    }
}

impl fmt::Display for ColorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("C");
        }
        for color in &self.0 {
            f.write_str(color.symbol())?;
        }
        Ok(())
    }
}

/// `["W", "U"]` style. Non-string elements become empty strings and are dropped later.
fn parse_json_list(raw: &str) -> Option<Vec<String>> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .map(|v| v.as_str().unwrap_or_default().to_string())
            .collect(),
    )
}

/// `['W', 'U']` style list literal, as written by a Python `repr`.
fn parse_literal_list(raw: &str) -> Option<Vec<String>> {
    let inner = raw.strip_prefix('[')?.strip_suffix(']')?;
    let mut chars = inner.chars().peekable();
    let mut items = Vec::new();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let Some(&first) = chars.peek() else {
            break;
        };

        if first == '\'' || first == '"' {
            chars.next();
            let mut item = String::new();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' => item.push(chars.next()?),
                    c if c == first => {
                        closed = true;
                        break;
                    }
                    c => item.push(c),
                }
            }
            if !closed {
                return None;
            }
            items.push(item);
        } else {
            let mut token = String::new();
            while let Some(&c) = chars.peek() {
                if c == ',' || c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
            if !is_scalar_literal(&token) {
                return None;
            }
            items.push(String::new());
        }

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            Some(',') | None => {}
            Some(_) => return None,
        }
    }

    Some(items)
}

fn is_scalar_literal(token: &str) -> bool {
    matches!(token, "None" | "True" | "False") || token.parse::<f64>().is_ok()
}
