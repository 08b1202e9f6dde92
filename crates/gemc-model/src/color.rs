//! GEMC color strings.
//!
//! Colors are six hex digits with an optional leading `#` and an optional
//! trailing transparency digit, 0 (opaque) through 9.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^#?([0-9A-F]{6})([0-9]?)$").unwrap());

/// An RGB color with a 0-9 transparency level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    /// Red component.
    pub r: u8,
    /// Green component.
    pub g: u8,
    /// Blue component.
    pub b: u8,
    /// Transparency digit, 0 (opaque) through 9.
    pub transparency: u8,
}

impl Color {
    /// Parse a GEMC color string like `ff0000`, `#00ff00` or `0000ff7`.
    pub fn parse(text: &str) -> Result<Self, ModelError> {
        let caps = COLOR_RE
            .captures(text.trim())
            .ok_or_else(|| ModelError::Color(text.to_string()))?;
        let hex = &caps[1];
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
        let r = channel(0).map_err(|_| ModelError::Color(text.to_string()))?;
        let g = channel(2).map_err(|_| ModelError::Color(text.to_string()))?;
        let b = channel(4).map_err(|_| ModelError::Color(text.to_string()))?;
        let transparency = caps[2].parse().unwrap_or(0);
        Ok(Self {
            r,
            g,
            b,
            transparency,
        })
    }

    /// Transparency as a percentage, 0 through 90.
    pub fn transparency_percent(&self) -> u8 {
        self.transparency * 10
    }

    /// Channels scaled into 0.0..1.0.
    pub fn rgb_f64(&self) -> [f64; 3] {
        [
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        ]
    }

    /// Render back to the table form, transparency digit only when set.
    pub fn to_hex(&self) -> String {
        if self.transparency > 0 {
            format!("{:02x}{:02x}{:02x}{}", self.r, self.g, self.b, self.transparency)
        } else {
            format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        }
    }
}
