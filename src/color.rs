/// Color utilities for categories, eras and the drawing surface.
use rand::RngExt;

use crate::error::{Result, TimelineError};

/// An RGB color, serialized as "R,G,B" in the timeline file format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const BLACK: Color = Color::new(0, 0, 0);
pub const WHITE: Color = Color::new(255, 255, 255);
pub const GRAY: Color = Color::new(200, 200, 200);

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse the "R,G,B" form used by the timeline file format.
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(TimelineError::Parse(format!("bad color '{text}'")));
        }
        let channel = |s: &str| -> Result<u8> {
            s.parse::<u8>()
                .map_err(|_| TimelineError::Parse(format!("bad color '{text}'")))
        };
        Ok(Self::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?))
    }

    /// The "R,G,B" form used by the timeline file format.
    pub fn encode(&self) -> String {
        format!("{},{},{}", self.r, self.g, self.b)
    }

    /// A darker shade of the same color, used for event borders.
    pub fn darkened(&self) -> Self {
        Self::new(
            (self.r as u16 * 7 / 10) as u8,
            (self.g as u16 * 7 / 10) as u8,
            (self.b as u16 * 7 / 10) as u8,
        )
    }
}

/// Generate a random category color from a predefined palette.
pub fn random_color() -> Color {
    const PALETTE: &[Color] = &[
        Color::new(255, 87, 51),
        Color::new(51, 255, 87),
        Color::new(51, 87, 255),
        Color::new(243, 51, 255),
        Color::new(51, 255, 245),
        Color::new(245, 255, 51),
        Color::new(255, 51, 168),
        Color::new(168, 51, 255),
        Color::new(51, 255, 168),
        Color::new(255, 168, 51),
        Color::new(255, 51, 128),
        Color::new(128, 51, 255),
    ];
    let mut rng = rand::rng();
    PALETTE[rng.random_range(0..PALETTE.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_encodes() {
        let color = Color::parse("255, 0, 3").unwrap();
        assert_eq!(color, Color::new(255, 0, 3));
        assert_eq!(color.encode(), "255,0,3");
    }

    #[test]
    fn rejects_malformed_colors() {
        assert!(Color::parse("255,0").is_err());
        assert!(Color::parse("255,0,300").is_err());
        assert!(Color::parse("red").is_err());
    }

    #[test]
    fn darkened_is_darker() {
        let color = Color::new(200, 100, 0);
        let dark = color.darkened();
        assert!(dark.r < color.r);
        assert!(dark.g < color.g);
        assert_eq!(dark.b, 0);
    }
}
