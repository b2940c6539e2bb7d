use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Couleur RGB d'une ligne de grille.
///
/// # Example
/// ```
/// use gv_core::color::LineColor;
/// let red: LineColor = "255,0,0".parse().unwrap();
/// assert_eq!(red, LineColor::new(255, 0, 0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "[i64; 3]", into = "[u8; 3]")]
pub struct LineColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl LineColor {
    /// Blanc, couleur par défaut des grilles.
    pub const WHITE: Self = Self::new(255, 255, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for LineColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[u8; 3]> for LineColor {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<LineColor> for [u8; 3] {
    fn from(c: LineColor) -> Self {
        c.to_array()
    }
}

fn channel(value: i64) -> Result<u8, CoreError> {
    u8::try_from(value).map_err(|_| {
        CoreError::invalid(
            "color",
            format!("channel {value} outside [0, 255]"),
        )
    })
}

impl TryFrom<(i64, i64, i64)> for LineColor {
    type Error = CoreError;

    fn try_from((r, g, b): (i64, i64, i64)) -> Result<Self, Self::Error> {
        Ok(Self::new(channel(r)?, channel(g)?, channel(b)?))
    }
}

impl TryFrom<[i64; 3]> for LineColor {
    type Error = CoreError;

    fn try_from([r, g, b]: [i64; 3]) -> Result<Self, Self::Error> {
        Self::try_from((r, g, b))
    }
}

impl FromStr for LineColor {
    type Err = CoreError;

    /// Parse `"r,g,b"` (espaces tolérés).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [r, g, b] = parts.as_slice() else {
            return Err(CoreError::invalid(
                "color",
                format!("expected `r,g,b`, got `{s}`"),
            ));
        };
        let parse = |v: &str| {
            v.parse::<i64>()
                .map_err(|_| CoreError::invalid("color", format!("`{v}` is not an integer")))
        };
        Self::try_from((parse(r)?, parse(g)?, parse(b)?))
    }
}

impl fmt::Display for LineColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}
