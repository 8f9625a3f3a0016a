use crate::color::Color;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Named color cycles a user can pick for series and points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    Neon,
    Colorful,
    Monochrome,
}

const NEON: [Color; 6] = [
    Color::rgb(0, 255, 255), // Cyan
    Color::rgb(255, 0, 255), // Magenta
    Color::rgb(57, 255, 20), // Green
    Color::rgb(255, 255, 0), // Yellow
    Color::rgb(255, 95, 31), // Orange
    Color::rgb(188, 19, 254), // Purple
];

const COLORFUL: [Color; 10] = [
    Color::rgb(31, 119, 180), // Blue
    Color::rgb(255, 127, 14), // Orange
    Color::rgb(44, 160, 44), // Green
    Color::rgb(214, 39, 40), // Red
    Color::rgb(148, 103, 189), // Purple
    Color::rgb(140, 86, 75), // Brown
    Color::rgb(227, 119, 194), // Pink
    Color::rgb(127, 127, 127), // Gray
    Color::rgb(188, 189, 34), // Olive
    Color::rgb(23, 190, 207), // Cyan
];

const MONOCHROME_BASE: Color = Color::rgb(59, 130, 246);

/// Alternating light/dark emphasis for monochrome, indexed by `index % 6`.
const MONOCHROME_ALPHA: [f64; 6] = [1.0, 0.55, 0.85, 0.4, 0.7, 0.25];

impl Palette {
    /// Color for the item at `index`, cycling through the palette.
    ///
    /// The returned alpha is the palette's own emphasis: always 1 for hue
    /// palettes, stepped for monochrome. Callers multiply it with their opacity.
    pub fn pick(self, index: usize) -> Color {
        match self {
            Palette::Neon => NEON[index % NEON.len()],
            Palette::Colorful => COLORFUL[index % COLORFUL.len()],
            Palette::Monochrome => {
                MONOCHROME_BASE.with_alpha(MONOCHROME_ALPHA[index % MONOCHROME_ALPHA.len()])
            }
        }
    }
}

impl FromStr for Palette {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "neon" => Ok(Palette::Neon),
            "colorful" => Ok(Palette::Colorful),
            "monochrome" => Ok(Palette::Monochrome),
            other => Err(format!("unknown palette '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hue_palettes_cycle() {
        assert_eq!(Palette::Colorful.pick(0), Palette::Colorful.pick(10));
        assert_eq!(Palette::Neon.pick(1), Palette::Neon.pick(7));
        assert_ne!(Palette::Colorful.pick(0), Palette::Colorful.pick(1));
        assert_eq!(Palette::Colorful.pick(3).a, 1.0);
    }

    #[test]
    fn test_monochrome_varies_only_alpha() {
        let first = Palette::Monochrome.pick(0);
        let second = Palette::Monochrome.pick(1);
        assert_eq!((first.r, first.g, first.b), (second.r, second.g, second.b));
        assert!(first.a > second.a);
        assert_eq!(Palette::Monochrome.pick(2).a, Palette::Monochrome.pick(8).a);
    }

    #[test]
    fn test_parse_palette() {
        assert_eq!("Neon".parse::<Palette>().unwrap(), Palette::Neon);
        assert!("pastel".parse::<Palette>().is_err());
    }
}
