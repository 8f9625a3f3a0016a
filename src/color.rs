//! Color Resolution Engine
//!
//! Decides the concrete color for every painted element. Each lookup walks a
//! fixed precedence chain and the first hit wins:
//! ```text
//! perValueColor[label]   user pinned this category/row label
//! customColor            user-entered literal
//! themeColorRef          named slot in the active theme
//! palette[index]         neon / colorful cycle, or monochrome alpha steps
//! DEFAULT_ACCENT         nothing configured
//! ```
//! Opacity is the caller's alpha. Monochrome is the one exception: its own
//! alpha step is multiplied with the caller's alpha instead of replaced by it.

use crate::palette::Palette;
use crate::parser::parse_color;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Accent used when no override, theme slot or palette applies.
pub const DEFAULT_ACCENT: Color = Color::rgb(99, 102, 241);

// === Color value ===

/// An sRGB color with fractional opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// CSS `rgba()` form. Alpha is rounded to three decimals.
    pub fn to_css(&self) -> String {
        let alpha = (self.a.clamp(0.0, 1.0) * 1000.0).round() / 1000.0;
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

// === Configuration ===

/// User color choices, owned by UI state and passed in by value per render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorConfig {
    /// Row or category label pinned to an explicit color.
    pub per_value_color: BTreeMap<String, String>,
    pub custom_color: Option<String>,
    /// Name of a slot in the active [`Theme`].
    pub theme_color_ref: Option<String>,
    pub palette: Option<Palette>,
    /// Base opacity in `[0, 1]`.
    pub opacity: f64,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            per_value_color: BTreeMap::new(),
            custom_color: None,
            theme_color_ref: None,
            palette: None,
            opacity: 1.0,
        }
    }
}

impl ColorConfig {
    /// Opacity clamped into `[0, 1]`; NaN counts as fully opaque.
    pub fn alpha(&self) -> f64 {
        if self.opacity.is_nan() {
            1.0
        } else {
            self.opacity.clamp(0.0, 1.0)
        }
    }
}

/// Named color slots of the active visual theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Theme {
    slots: BTreeMap<String, String>,
}

impl Default for Theme {
    fn default() -> Self {
        let slots = [
            ("primary", "#3b82f6"),
            ("secondary", "#64748b"),
            ("accent", "#f59e0b"),
            ("background", "#ffffff"),
            ("text", "#0f172a"),
            ("success", "#22c55e"),
            ("warning", "#eab308"),
            ("danger", "#ef4444"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self { slots }
    }
}

impl Theme {
    pub fn new(slots: BTreeMap<String, String>) -> Self {
        Self { slots }
    }

    /// Look up and parse a named slot. Names are matched case-insensitively.
    pub fn slot(&self, name: &str) -> Option<Color> {
        let key = name.trim().to_ascii_lowercase();
        self.slots
            .iter()
            .find(|(k, _)| k.to_ascii_lowercase() == key)
            .and_then(|(_, v)| parse_color(v))
    }
}

// === Resolution ===

/// Applies the precedence chain against a theme.
#[derive(Debug, Clone, Default)]
pub struct ColorResolver {
    theme: Theme,
}

impl ColorResolver {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Resolve the color for the element at `index` carrying `label`.
    ///
    /// Unparseable literals and unknown theme slots count as absent and fall
    /// through to the next step.
    pub fn resolve(&self, config: &ColorConfig, index: usize, label: &str, alpha: f64) -> Color {
        if let Some(color) = config
            .per_value_color
            .get(label)
            .and_then(|raw| literal(raw, "perValueColor"))
        {
            return color.with_alpha(alpha);
        }

        if let Some(color) = config
            .custom_color
            .as_deref()
            .and_then(|raw| literal(raw, "customColor"))
        {
            return color.with_alpha(alpha);
        }

        if let Some(name) = config.theme_color_ref.as_deref() {
            match self.theme.slot(name) {
                Some(color) => return color.with_alpha(alpha),
                None => debug!(slot = name, "theme slot not found, falling through"),
            }
        }

        if let Some(palette) = config.palette {
            let picked = palette.pick(index);
            return picked.with_alpha(picked.a * alpha);
        }

        DEFAULT_ACCENT.with_alpha(alpha)
    }
}

fn literal(raw: &str, source: &'static str) -> Option<Color> {
    let parsed = parse_color(raw);
    if parsed.is_none() {
        debug!(value = raw, source, "ignoring unparseable color");
    }
    parsed
}
