//! Style values applied through the surface

use std::fmt;

/// A single style property value
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    /// Length in CSS pixels
    Px(f64),
    /// Length in points
    Pt(f64),
    /// Unitless number (opacity, z-index)
    Number(f64),
    /// Any other value, kept verbatim
    Keyword(String),
}

impl StyleValue {
    /// Numeric value in pixels, when the value is a pixel length
    pub fn as_px(&self) -> Option<f64> {
        match self {
            StyleValue::Px(v) => Some(*v),
            StyleValue::Keyword(s) => s.strip_suffix("px").and_then(|n| n.trim().parse().ok()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            StyleValue::Px(v) | StyleValue::Pt(v) | StyleValue::Number(v) => Some(*v),
            StyleValue::Keyword(_) => None,
        }
    }

    pub fn as_keyword(&self) -> Option<&str> {
        match self {
            StyleValue::Keyword(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Keyword(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Keyword(value)
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Px(v) => write!(f, "{v}px"),
            StyleValue::Pt(v) => write!(f, "{v}pt"),
            StyleValue::Number(v) => write!(f, "{v}"),
            StyleValue::Keyword(s) => f.write_str(s),
        }
    }
}
