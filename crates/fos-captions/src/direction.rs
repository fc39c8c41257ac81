//! Text direction detection
//!
//! The first strong directional character decides; text without one is
//! left-to-right.

/// Inline base direction of cue text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextDirection {
    /// Left-to-right
    #[default]
    LeftToRight,
    /// Right-to-left
    RightToLeft,
}

impl TextDirection {
    /// Detect the base direction of `text`
    pub fn detect(text: &str) -> Self {
        text.chars()
            .find_map(strong_direction)
            .unwrap_or_default()
    }

    /// CSS `direction` value
    pub fn as_str(self) -> &'static str {
        match self {
            TextDirection::LeftToRight => "ltr",
            TextDirection::RightToLeft => "rtl",
        }
    }
}

fn strong_direction(c: char) -> Option<TextDirection> {
    let code = c as u32;
    match code {
        // Hebrew, Arabic, Syriac, Arabic Supplement, Thaana, N'Ko, Samaritan, Mandaic
        0x0590..=0x08FF |
        // Hebrew and Arabic presentation forms
        0xFB1D..=0xFDFF | 0xFE70..=0xFEFF |
        // Imperial Aramaic through Old South Arabian and friends
        0x10800..=0x10FFF |
        0x1E800..=0x1EFFF => {
            // Arabic-Indic digits and marks are weak
            if (0x0660..=0x0669).contains(&code) || (0x06F0..=0x06F9).contains(&code) {
                None
            } else if is_combining(code) {
                None
            } else {
                Some(TextDirection::RightToLeft)
            }
        }
        _ if c.is_alphabetic() => Some(TextDirection::LeftToRight),
        _ => None,
    }
}

fn is_combining(code: u32) -> bool {
    matches!(code,
        0x0591..=0x05BD | 0x05BF | 0x05C1..=0x05C2 | 0x05C4..=0x05C5 | 0x05C7 |
        0x0610..=0x061A | 0x064B..=0x065F | 0x0670 | 0x06D6..=0x06DC | 0x06DF..=0x06E4
    )
}
