//! Color scheme.

use gpui::{rgb, Hsla};

/// Palette used by every view and component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeColors {
    pub background: Hsla,
    pub surface: Hsla,
    pub surface_elevated: Hsla,
    pub border: Hsla,
    pub text_primary: Hsla,
    pub text_secondary: Hsla,
    pub text_muted: Hsla,
    pub accent: Hsla,
    pub accent_hover: Hsla,
    pub success: Hsla,
    pub warning: Hsla,
    pub error: Hsla,
    /// Dimmed backdrop behind dialogs.
    pub overlay: Hsla,
}

fn hex(value: u32) -> Hsla {
    rgb(value).into()
}

impl ThemeColors {
    pub fn dark() -> Self {
        Self {
            background: hex(0x111318),
            surface: hex(0x1a1d24),
            surface_elevated: hex(0x252933),
            border: hex(0x2f3440),
            text_primary: hex(0xe6e8ee),
            text_secondary: hex(0xb4b9c6),
            text_muted: hex(0x7d8394),
            accent: hex(0x3b82f6),
            accent_hover: hex(0x2563eb),
            success: hex(0x22c55e),
            warning: hex(0xf59e0b),
            error: hex(0xef4444),
            overlay: Hsla {
                h: 0.0,
                s: 0.0,
                l: 0.0,
                a: 0.5,
            },
        }
    }
}

/// The active theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub colors: ThemeColors,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            colors: ThemeColors::dark(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
