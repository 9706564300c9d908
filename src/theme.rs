// ============================================================================
// THEME: light / dark palettes around the studio's yellow accent
// ============================================================================

use eframe::egui::{self, Color32};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

/// Colours used by the studio window.
#[derive(Clone, Debug)]
pub struct Theme {
    pub mode: ThemeMode,
    pub accent: Color32,
    /// Text drawn on top of the accent colour.
    pub on_accent: Color32,
    /// Lock button while the view is locked.
    pub locked: Color32,
    pub background: Color32,
    pub boundary_bg: Color32,
    pub text: Color32,
    pub text_muted: Color32,
    pub text_faint: Color32,
}

impl Theme {
    pub fn new(mode: ThemeMode) -> Self {
        let accent = Color32::from_rgb(0xfc, 0xda, 0x00);
        let locked = Color32::from_rgb(0xf9, 0x73, 0x16);
        match mode {
            ThemeMode::Dark => Self {
                mode,
                accent,
                on_accent: Color32::from_rgb(0x23, 0x23, 0x23),
                locked,
                background: Color32::from_rgb(0x23, 0x23, 0x23),
                boundary_bg: Color32::from_rgb(0x2d, 0x2d, 0x2d),
                text: Color32::from_rgb(0xe0, 0xe0, 0xe0),
                text_muted: Color32::from_rgb(0xa0, 0xa0, 0xa0),
                text_faint: Color32::from_rgb(0x70, 0x70, 0x70),
            },
            ThemeMode::Light => Self {
                mode,
                accent,
                on_accent: Color32::from_rgb(0x23, 0x23, 0x23),
                locked,
                background: Color32::from_rgb(0xf5, 0xf5, 0xf0),
                boundary_bg: Color32::from_rgb(0xe2, 0xe2, 0xdc),
                text: Color32::from_rgb(0x23, 0x23, 0x23),
                text_muted: Color32::from_rgb(0x5a, 0x5a, 0x5a),
                text_faint: Color32::from_rgb(0x8a, 0x8a, 0x8a),
            },
        }
    }

    /// Install matching egui visuals on the context.
    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = match self.mode {
            ThemeMode::Dark => egui::Visuals::dark(),
            ThemeMode::Light => egui::Visuals::light(),
        };
        visuals.panel_fill = self.background;
        visuals.window_fill = self.boundary_bg;
        visuals.override_text_color = Some(self.text);
        visuals.selection.bg_fill = self.accent;
        visuals.selection.stroke.color = self.on_accent;
        ctx.set_visuals(visuals);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trips() {
        assert_eq!(ThemeMode::Dark.toggled(), ThemeMode::Light);
        assert_eq!(ThemeMode::Dark.toggled().toggled(), ThemeMode::Dark);
    }

    #[test]
    fn test_palettes_share_accent() {
        assert_eq!(Theme::new(ThemeMode::Dark).accent, Theme::new(ThemeMode::Light).accent);
        assert_ne!(
            Theme::new(ThemeMode::Dark).background,
            Theme::new(ThemeMode::Light).background
        );
    }
}
