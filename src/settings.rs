// ============================================================================
// SETTINGS: the persisted theme flag
// ============================================================================

use std::path::PathBuf;

use crate::theme::ThemeMode;
use crate::{log_info, log_warn};

/// User preferences that survive a restart. Stored as `key=value` lines.
#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    pub theme_mode: ThemeMode,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme_mode: ThemeMode::Dark,
        }
    }
}

impl AppSettings {
    pub(crate) fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
                .ok()?
                .join("photostudio");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("photostudio_settings.cfg"));
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA")
                .or_else(|_| std::env::var("USERPROFILE"))
                .ok()?;
            let config_dir = PathBuf::from(appdata).join("PhotoStudio");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("photostudio_settings.cfg"));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").ok()?;
            let config_dir = PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("PhotoStudio");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("photostudio_settings.cfg"));
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join("photostudio_settings.cfg")))
        }
    }

    /// Load from disk, falling back to defaults when missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else { return Self::default() };
        let Ok(content) = std::fs::read_to_string(&path) else { return Self::default() };
        Self::parse(&content)
    }

    /// Write to disk. Failure is logged, never fatal.
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else { return };
        match std::fs::write(&path, self.serialize()) {
            Ok(()) => log_info!("Settings saved to {}", path.display()),
            Err(e) => log_warn!("Could not save settings to {}: {}", path.display(), e),
        }
    }

    /// Parse `key=value` lines; unknown keys and malformed lines are skipped.
    pub fn parse(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let Some((key, val)) = line.split_once('=') else { continue };
            if key.trim() == "theme_mode" {
                s.theme_mode = match val.trim() {
                    "light" => ThemeMode::Light,
                    _ => ThemeMode::Dark,
                };
            }
        }
        s
    }

    pub fn serialize(&self) -> String {
        let mode = match self.theme_mode {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        };
        format!("theme_mode={}\n", mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_dark() {
        assert_eq!(AppSettings::parse("").theme_mode, ThemeMode::Dark);
        assert_eq!(AppSettings::parse("theme_mode=purple").theme_mode, ThemeMode::Dark);
    }

    #[test]
    fn test_reads_light_and_ignores_noise() {
        let s = AppSettings::parse("# comment\nlanguage=en\n theme_mode = light \ngarbage");
        assert_eq!(s.theme_mode, ThemeMode::Light);
    }

    #[test]
    fn test_serialized_form_parses_back() {
        let s = AppSettings { theme_mode: ThemeMode::Light };
        assert_eq!(s.serialize(), "theme_mode=light\n");
        assert_eq!(AppSettings::parse(&s.serialize()), s);
    }
}
