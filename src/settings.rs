use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One row of the community schedule: a prayer service or a Torah lesson.
/// `time` is display text ("06:30", "15 דק׳ לפני השקיעה"), never parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrayerItem {
    pub id: String,
    pub name: String,
    pub time: String,
}

/// The gabbai-editable part of the board: announcements and the prayer and
/// lesson schedules, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSettings {
    pub announcements: Vec<String>,
    pub prayers: Vec<PrayerItem>,
    pub lessons: Vec<PrayerItem>,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            announcements: vec![
                "ברוכים הבאים לבית הכנסת!".to_string(),
                "נא לשמור על קדושת המקום.".to_string(),
                "הציבור מוזמן לשיעור דף היומי לאחר תפילת שחרית.".to_string(),
                "נא לכבות טלפונים ניידים בכניסה.".to_string(),
            ],
            prayers: vec![
                PrayerItem {
                    id: "p1".to_string(),
                    name: "שחרית מנין א׳".to_string(),
                    time: "06:30".to_string(),
                },
                PrayerItem {
                    id: "p2".to_string(),
                    name: "שחרית מנין ב׳".to_string(),
                    time: "08:00".to_string(),
                },
                PrayerItem {
                    id: "p3".to_string(),
                    name: "מנחה וערבית".to_string(),
                    time: "15 דק׳ לפני השקיעה".to_string(),
                },
            ],
            lessons: vec![
                PrayerItem {
                    id: "l1".to_string(),
                    name: "שיעור דף היומי".to_string(),
                    time: "18:00".to_string(),
                },
                PrayerItem {
                    id: "l2".to_string(),
                    name: "שיעור הלכה".to_string(),
                    time: "בין מנחה לערבית".to_string(),
                },
            ],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BoardSettings {
    pub fn file_path(data_dir: &Path) -> PathBuf {
        data_dir.join("settings.json")
    }

    /// Load the stored schedule. An absent, unreadable, or structurally
    /// invalid file falls back to the built-in defaults; the bad file is
    /// left in place untouched.
    pub fn load(data_dir: &Path) -> Self {
        let path = Self::file_path(data_dir);
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match serde_json::from_str(&contents) {
                    Ok(settings) => return settings,
                    Err(e) => log::warn!("Failed to parse settings: {}, using defaults", e),
                },
                Err(e) => log::warn!("Failed to read settings: {}, using defaults", e),
            }
        }
        Self::default()
    }

    /// Replace the stored schedule wholesale. The caller keeps its in-memory
    /// copy; nothing is re-read after a successful save.
    pub fn save(&self, data_dir: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(Self::file_path(data_dir), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn load_from_empty_dir_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = BoardSettings::load(dir.path());

        assert_eq!(settings, BoardSettings::default());
        assert_eq!(settings.announcements.len(), 4);
        assert_eq!(settings.prayers.len(), 3);
        assert_eq!(settings.lessons.len(), 2);
    }

    #[test]
    fn load_invalid_json_returns_defaults_and_keeps_file() {
        let dir = TempDir::new().unwrap();
        let path = BoardSettings::file_path(dir.path());
        std::fs::write(&path, "{not valid").unwrap();

        let settings = BoardSettings::load(dir.path());

        assert_eq!(settings, BoardSettings::default());
        // The corrupt file is not deleted or rewritten.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not valid");
    }

    #[test]
    fn load_wrong_shape_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let path = BoardSettings::file_path(dir.path());
        std::fs::write(&path, r#"{"announcements": "not a list"}"#).unwrap();

        let settings = BoardSettings::load(dir.path());
        assert_eq!(settings, BoardSettings::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let settings = BoardSettings {
            announcements: vec!["שבת שלום".to_string()],
            prayers: vec![PrayerItem {
                id: "p1".to_string(),
                name: "שחרית".to_string(),
                time: "07:15".to_string(),
            }],
            lessons: vec![],
        };

        settings.save(dir.path()).unwrap();
        let loaded = BoardSettings::load(dir.path());

        assert_eq!(loaded, settings);
    }

    #[test]
    fn load_twice_without_save_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let settings = BoardSettings::default();
        settings.save(dir.path()).unwrap();

        let first = BoardSettings::load(dir.path());
        let second = BoardSettings::load(dir.path());
        assert_eq!(first, second);
    }
}
