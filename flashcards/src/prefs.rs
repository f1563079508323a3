use serde::{Deserialize, Serialize};

use crate::speech::Accent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    pub words: bool,
    pub translations: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            words: true,
            translations: true,
        }
    }
}

impl Visibility {
    /// Card layout class when exactly one side is hidden.
    pub fn layout_class(self) -> Option<&'static str> {
        match (self.words, self.translations) {
            (false, true) => Some("translations-only"),
            (true, false) => Some("words-only"),
            _ => None,
        }
    }

    pub fn toggle_words(&mut self) {
        self.words = !self.words;
    }

    pub fn toggle_translations(&mut self) {
        self.translations = !self.translations;
    }
}

/// Per-browser choices remembered across reloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub accent: Accent,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub visibility: Visibility,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_class_only_for_one_hidden_side() {
        let mut visibility = Visibility::default();
        assert_eq!(visibility.layout_class(), None);
        visibility.toggle_words();
        assert_eq!(visibility.layout_class(), Some("translations-only"));
        visibility.toggle_translations();
        assert_eq!(visibility.layout_class(), None);
        visibility.toggle_words();
        assert_eq!(visibility.layout_class(), Some("words-only"));
    }

    #[test]
    fn older_preferences_fill_in_defaults() {
        let prefs: Preferences = serde_json::from_str(r#"{"accent":"Uk"}"#).unwrap();
        assert_eq!(prefs.accent, Accent::Uk);
        assert_eq!(prefs.visibility, Visibility::default());
        assert_eq!(prefs.page_size, None);
    }
}
