/// Keyboard state of a `keydown` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyPress<'a> {
    pub key: &'a str,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    /// The event target is an input or textarea.
    pub typing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    PrevPage,
    NextPage,
    FocusSearch,
    ToggleWords,
    ToggleTranslations,
    Shuffle,
    ResetKnown,
    CloseOverlays,
}

impl Shortcut {
    pub fn from_key(press: KeyPress<'_>) -> Option<Self> {
        if press.typing {
            return None;
        }
        let command = press.ctrl || press.meta;
        match press.key {
            "ArrowLeft" if !command => Some(Shortcut::PrevPage),
            "ArrowRight" if !command => Some(Shortcut::NextPage),
            "Escape" => Some(Shortcut::CloseOverlays),
            key if command => match key.to_ascii_lowercase().as_str() {
                "f" => Some(Shortcut::FocusSearch),
                "w" => Some(Shortcut::ToggleWords),
                "t" => Some(Shortcut::ToggleTranslations),
                "r" if press.shift => Some(Shortcut::ResetKnown),
                "r" => Some(Shortcut::Shuffle),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Shortcut::PrevPage => "Previous page",
            Shortcut::NextPage => "Next page",
            Shortcut::FocusSearch => "Search",
            Shortcut::ToggleWords => "Show/hide words",
            Shortcut::ToggleTranslations => "Show/hide translations",
            Shortcut::Shuffle => "Shuffle cards",
            Shortcut::ResetKnown => "Reset known words on this page",
            Shortcut::CloseOverlays => "Close dialogs",
        }
    }
}

/// Key combinations listed in the help dialog.
pub const HELP: [(&str, Shortcut); 8] = [
    ("←", Shortcut::PrevPage),
    ("→", Shortcut::NextPage),
    ("Ctrl/⌘ + F", Shortcut::FocusSearch),
    ("Ctrl/⌘ + W", Shortcut::ToggleWords),
    ("Ctrl/⌘ + T", Shortcut::ToggleTranslations),
    ("Ctrl/⌘ + R", Shortcut::Shuffle),
    ("Ctrl/⌘ + Shift + R", Shortcut::ResetKnown),
    ("Esc", Shortcut::CloseOverlays),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn press(key: &str) -> KeyPress<'_> {
        KeyPress {
            key,
            ..Default::default()
        }
    }

    #[test]
    fn arrows_and_escape() {
        assert_eq!(Shortcut::from_key(press("ArrowLeft")), Some(Shortcut::PrevPage));
        assert_eq!(Shortcut::from_key(press("ArrowRight")), Some(Shortcut::NextPage));
        assert_eq!(Shortcut::from_key(press("Escape")), Some(Shortcut::CloseOverlays));
        assert_eq!(Shortcut::from_key(press("f")), None);
    }

    #[test]
    fn command_combinations() {
        let ctrl = |key| KeyPress {
            ctrl: true,
            ..press(key)
        };
        assert_eq!(Shortcut::from_key(ctrl("f")), Some(Shortcut::FocusSearch));
        assert_eq!(Shortcut::from_key(ctrl("w")), Some(Shortcut::ToggleWords));
        assert_eq!(Shortcut::from_key(ctrl("t")), Some(Shortcut::ToggleTranslations));
        assert_eq!(Shortcut::from_key(ctrl("r")), Some(Shortcut::Shuffle));
        assert_eq!(
            Shortcut::from_key(KeyPress {
                shift: true,
                ..ctrl("R")
            }),
            Some(Shortcut::ResetKnown)
        );
        let meta = KeyPress {
            meta: true,
            ..press("F")
        };
        assert_eq!(Shortcut::from_key(meta), Some(Shortcut::FocusSearch));
    }

    #[test]
    fn ignored_while_typing() {
        let typing = KeyPress {
            typing: true,
            ..press("ArrowLeft")
        };
        assert_eq!(Shortcut::from_key(typing), None);
    }
}
