//! Key bindings and lookup.

use std::fmt;

use serde::{Deserialize, Serialize};
use storyloom_playback::PlaybackAction;
use tracing::warn;

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    /// Control only.
    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    fn without_shift(self) -> Self {
        Self {
            shift: false,
            ..self
        }
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (held, name) in [
            (self.ctrl, "Ctrl+"),
            (self.alt, "Alt+"),
            (self.shift, "Shift+"),
            (self.meta, "Meta+"),
        ] {
            if held {
                f.write_str(name)?;
            }
        }
        Ok(())
    }
}

/// A raw key press, as reported by the input device.
///
/// `key` uses the DOM `KeyboardEvent.key` names: `"Enter"`, `"ArrowLeft"`,
/// `"a"`, `" "` for the space bar (`"Space"` is accepted too).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: String,
    #[serde(flatten)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key press with no modifiers.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::NONE,
        }
    }

    /// The same key press with `modifiers` held.
    #[must_use]
    pub fn with(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Canonical key name: the space bar is `"Space"`, single characters are
/// lowercased, named keys are kept as written.
fn normalize(key: &str) -> String {
    if key == " " {
        return "Space".to_owned();
    }
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_lowercase().collect(),
        _ => key.to_owned(),
    }
}

fn is_character(key: &str) -> bool {
    key.chars().nth(1).is_none()
}

/// One entry of a binding table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    key: String,
    /// `None` accepts any modifiers.
    modifiers: Option<Modifiers>,
    action: PlaybackAction,
}

impl Binding {
    /// Binds `key` to `action` with no modifiers held.
    #[must_use]
    pub fn new(key: &str, action: PlaybackAction) -> Self {
        Self {
            key: normalize(key),
            modifiers: Some(Modifiers::NONE),
            action,
        }
    }

    /// Requires exactly `modifiers` to be held.
    #[must_use]
    pub fn with(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = Some(modifiers);
        self
    }

    /// Accepts the key whatever modifiers are held.
    #[must_use]
    pub fn any_modifiers(mut self) -> Self {
        self.modifiers = None;
        self
    }

    /// The canonical key name.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Required modifiers, or `None` if any are accepted.
    #[must_use]
    pub fn modifiers(&self) -> Option<Modifiers> {
        self.modifiers
    }

    /// The bound action.
    #[must_use]
    pub fn action(&self) -> PlaybackAction {
        self.action
    }

    /// Returns `true` if `event` triggers this binding.
    ///
    /// Shift is ignored for single-character keys unless the binding asks
    /// for it, since it only changes the character's case.
    #[must_use]
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if self.key != normalize(&event.key) {
            return false;
        }
        let Some(required) = self.modifiers else {
            return true;
        };
        required == event.modifiers
            || (is_character(&self.key)
                && !required.shift
                && required == event.modifiers.without_shift())
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.key == other.key
            && match (self.modifiers, other.modifiers) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.modifiers {
            Some(modifiers) => write!(f, "{modifiers}{} -> {:?}", self.key, self.action),
            None => write!(f, "*+{} -> {:?}", self.key, self.action),
        }
    }
}

/// An ordered list of bindings plus the digit-key choice fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingTable {
    bindings: Vec<Binding>,
    digit_choices: bool,
}

impl Default for BindingTable {
    fn default() -> Self {
        Self::default_table()
    }
}

impl BindingTable {
    /// Builds a table from `bindings`, checked in order. Shadowed bindings
    /// are logged.
    #[must_use]
    pub fn new(bindings: Vec<Binding>) -> Self {
        let table = Self {
            bindings,
            digit_choices: true,
        };
        for conflict in table.conflicts() {
            warn!(%conflict, "key binding conflict");
        }
        table
    }

    /// The standard playtest bindings.
    #[must_use]
    pub fn default_table() -> Self {
        use PlaybackAction::{Advance, Restart, Rollback, SkipMedia, ToggleAuto, ToggleSkip};

        Self::new(vec![
            Binding::new("Enter", Advance).any_modifiers(),
            Binding::new("Space", Advance).any_modifiers(),
            Binding::new("ArrowRight", Advance).any_modifiers(),
            Binding::new("r", Restart).with(Modifiers::CTRL),
            Binding::new("Backspace", Rollback).any_modifiers(),
            Binding::new("ArrowLeft", Rollback).any_modifiers(),
            Binding::new("PageUp", Rollback).any_modifiers(),
            Binding::new("a", ToggleAuto),
            Binding::new("s", ToggleSkip),
            Binding::new("Escape", SkipMedia).any_modifiers(),
        ])
    }

    /// Turns the `1`-`9` choice fallback on or off.
    #[must_use]
    pub fn with_digit_choices(mut self, enabled: bool) -> Self {
        self.digit_choices = enabled;
        self
    }

    /// The bindings, in lookup order.
    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// The action for `event`, if any.
    ///
    /// The first matching binding wins. Digits `1`-`9` select the
    /// corresponding displayed choice, but only when no binding matched.
    #[must_use]
    pub fn lookup(&self, event: &KeyEvent) -> Option<PlaybackAction> {
        if let Some(binding) = self.bindings.iter().find(|b| b.matches(event)) {
            return Some(binding.action);
        }
        if !self.digit_choices {
            return None;
        }
        let mut chars = event.key.chars();
        match (chars.next(), chars.next()) {
            (Some(digit @ '1'..='9'), None) => digit
                .to_digit(10)
                .map(|d| PlaybackAction::SelectChoice(d as usize - 1)),
            _ => None,
        }
    }

    /// Bindings that can never fire for some event because an earlier
    /// binding on the same key claims it first.
    #[must_use]
    pub fn conflicts(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for (later_index, later) in self.bindings.iter().enumerate() {
            let shadowing = self.bindings[..later_index]
                .iter()
                .find(|earlier| earlier.overlaps(later));
            if let Some(earlier) = shadowing {
                warnings.push(format!("binding '{later}' is shadowed by '{earlier}'"));
            }
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_maps_standard_keys() {
        let table = BindingTable::default_table();

        assert_eq!(table.lookup(&KeyEvent::new("Enter")), Some(PlaybackAction::Advance));
        assert_eq!(table.lookup(&KeyEvent::new(" ")), Some(PlaybackAction::Advance));
        assert_eq!(table.lookup(&KeyEvent::new("PageUp")), Some(PlaybackAction::Rollback));
        assert_eq!(table.lookup(&KeyEvent::new("Escape")), Some(PlaybackAction::SkipMedia));
        assert_eq!(table.lookup(&KeyEvent::new("s")), Some(PlaybackAction::ToggleSkip));
    }

    #[test]
    fn test_single_character_keys_ignore_case() {
        let table = BindingTable::default_table();

        let event = KeyEvent::new("A").with(Modifiers {
            shift: true,
            ..Modifiers::NONE
        });

        assert_eq!(table.lookup(&event), Some(PlaybackAction::ToggleAuto));
    }

    #[test]
    fn test_required_modifiers_match_exactly() {
        // Arrange
        let table = BindingTable::default_table();
        let ctrl_shift = Modifiers {
            ctrl: true,
            shift: true,
            ..Modifiers::NONE
        };

        let ctrl_alt = Modifiers {
            ctrl: true,
            alt: true,
            ..Modifiers::NONE
        };

        // Act / Assert
        assert_eq!(
            table.lookup(&KeyEvent::new("r").with(Modifiers::CTRL)),
            Some(PlaybackAction::Restart)
        );
        assert_eq!(table.lookup(&KeyEvent::new("r")), None);
        assert_eq!(
            table.lookup(&KeyEvent::new("R").with(ctrl_shift)),
            Some(PlaybackAction::Restart)
        );
        assert_eq!(table.lookup(&KeyEvent::new("r").with(ctrl_alt)), None);
    }

    #[test]
    fn test_letter_bindings_ignore_modified_presses() {
        // Arrange
        let table = BindingTable::default_table();
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };

        // Act / Assert
        assert_eq!(table.lookup(&KeyEvent::new("a").with(Modifiers::CTRL)), None);
        assert_eq!(table.lookup(&KeyEvent::new("s").with(meta)), None);
        assert_eq!(
            table.lookup(&KeyEvent::new("Enter").with(Modifiers::CTRL)),
            Some(PlaybackAction::Advance)
        );
    }

    #[test]
    fn test_digit_fallback_selects_displayed_choice() {
        let table = BindingTable::default_table();

        assert_eq!(
            table.lookup(&KeyEvent::new("1")),
            Some(PlaybackAction::SelectChoice(0))
        );
        assert_eq!(
            table.lookup(&KeyEvent::new("9")),
            Some(PlaybackAction::SelectChoice(8))
        );
        assert_eq!(table.lookup(&KeyEvent::new("0")), None);
    }

    #[test]
    fn test_static_binding_wins_over_digit_fallback() {
        let table = BindingTable::new(vec![Binding::new("1", PlaybackAction::Restart)]);

        assert_eq!(table.lookup(&KeyEvent::new("1")), Some(PlaybackAction::Restart));
        assert_eq!(
            table.lookup(&KeyEvent::new("2")),
            Some(PlaybackAction::SelectChoice(1))
        );
    }

    #[test]
    fn test_digit_fallback_can_be_disabled() {
        let table = BindingTable::default_table().with_digit_choices(false);

        assert_eq!(table.lookup(&KeyEvent::new("1")), None);
    }

    #[test]
    fn test_first_matching_binding_wins() {
        let table = BindingTable::new(vec![
            Binding::new("x", PlaybackAction::Advance),
            Binding::new("x", PlaybackAction::Rollback),
        ]);

        assert_eq!(table.lookup(&KeyEvent::new("x")), Some(PlaybackAction::Advance));
    }

    #[test]
    fn test_default_table_has_no_conflicts() {
        assert!(BindingTable::default_table().conflicts().is_empty());
    }

    #[test]
    fn test_conflicts_report_shadowed_bindings() {
        // Arrange
        let table = BindingTable::new(vec![
            Binding::new("x", PlaybackAction::Advance).any_modifiers(),
            Binding::new("X", PlaybackAction::Rollback).with(Modifiers::CTRL),
            Binding::new("y", PlaybackAction::Restart).with(Modifiers::CTRL),
            Binding::new("y", PlaybackAction::Advance).with(Modifiers {
                alt: true,
                ..Modifiers::NONE
            }),
            Binding::new("z", PlaybackAction::Advance),
            Binding::new("Z", PlaybackAction::Restart),
        ]);

        // Act
        let conflicts = table.conflicts();

        // Assert
        assert_eq!(conflicts.len(), 2);
        assert!(conflicts[0].contains("Ctrl+x"));
        assert!(conflicts[1].contains("'z -> Restart'"));
    }

    #[test]
    fn test_key_event_deserializes_with_optional_modifiers() {
        let plain: KeyEvent = serde_json::from_str(r#"{"key": "Enter"}"#).unwrap();
        let chord: KeyEvent = serde_json::from_str(r#"{"key": "r", "ctrl": true}"#).unwrap();

        assert_eq!(plain, KeyEvent::new("Enter"));
        assert_eq!(chord, KeyEvent::new("r").with(Modifiers::CTRL));
    }
}
