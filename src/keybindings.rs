use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    Quit,
    ToggleHelp,
    FocusNext,
    FocusPrev,
    /// Open the n-th application of the launcher.
    Launch(usize),
    CloseWindow,
    MinimizeWindow,
    MaximizeWindow,
    RestoreWindow,
    SnapLeft,
    SnapRight,
    SaveDocument,
    CancelGesture,
    // Confirm dialog
    ConfirmToggle,
    ConfirmAccept,
    ConfirmCancel,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Quit => write!(f, "Quit"),
            Action::ToggleHelp => write!(f, "Toggle help"),
            Action::FocusNext => write!(f, "Focus next window"),
            Action::FocusPrev => write!(f, "Focus previous window"),
            Action::Launch(slot) => write!(f, "Open app {}", slot + 1),
            Action::CloseWindow => write!(f, "Close window"),
            Action::MinimizeWindow => write!(f, "Minimize window"),
            Action::MaximizeWindow => write!(f, "Maximize / restore"),
            Action::RestoreWindow => write!(f, "Restore window"),
            Action::SnapLeft => write!(f, "Snap left"),
            Action::SnapRight => write!(f, "Snap right"),
            Action::SaveDocument => write!(f, "Save document"),
            Action::CancelGesture => write!(f, "Cancel drag / resize"),
            Action::ConfirmToggle => write!(f, "Confirm toggle"),
            Action::ConfirmAccept => write!(f, "Confirm accept"),
            Action::ConfirmCancel => write!(f, "Confirm cancel"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        // terminals disagree on whether BackTab carries SHIFT
        if self.code == KeyCode::BackTab && key.code == KeyCode::BackTab {
            return true;
        }
        key.code == self.code && key.modifiers == self.mods
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        let code = match self.code {
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => "Shift+Tab".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            _ => format!("{:?}", self.code),
        };
        parts.push(code);
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Desktop bindings. Window commands sit behind Alt so plain keys reach
    /// the focused app.
    pub fn desktop(launch_slots: usize) -> Self {
        use Action::*;
        let alt = KeyModifiers::ALT;
        let ctrl = KeyModifiers::CONTROL;
        let mut kb = Self::new();
        kb.add(Quit, KeyCombo::new(KeyCode::Char('q'), ctrl));
        kb.add(ToggleHelp, KeyCombo::plain(KeyCode::F(1)));
        kb.add(FocusNext, KeyCombo::plain(KeyCode::Tab));
        kb.add(FocusPrev, KeyCombo::plain(KeyCode::BackTab));
        for slot in 0..launch_slots.min(9) {
            let digit = char::from_digit(u32::try_from(slot + 1).unwrap_or(1), 10).unwrap_or('1');
            kb.add(Launch(slot), KeyCombo::new(KeyCode::Char(digit), alt));
        }
        kb.add(CloseWindow, KeyCombo::new(KeyCode::Char('w'), ctrl));
        kb.add(MinimizeWindow, KeyCombo::new(KeyCode::Down, alt));
        kb.add(MaximizeWindow, KeyCombo::new(KeyCode::Up, alt));
        kb.add(RestoreWindow, KeyCombo::new(KeyCode::Char('r'), alt));
        kb.add(SnapLeft, KeyCombo::new(KeyCode::Left, alt));
        kb.add(SnapRight, KeyCombo::new(KeyCode::Right, alt));
        kb.add(SaveDocument, KeyCombo::new(KeyCode::Char('s'), ctrl));
        kb.add(CancelGesture, KeyCombo::plain(KeyCode::Esc));
        kb.add(ConfirmToggle, KeyCombo::plain(KeyCode::Tab));
        kb.add(ConfirmToggle, KeyCombo::plain(KeyCode::Left));
        kb.add(ConfirmToggle, KeyCombo::plain(KeyCode::Right));
        kb.add(ConfirmAccept, KeyCombo::plain(KeyCode::Enter));
        kb.add(ConfirmCancel, KeyCombo::plain(KeyCode::Esc));
        kb.add(ConfirmCancel, KeyCombo::plain(KeyCode::Char('n')));
        kb
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        self.map
            .get(&action)
            .is_some_and(|list| list.iter().any(|c| c.matches(key)))
    }

    /// First of `actions` bound to `key`, in the order given.
    pub fn first_match(&self, actions: &[Action], key: &KeyEvent) -> Option<Action> {
        actions
            .iter()
            .copied()
            .find(|action| self.matches(*action, key))
    }

    /// Sorted by action so help text is stable.
    pub fn help_entries(&self) -> Vec<(Action, Vec<String>)> {
        let mut v: Vec<_> = self
            .map
            .iter()
            .map(|(act, list)| (*act, list.iter().map(KeyCombo::display).collect()))
            .collect();
        v.sort_by_key(|(act, _)| *act);
        v
    }

    /// Return the display strings for all combos mapped to `action`.
    pub fn combos_for(&self, action: Action) -> Vec<String> {
        self.map
            .get(&action)
            .map(|list| list.iter().map(|c| c.display()).collect())
            .unwrap_or_default()
    }
}
