use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    Quit,
    ToggleHelp,
    NewWindow,
    // Tab cycling within the focused window's zone group
    CycleNextTab,
    CyclePrevTab,
    // Zone assignment
    MoveLeft,
    MoveRight,
    ExtendSpan,
    ShrinkSpan,
    Unsnap,
    // Focus the frontmost window in a neighbouring zone
    FocusZoneLeft,
    FocusZoneRight,
    // Window/desktop lifecycle
    CloseWindow,
    SendToNextDesktop,
    SwitchDesktop,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Quit => "Quit",
            Action::ToggleHelp => "Toggle help",
            Action::NewWindow => "New window",
            Action::CycleNextTab => "Next tab in zone",
            Action::CyclePrevTab => "Previous tab in zone",
            Action::MoveLeft => "Move window one zone left",
            Action::MoveRight => "Move window one zone right",
            Action::ExtendSpan => "Extend window into next zone",
            Action::ShrinkSpan => "Release last spanned zone",
            Action::Unsnap => "Unsnap window",
            Action::FocusZoneLeft => "Focus zone on the left",
            Action::FocusZoneRight => "Focus zone on the right",
            Action::CloseWindow => "Close window (leaves a stale tab)",
            Action::SendToNextDesktop => "Send window to next desktop",
            Action::SwitchDesktop => "Switch to next desktop",
        };
        write!(f, "{}", s)
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

    pub fn matches(&self, key: &KeyEvent) -> bool {
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
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => "BackTab".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Delete => "Delete".to_string(),
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

#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use Action::*;
        let mut kb = Self::new();
        kb.add(Quit, KeyCombo::new(KeyCode::Char('q'), KeyModifiers::NONE));
        kb.add(
            Quit,
            KeyCombo::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        kb.add(
            ToggleHelp,
            KeyCombo::new(KeyCode::Char('?'), KeyModifiers::NONE),
        );
        kb.add(
            ToggleHelp,
            KeyCombo::new(KeyCode::Char('?'), KeyModifiers::SHIFT),
        );
        kb.add(ToggleHelp, KeyCombo::new(KeyCode::Esc, KeyModifiers::NONE));
        kb.add(
            NewWindow,
            KeyCombo::new(KeyCode::Char('n'), KeyModifiers::NONE),
        );
        kb.add(CycleNextTab, KeyCombo::new(KeyCode::Tab, KeyModifiers::NONE));
        kb.add(
            CyclePrevTab,
            KeyCombo::new(KeyCode::BackTab, KeyModifiers::SHIFT),
        );
        kb.add(
            CyclePrevTab,
            KeyCombo::new(KeyCode::BackTab, KeyModifiers::NONE),
        );
        kb.add(MoveLeft, KeyCombo::new(KeyCode::Left, KeyModifiers::SHIFT));
        kb.add(MoveRight, KeyCombo::new(KeyCode::Right, KeyModifiers::SHIFT));
        kb.add(
            ExtendSpan,
            KeyCombo::new(KeyCode::Char('+'), KeyModifiers::NONE),
        );
        kb.add(
            ExtendSpan,
            KeyCombo::new(KeyCode::Char('+'), KeyModifiers::SHIFT),
        );
        kb.add(
            ShrinkSpan,
            KeyCombo::new(KeyCode::Char('-'), KeyModifiers::NONE),
        );
        kb.add(Unsnap, KeyCombo::new(KeyCode::Char('u'), KeyModifiers::NONE));
        kb.add(FocusZoneLeft, KeyCombo::new(KeyCode::Left, KeyModifiers::NONE));
        kb.add(
            FocusZoneRight,
            KeyCombo::new(KeyCode::Right, KeyModifiers::NONE),
        );
        kb.add(
            CloseWindow,
            KeyCombo::new(KeyCode::Char('x'), KeyModifiers::NONE),
        );
        kb.add(
            SendToNextDesktop,
            KeyCombo::new(KeyCode::Char('s'), KeyModifiers::NONE),
        );
        kb.add(
            SwitchDesktop,
            KeyCombo::new(KeyCode::Char('d'), KeyModifiers::NONE),
        );
        kb
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        if let Some(list) = self.map.get(&action) {
            list.iter().any(|c| c.matches(key))
        } else {
            false
        }
    }

    pub fn action_for_key(&self, key: &KeyEvent) -> Option<Action> {
        for (act, list) in &self.map {
            if list.iter().any(|c| c.matches(key)) {
                return Some(*act);
            }
        }
        None
    }

    /// Actions with their display combos, sorted by action so the help
    /// listing is stable between runs.
    pub fn help_entries(&self) -> Vec<(Action, Vec<String>)> {
        let mut v: Vec<(Action, Vec<String>)> = self
            .map
            .iter()
            .map(|(act, list)| (*act, list.iter().map(|c| c.display()).collect()))
            .collect();
        v.sort_by_key(|(act, _)| *act);
        v
    }
}
