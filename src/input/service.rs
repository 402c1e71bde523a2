//! High-level input service.
//!
//! Maps coalesced raw events to [`Action`]s through a configurable key table and
//! resolves the `g` prefix (`gg`, `gt`) with a blocking second read.

use crate::error::{FatError, Result};
use crate::input::raw::{EventSource, RawInputCollector, RawInputEvent, ScrollDirection};
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::{BTreeMap, HashMap};

/// Everything a key can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    Quit,
    ScrollUp,
    ScrollDown,
    ScrollLeft,
    ScrollRight,
    PageUp,
    PageDown,
    JumpToStart,
    JumpToEnd,
    JumpToLine,
    ToggleWrap,
    Search,
    NextMatch,
    PrevMatch,
    ToggleViewMode,
    OpenExternal,
    OpenExternalDefault,
    GoBack,
    SelectTheme,
    ToggleHelp,
    Confirm,
}

const NORMAL: &str = "normal";
const ARCHIVE: &str = "archive";
const BINARY: &str = "binary";
const ALL_MODES: &[&str] = &[NORMAL, ARCHIVE, BINARY];

/// Static description of one action: config name, help text, default keys and the view
/// modes whose help overlay lists it.
#[derive(Debug, Clone, Copy)]
pub struct ActionInfo {
    pub action: Action,
    pub name: &'static str,
    pub description: &'static str,
    pub default_keys: &'static [&'static str],
    pub modes: &'static [&'static str],
}

/// All actions in help-overlay order.
pub const ACTIONS: &[ActionInfo] = &[
    ActionInfo {
        action: Action::Quit,
        name: "quit",
        description: "Quit the application",
        default_keys: &["q"],
        modes: ALL_MODES,
    },
    ActionInfo {
        action: Action::ScrollUp,
        name: "scroll_up",
        description: "Scroll up one line",
        default_keys: &["k", "Up"],
        modes: ALL_MODES,
    },
    ActionInfo {
        action: Action::ScrollDown,
        name: "scroll_down",
        description: "Scroll down one line",
        default_keys: &["j", "Down"],
        modes: ALL_MODES,
    },
    ActionInfo {
        action: Action::ScrollLeft,
        name: "scroll_left",
        description: "Scroll left (wrap off)",
        default_keys: &["h", "Left"],
        modes: &[NORMAL],
    },
    ActionInfo {
        action: Action::ScrollRight,
        name: "scroll_right",
        description: "Scroll right (wrap off)",
        default_keys: &["l", "Right"],
        modes: &[NORMAL],
    },
    ActionInfo {
        action: Action::PageUp,
        name: "page_up",
        description: "Scroll up one page",
        default_keys: &["PageUp", "b"],
        modes: ALL_MODES,
    },
    ActionInfo {
        action: Action::PageDown,
        name: "page_down",
        description: "Scroll down one page",
        default_keys: &["PageDown", "Space"],
        modes: ALL_MODES,
    },
    ActionInfo {
        action: Action::JumpToStart,
        name: "jump_to_start",
        description: "Jump to the first line (also gg)",
        default_keys: &["Home"],
        modes: ALL_MODES,
    },
    ActionInfo {
        action: Action::JumpToEnd,
        name: "jump_to_end",
        description: "Jump to the last line",
        default_keys: &["G", "End"],
        modes: ALL_MODES,
    },
    ActionInfo {
        action: Action::JumpToLine,
        name: "jump_to_line",
        description: "Go to a line number (also gt)",
        default_keys: &[":"],
        modes: ALL_MODES,
    },
    ActionInfo {
        action: Action::ToggleWrap,
        name: "toggle_wrap",
        description: "Toggle line wrapping",
        default_keys: &["w"],
        modes: &[NORMAL],
    },
    ActionInfo {
        action: Action::Search,
        name: "search",
        description: "Search forward",
        default_keys: &["/"],
        modes: &[NORMAL, BINARY],
    },
    ActionInfo {
        action: Action::NextMatch,
        name: "next_match",
        description: "Go to the next match",
        default_keys: &["n"],
        modes: &[NORMAL, BINARY],
    },
    ActionInfo {
        action: Action::PrevMatch,
        name: "prev_match",
        description: "Go to the previous match",
        default_keys: &["N"],
        modes: &[NORMAL, BINARY],
    },
    ActionInfo {
        action: Action::ToggleViewMode,
        name: "toggle_view_mode",
        description: "Switch between text and hex view",
        default_keys: &["x"],
        modes: &[NORMAL, BINARY],
    },
    ActionInfo {
        action: Action::OpenExternal,
        name: "open_external",
        description: "Open the file with a command",
        default_keys: &["o"],
        modes: ALL_MODES,
    },
    ActionInfo {
        action: Action::OpenExternalDefault,
        name: "open_external_default",
        description: "Open the file with its default command",
        default_keys: &["O"],
        modes: ALL_MODES,
    },
    ActionInfo {
        action: Action::GoBack,
        name: "go_back",
        description: "Go back to the parent archive",
        default_keys: &["Backspace"],
        modes: ALL_MODES,
    },
    ActionInfo {
        action: Action::SelectTheme,
        name: "select_theme",
        description: "Choose a color theme",
        default_keys: &["t"],
        modes: ALL_MODES,
    },
    ActionInfo {
        action: Action::ToggleHelp,
        name: "toggle_help",
        description: "Show this help",
        default_keys: &["?"],
        modes: ALL_MODES,
    },
    ActionInfo {
        action: Action::Confirm,
        name: "confirm",
        description: "Open the selected entry",
        default_keys: &["Enter"],
        modes: &[ARCHIVE],
    },
];

impl Action {
    pub fn info(self) -> &'static ActionInfo {
        // ACTIONS lists every variant exactly once, in declaration order.
        &ACTIONS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ACTIONS.iter().find(|info| info.name == name).map(|info| info.action)
    }
}

/// A key as written in the configuration, normalized for lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    /// Normalize a key event: the shift state of character keys is already part of the
    /// character, so it is dropped.
    pub fn from_event(key: &KeyEvent) -> Self {
        let mut modifiers = key.modifiers & (KeyModifiers::CONTROL | KeyModifiers::ALT);
        if !matches!(key.code, KeyCode::Char(_)) {
            modifiers |= key.modifiers & KeyModifiers::SHIFT;
        }
        Self {
            code: key.code,
            modifiers,
        }
    }
}

/// Parse a key name such as `q`, `G`, `Space`, `PageDown`, `F5` or `Ctrl+c`.
pub fn parse_key(name: &str) -> Result<KeySpec> {
    let (modifiers, base) = match name.split_once('+') {
        Some((prefix, rest)) if !rest.is_empty() => {
            let modifier = match prefix.to_ascii_lowercase().as_str() {
                "ctrl" | "c" => KeyModifiers::CONTROL,
                "alt" | "a" | "m" => KeyModifiers::ALT,
                _ => return Err(FatError::invalid_argument(format!("unknown modifier in '{}'", name))),
            };
            (modifier, rest)
        }
        _ => (KeyModifiers::NONE, name),
    };

    let mut chars = base.chars();
    let code = match (chars.next(), chars.next()) {
        (Some(c), None) => KeyCode::Char(c),
        _ => match base.to_ascii_lowercase().as_str() {
            "space" => KeyCode::Char(' '),
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "enter" | "return" => KeyCode::Enter,
            "backspace" => KeyCode::Backspace,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "delete" | "del" => KeyCode::Delete,
            "insert" => KeyCode::Insert,
            lower => match lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                Some(n) if (1..=24).contains(&n) => KeyCode::F(n),
                _ => return Err(FatError::invalid_argument(format!("unknown key '{}'", name))),
            },
        },
    };
    Ok(KeySpec { code, modifiers })
}

/// Key table: which action each key triggers, plus the key names per action for the help
/// overlay.
#[derive(Debug, Clone)]
pub struct KeyMap {
    lookup: HashMap<KeySpec, Action>,
    names: BTreeMap<Action, Vec<String>>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::with_overrides(&BTreeMap::new())
    }
}

impl KeyMap {
    /// Default bindings with the actions named in `overrides` rebound. An override
    /// replaces every default key of that action; unknown actions and keys are logged
    /// and skipped.
    pub fn with_overrides(overrides: &BTreeMap<String, Vec<String>>) -> Self {
        let mut names: BTreeMap<Action, Vec<String>> = ACTIONS
            .iter()
            .map(|info| {
                let keys = info.default_keys.iter().map(|k| k.to_string()).collect();
                (info.action, keys)
            })
            .collect();

        for (action_name, keys) in overrides {
            match Action::from_name(action_name) {
                Some(action) => {
                    names.insert(action, keys.clone());
                }
                None => log::warn!("ignoring keys for unknown action '{}'", action_name),
            }
        }

        let mut lookup = HashMap::new();
        for (action, keys) in &mut names {
            keys.retain(|key| match parse_key(key) {
                Ok(spec) => {
                    if let Some(previous) = lookup.insert(spec, *action) {
                        log::info!("key '{}' moved from {} to {}", key, previous.name(), action.name());
                    }
                    true
                }
                Err(err) => {
                    log::warn!("{}", err);
                    false
                }
            });
        }

        Self { lookup, names }
    }

    pub fn action_for(&self, key: &KeyEvent) -> Option<Action> {
        self.lookup.get(&KeySpec::from_event(key)).copied()
    }

    /// Key names bound to `action`, in configuration order.
    pub fn keys_for(&self, action: Action) -> &[String] {
        self.names.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `(keys, description)` rows of the help overlay for the view mode called `mode`.
    pub fn help_rows(&self, mode: &str) -> Vec<(String, &'static str)> {
        ACTIONS
            .iter()
            .filter(|info| info.modes.contains(&mode))
            .filter(|info| !self.keys_for(info.action).is_empty())
            .map(|info| (self.keys_for(info.action).join(", "), info.description))
            .collect()
    }
}

/// What the main loop has to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Action(Action),
    Scroll {
        direction: ScrollDirection,
        lines: u64,
    },
    Resize {
        width: u16,
        height: u16,
    },
    /// A key press with no binding
    Unbound(KeyEvent),
}

/// Service responsible for producing [`InputEvent`]s from terminal events.
#[derive(Debug)]
pub struct InputService {
    raw_input: RawInputCollector,
    keymap: KeyMap,
}

impl InputService {
    pub fn new(source: Box<dyn EventSource>, keymap: KeyMap) -> Self {
        Self {
            raw_input: RawInputCollector::new(source),
            keymap,
        }
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    /// Block until the next event the main loop cares about.
    pub fn next_event(&mut self) -> Result<InputEvent> {
        loop {
            let key = match self.raw_input.next_event()? {
                RawInputEvent::Key(key) => key,
                RawInputEvent::Resize { width, height } => {
                    return Ok(InputEvent::Resize { width, height })
                }
                RawInputEvent::Scroll { direction, lines } => {
                    return Ok(InputEvent::Scroll { direction, lines })
                }
            };

            if let Some(action) = self.keymap.action_for(&key) {
                return Ok(InputEvent::Action(action));
            }

            if key.code == KeyCode::Char('g') && key.modifiers.is_empty() {
                match self.raw_input.next_key()?.code {
                    KeyCode::Char('g') => return Ok(InputEvent::Action(Action::JumpToStart)),
                    KeyCode::Char('t') => return Ok(InputEvent::Action(Action::JumpToLine)),
                    other => {
                        log::debug!("ignoring g-prefixed key {:?}", other);
                        continue;
                    }
                }
            }

            return Ok(InputEvent::Unbound(key));
        }
    }

    /// Block until the next key press; used by prompts, overlays and messages.
    pub fn next_key(&mut self) -> Result<KeyEvent> {
        self.raw_input.next_key()
    }
}
