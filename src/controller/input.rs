/// Platform-agnostic input handling system
use std::collections::HashSet;

/// Platform-independent input events
#[derive(Debug, Clone)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(String),
    KeyUp(String),

    // On-screen buttons
    TouchStart(TouchButton),
    TouchEnd(TouchButton),

    // Orbit drag
    DragStart,
    DragMove { dx: f32, dy: f32 },
    DragEnd,

    // Window events
    FocusLost,
    VisibilityChanged { visible: bool },
}

/// Logical movement actions the player can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveAction {
    MoveForward,
    MoveBack,
    StrafeLeft,
    StrafeRight,
    TurnLeft,
    TurnRight,
}

impl MoveAction {
    pub const ALL: [MoveAction; 6] = [
        MoveAction::MoveForward,
        MoveAction::MoveBack,
        MoveAction::StrafeLeft,
        MoveAction::StrafeRight,
        MoveAction::TurnLeft,
        MoveAction::TurnRight,
    ];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of actions held during one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSet(u8);

impl ActionSet {
    pub const EMPTY: ActionSet = ActionSet(0);

    pub fn insert(&mut self, action: MoveAction) {
        self.0 |= action.bit();
    }

    pub fn contains(&self, action: MoveAction) -> bool {
        self.0 & action.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<MoveAction> for ActionSet {
    fn from_iter<I: IntoIterator<Item = MoveAction>>(iter: I) -> Self {
        let mut set = ActionSet::EMPTY;
        for action in iter {
            set.insert(action);
        }
        set
    }
}

/// The four on-screen buttons shown on mobile browsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchButton {
    Up,
    Down,
    Left,
    Right,
}

impl TouchButton {
    pub const ALL: [TouchButton; 4] = [
        TouchButton::Up,
        TouchButton::Down,
        TouchButton::Left,
        TouchButton::Right,
    ];

    /// DOM id of the button element.
    pub fn element_id(self) -> &'static str {
        match self {
            TouchButton::Up => "mobile-up",
            TouchButton::Down => "mobile-down",
            TouchButton::Left => "mobile-left",
            TouchButton::Right => "mobile-right",
        }
    }

    /// Raw key identifier the button stands in for.
    pub fn key_id(self) -> &'static str {
        match self {
            TouchButton::Up => "ArrowUp",
            TouchButton::Down => "ArrowDown",
            TouchButton::Left => "a",
            TouchButton::Right => "d",
        }
    }
}

/// Raw key state plus the pending orbit drag.
pub struct InputState {
    pub pressed_keys: HashSet<String>,
    pub drag_delta: (f32, f32),
    pub dragging: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
            drag_delta: (0.0, 0.0),
            dragging: false,
        }
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => self.set_key(key, true),
            InputEvent::KeyUp(key) => self.set_key(key, false),
            InputEvent::TouchStart(button) => self.set_key(button.key_id(), true),
            InputEvent::TouchEnd(button) => self.set_key(button.key_id(), false),
            InputEvent::DragStart => self.dragging = true,
            InputEvent::DragMove { dx, dy } => {
                if self.dragging {
                    self.drag_delta.0 += dx;
                    self.drag_delta.1 += dy;
                }
            }
            InputEvent::DragEnd => self.dragging = false,
            InputEvent::FocusLost | InputEvent::VisibilityChanged { .. } => {
                self.clear_keys();
                self.dragging = false;
            }
        }
    }

    pub fn set_key(&mut self, key: &str, held: bool) {
        if held {
            self.pressed_keys.insert(key.to_string());
        } else {
            self.pressed_keys.remove(key);
        }
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
    }

    pub fn consume_drag(&mut self) -> (f32, f32) {
        let result = self.drag_delta;
        self.drag_delta = (0.0, 0.0);
        result
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// Key mapping configuration
#[derive(Clone, Debug)]
pub struct KeyBindings {
    pub forward: Vec<String>,
    pub backward: Vec<String>,
    pub strafe_left: Vec<String>,
    pub strafe_right: Vec<String>,
    pub turn_left: Vec<String>,
    pub turn_right: Vec<String>,
}

fn keys(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: keys(&["ArrowUp", "w", "W"]),
            backward: keys(&["ArrowDown", "s", "S"]),
            strafe_left: keys(&["a", "A"]),
            strafe_right: keys(&["d", "D"]),
            turn_left: keys(&["ArrowLeft", "a", "A"]),
            turn_right: keys(&["ArrowRight", "d", "D"]),
        }
    }
}

impl KeyBindings {
    pub fn keys_for(&self, action: MoveAction) -> &[String] {
        match action {
            MoveAction::MoveForward => &self.forward,
            MoveAction::MoveBack => &self.backward,
            MoveAction::StrafeLeft => &self.strafe_left,
            MoveAction::StrafeRight => &self.strafe_right,
            MoveAction::TurnLeft => &self.turn_left,
            MoveAction::TurnRight => &self.turn_right,
        }
    }
}

/// Translates raw key identifiers into movement actions.
#[derive(Clone, Debug)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    /// Actions currently held according to the raw key state.
    pub fn actions(&self, input: &InputState) -> ActionSet {
        MoveAction::ALL
            .into_iter()
            .filter(|action| {
                self.bindings
                    .keys_for(*action)
                    .iter()
                    .any(|k| input.is_held(k))
            })
            .collect()
    }

    /// Whether a raw key is bound to any movement action.
    pub fn is_movement_key(&self, key: &str) -> bool {
        MoveAction::ALL
            .into_iter()
            .any(|action| self.bindings.keys_for(action).iter().any(|k| k == key))
    }

    /// Keys whose browser default (scrolling) should be suppressed.
    pub fn wants_prevent_default(&self, key: &str) -> bool {
        self.is_movement_key(key)
            || matches!(key, "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight" | " ")
    }
}

impl Default for InputProcessor {
    fn default() -> Self {
        Self::new(KeyBindings::default())
    }
}

/// Whether a user agent belongs to a phone or tablet browser.
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    const MOBILE_MARKERS: [&str; 8] = [
        "android",
        "webos",
        "iphone",
        "ipad",
        "ipod",
        "blackberry",
        "iemobile",
        "opera mini",
    ];
    let ua = user_agent.to_ascii_lowercase();
    MOBILE_MARKERS.iter().any(|m| ua.contains(m))
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{KeyboardEvent, MouseEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        }
    }

    pub fn mouse_move_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::DragMove {
            dx: e.movement_x() as f32,
            dy: e.movement_y() as f32,
        }
    }
}

#[cfg(all(not(target_arch = "wasm32"), feature = "native"))]
pub mod native {
    use winit::keyboard::{Key, NamedKey};

    /// Map a winit logical key to the identifier a browser would report.
    pub fn key_id(key: &Key) -> Option<String> {
        match key {
            Key::Named(NamedKey::ArrowUp) => Some("ArrowUp".to_string()),
            Key::Named(NamedKey::ArrowDown) => Some("ArrowDown".to_string()),
            Key::Named(NamedKey::ArrowLeft) => Some("ArrowLeft".to_string()),
            Key::Named(NamedKey::ArrowRight) => Some("ArrowRight".to_string()),
            Key::Character(s) => Some(s.to_string()),
            _ => None,
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(keys: &[&str]) -> InputState {
        let mut state = InputState::new();
        for k in keys {
            state.set_key(k, true);
        }
        state
    }

    #[test]
    fn unknown_keys_are_not_held() {
        let state = held(&["w"]);
        assert!(state.is_held("w"));
        assert!(!state.is_held("q"));
        assert!(!state.is_held(""));
    }

    #[test]
    fn default_bindings_resolve_actions() {
        let processor = InputProcessor::default();

        let actions = processor.actions(&held(&["W"]));
        assert!(actions.contains(MoveAction::MoveForward));
        assert!(!actions.contains(MoveAction::MoveBack));

        let actions = processor.actions(&held(&["ArrowDown"]));
        assert_eq!(actions, ActionSet::from_iter([MoveAction::MoveBack]));

        // "a" strafes and turns at the same time
        let actions = processor.actions(&held(&["a"]));
        assert!(actions.contains(MoveAction::StrafeLeft));
        assert!(actions.contains(MoveAction::TurnLeft));

        // arrow keys only turn
        let actions = processor.actions(&held(&["ArrowRight"]));
        assert_eq!(actions, ActionSet::from_iter([MoveAction::TurnRight]));

        assert!(processor.actions(&held(&["x", "Shift"])).is_empty());
    }

    #[test]
    fn touch_buttons_press_their_keys() {
        let processor = InputProcessor::default();
        let mut state = InputState::new();

        state.process_event(&InputEvent::TouchStart(TouchButton::Up));
        state.process_event(&InputEvent::TouchStart(TouchButton::Right));
        let actions = processor.actions(&state);
        assert!(actions.contains(MoveAction::MoveForward));
        assert!(actions.contains(MoveAction::StrafeRight));
        assert!(actions.contains(MoveAction::TurnRight));

        state.process_event(&InputEvent::TouchEnd(TouchButton::Up));
        state.process_event(&InputEvent::TouchEnd(TouchButton::Right));
        assert!(processor.actions(&state).is_empty());
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut state = held(&["w", "d"]);
        state.process_event(&InputEvent::DragStart);
        state.process_event(&InputEvent::FocusLost);
        assert!(state.pressed_keys.is_empty());
        assert!(!state.dragging);
    }

    #[test]
    fn drag_accumulates_only_while_dragging() {
        let mut state = InputState::new();
        state.process_event(&InputEvent::DragMove { dx: 5.0, dy: 1.0 });
        assert_eq!(state.consume_drag(), (0.0, 0.0));

        state.process_event(&InputEvent::DragStart);
        state.process_event(&InputEvent::DragMove { dx: 5.0, dy: 1.0 });
        state.process_event(&InputEvent::DragMove { dx: -2.0, dy: 0.5 });
        assert_eq!(state.consume_drag(), (3.0, 1.5));
        assert_eq!(state.consume_drag(), (0.0, 0.0));
    }

    #[test]
    fn movement_keys_are_recognised() {
        let processor = InputProcessor::default();
        assert!(processor.is_movement_key("w"));
        assert!(processor.is_movement_key("ArrowLeft"));
        assert!(!processor.is_movement_key("p"));
        assert!(processor.wants_prevent_default(" "));
    }

    #[test]
    fn mobile_user_agents() {
        assert!(is_mobile_user_agent(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15"
        ));
        assert!(is_mobile_user_agent("Mozilla/5.0 (Linux; Android 14; Pixel 8)"));
        assert!(is_mobile_user_agent("Opera/9.80 (J2ME/MIDP; Opera Mini/9.80)"));
        assert!(!is_mobile_user_agent(
            "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0"
        ));
    }
}
