#![forbid(unsafe_code)]

//! Decoded input event types.
//!
//! This module defines the closed set of events the decoder can produce.
//! All events derive `Clone`, `PartialEq`, and `Eq` for use in tests and
//! pattern matching.
//!
//! # Design Notes
//!
//! - Mouse coordinates are 0-indexed (the wire encodings are 1-indexed)
//! - Cursor-position reports keep the 1-indexed values the terminal sent
//! - `KeyEventKind` defaults to `Press`; `Repeat`/`Release` only appear when
//!   the terminal speaks the kitty keyboard protocol
//! - `Modifiers` use bitflags for easy combination
//! - Malformed sequences surface as [`Event::Unknown`] carrying the raw
//!   bytes; the decoder never silently discards input

use bitflags::bitflags;
#[cfg(feature = "crossterm")]
use crossterm::event as cte;

/// A decoded terminal input event.
///
/// This enum is the complete output vocabulary of the decoder: every call
/// to [`InputDecoder::feed`](crate::decoder::InputDecoder::feed) yields a
/// sequence of these and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// A mouse event.
    Mouse(MouseEvent),

    /// Focus gained or lost.
    ///
    /// `true` = focus gained (`CSI I`), `false` = focus lost (`CSI O`).
    Focus(bool),

    /// Text from bracketed paste mode, delivered atomically.
    ///
    /// The text between the `CSI 200~` / `CSI 201~` delimiters, end marker
    /// excluded. Partial pastes are never emitted; the content arrives in
    /// one event regardless of how the bytes were chunked.
    Paste(String),

    /// Terminal size report (`CSI 8 ; rows ; cols t`).
    Resize {
        /// New terminal width in columns.
        width: u16,
        /// New terminal height in rows.
        height: u16,
    },

    /// Cursor position report (`CSI row ; col R`).
    ///
    /// A terminal-originated reply to a DSR query, not user input, so it
    /// gets its own variant rather than masquerading as a key. Row and
    /// column are 1-indexed as reported.
    CursorReport {
        /// Reported cursor row.
        row: u16,
        /// Reported cursor column.
        col: u16,
    },

    /// A sequence the decoder consumed but could not interpret.
    ///
    /// Carries the raw bytes of the whole malformed span. Emitting these
    /// (instead of dropping them) keeps the stream lossless and gives
    /// embedders a hook for diagnostics.
    Unknown(Vec<u8>),
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// Press, repeat, or release.
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a key event with no modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Attach modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Attach a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    /// Check if Ctrl is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Alt is held.
    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Check if Shift is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// Identity of a key.
///
/// Printable input uses [`Char`](KeyCode::Char); everything a terminal can
/// name but Unicode cannot (navigation, editing, function keys) gets a
/// dedicated variant. The enum is the extended key namespace: variants
/// cannot collide with codepoints by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A Unicode character.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Backspace key.
    Backspace,

    /// Tab key.
    Tab,

    /// Shift+Tab (`CSI Z`).
    BackTab,

    /// Delete key.
    Delete,

    /// Insert key.
    Insert,

    /// Home key.
    Home,

    /// End key.
    End,

    /// Page Up key.
    PageUp,

    /// Page Down key.
    PageDown,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,

    /// Function key (F1-F24).
    F(u8),
}

/// Press / repeat / release distinction.
///
/// Legacy encodings only report presses. Terminals speaking the kitty
/// keyboard protocol additionally report auto-repeat and release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when the wire cannot distinguish).
    #[default]
    Press,

    /// Key is being held (auto-repeat).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key or mouse event.
    ///
    /// The bit layout matches the kitty keyboard protocol bitmask, which is
    /// also the xterm CSI modifier encoding (`param = 1 + bits`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000_0000;
        /// Shift key.
        const SHIFT = 0b0000_0001;
        /// Alt/Option key.
        const ALT   = 0b0000_0010;
        /// Control key.
        const CTRL  = 0b0000_0100;
        /// Super/Windows/Command key.
        const SUPER = 0b0000_1000;
        /// Hyper key.
        const HYPER = 0b0001_0000;
        /// Meta key.
        const META  = 0b0010_0000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// A mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// What happened (press, release, drag, move, scroll).
    pub kind: MouseEventKind,

    /// X coordinate (0-indexed, leftmost column is 0).
    pub x: u16,

    /// Y coordinate (0-indexed, topmost row is 0).
    pub y: u16,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl MouseEvent {
    /// Create a mouse event with no modifiers.
    #[must_use]
    pub const fn new(kind: MouseEventKind, x: u16, y: u16) -> Self {
        Self {
            kind,
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    /// Attach modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Get the position as a tuple.
    #[must_use]
    pub const fn position(&self) -> (u16, u16) {
        (self.x, self.y)
    }
}

/// Mouse event classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    /// Button pressed down.
    Down(MouseButton),

    /// Button released.
    Up(MouseButton),

    /// Mouse moved while a button was held.
    Drag(MouseButton),

    /// Mouse moved with no button held.
    Moved,

    /// Wheel scrolled up.
    ScrollUp,

    /// Wheel scrolled down.
    ScrollDown,

    /// Wheel scrolled left (horizontal scroll).
    ScrollLeft,

    /// Wheel scrolled right (horizontal scroll).
    ScrollRight,
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,

    /// Middle mouse button (wheel click).
    Middle,

    /// Right mouse button.
    Right,

    /// Extended buttons 8-11 (encoded with bit 7 of the button code).
    Other(u8),
}

#[cfg(feature = "crossterm")]
impl Event {
    /// Convert a crossterm event into a vtinput [`Event`].
    ///
    /// Returns `None` for crossterm-specific codes with no counterpart here
    /// (media keys, `Null`). Useful when an application funnels both a raw
    /// byte stream and an existing crossterm event loop into one channel.
    #[must_use]
    pub fn from_crossterm(event: cte::Event) -> Option<Self> {
        match event {
            cte::Event::Key(key) => map_key_event(key).map(Event::Key),
            cte::Event::Mouse(mouse) => Some(Event::Mouse(map_mouse_event(mouse))),
            cte::Event::Resize(width, height) => Some(Event::Resize { width, height }),
            cte::Event::Paste(text) => Some(Event::Paste(text)),
            cte::Event::FocusGained => Some(Event::Focus(true)),
            cte::Event::FocusLost => Some(Event::Focus(false)),
        }
    }
}

#[cfg(feature = "crossterm")]
fn map_key_event(event: cte::KeyEvent) -> Option<KeyEvent> {
    let code = match event.code {
        cte::KeyCode::Backspace => KeyCode::Backspace,
        cte::KeyCode::Enter => KeyCode::Enter,
        cte::KeyCode::Left => KeyCode::Left,
        cte::KeyCode::Right => KeyCode::Right,
        cte::KeyCode::Up => KeyCode::Up,
        cte::KeyCode::Down => KeyCode::Down,
        cte::KeyCode::Home => KeyCode::Home,
        cte::KeyCode::End => KeyCode::End,
        cte::KeyCode::PageUp => KeyCode::PageUp,
        cte::KeyCode::PageDown => KeyCode::PageDown,
        cte::KeyCode::Tab => KeyCode::Tab,
        cte::KeyCode::BackTab => KeyCode::BackTab,
        cte::KeyCode::Delete => KeyCode::Delete,
        cte::KeyCode::Insert => KeyCode::Insert,
        cte::KeyCode::F(n) => KeyCode::F(n),
        cte::KeyCode::Char(c) => KeyCode::Char(c),
        cte::KeyCode::Esc => KeyCode::Escape,
        _ => return None,
    };
    let kind = match event.kind {
        cte::KeyEventKind::Press => KeyEventKind::Press,
        cte::KeyEventKind::Repeat => KeyEventKind::Repeat,
        cte::KeyEventKind::Release => KeyEventKind::Release,
    };
    Some(KeyEvent {
        code,
        modifiers: map_modifiers(event.modifiers),
        kind,
    })
}

#[cfg(feature = "crossterm")]
fn map_modifiers(modifiers: cte::KeyModifiers) -> Modifiers {
    let mut mapped = Modifiers::NONE;
    if modifiers.contains(cte::KeyModifiers::SHIFT) {
        mapped |= Modifiers::SHIFT;
    }
    if modifiers.contains(cte::KeyModifiers::ALT) {
        mapped |= Modifiers::ALT;
    }
    if modifiers.contains(cte::KeyModifiers::CONTROL) {
        mapped |= Modifiers::CTRL;
    }
    if modifiers.contains(cte::KeyModifiers::SUPER) {
        mapped |= Modifiers::SUPER;
    }
    if modifiers.contains(cte::KeyModifiers::HYPER) {
        mapped |= Modifiers::HYPER;
    }
    if modifiers.contains(cte::KeyModifiers::META) {
        mapped |= Modifiers::META;
    }
    mapped
}

#[cfg(feature = "crossterm")]
fn map_mouse_event(event: cte::MouseEvent) -> MouseEvent {
    let kind = match event.kind {
        cte::MouseEventKind::Down(button) => MouseEventKind::Down(map_mouse_button(button)),
        cte::MouseEventKind::Up(button) => MouseEventKind::Up(map_mouse_button(button)),
        cte::MouseEventKind::Drag(button) => MouseEventKind::Drag(map_mouse_button(button)),
        cte::MouseEventKind::Moved => MouseEventKind::Moved,
        cte::MouseEventKind::ScrollUp => MouseEventKind::ScrollUp,
        cte::MouseEventKind::ScrollDown => MouseEventKind::ScrollDown,
        cte::MouseEventKind::ScrollLeft => MouseEventKind::ScrollLeft,
        cte::MouseEventKind::ScrollRight => MouseEventKind::ScrollRight,
    };
    MouseEvent::new(kind, event.column, event.row).with_modifiers(map_modifiers(event.modifiers))
}

#[cfg(feature = "crossterm")]
fn map_mouse_button(button: cte::MouseButton) -> MouseButton {
    match button {
        cte::MouseButton::Left => MouseButton::Left,
        cte::MouseButton::Right => MouseButton::Right,
        cte::MouseButton::Middle => MouseButton::Middle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_event_is_char() {
        let event = KeyEvent::new(KeyCode::Char('q'));
        assert!(event.is_char('q'));
        assert!(!event.is_char('x'));
    }

    #[test]
    fn key_event_modifier_queries() {
        let event = KeyEvent::new(KeyCode::Char('c')).with_modifiers(Modifiers::CTRL);
        assert!(event.ctrl());
        assert!(!event.alt());
        assert!(!event.shift());
    }

    #[test]
    fn key_event_combined_modifiers() {
        let event =
            KeyEvent::new(KeyCode::Char('s')).with_modifiers(Modifiers::CTRL | Modifiers::SHIFT);
        assert!(event.ctrl());
        assert!(event.shift());
        assert!(!event.alt());
    }

    #[test]
    fn key_event_kind_round_trip() {
        let press = KeyEvent::new(KeyCode::Enter);
        assert_eq!(press.kind, KeyEventKind::Press);

        let release = press.with_kind(KeyEventKind::Release);
        assert_eq!(release.kind, KeyEventKind::Release);
    }

    #[test]
    fn mouse_event_position() {
        let event = MouseEvent::new(MouseEventKind::Down(MouseButton::Left), 10, 20);
        assert_eq!(event.position(), (10, 20));
    }

    #[test]
    fn modifiers_default_is_none() {
        assert_eq!(Modifiers::default(), Modifiers::NONE);
    }

    #[test]
    fn unknown_owns_raw_bytes() {
        let event = Event::Unknown(vec![0x1b, b'[', b'5', b'Q']);
        match event {
            Event::Unknown(raw) => assert_eq!(raw, b"\x1b[5Q"),
            _ => panic!("expected Unknown"),
        }
    }

    #[test]
    fn event_is_clone_and_eq() {
        let event = Event::Key(KeyEvent::new(KeyCode::Char('x')));
        let cloned = event.clone();
        assert_eq!(event, cloned);
    }

    #[cfg(feature = "crossterm")]
    mod crossterm_interop {
        use super::super::*;
        use crossterm::event as ct_event;

        #[test]
        fn maps_key_with_modifiers() {
            let ct = ct_event::Event::Key(ct_event::KeyEvent {
                code: ct_event::KeyCode::Char('x'),
                modifiers: ct_event::KeyModifiers::CONTROL,
                kind: ct_event::KeyEventKind::Press,
                state: ct_event::KeyEventState::NONE,
            });
            let mapped = Event::from_crossterm(ct).expect("should map");
            match mapped {
                Event::Key(k) => {
                    assert_eq!(k.code, KeyCode::Char('x'));
                    assert!(k.ctrl());
                }
                _ => panic!("expected Key"),
            }
        }

        #[test]
        fn maps_hyper_and_meta_distinctly() {
            let mapped = map_modifiers(ct_event::KeyModifiers::HYPER);
            assert!(mapped.contains(Modifiers::HYPER));
            assert!(!mapped.contains(Modifiers::SUPER));

            let mapped = map_modifiers(ct_event::KeyModifiers::META);
            assert!(mapped.contains(Modifiers::META));
        }

        #[test]
        fn maps_focus_and_paste() {
            assert_eq!(
                Event::from_crossterm(ct_event::Event::FocusGained),
                Some(Event::Focus(true))
            );
            assert_eq!(
                Event::from_crossterm(ct_event::Event::Paste("hi".into())),
                Some(Event::Paste("hi".into()))
            );
        }

        #[test]
        fn media_keys_do_not_map() {
            let ct = ct_event::Event::Key(ct_event::KeyEvent {
                code: ct_event::KeyCode::Media(ct_event::MediaKeyCode::Play),
                modifiers: ct_event::KeyModifiers::NONE,
                kind: ct_event::KeyEventKind::Press,
                state: ct_event::KeyEventState::NONE,
            });
            assert_eq!(Event::from_crossterm(ct), None);
        }
    }
}
