use winit::keyboard::{KeyCode, PhysicalKey};

/// The keys scenes can listen for. Letters and digits are always uppercase
/// ASCII so scene code compares without normalizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Escape,
    Backspace,
    Letter(char),
    Digit(char),
}

/// The fixed set of keys a scene listens for. A scene with an empty set
/// never receives key events.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    named: Vec<Key>,
    letters: bool,
    digits: bool,
}

impl KeySet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of(keys: &[Key]) -> Self {
        Self {
            named: keys.to_vec(),
            letters: false,
            digits: false,
        }
    }

    /// Accept every `Key::Letter`.
    pub fn with_letters(mut self) -> Self {
        self.letters = true;
        self
    }

    /// Accept every `Key::Digit`.
    pub fn with_digits(mut self) -> Self {
        self.digits = true;
        self
    }

    pub fn contains(&self, key: Key) -> bool {
        match key {
            Key::Letter(_) if self.letters => true,
            Key::Digit(_) if self.digits => true,
            other => self.named.contains(&other),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && !self.letters && !self.digits
    }
}

pub(crate) fn key_from_physical(physical: PhysicalKey) -> Option<Key> {
    let PhysicalKey::Code(code) = physical else {
        return None;
    };
    let key = match code {
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::Escape => Key::Escape,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::KeyA => Key::Letter('A'),
        KeyCode::KeyB => Key::Letter('B'),
        KeyCode::KeyC => Key::Letter('C'),
        KeyCode::KeyD => Key::Letter('D'),
        KeyCode::KeyE => Key::Letter('E'),
        KeyCode::KeyF => Key::Letter('F'),
        KeyCode::KeyG => Key::Letter('G'),
        KeyCode::KeyH => Key::Letter('H'),
        KeyCode::KeyI => Key::Letter('I'),
        KeyCode::KeyJ => Key::Letter('J'),
        KeyCode::KeyK => Key::Letter('K'),
        KeyCode::KeyL => Key::Letter('L'),
        KeyCode::KeyM => Key::Letter('M'),
        KeyCode::KeyN => Key::Letter('N'),
        KeyCode::KeyO => Key::Letter('O'),
        KeyCode::KeyP => Key::Letter('P'),
        KeyCode::KeyQ => Key::Letter('Q'),
        KeyCode::KeyR => Key::Letter('R'),
        KeyCode::KeyS => Key::Letter('S'),
        KeyCode::KeyT => Key::Letter('T'),
        KeyCode::KeyU => Key::Letter('U'),
        KeyCode::KeyV => Key::Letter('V'),
        KeyCode::KeyW => Key::Letter('W'),
        KeyCode::KeyX => Key::Letter('X'),
        KeyCode::KeyY => Key::Letter('Y'),
        KeyCode::KeyZ => Key::Letter('Z'),
        KeyCode::Digit0 | KeyCode::Numpad0 => Key::Digit('0'),
        KeyCode::Digit1 | KeyCode::Numpad1 => Key::Digit('1'),
        KeyCode::Digit2 | KeyCode::Numpad2 => Key::Digit('2'),
        KeyCode::Digit3 | KeyCode::Numpad3 => Key::Digit('3'),
        KeyCode::Digit4 | KeyCode::Numpad4 => Key::Digit('4'),
        KeyCode::Digit5 | KeyCode::Numpad5 => Key::Digit('5'),
        KeyCode::Digit6 | KeyCode::Numpad6 => Key::Digit('6'),
        KeyCode::Digit7 | KeyCode::Numpad7 => Key::Digit('7'),
        KeyCode::Digit8 | KeyCode::Numpad8 => Key::Digit('8'),
        KeyCode::Digit9 | KeyCode::Numpad9 => Key::Digit('9'),
        _ => return None,
    };
    Some(key)
}
