/// A key injected by an on-screen keypad into the focused answer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypadKey {
    Char(char),
    Clear,
    Backspace,
}

impl KeypadKey {
    /// Button labels in keypad order.
    pub const LAYOUT: [&'static str; 12] = ["7", "8", "9", "4", "5", "6", "1", "2", "3", "0", "C", "←"];

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "C" => Some(Self::Clear),
            "←" => Some(Self::Backspace),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Some(Self::Char(ch)),
                    _ => None,
                }
            }
        }
    }

    /// New raw input value after pressing this key.
    #[must_use]
    pub fn apply(self, current: &str) -> String {
        match self {
            Self::Char(ch) => {
                let mut next = current.to_string();
                next.push(ch);
                next
            }
            Self::Clear => String::new(),
            Self::Backspace => {
                let mut next = current.to_string();
                next.pop();
                next
            }
        }
    }
}
