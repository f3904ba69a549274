//! Input masks for text fields.
//!
//! A mask is a pattern of slots and literals:
//!
//! | Char | Accepts               |
//! |------|-----------------------|
//! | `#`  | ASCII digit           |
//! | `A`  | alphabetic character  |
//! | `*`  | alphanumeric character|
//! | `\\` | next char is literal  |
//!
//! Any other pattern character is a literal that is inserted automatically.
//! Input characters that do not fit the next slot are dropped, and literals
//! already present in the input are consumed rather than duplicated, so
//! applying a mask to its own output is a no-op.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Digit,
    Alpha,
    Alnum,
    Literal(char),
}

impl Slot {
    fn accepts(self, c: char) -> bool {
        match self {
            Slot::Digit => c.is_ascii_digit(),
            Slot::Alpha => c.is_alphabetic(),
            Slot::Alnum => c.is_alphanumeric(),
            Slot::Literal(l) => l == c,
        }
    }
}

fn parse_slots(pattern: &str) -> Vec<Slot> {
    let mut slots = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        let slot = match c {
            '#' => Slot::Digit,
            'A' => Slot::Alpha,
            '*' => Slot::Alnum,
            '\\' => match chars.next() {
                Some(escaped) => Slot::Literal(escaped),
                None => Slot::Literal('\\'),
            },
            other => Slot::Literal(other),
        };
        slots.push(slot);
    }
    slots
}

/// Formats `input` through `pattern`.
///
/// Output stops at the end of the pattern or when the input runs out;
/// trailing literals are only emitted while more input remains.
pub fn apply_mask(pattern: &str, input: &str) -> String {
    let slots = parse_slots(pattern);
    let mut out = String::with_capacity(pattern.len());
    let mut rest = input.chars().peekable();

    for slot in slots {
        match slot {
            Slot::Literal(l) => {
                let Some(&next) = rest.peek() else {
                    break;
                };
                out.push(l);
                if next == l {
                    rest.next();
                }
            }
            class => loop {
                match rest.next() {
                    None => return out,
                    Some(c) if class.accepts(c) => {
                        out.push(c);
                        break;
                    }
                    Some(_) => {}
                }
            },
        }
    }
    out
}

/// True when `input` fills every slot of `pattern` exactly.
pub fn is_complete(pattern: &str, input: &str) -> bool {
    let slots = parse_slots(pattern);
    let chars: Vec<char> = input.chars().collect();
    chars.len() == slots.len() && slots.iter().zip(chars).all(|(slot, c)| slot.accepts(c))
}
