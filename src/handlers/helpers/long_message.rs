//! Long chat reply builder.
//!
//! Accumulates a header and many short fragments, then splits them into as
//! few chat messages as the output limits allow. Fragments are never split.
//! Once the message budget is spent, further fragments are dropped and the
//! last message ends with an overflow marker. Fragments removed to make room
//! for that marker are taken back out of [`len`](LongMessage::len).

use crate::config::LimitsConfig;

/// Ends the last message when fragments were dropped.
const OVERFLOW: &str = "...";

/// Builder for listings that may not fit in one chat message.
#[derive(Debug)]
pub struct LongMessage {
    max_len: usize,
    max_messages: usize,
    header: String,
    messages: Vec<String>,
    current: String,
    /// Byte offsets where each fragment of `current` starts.
    marks: Vec<usize>,
    items: usize,
    truncated: bool,
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

impl LongMessage {
    pub fn new(limits: &LimitsConfig) -> Self {
        Self::with_limits(limits.max_message_len, limits.max_messages)
    }

    pub fn with_limits(max_len: usize, max_messages: usize) -> Self {
        Self {
            max_len: max_len.max(1),
            max_messages: max_messages.max(1),
            header: String::new(),
            messages: Vec::new(),
            current: String::new(),
            marks: Vec::new(),
            items: 0,
            truncated: false,
        }
    }

    /// Text that starts the first message.
    pub fn header(mut self, text: &str) -> Self {
        self.header = text.to_string();
        self.current = text.to_string();
        self
    }

    /// Number of fragments that will appear in the output.
    pub fn len(&self) -> usize {
        self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items == 0
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Append `fragment` followed by `separator`. Returns `false` when the
    /// fragment was dropped for lack of room.
    pub fn add(&mut self, fragment: &str, separator: &str) -> bool {
        if self.truncated {
            return false;
        }
        let piece = format!("{fragment}{separator}");
        if self.push_piece(&piece) {
            self.items += 1;
            return true;
        }
        self.truncate();
        false
    }

    fn fits(&self, piece: &str) -> bool {
        char_len(&self.current) + char_len(piece) <= self.max_len
    }

    fn push_piece(&mut self, piece: &str) -> bool {
        if self.current.is_empty() || self.fits(piece) {
            self.marks.push(self.current.len());
            self.current.push_str(piece);
            return true;
        }
        if self.messages.len() + 1 < self.max_messages {
            self.messages.push(std::mem::take(&mut self.current));
            self.marks.clear();
            self.marks.push(0);
            self.current.push_str(piece);
            return true;
        }
        false
    }

    /// Mark the listing as cut short and give back fragments until the
    /// overflow marker fits.
    fn truncate(&mut self) {
        self.truncated = true;
        while !self.fits(OVERFLOW) {
            let Some(mark) = self.marks.pop() else {
                break;
            };
            self.current.truncate(mark);
            self.items -= 1;
        }
    }

    /// Finish the reply.
    ///
    /// `footer` closes the listing and is left off when it does not fit.
    /// `empty` follows the header when nothing was added.
    pub fn finish(mut self, footer: &str, empty: &str) -> Vec<String> {
        if self.items == 0 && !self.truncated {
            return vec![format!("{}{}", self.header, empty).trim_end().to_string()];
        }

        if self.truncated {
            self.current.push_str(OVERFLOW);
        } else if !footer.is_empty() {
            self.push_piece(footer);
        }

        self.messages.push(self.current);
        self.messages
            .into_iter()
            .map(|m| m.trim_end().to_string())
            .filter(|m| !m.is_empty())
            .collect()
    }
}
