//! Message output
//!
//! The engine never presents anything itself. It produces plain text tagged
//! with a channel and hands it to a [`MessageSink`].

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Channel a message is filed under
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Channel {
    #[default]
    Plain = 0,
    Combat = 1,
    God = 2,
    Warning = 3,
    Sound = 4,
    Talk = 5,
    MonsterDamage = 6,
    MonsterEnchant = 7,
    FriendAction = 8,
}

/// A single produced message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub channel: Channel,
    pub text: String,
}

/// Anything that accepts engine output
pub trait MessageSink {
    fn emit(&mut self, channel: Channel, text: String);
}

/// Buffered message log, drained by the front-end
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Whether any message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.text.contains(needle))
    }

    /// Remove and return everything logged so far
    pub fn drain(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }
}

impl MessageSink for MessageLog {
    fn emit(&mut self, channel: Channel, text: String) {
        log::trace!("[{channel}] {text}");
        self.messages.push(Message { channel, text });
    }
}

/// Upper-case the first letter of a message
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Third person singular of an English verb ("hit" -> "hits")
pub fn third_person(verb: &str) -> String {
    if let Some((head, tail)) = verb.split_once(' ') {
        return format!("{} {}", third_person(head), tail);
    }
    match verb {
        "are" => return "is".to_string(),
        "have" => return "has".to_string(),
        _ => {}
    }
    if verb.ends_with("sh")
        || verb.ends_with("ch")
        || verb.ends_with('s')
        || verb.ends_with('x')
        || verb.ends_with('z')
    {
        return format!("{verb}es");
    }
    if let Some(stem) = verb.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) {
            return format!("{stem}ies");
        }
    }
    format!("{verb}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_drain() {
        let mut log = MessageLog::new();
        log.emit(Channel::Combat, "You hit the orc.".to_string());
        log.emit(Channel::God, "Beogh is pleased.".to_string());
        assert_eq!(log.len(), 2);
        assert!(log.contains("orc"));
        let drained = log.drain();
        assert_eq!(drained[1].channel, Channel::God);
        assert!(log.is_empty());
    }

    #[test]
    fn test_third_person() {
        assert_eq!(third_person("hit"), "hits");
        assert_eq!(third_person("bash"), "bashes");
        assert_eq!(third_person("pass"), "passes");
        assert_eq!(third_person("fly"), "flies");
        assert_eq!(third_person("slay"), "slays");
        assert_eq!(third_person("are"), "is");
        assert_eq!(third_person("pass through"), "passes through");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("the orc"), "The orc");
        assert_eq!(capitalize(""), "");
    }
}
