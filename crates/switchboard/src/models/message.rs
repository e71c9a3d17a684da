use serde::{Deserialize, Serialize};

/// One entry in a conversation. Order within a conversation is
/// chronological and must be preserved end-to-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn new<R: Into<String>, C: Into<String>>(role: R, content: C) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::new("user", content)
    }

    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self::new("assistant", content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let msg = Message::user("hello");
        assert_eq!(msg.role, "user");
        assert_eq!(msg.content, "hello");

        let msg = Message::assistant("hi there");
        assert_eq!(msg.role, "assistant");
    }

    #[test]
    fn test_round_trip() {
        let msg = Message::new("system", "be brief");
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }
}
