/// Which side of the conversation a turn belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TurnSide {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

/// One entry in the append-only conversation timeline. `sequence` is the
/// insertion order assigned by the timeline and is never reused.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConversationTurn {
    author: String,
    content: String,
    side: TurnSide,
    sequence: u64,
}

impl ConversationTurn {
    pub fn new(author: &str, content: &str, side: TurnSide, sequence: u64) -> Self {
        Self {
            author: author.to_string(),
            content: content.to_string(),
            side,
            sequence,
        }
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn side(&self) -> TurnSide {
        self.side
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}
