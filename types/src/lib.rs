pub mod generation;
pub mod media;
pub mod perception;
pub mod voice;
mod conversation;

pub use conversation::{ConversationTurn, TurnSide};
pub use media::{FrameDataUri, RawFrame};
pub use perception::InferenceMessage;
pub use voice::VoiceEvent;
