pub mod capture;
pub mod config;
pub mod connection;
mod consts;
pub mod generation;
pub mod perception;
pub mod session;
pub mod timeline;
pub mod voice;

pub use capture::{CaptureHandle, Frame, VideoSource};
pub use config::{Config, ConfigBuilder, ConfigError};
pub use connection::{ConnectionState, InferenceRx, SocketConnection};
pub use generation::{
    GenerationBackend, GenerationController, GenerationJob, GenerationStatus,
    HttpGenerationBackend,
};
pub use perception::{summarize, EmotionSummary};
pub use session::Session;
pub use timeline::Timeline;
pub use voice::{VoiceAdapter, VoiceBackend, VoiceReadyState};

pub use tutor_realtime_types as types;
pub use tutor_realtime_utils as utils;
