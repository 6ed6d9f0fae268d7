pub const VOICE_ACCESS_TOKEN_ENV: &str = "VOICE_ACCESS_TOKEN";

pub const SOCKET_URL: &str = "ws://localhost:8000/ws";
pub const HTTP_BASE_URL: &str = "http://localhost:8000";

pub const FRAME_WIDTH: u32 = 300;
pub const FRAME_HEIGHT: u32 = 200;

/// Delay between capture steps. 33 ms (30 fps) and 100 ms variants are also
/// in use; pick per deployment via the config builder.
pub const CAPTURE_INTERVAL_MS: u64 = 1000;

pub const CHANNEL_CAPACITY: usize = 1024;
