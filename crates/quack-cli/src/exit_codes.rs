//! Process exit codes for `quack`.
//! Part of the public contract: wrappers branch on these.

use quack_bridge::ErrorKind;

pub const SUCCESS: i32 = 0;
pub const ENGINE_FAILED: i32 = 1; // Engine exited non-zero
pub const INTERNAL_ERROR: i32 = 2; // Bridge bug or bad config/request
pub const ENGINE_UNAVAILABLE: i32 = 3; // Launcher/interpreter missing
pub const ENGINE_TIMEOUT: i32 = 4;
pub const MALFORMED_RESPONSE: i32 = 5;

pub fn for_kind(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::EngineExecutionError => ENGINE_FAILED,
        ErrorKind::Internal => INTERNAL_ERROR,
        ErrorKind::EngineUnavailable => ENGINE_UNAVAILABLE,
        ErrorKind::EngineTimeout => ENGINE_TIMEOUT,
        ErrorKind::MalformedResponse => MALFORMED_RESPONSE,
    }
}
