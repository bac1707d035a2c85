//! Headless level player: replays click scripts or autoplays levels and
//! reports the result as JSON.

pub mod play;
pub mod script;
pub mod summary;
