//! Voice clip lookup and playback
//!
//! [`OggLibrary`] indexes an extracted audio directory by cue identifier;
//! [`MediaPlayer`] is the seam to whatever external program plays a clip.

mod library;
mod player;

pub use library::{DEFAULT_OGG_PATTERN, OggLibrary};
pub use player::{CommandPlayer, MediaPlayer, PlayerStatus};
