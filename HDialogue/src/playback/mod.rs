//! Playback of dialogue sets through an external player
//!
//! A [`PlaybackSession`] walks a [`Playlist`] with a cursor; [`Autoplay`]
//! drives a session unattended with a pause between sets.

pub mod autoplay;
mod session;
mod subtitle;

pub use autoplay::{
    Autoplay, AutoplayReport, AutoplayState, DEFAULT_AUTOPLAY_DELAY, Interrupt, Uninterruptible,
};
pub use session::{PlaybackSession, Playlist, PlaylistEntry, Step};
pub use subtitle::{SUBTITLE_INDENT, SUBTITLE_WIDTH, wrap};

#[cfg(test)]
pub(crate) use session::tests;
