//! Interfaces to the collaborators the engine consumes but does not own:
//! story/word content, persisted configuration and audio playback. The
//! game wires concrete providers into a `GameContext` once at startup and
//! threads it into scene construction; there are no process-wide singletons.

use std::sync::Arc;

use thiserror::Error;

use crate::app::DisplayMode;
use crate::compositor::Compositor;

/// Recoverable content-lookup failures; consumers detour to fallback
/// content instead of crashing the frame loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("no word of length {0} available")]
    NoWordAvailable(usize),
    #[error("missing script section '{0}'")]
    MissingSection(String),
    #[error("no crime descriptions available")]
    NoCrimeAvailable,
}

/// Story/word provider: secret words, dialogue script sections and crime
/// descriptions.
pub trait StorySource: Send + Sync {
    fn fetch_word(&self, length: usize) -> Result<String, ContentError>;

    /// An ordered dialogue section with `%1`-style substitutions applied.
    fn section(&self, id: &str, substitutions: &[&str]) -> Result<Vec<String>, ContentError>;

    fn random_crime_description(&self) -> Result<String, ContentError>;
}

/// Read/write configuration; mutations persist outside the engine.
pub trait ConfigSource: Send + Sync {
    fn display_mode(&self) -> DisplayMode;
    fn set_display_mode(&self, mode: DisplayMode);

    fn resolution_scalar(&self) -> f32 {
        self.display_mode().scalar()
    }

    fn is_online(&self) -> bool;
    fn is_nsfl_enabled(&self) -> bool;
    fn set_nsfl_enabled(&self, enabled: bool);

    fn has_played_before(&self) -> bool;
    fn mark_played(&self);

    /// Round timer in seconds; `None` disables the timer.
    fn timer_seconds(&self) -> Option<u32>;
    fn set_timer_seconds(&self, seconds: Option<u32>);

    fn api_key(&self) -> Option<String>;
    fn set_api_key(&self, key: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundId(pub &'static str);

/// Fire-and-forget playback; the engine never waits on completion.
pub trait AudioSink: Send + Sync {
    fn play(&self, sound: SoundId);
}

/// Everything scenes need, assembled once at startup.
#[derive(Clone)]
pub struct GameContext {
    pub story: Arc<dyn StorySource>,
    pub config: Arc<dyn ConfigSource>,
    pub audio: Arc<dyn AudioSink>,
    pub compositor: Arc<Compositor>,
    pub display_mode: DisplayMode,
}
