use std::sync::Arc;
use std::time::Duration;

use engine::app::deferred;
use engine::{AudioSink, SoundId};
use tracing::debug;

pub mod sounds {
    use engine::SoundId;

    pub const MENU_MOVE: SoundId = SoundId("menu_move");
    pub const MENU_SELECT: SoundId = SoundId("menu_select");
    pub const KEY_TAP: SoundId = SoundId("key_tap");
    pub const GUESS_CORRECT: SoundId = SoundId("guess_correct");
    pub const GUESS_WRONG: SoundId = SoundId("guess_wrong");
    pub const GAME_WON: SoundId = SoundId("game_won");
    pub const GAME_LOST: SoundId = SoundId("game_lost");
}

/// Stand-in playback sink: emits a structured log per request. Clip decoding
/// lives outside the engine; nothing here ever blocks on playback.
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&self, sound: SoundId) {
        debug!(sound = sound.0, "audio_play");
    }
}

/// Fire-and-forget delayed playback on the deferred-action thread. The
/// closure only touches the sink, never engine state.
pub fn play_after(audio: &Arc<dyn AudioSink>, sound: SoundId, delay: Duration) {
    let audio = Arc::clone(audio);
    deferred::run_after(delay, move || audio.play(sound));
}
