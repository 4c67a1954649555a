pub mod audio;
pub mod config;
pub mod script;
pub mod words;

use std::sync::{Arc, Mutex};

use engine::{ConfigSource, ContentError, StorySource};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use self::script::ScriptStore;
use self::words::WordList;

/// The offline story provider: script sections, crime pool and word list.
/// A remote word service would slot in behind the same `StorySource`
/// boundary; when none is wired up the session simply runs from here.
pub struct StoryArchive {
    script: ScriptStore,
    words: WordList,
    config: Arc<dyn ConfigSource>,
    rng: Mutex<SmallRng>,
}

impl StoryArchive {
    pub fn new(script: ScriptStore, words: WordList, config: Arc<dyn ConfigSource>) -> Self {
        Self {
            script,
            words,
            config,
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }

    fn with_rng<T>(&self, pick: impl FnOnce(&mut SmallRng) -> T) -> T {
        let mut guard = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        pick(&mut guard)
    }
}

impl StorySource for StoryArchive {
    fn fetch_word(&self, length: usize) -> Result<String, ContentError> {
        self.with_rng(|rng| self.words.random_of_length(length, rng))
            .ok_or(ContentError::NoWordAvailable(length))
    }

    fn section(&self, id: &str, substitutions: &[&str]) -> Result<Vec<String>, ContentError> {
        self.script.section(id, substitutions)
    }

    fn random_crime_description(&self) -> Result<String, ContentError> {
        let nsfl_allowed = self.config.is_nsfl_enabled();
        self.with_rng(|rng| self.script.random_crime(nsfl_allowed, rng))
    }
}


#[cfg(test)]
mod tests {
    use engine::DisplayMode;

    use super::*;

    struct FixedConfig {
        nsfl: bool,
    }

    impl ConfigSource for FixedConfig {
        fn display_mode(&self) -> DisplayMode {
            DisplayMode::Hd720
        }
        fn set_display_mode(&self, _mode: DisplayMode) {}
        fn is_online(&self) -> bool {
            false
        }
        fn is_nsfl_enabled(&self) -> bool {
            self.nsfl
        }
        fn set_nsfl_enabled(&self, _enabled: bool) {}
        fn has_played_before(&self) -> bool {
            true
        }
        fn mark_played(&self) {}
        fn timer_seconds(&self) -> Option<u32> {
            None
        }
        fn set_timer_seconds(&self, _seconds: Option<u32>) {}
        fn api_key(&self) -> Option<String> {
            None
        }
        fn set_api_key(&self, _key: &str) {}
    }

    fn archive(nsfl: bool) -> StoryArchive {
        StoryArchive::new(
            ScriptStore::builtin(),
            WordList::builtin(),
            Arc::new(FixedConfig { nsfl }),
        )
    }

    #[test]
    fn fetch_word_honors_requested_length() {
        let archive = archive(false);
        let word = archive.fetch_word(5).expect("word");
        assert_eq!(word.chars().count(), 5);
    }

    #[test]
    fn fetch_word_of_impossible_length_is_recoverable() {
        let archive = archive(false);
        assert_eq!(
            archive.fetch_word(11),
            Err(ContentError::NoWordAvailable(11))
        );
    }

    #[test]
    fn crime_descriptions_respect_the_nsfl_gate() {
        let archive = archive(false);
        for _ in 0..50 {
            let crime = archive.random_crime_description().expect("crime");
            assert!(!crime.contains("UNDERTAKER"));
        }
    }
}
