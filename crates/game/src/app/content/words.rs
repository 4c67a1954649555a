use rand::Rng;

/// The offline word pool compiled into the binary; an on-disk
/// `assets/base/words.txt` (one word per line) replaces it when present.
const BUILTIN_WORDS: &[&str] = &[
    "ROPE", "CASE", "CLUE", "LIVE", "DARK", "VEIL", "OATH", "ALIBI", "BADGE", "BLAME", "CRIME",
    "GUILT", "JUROR", "NOOSE", "PROOF", "SPITE", "THIEF", "TRIAL", "VAULT", "WITNESS", "CORPSE",
    "DOCKET", "ESCAPE", "FELONY", "LOCKET", "MOTIVE", "PAROLE", "POISON", "RANSOM", "SUSPECT",
    "VERDICT", "WARRANT", "FORGERY", "GALLOWS", "INQUEST", "JUSTICE", "LANTERN", "EVIDENCE",
    "SENTENCE", "DETECTIVE",
];

/// A plain uppercase word list filtered to the letters the guess board
/// accepts.
#[derive(Debug, Clone)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    pub fn from_text(text: &str) -> Self {
        let words = text
            .lines()
            .map(|line| line.trim().to_ascii_uppercase())
            .filter(|word| !word.is_empty() && word.chars().all(|c| c.is_ascii_uppercase()))
            .collect();
        Self { words }
    }

    pub fn builtin() -> Self {
        Self {
            words: BUILTIN_WORDS.iter().map(|word| word.to_string()).collect(),
        }
    }

    pub fn random_of_length(&self, length: usize, rng: &mut impl Rng) -> Option<String> {
        let pool: Vec<&String> = self
            .words
            .iter()
            .filter(|word| word.chars().count() == length)
            .collect();
        if pool.is_empty() {
            return None;
        }
        Some(pool[rng.gen_range(0..pool.len())].clone())
    }
}

/// Last-resort word when even the builtin pool has nothing at the requested
/// length; always a valid board word.
pub fn emergency_word(length: usize) -> String {
    BUILTIN_WORDS
        .iter()
        .find(|word| word.chars().count() == length)
        .map(|word| word.to_string())
        .unwrap_or_else(|| "NOOSE".to_string())
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn builtin_pool_covers_playable_lengths() {
        let list = WordList::builtin();
        let mut rng = SmallRng::seed_from_u64(3);
        for length in 4..=8 {
            assert!(
                list.random_of_length(length, &mut rng).is_some(),
                "no builtin word of length {length}"
            );
        }
    }

    #[test]
    fn from_text_normalizes_and_filters() {
        let list = WordList::from_text("alibi\n  Motive \nbad word\nnum3er\n\n");
        assert_eq!(list.words, vec!["ALIBI".to_string(), "MOTIVE".to_string()]);
        let mut rng = SmallRng::seed_from_u64(4);
        assert_eq!(list.random_of_length(5, &mut rng), Some("ALIBI".to_string()));
    }

    #[test]
    fn random_of_length_returns_none_when_pool_is_dry() {
        let list = WordList::from_text("SHORT");
        let mut rng = SmallRng::seed_from_u64(5);
        assert_eq!(list.random_of_length(12, &mut rng), None);
    }

    #[test]
    fn emergency_word_matches_requested_length_when_possible() {
        assert_eq!(emergency_word(4).chars().count(), 4);
        assert_eq!(emergency_word(7).chars().count(), 7);
        assert_eq!(emergency_word(40), "NOOSE");
    }
}
