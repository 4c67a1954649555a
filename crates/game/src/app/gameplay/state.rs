/// The single active phase of an in-progress game scene. Transitions are
/// driven by key presses and completion signals, never by polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Transition,
    ReadingText,
    PickingOption,
    GuessingLetter,
    GuessingWord,
    GameOver,
    GameWon,
}

impl GameState {
    /// The fixed icon-overlay layout shown for this phase; affordance
    /// display only, no behavior hangs off it.
    pub fn affordance_labels(self) -> &'static [&'static str] {
        match self {
            GameState::Transition => &[],
            GameState::ReadingText => &["ENTER: NEXT"],
            GameState::PickingOption => &["</>", "ENTER: GO"],
            GameState::GuessingLetter => &["A-Z"],
            GameState::GuessingWord => &["A-Z", "BKSP", "ENTER"],
            GameState::GameOver => &["ENTER"],
            GameState::GameWon => &["ENTER"],
        }
    }
}

/// What the player is about to commit to from the option picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessAction {
    Letter,
    Word,
}

impl GuessAction {
    pub fn label(self) -> &'static str {
        match self {
            GuessAction::Letter => "GUESS A LETTER",
            GuessAction::Word => "GUESS THE WORD",
        }
    }

    /// Both arrow directions toggle between the two actions.
    pub fn cycled(self) -> Self {
        match self {
            GuessAction::Letter => GuessAction::Word,
            GuessAction::Word => GuessAction::Letter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_interactive_state_advertises_affordances() {
        for state in [
            GameState::ReadingText,
            GameState::PickingOption,
            GameState::GuessingLetter,
            GameState::GuessingWord,
            GameState::GameOver,
            GameState::GameWon,
        ] {
            assert!(!state.affordance_labels().is_empty(), "{state:?}");
        }
        assert!(GameState::Transition.affordance_labels().is_empty());
    }

    #[test]
    fn action_cycle_is_an_involution() {
        assert_eq!(GuessAction::Letter.cycled(), GuessAction::Word);
        assert_eq!(GuessAction::Letter.cycled().cycled(), GuessAction::Letter);
    }
}
