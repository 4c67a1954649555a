mod board;
mod state;

pub use board::{BoardError, GuessBoard, LetterOutcome, WordOutcome};
pub use state::{GameState, GuessAction};

use std::collections::VecDeque;
use std::time::Duration;

use engine::{
    render_priority, AudioSink, ConfigSource, EntityId, EntityList, GameContext, Key, KeySet,
    Point, RasterImage, Rgba, Scene, SceneId, SceneRequest, Signal, StorySource,
};
use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

use super::content::audio::{self, sounds};
use super::content::script::substitute;
use super::content::words;
use super::entities::{
    AnimatedSprite, CountdownTimer, FadeDirection, FadeOverlay, GlyphSlot, IconRow, LightFixture,
    StaticImage, TextBox,
};
use super::menu::{self, MenuKind};

pub(crate) const FADE_IN_DONE: Signal = Signal(1);
pub(crate) const FADE_OUT_DONE: Signal = Signal(2);
pub(crate) const TIMER_EXPIRED: Signal = Signal(3);

const GAME_BACKGROUND: Rgba = [18, 16, 20, 255];
const DIALOGUE_COLOR: Rgba = [220, 224, 232, 255];
const HUD_COLOR: Rgba = [170, 190, 210, 255];

const STARTING_GUESSES: u32 = 8;
const MIN_LENGTH: usize = 4;
const MAX_LENGTH: usize = 8;
const FADE_TICKS: u32 = 20;
const TICKS_PER_SECOND: u32 = 30;

const DIALOGUE_SCALE: f32 = 2.5;
const SLOT_SCALE: f32 = 5.0;
const HUD_SCALE: f32 = 2.0;
const SPRITE_SCALE: f32 = 5.0;
const LIGHT_SCALE: f32 = 6.0;

const FALLBACK_INTRO: &[&str] = &[
    "A CRIME HAS BEEN REPORTED: %1",
    "GUESS THE WORD. SAVE THE CONVICT.",
];
const FALLBACK_ALREADY: &[&str] = &["YOU ALREADY TRIED '%1'."];
const FALLBACK_TIMEOUT: &[&str] = &["TOO SLOW. THAT COSTS YOU A GUESS."];
const FALLBACK_WON: &[&str] = &["THE WORD WAS '%1'. CASE CLOSED."];
const FALLBACK_LOST: &[&str] = &["THE WORD WAS '%1'. CASE COLD."];
const FALLBACK_CRIME: &str = "SOMETHING TERRIBLE HAPPENED DOWNTOWN.";

#[derive(Debug, Error)]
pub enum GameSetupError {
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// What happens when the current dialogue queue runs dry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AfterDialogue {
    ToPicking,
    BeginEnding,
}

/// The in-game scene: one round of the word-guessing flow over a
/// `GuessBoard`, phased by `GameState`.
pub struct GameScene {
    id: SceneId,
    ctx: GameContext,
    entities: EntityList,
    state: GameState,
    board: GuessBoard,
    pending_action: GuessAction,
    dialogue: VecDeque<String>,
    after_dialogue: AfterDialogue,
    ending_started: bool,
    draft: Vec<Option<char>>,
    slot_ids: Vec<EntityId>,
    dialogue_id: Option<EntityId>,
    guesses_id: Option<EntityId>,
    selector_id: Option<EntityId>,
    icon_id: Option<EntityId>,
    timer_id: Option<EntityId>,
}

impl GameScene {
    pub fn new(ctx: GameContext) -> Result<Self, GameSetupError> {
        let length = rand::thread_rng().gen_range(MIN_LENGTH..=MAX_LENGTH);
        let word = match ctx.story.fetch_word(length) {
            Ok(word) => word,
            Err(error) => {
                // silently drop to the offline pool; the session goes on
                info!(%error, "word_fetch_fell_back_to_builtin");
                words::emergency_word(length)
            }
        };
        Self::with_secret(ctx, &word, STARTING_GUESSES)
    }

    pub(crate) fn with_secret(
        ctx: GameContext,
        word: &str,
        guesses: u32,
    ) -> Result<Self, GameSetupError> {
        let board = GuessBoard::new(word, guesses)?;
        let draft = vec![None; board.len()];
        Ok(Self {
            id: SceneId::allocate(),
            ctx,
            entities: EntityList::new(),
            state: GameState::Transition,
            board,
            pending_action: GuessAction::Letter,
            dialogue: VecDeque::new(),
            after_dialogue: AfterDialogue::ToPicking,
            ending_started: false,
            draft,
            slot_ids: Vec::new(),
            dialogue_id: None,
            guesses_id: None,
            selector_id: None,
            icon_id: None,
            timer_id: None,
        })
    }

    pub(crate) fn state(&self) -> GameState {
        self.state
    }

    pub(crate) fn board(&self) -> &GuessBoard {
        &self.board
    }

    fn queue_dialogue(
        &mut self,
        section_id: &str,
        substitutions: &[&str],
        fallback: &[&str],
        after: AfterDialogue,
    ) {
        let lines = match self.ctx.story.section(section_id, substitutions) {
            Ok(lines) => lines,
            Err(error) => {
                info!(%error, section = section_id, "script_section_fallback");
                fallback
                    .iter()
                    .map(|line| substitute(line, substitutions))
                    .collect()
            }
        };
        self.dialogue = lines.into();
        self.after_dialogue = after;
        self.show_next_line();
    }

    /// Shows the next queued line; `false` means the queue was exhausted.
    fn show_next_line(&mut self) -> bool {
        let Some(line) = self.dialogue.pop_front() else {
            return false;
        };
        if let Some(id) = self.dialogue_id {
            if let Some(text_box) = self.entities.typed_mut::<TextBox>(id) {
                text_box.set_text(line);
            }
        }
        true
    }

    fn dialogue_complete(&mut self) {
        match self.after_dialogue {
            AfterDialogue::ToPicking => self.enter_picking_option(),
            AfterDialogue::BeginEnding => self.start_fade_out(),
        }
    }

    fn start_fade_out(&mut self) {
        if self.ending_started {
            return;
        }
        self.ending_started = true;
        let fade = FadeOverlay::new(FadeDirection::Out, FADE_TICKS, FADE_OUT_DONE);
        if let Err(error) = self.entities.add(Box::new(fade)) {
            warn!(%error, "fade_add_failed");
        }
        if let Err(error) = self.entities.spawn_all() {
            warn!(%error, "fade_spawn_failed");
        }
    }

    /// The single evaluation point of the turn loop: win first, then the
    /// guess budget, then the next pick.
    fn enter_picking_option(&mut self) {
        if self.board.is_solved() {
            self.begin_game_won();
            return;
        }
        if self.board.is_lost() {
            self.begin_game_over();
            return;
        }
        self.state = GameState::PickingOption;
        if let Some(id) = self.timer_id {
            if let Some(timer) = self.entities.typed_mut::<CountdownTimer>(id) {
                timer.restart();
            }
        }
        self.refresh_hud();
    }

    fn begin_game_won(&mut self) {
        self.state = GameState::GameWon;
        self.drop_timer();
        self.ctx.audio.play(sounds::GUESS_CORRECT);
        audio::play_after(&self.ctx.audio, sounds::GAME_WON, Duration::from_millis(400));
        let word = self.board.secret_word();
        self.queue_dialogue("won", &[&word], FALLBACK_WON, AfterDialogue::BeginEnding);
        self.refresh_hud();
    }

    fn begin_game_over(&mut self) {
        self.state = GameState::GameOver;
        self.drop_timer();
        audio::play_after(&self.ctx.audio, sounds::GAME_LOST, Duration::from_millis(400));
        let word = self.board.secret_word();
        // reveal the secret in the open slots
        for (index, letter) in word.chars().enumerate() {
            if self.board.is_position_locked(index) {
                continue;
            }
            self.draft[index] = Some(letter);
        }
        self.refresh_slots();
        self.queue_dialogue("lost", &[&word], FALLBACK_LOST, AfterDialogue::BeginEnding);
        self.refresh_hud();
    }

    fn drop_timer(&mut self) {
        if let Some(id) = self.timer_id.take() {
            self.entities.dispose(id);
        }
    }

    fn submit_letter(&mut self, letter: char) {
        match self.board.guess_letter(letter) {
            LetterOutcome::AlreadyGuessed => {
                self.ctx.audio.play(sounds::KEY_TAP);
                self.state = GameState::ReadingText;
                self.queue_dialogue(
                    "already_guessed",
                    &[&letter.to_string()],
                    FALLBACK_ALREADY,
                    AfterDialogue::ToPicking,
                );
                self.refresh_hud();
            }
            LetterOutcome::Hit { .. } => {
                self.ctx.audio.play(sounds::GUESS_CORRECT);
                self.refresh_slots();
                self.enter_picking_option();
            }
            LetterOutcome::Miss => {
                self.ctx.audio.play(sounds::GUESS_WRONG);
                self.enter_picking_option();
            }
        }
    }

    fn submit_word(&mut self) {
        let mut candidate = String::new();
        for (index, slot) in self.board.slots().iter().enumerate() {
            match slot.letter.or(self.draft[index]) {
                Some(letter) => candidate.push(letter),
                // not fully filled yet; ENTER waits
                None => return,
            }
        }
        self.draft = vec![None; self.board.len()];
        match self.board.guess_word(&candidate) {
            Ok(WordOutcome::Solved) => {
                self.ctx.audio.play(sounds::GUESS_CORRECT);
                self.refresh_slots();
                self.enter_picking_option();
            }
            Ok(WordOutcome::Imperfect { .. }) => {
                self.ctx.audio.play(sounds::GUESS_WRONG);
                self.refresh_slots();
                self.enter_picking_option();
            }
            Err(error) => warn!(%error, "word_submit_rejected"),
        }
    }

    fn refresh_slots(&mut self) {
        let views = self.board.slots();
        for (index, id) in self.slot_ids.clone().into_iter().enumerate() {
            let Some(slot) = self.entities.typed_mut::<GlyphSlot>(id) else {
                continue;
            };
            match views.get(index) {
                Some(view) if view.locked => {
                    if let Some(letter) = view.letter {
                        slot.lock(letter);
                    }
                }
                Some(_) => slot.set_entry(self.draft[index]),
                None => {}
            }
        }
    }

    fn refresh_hud(&mut self) {
        let guesses = format!("GUESSES: {}", self.board.guesses_left());
        if let Some(id) = self.guesses_id {
            if let Some(text_box) = self.entities.typed_mut::<TextBox>(id) {
                text_box.set_text(guesses);
            }
        }

        let selector = match self.state {
            GameState::PickingOption => format!("< {} >", self.pending_action.label()),
            GameState::GuessingLetter => "PRESS A LETTER".to_string(),
            GameState::GuessingWord => "TYPE THE WORD, THEN ENTER".to_string(),
            _ => String::new(),
        };
        if let Some(id) = self.selector_id {
            if let Some(text_box) = self.entities.typed_mut::<TextBox>(id) {
                text_box.set_text(selector);
            }
        }

        let labels = self.state.affordance_labels();
        if let Some(id) = self.icon_id {
            if let Some(icons) = self.entities.typed_mut::<IconRow>(id) {
                icons.set_labels(labels);
            }
        }
    }
}

impl Scene for GameScene {
    fn name(&self) -> &'static str {
        "game"
    }

    fn id(&self) -> SceneId {
        self.id
    }

    fn background(&self) -> Rgba {
        GAME_BACKGROUND
    }

    fn entities(&self) -> &EntityList {
        &self.entities
    }

    fn entities_mut(&mut self) -> &mut EntityList {
        &mut self.entities
    }

    fn key_listeners(&self) -> KeySet {
        KeySet::of(&[
            Key::ArrowLeft,
            Key::ArrowRight,
            Key::Enter,
            Key::Escape,
            Key::Backspace,
        ])
        .with_letters()
    }

    fn on_init(&mut self) {
        let width = self.ctx.display_mode.width() as i32;
        let height = self.ctx.display_mode.height() as i32;
        let compositor = &self.ctx.compositor;

        for (seed, x) in [(11u64, width / 12), (23, width - width / 6)] {
            let light = LightFixture::new(
                compositor.clone(),
                Point::new(x, height / 14),
                render_priority::MIN,
                LIGHT_SCALE,
                seed,
            );
            if let Err(error) = self.entities.add(Box::new(light)) {
                warn!(%error, "game_entity_add_failed");
            }
        }

        let platform = StaticImage::new(
            compositor.clone(),
            Point::new(width / 10 - 4 * SPRITE_SCALE as i32, height / 4 + 12 * SPRITE_SCALE as i32),
            render_priority::LOW,
            platform_bitmap(),
            SPRITE_SCALE,
        )
        .with_background_removed()
        .with_color([120, 90, 60, 255]);
        if let Err(error) = self.entities.add(Box::new(platform)) {
            warn!(%error, "game_entity_add_failed");
        }

        let convict = AnimatedSprite::new(
            compositor.clone(),
            Point::new(width / 10, height / 4),
            render_priority::LOW,
            convict_frames(),
            12,
            SPRITE_SCALE,
        );
        if let Err(error) = self.entities.add(Box::new(convict)) {
            warn!(%error, "game_entity_add_failed");
        }

        let slot_step = width / 16;
        let slots_left = (width - self.board.len() as i32 * slot_step) / 2;
        for index in 0..self.board.len() {
            let slot = GlyphSlot::new(
                compositor.clone(),
                Point::new(slots_left + index as i32 * slot_step, height / 3),
                render_priority::NORMAL,
                SLOT_SCALE,
            );
            match self.entities.add(Box::new(slot)) {
                Ok(id) => self.slot_ids.push(id),
                Err(error) => warn!(%error, "game_entity_add_failed"),
            }
        }

        let dialogue = TextBox::new(
            compositor.clone(),
            Point::new(width / 10, height * 2 / 3),
            render_priority::HIGH,
            DIALOGUE_SCALE,
            DIALOGUE_COLOR,
        );
        match self.entities.add(Box::new(dialogue)) {
            Ok(id) => self.dialogue_id = Some(id),
            Err(error) => warn!(%error, "game_entity_add_failed"),
        }

        let selector = TextBox::new(
            compositor.clone(),
            Point::new(width / 10, height * 2 / 3 + height / 10),
            render_priority::HIGH,
            HUD_SCALE,
            HUD_COLOR,
        );
        match self.entities.add(Box::new(selector)) {
            Ok(id) => self.selector_id = Some(id),
            Err(error) => warn!(%error, "game_entity_add_failed"),
        }

        let guesses = TextBox::new(
            compositor.clone(),
            Point::new(width / 10, height / 12),
            render_priority::HIGH,
            HUD_SCALE,
            HUD_COLOR,
        );
        match self.entities.add(Box::new(guesses)) {
            Ok(id) => self.guesses_id = Some(id),
            Err(error) => warn!(%error, "game_entity_add_failed"),
        }

        let icons = IconRow::new(
            compositor.clone(),
            Point::new(width / 10, height - height / 12),
            render_priority::HIGH,
            HUD_SCALE,
        );
        match self.entities.add(Box::new(icons)) {
            Ok(id) => self.icon_id = Some(id),
            Err(error) => warn!(%error, "game_entity_add_failed"),
        }

        if let Some(seconds) = self.ctx.config.timer_seconds() {
            let timer = CountdownTimer::new(
                compositor.clone(),
                Point::new(width - width / 8, height / 12),
                render_priority::HIGH,
                seconds,
                TICKS_PER_SECOND,
                HUD_SCALE,
                TIMER_EXPIRED,
            );
            match self.entities.add(Box::new(timer)) {
                Ok(id) => self.timer_id = Some(id),
                Err(error) => warn!(%error, "game_entity_add_failed"),
            }
        }

        let fade = FadeOverlay::new(FadeDirection::In, FADE_TICKS, FADE_IN_DONE);
        if let Err(error) = self.entities.add(Box::new(fade)) {
            warn!(%error, "game_entity_add_failed");
        }

        if let Err(error) = self.entities.spawn_all() {
            warn!(%error, "game_spawn_failed");
        }

        let crime = match self.ctx.story.random_crime_description() {
            Ok(crime) => crime,
            Err(error) => {
                info!(%error, "crime_fallback");
                FALLBACK_CRIME.to_string()
            }
        };
        self.queue_dialogue("intro", &[&crime], FALLBACK_INTRO, AfterDialogue::ToPicking);
        self.refresh_slots();
        self.refresh_hud();
    }

    fn on_key_press(&mut self, key: Key) -> SceneRequest {
        if key == Key::Escape {
            return menu::switch_to_menu(MenuKind::Main, &self.ctx);
        }
        match self.state {
            GameState::Transition => SceneRequest::None,
            GameState::ReadingText | GameState::GameOver | GameState::GameWon => {
                if key == Key::Enter && !self.show_next_line() {
                    self.dialogue_complete();
                }
                SceneRequest::None
            }
            GameState::PickingOption => {
                match key {
                    Key::ArrowLeft | Key::ArrowRight => {
                        self.pending_action = self.pending_action.cycled();
                        self.ctx.audio.play(sounds::MENU_MOVE);
                        self.refresh_hud();
                    }
                    Key::Enter => {
                        self.ctx.audio.play(sounds::MENU_SELECT);
                        self.state = match self.pending_action {
                            GuessAction::Letter => GameState::GuessingLetter,
                            GuessAction::Word => {
                                self.draft = vec![None; self.board.len()];
                                GameState::GuessingWord
                            }
                        };
                        self.refresh_slots();
                        self.refresh_hud();
                    }
                    _ => {}
                }
                SceneRequest::None
            }
            GameState::GuessingLetter => {
                if let Key::Letter(letter) = key {
                    self.submit_letter(letter);
                }
                SceneRequest::None
            }
            GameState::GuessingWord => {
                match key {
                    Key::Letter(letter) => {
                        let open = (0..self.board.len()).find(|index| {
                            !self.board.is_position_locked(*index) && self.draft[*index].is_none()
                        });
                        if let Some(index) = open {
                            self.draft[index] = Some(letter);
                            self.ctx.audio.play(sounds::KEY_TAP);
                            self.refresh_slots();
                        }
                    }
                    Key::Backspace => {
                        let filled = (0..self.board.len()).rev().find(|index| {
                            !self.board.is_position_locked(*index) && self.draft[*index].is_some()
                        });
                        if let Some(index) = filled {
                            self.draft[index] = None;
                            self.refresh_slots();
                        }
                    }
                    Key::Enter => self.submit_word(),
                    _ => {}
                }
                SceneRequest::None
            }
        }
    }

    fn on_signal(&mut self, signal: Signal) -> SceneRequest {
        match signal {
            FADE_IN_DONE => {
                if self.state == GameState::Transition {
                    self.state = GameState::ReadingText;
                    self.refresh_hud();
                }
                SceneRequest::None
            }
            FADE_OUT_DONE => menu::switch_to_menu(MenuKind::Main, &self.ctx),
            TIMER_EXPIRED => {
                if matches!(
                    self.state,
                    GameState::PickingOption | GameState::GuessingLetter | GameState::GuessingWord
                ) {
                    self.ctx.audio.play(sounds::GUESS_WRONG);
                    self.board.charge_timeout();
                    self.state = GameState::ReadingText;
                    self.queue_dialogue("timeout", &[], FALLBACK_TIMEOUT, AfterDialogue::ToPicking);
                    self.refresh_hud();
                }
                SceneRequest::None
            }
            _ => SceneRequest::None,
        }
    }
}

/// Two-frame idle sway for the convict, authored in swatch grays on the
/// keyable background like all glyph art.
fn convict_frames() -> Vec<RasterImage> {
    vec![convict_frame(0), convict_frame(1)]
}

/// The slab the convict stands on, shaded in the two darker swatch steps.
fn platform_bitmap() -> RasterImage {
    const WIDTH: u32 = 16;
    const HEIGHT: u32 = 3;
    let mut image = RasterImage::filled(WIDTH, HEIGHT, [0, 0, 0, 255]);
    for x in 0..WIDTH {
        image.put_pixel(x, 0, [192, 192, 192, 255]);
        image.put_pixel(x, 1, [128, 128, 128, 255]);
        image.put_pixel(x, 2, [64, 64, 64, 255]);
    }
    image
}

fn convict_frame(sway: u32) -> RasterImage {
    const WIDTH: u32 = 8;
    const HEIGHT: u32 = 12;
    let mut image = RasterImage::filled(WIDTH, HEIGHT, [0, 0, 0, 255]);
    let head_x = 3 + sway;
    for y in 0..2u32 {
        for x in 0..2u32 {
            image.put_pixel(head_x + x, y, [255, 255, 255, 255]);
        }
    }
    for y in 2..8u32 {
        image.put_pixel(3, y, [192, 192, 192, 255]);
        image.put_pixel(4, y, [192, 192, 192, 255]);
    }
    for y in 8..HEIGHT {
        image.put_pixel(2 + sway, y, [128, 128, 128, 255]);
        image.put_pixel(5 - sway, y, [128, 128, 128, 255]);
    }
    image
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use engine::{embedded_glyph_set, Compositor, ConfigSource, DisplayMode};

    use super::super::content::test_support::{TestAudio, TestConfig, TestStory};
    use super::*;

    fn test_ctx(word: &'static str) -> GameContext {
        GameContext {
            story: Arc::new(TestStory { word: Some(word) }),
            config: Arc::new(TestConfig::default()),
            audio: Arc::new(TestAudio),
            compositor: Arc::new(Compositor::new(embedded_glyph_set(), 1.0)),
            display_mode: DisplayMode::Hd720,
        }
    }

    fn scene(word: &'static str, guesses: u32) -> GameScene {
        let mut scene = GameScene::with_secret(test_ctx(word), word, guesses).expect("scene");
        scene.on_init();
        scene
    }

    fn run_fade_in(scene: &mut GameScene) {
        for frame in 0..(FADE_TICKS as u64 + 2) {
            let _ = scene.advance(frame);
        }
    }

    fn to_picking(scene: &mut GameScene) {
        run_fade_in(scene);
        // fallback intro is two lines; the first is already displayed
        scene.on_key_press(Key::Enter);
        scene.on_key_press(Key::Enter);
        assert_eq!(scene.state(), GameState::PickingOption);
    }

    #[test]
    fn fade_in_completion_advances_to_reading() {
        let mut scene = scene("LIVE", 5);
        assert_eq!(scene.state(), GameState::Transition);
        run_fade_in(&mut scene);
        assert_eq!(scene.state(), GameState::ReadingText);
    }

    #[test]
    fn keys_are_ignored_during_transition() {
        let mut scene = scene("LIVE", 5);
        scene.on_key_press(Key::Enter);
        assert_eq!(scene.state(), GameState::Transition);
    }

    #[test]
    fn exhausting_intro_dialogue_reaches_picking() {
        let mut scene = scene("LIVE", 5);
        to_picking(&mut scene);
    }

    #[test]
    fn arrows_cycle_the_pending_action_and_enter_commits() {
        let mut scene = scene("LIVE", 5);
        to_picking(&mut scene);
        scene.on_key_press(Key::ArrowRight);
        scene.on_key_press(Key::Enter);
        assert_eq!(scene.state(), GameState::GuessingWord);
    }

    #[test]
    fn correct_letter_locks_slots_without_charge() {
        let mut scene = scene("LIVE", 5);
        to_picking(&mut scene);
        scene.on_key_press(Key::Enter);
        assert_eq!(scene.state(), GameState::GuessingLetter);
        scene.on_key_press(Key::Letter('I'));
        assert_eq!(scene.state(), GameState::PickingOption);
        assert!(scene.board().is_position_locked(1));
        assert_eq!(scene.board().guesses_left(), 5);
    }

    #[test]
    fn wrong_letter_charges_one_guess() {
        let mut scene = scene("LIVE", 5);
        to_picking(&mut scene);
        scene.on_key_press(Key::Enter);
        scene.on_key_press(Key::Letter('Z'));
        assert_eq!(scene.board().guesses_left(), 4);
        assert_eq!(scene.state(), GameState::PickingOption);
    }

    #[test]
    fn repeated_letter_detours_through_reading_text() {
        let mut scene = scene("LIVE", 5);
        to_picking(&mut scene);
        scene.on_key_press(Key::Enter);
        scene.on_key_press(Key::Letter('I'));
        scene.on_key_press(Key::Enter);
        scene.on_key_press(Key::Letter('I'));
        assert_eq!(scene.state(), GameState::ReadingText);
        assert_eq!(scene.board().guesses_left(), 5);
        // the single detour line is already displayed; ENTER completes it
        scene.on_key_press(Key::Enter);
        assert_eq!(scene.state(), GameState::PickingOption);
    }

    #[test]
    fn imperfect_word_guess_locks_matches_and_charges_two() {
        let mut scene = scene("LIVE", 5);
        to_picking(&mut scene);
        scene.on_key_press(Key::ArrowLeft);
        scene.on_key_press(Key::Enter);
        assert_eq!(scene.state(), GameState::GuessingWord);
        for letter in ['L', 'I', 'F', 'E'] {
            scene.on_key_press(Key::Letter(letter));
        }
        scene.on_key_press(Key::Enter);
        assert_eq!(scene.board().guesses_left(), 3);
        assert!(scene.board().is_position_locked(0));
        assert!(scene.board().is_position_locked(1));
        assert!(!scene.board().is_position_locked(2));
        assert!(scene.board().is_position_locked(3));
        assert_eq!(scene.state(), GameState::PickingOption);
    }

    #[test]
    fn enter_with_incomplete_draft_does_not_submit() {
        let mut scene = scene("LIVE", 5);
        to_picking(&mut scene);
        scene.on_key_press(Key::ArrowRight);
        scene.on_key_press(Key::Enter);
        scene.on_key_press(Key::Letter('L'));
        scene.on_key_press(Key::Enter);
        assert_eq!(scene.state(), GameState::GuessingWord);
        assert_eq!(scene.board().guesses_left(), 5);
    }

    #[test]
    fn backspace_clears_the_latest_draft_letter() {
        let mut scene = scene("LIVE", 5);
        to_picking(&mut scene);
        scene.on_key_press(Key::ArrowRight);
        scene.on_key_press(Key::Enter);
        scene.on_key_press(Key::Letter('A'));
        scene.on_key_press(Key::Letter('B'));
        scene.on_key_press(Key::Backspace);
        assert_eq!(scene.draft, vec![Some('A'), None, None, None]);
    }

    #[test]
    fn solving_the_word_moves_to_game_won() {
        let mut scene = scene("LIVE", 5);
        to_picking(&mut scene);
        scene.on_key_press(Key::ArrowRight);
        scene.on_key_press(Key::Enter);
        for letter in ['L', 'I', 'V', 'E'] {
            scene.on_key_press(Key::Letter(letter));
        }
        scene.on_key_press(Key::Enter);
        assert_eq!(scene.state(), GameState::GameWon);
        assert_eq!(scene.board().guesses_left(), 5);
    }

    #[test]
    fn last_wrong_guess_clamps_to_zero_and_ends_the_game() {
        let mut scene = scene("LIVE", 1);
        to_picking(&mut scene);
        scene.on_key_press(Key::Enter);
        scene.on_key_press(Key::Letter('Z'));
        assert_eq!(scene.board().guesses_left(), 0);
        assert_eq!(scene.state(), GameState::GameOver);
    }

    #[test]
    fn win_takes_priority_over_exhausted_budget() {
        let mut scene = scene("LIVE", 1);
        to_picking(&mut scene);
        scene.board.charge_timeout();
        assert!(scene.board.is_lost());
        let _ = scene.board.guess_word("LIVE").expect("solve");
        scene.enter_picking_option();
        assert_eq!(scene.state(), GameState::GameWon);
    }

    #[test]
    fn ending_dialogue_starts_the_fade_out_once() {
        let mut scene = scene("LIVE", 5);
        to_picking(&mut scene);
        scene.on_key_press(Key::ArrowRight);
        scene.on_key_press(Key::Enter);
        for letter in ['L', 'I', 'V', 'E'] {
            scene.on_key_press(Key::Letter(letter));
        }
        scene.on_key_press(Key::Enter);
        let before = scene.entities().len();
        // single fallback line already shown; ENTER completes the sequence
        scene.on_key_press(Key::Enter);
        assert_eq!(scene.entities().len(), before + 1);
        scene.on_key_press(Key::Enter);
        assert_eq!(scene.entities().len(), before + 1);
    }

    #[test]
    fn fade_out_completion_returns_to_the_main_menu() {
        let mut scene = scene("LIVE", 5);
        let request = scene.on_signal(FADE_OUT_DONE);
        match request {
            SceneRequest::Switch(next) => assert_eq!(next.name(), "main_menu"),
            other => panic!("expected switch, got {other:?}"),
        }
    }

    #[test]
    fn timer_expiry_charges_a_guess_and_detours() {
        let ctx = test_ctx("LIVE");
        ctx.config.set_timer_seconds(Some(1));
        let mut scene = GameScene::with_secret(ctx, "LIVE", 5).expect("scene");
        scene.on_init();
        assert!(scene.timer_id.is_some());
        run_fade_in(&mut scene);
        scene.on_key_press(Key::Enter);
        scene.on_key_press(Key::Enter);
        assert_eq!(scene.state(), GameState::PickingOption);

        let request = scene.on_signal(TIMER_EXPIRED);
        assert!(request.is_none());
        assert_eq!(scene.board().guesses_left(), 4);
        assert_eq!(scene.state(), GameState::ReadingText);
    }

    #[test]
    fn timer_is_dropped_when_the_game_ends() {
        let ctx = test_ctx("LIVE");
        ctx.config.set_timer_seconds(Some(30));
        let mut scene = GameScene::with_secret(ctx, "LIVE", 1).expect("scene");
        scene.on_init();
        run_fade_in(&mut scene);
        scene.on_key_press(Key::Enter);
        scene.on_key_press(Key::Enter);
        scene.on_key_press(Key::Enter);
        scene.on_key_press(Key::Letter('Z'));
        assert_eq!(scene.state(), GameState::GameOver);
        assert!(scene.timer_id.is_none());
    }

    #[test]
    fn escape_abandons_the_round() {
        let mut scene = scene("LIVE", 5);
        let request = scene.on_key_press(Key::Escape);
        assert!(matches!(request, SceneRequest::Switch(_)));
    }
}
