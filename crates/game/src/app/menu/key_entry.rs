use engine::{
    render_priority, AudioSink, ConfigSource, EntityList, GameContext, Key, KeySet, Point, Rgba,
    Scene, SceneId, SceneRequest,
};
use tracing::warn;

use super::super::content::audio::sounds;
use super::super::entities::TextBox;
use super::{switch_to_menu, MenuKind};

const BACKGROUND: Rgba = [14, 16, 22, 255];
const BANNER_COLOR: Rgba = [235, 200, 80, 255];
const INPUT_COLOR: Rgba = [200, 205, 215, 255];
const STATUS_COLOR: Rgba = [230, 70, 60, 255];

const MIN_KEY_LEN: usize = 16;
const MAX_KEY_LEN: usize = 32;

/// Shape-only validation; the remote credential check lives outside the
/// core. A rejected key re-prompts this same screen.
pub(crate) fn validate_api_key(key: &str) -> bool {
    (MIN_KEY_LEN..=MAX_KEY_LEN).contains(&key.len())
        && key.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Typed API-key entry for online mode. ENTER validates and persists;
/// ESCAPE abandons the edit.
pub struct KeyEntryScene {
    id: SceneId,
    ctx: GameContext,
    entities: EntityList,
    buffer: String,
    input_id: Option<engine::EntityId>,
    status_id: Option<engine::EntityId>,
}

impl KeyEntryScene {
    pub fn new(ctx: GameContext) -> Self {
        Self {
            id: SceneId::allocate(),
            ctx,
            entities: EntityList::new(),
            buffer: String::new(),
            input_id: None,
            status_id: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn buffer(&self) -> &str {
        &self.buffer
    }

    fn refresh_input(&mut self) {
        let text = format!("{}_", self.buffer);
        if let Some(id) = self.input_id {
            if let Some(text_box) = self.entities.typed_mut::<TextBox>(id) {
                text_box.set_text(text);
            }
        }
    }

    fn set_status(&mut self, status: &str) {
        if let Some(id) = self.status_id {
            if let Some(text_box) = self.entities.typed_mut::<TextBox>(id) {
                text_box.set_text(status);
            }
        }
    }
}

impl Scene for KeyEntryScene {
    fn name(&self) -> &'static str {
        "key_entry"
    }

    fn id(&self) -> SceneId {
        self.id
    }

    fn background(&self) -> Rgba {
        BACKGROUND
    }

    fn entities(&self) -> &EntityList {
        &self.entities
    }

    fn entities_mut(&mut self) -> &mut EntityList {
        &mut self.entities
    }

    fn key_listeners(&self) -> KeySet {
        KeySet::of(&[Key::Enter, Key::Escape, Key::Backspace])
            .with_letters()
            .with_digits()
    }

    fn on_init(&mut self) {
        let width = self.ctx.display_mode.width() as i32;
        let height = self.ctx.display_mode.height() as i32;
        let left = width / 8;

        let banner = TextBox::new(
            self.ctx.compositor.clone(),
            Point::new(left, height / 8),
            render_priority::NORMAL,
            5.0,
            BANNER_COLOR,
        )
        .with_text("API KEY");
        let input = TextBox::new(
            self.ctx.compositor.clone(),
            Point::new(left, height / 3),
            render_priority::NORMAL,
            3.0,
            INPUT_COLOR,
        )
        .with_text("_");
        let status = TextBox::new(
            self.ctx.compositor.clone(),
            Point::new(left, height / 2),
            render_priority::NORMAL,
            2.0,
            STATUS_COLOR,
        );

        if let Err(error) = self.entities.add(Box::new(banner)) {
            warn!(%error, "key_entry_entity_add_failed");
        }
        match self.entities.add(Box::new(input)) {
            Ok(id) => self.input_id = Some(id),
            Err(error) => warn!(%error, "key_entry_entity_add_failed"),
        }
        match self.entities.add(Box::new(status)) {
            Ok(id) => self.status_id = Some(id),
            Err(error) => warn!(%error, "key_entry_entity_add_failed"),
        }
        if let Err(error) = self.entities.spawn_all() {
            warn!(%error, "key_entry_spawn_failed");
        }
    }

    fn on_key_press(&mut self, key: Key) -> SceneRequest {
        match key {
            Key::Letter(c) | Key::Digit(c) => {
                if self.buffer.len() < MAX_KEY_LEN {
                    self.buffer.push(c);
                    self.ctx.audio.play(sounds::KEY_TAP);
                    self.refresh_input();
                }
                SceneRequest::None
            }
            Key::Backspace => {
                if self.buffer.pop().is_some() {
                    self.refresh_input();
                }
                SceneRequest::None
            }
            Key::Enter => {
                if validate_api_key(&self.buffer) {
                    self.ctx.config.set_api_key(&self.buffer);
                    self.ctx.audio.play(sounds::MENU_SELECT);
                    switch_to_menu(MenuKind::Options, &self.ctx)
                } else {
                    // failed check re-prompts the same input screen
                    self.ctx.audio.play(sounds::GUESS_WRONG);
                    self.set_status("INVALID KEY: 16-32 LETTERS OR DIGITS");
                    SceneRequest::None
                }
            }
            Key::Escape => switch_to_menu(MenuKind::Options, &self.ctx),
            _ => SceneRequest::None,
        }
    }
}
