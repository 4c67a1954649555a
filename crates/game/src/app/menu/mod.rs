mod components;
mod key_entry;

pub use components::{
    first_focusable, step_focus, ComponentKind, MenuAction, MenuComponent, SettingKind,
};
pub use key_entry::KeyEntryScene;

use engine::{
    AudioSink, ConfigSource, DisplayMode, EntityList, GameContext, Key, KeySet, Point, Rgba,
    Scene, SceneId, SceneRequest,
};
use thiserror::Error;
use tracing::{info, warn};

use super::content::audio::sounds;
use super::entities::TextBox;
use super::gameplay::GameScene;

const MENU_BACKGROUND: Rgba = [14, 16, 22, 255];
const BANNER_COLOR: Rgba = [235, 200, 80, 255];
const IDLE_COLOR: Rgba = [200, 205, 215, 255];
const FOCUS_COLOR: Rgba = [255, 235, 140, 255];
const HINT_COLOR: Rgba = [120, 130, 150, 255];
const BANNER_SCALE: f32 = 6.0;
const ITEM_SCALE: f32 = 3.0;
const HINT_SCALE: f32 = 2.0;

const TIMER_PRESETS: [(&str, Option<u32>); 4] =
    [("OFF", None), ("30S", Some(30)), ("60S", Some(60)), ("90S", Some(90))];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MenuError {
    #[error("menu '{0}' has no focusable component")]
    NoFocusableComponent(&'static str),
}

/// Which menu to rebuild when navigating back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    Main,
    Options,
}

/// A focus-navigated menu over a fixed component array. One scene type
/// covers every menu; the builders below differ only in their components.
pub struct MenuScene {
    id: SceneId,
    name: &'static str,
    ctx: GameContext,
    entities: EntityList,
    components: Vec<MenuComponent>,
    focus: usize,
    parent: Option<MenuKind>,
}

pub fn main_menu(ctx: GameContext) -> Result<MenuScene, MenuError> {
    let components = vec![
        MenuComponent::banner("GALLOWS"),
        MenuComponent::button("PLAY", MenuAction::StartGame),
        MenuComponent::button("OPTIONS", MenuAction::OpenOptions),
        MenuComponent::button("QUIT", MenuAction::Quit),
    ];
    MenuScene::new("main_menu", ctx, components, None)
}

pub fn options_menu(ctx: GameContext) -> Result<MenuScene, MenuError> {
    let current_mode = ctx.config.display_mode();
    let mode_index = DisplayMode::ALL
        .iter()
        .position(|mode| *mode == current_mode)
        .unwrap_or(0);
    let timer_index = TIMER_PRESETS
        .iter()
        .position(|(_, seconds)| *seconds == ctx.config.timer_seconds())
        .unwrap_or(0);
    let nsfl_index = usize::from(ctx.config.is_nsfl_enabled());

    let mut components = vec![
        MenuComponent::banner("OPTIONS"),
        MenuComponent::selector(
            "RESOLUTION",
            DisplayMode::ALL
                .iter()
                .map(|mode| mode.label().to_string())
                .collect(),
            mode_index,
            SettingKind::Resolution,
        ),
        MenuComponent::selector(
            "TIMER",
            TIMER_PRESETS
                .iter()
                .map(|(label, _)| label.to_string())
                .collect(),
            timer_index,
            SettingKind::TimerPreset,
        ),
        MenuComponent::selector(
            "NSFL STORIES",
            vec!["OFF".to_string(), "ON".to_string()],
            nsfl_index,
            SettingKind::Nsfl,
        ),
    ];
    if ctx.config.is_online() {
        components.push(MenuComponent::button("API KEY", MenuAction::OpenKeyEntry));
    }
    components.push(MenuComponent::button("BACK", MenuAction::BackToMain));
    MenuScene::new("options_menu", ctx, components, Some(MenuKind::Main))
}

impl MenuScene {
    fn new(
        name: &'static str,
        ctx: GameContext,
        components: Vec<MenuComponent>,
        parent: Option<MenuKind>,
    ) -> Result<Self, MenuError> {
        let focus = first_focusable(&components).ok_or(MenuError::NoFocusableComponent(name))?;
        Ok(Self {
            id: SceneId::allocate(),
            name,
            ctx,
            entities: EntityList::new(),
            components,
            focus,
            parent,
        })
    }

    #[cfg(test)]
    pub(crate) fn focused_index(&self) -> usize {
        self.focus
    }

    fn component_text(&self, index: usize) -> (String, Rgba) {
        let component = &self.components[index];
        let focused = index == self.focus;
        match &component.kind {
            ComponentKind::Banner => (component.label.clone(), BANNER_COLOR),
            ComponentKind::Button(_) => (
                component.label.clone(),
                if focused { FOCUS_COLOR } else { IDLE_COLOR },
            ),
            ComponentKind::Selector(selector) => {
                let text = if focused {
                    format!("{}: < {} >", component.label, selector.current())
                } else {
                    format!("{}: {}", component.label, selector.current())
                };
                (text, if focused { FOCUS_COLOR } else { IDLE_COLOR })
            }
        }
    }

    fn refresh_visuals(&mut self) {
        for index in 0..self.components.len() {
            let (text, color) = self.component_text(index);
            let Some(entity) = self.components[index].entity else {
                continue;
            };
            if let Some(text_box) = self.entities.typed_mut::<TextBox>(entity) {
                text_box.set_text(text);
                text_box.set_color(color);
            }
        }
    }

    fn apply_setting(&self, setting: SettingKind, selected: usize) {
        match setting {
            SettingKind::Resolution => {
                let mode = DisplayMode::ALL[selected.min(DisplayMode::ALL.len() - 1)];
                self.ctx.config.set_display_mode(mode);
                info!(mode = mode.label(), "resolution_saved_for_next_launch");
            }
            SettingKind::TimerPreset => {
                let (_, seconds) = TIMER_PRESETS[selected.min(TIMER_PRESETS.len() - 1)];
                self.ctx.config.set_timer_seconds(seconds);
            }
            SettingKind::Nsfl => {
                self.ctx.config.set_nsfl_enabled(selected == 1);
            }
        }
    }

    fn activate(&mut self, action: MenuAction) -> SceneRequest {
        self.ctx.audio.play(sounds::MENU_SELECT);
        match action {
            MenuAction::StartGame => {
                self.ctx.config.mark_played();
                match GameScene::new(self.ctx.clone()) {
                    Ok(scene) => SceneRequest::Switch(Box::new(scene)),
                    Err(error) => {
                        warn!(%error, "game_scene_setup_failed");
                        SceneRequest::None
                    }
                }
            }
            MenuAction::OpenOptions => switch_to_menu(MenuKind::Options, &self.ctx),
            MenuAction::OpenKeyEntry => {
                SceneRequest::Switch(Box::new(KeyEntryScene::new(self.ctx.clone())))
            }
            MenuAction::BackToMain => switch_to_menu(MenuKind::Main, &self.ctx),
            MenuAction::Quit => SceneRequest::Quit,
        }
    }
}

/// Builds and switches to a sibling menu; a build failure is logged and the
/// current scene stays active.
pub(crate) fn switch_to_menu(kind: MenuKind, ctx: &GameContext) -> SceneRequest {
    let built = match kind {
        MenuKind::Main => main_menu(ctx.clone()),
        MenuKind::Options => options_menu(ctx.clone()),
    };
    match built {
        Ok(scene) => SceneRequest::Switch(Box::new(scene)),
        Err(error) => {
            warn!(%error, "menu_build_failed");
            SceneRequest::None
        }
    }
}

impl Scene for MenuScene {
    fn name(&self) -> &'static str {
        self.name
    }

    fn id(&self) -> SceneId {
        self.id
    }

    fn background(&self) -> Rgba {
        MENU_BACKGROUND
    }

    fn entities(&self) -> &EntityList {
        &self.entities
    }

    fn entities_mut(&mut self) -> &mut EntityList {
        &mut self.entities
    }

    fn key_listeners(&self) -> KeySet {
        KeySet::of(&[
            Key::ArrowUp,
            Key::ArrowDown,
            Key::ArrowLeft,
            Key::ArrowRight,
            Key::Enter,
            Key::Escape,
        ])
    }

    fn on_init(&mut self) {
        let width = self.ctx.display_mode.width() as i32;
        let height = self.ctx.display_mode.height() as i32;
        let left = width / 8;
        let mut y = height / 8;

        for index in 0..self.components.len() {
            let is_banner = matches!(self.components[index].kind, ComponentKind::Banner);
            let scale = if is_banner { BANNER_SCALE } else { ITEM_SCALE };
            let text_box = TextBox::new(
                self.ctx.compositor.clone(),
                Point::new(left, y),
                engine::render_priority::NORMAL,
                scale,
                IDLE_COLOR,
            );
            match self.entities.add(Box::new(text_box)) {
                Ok(id) => self.components[index].entity = Some(id),
                Err(error) => warn!(%error, "menu_entity_add_failed"),
            }
            y += if is_banner { height / 7 } else { height / 12 };
        }

        if !self.ctx.config.has_played_before() && self.parent.is_none() {
            let hint = TextBox::new(
                self.ctx.compositor.clone(),
                Point::new(left, height - height / 10),
                engine::render_priority::LOW,
                HINT_SCALE,
                HINT_COLOR,
            )
            .with_text("ARROWS: MOVE - ENTER: SELECT");
            if let Err(error) = self.entities.add(Box::new(hint)) {
                warn!(%error, "menu_entity_add_failed");
            }
        }

        if let Err(error) = self.entities.spawn_all() {
            warn!(%error, "menu_spawn_failed");
        }
        self.refresh_visuals();
    }

    fn on_key_press(&mut self, key: Key) -> SceneRequest {
        match key {
            Key::ArrowDown => {
                self.focus = step_focus(&self.components, self.focus, 1);
                self.ctx.audio.play(sounds::MENU_MOVE);
                self.refresh_visuals();
                SceneRequest::None
            }
            Key::ArrowUp => {
                self.focus = step_focus(&self.components, self.focus, -1);
                self.ctx.audio.play(sounds::MENU_MOVE);
                self.refresh_visuals();
                SceneRequest::None
            }
            Key::ArrowLeft | Key::ArrowRight => {
                let step = if key == Key::ArrowLeft { -1 } else { 1 };
                let applied = match &mut self.components[self.focus].kind {
                    ComponentKind::Selector(selector) => {
                        selector.cycle(step);
                        Some((selector.setting, selector.selected))
                    }
                    _ => None,
                };
                if let Some((setting, selected)) = applied {
                    self.apply_setting(setting, selected);
                    self.ctx.audio.play(sounds::MENU_MOVE);
                    self.refresh_visuals();
                }
                SceneRequest::None
            }
            Key::Enter => match self.components[self.focus].kind {
                ComponentKind::Button(action) => self.activate(action),
                _ => SceneRequest::None,
            },
            Key::Escape => match self.parent {
                Some(parent) => switch_to_menu(parent, &self.ctx),
                None => SceneRequest::None,
            },
            _ => SceneRequest::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use engine::{embedded_glyph_set, Compositor};

    use super::super::content::test_support::{TestAudio, TestConfig, TestStory};
    use super::*;

    fn test_ctx() -> GameContext {
        GameContext {
            story: Arc::new(TestStory::default()),
            config: Arc::new(TestConfig::default()),
            audio: Arc::new(TestAudio),
            compositor: Arc::new(Compositor::new(embedded_glyph_set(), 1.0)),
            display_mode: DisplayMode::Hd720,
        }
    }

    fn focus_machine_scene() -> MenuScene {
        // [focusable, unfocusable, focusable], focus starts at index 0
        MenuScene::new(
            "focus_probe",
            test_ctx(),
            vec![
                MenuComponent::button("FIRST", MenuAction::Quit),
                MenuComponent::banner("MIDDLE"),
                MenuComponent::button("LAST", MenuAction::Quit),
            ],
            None,
        )
        .expect("menu")
    }

    #[test]
    fn arrow_down_skips_unfocusable_and_wraps() {
        let mut scene = focus_machine_scene();
        scene.on_init();
        assert_eq!(scene.focused_index(), 0);

        scene.on_key_press(Key::ArrowDown);
        assert_eq!(scene.focused_index(), 2);

        scene.on_key_press(Key::ArrowDown);
        assert_eq!(scene.focused_index(), 0);
    }

    #[test]
    fn menu_without_focusable_component_fails_to_build() {
        let err = MenuScene::new(
            "broken",
            test_ctx(),
            vec![MenuComponent::banner("ONLY ART")],
            None,
        )
        .expect_err("no focusable");
        assert_eq!(err, MenuError::NoFocusableComponent("broken"));
    }

    #[test]
    fn selector_cycles_apply_settings_immediately() {
        let ctx = test_ctx();
        let mut scene = options_menu(ctx.clone()).expect("options");
        scene.on_init();

        // focus the timer selector: resolution is first, timer second
        scene.on_key_press(Key::ArrowDown);
        scene.on_key_press(Key::ArrowRight);
        assert_eq!(ctx.config.timer_seconds(), Some(30));

        scene.on_key_press(Key::ArrowLeft);
        assert_eq!(ctx.config.timer_seconds(), None);
    }

    #[test]
    fn enter_on_quit_button_requests_quit() {
        let mut scene = main_menu(test_ctx()).expect("menu");
        scene.on_init();
        scene.on_key_press(Key::ArrowDown);
        scene.on_key_press(Key::ArrowDown);
        let request = scene.on_key_press(Key::Enter);
        assert!(matches!(request, SceneRequest::Quit));
    }

    #[test]
    fn escape_returns_to_the_parent_menu() {
        let mut scene = options_menu(test_ctx()).expect("options");
        scene.on_init();
        let request = scene.on_key_press(Key::Escape);
        match request {
            SceneRequest::Switch(next) => assert_eq!(next.name(), "main_menu"),
            other => panic!("expected switch, got {other:?}"),
        }
    }

    #[test]
    fn escape_on_the_root_menu_is_inert() {
        let mut scene = main_menu(test_ctx()).expect("menu");
        scene.on_init();
        assert!(scene.on_key_press(Key::Escape).is_none());
    }

    #[test]
    fn start_game_marks_the_config_as_played() {
        let ctx = test_ctx();
        let mut scene = main_menu(ctx.clone()).expect("menu");
        scene.on_init();
        let request = scene.on_key_press(Key::Enter);
        assert!(matches!(request, SceneRequest::Switch(_)));
        assert!(ctx.config.has_played_before());
    }
}
