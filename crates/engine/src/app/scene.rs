use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tracing::{info, warn};

use crate::app::entity::{EntityId, LifecycleError, Renderable, Signal};
use crate::app::input::{Key, KeySet};
use crate::raster::{Rgba, Surface, OPAQUE_BLACK};

static NEXT_SCENE_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a constructed scene; used to reject activating the scene
/// that is already active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(u64);

impl SceneId {
    pub fn allocate() -> Self {
        Self(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// What a scene wants the view to do after a key press or a tick.
pub enum SceneRequest {
    None,
    Switch(Box<dyn Scene>),
    Quit,
}

impl SceneRequest {
    pub fn is_none(&self) -> bool {
        matches!(self, SceneRequest::None)
    }
}

impl std::fmt::Debug for SceneRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneRequest::None => f.write_str("None"),
            SceneRequest::Switch(scene) => f.debug_tuple("Switch").field(&scene.name()).finish(),
            SceneRequest::Quit => f.write_str("Quit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SceneSwapError {
    #[error("scene '{name}' is already active")]
    DuplicateScene { name: &'static str },
}

struct EntitySlot {
    id: EntityId,
    insertion: u64,
    entity: Box<dyn Renderable>,
}

/// Insertion-ordered entity storage. Draw order is governed by render
/// priority with insertion order as the stable tie-break; the tick sweep is
/// the single point where pending disposals are actually destroyed.
#[derive(Default)]
pub struct EntityList {
    slots: Vec<EntitySlot>,
    next_id: u64,
    next_insertion: u64,
}

impl EntityList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity. Rejects one that was already removed; an entity
    /// id is never reused.
    pub fn add(&mut self, entity: Box<dyn Renderable>) -> Result<EntityId, LifecycleError> {
        if entity.base().lifecycle().is_removed() {
            return Err(LifecycleError::AlreadyRemoved);
        }
        let id = EntityId(self.next_id);
        self.next_id += 1;
        let insertion = self.next_insertion;
        self.next_insertion += 1;
        self.slots.push(EntitySlot {
            id,
            insertion,
            entity,
        });
        Ok(id)
    }

    /// Spawns every entity that has not been spawned yet.
    pub fn spawn_all(&mut self) -> Result<(), LifecycleError> {
        for slot in &mut self.slots {
            if !slot.entity.base().lifecycle().is_loaded() {
                slot.entity.spawn()?;
            }
        }
        Ok(())
    }

    pub fn dispose_all(&mut self) {
        for slot in &mut self.slots {
            slot.entity.dispose();
        }
    }

    pub fn dispose(&mut self, id: EntityId) -> bool {
        match self.slot_mut(id) {
            Some(slot) => {
                slot.entity.dispose();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.slots.iter().any(|slot| slot.id == id)
    }

    /// Typed access to a stored entity.
    pub fn typed<T: Renderable>(&self, id: EntityId) -> Option<&T> {
        self.slots
            .iter()
            .find(|slot| slot.id == id)
            .and_then(|slot| slot.entity.as_any().downcast_ref::<T>())
    }

    pub fn typed_mut<T: Renderable>(&mut self, id: EntityId) -> Option<&mut T> {
        self.slot_mut(id)
            .and_then(|slot| slot.entity.as_any_mut().downcast_mut::<T>())
    }

    fn slot_mut(&mut self, id: EntityId) -> Option<&mut EntitySlot> {
        self.slots.iter_mut().find(|slot| slot.id == id)
    }

    /// One update tick: sweep pending disposals first (so a disposal flagged
    /// during tick N is gone before any `tick` of frame N runs), then tick
    /// the drawable survivors and collect their completion signals.
    pub fn run_tick(&mut self, frame_index: u64) -> Vec<Signal> {
        self.slots.retain_mut(|slot| {
            if slot.entity.should_remove() {
                if let Err(error) = slot.entity.remove() {
                    warn!(entity = slot.id.0, %error, "entity_sweep_remove_failed");
                }
                false
            } else {
                true
            }
        });

        let mut signals = Vec::new();
        for slot in &mut self.slots {
            if !slot.entity.should_draw() {
                continue;
            }
            if let Some(signal) = slot.entity.tick(frame_index) {
                signals.push(signal);
            }
        }
        signals
    }

    /// Draws every drawable entity in ascending render priority, stable by
    /// insertion order.
    pub fn draw(&self, surface: &mut Surface<'_>) {
        let mut order: Vec<usize> = (0..self.slots.len())
            .filter(|index| self.slots[*index].entity.should_draw())
            .collect();
        order.sort_by_key(|index| {
            let slot = &self.slots[*index];
            (slot.entity.render_priority(), slot.insertion)
        });
        for index in order {
            self.slots[index].entity.draw(surface);
        }
    }

    /// Removes every loaded entity and clears the collection; used when the
    /// owning scene is unloaded.
    pub fn unload_all(&mut self) {
        for slot in &mut self.slots {
            let lifecycle = slot.entity.base().lifecycle();
            if lifecycle.is_loaded() && !lifecycle.is_removed() {
                if let Err(error) = slot.entity.remove() {
                    warn!(entity = slot.id.0, %error, "entity_unload_failed");
                }
            }
        }
        self.slots.clear();
    }
}

/// A scene: owner of an entity collection, a key-input filter and lifecycle
/// hooks. Exactly one scene is active at a time, owned by the `View`.
pub trait Scene {
    fn name(&self) -> &'static str;
    fn id(&self) -> SceneId;

    fn background(&self) -> Rgba {
        OPAQUE_BLACK
    }

    fn entities(&self) -> &EntityList;
    fn entities_mut(&mut self) -> &mut EntityList;

    /// The fixed set of keys this scene listens for; empty means the scene
    /// receives no key events at all.
    fn key_listeners(&self) -> KeySet {
        KeySet::empty()
    }

    fn on_init(&mut self);

    fn on_dispose(&mut self) {}

    fn on_key_press(&mut self, _key: Key) -> SceneRequest {
        SceneRequest::None
    }

    /// Receives completion signals collected during the tick pass.
    fn on_signal(&mut self, _signal: Signal) -> SceneRequest {
        SceneRequest::None
    }

    /// One update tick: entity sweep + tick, then signal routing. The first
    /// non-trivial request wins.
    fn advance(&mut self, frame_index: u64) -> SceneRequest {
        let signals = self.entities_mut().run_tick(frame_index);
        let mut request = SceneRequest::None;
        for signal in signals {
            let response = self.on_signal(signal);
            if request.is_none() && !response.is_none() {
                request = response;
            }
        }
        request
    }

    /// One render frame: clear to the background color, then draw entities
    /// in ascending render-priority order.
    fn draw(&self, surface: &mut Surface<'_>) {
        surface.fill(self.background());
        self.entities().draw(surface);
    }
}

/// Owns the active scene, the update-tick counter and key routing. Scene
/// swaps are synchronous and strict: the old scene is unloaded before the
/// new one is initialized, and re-activating the active scene is an error.
pub struct View {
    active: Option<Box<dyn Scene>>,
    frame_index: u64,
}

/// Whether the loop should keep running after a view operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewFlow {
    Continue,
    Quit,
}

impl View {
    pub fn new(initial: Box<dyn Scene>) -> Self {
        let mut view = Self {
            active: None,
            frame_index: 0,
        };
        view.activate(initial);
        view
    }

    pub fn active_scene_name(&self) -> Option<&'static str> {
        self.active.as_ref().map(|scene| scene.name())
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Swaps the active scene: rejects the currently active instance, then
    /// unloads the old scene before the new one is initialized so no two
    /// scenes are ever loaded simultaneously.
    pub fn set_scene(&mut self, next: Box<dyn Scene>) -> Result<(), SceneSwapError> {
        if let Some(active) = &self.active {
            if active.id() == next.id() {
                return Err(SceneSwapError::DuplicateScene {
                    name: active.name(),
                });
            }
        }
        self.unload_active();
        self.activate(next);
        Ok(())
    }

    /// Routes one key press to the active scene, honoring its listener set.
    pub fn handle_key(&mut self, key: Key) -> Result<ViewFlow, SceneSwapError> {
        let Some(active) = self.active.as_mut() else {
            return Ok(ViewFlow::Continue);
        };
        if !active.key_listeners().contains(key) {
            return Ok(ViewFlow::Continue);
        }
        let request = active.on_key_press(key);
        self.apply(request)
    }

    /// Runs one update tick on the active scene.
    pub fn tick(&mut self) -> Result<ViewFlow, SceneSwapError> {
        let frame_index = self.frame_index;
        self.frame_index = self.frame_index.wrapping_add(1);
        let Some(active) = self.active.as_mut() else {
            return Ok(ViewFlow::Continue);
        };
        let request = active.advance(frame_index);
        self.apply(request)
    }

    pub fn render(&self, surface: &mut Surface<'_>) {
        if let Some(active) = &self.active {
            active.draw(surface);
        }
    }

    /// Unloads the active scene; safe to call once at loop shutdown.
    pub fn shutdown(&mut self) {
        self.unload_active();
    }

    fn apply(&mut self, request: SceneRequest) -> Result<ViewFlow, SceneSwapError> {
        match request {
            SceneRequest::None => Ok(ViewFlow::Continue),
            SceneRequest::Switch(next) => {
                self.set_scene(next)?;
                Ok(ViewFlow::Continue)
            }
            SceneRequest::Quit => Ok(ViewFlow::Quit),
        }
    }

    fn activate(&mut self, mut scene: Box<dyn Scene>) {
        scene.on_init();
        info!(
            scene = scene.name(),
            entity_count = scene.entities().len(),
            "scene_loaded"
        );
        self.active = Some(scene);
    }

    fn unload_active(&mut self) {
        if let Some(mut old) = self.active.take() {
            old.on_dispose();
            old.entities_mut().unload_all();
            info!(scene = old.name(), "scene_unloaded");
        }
    }
}
