use std::any::Any;

use thiserror::Error;

use crate::raster::Surface;

/// Paint-order constants. Lower draws first, so lower values sit visually
/// behind higher ones; ties are broken by insertion order.
pub mod render_priority {
    pub const MIN: i8 = i8::MIN;
    pub const LOW: i8 = -64;
    pub const NORMAL: i8 = 0;
    pub const HIGH: i8 = 64;
    pub const MAX: i8 = i8::MAX;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

/// Opaque completion marker emitted from `Renderable::tick` and routed to
/// the owning scene after the tick pass. Value meanings are defined by the
/// game (fade finished, timer expired, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal(pub u16);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("entity is already spawned")]
    AlreadySpawned,
    #[error("entity is not loaded")]
    NotLoaded,
    #[error("entity was already removed")]
    AlreadyRemoved,
}

/// Lifecycle flags: `Unspawned -> Loaded(visible) -> {pending_removal} ->
/// Removed (terminal)`. Spawn and remove are one-shot; re-entry is a
/// rejected operation, never silently absorbed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lifecycle {
    loaded: bool,
    visible: bool,
    removed: bool,
    pending_removal: bool,
}

impl Lifecycle {
    pub(crate) fn ensure_spawnable(&self) -> Result<(), LifecycleError> {
        if self.removed {
            Err(LifecycleError::AlreadyRemoved)
        } else if self.loaded {
            Err(LifecycleError::AlreadySpawned)
        } else {
            Ok(())
        }
    }

    pub(crate) fn mark_loaded(&mut self) {
        self.loaded = true;
        self.visible = true;
    }

    pub(crate) fn ensure_removable(&self) -> Result<(), LifecycleError> {
        if self.removed {
            Err(LifecycleError::AlreadyRemoved)
        } else if !self.loaded {
            Err(LifecycleError::NotLoaded)
        } else {
            Ok(())
        }
    }

    pub(crate) fn mark_removed(&mut self) {
        self.removed = true;
        self.visible = false;
    }

    /// Idempotent; honored by the owning scene's next tick sweep.
    pub fn flag_pending_removal(&mut self) {
        self.pending_removal = true;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn is_pending_removal(&self) -> bool {
        self.pending_removal
    }

    pub fn should_draw(&self) -> bool {
        self.visible && self.loaded && !self.removed
    }

    pub fn should_remove(&self) -> bool {
        self.loaded && self.pending_removal && !self.removed
    }
}

/// The state every entity variant shares: lifecycle flags, a top-left
/// anchored location and a signed paint priority.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityBase {
    lifecycle: Lifecycle,
    location: Point,
    render_priority: i8,
}

impl EntityBase {
    pub fn new(location: Point, render_priority: i8) -> Self {
        Self {
            lifecycle: Lifecycle::default(),
            location,
            render_priority,
        }
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }

    pub fn location(&self) -> Point {
        self.location
    }

    pub fn set_location(&mut self, location: Point) {
        self.location = location;
    }

    pub fn render_priority(&self) -> i8 {
        self.render_priority
    }

    pub fn set_render_priority(&mut self, priority: i8) {
        self.render_priority = priority;
    }
}

/// The capability set shared by every visual/interactive unit a scene owns.
/// Variants implement the hooks; the lifecycle choreography lives in the
/// provided methods and is not meant to be overridden.
pub trait Renderable: Any {
    fn base(&self) -> &EntityBase;
    fn base_mut(&mut self) -> &mut EntityBase;

    /// Builds initial visuals/bounds. Runs inside `spawn`, before the
    /// entity is marked loaded.
    fn on_spawn(&mut self) {}

    /// Releases visuals. Runs inside `remove`, before the terminal mark.
    fn on_remove(&mut self) {}

    /// Advances time-based internal state; may emit a completion signal.
    fn tick(&mut self, _frame_index: u64) -> Option<Signal> {
        None
    }

    fn draw(&self, surface: &mut Surface<'_>);

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn spawn(&mut self) -> Result<(), LifecycleError> {
        self.base().lifecycle().ensure_spawnable()?;
        self.on_spawn();
        self.base_mut().lifecycle_mut().mark_loaded();
        Ok(())
    }

    fn remove(&mut self) -> Result<(), LifecycleError> {
        self.base().lifecycle().ensure_removable()?;
        self.on_remove();
        self.base_mut().lifecycle_mut().mark_removed();
        Ok(())
    }

    fn dispose(&mut self) {
        self.base_mut().lifecycle_mut().flag_pending_removal();
    }

    fn should_draw(&self) -> bool {
        self.base().lifecycle().should_draw()
    }

    fn should_remove(&self) -> bool {
        self.base().lifecycle().should_remove()
    }

    fn location(&self) -> Point {
        self.base().location()
    }

    fn render_priority(&self) -> i8 {
        self.base().render_priority()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe {
        base: EntityBase,
        spawn_calls: u32,
        remove_calls: u32,
    }

    impl Renderable for Probe {
        fn base(&self) -> &EntityBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut EntityBase {
            &mut self.base
        }

        fn on_spawn(&mut self) {
            self.spawn_calls += 1;
        }

        fn on_remove(&mut self) {
            self.remove_calls += 1;
        }

        fn draw(&self, _surface: &mut Surface<'_>) {}

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn spawn_after_spawn_is_rejected() {
        let mut probe = Probe::default();
        probe.spawn().expect("first spawn");
        assert_eq!(probe.spawn(), Err(LifecycleError::AlreadySpawned));
        assert_eq!(probe.spawn_calls, 1);
    }

    #[test]
    fn remove_before_spawn_is_rejected() {
        let mut probe = Probe::default();
        assert_eq!(probe.remove(), Err(LifecycleError::NotLoaded));
        assert_eq!(probe.remove_calls, 0);
    }

    #[test]
    fn remove_after_remove_is_rejected() {
        let mut probe = Probe::default();
        probe.spawn().expect("spawn");
        probe.remove().expect("first remove");
        assert_eq!(probe.remove(), Err(LifecycleError::AlreadyRemoved));
        assert_eq!(probe.remove_calls, 1);
    }

    #[test]
    fn spawn_after_remove_is_rejected() {
        let mut probe = Probe::default();
        probe.spawn().expect("spawn");
        probe.remove().expect("remove");
        assert_eq!(probe.spawn(), Err(LifecycleError::AlreadyRemoved));
    }

    #[test]
    fn dispose_is_idempotent_and_passive() {
        let mut probe = Probe::default();
        probe.spawn().expect("spawn");
        probe.dispose();
        probe.dispose();
        assert!(probe.should_remove());
        assert!(probe.base().lifecycle().is_loaded());
        assert_eq!(probe.remove_calls, 0);
    }

    #[test]
    fn should_draw_tracks_visibility_and_lifecycle() {
        let mut probe = Probe::default();
        assert!(!probe.should_draw());
        probe.spawn().expect("spawn");
        assert!(probe.should_draw());
        probe.base_mut().lifecycle_mut().set_visible(false);
        assert!(!probe.should_draw());
        probe.base_mut().lifecycle_mut().set_visible(true);
        probe.remove().expect("remove");
        assert!(!probe.should_draw());
    }

    #[test]
    fn disposed_entity_is_not_flagged_after_removal() {
        let mut probe = Probe::default();
        probe.spawn().expect("spawn");
        probe.dispose();
        probe.remove().expect("remove");
        assert!(!probe.should_remove());
    }
}
