use engine::EntityId;

/// What a focused button does when ENTER lands on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    StartGame,
    OpenOptions,
    OpenKeyEntry,
    BackToMain,
    Quit,
}

/// Which persisted setting a scrollable selector edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Resolution,
    TimerPreset,
    Nsfl,
}

/// The one scrollable-selector shape, parameterized by its named options;
/// every selector variant (resolutions, timer presets, toggles) is an
/// instance of this.
#[derive(Debug, Clone)]
pub struct SelectorState {
    pub options: Vec<String>,
    pub selected: usize,
    pub setting: SettingKind,
}

impl SelectorState {
    pub fn new(options: Vec<String>, selected: usize, setting: SettingKind) -> Self {
        let selected = if options.is_empty() {
            0
        } else {
            selected.min(options.len() - 1)
        };
        Self {
            options,
            selected,
            setting,
        }
    }

    /// Cycles the internal option index with wraparound; focus stays put.
    pub fn cycle(&mut self, step: isize) {
        if self.options.is_empty() {
            return;
        }
        let count = self.options.len() as isize;
        let next = (self.selected as isize + step).rem_euclid(count);
        self.selected = next as usize;
    }

    pub fn current(&self) -> &str {
        self.options
            .get(self.selected)
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[derive(Debug, Clone)]
pub enum ComponentKind {
    /// Display-only, never focusable.
    Banner,
    Button(MenuAction),
    Selector(SelectorState),
}

#[derive(Debug, Clone)]
pub struct MenuComponent {
    pub label: String,
    pub kind: ComponentKind,
    pub entity: Option<EntityId>,
}

impl MenuComponent {
    pub fn banner(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: ComponentKind::Banner,
            entity: None,
        }
    }

    pub fn button(label: impl Into<String>, action: MenuAction) -> Self {
        Self {
            label: label.into(),
            kind: ComponentKind::Button(action),
            entity: None,
        }
    }

    pub fn selector(
        label: impl Into<String>,
        options: Vec<String>,
        selected: usize,
        setting: SettingKind,
    ) -> Self {
        Self {
            label: label.into(),
            kind: ComponentKind::Selector(SelectorState::new(options, selected, setting)),
            entity: None,
        }
    }

    pub fn focusable(&self) -> bool {
        !matches!(self.kind, ComponentKind::Banner)
    }
}

/// First focusable component, if any; a menu without one cannot initialize.
pub fn first_focusable(components: &[MenuComponent]) -> Option<usize> {
    components.iter().position(MenuComponent::focusable)
}

/// Moves focus by `step` (+1 down, -1 up), wrapping at both ends and
/// skipping unfocusable components transparently. Requires at least one
/// focusable component.
pub fn step_focus(components: &[MenuComponent], current: usize, step: isize) -> usize {
    let count = components.len() as isize;
    if count == 0 {
        return current;
    }
    let mut index = current as isize;
    for _ in 0..count {
        index = (index + step).rem_euclid(count);
        if components[index as usize].focusable() {
            return index as usize;
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<MenuComponent> {
        vec![
            MenuComponent::button("PLAY", MenuAction::StartGame),
            MenuComponent::banner("GALLOWS"),
            MenuComponent::button("QUIT", MenuAction::Quit),
        ]
    }

    #[test]
    fn focus_skips_unfocusable_and_wraps() {
        let components = sample();
        assert_eq!(first_focusable(&components), Some(0));
        assert_eq!(step_focus(&components, 0, 1), 2);
        assert_eq!(step_focus(&components, 2, 1), 0);
        assert_eq!(step_focus(&components, 0, -1), 2);
    }

    #[test]
    fn banner_only_menu_has_no_focus_target() {
        let components = vec![MenuComponent::banner("TITLE")];
        assert_eq!(first_focusable(&components), None);
    }

    #[test]
    fn selector_cycles_with_wraparound_in_both_directions() {
        let mut selector = SelectorState::new(
            vec!["OFF".into(), "30S".into(), "60S".into()],
            0,
            SettingKind::TimerPreset,
        );
        selector.cycle(1);
        assert_eq!(selector.current(), "30S");
        selector.cycle(-2);
        assert_eq!(selector.current(), "60S");
        selector.cycle(1);
        assert_eq!(selector.current(), "OFF");
    }

    #[test]
    fn selector_clamps_out_of_range_initial_selection() {
        let selector = SelectorState::new(vec!["A".into(), "B".into()], 9, SettingKind::Nsfl);
        assert_eq!(selector.selected, 1);
    }
}
