//! Key bindings, virtual axes and named actions.
//!
//! A key can carry any number of bindings. Each binding may move a virtual
//! axis (by `direction` on down, back again on up) and may fire a named
//! action on the down edge. Auto-repeat is absorbed here: a second `Down`
//! for a key that is already down does nothing.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::api::types::ListenerId;
use crate::core::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyEdge {
    Down,
    Up,
}

impl KeyEdge {
    /// +1 for down, −1 for up.
    fn polarity(self) -> i32 {
        match self {
            KeyEdge::Down => 1,
            KeyEdge::Up => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Whether the engine consumed a key event. `Handled` tells the host to
/// suppress the browser's default behaviour (scrolling on arrow keys, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResponse {
    Handled,
    Ignored,
}

impl InputResponse {
    pub fn is_handled(self) -> bool {
        self == InputResponse::Handled
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisBinding {
    pub axis: String,
    /// Usually −1 or +1.
    pub direction: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyBinding {
    #[serde(default)]
    pub axis: Option<AxisBinding>,
    #[serde(default)]
    pub action: Option<String>,
}

impl KeyBinding {
    pub fn axis(axis: impl Into<String>, direction: i32) -> Self {
        Self {
            axis: Some(AxisBinding {
                axis: axis.into(),
                direction,
            }),
            action: None,
        }
    }

    pub fn action(action: impl Into<String>) -> Self {
        Self {
            axis: None,
            action: Some(action.into()),
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

pub type ActionListener = Rc<RefCell<dyn FnMut(&mut Scene)>>;

/// Result of feeding one key edge through the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOutcome {
    pub response: InputResponse,
    /// Actions to dispatch, in binding order.
    pub actions: Vec<String>,
}

#[derive(Default)]
pub struct InputMap {
    bindings: HashMap<String, Vec<KeyBinding>>,
    key_states: HashMap<String, KeyEdge>,
    axes: HashMap<String, i32>,
    listeners: HashMap<String, Vec<(ListenerId, ActionListener)>>,
    next_listener: u32,
}

impl InputMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding to `key`. Binding the same thing twice is a no-op.
    pub fn bind(&mut self, key: impl Into<String>, binding: KeyBinding) {
        let list = self.bindings.entry(key.into()).or_default();
        if !list.contains(&binding) {
            list.push(binding);
        }
    }

    /// Remove every binding on `key`. If the key is held, its axis
    /// contributions are withdrawn first so no axis is left stuck.
    pub fn unbind_key(&mut self, key: &str) -> Vec<KeyBinding> {
        if self.is_down(key) {
            self.release_key(key);
        }
        self.key_states.remove(key);
        self.bindings.remove(key).unwrap_or_default()
    }

    /// Two keys driving one axis in opposite directions, optionally firing
    /// `action` when either goes down.
    pub fn add_virtual_axis(&mut self, negative: &str, positive: &str, axis: &str, action: Option<&str>) {
        for (key, direction) in [(negative, -1), (positive, 1)] {
            let mut binding = KeyBinding::axis(axis, direction);
            if let Some(action) = action {
                binding = binding.with_action(action);
            }
            self.bind(key, binding);
        }
    }

    /// Remove every binding that drives `axis`, leaving other bindings on
    /// the same keys alone. The axis reads 0 afterwards even if its keys are
    /// held, and a key left with no bindings is forgotten. Returns how many
    /// bindings were removed.
    pub fn remove_axis(&mut self, axis: &str) -> usize {
        let mut removed = 0;
        let mut emptied = Vec::new();
        for (key, list) in self.bindings.iter_mut() {
            let before = list.len();
            list.retain(|binding| binding.axis.as_ref().is_none_or(|bound| bound.axis != axis));
            removed += before - list.len();
            if list.is_empty() {
                emptied.push(key.clone());
            }
        }
        for key in emptied {
            self.bindings.remove(&key);
            self.key_states.remove(&key);
        }
        if removed > 0 {
            self.axes.remove(axis);
            log::debug!("removed {removed} bindings for axis {axis:?}");
        }
        removed
    }

    pub fn bindings(&self, key: &str) -> &[KeyBinding] {
        self.bindings.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_bound(&self, key: &str) -> bool {
        self.bindings.get(key).is_some_and(|b| !b.is_empty())
    }

    pub fn is_down(&self, key: &str) -> bool {
        self.key_states.get(key) == Some(&KeyEdge::Down)
    }

    /// Current value of a virtual axis; 0 for unknown axes.
    pub fn axis_value(&self, axis: &str) -> f32 {
        self.axes.get(axis).copied().unwrap_or(0) as f32
    }

    /// Feed one key edge. Unbound keys are ignored and leave no state.
    pub fn apply(&mut self, key: &str, edge: KeyEdge) -> KeyOutcome {
        let Some(bindings) = self.bindings.get(key) else {
            return KeyOutcome {
                response: InputResponse::Ignored,
                actions: Vec::new(),
            };
        };

        let previous = self.key_states.get(key).copied().unwrap_or(KeyEdge::Up);
        if previous == edge {
            return KeyOutcome {
                response: InputResponse::Handled,
                actions: Vec::new(),
            };
        }

        let mut actions = Vec::new();
        for binding in bindings {
            if let Some(axis) = &binding.axis {
                *self.axes.entry(axis.axis.clone()).or_insert(0) += axis.direction * edge.polarity();
            }
            if edge == KeyEdge::Down {
                if let Some(action) = &binding.action {
                    actions.push(action.clone());
                }
            }
        }
        self.key_states.insert(key.to_owned(), edge);
        log::trace!("key {key:?} {edge:?} -> actions {actions:?}");

        KeyOutcome {
            response: InputResponse::Handled,
            actions,
        }
    }

    fn release_key(&mut self, key: &str) {
        let _ = self.apply(key, KeyEdge::Up);
    }

    /// Release every held key, e.g. when the window loses focus and the
    /// matching key-up events will never arrive. Fires no actions.
    pub fn release_all(&mut self) {
        let held: Vec<String> = self
            .key_states
            .iter()
            .filter(|(_, edge)| **edge == KeyEdge::Down)
            .map(|(key, _)| key.clone())
            .collect();
        for key in held {
            self.release_key(&key);
        }
    }

    pub fn add_listener(&mut self, action: impl Into<String>, listener: impl FnMut(&mut Scene) + 'static) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        let listener: ActionListener = Rc::new(RefCell::new(listener));
        self.listeners.entry(action.into()).or_default().push((id, listener));
        id
    }

    /// Returns `false` if no listener had this id.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let mut removed = false;
        for list in self.listeners.values_mut() {
            let before = list.len();
            list.retain(|(lid, _)| *lid != id);
            removed |= list.len() != before;
        }
        self.listeners.retain(|_, list| !list.is_empty());
        removed
    }

    /// Snapshot of the listeners registered for `action`, in registration
    /// order. Dispatch iterates the snapshot so listeners may add or remove
    /// listeners while running.
    pub fn listeners(&self, action: &str) -> Vec<ActionListener> {
        self.listeners
            .get(action)
            .map(|list| list.iter().map(|(_, l)| Rc::clone(l)).collect())
            .unwrap_or_default()
    }

    pub fn listener_count(&self, action: &str) -> usize {
        self.listeners.get(action).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wasd() -> InputMap {
        let mut map = InputMap::new();
        map.add_virtual_axis("a", "d", "MoveX", None);
        map.add_virtual_axis("w", "s", "MoveY", None);
        map
    }

    #[test]
    fn removing_an_axis_keeps_other_bindings_on_its_keys() {
        let mut map = wasd();
        map.add_virtual_axis("a", "d", "PanX", None);
        map.apply("d", KeyEdge::Down);
        assert_eq!(map.axis_value("PanX"), 1.0);

        assert_eq!(map.remove_axis("PanX"), 2);
        assert_eq!(map.axis_value("PanX"), 0.0);
        assert_eq!(map.axis_value("MoveX"), 1.0);
        assert_eq!(map.bindings("d"), &[KeyBinding::axis("MoveX", 1)]);

        // Still held for MoveX; releasing it only touches MoveX.
        map.apply("d", KeyEdge::Up);
        assert_eq!(map.axis_value("MoveX"), 0.0);
        assert_eq!(map.axis_value("PanX"), 0.0);
        assert_eq!(map.remove_axis("PanX"), 0);
    }

    #[test]
    fn removing_the_only_axis_on_a_key_unbinds_it() {
        let mut map = wasd();
        map.apply("w", KeyEdge::Down);
        assert_eq!(map.remove_axis("MoveY"), 2);
        assert!(!map.is_bound("w"));
        assert!(!map.is_down("w"));
        assert_eq!(map.axis_value("MoveY"), 0.0);
        assert_eq!(map.apply("w", KeyEdge::Up).response, InputResponse::Ignored);
        assert!(map.is_bound("a"));
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut map = wasd();
        map.apply("a", KeyEdge::Down);
        assert_eq!(map.axis_value("MoveX"), -1.0);
        map.apply("d", KeyEdge::Down);
        assert_eq!(map.axis_value("MoveX"), 0.0);
        map.apply("a", KeyEdge::Up);
        assert_eq!(map.axis_value("MoveX"), 1.0);
    }

    #[test]
    fn auto_repeat_is_ignored() {
        let mut map = wasd();
        for _ in 0..5 {
            map.apply("w", KeyEdge::Down);
        }
        assert_eq!(map.axis_value("MoveY"), -1.0);
        map.apply("w", KeyEdge::Up);
        map.apply("w", KeyEdge::Up);
        assert_eq!(map.axis_value("MoveY"), 0.0);
    }

    #[test]
    fn up_without_down_is_ignored() {
        let mut map = wasd();
        map.apply("s", KeyEdge::Up);
        assert_eq!(map.axis_value("MoveY"), 0.0);
    }

    #[test]
    fn unbound_keys_are_not_handled() {
        let mut map = wasd();
        let outcome = map.apply("q", KeyEdge::Down);
        assert_eq!(outcome.response, InputResponse::Ignored);
        assert!(!map.is_down("q"));
    }

    #[test]
    fn actions_fire_on_down_edge_only() {
        let mut map = InputMap::new();
        map.add_virtual_axis("ArrowLeft", "ArrowRight", "AimX", Some("Shoot"));
        let down = map.apply("ArrowLeft", KeyEdge::Down);
        assert_eq!(down.actions, vec!["Shoot".to_string()]);
        assert!(map.apply("ArrowLeft", KeyEdge::Down).actions.is_empty());
        assert!(map.apply("ArrowLeft", KeyEdge::Up).actions.is_empty());
    }

    #[test]
    fn duplicate_bindings_collapse() {
        let mut map = wasd();
        map.add_virtual_axis("a", "d", "MoveX", None);
        assert_eq!(map.bindings("a").len(), 1);
        map.apply("d", KeyEdge::Down);
        assert_eq!(map.axis_value("MoveX"), 1.0);
    }

    #[test]
    fn unbinding_a_held_key_releases_its_axis() {
        let mut map = wasd();
        map.apply("d", KeyEdge::Down);
        let removed = map.unbind_key("d");
        assert_eq!(removed.len(), 1);
        assert_eq!(map.axis_value("MoveX"), 0.0);
        assert!(!map.is_bound("d"));
    }

    #[test]
    fn release_all_zeroes_axes() {
        let mut map = wasd();
        map.apply("a", KeyEdge::Down);
        map.apply("s", KeyEdge::Down);
        map.release_all();
        assert_eq!(map.axis_value("MoveX"), 0.0);
        assert_eq!(map.axis_value("MoveY"), 0.0);
    }

    #[test]
    fn listeners_can_be_removed_by_id() {
        let mut map = InputMap::new();
        let a = map.add_listener("Shoot", |_| {});
        let b = map.add_listener("Shoot", |_| {});
        assert_ne!(a, b);
        assert!(map.remove_listener(a));
        assert!(!map.remove_listener(a));
        assert_eq!(map.listener_count("Shoot"), 1);
    }

    #[test]
    fn bindings_deserialize_from_json() {
        let binding: KeyBinding =
            serde_json::from_str(r#"{"axis":{"axis":"MoveX","direction":-1},"action":"Dash"}"#).unwrap();
        assert_eq!(binding, KeyBinding::axis("MoveX", -1).with_action("Dash"));
    }
}
