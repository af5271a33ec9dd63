// core/transform.rs
//
// Transform hierarchy: position/rotation/uniform scale per node, parent links
// and child back-references. World matrices are computed on demand by walking
// up the parent chain; nothing is cached, so a moved parent is never stale.

use std::collections::HashMap;

use glam::{Affine2, Vec2};

use crate::api::types::TransformId;

/// Local transform of one node.
#[derive(Debug, Clone)]
pub struct Transform {
    /// Position relative to parent (or world if no parent).
    pub position: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    /// Uniform scale.
    pub scale: f32,
    parent: Option<TransformId>,
    children: Vec<TransformId>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: 1.0,
            parent: None,
            children: Vec::new(),
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn parent(&self) -> Option<TransformId> {
        self.parent
    }

    pub fn children(&self) -> &[TransformId] {
        &self.children
    }

    /// Unit vector pointing along the local rotation.
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.rotation)
    }

    /// translate · rotate · scale
    pub fn local_matrix(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(Vec2::splat(self.scale), self.rotation, self.position)
    }
}

/// Arena of transform nodes keyed by id.
#[derive(Debug, Default)]
pub struct Transforms {
    nodes: HashMap<TransformId, Transform>,
}

impl Transforms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: TransformId, transform: Transform) {
        self.nodes.insert(id, transform);
    }

    pub fn get(&self, id: TransformId) -> Option<&Transform> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: TransformId) -> Option<&mut Transform> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: TransformId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Record `child` in `parent`'s child set. Back-reference only: the
    /// child's own parent link and position are left untouched.
    pub fn add_child(&mut self, parent: TransformId, child: TransformId) {
        if let Some(node) = self.nodes.get_mut(&parent) {
            if !node.children.contains(&child) {
                node.children.push(child);
            }
        }
    }

    /// Drop `child` from `parent`'s child set. Back-reference only.
    pub fn remove_child(&mut self, parent: TransformId, child: TransformId) {
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.retain(|&c| c != child);
        }
    }

    /// Set the parent of a node. Pass `None` to make it a root.
    ///
    /// Only links change; the child's local position/rotation/scale keep
    /// their values and are reinterpreted relative to the new parent.
    /// Returns `false` (and changes nothing) when either node is missing or
    /// the link would create a cycle.
    pub fn set_parent(&mut self, child: TransformId, parent: Option<TransformId>) -> bool {
        if !self.nodes.contains_key(&child) {
            return false;
        }
        if let Some(p) = parent {
            if !self.nodes.contains_key(&p) || self.is_ancestor_or_self(child, p) {
                log::warn!("rejected parent link {:?} -> {:?}", child, p);
                return false;
            }
        }

        if let Some(old_parent) = self.nodes.get(&child).and_then(|n| n.parent) {
            self.remove_child(old_parent, child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = parent;
        }
        if let Some(p) = parent {
            self.add_child(p, child);
        }
        true
    }

    /// Whether `ancestor` is `node` or one of its parents.
    fn is_ancestor_or_self(&self, ancestor: TransformId, node: TransformId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    /// World matrix = parent world × local, computed recursively.
    pub fn world_matrix(&self, id: TransformId) -> Option<Affine2> {
        let node = self.nodes.get(&id)?;
        let local = node.local_matrix();
        match node.parent.and_then(|p| self.world_matrix(p)) {
            Some(parent_world) => Some(parent_world * local),
            None => Some(local),
        }
    }

    pub fn world_position(&self, id: TransformId) -> Option<Vec2> {
        self.world_matrix(id).map(|m| m.translation)
    }

    /// Remove a node. Detaches it from its parent and orphans its children;
    /// the children themselves survive.
    pub fn destroy(&mut self, id: TransformId) -> Option<Transform> {
        let node = self.nodes.remove(&id)?;
        if let Some(parent) = node.parent {
            self.remove_child(parent, id);
        }
        for child in &node.children {
            if let Some(child_node) = self.nodes.get_mut(child) {
                child_node.parent = None;
            }
        }
        Some(node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn root_world_matrix_is_local() {
        let mut t = Transforms::new();
        let id = TransformId(1);
        t.insert(id, Transform::new().with_position(Vec2::new(3.0, 4.0)).with_scale(2.0));
        let world = t.world_matrix(id).unwrap();
        assert_eq!(world, t.get(id).unwrap().local_matrix());
        assert!(close(world.transform_point2(Vec2::new(1.0, 0.0)), Vec2::new(5.0, 4.0)));
    }

    #[test]
    fn child_composes_with_parent() {
        let mut t = Transforms::new();
        let parent = TransformId(1);
        let child = TransformId(2);
        t.insert(parent, Transform::new().with_position(Vec2::new(100.0, 0.0)).with_rotation(FRAC_PI_2));
        t.insert(child, Transform::new().with_position(Vec2::new(10.0, 0.0)));
        assert!(t.set_parent(child, Some(parent)));

        let pos = t.world_position(child).unwrap();
        assert!(close(pos, Vec2::new(100.0, 10.0)), "got {pos:?}");
    }

    #[test]
    fn world_matrix_tracks_parent_moves() {
        let mut t = Transforms::new();
        let parent = TransformId(1);
        let child = TransformId(2);
        t.insert(parent, Transform::new());
        t.insert(child, Transform::new().with_position(Vec2::new(1.0, 1.0)));
        t.set_parent(child, Some(parent));

        t.get_mut(parent).unwrap().position = Vec2::new(50.0, 0.0);
        assert!(close(t.world_position(child).unwrap(), Vec2::new(51.0, 1.0)));
    }

    #[test]
    fn set_parent_keeps_child_position() {
        let mut t = Transforms::new();
        let parent = TransformId(1);
        let child = TransformId(2);
        t.insert(parent, Transform::new().with_position(Vec2::new(7.0, 7.0)));
        t.insert(child, Transform::new().with_position(Vec2::new(2.0, 3.0)));
        t.set_parent(child, Some(parent));
        assert_eq!(t.get(child).unwrap().position, Vec2::new(2.0, 3.0));
        assert_eq!(t.get(parent).unwrap().children(), &[child]);
    }

    #[test]
    fn cycles_are_rejected() {
        let mut t = Transforms::new();
        let a = TransformId(1);
        let b = TransformId(2);
        t.insert(a, Transform::new());
        t.insert(b, Transform::new());
        assert!(t.set_parent(b, Some(a)));
        assert!(!t.set_parent(a, Some(b)));
        assert!(!t.set_parent(a, Some(a)));
        assert_eq!(t.get(a).unwrap().parent(), None);
    }

    #[test]
    fn destroy_detaches_and_orphans() {
        let mut t = Transforms::new();
        let root = TransformId(1);
        let mid = TransformId(2);
        let leaf = TransformId(3);
        t.insert(root, Transform::new());
        t.insert(mid, Transform::new());
        t.insert(leaf, Transform::new());
        t.set_parent(mid, Some(root));
        t.set_parent(leaf, Some(mid));

        t.destroy(mid);

        assert!(t.get(root).unwrap().children().is_empty());
        assert_eq!(t.get(leaf).unwrap().parent(), None);
        assert!(t.contains(leaf));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn forward_follows_rotation() {
        let tr = Transform::new().with_rotation(FRAC_PI_2);
        assert!(close(tr.forward(), Vec2::new(0.0, 1.0)));
    }
}
