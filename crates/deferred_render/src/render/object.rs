//! Render objects and their lifecycle
//!
//! # Architecture
//!
//! Render objects live in a [`RenderObjects`] arena owned by the render
//! world and are addressed by [`RenderObjectHandle`]. Game code holds only
//! handles. Deleting an object marks it; the world physically removes marked
//! objects once per frame, after which the handle no longer resolves.
//!
//! ## Lifecycle
//!
//! ```text
//! Active <-> Disabled      enable / disable, any number of times
//! Active | Disabled -> PendingDelete
//! PendingDelete -> (reaped, handle invalid)
//! ```
//!
//! Every mutation except reaping is ignored once an object is pending
//! delete.

use slotmap::SlotMap;

use crate::foundation::math::{Quat, Vec3, Vec4};

slotmap::new_key_type! {
    /// Stable handle to a render object
    pub struct RenderObjectHandle;
}

/// Kind of drawable, selecting the draw handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderObjectType {
    /// Mesh instance
    Model,
    /// Text block
    Text,
    /// Particle emitter
    Particle,
}

/// Opaque reference to the resource a render object draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ResourceId(pub u64);

/// Weak back-reference to the game entity that owns a render object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

/// Per-object colour slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorType {
    /// Base colour
    Diffuse,
    /// Self-illumination
    Emissive,
    /// Highlight colour
    Specular,
}

impl ColorType {
    /// Number of colour slots
    pub const COUNT: usize = 3;

    const fn index(self) -> usize {
        match self {
            Self::Diffuse => 0,
            Self::Emissive => 1,
            Self::Specular => 2,
        }
    }
}

/// Lifecycle state of a live render object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectState {
    /// Drawable
    Active,
    /// Distributed to passes but not drawn
    Disabled,
    /// Awaiting removal at the next reap
    PendingDelete,
}

/// Creation parameters for a render object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderObjectDesc {
    /// Draw handler selector
    pub object_type: RenderObjectType,
    /// Resource drawn
    pub data: ResourceId,
    /// Owning game entity, if any
    pub owner: Option<EntityId>,
    /// Tag bits matched against pass and draw predicates
    pub mask: u64,
    /// Initial colours indexed by [`ColorType`]
    pub colors: [Vec4; ColorType::COUNT],
}

impl RenderObjectDesc {
    /// Description with white diffuse and black emissive/specular colours
    pub fn new(object_type: RenderObjectType, data: ResourceId, mask: u64) -> Self {
        Self {
            object_type,
            data,
            owner: None,
            mask,
            colors: [Vec4::new(1.0, 1.0, 1.0, 1.0), Vec4::zeros(), Vec4::zeros()],
        }
    }

    /// Attach an owning entity
    #[must_use]
    pub fn with_owner(mut self, owner: EntityId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Override one initial colour
    #[must_use]
    pub fn with_color(mut self, color_type: ColorType, color: Vec4) -> Self {
        self.colors[color_type.index()] = color;
        self
    }
}

/// One drawable instance
#[derive(Debug, Clone, PartialEq)]
pub struct RenderObject {
    object_type: RenderObjectType,
    data: ResourceId,
    owner: Option<EntityId>,
    mask: u64,
    state: ObjectState,
    colors: [Vec4; ColorType::COUNT],
    position: Vec3,
    rotation: Quat,
}

impl RenderObject {
    /// Create an active object from its description
    pub fn new(desc: RenderObjectDesc) -> Self {
        Self {
            object_type: desc.object_type,
            data: desc.data,
            owner: desc.owner,
            mask: desc.mask,
            state: ObjectState::Active,
            colors: desc.colors,
            position: Vec3::zeros(),
            rotation: Quat::identity(),
        }
    }

    /// Draw handler selector
    pub const fn object_type(&self) -> RenderObjectType {
        self.object_type
    }

    /// Resource drawn
    pub const fn data(&self) -> ResourceId {
        self.data
    }

    /// Owning entity
    pub const fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    /// Tag mask
    pub const fn mask(&self) -> u64 {
        self.mask
    }

    /// Current lifecycle state
    pub const fn state(&self) -> ObjectState {
        self.state
    }

    /// Whether the object is [`ObjectState::Active`]
    pub fn is_enabled(&self) -> bool {
        self.state == ObjectState::Active
    }

    /// Whether deletion has been requested
    pub fn is_marked_for_delete(&self) -> bool {
        self.state == ObjectState::PendingDelete
    }

    /// Whether a draw call may be issued for the object
    pub fn is_drawable(&self) -> bool {
        self.is_enabled()
    }

    /// Colour in a slot
    pub const fn color(&self, color_type: ColorType) -> Vec4 {
        self.colors[color_type.index()]
    }

    /// World position, refreshed on distribution
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// World rotation, refreshed on distribution
    pub const fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Re-enable; returns `false` if the object is pending delete.
    pub fn enable(&mut self) -> bool {
        self.set_state(ObjectState::Active)
    }

    /// Disable; returns `false` if the object is pending delete.
    pub fn disable(&mut self) -> bool {
        self.set_state(ObjectState::Disabled)
    }

    /// Request deletion. Idempotent.
    pub fn mark_for_delete(&mut self) {
        self.state = ObjectState::PendingDelete;
    }

    /// Set a colour slot; ignored once pending delete
    pub fn set_color(&mut self, color_type: ColorType, color: Vec4) -> bool {
        if self.is_marked_for_delete() {
            return false;
        }
        self.colors[color_type.index()] = color;
        true
    }

    /// Replace the resource drawn; ignored once pending delete
    pub fn set_data(&mut self, data: ResourceId) -> bool {
        if self.is_marked_for_delete() {
            return false;
        }
        self.data = data;
        true
    }

    /// Replace the owning entity; ignored once pending delete
    pub fn set_owner(&mut self, owner: Option<EntityId>) -> bool {
        if self.is_marked_for_delete() {
            return false;
        }
        self.owner = owner;
        true
    }

    pub(crate) fn set_transform(&mut self, position: Vec3, rotation: Quat) {
        self.position = position;
        self.rotation = rotation;
    }

    fn set_state(&mut self, state: ObjectState) -> bool {
        if self.is_marked_for_delete() {
            return false;
        }
        self.state = state;
        true
    }
}

/// Arena of render objects that keeps creation order
#[derive(Debug, Clone, Default)]
pub struct RenderObjects {
    arena: SlotMap<RenderObjectHandle, RenderObject>,
    order: Vec<RenderObjectHandle>,
}

impl RenderObjects {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty arena with room for `capacity` objects
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotMap::with_capacity_and_key(capacity),
            order: Vec::with_capacity(capacity),
        }
    }

    /// Add an object at the end of the order
    pub fn insert(&mut self, object: RenderObject) -> RenderObjectHandle {
        let handle = self.arena.insert(object);
        self.order.push(handle);
        handle
    }

    /// Look up a live object
    pub fn get(&self, handle: RenderObjectHandle) -> Option<&RenderObject> {
        self.arena.get(handle)
    }

    /// Look up a live object mutably
    pub fn get_mut(&mut self, handle: RenderObjectHandle) -> Option<&mut RenderObject> {
        self.arena.get_mut(handle)
    }

    /// Whether a handle still resolves
    pub fn contains(&self, handle: RenderObjectHandle) -> bool {
        self.arena.contains_key(handle)
    }

    /// Enable an object; `false` for stale handles and pending deletes
    pub fn enable(&mut self, handle: RenderObjectHandle) -> bool {
        self.arena.get_mut(handle).is_some_and(RenderObject::enable)
    }

    /// Disable an object; `false` for stale handles and pending deletes
    pub fn disable(&mut self, handle: RenderObjectHandle) -> bool {
        self.arena.get_mut(handle).is_some_and(RenderObject::disable)
    }

    /// Request deletion; `false` for stale handles
    pub fn mark_for_delete(&mut self, handle: RenderObjectHandle) -> bool {
        self.arena.get_mut(handle).map_or(false, |object| {
            object.mark_for_delete();
            true
        })
    }

    /// Remove every object pending delete, keeping survivors in order.
    ///
    /// Returns the number removed.
    pub fn reap(&mut self) -> usize {
        let arena = &mut self.arena;
        let before = self.order.len();
        self.order.retain(|handle| {
            match arena.get(*handle).map(RenderObject::is_marked_for_delete) {
                Some(true) => {
                    arena.remove(*handle);
                    false
                }
                Some(false) => true,
                None => false,
            }
        });
        before - self.order.len()
    }

    /// Handles in creation order
    pub fn handles(&self) -> &[RenderObjectHandle] {
        &self.order
    }

    /// Objects in creation order
    pub fn iter(&self) -> impl Iterator<Item = (RenderObjectHandle, &RenderObject)> + '_ {
        self.order
            .iter()
            .filter_map(|handle| self.arena.get(*handle).map(|object| (*handle, object)))
    }

    /// Number of objects, including those pending delete
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the arena is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(mask: u64) -> RenderObject {
        RenderObject::new(RenderObjectDesc::new(
            RenderObjectType::Model,
            ResourceId(1),
            mask,
        ))
    }

    #[test]
    fn test_enable_disable_is_idempotent_and_reversible() {
        let mut object = model(1);
        for _ in 0..3 {
            assert!(object.disable());
            assert!(object.disable());
            assert_eq!(object.state(), ObjectState::Disabled);
            assert!(!object.is_drawable());
            assert!(object.enable());
            assert!(object.enable());
            assert!(object.is_drawable());
        }
    }

    #[test]
    fn test_mutations_ignored_after_delete() {
        let mut object = model(1);
        object.mark_for_delete();
        object.mark_for_delete();

        assert!(!object.enable());
        assert!(!object.disable());
        assert!(!object.set_color(ColorType::Diffuse, Vec4::zeros()));
        assert!(!object.set_data(ResourceId(9)));
        assert_eq!(object.state(), ObjectState::PendingDelete);
        assert_eq!(object.data(), ResourceId(1));
        assert_eq!(object.color(ColorType::Diffuse), Vec4::new(1.0, 1.0, 1.0, 1.0));
    }

    #[test]
    fn test_desc_colors() {
        let desc = RenderObjectDesc::new(RenderObjectType::Text, ResourceId(2), 0)
            .with_owner(EntityId(5))
            .with_color(ColorType::Emissive, Vec4::new(0.2, 0.2, 0.2, 1.0));
        let object = RenderObject::new(desc);

        assert_eq!(object.owner(), Some(EntityId(5)));
        assert_eq!(object.color(ColorType::Emissive), Vec4::new(0.2, 0.2, 0.2, 1.0));
        assert_eq!(object.color(ColorType::Specular), Vec4::zeros());
    }

    #[test]
    fn test_reap_preserves_order_and_invalidates_handles() {
        let mut objects = RenderObjects::new();
        let handles: Vec<_> = (0..5).map(|i| objects.insert(model(i))).collect();

        assert!(objects.mark_for_delete(handles[1]));
        assert!(objects.mark_for_delete(handles[3]));
        assert_eq!(objects.reap(), 2);

        assert_eq!(objects.handles(), &[handles[0], handles[2], handles[4]]);
        assert!(!objects.contains(handles[1]));
        assert!(!objects.enable(handles[1]));
        assert!(!objects.mark_for_delete(handles[3]));
        assert_eq!(objects.reap(), 0);
    }
}
