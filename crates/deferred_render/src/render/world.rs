//! Render world
//!
//! # Architecture
//!
//! The world owns every render object and every render pass. Once per frame
//! [`RenderWorld::update`] runs:
//!
//! 1. **Reap** - objects pending delete are removed; survivors keep order.
//! 2. **Distribute** - each pass's pending list is cleared and refilled with
//!    matching objects in world order, then swapped live.
//! 3. **Draw** - passes draw their live list in registration order.
//! 4. **Reset** - the list of objects created since the last frame is
//!    cleared.
//!
//! Because reaping precedes distribution, a deleted object can never reach a
//! live list; objects deleted while drawing are caught by the per-object
//! state check in [`draw_instances`].

use thiserror::Error;

use super::constants::NamedConstantBuffer;
use super::device::GraphicsDevice;
use super::dispatch::{draw_instances, DrawContext, DrawStats, ObjectRenderer};
use super::graphics::MaterialHandle;
use super::object::{
    ColorType, EntityId, RenderObject, RenderObjectDesc, RenderObjectHandle, RenderObjectType,
    RenderObjects, ResourceId,
};
use super::pass::{PassView, RenderPass, RenderPassDesc, RenderPassId};
use super::predicate::{matches, TagRegistry};
use crate::config::RenderConfig;
use crate::foundation::math::{Mat4, Quat, Vec3, Vec4};

/// Render world errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderWorldError {
    /// No room for another render object
    #[error("Render world is full ({max} instances)")]
    InstanceCapacity {
        /// Configured maximum
        max: usize,
    },

    /// No room for another render pass
    #[error("Render world has no room for more passes ({max})")]
    PassCapacity {
        /// Configured maximum
        max: usize,
    },

    /// Every mask bit has been assigned to a tag
    #[error("No free mask bits for a new tag ({max} in use)")]
    TagSpaceExhausted {
        /// Number of mask bits
        max: usize,
    },

    /// Handle does not refer to a live object
    #[error("Unknown render object: {0:?}")]
    UnknownObject(RenderObjectHandle),

    /// Pass id does not belong to this world
    #[error("Unknown render pass: {0:?}")]
    UnknownPass(RenderPassId),
}

/// Result type for render world operations
pub type WorldResult<T> = Result<T, RenderWorldError>;

/// Supplies world transforms for objects owned by game entities
pub trait TransformSource {
    /// Position and rotation of `owner`, or `None` to leave the object as is
    fn transform(&mut self, owner: EntityId) -> Option<(Vec3, Quat)>;
}

/// Counts from one [`RenderWorld::update`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Objects created since the previous update
    pub added: usize,
    /// Objects removed by the reap step
    pub reaped: usize,
    /// Pass entries written during distribution
    pub distributed: usize,
    /// Pass entries dropped because a pass was full
    pub overflowed: usize,
    /// Objects handed to draw handlers
    pub drawn: usize,
    /// Live-list entries skipped at draw time
    pub skipped: usize,
}

/// Owner of all render objects and passes
pub struct RenderWorld {
    objects: RenderObjects,
    passes: Vec<RenderPass>,
    tags: TagRegistry,
    staged: Vec<RenderObjectHandle>,
    scratch: Vec<RenderObjectHandle>,
    transform_source: Option<Box<dyn TransformSource>>,
    max_instances: usize,
    max_passes: usize,
    default_pass_capacity: usize,
    frame: u64,
}

impl RenderWorld {
    /// Create a world sized by `config`
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            objects: RenderObjects::with_capacity(config.max_instances),
            passes: Vec::with_capacity(config.max_render_passes),
            tags: TagRegistry::new(),
            staged: Vec::new(),
            scratch: Vec::new(),
            transform_source: None,
            max_instances: config.max_instances,
            max_passes: config.max_render_passes,
            default_pass_capacity: config.default_pass_capacity,
            frame: 0,
        }
    }

    /// Install the hook that positions owned objects during distribution
    pub fn set_transform_source(&mut self, source: Box<dyn TransformSource>) {
        self.transform_source = Some(source);
    }

    /// Tag-to-bit assignments
    pub const fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    /// Tag-to-bit assignments, for allocating object masks
    pub fn tags_mut(&mut self) -> &mut TagRegistry {
        &mut self.tags
    }

    /// Object arena
    pub const fn objects(&self) -> &RenderObjects {
        &self.objects
    }

    /// Number of updates run
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Create a render object
    pub fn new_render_object(&mut self, desc: RenderObjectDesc) -> WorldResult<RenderObjectHandle> {
        if self.objects.len() >= self.max_instances {
            return Err(RenderWorldError::InstanceCapacity {
                max: self.max_instances,
            });
        }
        let handle = self.objects.insert(RenderObject::new(desc));
        self.staged.push(handle);
        Ok(handle)
    }

    /// Create a render object whose mask is built from tag names
    pub fn new_tagged_render_object(
        &mut self,
        object_type: RenderObjectType,
        data: ResourceId,
        tags: &[&str],
    ) -> WorldResult<RenderObjectHandle> {
        let mask = self.tags.mask_for(tags.iter().copied())?;
        self.new_render_object(RenderObjectDesc::new(object_type, data, mask))
    }

    /// Look up an object
    pub fn object(&self, handle: RenderObjectHandle) -> Option<&RenderObject> {
        self.objects.get(handle)
    }

    /// Re-enable an object; no effect once it is pending delete
    pub fn enable_render_object(&mut self, handle: RenderObjectHandle) -> bool {
        self.objects.enable(handle)
    }

    /// Disable an object; no effect once it is pending delete
    pub fn disable_render_object(&mut self, handle: RenderObjectHandle) -> bool {
        self.objects.disable(handle)
    }

    /// Request deletion; the object is removed at the next update
    pub fn delete_render_object(&mut self, handle: RenderObjectHandle) -> WorldResult<()> {
        if self.objects.mark_for_delete(handle) {
            Ok(())
        } else {
            Err(RenderWorldError::UnknownObject(handle))
        }
    }

    /// Set a colour slot; no effect once the object is pending delete
    pub fn set_render_object_color(
        &mut self,
        handle: RenderObjectHandle,
        color_type: ColorType,
        color: Vec4,
    ) -> bool {
        self.objects
            .get_mut(handle)
            .is_some_and(|object| object.set_color(color_type, color))
    }

    /// Replace the resource an object draws
    pub fn set_render_object_data(&mut self, handle: RenderObjectHandle, data: ResourceId) -> bool {
        self.objects
            .get_mut(handle)
            .is_some_and(|object| object.set_data(data))
    }

    /// Replace an object's owning entity
    pub fn set_render_object_owner(
        &mut self,
        handle: RenderObjectHandle,
        owner: Option<EntityId>,
    ) -> bool {
        self.objects
            .get_mut(handle)
            .is_some_and(|object| object.set_owner(owner))
    }

    /// Register a pass; passes draw in registration order
    pub fn add_render_pass(&mut self, desc: RenderPassDesc) -> WorldResult<RenderPassId> {
        if self.passes.len() >= self.max_passes {
            return Err(RenderWorldError::PassCapacity {
                max: self.max_passes,
            });
        }
        log::debug!("Adding render pass '{}' ({:#b})", desc.name, desc.predicate_mask);
        self.passes
            .push(RenderPass::new(desc, self.default_pass_capacity));
        Ok(RenderPassId(self.passes.len() - 1))
    }

    /// Look up a pass
    pub fn pass(&self, id: RenderPassId) -> Option<&RenderPass> {
        self.passes.get(id.0)
    }

    /// Look up a pass mutably
    pub fn pass_mut(&mut self, id: RenderPassId) -> WorldResult<&mut RenderPass> {
        self.passes
            .get_mut(id.0)
            .ok_or(RenderWorldError::UnknownPass(id))
    }

    /// Passes in registration order
    pub fn passes(&self) -> impl Iterator<Item = &RenderPass> + '_ {
        self.passes.iter()
    }

    /// Set a pass's view matrix
    pub fn set_view_matrix(&mut self, id: RenderPassId, view: Mat4) -> WorldResult<()> {
        self.pass_mut(id)?.set_view_matrix(view);
        Ok(())
    }

    /// Set a pass's view-projection matrix
    pub fn set_view_projection_matrix(
        &mut self,
        id: RenderPassId,
        view_projection: Mat4,
    ) -> WorldResult<()> {
        self.pass_mut(id)?.set_view_projection_matrix(view_projection);
        Ok(())
    }

    /// Objects created since the last update
    pub fn staged(&self) -> &[RenderObjectHandle] {
        &self.staged
    }

    /// Run one frame: reap, distribute, draw every pass, reset staging.
    pub fn update(
        &mut self,
        dt: f32,
        device: &mut dyn GraphicsDevice,
        renderer: &mut dyn ObjectRenderer,
    ) -> FrameStats {
        let reaped = self.reap();
        let (distributed, overflowed) = self.distribute();
        let draw = self.draw_passes(device, renderer);

        let stats = FrameStats {
            added: self.staged.len(),
            reaped,
            distributed,
            overflowed,
            drawn: draw.drawn,
            skipped: draw.skipped,
        };
        self.staged.clear();
        self.frame += 1;

        log::debug!(
            "Render world frame {} (dt {:.4}): {:?}",
            self.frame,
            dt,
            stats
        );
        stats
    }

    /// Remove objects pending delete. Returns the number removed.
    pub fn reap(&mut self) -> usize {
        let reaped = self.objects.reap();
        if reaped > 0 {
            // Staged handles of reaped objects no longer resolve.
            let objects = &self.objects;
            self.staged.retain(|handle| objects.contains(*handle));
        }
        reaped
    }

    /// Refill every enabled pass from the object list and swap it live.
    ///
    /// Returns `(entries written, entries dropped for capacity)`.
    pub fn distribute(&mut self) -> (usize, usize) {
        for pass in self.passes.iter_mut().filter(|pass| pass.is_enabled()) {
            pass.begin_distribution();
        }

        let mut distributed = 0;
        for index in 0..self.objects.len() {
            let handle = self.objects.handles()[index];
            let Some(object) = self.objects.get(handle) else {
                continue;
            };
            if object.is_marked_for_delete() {
                continue;
            }
            let mask = object.mask();
            let owner = object.owner();

            let mut placed = false;
            for pass in self
                .passes
                .iter_mut()
                .filter(|pass| pass.is_enabled() && pass.accepts(mask))
            {
                if pass.add_instance(handle) {
                    distributed += 1;
                    placed = true;
                }
            }

            if placed {
                self.apply_transform(handle, owner);
            }
        }

        let mut overflowed = 0;
        for pass in self.passes.iter_mut().filter(|pass| pass.is_enabled()) {
            if pass.overflowed() > 0 {
                log::warn!(
                    "Render pass '{}' is full ({}); {} instance(s) not drawn",
                    pass.name(),
                    pass.capacity(),
                    pass.overflowed()
                );
                overflowed += pass.overflowed();
            }
            pass.present();
        }
        (distributed, overflowed)
    }

    /// Draw the live list of every enabled pass in registration order
    pub fn draw_passes(
        &mut self,
        device: &mut dyn GraphicsDevice,
        renderer: &mut dyn ObjectRenderer,
    ) -> DrawStats {
        let mut stats = DrawStats::default();
        for pass in self.passes.iter_mut().filter(|pass| pass.is_enabled()) {
            stats += pass.draw(renderer, device, &mut self.objects, None);
        }
        stats
    }

    /// Draw every object whose mask intersects `predicate_bits`, in world
    /// order, independent of passes.
    pub fn draw_matching(
        &mut self,
        predicate_bits: u64,
        device: &mut dyn GraphicsDevice,
        renderer: &mut dyn ObjectRenderer,
        view: PassView,
        constants: Option<&NamedConstantBuffer>,
        material: Option<MaterialHandle>,
    ) -> DrawStats {
        let mut handles = std::mem::take(&mut self.scratch);
        handles.clear();
        handles.extend(
            self.objects
                .iter()
                .filter(|(_, object)| {
                    !object.is_marked_for_delete() && matches(object.mask(), predicate_bits)
                })
                .map(|(handle, _)| handle),
        );

        let mut ctx = DrawContext {
            device,
            objects: &mut self.objects,
            view,
            constants,
            material,
        };
        let stats = draw_instances(renderer, &mut ctx, &handles);
        self.scratch = handles;
        stats
    }

    fn apply_transform(&mut self, handle: RenderObjectHandle, owner: Option<EntityId>) {
        let (Some(source), Some(owner)) = (self.transform_source.as_deref_mut(), owner) else {
            return;
        };
        if let Some((position, rotation)) = source.transform(owner) {
            if let Some(object) = self.objects.get_mut(handle) {
                object.set_transform(position, rotation);
            }
        }
    }
}

impl std::fmt::Debug for RenderWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderWorld")
            .field("objects", &self.objects.len())
            .field("passes", &self.passes)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}
