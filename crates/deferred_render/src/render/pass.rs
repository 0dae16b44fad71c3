//! Render passes
//!
//! # Architecture
//!
//! A pass owns a double-buffered list of object handles. Each frame the
//! world clears the pending list, fills it with the objects whose mask
//! matches the pass, then swaps so that list becomes live. Drawing only
//! ever reads the live list.

use super::device::GraphicsDevice;
use super::dispatch::{draw_instances, DrawContext, DrawStats, ObjectRenderer};
use super::graphics::MaterialHandle;
use super::object::{RenderObjectHandle, RenderObjects};
use super::predicate::matches;
use crate::foundation::collections::DoubleBuffer;
use crate::foundation::math::Mat4;

/// Matrices a pass draws with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassView {
    /// World to view
    pub view: Mat4,
    /// World to clip
    pub view_projection: Mat4,
}

impl PassView {
    /// Build from separate view and projection matrices
    pub fn from_view_projection(view: Mat4, projection: Mat4) -> Self {
        Self {
            view,
            view_projection: projection * view,
        }
    }
}

impl Default for PassView {
    fn default() -> Self {
        Self {
            view: Mat4::identity(),
            view_projection: Mat4::identity(),
        }
    }
}

/// Callbacks run around a pass's draw traversal
pub trait PassHooks {
    /// Before the first object is drawn
    fn begin(&mut self, _device: &mut dyn GraphicsDevice, _view: &PassView) {}

    /// After the last object is drawn
    fn end(&mut self, _device: &mut dyn GraphicsDevice, _view: &PassView) {}
}

/// Index of a pass in its world, in registration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderPassId(pub(crate) usize);

/// Creation parameters for a render pass
pub struct RenderPassDesc {
    /// Name used in logs
    pub name: String,
    /// Tag bits an object must intersect to be distributed here
    pub predicate_mask: u64,
    /// Maximum instances per frame; `None` uses the world default
    pub capacity: Option<usize>,
    /// Optional begin/end callbacks
    pub hooks: Option<Box<dyn PassHooks>>,
}

impl RenderPassDesc {
    /// Pass with default capacity and no hooks
    pub fn new(name: impl Into<String>, predicate_mask: u64) -> Self {
        Self {
            name: name.into(),
            predicate_mask,
            capacity: None,
            hooks: None,
        }
    }

    /// Set the per-frame instance capacity
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Attach begin/end callbacks
    #[must_use]
    pub fn with_hooks(mut self, hooks: Box<dyn PassHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }
}

/// A named draw phase over the objects matching its predicate mask
pub struct RenderPass {
    name: String,
    predicate_mask: u64,
    capacity: usize,
    instances: DoubleBuffer<Vec<RenderObjectHandle>>,
    view: PassView,
    hooks: Option<Box<dyn PassHooks>>,
    enabled: bool,
    overflowed: usize,
}

impl RenderPass {
    pub(crate) fn new(desc: RenderPassDesc, default_capacity: usize) -> Self {
        let capacity = desc.capacity.unwrap_or(default_capacity);
        Self {
            name: desc.name,
            predicate_mask: desc.predicate_mask,
            capacity,
            instances: DoubleBuffer::new(Vec::with_capacity(capacity), Vec::with_capacity(capacity)),
            view: PassView::default(),
            hooks: desc.hooks,
            enabled: true,
            overflowed: 0,
        }
    }

    /// Pass name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag bits this pass selects
    pub const fn predicate_mask(&self) -> u64 {
        self.predicate_mask
    }

    /// Maximum instances per frame
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether an object with `mask` belongs in this pass
    pub const fn accepts(&self, mask: u64) -> bool {
        matches(mask, self.predicate_mask)
    }

    /// Whether the pass takes part in distribution and drawing
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Include the pass from the next frame on
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Exclude the pass from the next frame on
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Current matrices
    pub const fn view(&self) -> &PassView {
        &self.view
    }

    /// Set the view matrix
    pub fn set_view_matrix(&mut self, view: Mat4) {
        self.view.view = view;
    }

    /// Set the view-projection matrix
    pub fn set_view_projection_matrix(&mut self, view_projection: Mat4) {
        self.view.view_projection = view_projection;
    }

    /// Handles being drawn this frame
    pub fn live_instances(&self) -> &[RenderObjectHandle] {
        self.instances.live()
    }

    /// Handles collected for the next swap
    pub fn pending_instances(&self) -> &[RenderObjectHandle] {
        self.instances.pending()
    }

    /// Instances rejected for capacity during the last distribution
    pub const fn overflowed(&self) -> usize {
        self.overflowed
    }

    pub(crate) fn begin_distribution(&mut self) {
        self.instances.pending_mut().clear();
        self.overflowed = 0;
    }

    /// Queue `handle` for the next frame; `false` when at capacity.
    pub(crate) fn add_instance(&mut self, handle: RenderObjectHandle) -> bool {
        let pending = self.instances.pending_mut();
        if pending.len() >= self.capacity {
            self.overflowed += 1;
            return false;
        }
        pending.push(handle);
        true
    }

    pub(crate) fn present(&mut self) {
        self.instances.swap();
    }

    pub(crate) fn draw(
        &mut self,
        renderer: &mut dyn ObjectRenderer,
        device: &mut dyn GraphicsDevice,
        objects: &mut RenderObjects,
        material: Option<MaterialHandle>,
    ) -> DrawStats {
        if let Some(hooks) = self.hooks.as_deref_mut() {
            hooks.begin(device, &self.view);
        }

        let mut ctx = DrawContext::new(device, objects, self.view);
        ctx.material = material;
        let stats = draw_instances(renderer, &mut ctx, self.instances.live());

        if let Some(hooks) = self.hooks.as_deref_mut() {
            hooks.end(device, &self.view);
        }
        stats
    }
}

impl std::fmt::Debug for RenderPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPass")
            .field("name", &self.name)
            .field("predicate_mask", &format_args!("{:#b}", self.predicate_mask))
            .field("capacity", &self.capacity)
            .field("live", &self.instances.live().len())
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}
