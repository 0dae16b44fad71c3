//! Type-grouped draw dispatch
//!
//! Objects are drawn in list order. Consecutive objects of the same
//! [`RenderObjectType`] share one `begin_type`/`end_type` bracket, and each
//! object goes to exactly one handler for its type.

use std::ops::AddAssign;

use super::constants::NamedConstantBuffer;
use super::device::GraphicsDevice;
use super::graphics::MaterialHandle;
use super::object::{RenderObjectHandle, RenderObjectType, RenderObjects};
use super::pass::PassView;

/// Everything a draw handler may touch while drawing one object
pub struct DrawContext<'a> {
    /// Graphics device
    pub device: &'a mut dyn GraphicsDevice,
    /// Object arena; handlers may disable or delete objects mid-draw
    pub objects: &'a mut RenderObjects,
    /// View and view-projection in effect
    pub view: PassView,
    /// Constants applied to every object drawn
    pub constants: Option<&'a NamedConstantBuffer>,
    /// Active material
    pub material: Option<MaterialHandle>,
}

impl<'a> DrawContext<'a> {
    /// Context without constants or material
    pub fn new(
        device: &'a mut dyn GraphicsDevice,
        objects: &'a mut RenderObjects,
        view: PassView,
    ) -> Self {
        Self {
            device,
            objects,
            view,
            constants: None,
            material: None,
        }
    }
}

/// Per-type draw handlers
///
/// The draw methods are required, so adding a [`RenderObjectType`] variant
/// forces every renderer to handle it.
pub trait ObjectRenderer {
    /// Called before the first object of a run of `object_type`
    fn begin_type(&mut self, _ctx: &mut DrawContext<'_>, _object_type: RenderObjectType) {}

    /// Called after the last object of a run of `object_type`
    fn end_type(&mut self, _ctx: &mut DrawContext<'_>, _object_type: RenderObjectType) {}

    /// Draw a model instance
    fn draw_model(&mut self, ctx: &mut DrawContext<'_>, object: RenderObjectHandle);

    /// Draw a text block
    fn draw_text(&mut self, ctx: &mut DrawContext<'_>, object: RenderObjectHandle);

    /// Draw a particle emitter
    fn draw_particle(&mut self, ctx: &mut DrawContext<'_>, object: RenderObjectHandle);
}

/// Counts from one draw traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Objects handed to a draw handler
    pub drawn: usize,
    /// Stale, disabled or deleted entries passed over
    pub skipped: usize,
}

impl AddAssign for DrawStats {
    fn add_assign(&mut self, other: Self) {
        self.drawn += other.drawn;
        self.skipped += other.skipped;
    }
}

/// Route one object to the handler for its type
pub fn draw_object(
    renderer: &mut dyn ObjectRenderer,
    ctx: &mut DrawContext<'_>,
    object: RenderObjectHandle,
    object_type: RenderObjectType,
) {
    match object_type {
        RenderObjectType::Model => renderer.draw_model(ctx, object),
        RenderObjectType::Text => renderer.draw_text(ctx, object),
        RenderObjectType::Particle => renderer.draw_particle(ctx, object),
    }
}

/// Draw `handles` in order.
///
/// Each object's state is checked when its turn comes, so objects disabled
/// or deleted by an earlier handler in the same traversal are skipped.
pub fn draw_instances(
    renderer: &mut dyn ObjectRenderer,
    ctx: &mut DrawContext<'_>,
    handles: &[RenderObjectHandle],
) -> DrawStats {
    let mut stats = DrawStats::default();
    let mut current: Option<RenderObjectType> = None;

    for &handle in handles {
        let Some(object_type) = ctx
            .objects
            .get(handle)
            .filter(|object| object.is_drawable())
            .map(|object| object.object_type())
        else {
            stats.skipped += 1;
            continue;
        };

        if current != Some(object_type) {
            if let Some(previous) = current {
                renderer.end_type(ctx, previous);
            }
            renderer.begin_type(ctx, object_type);
            current = Some(object_type);
        }

        draw_object(renderer, ctx, handle, object_type);
        stats.drawn += 1;
    }

    if let Some(last) = current {
        renderer.end_type(ctx, last);
    }
    stats
}
