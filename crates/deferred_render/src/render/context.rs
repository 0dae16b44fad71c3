//! Render context
//!
//! Frame-wide state shared by the script API and replay: the graphics
//! device, named render targets, current camera matrices, the active
//! material, debug drawing and the render script's mailbox.

use std::collections::HashMap;

use super::debug::DebugRenderer;
use super::device::GraphicsDevice;
use super::graphics::{MaterialHandle, RenderTargetHandle};
use super::pass::PassView;
use crate::foundation::hash::{hash64, Hash64};
use crate::foundation::math::Mat4;
use crate::script::message::Mailbox;

/// Device, camera and resource state for one renderer
pub struct RenderContext {
    device: Box<dyn GraphicsDevice>,
    debug: Box<dyn DebugRenderer>,
    render_targets: HashMap<Hash64, RenderTargetHandle>,
    view: Mat4,
    projection: Mat4,
    material: Option<MaterialHandle>,
    mailbox: Mailbox,
}

impl RenderContext {
    /// Create a context around a device and a debug renderer
    pub fn new(device: Box<dyn GraphicsDevice>, debug: Box<dyn DebugRenderer>) -> Self {
        Self {
            device,
            debug,
            render_targets: HashMap::new(),
            view: Mat4::identity(),
            projection: Mat4::identity(),
            material: None,
            mailbox: Mailbox::new(),
        }
    }

    /// Graphics device
    pub fn device(&self) -> &dyn GraphicsDevice {
        self.device.as_ref()
    }

    /// Graphics device (mutable)
    pub fn device_mut(&mut self) -> &mut dyn GraphicsDevice {
        self.device.as_mut()
    }

    /// Downcast the device, e.g. to inspect a recording device
    pub fn device_as<T: 'static>(&self) -> Option<&T> {
        self.device.as_any().downcast_ref()
    }

    /// Debug renderer
    pub fn debug(&self) -> &dyn DebugRenderer {
        self.debug.as_ref()
    }

    /// Debug renderer (mutable)
    pub fn debug_mut(&mut self) -> &mut dyn DebugRenderer {
        self.debug.as_mut()
    }

    /// Downcast the debug renderer
    pub fn debug_as<T: 'static>(&self) -> Option<&T> {
        self.debug.as_any().downcast_ref()
    }

    /// Submit queued debug text
    pub fn flush_debug_2d(&mut self) {
        self.debug.flush_2d(self.device.as_mut());
    }

    /// Submit queued debug lines
    pub fn flush_debug_3d(&mut self) {
        self.debug.flush_3d(self.device.as_mut());
    }

    /// Register a render target under `name`, replacing any previous one
    pub fn register_render_target(&mut self, name: &str, target: RenderTargetHandle) {
        if self.render_targets.insert(hash64(name), target).is_some() {
            log::debug!("Render target '{}' replaced", name);
        }
    }

    /// Drop every registration of `target`
    pub fn unregister_render_target(&mut self, target: RenderTargetHandle) {
        self.render_targets.retain(|_, registered| *registered != target);
    }

    /// Look up a render target by name
    pub fn render_target(&self, name: &str) -> Option<RenderTargetHandle> {
        self.render_targets.get(&hash64(name)).copied()
    }

    /// Current view matrix
    pub const fn view(&self) -> &Mat4 {
        &self.view
    }

    /// Current projection matrix
    pub const fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Set the view matrix
    pub fn set_view(&mut self, view: Mat4) {
        self.view = view;
    }

    /// Set the projection matrix
    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    /// View and view-projection for drawing with the current camera
    pub fn pass_view(&self) -> PassView {
        PassView::from_view_projection(self.view, self.projection)
    }

    /// Active material
    pub const fn material(&self) -> Option<MaterialHandle> {
        self.material
    }

    /// Activate a material, implicitly deactivating the previous one
    pub fn enable_material(&mut self, material: MaterialHandle) {
        if let Some(previous) = self.material.replace(material) {
            log::trace!("Material {:?} replaced by {:?}", previous, material);
        }
    }

    /// Deactivate the current material
    pub fn disable_material(&mut self) {
        self.material = None;
    }

    /// Inbound messages for the render script
    pub const fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    /// Inbound messages for the render script (mutable)
    pub fn mailbox_mut(&mut self) -> &mut Mailbox {
        &mut self.mailbox
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("render_targets", &self.render_targets.len())
            .field("material", &self.material)
            .field("mailbox", &self.mailbox.len())
            .finish_non_exhaustive()
    }
}
