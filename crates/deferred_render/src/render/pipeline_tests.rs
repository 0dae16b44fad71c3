//! End-to-end tests: script record, replay and world update against the
//! recording device.

use std::collections::HashSet;

use super::device::{DeviceCall, RecordingDevice};
use super::dispatch::{DrawContext, ObjectRenderer};
use super::graphics::{BlendFactor, BufferType, FaceType, MaterialHandle, RenderState, TextureFormat};
use super::object::{RenderObjectDesc, RenderObjectHandle, RenderObjectType, ResourceId};
use super::pass::{PassHooks, PassView, RenderPassDesc};
use super::world::RenderWorld;
use super::{DebugBuffer, GraphicsDevice, RenderContext};
use crate::config::RenderConfig;
use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::script::program::{EntryPoints, ProgramRegistry, RenderScript, RenderScriptProgram};
use super::command::CommandKind;
use crate::script::{
    ClearValue, Message, RawTextureParams, RenderApi, RenderScriptError, RenderScriptInstance,
    ScriptResult, ScriptValue,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Begin(RenderObjectType),
    End(RenderObjectType),
    Draw(RenderObjectType, RenderObjectHandle),
}

#[derive(Default)]
struct TestRenderer {
    events: Vec<Event>,
    delete_on_draw: Option<(RenderObjectHandle, RenderObjectHandle)>,
    materials: Vec<Option<MaterialHandle>>,
    tints: Vec<Option<Vec4>>,
}

impl TestRenderer {
    fn drawn(&self) -> Vec<RenderObjectHandle> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Draw(_, handle) => Some(*handle),
                _ => None,
            })
            .collect()
    }

    fn record(
        &mut self,
        ctx: &mut DrawContext<'_>,
        object_type: RenderObjectType,
        handle: RenderObjectHandle,
    ) {
        self.events.push(Event::Draw(object_type, handle));
        self.materials.push(ctx.material);
        self.tints
            .push(ctx.constants.and_then(|constants| constants.get("tint")));
        if let Some((trigger, victim)) = self.delete_on_draw {
            if trigger == handle {
                ctx.objects.mark_for_delete(victim);
            }
        }
    }
}

impl ObjectRenderer for TestRenderer {
    fn begin_type(&mut self, _ctx: &mut DrawContext<'_>, object_type: RenderObjectType) {
        self.events.push(Event::Begin(object_type));
    }

    fn end_type(&mut self, _ctx: &mut DrawContext<'_>, object_type: RenderObjectType) {
        self.events.push(Event::End(object_type));
    }

    fn draw_model(&mut self, ctx: &mut DrawContext<'_>, object: RenderObjectHandle) {
        self.record(ctx, RenderObjectType::Model, object);
    }

    fn draw_text(&mut self, ctx: &mut DrawContext<'_>, object: RenderObjectHandle) {
        self.record(ctx, RenderObjectType::Text, object);
    }

    fn draw_particle(&mut self, ctx: &mut DrawContext<'_>, object: RenderObjectHandle) {
        self.record(ctx, RenderObjectType::Particle, object);
    }
}

fn world() -> RenderWorld {
    RenderWorld::new(&RenderConfig::default())
}

fn object(world: &mut RenderWorld, object_type: RenderObjectType, mask: u64) -> RenderObjectHandle {
    world
        .new_render_object(RenderObjectDesc::new(object_type, ResourceId(0), mask))
        .unwrap()
}

fn context() -> RenderContext {
    crate::foundation::logging::try_init_for_tests();
    RenderContext::new(
        Box::new(RecordingDevice::default()),
        Box::new(DebugBuffer::new(true)),
    )
}

fn recorded_calls(ctx: &RenderContext) -> Vec<DeviceCall> {
    ctx.device_as::<RecordingDevice>().unwrap().calls().to_vec()
}

#[test]
fn test_mask_selects_passes() {
    let mut world = world();
    let narrow = world.add_render_pass(RenderPassDesc::new("narrow", 0b0010)).unwrap();
    let other = world.add_render_pass(RenderPassDesc::new("other", 0b1000)).unwrap();
    let handle = object(&mut world, RenderObjectType::Model, 0b0110);

    world.distribute();

    assert_eq!(world.pass(narrow).unwrap().live_instances(), &[handle]);
    assert!(world.pass(other).unwrap().live_instances().is_empty());
}

#[test]
fn test_deleted_object_never_reaches_a_live_list() {
    let mut world = world();
    let pass = world.add_render_pass(RenderPassDesc::new("all", u64::MAX)).unwrap();
    let keep = object(&mut world, RenderObjectType::Model, 1);
    let doomed = object(&mut world, RenderObjectType::Model, 1);
    let mut device = RecordingDevice::default();
    let mut renderer = TestRenderer::default();

    world.update(0.016, &mut device, &mut renderer);
    assert_eq!(world.pass(pass).unwrap().live_instances(), &[keep, doomed]);

    world.delete_render_object(doomed).unwrap();
    let stats = world.update(0.016, &mut device, &mut renderer);

    assert_eq!(stats.reaped, 1);
    assert_eq!(world.pass(pass).unwrap().live_instances(), &[keep]);
    assert!(world.object(doomed).is_none());
    assert_eq!(world.objects().len(), 1);
}

#[test]
fn test_disable_after_delete_has_no_effect() {
    let mut world = world();
    let handle = object(&mut world, RenderObjectType::Text, 1);

    assert!(world.disable_render_object(handle));
    assert!(world.enable_render_object(handle));
    world.delete_render_object(handle).unwrap();
    assert!(!world.enable_render_object(handle));
    assert!(!world.disable_render_object(handle));
    assert!(world.object(handle).unwrap().is_marked_for_delete());
}

#[test]
fn test_consecutive_updates_draw_the_same_set() {
    let mut world = world();
    world.add_render_pass(RenderPassDesc::new("models", 0b01)).unwrap();
    let a = object(&mut world, RenderObjectType::Model, 0b01);
    let _ = object(&mut world, RenderObjectType::Model, 0b10);
    let c = object(&mut world, RenderObjectType::Model, 0b11);
    let mut device = RecordingDevice::default();

    let mut first = TestRenderer::default();
    world.update(0.016, &mut device, &mut first);
    let mut second = TestRenderer::default();
    world.update(0.016, &mut device, &mut second);

    let expected: HashSet<_> = [a, c].into_iter().collect();
    assert_eq!(first.drawn().into_iter().collect::<HashSet<_>>(), expected);
    assert_eq!(second.drawn().into_iter().collect::<HashSet<_>>(), expected);
}

#[test]
fn test_draw_order_follows_creation_order() {
    let mut world = world();
    world.add_render_pass(RenderPassDesc::new("all", u64::MAX)).unwrap();
    let handles: Vec<_> = (0..6)
        .map(|_| object(&mut world, RenderObjectType::Model, 1))
        .collect();
    world.delete_render_object(handles[2]).unwrap();
    let mut device = RecordingDevice::default();
    let mut renderer = TestRenderer::default();

    world.update(0.016, &mut device, &mut renderer);

    let expected: Vec<_> = handles.iter().copied().filter(|h| *h != handles[2]).collect();
    assert_eq!(renderer.drawn(), expected);
}

#[test]
fn test_disabled_objects_are_distributed_but_not_drawn() {
    let mut world = world();
    let pass = world.add_render_pass(RenderPassDesc::new("all", 1)).unwrap();
    let hidden = object(&mut world, RenderObjectType::Model, 1);
    let shown = object(&mut world, RenderObjectType::Model, 1);
    world.disable_render_object(hidden);
    let mut device = RecordingDevice::default();
    let mut renderer = TestRenderer::default();

    let stats = world.update(0.016, &mut device, &mut renderer);

    assert_eq!(world.pass(pass).unwrap().live_instances(), &[hidden, shown]);
    assert_eq!(renderer.drawn(), vec![shown]);
    assert_eq!((stats.drawn, stats.skipped), (1, 1));
}

#[test]
fn test_object_deleted_mid_draw_is_skipped() {
    let mut world = world();
    world.add_render_pass(RenderPassDesc::new("all", 1)).unwrap();
    let first = object(&mut world, RenderObjectType::Model, 1);
    let second = object(&mut world, RenderObjectType::Model, 1);
    let third = object(&mut world, RenderObjectType::Model, 1);
    let mut device = RecordingDevice::default();
    let mut renderer = TestRenderer {
        delete_on_draw: Some((first, second)),
        ..TestRenderer::default()
    };

    let stats = world.update(0.016, &mut device, &mut renderer);

    assert_eq!(renderer.drawn(), vec![first, third]);
    assert_eq!(stats.skipped, 1);
    assert!(world.object(second).is_some());

    world.update(0.016, &mut device, &mut TestRenderer::default());
    assert!(world.object(second).is_none());
}

#[test]
fn test_type_runs_are_bracketed_without_fallthrough() {
    let mut world = world();
    world.add_render_pass(RenderPassDesc::new("all", 1)).unwrap();
    let text_a = object(&mut world, RenderObjectType::Text, 1);
    let text_b = object(&mut world, RenderObjectType::Text, 1);
    let particle = object(&mut world, RenderObjectType::Particle, 1);
    let model = object(&mut world, RenderObjectType::Model, 1);
    let mut device = RecordingDevice::default();
    let mut renderer = TestRenderer::default();

    world.update(0.016, &mut device, &mut renderer);

    use RenderObjectType::{Model, Particle, Text};
    assert_eq!(
        renderer.events,
        vec![
            Event::Begin(Text),
            Event::Draw(Text, text_a),
            Event::Draw(Text, text_b),
            Event::End(Text),
            Event::Begin(Particle),
            Event::Draw(Particle, particle),
            Event::End(Particle),
            Event::Begin(Model),
            Event::Draw(Model, model),
            Event::End(Model),
        ]
    );
}

#[test]
fn test_pass_capacity_overflow_is_counted() {
    let mut world = world();
    let pass = world
        .add_render_pass(RenderPassDesc::new("small", 1).with_capacity(2))
        .unwrap();
    for _ in 0..3 {
        object(&mut world, RenderObjectType::Model, 1);
    }
    let mut device = RecordingDevice::default();

    let stats = world.update(0.016, &mut device, &mut TestRenderer::default());

    assert_eq!(stats.overflowed, 1);
    assert_eq!(stats.drawn, 2);
    assert_eq!(world.pass(pass).unwrap().live_instances().len(), 2);
}

struct ViewportHooks;

impl PassHooks for ViewportHooks {
    fn begin(&mut self, device: &mut dyn GraphicsDevice, _view: &PassView) {
        device.set_viewport(0, 0, 10, 10);
    }

    fn end(&mut self, device: &mut dyn GraphicsDevice, _view: &PassView) {
        device.set_depth_mask(true);
    }
}

#[test]
fn test_pass_hooks_wrap_the_traversal() {
    let mut world = world();
    world
        .add_render_pass(RenderPassDesc::new("hooked", 1).with_hooks(Box::new(ViewportHooks)))
        .unwrap();
    let mut device = RecordingDevice::default();

    world.update(0.016, &mut device, &mut TestRenderer::default());

    assert_eq!(
        device.calls(),
        &[
            DeviceCall::SetViewport { x: 0, y: 0, width: 10, height: 10 },
            DeviceCall::SetDepthMask(true),
        ]
    );
}

struct ThreeDisables;

impl RenderScriptProgram for ThreeDisables {
    fn entry_points(&self) -> EntryPoints {
        EntryPoints::UPDATE
    }

    fn update(&self, render: &mut RenderApi<'_>) -> ScriptResult<()> {
        render.disable_state(RenderState::DepthTest as u32)?;
        render.disable_state(RenderState::Blend as u32)?;
        render.disable_state(RenderState::CullFace as u32)
    }
}

struct DrawModels;

impl RenderScriptProgram for DrawModels {
    fn entry_points(&self) -> EntryPoints {
        EntryPoints::INIT | EntryPoints::UPDATE | EntryPoints::ON_MESSAGE
    }

    fn init(&self, render: &mut RenderApi<'_>) -> ScriptResult<()> {
        let models = render.predicate(&["model"])?;
        render
            .data_mut()
            .set("models", crate::script::ScriptValue::Predicate(models));
        Ok(())
    }

    fn update(&self, render: &mut RenderApi<'_>) -> ScriptResult<()> {
        render.set_view(Mat4::new_translation(&Vec3::new(0.0, 0.0, -5.0)))?;
        render.enable_material(Some("base"))?;
        let models = render.data().predicate("models");
        render.draw(models, None)?;
        if render.data().get("fail").is_some() {
            return Err(RenderScriptError::runtime("update failed after drawing"));
        }
        render.draw_debug3d()
    }

    fn on_message(&self, render: &mut RenderApi<'_>, message: &Message) -> ScriptResult<()> {
        if message.is("break") {
            render.data_mut().set("fail", crate::script::ScriptValue::Bool(true));
        }
        Ok(())
    }
}

/// Records two state changes per frame; `on_message` adds a depth mask change.
struct MessageCommands;

impl RenderScriptProgram for MessageCommands {
    fn entry_points(&self) -> EntryPoints {
        EntryPoints::UPDATE | EntryPoints::ON_MESSAGE
    }

    fn update(&self, render: &mut RenderApi<'_>) -> ScriptResult<()> {
        render.disable_state(RenderState::DepthTest as u32)?;
        render.disable_state(RenderState::Blend as u32)
    }

    fn on_message(&self, render: &mut RenderApi<'_>, _message: &Message) -> ScriptResult<()> {
        render.set_depth_mask(false)
    }
}

/// Touches every device-facing command kind, interleaved.
struct EveryDeviceCommand;

impl RenderScriptProgram for EveryDeviceCommand {
    fn entry_points(&self) -> EntryPoints {
        EntryPoints::INIT | EntryPoints::UPDATE
    }

    fn init(&self, render: &mut RenderApi<'_>) -> ScriptResult<()> {
        let params = RawTextureParams {
            format: TextureFormat::Rgba as u32,
            width: 64,
            height: 64,
            min_filter: 0,
            mag_filter: 0,
            u_wrap: 1,
            v_wrap: 1,
        };
        render.render_target("shadow", &[(BufferType::COLOR.bits(), params)])?;
        Ok(())
    }

    fn update(&self, render: &mut RenderApi<'_>) -> ScriptResult<()> {
        let target = render.get_render_target("shadow");
        render.set_viewport(0, 0, 320, 240)?;
        render.enable_state(RenderState::Blend as u32)?;
        render.set_blend_func(BlendFactor::SrcAlpha as u32, BlendFactor::OneMinusSrcAlpha as u32)?;
        render.set_color_mask(true, false, true, false)?;
        render.enable_render_target(target)?;
        render.clear(&[
            (BufferType::COLOR.bits(), ClearValue::Color(Vec4::new(1.0, 0.5, 0.0, 1.0))),
            (BufferType::DEPTH.bits(), ClearValue::Number(0.75)),
            (BufferType::STENCIL.bits(), ClearValue::Number(3.0)),
        ])?;
        render.set_depth_mask(false)?;
        render.set_stencil_mask(0xff)?;
        render.set_cull_face(FaceType::Front as u32)?;
        render.set_polygon_offset(1.5, 2.0)?;
        render.disable_render_target(target)?;
        render.enable_texture(1, target, BufferType::COLOR.bits())?;
        render.disable_state(RenderState::Blend as u32)?;
        render.disable_texture(1)
    }
}

/// Draws models with a tinted constant buffer; a "drop" message makes
/// `update` release the buffer right after recording the draw.
struct TintedModels;

impl RenderScriptProgram for TintedModels {
    fn entry_points(&self) -> EntryPoints {
        EntryPoints::INIT | EntryPoints::UPDATE | EntryPoints::ON_MESSAGE
    }

    fn init(&self, render: &mut RenderApi<'_>) -> ScriptResult<()> {
        let models = render.predicate(&["model"])?;
        let constants = render.constant_buffer();
        render.set_constant(constants, "tint", Vec4::new(1.0, 0.0, 0.0, 1.0))?;
        render.data_mut().set("models", ScriptValue::Predicate(models));
        render
            .data_mut()
            .set("constants", ScriptValue::ConstantBuffer(constants));
        Ok(())
    }

    fn update(&self, render: &mut RenderApi<'_>) -> ScriptResult<()> {
        let models = render.data().predicate("models");
        let constants = render.data().constant_buffer("constants");
        render.draw(models, constants)?;
        let release = render.data().get("drop").is_some();
        match constants {
            Some(constants) if release => render.delete_constant_buffer(constants),
            _ => Ok(()),
        }
    }

    fn on_message(&self, render: &mut RenderApi<'_>, message: &Message) -> ScriptResult<()> {
        if message.is("drop") {
            render.data_mut().set("drop", ScriptValue::Bool(true));
        }
        Ok(())
    }
}

/// Builds a fresh predicate every frame.
struct PredicatePerFrame;

impl RenderScriptProgram for PredicatePerFrame {
    fn entry_points(&self) -> EntryPoints {
        EntryPoints::UPDATE
    }

    fn update(&self, render: &mut RenderApi<'_>) -> ScriptResult<()> {
        render.predicate(&["model"])?;
        Ok(())
    }
}

fn registry() -> ProgramRegistry {
    let mut registry = ProgramRegistry::new();
    registry.register("three_disables", || Box::new(ThreeDisables));
    registry.register("draw_models", || Box::new(DrawModels));
    registry.register("message_commands", || Box::new(MessageCommands));
    registry.register("every_device_command", || Box::new(EveryDeviceCommand));
    registry.register("tinted_models", || Box::new(TintedModels));
    registry.register("predicate_per_frame", || Box::new(PredicatePerFrame));
    registry
}

#[test]
fn test_replay_preserves_push_order() {
    let registry = registry();
    let script = RenderScript::new_shared(&registry, "three_disables", "t.render_script").unwrap();
    let mut instance = RenderScriptInstance::new(&RenderConfig::default(), script);
    let mut ctx = context();
    let mut world = world();

    instance.update(&mut ctx, &mut world, &mut TestRenderer::default()).unwrap();

    assert_eq!(
        recorded_calls(&ctx),
        vec![
            DeviceCall::DisableState(RenderState::DepthTest),
            DeviceCall::DisableState(RenderState::Blend),
            DeviceCall::DisableState(RenderState::CullFace),
        ]
    );
}

#[test]
fn test_full_buffer_aborts_update_but_replays_recorded_commands() {
    let registry = registry();
    let script = RenderScript::new_shared(&registry, "three_disables", "t.render_script").unwrap();
    let config = RenderConfig {
        command_buffer_size: 2,
        ..RenderConfig::default()
    };
    let mut instance = RenderScriptInstance::new(&config, script);
    let mut ctx = context();
    let mut world = world();

    let result = instance.update(&mut ctx, &mut world, &mut TestRenderer::default());

    assert!(matches!(result, Err(RenderScriptError::CommandBufferFull { capacity: 2 })));
    assert_eq!(instance.command_buffer().len(), 2);
    assert_eq!(recorded_calls(&ctx).len(), 2);
}

#[test]
fn test_script_draw_uses_world_tags_and_material() {
    let registry = registry();
    let script = RenderScript::new_shared(&registry, "draw_models", "m.render_script").unwrap();
    let mut instance = RenderScriptInstance::new(&RenderConfig::default(), script);
    instance.add_material("base", MaterialHandle(7));
    let mut ctx = context();
    let mut world = world();
    let model = world
        .new_tagged_render_object(RenderObjectType::Model, ResourceId(1), &["model"])
        .unwrap();
    world
        .new_tagged_render_object(RenderObjectType::Text, ResourceId(2), &["text"])
        .unwrap();
    let mut renderer = TestRenderer::default();

    instance.init(&mut ctx).unwrap();
    instance.update(&mut ctx, &mut world, &mut renderer).unwrap();

    assert_eq!(renderer.drawn(), vec![model]);
    assert_eq!(renderer.materials, vec![Some(MaterialHandle(7))]);
    assert_eq!(instance.last_draw_stats().drawn, 1);
    assert_eq!(ctx.material(), Some(MaterialHandle(7)));
    approx::assert_relative_eq!(
        *ctx.view(),
        Mat4::new_translation(&Vec3::new(0.0, 0.0, -5.0))
    );
}

#[test]
fn test_runtime_error_still_replays_partial_buffer() {
    let registry = registry();
    let script = RenderScript::new_shared(&registry, "draw_models", "m.render_script").unwrap();
    let mut instance = RenderScriptInstance::new(&RenderConfig::default(), script);
    instance.add_material("base", MaterialHandle(1));
    let mut ctx = context();
    let mut world = world();
    world
        .new_tagged_render_object(RenderObjectType::Model, ResourceId(1), &["model"])
        .unwrap();
    let mut renderer = TestRenderer::default();
    instance.init(&mut ctx).unwrap();

    ctx.mailbox_mut().post(Message::new("break"));
    let result = instance.update(&mut ctx, &mut world, &mut renderer);

    assert!(matches!(result, Err(RenderScriptError::Runtime(_))));
    assert_eq!(instance.command_buffer().len(), 3);
    assert_eq!(renderer.drawn().len(), 1);
}

#[test]
fn test_missing_material_fails_update_before_draw() {
    let registry = registry();
    let script = RenderScript::new_shared(&registry, "draw_models", "m.render_script").unwrap();
    let mut instance = RenderScriptInstance::new(&RenderConfig::default(), script);
    let mut ctx = context();
    let mut world = world();
    world
        .new_tagged_render_object(RenderObjectType::Model, ResourceId(1), &["model"])
        .unwrap();
    let mut renderer = TestRenderer::default();
    instance.init(&mut ctx).unwrap();

    let result = instance.update(&mut ctx, &mut world, &mut renderer);

    assert!(matches!(result, Err(RenderScriptError::MaterialNotFound(name)) if name == "base"));
    assert_eq!(instance.command_buffer().len(), 1);
    assert!(renderer.drawn().is_empty());
}

#[test]
fn test_debug_lines_flushed_by_replay() {
    let registry = registry();
    let script = RenderScript::new_shared(&registry, "draw_models", "m.render_script").unwrap();
    let mut instance = RenderScriptInstance::new(&RenderConfig::default(), script);
    instance.add_material("base", MaterialHandle(1));
    let mut ctx = context();
    let mut world = world();
    instance.init(&mut ctx).unwrap();

    ctx.mailbox_mut().post(Message::draw_line(
        Vec3::zeros(),
        Vec3::x(),
        Vec4::new(0.0, 1.0, 0.0, 1.0),
    ));
    instance
        .update(&mut ctx, &mut world, &mut TestRenderer::default())
        .unwrap();

    let debug = ctx.debug_as::<DebugBuffer>().unwrap();
    assert_eq!(debug.flushed_lines(), 1);
    assert!(debug.pending_lines().is_empty());
}

#[test]
fn test_reload_failure_keeps_running_old_script() {
    let registry = registry();
    let script = RenderScript::new_shared(&registry, "three_disables", "t.render_script").unwrap();
    let mut instance = RenderScriptInstance::new(&RenderConfig::default(), script.clone());
    let mut ctx = context();
    let mut world = world();

    assert!(script
        .borrow_mut()
        .reload(&registry, "-- broken\nnot_a_program", "t.render_script")
        .is_err());
    instance.on_reload(&mut ctx).unwrap();
    instance
        .update(&mut ctx, &mut world, &mut TestRenderer::default())
        .unwrap();

    assert_eq!(recorded_calls(&ctx).len(), 3);
}

#[test]
fn test_message_handler_commands_replay_before_update_commands() {
    let registry = registry();
    let script =
        RenderScript::new_shared(&registry, "message_commands", "msg.render_script").unwrap();
    let mut instance = RenderScriptInstance::new(&RenderConfig::default(), script);
    let mut ctx = context();
    let mut world = world();

    ctx.mailbox_mut().post(Message::new("mask"));
    instance
        .update(&mut ctx, &mut world, &mut TestRenderer::default())
        .unwrap();

    assert_eq!(instance.command_buffer().len(), 3);
    assert_eq!(
        recorded_calls(&ctx),
        vec![
            DeviceCall::SetDepthMask(false),
            DeviceCall::DisableState(RenderState::DepthTest),
            DeviceCall::DisableState(RenderState::Blend),
        ]
    );
}

#[test]
fn test_message_handler_sees_buffer_reset_after_full_frame() {
    let registry = registry();
    let script =
        RenderScript::new_shared(&registry, "message_commands", "msg.render_script").unwrap();
    let config = RenderConfig {
        command_buffer_size: 2,
        ..RenderConfig::default()
    };
    let mut instance = RenderScriptInstance::new(&config, script);
    let mut ctx = context();
    let mut world = world();

    instance
        .update(&mut ctx, &mut world, &mut TestRenderer::default())
        .unwrap();
    assert!(instance.command_buffer().is_full());

    ctx.mailbox_mut().post(Message::new("mask"));
    let result = instance.update(&mut ctx, &mut world, &mut TestRenderer::default());

    // The handler's command fits; only `update`'s second command overflows.
    assert!(matches!(result, Err(RenderScriptError::CommandBufferFull { capacity: 2 })));
    assert_eq!(
        recorded_calls(&ctx),
        vec![
            DeviceCall::DisableState(RenderState::DepthTest),
            DeviceCall::DisableState(RenderState::Blend),
            DeviceCall::SetDepthMask(false),
            DeviceCall::DisableState(RenderState::DepthTest),
        ]
    );
}

#[test]
fn test_replay_maps_every_device_command_in_push_order() {
    let registry = registry();
    let script =
        RenderScript::new_shared(&registry, "every_device_command", "all.render_script").unwrap();
    let mut instance = RenderScriptInstance::new(&RenderConfig::default(), script);
    let mut ctx = context();
    let mut world = world();

    instance.init(&mut ctx).unwrap();
    instance
        .update(&mut ctx, &mut world, &mut TestRenderer::default())
        .unwrap();

    let target = ctx.render_target("shadow").unwrap();
    let texture = ctx
        .device()
        .render_target_texture(target, BufferType::COLOR)
        .unwrap();
    assert_eq!(
        recorded_calls(&ctx),
        vec![
            DeviceCall::NewRenderTarget(target),
            DeviceCall::SetViewport { x: 0, y: 0, width: 320, height: 240 },
            DeviceCall::EnableState(RenderState::Blend),
            DeviceCall::SetBlendFunc(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha),
            DeviceCall::SetColorMask([true, false, true, false]),
            DeviceCall::EnableRenderTarget(target),
            DeviceCall::Clear {
                flags: BufferType::COLOR | BufferType::DEPTH | BufferType::STENCIL,
                color: [255, 127, 0, 255],
                depth: 0.75,
                stencil: 3,
            },
            DeviceCall::SetDepthMask(false),
            DeviceCall::SetStencilMask(0xff),
            DeviceCall::SetCullFace(FaceType::Front),
            DeviceCall::SetPolygonOffset(1.5, 2.0),
            DeviceCall::DisableRenderTarget(Some(target)),
            DeviceCall::EnableTexture(1, texture),
            DeviceCall::DisableState(RenderState::Blend),
            DeviceCall::DisableTexture(1),
        ]
    );
}

#[test]
fn test_draw_applies_constant_buffer_to_each_object() {
    let registry = registry();
    let script = RenderScript::new_shared(&registry, "tinted_models", "tint.render_script").unwrap();
    let mut instance = RenderScriptInstance::new(&RenderConfig::default(), script);
    let mut ctx = context();
    let mut world = world();
    for data in 0..2 {
        world
            .new_tagged_render_object(RenderObjectType::Model, ResourceId(data), &["model"])
            .unwrap();
    }
    let mut renderer = TestRenderer::default();

    instance.init(&mut ctx).unwrap();
    instance.update(&mut ctx, &mut world, &mut renderer).unwrap();

    let red = Vec4::new(1.0, 0.0, 0.0, 1.0);
    assert_eq!(renderer.tints, vec![Some(red), Some(red)]);
}

#[test]
fn test_draw_with_released_constant_buffer_fails_at_replay() {
    let registry = registry();
    let script = RenderScript::new_shared(&registry, "tinted_models", "tint.render_script").unwrap();
    let mut instance = RenderScriptInstance::new(&RenderConfig::default(), script);
    let mut ctx = context();
    let mut world = world();
    world
        .new_tagged_render_object(RenderObjectType::Model, ResourceId(0), &["model"])
        .unwrap();
    let mut renderer = TestRenderer::default();
    instance.init(&mut ctx).unwrap();

    ctx.mailbox_mut().post(Message::new("drop"));
    let result = instance.update(&mut ctx, &mut world, &mut renderer);

    assert!(matches!(
        result,
        Err(RenderScriptError::Replay { index: 0, kind: CommandKind::Draw, source })
            if matches!(*source, RenderScriptError::UnknownConstantBuffer("draw"))
    ));
    assert!(renderer.drawn().is_empty());
}

#[test]
fn test_predicates_built_per_frame_exhaust_the_table() {
    let registry = registry();
    let script =
        RenderScript::new_shared(&registry, "predicate_per_frame", "p.render_script").unwrap();
    let config = RenderConfig {
        max_predicates: 2,
        ..RenderConfig::default()
    };
    let mut instance = RenderScriptInstance::new(&config, script);
    let mut ctx = context();
    let mut world = world();

    for _ in 0..2 {
        instance
            .update(&mut ctx, &mut world, &mut TestRenderer::default())
            .unwrap();
    }
    let result = instance.update(&mut ctx, &mut world, &mut TestRenderer::default());

    assert!(matches!(result, Err(RenderScriptError::PredicateTableFull { capacity: 2 })));
}
