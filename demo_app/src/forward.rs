//! Forward render script used by the demo

use deferred_render::foundation::math::{Mat4, Vec3, Vec4};
use deferred_render::render::{BlendFactor, BufferType, RenderState};
use deferred_render::script::{
    ClearValue, EntryPoints, Message, RenderApi, RenderScriptProgram, ScriptResult, ScriptValue,
};

/// Clears, draws models with depth testing, then text with blending
pub struct ForwardScript;

impl RenderScriptProgram for ForwardScript {
    fn entry_points(&self) -> EntryPoints {
        EntryPoints::INIT | EntryPoints::UPDATE | EntryPoints::ON_MESSAGE
    }

    fn init(&self, render: &mut RenderApi<'_>) -> ScriptResult<()> {
        let models = render.predicate(&["model", "particle"])?;
        let text = render.predicate(&["text"])?;
        let tint = render.constant_buffer();
        render.set_constant(tint, "tint", Vec4::new(1.0, 1.0, 1.0, 1.0))?;

        let data = render.data_mut();
        data.set("models", ScriptValue::Predicate(models));
        data.set("text", ScriptValue::Predicate(text));
        data.set("tint", ScriptValue::ConstantBuffer(tint));
        data.set("clear_color", ScriptValue::Vector(Vec4::new(0.1, 0.1, 0.15, 1.0)));
        Ok(())
    }

    fn update(&self, render: &mut RenderApi<'_>) -> ScriptResult<()> {
        let width = render.get_window_width() as i32;
        let height = render.get_window_height() as i32;
        let clear_color = match render.data().get("clear_color") {
            Some(ScriptValue::Vector(color)) => *color,
            _ => Vec4::zeros(),
        };

        render.set_depth_mask(true)?;
        render.clear(&[
            (BufferType::COLOR.bits(), ClearValue::Color(clear_color)),
            (BufferType::DEPTH.bits(), ClearValue::Number(1.0)),
            (BufferType::STENCIL.bits(), ClearValue::Number(0.0)),
        ])?;
        render.set_viewport(0, 0, width, height)?;

        let aspect = width as f32 / height.max(1) as f32;
        render.set_view(Mat4::new_translation(&Vec3::new(0.0, 0.0, -10.0)))?;
        render.set_projection(Mat4::new_perspective(aspect, 45_f32.to_radians(), 0.1, 100.0))?;

        render.enable_state(RenderState::DepthTest as u32)?;
        render.enable_material(Some("lit"))?;
        let models = render.data().predicate("models");
        let tint = render.data().constant_buffer("tint");
        render.draw(models, tint)?;
        render.disable_material()?;
        render.draw_debug3d()?;

        render.disable_state(RenderState::DepthTest as u32)?;
        render.enable_state(RenderState::Blend as u32)?;
        render.set_blend_func(
            BlendFactor::SrcAlpha as u32,
            BlendFactor::OneMinusSrcAlpha as u32,
        )?;
        let text = render.data().predicate("text");
        render.draw(text, None)?;
        render.draw_debug2d()?;
        render.disable_state(RenderState::Blend as u32)
    }

    fn on_message(&self, render: &mut RenderApi<'_>, message: &Message) -> ScriptResult<()> {
        if message.is("clear_color") {
            if let Some(ScriptValue::Vector(color)) = message.get_arg("color") {
                render
                    .data_mut()
                    .set("clear_color", ScriptValue::Vector(*color));
            }
        }
        Ok(())
    }
}
