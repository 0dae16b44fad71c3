//! Headless render pipeline demo
//!
//! Runs a forward render script against a recording device while game-side
//! code spawns, hides and deletes render objects at random.

mod forward;

use deferred_render::foundation::logging;
use deferred_render::prelude::*;
use deferred_render::render::DeviceCall;
use deferred_render::script::ScriptValue;
use rand::Rng;
use thiserror::Error;

use forward::ForwardScript;

const FRAMES: u64 = 120;
const CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/render.toml");

#[derive(Error, Debug)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render script error: {0}")]
    Script(#[from] RenderScriptError),

    #[error("Render world error: {0}")]
    World(#[from] RenderWorldError),
}

/// Counts draws per object type
#[derive(Default)]
struct CountingRenderer {
    models: usize,
    text: usize,
    particles: usize,
}

impl ObjectRenderer for CountingRenderer {
    fn draw_model(&mut self, _ctx: &mut DrawContext<'_>, _object: RenderObjectHandle) {
        self.models += 1;
    }

    fn draw_text(&mut self, _ctx: &mut DrawContext<'_>, _object: RenderObjectHandle) {
        self.text += 1;
    }

    fn draw_particle(&mut self, _ctx: &mut DrawContext<'_>, _object: RenderObjectHandle) {
        self.particles += 1;
    }
}

/// Load the config named on the command line, or the bundled one.
///
/// Only a missing bundled config falls back to defaults; a path given
/// explicitly must be readable.
fn load_config(path: Option<String>) -> Result<RenderConfig, DemoError> {
    let explicit = path.is_some();
    let path = path.unwrap_or_else(|| CONFIG_PATH.to_string());
    let config = match RenderConfig::load_from_file(&path) {
        Ok(config) => {
            log::info!("Loaded render config from {}", path);
            config
        }
        Err(ConfigError::Io(err)) if !explicit => {
            log::warn!("Could not read {} ({}); using defaults", path, err);
            RenderConfig::default()
        }
        Err(err) => return Err(err.into()),
    };
    config.validate()?;
    Ok(config)
}

fn spawn(world: &mut RenderWorld, rng: &mut impl Rng) -> Result<(), DemoError> {
    let (object_type, tag) = match rng.gen_range(0..3) {
        0 => (RenderObjectType::Model, "model"),
        1 => (RenderObjectType::Text, "text"),
        _ => (RenderObjectType::Particle, "particle"),
    };
    world.new_tagged_render_object(object_type, ResourceId(rng.gen()), &[tag])?;
    Ok(())
}

fn churn(world: &mut RenderWorld, rng: &mut impl Rng) -> Result<(), DemoError> {
    let handles = world.objects().handles().to_vec();
    for handle in handles {
        match rng.gen_range(0..100) {
            0..=2 => world.delete_render_object(handle)?,
            3..=7 => {
                world.disable_render_object(handle);
            }
            8..=15 => {
                world.enable_render_object(handle);
            }
            _ => {}
        }
    }
    Ok(())
}

fn main() -> Result<(), DemoError> {
    logging::init();
    log::info!("Starting deferred render demo");

    let config = load_config(std::env::args().nth(1))?;
    let mut world = RenderWorld::new(&config);
    let mut ctx = RenderContext::new(
        Box::new(RecordingDevice::new(1280, 720)),
        Box::new(DebugBuffer::new(true)),
    );

    let opaque = world.tags_mut().mask_for(["model", "particle"])?;
    let overlay = world.tags_mut().mask_for(["text"])?;
    world.add_render_pass(RenderPassDesc::new("opaque", opaque))?;
    world.add_render_pass(RenderPassDesc::new("overlay", overlay))?;

    let mut registry = ProgramRegistry::new();
    registry.register("forward", || Box::new(ForwardScript));
    let script = RenderScript::new_shared(
        &registry,
        "-- demo renderer\nforward",
        "forward.render_script",
    )?;
    let mut instance = RenderScriptInstance::new(&config, script);
    instance.add_material("lit", MaterialHandle(1));
    instance.init(&mut ctx)?;

    let mut rng = rand::thread_rng();
    let mut renderer = CountingRenderer::default();
    let dt = 1.0 / 60.0;

    for frame in 0..FRAMES {
        for _ in 0..rng.gen_range(0..4) {
            if let Err(err) = spawn(&mut world, &mut rng) {
                log::warn!("Spawn skipped: {}", err);
            }
        }
        churn(&mut world, &mut rng)?;

        ctx.mailbox_mut().post(Message::draw_line(
            Vec3::zeros(),
            Vec3::new(1.0, 0.0, 0.0),
            Vec4::new(1.0, 0.0, 0.0, 1.0),
        ));
        ctx.mailbox_mut()
            .post(Message::draw_text(format!("frame {frame}"), Vec3::new(10.0, 10.0, 0.0)));
        if frame == FRAMES / 2 {
            ctx.mailbox_mut().post(
                Message::new("clear_color")
                    .with_arg("color", ScriptValue::Vector(Vec4::new(0.3, 0.0, 0.0, 1.0))),
            );
        }

        if let Err(err) = instance.update(&mut ctx, &mut world, &mut renderer) {
            log::error!("Render script update failed: {}", err);
        }
        let stats = world.update(dt, ctx.device_mut(), &mut renderer);

        if frame % 30 == 0 {
            log::info!(
                "Frame {}: {} objects, {} drawn by passes, {} by script, {} reaped",
                frame,
                world.objects().len(),
                stats.drawn,
                instance.last_draw_stats().drawn,
                stats.reaped
            );
        }
    }

    let clears = ctx
        .device_as::<RecordingDevice>()
        .map_or(0, |device| {
            device
                .calls()
                .iter()
                .filter(|call| matches!(call, DeviceCall::Clear { .. }))
                .count()
        });
    log::info!(
        "Done: {} models, {} text, {} particles drawn; {} clears",
        renderer.models,
        renderer.text,
        renderer.particles,
        clears
    );
    Ok(())
}
