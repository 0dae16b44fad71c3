//! Script-visible constant names
//!
//! Scripts pass graphics enums as plain numbers. This table publishes the
//! name each number is known by, matching the `TryFrom<u32>` conversions in
//! [`crate::render::graphics`].

use crate::render::graphics::{
    BlendFactor, BufferType, FaceType, RenderState, TextureFilter, TextureFormat, TextureWrap,
};

/// `(name, value)` pairs for every constant a render script can use
pub fn render_constants() -> Vec<(&'static str, u32)> {
    let mut constants = vec![
        ("STATE_DEPTH_TEST", RenderState::DepthTest as u32),
        ("STATE_ALPHA_TEST", RenderState::AlphaTest as u32),
        ("STATE_BLEND", RenderState::Blend as u32),
        ("STATE_CULL_FACE", RenderState::CullFace as u32),
        ("STATE_POLYGON_OFFSET_FILL", RenderState::PolygonOffsetFill as u32),
        ("FORMAT_LUMINANCE", TextureFormat::Luminance as u32),
        ("FORMAT_RGB", TextureFormat::Rgb as u32),
        ("FORMAT_RGBA", TextureFormat::Rgba as u32),
        ("FORMAT_RGB_DXT1", TextureFormat::RgbDxt1 as u32),
        ("FORMAT_RGBA_DXT1", TextureFormat::RgbaDxt1 as u32),
        ("FORMAT_RGBA_DXT3", TextureFormat::RgbaDxt3 as u32),
        ("FORMAT_RGBA_DXT5", TextureFormat::RgbaDxt5 as u32),
        ("FORMAT_DEPTH", TextureFormat::Depth as u32),
        ("FILTER_LINEAR", TextureFilter::Linear as u32),
        ("FILTER_NEAREST", TextureFilter::Nearest as u32),
        ("WRAP_CLAMP_TO_BORDER", TextureWrap::ClampToBorder as u32),
        ("WRAP_CLAMP_TO_EDGE", TextureWrap::ClampToEdge as u32),
        ("WRAP_MIRRORED_REPEAT", TextureWrap::MirroredRepeat as u32),
        ("WRAP_REPEAT", TextureWrap::Repeat as u32),
        ("BUFFER_COLOR_BIT", BufferType::COLOR.bits()),
        ("BUFFER_DEPTH_BIT", BufferType::DEPTH.bits()),
        ("BUFFER_STENCIL_BIT", BufferType::STENCIL.bits()),
        ("FACE_FRONT", FaceType::Front as u32),
        ("FACE_BACK", FaceType::Back as u32),
        ("FACE_FRONT_AND_BACK", FaceType::FrontAndBack as u32),
    ];

    const BLEND_NAMES: [&str; 15] = [
        "BLEND_ZERO",
        "BLEND_ONE",
        "BLEND_SRC_COLOR",
        "BLEND_ONE_MINUS_SRC_COLOR",
        "BLEND_DST_COLOR",
        "BLEND_ONE_MINUS_DST_COLOR",
        "BLEND_SRC_ALPHA",
        "BLEND_ONE_MINUS_SRC_ALPHA",
        "BLEND_DST_ALPHA",
        "BLEND_ONE_MINUS_DST_ALPHA",
        "BLEND_SRC_ALPHA_SATURATE",
        "BLEND_CONSTANT_COLOR",
        "BLEND_ONE_MINUS_CONSTANT_COLOR",
        "BLEND_CONSTANT_ALPHA",
        "BLEND_ONE_MINUS_CONSTANT_ALPHA",
    ];
    constants.extend(
        BLEND_NAMES
            .into_iter()
            .zip(BlendFactor::ALL.map(|factor| factor as u32)),
    );
    constants
}

/// Value of a named constant
pub fn render_constant(name: &str) -> Option<u32> {
    render_constants()
        .into_iter()
        .find(|(constant, _)| *constant == name)
        .map(|(_, value)| value)
}
