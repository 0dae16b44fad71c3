//! Graphics state enums and resource handles
//!
//! The script layer hands these across as raw numbers; every enum converts
//! with [`TryFrom<u32>`] and rejects values outside its closed set, so a
//! recorded [`Command`](super::command::Command) only ever holds valid state.

use bitflags::bitflags;
use thiserror::Error;

slotmap::new_key_type! {
    /// Handle to an off-screen render target owned by the graphics device
    pub struct RenderTargetHandle;

    /// Handle to a texture owned by the graphics device
    pub struct TextureHandle;
}

/// Opaque material reference resolved by the resource layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u64);

/// A raw script number that is not a member of the expected enum
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{value} is not a valid {kind}")]
pub struct InvalidEnumValue {
    /// Name of the enum being converted to
    pub kind: &'static str,
    /// The rejected number
    pub value: u32,
}

/// Lookup shared by the enum conversions: raw numbers index `all`.
fn from_index<T: Copy>(all: &[T], kind: &'static str, value: u32) -> Result<T, InvalidEnumValue> {
    all.get(value as usize)
        .copied()
        .ok_or(InvalidEnumValue { kind, value })
}

/// Toggleable device render state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum RenderState {
    /// Depth testing
    DepthTest = 0,
    /// Alpha testing
    AlphaTest = 1,
    /// Blending
    Blend = 2,
    /// Face culling
    CullFace = 3,
    /// Polygon offset for filled polygons
    PolygonOffsetFill = 4,
}

impl RenderState {
    /// Every state, in script-number order
    pub const ALL: [Self; 5] = [
        Self::DepthTest,
        Self::AlphaTest,
        Self::Blend,
        Self::CullFace,
        Self::PolygonOffsetFill,
    ];
}

impl TryFrom<u32> for RenderState {
    type Error = InvalidEnumValue;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        from_index(&Self::ALL, "render state", value)
    }
}

/// Blend equation factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BlendFactor {
    /// 0
    Zero = 0,
    /// 1
    One = 1,
    /// Source colour
    SrcColor = 2,
    /// 1 - source colour
    OneMinusSrcColor = 3,
    /// Destination colour
    DstColor = 4,
    /// 1 - destination colour
    OneMinusDstColor = 5,
    /// Source alpha
    SrcAlpha = 6,
    /// 1 - source alpha
    OneMinusSrcAlpha = 7,
    /// Destination alpha
    DstAlpha = 8,
    /// 1 - destination alpha
    OneMinusDstAlpha = 9,
    /// min(source alpha, 1 - destination alpha)
    SrcAlphaSaturate = 10,
    /// Constant colour
    ConstantColor = 11,
    /// 1 - constant colour
    OneMinusConstantColor = 12,
    /// Constant alpha
    ConstantAlpha = 13,
    /// 1 - constant alpha
    OneMinusConstantAlpha = 14,
}

impl BlendFactor {
    /// Every factor, in script-number order
    pub const ALL: [Self; 15] = [
        Self::Zero,
        Self::One,
        Self::SrcColor,
        Self::OneMinusSrcColor,
        Self::DstColor,
        Self::OneMinusDstColor,
        Self::SrcAlpha,
        Self::OneMinusSrcAlpha,
        Self::DstAlpha,
        Self::OneMinusDstAlpha,
        Self::SrcAlphaSaturate,
        Self::ConstantColor,
        Self::OneMinusConstantColor,
        Self::ConstantAlpha,
        Self::OneMinusConstantAlpha,
    ];
}

impl TryFrom<u32> for BlendFactor {
    type Error = InvalidEnumValue;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        from_index(&Self::ALL, "blend factor", value)
    }
}

/// Polygon faces selected for culling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum FaceType {
    /// Front faces
    Front = 0,
    /// Back faces
    Back = 1,
    /// Both
    FrontAndBack = 2,
}

impl FaceType {
    /// Every face type, in script-number order
    pub const ALL: [Self; 3] = [Self::Front, Self::Back, Self::FrontAndBack];
}

impl TryFrom<u32> for FaceType {
    type Error = InvalidEnumValue;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        from_index(&Self::ALL, "face type", value)
    }
}

bitflags! {
    /// Render target buffers, used both as a clear mask and to name a
    /// single attachment.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferType: u32 {
        /// Colour attachment
        const COLOR = 1 << 0;
        /// Depth attachment
        const DEPTH = 1 << 1;
        /// Stencil attachment
        const STENCIL = 1 << 2;
    }
}

impl BufferType {
    /// Interpret a raw script number as exactly one attachment.
    pub fn single(value: u32) -> Option<Self> {
        let flags = Self::from_bits(value)?;
        (flags.bits().count_ones() == 1).then_some(flags)
    }
}

/// Texel storage format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TextureFormat {
    /// Single channel
    Luminance = 0,
    /// 8-bit RGB
    Rgb = 1,
    /// 8-bit RGBA
    Rgba = 2,
    /// DXT1 compressed RGB
    RgbDxt1 = 3,
    /// DXT1 compressed RGBA
    RgbaDxt1 = 4,
    /// DXT3 compressed RGBA
    RgbaDxt3 = 5,
    /// DXT5 compressed RGBA
    RgbaDxt5 = 6,
    /// Depth
    Depth = 7,
}

impl TextureFormat {
    /// Every format, in script-number order
    pub const ALL: [Self; 8] = [
        Self::Luminance,
        Self::Rgb,
        Self::Rgba,
        Self::RgbDxt1,
        Self::RgbaDxt1,
        Self::RgbaDxt3,
        Self::RgbaDxt5,
        Self::Depth,
    ];
}

impl TryFrom<u32> for TextureFormat {
    type Error = InvalidEnumValue;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        from_index(&Self::ALL, "texture format", value)
    }
}

/// Texture sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TextureFilter {
    /// Linear interpolation
    Linear = 0,
    /// Nearest texel
    Nearest = 1,
}

impl TextureFilter {
    /// Every filter, in script-number order
    pub const ALL: [Self; 2] = [Self::Linear, Self::Nearest];
}

impl TryFrom<u32> for TextureFilter {
    type Error = InvalidEnumValue;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        from_index(&Self::ALL, "texture filter", value)
    }
}

/// Texture coordinate wrap mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TextureWrap {
    /// Clamp to the border colour
    ClampToBorder = 0,
    /// Clamp to the edge texel
    ClampToEdge = 1,
    /// Mirror on every repeat
    MirroredRepeat = 2,
    /// Tile
    Repeat = 3,
}

impl TextureWrap {
    /// Every wrap mode, in script-number order
    pub const ALL: [Self; 4] = [
        Self::ClampToBorder,
        Self::ClampToEdge,
        Self::MirroredRepeat,
        Self::Repeat,
    ];
}

impl TryFrom<u32> for TextureWrap {
    type Error = InvalidEnumValue;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        from_index(&Self::ALL, "texture wrap", value)
    }
}

/// Creation parameters for one render target attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureParams {
    /// Texel format
    pub format: TextureFormat,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Minification filter
    pub min_filter: TextureFilter,
    /// Magnification filter
    pub mag_filter: TextureFilter,
    /// Horizontal wrap
    pub u_wrap: TextureWrap,
    /// Vertical wrap
    pub v_wrap: TextureWrap,
}

impl TextureParams {
    /// Attachment of the given format and size with linear filtering and edge clamping
    pub const fn new(format: TextureFormat, width: u32, height: u32) -> Self {
        Self {
            format,
            width,
            height,
            min_filter: TextureFilter::Linear,
            mag_filter: TextureFilter::Linear,
            u_wrap: TextureWrap::ClampToEdge,
            v_wrap: TextureWrap::ClampToEdge,
        }
    }
}
