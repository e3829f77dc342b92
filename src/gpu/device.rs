//! Graphics device capability
//!
//! The narrow texture interface the font core consumes. Implemented by
//! [`GlDevice`](super::GlDevice) for real rendering and by
//! [`MemoryDevice`](super::MemoryDevice) for headless use.

use std::num::NonZeroU32;

use crate::error::{GfxError, Result};

/// Opaque texture name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub NonZeroU32);

impl TextureHandle {
    pub fn id(self) -> u32 {
        self.0.get()
    }
}

/// Texel format of uploaded data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Single 8-bit coverage channel
    Alpha,
    /// 8-bit RGBA
    Rgba,
}

impl PixelFormat {
    pub fn bytes_per_texel(self) -> u32 {
        match self {
            Self::Alpha => 1,
            Self::Rgba => 4,
        }
    }
}

/// Texture sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    #[default]
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    LinearMipmapLinear,
}

impl FilterMode {
    /// Whether this filter samples mip levels (minification only)
    pub fn uses_mipmaps(self) -> bool {
        matches!(
            self,
            Self::NearestMipmapNearest | Self::LinearMipmapNearest | Self::LinearMipmapLinear
        )
    }
}

/// Texture creation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Row alignment in bytes (1, 2, 4 or 8, as glPixelStorei)
    pub alignment: u32,
}

impl TextureDesc {
    /// Bytes per row including alignment padding
    pub fn row_stride(&self) -> usize {
        row_stride(self.width, self.format, self.alignment)
    }

    /// Total byte size of the texel data
    pub fn byte_len(&self) -> usize {
        self.row_stride() * self.height as usize
    }

    /// Reject zero sizes and unsupported alignments
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GfxError::device(
                "create_texture",
                format!("empty texture {}x{}", self.width, self.height),
            ));
        }
        if !matches!(self.alignment, 1 | 2 | 4 | 8) {
            return Err(GfxError::device(
                "create_texture",
                format!("unsupported row alignment {}", self.alignment),
            ));
        }
        Ok(())
    }
}

/// Row stride for `width` texels of `format`, padded to `alignment`
pub fn row_stride(width: u32, format: PixelFormat, alignment: u32) -> usize {
    let raw = (width * format.bytes_per_texel()) as usize;
    let align = alignment.max(1) as usize;
    raw.div_ceil(align) * align
}

/// Texel rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check that the region lies inside a `width`x`height` texture
    pub fn check_within(&self, width: u32, height: u32) -> Result<()> {
        let fits = self.x.checked_add(self.width).is_some_and(|r| r <= width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= height);
        if !fits {
            return Err(GfxError::device(
                "upload_sub_region",
                format!("region {:?} out of range for {}x{}", self, width, height),
            ));
        }
        Ok(())
    }
}

/// Copy `bytes` (rows packed at `desc.alignment`) into `region` of `pixels`
///
/// Validates format, bounds and data length first; `pixels` is untouched on
/// error.
pub(crate) fn copy_region(
    pixels: &mut [u8],
    desc: &TextureDesc,
    region: Region,
    format: PixelFormat,
    bytes: &[u8],
) -> Result<()> {
    if format != desc.format {
        return Err(GfxError::device(
            "upload_sub_region",
            format!("format {:?} does not match texture {:?}", format, desc.format),
        ));
    }
    region.check_within(desc.width, desc.height)?;

    let bpp = format.bytes_per_texel() as usize;
    let src_stride = row_stride(region.width, format, desc.alignment);
    let expected = src_stride * region.height as usize;
    if bytes.len() != expected {
        return Err(GfxError::device(
            "upload_sub_region",
            format!("expected {} bytes, got {}", expected, bytes.len()),
        ));
    }

    let dst_stride = desc.row_stride();
    let row_bytes = region.width as usize * bpp;
    for row in 0..region.height as usize {
        let src = row * src_stride;
        let dst = (region.y as usize + row) * dst_stride + region.x as usize * bpp;
        pixels[dst..dst + row_bytes].copy_from_slice(&bytes[src..src + row_bytes]);
    }
    Ok(())
}

/// [`copy_region`] into a copy of `pixels`, leaving the original untouched
///
/// Lets a device commit the new contents only after the upload succeeded.
pub(crate) fn staged_region(
    pixels: &[u8],
    desc: &TextureDesc,
    region: Region,
    format: PixelFormat,
    bytes: &[u8],
) -> Result<Vec<u8>> {
    let mut staged = pixels.to_vec();
    copy_region(&mut staged, desc, region, format, bytes)?;
    Ok(staged)
}

/// Check initial texel data against `desc`, or allocate zeroed storage
pub(crate) fn initial_pixels(desc: &TextureDesc, data: Option<&[u8]>) -> Result<Vec<u8>> {
    let len = desc.byte_len();
    match data {
        Some(bytes) if bytes.len() != len => Err(GfxError::device(
            "create_texture",
            format!("expected {} bytes, got {}", len, bytes.len()),
        )),
        Some(bytes) => Ok(bytes.to_vec()),
        None => Ok(vec![0u8; len]),
    }
}

/// Texture operations the font core needs from the device
///
/// All calls are synchronous and must come from the thread owning the
/// device context.
pub trait GraphicsDevice {
    /// Allocate a 2D texture, optionally filled with `data`
    fn create_texture(&self, desc: &TextureDesc, data: Option<&[u8]>) -> Result<TextureHandle>;

    /// Overwrite a sub-rectangle of a texture
    fn upload_sub_region(
        &self,
        texture: TextureHandle,
        region: Region,
        format: PixelFormat,
        bytes: &[u8],
    ) -> Result<()>;

    /// Read back the whole level-0 image
    fn read_all_pixels(&self, texture: TextureHandle) -> Result<Vec<u8>>;

    fn set_filter_mode(
        &self,
        texture: TextureHandle,
        min: FilterMode,
        mag: FilterMode,
    ) -> Result<()>;

    fn generate_mipmaps(&self, texture: TextureHandle) -> Result<()>;

    /// Release the texture. Unknown handles are ignored.
    fn destroy(&self, texture: TextureHandle);
}
