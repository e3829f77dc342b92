//! OpenGL ES graphics device
//!
//! [`GraphicsDevice`] over a glow context. Each texture keeps a CPU-side
//! shadow copy because GLES has no glGetTexImage for readback.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glow::HasContext;
use log::{debug, info};

use super::device::{
    initial_pixels, staged_region, FilterMode, GraphicsDevice, PixelFormat, Region, TextureDesc,
    TextureHandle,
};
use crate::error::{GfxError, Result};

struct Shadow {
    desc: TextureDesc,
    pixels: Vec<u8>,
}

/// glow-backed device
///
/// Not `Sync`: all calls must come from the thread owning the GL context.
pub struct GlDevice {
    gl: Rc<glow::Context>,
    shadows: RefCell<HashMap<TextureHandle, Shadow>>,
    max_texture_size: u32,
}

pub(crate) fn to_gl(texture: TextureHandle) -> glow::Texture {
    glow::NativeTexture(texture.0)
}

/// (internal format, format) pair
fn gl_format(format: PixelFormat) -> (u32, u32) {
    match format {
        PixelFormat::Alpha => (glow::R8, glow::RED),
        PixelFormat::Rgba => (glow::RGBA8, glow::RGBA),
    }
}

fn gl_filter(filter: FilterMode) -> i32 {
    let f = match filter {
        FilterMode::Nearest => glow::NEAREST,
        FilterMode::Linear => glow::LINEAR,
        FilterMode::NearestMipmapNearest => glow::NEAREST_MIPMAP_NEAREST,
        FilterMode::LinearMipmapNearest => glow::LINEAR_MIPMAP_NEAREST,
        FilterMode::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
    };
    f as i32
}

impl GlDevice {
    /// Wrap a current GL context
    pub fn new(gl: Rc<glow::Context>) -> Self {
        let max_texture_size =
            unsafe { gl.get_parameter_i32(glow::MAX_TEXTURE_SIZE) }.max(0) as u32;
        info!("GL device ready (max texture size {})", max_texture_size);
        Self {
            gl,
            shadows: RefCell::new(HashMap::new()),
            max_texture_size,
        }
    }

    /// Underlying context, for the buffer/program/framebuffer wrappers
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// Drain the GL error queue, reporting the first error
    fn check_error(&self, op: &'static str) -> Result<()> {
        let first = unsafe { self.gl.get_error() };
        if first == glow::NO_ERROR {
            return Ok(());
        }
        while unsafe { self.gl.get_error() } != glow::NO_ERROR {}
        Err(GfxError::device(op, format!("GL error 0x{:04X}", first)))
    }
}

impl GraphicsDevice for GlDevice {
    fn create_texture(&self, desc: &TextureDesc, data: Option<&[u8]>) -> Result<TextureHandle> {
        desc.validate()?;
        if self.max_texture_size != 0
            && (desc.width > self.max_texture_size || desc.height > self.max_texture_size)
        {
            return Err(GfxError::device(
                "create_texture",
                format!(
                    "{}x{} exceeds GL_MAX_TEXTURE_SIZE {}",
                    desc.width, desc.height, self.max_texture_size
                ),
            ));
        }
        let pixels = initial_pixels(desc, data)?;
        let (internal, format) = gl_format(desc.format);
        let gl = &self.gl;

        let tex = unsafe {
            let tex = gl
                .create_texture()
                .map_err(|e| GfxError::device("create_texture", e))?;

            gl.bind_texture(glow::TEXTURE_2D, Some(tex));
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, desc.alignment as i32);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal as i32,
                desc.width as i32,
                desc.height as i32,
                0,
                format,
                glow::UNSIGNED_BYTE,
                Some(&pixels),
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
            if desc.format == PixelFormat::Alpha {
                // Swizzle: R -> A so shaders can sample coverage from .a
                gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_SWIZZLE_A, glow::RED as i32);
            }
            gl.bind_texture(glow::TEXTURE_2D, None);
            tex
        };

        if let Err(e) = self.check_error("create_texture") {
            unsafe { gl.delete_texture(tex) };
            return Err(e);
        }

        let handle = TextureHandle(tex.0);
        self.shadows
            .borrow_mut()
            .insert(handle, Shadow { desc: *desc, pixels });

        debug!(
            "GL texture {} created: {}x{} {:?}",
            handle.id(),
            desc.width,
            desc.height,
            desc.format
        );
        Ok(handle)
    }

    fn upload_sub_region(
        &self,
        texture: TextureHandle,
        region: Region,
        format: PixelFormat,
        bytes: &[u8],
    ) -> Result<()> {
        let mut shadows = self.shadows.borrow_mut();
        let shadow = shadows
            .get_mut(&texture)
            .ok_or_else(|| GfxError::device("upload_sub_region", "unknown texture"))?;
        let desc = shadow.desc;
        let staged = staged_region(&shadow.pixels, &desc, region, format, bytes)?;

        let (_, gl_fmt) = gl_format(format);
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, Some(to_gl(texture)));
            self.gl
                .pixel_store_i32(glow::UNPACK_ALIGNMENT, desc.alignment as i32);
            self.gl.tex_sub_image_2d(
                glow::TEXTURE_2D,
                0,
                region.x as i32,
                region.y as i32,
                region.width as i32,
                region.height as i32,
                gl_fmt,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(bytes),
            );
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
        // Shadow follows the GPU only once GL accepted the upload
        self.check_error("upload_sub_region")?;
        shadow.pixels = staged;
        Ok(())
    }

    fn read_all_pixels(&self, texture: TextureHandle) -> Result<Vec<u8>> {
        self.shadows
            .borrow()
            .get(&texture)
            .map(|s| s.pixels.clone())
            .ok_or_else(|| GfxError::device("read_all_pixels", "unknown texture"))
    }

    fn set_filter_mode(
        &self,
        texture: TextureHandle,
        min: FilterMode,
        mag: FilterMode,
    ) -> Result<()> {
        if mag.uses_mipmaps() {
            return Err(GfxError::device(
                "set_filter_mode",
                format!("{:?} is not a magnification filter", mag),
            ));
        }
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, Some(to_gl(texture)));
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, gl_filter(min));
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, gl_filter(mag));
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
        self.check_error("set_filter_mode")
    }

    fn generate_mipmaps(&self, texture: TextureHandle) -> Result<()> {
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, Some(to_gl(texture)));
            self.gl.generate_mipmap(glow::TEXTURE_2D);
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
        self.check_error("generate_mipmaps")
    }

    fn destroy(&self, texture: TextureHandle) {
        if self.shadows.borrow_mut().remove(&texture).is_some() {
            unsafe { self.gl.delete_texture(to_gl(texture)) };
        }
    }
}
