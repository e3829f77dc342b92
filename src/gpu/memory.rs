//! Headless graphics device
//!
//! Keeps textures in CPU memory. Used by the CLI to build and export atlases
//! without a GL context, and by tests to observe what the font core uploads.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;

use super::device::{
    copy_region, initial_pixels, FilterMode, GraphicsDevice, PixelFormat, Region, TextureDesc,
    TextureHandle,
};
use crate::error::{GfxError, Result};

/// Snapshot of one texture's state
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    pub desc: TextureDesc,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    /// Number of mip levels including level 0
    pub mip_levels: u32,
}

struct MemoryTexture {
    info: TextureInfo,
    pixels: Vec<u8>,
}

#[derive(Default)]
struct State {
    next_id: u32,
    textures: HashMap<TextureHandle, MemoryTexture>,
    created: usize,
}

/// CPU-side [`GraphicsDevice`]
#[derive(Default)]
pub struct MemoryDevice {
    state: Mutex<State>,
    /// Largest accepted width/height (0 = unlimited)
    max_texture_size: u32,
}

impl MemoryDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject textures wider or taller than `max`, like GL_MAX_TEXTURE_SIZE
    pub fn with_max_texture_size(max: u32) -> Self {
        Self {
            max_texture_size: max,
            ..Self::default()
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Total textures ever created
    pub fn created_count(&self) -> usize {
        self.lock().created
    }

    /// Textures created and not yet destroyed
    pub fn live_count(&self) -> usize {
        self.lock().textures.len()
    }

    pub fn texture_info(&self, texture: TextureHandle) -> Option<TextureInfo> {
        self.lock().textures.get(&texture).map(|t| t.info.clone())
    }
}

fn mip_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

impl GraphicsDevice for MemoryDevice {
    fn create_texture(&self, desc: &TextureDesc, data: Option<&[u8]>) -> Result<TextureHandle> {
        desc.validate()?;
        if self.max_texture_size != 0
            && (desc.width > self.max_texture_size || desc.height > self.max_texture_size)
        {
            return Err(GfxError::device(
                "create_texture",
                format!(
                    "{}x{} exceeds max texture size {}",
                    desc.width, desc.height, self.max_texture_size
                ),
            ));
        }

        let pixels = initial_pixels(desc, data)?;

        let mut state = self.lock();
        state.next_id += 1;
        let id = NonZeroU32::new(state.next_id)
            .ok_or_else(|| GfxError::device("create_texture", "texture names exhausted"))?;
        let handle = TextureHandle(id);
        state.textures.insert(
            handle,
            MemoryTexture {
                info: TextureInfo {
                    desc: *desc,
                    min_filter: FilterMode::default(),
                    mag_filter: FilterMode::default(),
                    mip_levels: 1,
                },
                pixels,
            },
        );
        state.created += 1;

        debug!(
            "MemoryDevice: texture {} created {}x{} {:?}",
            id, desc.width, desc.height, desc.format
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
        let mut state = self.lock();
        let tex = state
            .textures
            .get_mut(&texture)
            .ok_or_else(|| GfxError::device("upload_sub_region", "unknown texture"))?;
        let desc = tex.info.desc;
        copy_region(&mut tex.pixels, &desc, region, format, bytes)
    }

    fn read_all_pixels(&self, texture: TextureHandle) -> Result<Vec<u8>> {
        self.lock()
            .textures
            .get(&texture)
            .map(|t| t.pixels.clone())
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
        let mut state = self.lock();
        let tex = state
            .textures
            .get_mut(&texture)
            .ok_or_else(|| GfxError::device("set_filter_mode", "unknown texture"))?;
        tex.info.min_filter = min;
        tex.info.mag_filter = mag;
        Ok(())
    }

    fn generate_mipmaps(&self, texture: TextureHandle) -> Result<()> {
        let mut state = self.lock();
        let tex = state
            .textures
            .get_mut(&texture)
            .ok_or_else(|| GfxError::device("generate_mipmaps", "unknown texture"))?;
        tex.info.mip_levels = mip_count(tex.info.desc.width, tex.info.desc.height);
        Ok(())
    }

    fn destroy(&self, texture: TextureHandle) {
        if self.lock().textures.remove(&texture).is_some() {
            debug!("MemoryDevice: texture {} destroyed", texture.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_desc(width: u32, height: u32) -> TextureDesc {
        TextureDesc {
            width,
            height,
            format: PixelFormat::Alpha,
            alignment: 1,
        }
    }

    #[test]
    fn test_create_and_read_back() {
        let dev = MemoryDevice::new();
        let data: Vec<u8> = (0..12).collect();
        let tex = dev.create_texture(&alpha_desc(4, 3), Some(&data)).unwrap();
        assert_eq!(dev.read_all_pixels(tex).unwrap(), data);
        assert_eq!(dev.live_count(), 1);
    }

    #[test]
    fn test_create_rejects_wrong_length() {
        let dev = MemoryDevice::new();
        let err = dev.create_texture(&alpha_desc(4, 3), Some(&[0u8; 5]));
        assert!(matches!(err, Err(GfxError::DeviceUpload { .. })));
        assert_eq!(dev.created_count(), 0);
    }

    #[test]
    fn test_max_texture_size() {
        let dev = MemoryDevice::with_max_texture_size(8);
        assert!(dev.create_texture(&alpha_desc(8, 8), None).is_ok());
        assert!(dev.create_texture(&alpha_desc(9, 1), None).is_err());
    }

    #[test]
    fn test_upload_sub_region() {
        let dev = MemoryDevice::new();
        let tex = dev.create_texture(&alpha_desc(4, 4), None).unwrap();
        dev.upload_sub_region(tex, Region::new(1, 2, 2, 2), PixelFormat::Alpha, &[1, 2, 3, 4])
            .unwrap();
        let px = dev.read_all_pixels(tex).unwrap();
        assert_eq!(&px[8..12], &[0, 1, 2, 0]);
        assert_eq!(&px[12..16], &[0, 3, 4, 0]);
    }

    #[test]
    fn test_upload_sub_region_out_of_range() {
        let dev = MemoryDevice::new();
        let tex = dev.create_texture(&alpha_desc(4, 4), None).unwrap();
        let err = dev.upload_sub_region(tex, Region::new(3, 3, 2, 1), PixelFormat::Alpha, &[1, 2]);
        assert!(err.is_err());
        let err = dev.upload_sub_region(tex, Region::new(0, 0, 1, 1), PixelFormat::Rgba, &[0; 4]);
        assert!(err.is_err());
    }

    #[test]
    fn test_filters_and_mipmaps() {
        let dev = MemoryDevice::new();
        let tex = dev.create_texture(&alpha_desc(16, 4), None).unwrap();
        dev.set_filter_mode(tex, FilterMode::LinearMipmapNearest, FilterMode::Nearest)
            .unwrap();
        dev.generate_mipmaps(tex).unwrap();
        let info = dev.texture_info(tex).unwrap();
        assert_eq!(info.min_filter, FilterMode::LinearMipmapNearest);
        assert_eq!(info.mag_filter, FilterMode::Nearest);
        assert_eq!(info.mip_levels, 5);
        assert!(dev
            .set_filter_mode(tex, FilterMode::Linear, FilterMode::LinearMipmapLinear)
            .is_err());
    }

    #[test]
    fn test_destroy() {
        let dev = MemoryDevice::new();
        let tex = dev.create_texture(&alpha_desc(1, 1), None).unwrap();
        dev.destroy(tex);
        dev.destroy(tex);
        assert_eq!(dev.live_count(), 0);
        assert_eq!(dev.created_count(), 1);
        assert!(dev.read_all_pixels(tex).is_err());
    }
}
