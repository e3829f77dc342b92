//! GL buffer object

use glow::HasContext;

use crate::error::{GfxError, Result};

/// Buffer object with a tracked store size
///
/// `buffer_data` allocates the store, `buffer_sub_data` writes within it.
pub struct BufferObject {
    buffer: glow::Buffer,
    size_bytes: usize,
}

impl BufferObject {
    pub fn new(gl: &glow::Context) -> Result<Self> {
        let buffer = unsafe { gl.create_buffer() }
            .map_err(|e| GfxError::device("create_buffer", e))?;
        Ok(Self {
            buffer,
            size_bytes: 0,
        })
    }

    /// Data store size in bytes
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    pub fn raw(&self) -> glow::Buffer {
        self.buffer
    }

    /// Create and fill the data store
    pub fn buffer_data(&mut self, gl: &glow::Context, target: u32, data: &[u8], usage: u32) {
        self.size_bytes = data.len();
        unsafe {
            gl.bind_buffer(target, Some(self.buffer));
            gl.buffer_data_u8_slice(target, data, usage);
            gl.bind_buffer(target, None);
        }
    }

    /// Overwrite part of the existing store
    pub fn buffer_sub_data(
        &self,
        gl: &glow::Context,
        target: u32,
        offset: usize,
        data: &[u8],
    ) -> Result<()> {
        check_range(offset, data.len(), self.size_bytes)?;
        unsafe {
            gl.bind_buffer(target, Some(self.buffer));
            gl.buffer_sub_data_u8_slice(target, offset as i32, data);
            gl.bind_buffer(target, None);
        }
        Ok(())
    }

    /// Read `len` bytes starting at `offset` back from the store
    pub fn get_buffer_sub_data(
        &self,
        gl: &glow::Context,
        target: u32,
        offset: usize,
        len: usize,
    ) -> Result<Vec<u8>> {
        check_range(offset, len, self.size_bytes)?;
        if len == 0 {
            return Ok(Vec::new());
        }
        unsafe {
            gl.bind_buffer(target, Some(self.buffer));
            let ptr = gl.map_buffer_range(target, offset as i32, len as i32, glow::MAP_READ_BIT);
            if ptr.is_null() {
                gl.bind_buffer(target, None);
                return Err(GfxError::device("map_buffer_range", "mapping failed"));
            }
            let data = std::slice::from_raw_parts(ptr, len).to_vec();
            gl.unmap_buffer(target);
            gl.bind_buffer(target, None);
            Ok(data)
        }
    }

    /// Read the whole store back
    pub fn get_data(&self, gl: &glow::Context, target: u32) -> Result<Vec<u8>> {
        self.get_buffer_sub_data(gl, target, 0, self.size_bytes)
    }

    /// Bind to an indexed target (e.g. `glow::UNIFORM_BUFFER` binding point)
    pub fn bind_buffer_base(&self, gl: &glow::Context, target: u32, index: u32) {
        unsafe { gl.bind_buffer_base(target, index, Some(self.buffer)) };
    }

    pub fn bind(&self, gl: &glow::Context, target: u32) {
        unsafe { gl.bind_buffer(target, Some(self.buffer)) };
    }

    pub fn unbind(&self, gl: &glow::Context, target: u32) {
        unsafe { gl.bind_buffer(target, None) };
    }

    /// Release resources
    pub fn destroy(&mut self, gl: &glow::Context) {
        unsafe { gl.delete_buffer(self.buffer) };
        self.size_bytes = 0;
    }
}

fn check_range(offset: usize, len: usize, size: usize) -> Result<()> {
    let end = offset.saturating_add(len);
    if end > size {
        return Err(GfxError::BufferOutOfBounds { end, size });
    }
    Ok(())
}
