//! Text drawing renderer
//!
//! Combine glyph atlas, text mesh and shader
//! to render text on GPU

use glow::HasContext;
use log::{debug, info};

use super::gl_device::to_gl;
use super::shader::{ortho_projection, ShaderProgram};
use super::vao::VertexArray;
use crate::error::Result;
use crate::font::{FontAtlas, TextMesh};

/// Vertex attribute layout: position(2) + atlas texel(2)
const TEXT_LAYOUT: [i32; 2] = [2, 2];

/// Text renderer
///
/// The atlas must have been built on a [`GlDevice`](super::GlDevice) sharing
/// this context.
pub struct TextRenderer {
    shader: ShaderProgram,
    vao: VertexArray,
}

impl TextRenderer {
    /// Create text renderer
    pub fn new(gl: &glow::Context) -> Result<Self> {
        let shader = ShaderProgram::text(gl)?;
        let vao = match VertexArray::new(gl, glow::TRIANGLES, &TEXT_LAYOUT) {
            Ok(vao) => vao,
            Err(e) => {
                shader.destroy(gl);
                return Err(e);
            }
        };
        info!("Text renderer initialized");
        Ok(Self { shader, vao })
    }

    /// Draw `mesh` sampled from `atlas`
    ///
    /// `viewport` is the target size in pixels; mesh positions are
    /// bottom-left origin. `color` is straight RGBA (0.0-1.0).
    pub fn draw(
        &mut self,
        gl: &glow::Context,
        atlas: &FontAtlas,
        mesh: &TextMesh,
        color: [f32; 4],
        viewport: (u32, u32),
    ) -> Result<()> {
        self.vao.load(gl, mesh.as_floats(), glow::DYNAMIC_DRAW)?;

        let projection = ortho_projection(viewport.0 as f32, viewport.1 as f32);

        unsafe {
            // Premultiplied alpha blending
            gl.enable(glow::BLEND);
            gl.blend_func(glow::ONE, glow::ONE_MINUS_SRC_ALPHA);
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(to_gl(atlas.texture())));
        }

        self.shader.bind(gl);
        let uniforms = self
            .shader
            .set_mat4(gl, "u_projection", &projection)
            .and_then(|_| self.shader.set_i32(gl, "u_atlas", &[0]))
            .and_then(|_| {
                self.shader
                    .set_f32(gl, "u_atlas_size", &[atlas.width() as f32, atlas.height() as f32])
            })
            .and_then(|_| self.shader.set_f32(gl, "u_color", &color));

        if uniforms.is_ok() {
            self.vao.draw(gl);
            debug!("Drew {} glyphs", mesh.glyph_count());
        }

        self.shader.unbind(gl);
        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, None);
            gl.disable(glow::BLEND);
        }
        uniforms
    }

    /// Release resources
    pub fn destroy(&mut self, gl: &glow::Context) {
        self.vao.destroy(gl);
        self.shader.destroy(gl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::layout::FLOATS_PER_VERTEX;

    #[test]
    fn test_layout_matches_vertex() {
        assert_eq!(TEXT_LAYOUT.iter().sum::<i32>() as usize, FLOATS_PER_VERTEX);
    }
}
