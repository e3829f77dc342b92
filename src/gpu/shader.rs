//! Shader management
//!
//! GLSL ES 3.00 shader compilation, linking and uniform upload

use glow::HasContext;
use log::{debug, info};

use crate::error::{GfxError, Result};

/// Text rendering vertex shader (GLSL ES 3.00)
///
/// Input:
///   a_pos: Vertex position (pixels, bottom-left origin)
///   a_tex: Atlas texel coordinate
/// Uniform:
///   u_projection: Orthographic projection matrix
///   u_atlas_size: Atlas size in texels
pub const TEXT_VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

layout(location = 0) in vec2 a_pos;
layout(location = 1) in vec2 a_tex;

uniform mat4 u_projection;
uniform vec2 u_atlas_size;

out vec2 v_uv;

void main() {
    gl_Position = u_projection * vec4(a_pos, 0.0, 1.0);
    v_uv = a_tex / u_atlas_size;
}
"#;

/// Text rendering fragment shader
///
/// Atlas R channel is glyph coverage. Output is premultiplied alpha.
pub const TEXT_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

in vec2 v_uv;

uniform sampler2D u_atlas;
uniform vec4 u_color;

out vec4 frag_color;

void main() {
    float alpha = texture(u_atlas, v_uv).r * u_color.a;
    frag_color = vec4(u_color.rgb * alpha, alpha);
}
"#;

/// Linked shader program
pub struct ShaderProgram {
    program: glow::Program,
}

impl ShaderProgram {
    /// Compile both stages and link
    pub fn new(gl: &glow::Context, vertex_src: &str, fragment_src: &str) -> Result<Self> {
        let program = compile_program(gl, vertex_src, fragment_src)?;
        debug!("Shader program linked");
        Ok(Self { program })
    }

    /// Program used by the text renderer
    pub fn text(gl: &glow::Context) -> Result<Self> {
        let shader = Self::new(gl, TEXT_VERTEX_SHADER, TEXT_FRAGMENT_SHADER)?;
        info!("Text shader compiled");
        Ok(shader)
    }

    pub fn program(&self) -> glow::Program {
        self.program
    }

    /// Activate the program
    pub fn bind(&self, gl: &glow::Context) {
        unsafe { gl.use_program(Some(self.program)) };
    }

    pub fn unbind(&self, gl: &glow::Context) {
        unsafe { gl.use_program(None) };
    }

    fn location(&self, gl: &glow::Context, name: &str) -> Result<glow::UniformLocation> {
        unsafe { gl.get_uniform_location(self.program, name) }.ok_or_else(|| {
            GfxError::InvalidUniform {
                name: name.to_string(),
                reason: "not found in program".to_string(),
            }
        })
    }

    /// Upload a float/vec2/vec3/vec4 uniform
    ///
    /// The program must be bound.
    pub fn set_f32(&self, gl: &glow::Context, name: &str, values: &[f32]) -> Result<()> {
        check_components(name, values.len())?;
        let loc = self.location(gl, name)?;
        let loc = Some(&loc);
        unsafe {
            match *values {
                [x] => gl.uniform_1_f32(loc, x),
                [x, y] => gl.uniform_2_f32(loc, x, y),
                [x, y, z] => gl.uniform_3_f32(loc, x, y, z),
                [x, y, z, w] => gl.uniform_4_f32(loc, x, y, z, w),
                _ => {}
            }
        }
        Ok(())
    }

    /// Upload an int/ivec2/ivec3/ivec4 (or sampler) uniform
    pub fn set_i32(&self, gl: &glow::Context, name: &str, values: &[i32]) -> Result<()> {
        check_components(name, values.len())?;
        let loc = self.location(gl, name)?;
        let loc = Some(&loc);
        unsafe {
            match *values {
                [x] => gl.uniform_1_i32(loc, x),
                [x, y] => gl.uniform_2_i32(loc, x, y),
                [x, y, z] => gl.uniform_3_i32(loc, x, y, z),
                [x, y, z, w] => gl.uniform_4_i32(loc, x, y, z, w),
                _ => {}
            }
        }
        Ok(())
    }

    /// Upload a uint/uvec2/uvec3/uvec4 uniform
    pub fn set_u32(&self, gl: &glow::Context, name: &str, values: &[u32]) -> Result<()> {
        check_components(name, values.len())?;
        let loc = self.location(gl, name)?;
        let loc = Some(&loc);
        unsafe {
            match *values {
                [x] => gl.uniform_1_u32(loc, x),
                [x, y] => gl.uniform_2_u32(loc, x, y),
                [x, y, z] => gl.uniform_3_u32(loc, x, y, z),
                [x, y, z, w] => gl.uniform_4_u32(loc, x, y, z, w),
                _ => {}
            }
        }
        Ok(())
    }

    /// Upload a column-major mat4
    pub fn set_mat4(&self, gl: &glow::Context, name: &str, matrix: &[f32; 16]) -> Result<()> {
        let loc = self.location(gl, name)?;
        unsafe { gl.uniform_matrix_4_f32_slice(Some(&loc), false, matrix) };
        Ok(())
    }

    /// Release resources
    pub fn destroy(&self, gl: &glow::Context) {
        unsafe { gl.delete_program(self.program) };
    }
}

fn check_components(name: &str, count: usize) -> Result<()> {
    if (1..=4).contains(&count) {
        return Ok(());
    }
    Err(GfxError::InvalidUniform {
        name: name.to_string(),
        reason: format!("{} components (expected 1-4)", count),
    })
}

/// Generate orthographic projection matrix (bottom-left origin)
///
/// Map pixel coordinates (0,0)-(width,height) with y up
/// to NDC (-1,-1)-(1,1)
pub fn ortho_projection(width: f32, height: f32) -> [f32; 16] {
    let l = 0.0_f32;
    let r = width;
    let b = 0.0_f32;
    let t = height;
    let n = -1.0_f32;
    let f = 1.0_f32;

    // Column-major (OpenGL convention)
    [
        2.0 / (r - l),
        0.0,
        0.0,
        0.0,
        0.0,
        2.0 / (t - b),
        0.0,
        0.0,
        0.0,
        0.0,
        -2.0 / (f - n),
        0.0,
        -(r + l) / (r - l),
        -(t + b) / (t - b),
        -(f + n) / (f - n),
        1.0,
    ]
}

fn stage_name(shader_type: u32) -> &'static str {
    match shader_type {
        glow::VERTEX_SHADER => "vertex",
        glow::FRAGMENT_SHADER => "fragment",
        _ => "unknown",
    }
}

/// Compile shader and link program
fn compile_program(
    gl: &glow::Context,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<glow::Program> {
    unsafe {
        let vs = compile_shader(gl, glow::VERTEX_SHADER, vertex_src)?;
        let fs = match compile_shader(gl, glow::FRAGMENT_SHADER, fragment_src) {
            Ok(fs) => fs,
            Err(e) => {
                gl.delete_shader(vs);
                return Err(e);
            }
        };

        let program = match gl.create_program() {
            Ok(p) => p,
            Err(e) => {
                gl.delete_shader(vs);
                gl.delete_shader(fs);
                return Err(GfxError::device("create_program", e));
            }
        };

        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        gl.link_program(program);

        // Shader objects no longer needed after linking
        gl.detach_shader(program, vs);
        gl.detach_shader(program, fs);
        gl.delete_shader(vs);
        gl.delete_shader(fs);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            return Err(GfxError::ProgramLink(log));
        }

        Ok(program)
    }
}

/// Compile individual shader
fn compile_shader(gl: &glow::Context, shader_type: u32, source: &str) -> Result<glow::Shader> {
    unsafe {
        let shader = gl
            .create_shader(shader_type)
            .map_err(|e| GfxError::device("create_shader", e))?;

        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(GfxError::ShaderCompile {
                stage: stage_name(shader_type),
                log,
            });
        }

        Ok(shader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(m: &[f32; 16], x: f32, y: f32) -> (f32, f32) {
        (m[0] * x + m[4] * y + m[12], m[1] * x + m[5] * y + m[13])
    }

    #[test]
    fn test_ortho_bottom_left_origin() {
        let m = ortho_projection(800.0, 600.0);
        assert_eq!(apply(&m, 0.0, 0.0), (-1.0, -1.0));
        assert_eq!(apply(&m, 800.0, 600.0), (1.0, 1.0));
        assert_eq!(apply(&m, 400.0, 300.0), (0.0, 0.0));
    }

    #[test]
    fn test_component_count() {
        for n in 1..=4 {
            assert!(check_components("u_color", n).is_ok());
        }
        assert!(matches!(
            check_components("u_color", 0),
            Err(GfxError::InvalidUniform { .. })
        ));
        let err = check_components("u_color", 5).unwrap_err();
        assert!(err.to_string().contains("u_color"));
    }

    #[test]
    fn test_stage_name() {
        assert_eq!(stage_name(glow::VERTEX_SHADER), "vertex");
        assert_eq!(stage_name(glow::FRAGMENT_SHADER), "fragment");
    }

    #[test]
    fn test_text_shader_uniforms_declared() {
        for name in ["u_projection", "u_atlas_size"] {
            assert!(TEXT_VERTEX_SHADER.contains(name));
        }
        for name in ["u_atlas", "u_color"] {
            assert!(TEXT_FRAGMENT_SHADER.contains(name));
        }
    }
}
