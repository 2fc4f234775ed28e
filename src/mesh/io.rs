//! Mesh loading and saving
//!
//! Plain whitespace-separated text:
//!
//! ```text
//! <count> <has_tex> <has_colour>
//! <x> <y> <z>          (count lines)
//! <r> <g> <b> <a>      (count lines, only if has_colour != 0)
//! <u> <v>              (count lines, only if has_tex != 0)
//! ```
//!
//! Loaded meshes are always triangle lists. Vertices without colors are white.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::str::{FromStr, SplitWhitespace};

use super::{Mesh, MeshError, PrimitiveType};
use crate::rasterizer::{Color, Vec2, Vec4};

/// Load a mesh from a text file. Any missing or malformed value fails the
/// whole load; a partial mesh is never returned.
pub fn load_mesh<P: AsRef<Path>>(path: P) -> Result<Mesh, MeshError> {
    let contents = fs::read_to_string(path)?;
    load_mesh_from_str(&contents)
}

/// Save a mesh in the text format. Positions are written without w.
pub fn save_mesh<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<(), MeshError> {
    fs::write(path, mesh_to_string(mesh))?;
    Ok(())
}

/// Parse a mesh from text already in memory
pub fn load_mesh_from_str(s: &str) -> Result<Mesh, MeshError> {
    let mut tokens = Tokens::new(s);

    let count: usize = tokens.next("vertex count")?;
    let has_tex = tokens.next::<i64>("texture flag")? != 0;
    let has_colour = tokens.next::<i64>("colour flag")? != 0;

    // Every vertex needs input text, so the count from the header never
    // reserves more than the input could fill
    let reserve = count.min(s.len());

    let mut positions = Vec::with_capacity(reserve);
    for _ in 0..count {
        let x = tokens.next("x")?;
        let y = tokens.next("y")?;
        let z = tokens.next("z")?;
        positions.push(Vec4::new(x, y, z, 1.0));
    }

    let colors = if has_colour {
        let mut colors = Vec::with_capacity(reserve);
        for _ in 0..count {
            let r = tokens.next("red")?;
            let g = tokens.next("green")?;
            let b = tokens.next("blue")?;
            let a = tokens.next("alpha")?;
            colors.push(Color::with_alpha(r, g, b, a));
        }
        colors
    } else {
        vec![Color::WHITE; count]
    };

    let tex_coords = if has_tex {
        let mut uvs = Vec::with_capacity(reserve);
        for _ in 0..count {
            let u = tokens.next("u")?;
            let v = tokens.next("v")?;
            uvs.push(Vec2::new(u, v));
        }
        Some(uvs)
    } else {
        None
    };

    Mesh::new(PrimitiveType::Triangles, positions, colors, tex_coords)
}

/// Serialize a mesh to the text format
pub fn mesh_to_string(mesh: &Mesh) -> String {
    let tex_coords = mesh.tex_coords();
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "{} {} 1", mesh.vertex_count(), tex_coords.is_some() as u8);
    for p in mesh.positions() {
        let _ = writeln!(out, "{} {} {}", p.x, p.y, p.z);
    }
    for c in mesh.colors() {
        let _ = writeln!(out, "{} {} {} {}", c.r, c.g, c.b, c.a);
    }
    if let Some(uvs) = tex_coords {
        for uv in uvs {
            let _ = writeln!(out, "{} {}", uv.x, uv.y);
        }
    }

    out
}

/// Whitespace tokenizer with per-field error messages
struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
    position: usize,
}

impl<'a> Tokens<'a> {
    fn new(s: &'a str) -> Self {
        Self { inner: s.split_whitespace(), position: 0 }
    }

    fn next<T: FromStr>(&mut self, what: &str) -> Result<T, MeshError> {
        self.position += 1;
        let token = self.inner.next().ok_or_else(|| {
            MeshError::ParseError(format!("unexpected end of file reading {} (token {})", what, self.position))
        })?;
        token.parse().map_err(|_| {
            MeshError::ParseError(format!("invalid {} '{}' (token {})", what, token, self.position))
        })
    }
}
