//! Mesh module - geometry the rasterizer consumes
//!
//! A mesh is a primitive type tag plus parallel per-vertex arrays:
//! - homogeneous positions
//! - colors
//! - optional texture coordinates
//!
//! Meshes come from the procedural generators in `generate` or from the
//! whitespace-separated text format in `io`.

#![allow(dead_code)]

mod generate;
mod io;

pub use io::*;

use crate::rasterizer::{Color, Vec2, Vec4};
use serde::{Deserialize, Serialize};

/// How consecutive vertices are assembled into primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveType {
    /// One pixel per vertex
    Points,
    /// Independent segments from vertex pairs (0-1, 2-3, ...)
    Lines,
    /// Independent triangles from vertex triples
    Triangles,
    /// Closed polyline through every vertex
    LineLoop,
}

/// Error type for mesh construction and loading
#[derive(Debug)]
pub enum MeshError {
    IoError(std::io::Error),
    ParseError(String),
    LengthMismatch { attribute: &'static str, expected: usize, found: usize },
}

impl From<std::io::Error> for MeshError {
    fn from(e: std::io::Error) -> Self {
        MeshError::IoError(e)
    }
}

impl std::fmt::Display for MeshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshError::IoError(e) => write!(f, "IO error: {}", e),
            MeshError::ParseError(e) => write!(f, "Parse error: {}", e),
            MeshError::LengthMismatch { attribute, expected, found } => write!(
                f,
                "{} has {} entries, expected {} (one per vertex)",
                attribute, found, expected
            ),
        }
    }
}

impl std::error::Error for MeshError {}

/// Vertex data for one drawable primitive set
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    primitive: PrimitiveType,
    positions: Vec<Vec4>,
    colors: Vec<Color>,
    tex_coords: Option<Vec<Vec2>>,
}

impl Mesh {
    /// Build a mesh, checking that every attribute array has one entry per vertex
    pub fn new(
        primitive: PrimitiveType,
        positions: Vec<Vec4>,
        colors: Vec<Color>,
        tex_coords: Option<Vec<Vec2>>,
    ) -> Result<Self, MeshError> {
        let expected = positions.len();
        if colors.len() != expected {
            return Err(MeshError::LengthMismatch { attribute: "colors", expected, found: colors.len() });
        }
        if let Some(uvs) = &tex_coords {
            if uvs.len() != expected {
                return Err(MeshError::LengthMismatch { attribute: "tex_coords", expected, found: uvs.len() });
            }
        }

        Ok(Self { primitive, positions, colors, tex_coords })
    }

    pub fn primitive(&self) -> PrimitiveType {
        self.primitive
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[Vec4] {
        &self.positions
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn tex_coords(&self) -> Option<&[Vec2]> {
        self.tex_coords.as_deref()
    }
}
