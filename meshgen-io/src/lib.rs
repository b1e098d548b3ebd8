//! File formats for meshgen
//!
//! Plain-text point clouds in, OBJ or plain triangle lists out.

pub mod mesh;
pub mod points;

pub use mesh::{write_mesh, write_mesh_file, write_obj, write_triangle_list, MeshFormat};
pub use points::{read_point_file, read_points, write_point_file, write_points, Delimiter};
