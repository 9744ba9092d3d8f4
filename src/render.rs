//! Hand-off of polygonized meshes to a Bevy renderer.

use bevy::{
    asset::RenderAssetUsages,
    mesh::{Indices, PrimitiveTopology},
};

use crate::mesh::Mesh;

/// Builds a triangle-list [`bevy::prelude::Mesh`] with positions, normals and
/// `u32` indices.
///
/// Meshes whose normals are indexed like their vertices (everything the
/// polygonizer and [`Mesh::weld`] produce) are uploaded as they are, other
/// meshes are unrolled to one vertex per triangle corner.
impl From<&Mesh> for bevy::prelude::Mesh {
    fn from(mesh: &Mesh) -> Self {
        let shared = mesh.vertex_indices == mesh.normal_indices
            && mesh.vertices.len() == mesh.normals.len();

        let (positions, normals, indices): (Vec<[f32; 3]>, Vec<[f32; 3]>, Vec<u32>) = if shared {
            (
                mesh.vertices.iter().map(|p| p.coords.cast::<f32>().into()).collect(),
                mesh.normals.iter().map(|n| n.cast::<f32>().into()).collect(),
                mesh.vertex_indices.iter().map(|&i| i as u32).collect(),
            )
        } else {
            (
                mesh.vertex_indices
                    .iter()
                    .map(|&i| mesh.vertices[i].coords.cast::<f32>().into())
                    .collect(),
                mesh.normal_indices
                    .iter()
                    .map(|&i| mesh.normals[i].cast::<f32>().into())
                    .collect(),
                (0..mesh.vertex_indices.len() as u32).collect(),
            )
        };

        let mut bevy_mesh = bevy::prelude::Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::RENDER_WORLD,
        );
        bevy_mesh.insert_attribute(bevy::prelude::Mesh::ATTRIBUTE_POSITION, positions);
        bevy_mesh.insert_attribute(bevy::prelude::Mesh::ATTRIBUTE_NORMAL, normals);
        bevy_mesh.insert_indices(Indices::U32(indices));
        bevy_mesh
    }
}
