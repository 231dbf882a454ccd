use nalgebra::Point3;

use crate::voxel::{
    grid::VoxelGrid,
    mesh::{
        BoundaryOpacity,
        Face,
    },
};

/// Emits every face of every block that is not covered by an opaque
/// neighbour.
///
/// `boundary` is asked about positions just outside the grid's box (in local
/// coordinates). Faces on the boundary are only culled if it answers
/// [`BoundaryOpacity::Opaque`].
///
/// Faces are ordered by cell position and then by [`BlockFace::ALL`].
///
/// [`BlockFace::ALL`]: crate::voxel::BlockFace::ALL
#[profiling::function]
pub fn naive_mesh<B>(grid: &VoxelGrid, boundary: B) -> Vec<Face>
where
    B: Fn(Point3<i32>) -> BoundaryOpacity,
{
    let block_types = grid.block_types();
    let mut faces = Vec::new();

    for (point, cell) in grid.iter() {
        let Some(textures) = &block_types[cell.block_type].textures
        else {
            continue;
        };

        for neighbor in grid.neighbors(point) {
            let is_covered = if neighbor.inside {
                grid.is_opaque(neighbor.position)
            }
            else {
                boundary(neighbor.position).hides_face()
            };

            if !is_covered {
                let group = cell.rotation.local_face(neighbor.face).group();
                faces.push(Face {
                    position: grid.origin() + point.coords,
                    face: neighbor.face,
                    block_type: cell.block_type,
                    texture: textures.get(group).clone(),
                });
            }
        }
    }

    faces
}
