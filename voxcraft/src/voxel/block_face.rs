use nalgebra::{
    Point2,
    Point3,
    Vector3,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::voxel::block_type::FaceGroup;

/// Orientation of a block face, named by the direction its normal points to.
///
/// The declaration order is the order in which the mesher emits the faces of
/// a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockFace {
    /// +Y
    Up,
    /// -Y
    Down,
    /// +Z
    Back,
    /// -Z
    Front,
    /// +X
    Right,
    /// -X
    Left,
}

impl BlockFace {
    pub const ALL: [Self; 6] = [
        Self::Up,
        Self::Down,
        Self::Back,
        Self::Front,
        Self::Right,
        Self::Left,
    ];

    pub fn normal(&self) -> Vector3<i32> {
        match self {
            BlockFace::Up => Vector3::y(),
            BlockFace::Down => -Vector3::y(),
            BlockFace::Back => Vector3::z(),
            BlockFace::Front => -Vector3::z(),
            BlockFace::Right => Vector3::x(),
            BlockFace::Left => -Vector3::x(),
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            BlockFace::Up => BlockFace::Down,
            BlockFace::Down => BlockFace::Up,
            BlockFace::Back => BlockFace::Front,
            BlockFace::Front => BlockFace::Back,
            BlockFace::Right => BlockFace::Left,
            BlockFace::Left => BlockFace::Right,
        }
    }

    pub fn group(&self) -> FaceGroup {
        match self {
            BlockFace::Up => FaceGroup::Top,
            BlockFace::Down => FaceGroup::Bottom,
            BlockFace::Back | BlockFace::Front | BlockFace::Right | BlockFace::Left => {
                FaceGroup::Side
            }
        }
    }

    /// Corners of this face of the unit cube at `cell`.
    ///
    /// Corners are counter-clockwise when looking at the face from outside
    /// the cube. For side faces the first corner is the bottom-left one.
    pub fn vertices(&self, cell: Point3<i32>) -> [Point3<i32>; 4] {
        match self {
            BlockFace::Up => [[0, 1, 0], [0, 1, 1], [1, 1, 1], [1, 1, 0]],
            BlockFace::Down => [[0, 0, 0], [1, 0, 0], [1, 0, 1], [0, 0, 1]],
            BlockFace::Back => [[0, 0, 1], [1, 0, 1], [1, 1, 1], [0, 1, 1]],
            BlockFace::Front => [[1, 0, 0], [0, 0, 0], [0, 1, 0], [1, 1, 0]],
            BlockFace::Right => [[1, 0, 1], [1, 0, 0], [1, 1, 0], [1, 1, 1]],
            BlockFace::Left => [[0, 0, 0], [0, 0, 1], [0, 1, 1], [0, 1, 0]],
        }
        .map(|offset| cell + Vector3::from(offset))
    }

    pub fn uvs(&self) -> [Point2<u16>; 4] {
        [[0, 1], [1, 1], [1, 0], [0, 0]].map(Into::into)
    }
}
