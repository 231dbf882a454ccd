use serde::{
    Deserialize,
    Serialize,
};

use crate::voxel::BlockFace;

/// Orientation of a block in quarter turns about the X, Y and Z axis.
///
/// A rotation is applied to the block in the order Z, Y, X, i.e. the block
/// is first turned about its Z axis. Turns are counter-clockwise when looking
/// down the positive axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rotation {
    x: u8,
    y: u8,
    z: u8,
}

impl Rotation {
    pub const IDENTITY: Self = Self { x: 0, y: 0, z: 0 };

    pub fn new(x: u8, y: u8, z: u8) -> Self {
        Self {
            x: x % 4,
            y: y % 4,
            z: z % 4,
        }
    }

    /// Rotation from angles in degrees. Returns `None` unless all angles are
    /// multiples of 90.
    pub fn from_degrees(x: i32, y: i32, z: i32) -> Option<Self> {
        let quarter_turns = |degrees: i32| {
            (degrees % 90 == 0).then(|| degrees.div_euclid(90).rem_euclid(4) as u8)
        };
        Some(Self::new(
            quarter_turns(x)?,
            quarter_turns(y)?,
            quarter_turns(z)?,
        ))
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn quarter_turns(&self) -> [u8; 3] {
        [self.x, self.y, self.z]
    }

    /// Where the block's own `face` points to after rotating the block.
    pub fn rotate_face(&self, face: BlockFace) -> BlockFace {
        let face = repeat(face, self.z, turn_z);
        let face = repeat(face, self.y, turn_y);
        repeat(face, self.x, turn_x)
    }

    /// Which of the block's own faces points towards `world_face` after
    /// rotating the block.
    pub fn local_face(&self, world_face: BlockFace) -> BlockFace {
        let face = repeat(world_face, (4 - self.x) % 4, turn_x);
        let face = repeat(face, (4 - self.y) % 4, turn_y);
        repeat(face, (4 - self.z) % 4, turn_z)
    }
}

impl From<[u8; 3]> for Rotation {
    fn from([x, y, z]: [u8; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Rotation> for [u8; 3] {
    fn from(rotation: Rotation) -> Self {
        rotation.quarter_turns()
    }
}

fn repeat(face: BlockFace, turns: u8, turn: fn(BlockFace) -> BlockFace) -> BlockFace {
    (0..turns).fold(face, |face, _| turn(face))
}

fn turn_x(face: BlockFace) -> BlockFace {
    match face {
        BlockFace::Up => BlockFace::Back,
        BlockFace::Back => BlockFace::Down,
        BlockFace::Down => BlockFace::Front,
        BlockFace::Front => BlockFace::Up,
        BlockFace::Right | BlockFace::Left => face,
    }
}

fn turn_y(face: BlockFace) -> BlockFace {
    match face {
        BlockFace::Right => BlockFace::Front,
        BlockFace::Front => BlockFace::Left,
        BlockFace::Left => BlockFace::Back,
        BlockFace::Back => BlockFace::Right,
        BlockFace::Up | BlockFace::Down => face,
    }
}

fn turn_z(face: BlockFace) -> BlockFace {
    match face {
        BlockFace::Right => BlockFace::Up,
        BlockFace::Up => BlockFace::Left,
        BlockFace::Left => BlockFace::Down,
        BlockFace::Down => BlockFace::Right,
        BlockFace::Back | BlockFace::Front => face,
    }
}
