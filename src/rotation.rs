use crate::grid::Direction;
use cgmath::{InnerSpace, Vector4, VectorSpace};
use std::fmt;

/// A 90° turn in the plane of `forward` and one of the other three axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Turn {
    Right,
    Left,
    Up,
    Down,
    Ana,
    Kata,
}

impl Turn {
    pub const ALL: [Turn; 6] = [
        Turn::Right,
        Turn::Left,
        Turn::Up,
        Turn::Down,
        Turn::Ana,
        Turn::Kata,
    ];

    pub fn inverse(self) -> Turn {
        match self {
            Turn::Right => Turn::Left,
            Turn::Left => Turn::Right,
            Turn::Up => Turn::Down,
            Turn::Down => Turn::Up,
            Turn::Ana => Turn::Kata,
            Turn::Kata => Turn::Ana,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Turn::Right => "right",
            Turn::Left => "left",
            Turn::Up => "up",
            Turn::Down => "down",
            Turn::Ana => "ana",
            Turn::Kata => "kata",
        }
    }
}

/// Discrete observer orientation. Each axis is an axis-aligned unit step and
/// the four axes always lie on four distinct grid axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OrientationFrame {
    pub right: Direction,
    pub up: Direction,
    pub ana: Direction,
    pub forward: Direction,
}

impl OrientationFrame {
    pub const AXIS_ALIGNED: OrientationFrame = OrientationFrame {
        right: Direction::PosX,
        up: Direction::PosY,
        ana: Direction::PosZ,
        forward: Direction::PosW,
    };

    /// Swaps `forward` with the turned-toward axis, flipping one sign.
    pub fn turned(self, turn: Turn) -> OrientationFrame {
        let mut next = self;
        match turn {
            Turn::Right => {
                next.right = self.forward;
                next.forward = -self.right;
            }
            Turn::Left => {
                next.right = -self.forward;
                next.forward = self.right;
            }
            Turn::Up => {
                next.up = self.forward;
                next.forward = -self.up;
            }
            Turn::Down => {
                next.up = -self.forward;
                next.forward = self.up;
            }
            Turn::Ana => {
                next.ana = self.forward;
                next.forward = -self.ana;
            }
            Turn::Kata => {
                next.ana = -self.forward;
                next.forward = self.ana;
            }
        }
        next
    }

    /// `(right, up, ana, forward)`
    pub fn axes(&self) -> [Direction; 4] {
        [self.right, self.up, self.ana, self.forward]
    }

    /// The six principal directions other than forward and backward.
    pub fn side_directions(&self) -> [Direction; 6] {
        [
            self.right,
            -self.right,
            self.up,
            -self.up,
            self.ana,
            -self.ana,
        ]
    }

    pub fn is_orthonormal(&self) -> bool {
        let axes = self.axes().map(Direction::axis);
        (0..4).all(|i| (i + 1..4).all(|j| axes[i] != axes[j]))
    }

    /// Turns that bring `forward` onto `direction`, in application order.
    pub fn turns_to_face(&self, direction: Direction) -> Vec<Turn> {
        if direction == self.forward {
            Vec::new()
        } else if direction == -self.forward {
            vec![Turn::Right, Turn::Right]
        } else if direction == self.right {
            vec![Turn::Left]
        } else if direction == -self.right {
            vec![Turn::Right]
        } else if direction == self.up {
            vec![Turn::Down]
        } else if direction == -self.up {
            vec![Turn::Up]
        } else if direction == self.ana {
            vec![Turn::Kata]
        } else {
            vec![Turn::Ana]
        }
    }
}

impl Default for OrientationFrame {
    fn default() -> Self {
        Self::AXIS_ALIGNED
    }
}

impl fmt::Display for OrientationFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({};{};{};{})", self.right, self.up, self.ana, self.forward)
    }
}

/// Continuous frame used for display while a turn is in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewFrame {
    pub right: Vector4<f32>,
    pub up: Vector4<f32>,
    pub ana: Vector4<f32>,
    pub forward: Vector4<f32>,
}

impl ViewFrame {
    /// Per-axis lerp followed by renormalisation. Not a true rotation: the
    /// axes stay unit length but are only approximately orthogonal mid-turn.
    pub fn blend(from: &OrientationFrame, to: &OrientationFrame, t: f32) -> ViewFrame {
        let t = t.clamp(0.0, 1.0);
        ViewFrame {
            right: blend_axis(from.right, to.right, t),
            up: blend_axis(from.up, to.up, t),
            ana: blend_axis(from.ana, to.ana, t),
            forward: blend_axis(from.forward, to.forward, t),
        }
    }

    pub fn axes(&self) -> [Vector4<f32>; 4] {
        [self.right, self.up, self.ana, self.forward]
    }
}

impl From<OrientationFrame> for ViewFrame {
    fn from(frame: OrientationFrame) -> Self {
        ViewFrame {
            right: frame.right.to_vector(),
            up: frame.up.to_vector(),
            ana: frame.ana.to_vector(),
            forward: frame.forward.to_vector(),
        }
    }
}

fn blend_axis(from: Direction, to: Direction, t: f32) -> Vector4<f32> {
    let blended = from.to_vector().lerp(to.to_vector(), t);
    if blended.magnitude2() <= 1e-8 {
        return to.to_vector();
    }
    blended.normalize()
}
