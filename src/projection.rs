//! Fisheye projection of 4D points into a 3D screen volume.
//!
//! Each non-forward view axis contributes one screen coordinate: the angle
//! between screen-up and `(d_axis, d_depth)`, signed by `d_axis`, divided by
//! [`RETINA`].

use crate::rotation::ViewFrame;
use cgmath::{Deg, InnerSpace, Vector2, Vector3, Vector4};

/// Angular compression divisor, in degrees per screen unit.
pub const RETINA: f32 = 70.0;
/// Points nearer than this are drawn at full size.
pub const NEAR_FADE: f32 = 1.0;
/// Points farther than this are not drawn.
pub const FAR_FADE: f32 = 1.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// `(right, ana, up)` angles over [`RETINA`].
    pub screen: Vector3<f32>,
    /// Depth fade in `[0, 1]`; zero for points behind the viewer.
    pub radius: f32,
}

pub fn project(point: Vector4<f32>, observer: Vector4<f32>, frame: &ViewFrame) -> Projection {
    let relative = point - observer;
    let depth = remap(relative, frame.forward);
    let radius = if depth < 0.0 {
        0.0
    } else {
        depth_fade(relative.magnitude())
    };
    let screen = Vector3::new(
        screen_angle(remap(relative, frame.right), depth),
        screen_angle(remap(relative, frame.ana), depth),
        screen_angle(remap(relative, frame.up), depth),
    );
    Projection { screen, radius }
}

/// `|proj_axis(relative) + axis| - 1`; roughly the signed extent along
/// `axis`, folded back past one unit behind.
pub fn remap(relative: Vector4<f32>, axis: Vector4<f32>) -> f32 {
    if axis.magnitude2() <= f32::EPSILON {
        return 0.0;
    }
    (relative.project_on(axis) + axis).magnitude() - 1.0
}

pub fn depth_fade(distance: f32) -> f32 {
    if distance > FAR_FADE {
        0.0
    } else if distance > NEAR_FADE {
        (FAR_FADE - distance) / (FAR_FADE - NEAR_FADE)
    } else {
        1.0
    }
}

/// Unsigned angle from screen-up in degrees, negated when `lateral < 0`,
/// over [`RETINA`]. A zero-length pair gives 0.
fn screen_angle(lateral: f32, depth: f32) -> f32 {
    let angle: Deg<f32> = Vector2::unit_y().angle(Vector2::new(lateral, depth)).into();
    let unsigned = angle.0.abs();
    let signed = if lateral < 0.0 { -unsigned } else { unsigned };
    signed / RETINA
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::{OrientationFrame, Turn};

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn aligned() -> ViewFrame {
        ViewFrame::from(OrientationFrame::AXIS_ALIGNED)
    }

    #[test]
    fn observer_at_point_is_finite_and_full_size() {
        let p = Vector4::new(0.3, -0.2, 0.1, 0.5);
        let projection = project(p, p, &aligned());
        assert_eq!(projection.radius, 1.0);
        assert_eq!(projection.screen, Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn straight_ahead_is_screen_centre() {
        let projection = project(Vector4::new(0.0, 0.0, 0.0, 0.8), Vector4::new(0.0, 0.0, 0.0, 0.0), &aligned());
        assert_eq!(projection.radius, 1.0);
        assert!(close(projection.screen.x, 0.0));
        assert!(close(projection.screen.y, 0.0));
        assert!(close(projection.screen.z, 0.0));
    }

    #[test]
    fn points_behind_are_clipped() {
        let projection = project(Vector4::new(0.2, 0.0, 0.0, -0.5), Vector4::new(0.0, 0.0, 0.0, 0.0), &aligned());
        assert_eq!(projection.radius, 0.0);
    }

    #[test]
    fn diagonal_lands_at_forty_five_degrees() {
        let observer = Vector4::new(0.0, 0.0, 0.0, 0.0);
        let right = project(Vector4::new(0.5, 0.0, 0.0, 0.5), observer, &aligned());
        assert!(close(right.screen.x, 45.0 / RETINA));
        assert!(close(right.screen.y, 0.0));
        let down = project(Vector4::new(0.0, -0.5, 0.0, 0.5), observer, &aligned());
        assert!(close(down.screen.z, -45.0 / RETINA));
        let ana = project(Vector4::new(0.0, 0.0, 0.5, 0.5), observer, &aligned());
        assert!(close(ana.screen.y, 45.0 / RETINA));
    }

    #[test]
    fn fade_is_linear_between_thresholds() {
        assert_eq!(depth_fade(0.0), 1.0);
        assert_eq!(depth_fade(1.0), 1.0);
        assert!(close(depth_fade(1.25), 0.5));
        assert_eq!(depth_fade(1.5), 0.0);
        assert_eq!(depth_fade(2.0), 0.0);
    }

    #[test]
    fn projection_follows_the_turned_frame() {
        let frame = ViewFrame::from(OrientationFrame::AXIS_ALIGNED.turned(Turn::Right));
        let observer = Vector4::new(0.0, 0.0, 0.0, 0.0);
        let ahead = project(Vector4::new(-0.7, 0.0, 0.0, 0.0), observer, &frame);
        assert_eq!(ahead.radius, 1.0);
        assert!(close(ahead.screen.x, 0.0));
        let old_ahead = project(Vector4::new(0.0, 0.0, 0.0, 0.7), observer, &frame);
        assert!(close(old_ahead.screen.x, 90.0 / RETINA));
    }
}
