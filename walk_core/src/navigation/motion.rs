use ultraviolet::Vec3;
use walk_scene::Bounds;

use super::{CameraState, MoveFlags, Orientation};
use crate::cvars::Tuning;

/// Below this, the horizontal part of a view vector is treated as gone and
/// the yaw-only heading is used instead. Looking straight up or down lands
/// here, since `cos(FRAC_PI_2)` isn't exactly zero in f32.
const FLATTEN_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParams {
    /// Units per second.
    pub speed: f32,
    pub eye_height: f32,
}

impl From<&Tuning> for MotionParams {
    fn from(tuning: &Tuning) -> Self {
        Self {
            speed: tuning.walk_speed,
            eye_height: tuning.eye_height,
        }
    }
}

impl Default for MotionParams {
    fn default() -> Self {
        Self::from(&Tuning::default())
    }
}

fn flatten(v: Vec3) -> Option<Vec3> {
    let horizontal = Vec3::new(v.x, 0., v.z);
    let len = horizontal.mag();

    (len > FLATTEN_EPSILON).then(|| horizontal / len)
}

/// Forward and right, projected onto the floor and normalized.
pub fn walk_axes(orientation: &Orientation) -> (Vec3, Vec3) {
    let forward = flatten(orientation.forward()).unwrap_or_else(|| orientation.heading());
    let right = flatten(orientation.right()).unwrap_or_else(|| orientation.heading_right());

    (forward, right)
}

/// One integration step.
///
/// Walking happens on the floor plane: pitch never changes speed or height.
/// Diagonal input is normalized so it isn't faster than a single direction,
/// and opposite directions cancel out. The result is clamped to `bounds`
/// (if any) and pinned to the eye height.
pub fn step(
    position: Vec3,
    orientation: &Orientation,
    moves: MoveFlags,
    dt: f32,
    bounds: Option<&Bounds>,
    params: &MotionParams,
) -> Vec3 {
    let (forward, right) = walk_axes(orientation);

    let mut raw = Vec3::zero();
    if moves.contains(MoveFlags::FORWARD) {
        raw += forward;
    }
    if moves.contains(MoveFlags::BACKWARD) {
        raw -= forward;
    }
    if moves.contains(MoveFlags::RIGHT) {
        raw += right;
    }
    if moves.contains(MoveFlags::LEFT) {
        raw -= right;
    }

    let mut next = position;

    let len = raw.mag();
    if len > 0. && dt > 0. {
        let delta = raw * (params.speed * dt / len);
        next.x += delta.x;
        next.z += delta.z;
    }

    if let Some(bounds) = bounds {
        next = bounds.clamp(next);
    }
    next.y = params.eye_height;

    next
}

/// Advances `camera` by `dt` seconds of `moves`.
pub fn integrate(
    camera: &mut CameraState,
    moves: MoveFlags,
    dt: f32,
    bounds: Option<&Bounds>,
    params: &MotionParams,
) {
    camera.position = step(
        camera.position,
        &camera.orientation(),
        moves,
        dt,
        bounds,
        params,
    );
}
