//! 2D math shared between the scene graph, colliders and renderers.
//!
//! Rotations are expressed in degrees, clockwise in screen space, matching what the
//! renderer collaborators expect for sprites.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 2D Vector - positions, scales, directions
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vec2 {
    /// Creates a new Vec2
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Vector with both components set to `v`
    #[must_use]
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v)
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Unit scale
    pub const ONE: Self = Self::new(1.0, 1.0);

    /// Unit X vector
    pub const X: Self = Self::new(1.0, 0.0);

    /// Unit Y vector
    pub const Y: Self = Self::new(0.0, 1.0);

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Length squared (avoids sqrt)
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Length
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Distance to another point
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Rotates around the origin by `degrees`.
    #[must_use]
    pub fn rotated(self, degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Component-wise product.
    #[must_use]
    pub fn scaled(self, scale: Self) -> Self {
        Self::new(self.x * scale.x, self.y * scale.y)
    }

    /// Mean of both components. Used to reduce a non-uniform scale to a radius factor.
    #[must_use]
    pub fn average(self) -> f32 {
        self.dot(Self::ONE) / 2.0
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl From<[f32; 2]> for Vec2 {
    fn from(arr: [f32; 2]) -> Self {
        Self::new(arr[0], arr[1])
    }
}

/// Transform - position + non-uniform scale + rotation (degrees)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Transform2 {
    /// Position
    pub position: Vec2,
    /// Scale (per axis)
    pub scale: Vec2,
    /// Rotation in degrees
    pub rotation: f32,
}

impl Transform2 {
    /// Creates a new transform
    #[must_use]
    pub const fn new(position: Vec2, scale: Vec2, rotation: f32) -> Self {
        Self { position, scale, rotation }
    }

    /// Identity transform
    pub const IDENTITY: Self = Self::new(Vec2::ZERO, Vec2::ONE, 0.0);

    /// Maps a point expressed relative to this transform into the parent space.
    ///
    /// The offset is rotated first, then scaled per axis, then translated.
    #[must_use]
    pub fn transform_point(&self, local: Vec2) -> Vec2 {
        self.position + local.rotated(self.rotation).scaled(self.scale)
    }

    /// Composes `self` (a parent's global transform) with a child's local transform.
    #[must_use]
    pub fn compose(&self, local: &Self) -> Self {
        Self {
            position: self.transform_point(local.position),
            scale: self.scale.scaled(local.scale),
            rotation: self.rotation + local.rotation,
        }
    }

    /// Unit vector the transform is facing (local +X).
    #[must_use]
    pub fn forward(&self) -> Vec2 {
        Vec2::X.rotated(self.rotation)
    }

    /// Unit vector to the transform's right (local +Y).
    #[must_use]
    pub fn right(&self) -> Vec2 {
        Vec2::Y.rotated(self.rotation)
    }
}

impl Default for Transform2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn test_vec2_rotation_quarter_turn() {
        let v = Vec2::new(1.0, 0.0).rotated(90.0);
        assert!(approx(v, Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn test_compose_rotates_then_scales() {
        let parent = Transform2::new(Vec2::new(10.0, 0.0), Vec2::new(2.0, 3.0), 90.0);
        let child = Transform2::new(Vec2::new(1.0, 0.0), Vec2::new(0.5, 2.0), 15.0);

        let global = parent.compose(&child);
        // (1,0) rotated 90 -> (0,1), scaled (2,3) -> (0,3), plus parent position
        assert!(approx(global.position, Vec2::new(10.0, 3.0)));
        assert!(approx(global.scale, Vec2::new(1.0, 6.0)));
        assert!((global.rotation - 105.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_identity_compose_is_local() {
        let local = Transform2::new(Vec2::new(3.0, -4.0), Vec2::new(2.0, 2.0), 30.0);
        assert_eq!(Transform2::IDENTITY.compose(&local), local);
    }

    #[test]
    fn test_average_scale() {
        assert!((Vec2::new(1.0, 3.0).average() - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_transform_bytemuck() {
        let t = Transform2::IDENTITY;
        let bytes: &[u8] = bytemuck::bytes_of(&t);
        assert_eq!(bytes.len(), 20); // 5 * 4 bytes
    }

    #[test]
    fn test_vec2_from_config() {
        #[derive(Deserialize)]
        struct Spawn {
            at: Vec2,
        }
        let spawn: Spawn = toml::from_str("at = { x = 1.5, y = -2.0 }").unwrap();
        assert_eq!(spawn.at, Vec2::new(1.5, -2.0));
    }
}
