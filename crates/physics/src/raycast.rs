//! Ray/triangle intersection (Möller–Trumbore).

use glam::Vec3;

/// Below this the ray is treated as parallel to the triangle, and hits closer
/// than this to the origin are rejected.
pub const RAY_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Straight down from `origin`.
    pub fn down(origin: Vec3) -> Self {
        Self::new(origin, Vec3::NEG_Y)
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a ray/triangle query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Ray parameter of the hit (distance when the direction is unit length).
    pub distance: f32,
    /// World position of the hit.
    pub point: Vec3,
    /// Barycentric weights of the second and third vertex.
    pub barycentric: (f32, f32),
}

/// Intersect `ray` with triangle `(v0, v1, v2)`.
///
/// Returns `None` when the ray is parallel to the triangle's plane, passes
/// outside the triangle, or meets it at or behind the origin.
pub fn ray_triangle(ray: &Ray, [v0, v1, v2]: [Vec3; 3]) -> Option<RaycastHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < RAY_EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    if t > RAY_EPSILON {
        Some(RaycastHit {
            distance: t,
            point: ray.point_at(t),
            barycentric: (u, v),
        })
    } else {
        // Line intersection, but behind the ray origin.
        None
    }
}
