//! Analytic ray/primitive intersection.
//!
//! Every test here is a pure function over borrowed, immutable geometry and
//! answers with the hit point or `None`. Degenerate input (a ray parallel to
//! a plane, a zero heading, a negative discriminant) is a miss rather than an
//! error, so one bad ray never stops a frame.
//!
//! Rays are half-lines: a hit with negative `t` is behind the origin and
//! does not count.

use glint_math::{Ray, Vec3};

use crate::{Disc, Sphere};

/// Intersect a ray with the infinite plane through `plane_origin`.
///
/// Solves `t = n . (p0 - O) / n . D`.
pub fn ray_plane(ray: &Ray, plane_origin: Vec3, plane_normal: Vec3) -> Option<Vec3> {
    let denominator = plane_normal.dot(ray.heading);
    if denominator == 0.0 {
        return None;
    }

    let t = plane_normal.dot(plane_origin - ray.origin) / denominator;
    if t < 0.0 || !t.is_finite() {
        return None;
    }

    Some(ray.at(t))
}

/// Intersect a ray with a disc (a plane bounded by a radius).
pub fn ray_disc(ray: &Ray, disc: &Disc) -> Option<Vec3> {
    let hit = ray_plane(ray, disc.origin(), disc.normal())?;
    (hit.distance(disc.origin()) <= disc.radius()).then_some(hit)
}

/// Intersect a ray with a sphere.
pub fn ray_sphere(ray: &Ray, sphere: &Sphere) -> Option<Vec3> {
    let t = sphere_root(ray, sphere.origin(), sphere.radius())?;
    Some(ray.at(t))
}

/// Ray parameter of the visible sphere hit.
///
/// Substituting `O + tD` into `|P - C|^2 = r^2` gives
/// `t = -m/n +- sqrt(q)` with `m = D . (O - C)`, `n = D . D` and
/// `q = (m/n)^2 + (r^2 - |O - C|^2) / n`.
///
/// When both roots are ahead of the origin the nearer one wins. When the
/// origin is inside the sphere the roots straddle zero and the far side
/// (positive root) is the hit. A root of exactly zero means the origin is on
/// the surface and counts as a hit at the origin.
pub fn sphere_root(ray: &Ray, center: Vec3, radius: f64) -> Option<f64> {
    let n = ray.heading.length_squared();
    if n == 0.0 {
        return None;
    }

    let oc = ray.origin - center;
    let m = ray.heading.dot(oc);
    let mid = -m / n;
    let q = mid * mid + (radius * radius - oc.length_squared()) / n;
    if !(q >= 0.0) {
        return None;
    }

    let s = q.sqrt();
    let (near, far) = (mid - s, mid + s);

    if near >= 0.0 {
        Some(near)
    } else if far >= 0.0 {
        Some(far)
    } else {
        // Sphere is entirely behind the origin
        None
    }
}
