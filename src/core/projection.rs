use std::f64::consts::PI;

use crate::core::{
    constants::{POLE_EPSILON, TAU},
    geo::{LngLat, Point},
    transform::ViewTransform,
};

/// Spherical Web Mercator projection parameterized by a scale (pixels per
/// radian) and a translation (where longitude 0 / latitude 0 lands).
///
/// With scale `1 / TAU` the whole globe is one unit wide, so a view transform
/// with scale `k` corresponds to projection scale `k / TAU`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MercatorProjection {
    scale: f64,
    translate: Point,
}

impl MercatorProjection {
    pub fn new(scale: f64, translate: Point) -> Self {
        Self { scale, translate }
    }

    /// Projection whose plane is one unit around, centered on the origin.
    pub fn unit() -> Self {
        Self::new(1.0 / TAU, Point::default())
    }

    /// Projection matching a view transform.
    pub fn for_view(transform: &ViewTransform) -> Self {
        Self::new(transform.k / TAU, Point::new(transform.x, transform.y))
    }

    /// Replaces the scale and translation. Has no other effect.
    pub fn set_scale_and_translate(&mut self, scale: f64, translate_x: f64, translate_y: f64) {
        self.scale = scale;
        self.translate = Point::new(translate_x, translate_y);
    }

    /// Re-parameterizes the projection for a view transform.
    pub fn set_view(&mut self, transform: &ViewTransform) {
        self.set_scale_and_translate(transform.k / TAU, transform.x, transform.y);
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate(&self) -> Point {
        self.translate
    }

    /// Projects a geographic coordinate onto the plane.
    ///
    /// Latitudes at or beyond the poles are pulled just inside them so the
    /// result stays finite; every other latitude projects exactly.
    pub fn project(&self, position: LngLat) -> Point {
        let lambda = position.lng.to_radians();
        let limit = PI / 2.0 - POLE_EPSILON;
        let phi = position.lat.to_radians().clamp(-limit, limit);
        let y = (PI / 4.0 + phi / 2.0).tan().ln();

        Point::new(
            lambda * self.scale + self.translate.x,
            self.translate.y - y * self.scale,
        )
    }

    /// Inverse of [`project`](Self::project).
    pub fn invert(&self, point: Point) -> LngLat {
        let lambda = (point.x - self.translate.x) / self.scale;
        let y = (self.translate.y - point.y) / self.scale;
        let phi = 2.0 * y.exp().atan() - PI / 2.0;

        LngLat::new(lambda.to_degrees(), phi.to_degrees())
    }
}

impl Default for MercatorProjection {
    fn default() -> Self {
        Self::unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_projects_to_translate() {
        let projection = MercatorProjection::new(100.0, Point::new(12.0, -7.0));
        let p = projection.project(LngLat::new(0.0, 0.0));
        assert!((p.x - 12.0).abs() < 1e-12);
        assert!((p.y + 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_unit_projection_spans_one_unit() {
        let projection = MercatorProjection::unit();
        let west = projection.project(LngLat::new(-180.0, 0.0));
        let east = projection.project(LngLat::new(180.0, 0.0));
        assert!((east.x - west.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_north_is_up() {
        let projection = MercatorProjection::unit();
        let north = projection.project(LngLat::new(0.0, 45.0));
        assert!(north.y < 0.0);
    }

    #[test]
    fn test_round_trip() {
        let mut projection = MercatorProjection::unit();
        projection.set_scale_and_translate(16384.0 / TAU, 1234.5, -987.25);

        for lng in [-180.0, -119.665, -45.5, 0.0, 33.3, 179.9] {
            for lat in [-89.9, -85.0, -60.0, -1.5, 0.0, 37.414, 80.0, 86.0, 88.0, 89.9] {
                let back = projection.invert(projection.project(LngLat::new(lng, lat)));
                assert!((back.lng - lng).abs() < 1e-9, "lng {lng} -> {}", back.lng);
                assert!((back.lat - lat).abs() < 1e-9, "lat {lat} -> {}", back.lat);
            }
        }
    }

    #[test]
    fn test_poles_stay_finite() {
        let projection = MercatorProjection::unit();
        for lat in [90.0, -90.0, 120.0] {
            let p = projection.project(LngLat::new(10.0, lat));
            assert!(p.x.is_finite() && p.y.is_finite());
        }
    }

    #[test]
    fn test_high_latitudes_stay_distinct() {
        let projection = MercatorProjection::unit();
        let ys: Vec<f64> = [85.0, 85.06, 86.0, 88.0, 89.9]
            .iter()
            .map(|lat| projection.project(LngLat::new(0.0, *lat)).y)
            .collect();
        for pair in ys.windows(2) {
            assert!(pair[1] < pair[0]);
        }
    }

    #[test]
    fn test_set_scale_and_translate_is_idempotent() {
        let mut a = MercatorProjection::unit();
        a.set_scale_and_translate(5.0, 1.0, 2.0);
        let once = a;
        a.set_scale_and_translate(5.0, 1.0, 2.0);
        assert_eq!(once, a);
    }
}
