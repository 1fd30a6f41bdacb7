use crate::{
    core::{
        constants::MAX_POINT_RADIUS,
        geo::Point,
        projection::MercatorProjection,
        scale::SqrtScale,
    },
    data::geojson::GeoPoint,
    rendering::surface::RenderSurface,
};

/// Screen-space shape of one point: a circle of fixed pixel radius around
/// its projected position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VectorPath {
    pub center: Point,
    pub radius: f64,
}

impl VectorPath {
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn contains(&self, point: &Point) -> bool {
        self.radius > 0.0 && self.center.distance_to(point) <= self.radius
    }

    /// SVG path data for the circle, drawn as two arcs.
    pub fn path_data(&self) -> String {
        let r = self.radius;
        format!(
            "M{},{}m0,{}a{},{} 0 1,1 0,{}a{},{} 0 1,1 0,{}z",
            self.center.x,
            self.center.y,
            r,
            r,
            r,
            -2.0 * r,
            r,
            r,
            2.0 * r
        )
    }
}

/// One path per data point, re-projected on every view change.
///
/// Every redraw re-projects all points; comfortable up to a few thousand.
#[derive(Debug, Clone)]
pub struct VectorOverlay {
    points: Vec<GeoPoint>,
    paths: Vec<VectorPath>,
    radius_scale: SqrtScale,
    radius_range: (f64, f64),
}

impl VectorOverlay {
    pub fn new(radius_range: (f64, f64)) -> Self {
        Self {
            points: Vec::new(),
            paths: Vec::new(),
            radius_scale: SqrtScale::new(0.0, radius_range),
            radius_range,
        }
    }

    /// Replaces the overlay's points, fixing the weight → radius scale from
    /// the largest weight. Records with a non-finite position or weight are
    /// dropped. Returns the number of paths created.
    pub fn initialize(&mut self, points: Vec<GeoPoint>) -> usize {
        let before = points.len();
        self.points = points.into_iter().filter(GeoPoint::is_well_formed).collect();
        if self.points.len() != before {
            log::warn!("dropped {} malformed points", before - self.points.len());
        }

        let max_weight = self
            .points
            .iter()
            .map(|p| p.magnitude)
            .fold(0.0_f64, f64::max);
        self.radius_scale = SqrtScale::new(max_weight, self.radius_range);

        let unit = MercatorProjection::unit();
        self.paths = self
            .points
            .iter()
            .map(|p| VectorPath::new(unit.project(p.position), self.radius_scale.apply(p.magnitude)))
            .collect();
        self.paths.len()
    }

    /// Re-projects every path with `projection` and pushes it to the surface.
    pub fn redraw(&mut self, projection: &MercatorProjection, surface: &mut dyn RenderSurface) {
        for (id, (point, path)) in self.points.iter().zip(self.paths.iter_mut()).enumerate() {
            path.center = projection.project(point.position);
            surface.draw_path(id, path);
        }
    }

    pub fn radius_of(&self, weight: f64) -> f64 {
        self.radius_scale.apply(weight)
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn paths(&self) -> &[VectorPath] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Topmost point whose circle contains `screen`. Later points draw on top.
    pub fn hit_test(&self, screen: &Point) -> Option<usize> {
        self.paths.iter().rposition(|path| path.contains(screen))
    }
}

impl Default for VectorOverlay {
    fn default() -> Self {
        Self::new((0.0, MAX_POINT_RADIUS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::geo::LngLat, rendering::scene::SceneGraph};

    fn quake(lng: f64, lat: f64, mag: f64) -> GeoPoint {
        GeoPoint::new(LngLat::new(lng, lat), mag)
    }

    #[test]
    fn test_radius_from_max_weight() {
        let mut overlay = VectorOverlay::default();
        overlay.initialize(vec![quake(0.0, 0.0, 1.0), quake(1.0, 1.0, 4.0)]);
        assert_eq!(overlay.paths()[1].radius, 10.0);
        assert_eq!(overlay.paths()[0].radius, 5.0);
        assert_eq!(overlay.radius_of(0.0), 0.0);
    }

    #[test]
    fn test_radius_is_monotonic() {
        let mut overlay = VectorOverlay::default();
        overlay.initialize(vec![quake(0.0, 0.0, 6.3)]);
        let weights = [0.0, 0.1, 0.5, 1.0, 2.2, 3.9, 5.0, 6.3];
        for pair in weights.windows(2) {
            assert!(overlay.radius_of(pair[0]) <= overlay.radius_of(pair[1]));
        }
    }

    #[test]
    fn test_empty_overlay() {
        let mut overlay = VectorOverlay::default();
        assert_eq!(overlay.initialize(Vec::new()), 0);
        let mut scene = SceneGraph::default();
        overlay.redraw(&MercatorProjection::unit(), &mut scene);
        assert!(scene.paths().is_empty());
    }

    #[test]
    fn test_malformed_points_dropped() {
        let mut overlay = VectorOverlay::default();
        let created = overlay.initialize(vec![quake(f64::NAN, 0.0, 1.0), quake(0.0, 0.0, f64::INFINITY), quake(3.0, 4.0, 2.0)]);
        assert_eq!(created, 1);
        assert_eq!(overlay.points()[0].position, LngLat::new(3.0, 4.0));
    }

    #[test]
    fn test_redraw_updates_in_place() {
        let mut overlay = VectorOverlay::default();
        overlay.initialize(vec![quake(-119.665, 37.414, 4.0), quake(-118.0, 34.0, 1.0)]);
        let mut scene = SceneGraph::default();

        let mut projection = MercatorProjection::unit();
        projection.set_scale_and_translate(16384.0 / crate::core::constants::TAU, 100.0, 200.0);
        overlay.redraw(&projection, &mut scene);
        overlay.redraw(&projection, &mut scene);

        assert_eq!(overlay.len(), 2);
        assert_eq!(scene.paths().len(), 2);
        assert_eq!(scene.stats().path_updates, 4);
        assert_eq!(scene.paths()[&0], overlay.paths()[0]);
        assert_eq!(overlay.paths()[0].center, projection.project(LngLat::new(-119.665, 37.414)));
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut overlay = VectorOverlay::default();
        overlay.initialize(vec![quake(0.0, 0.0, 4.0), quake(0.0, 0.0, 4.0), quake(90.0, 0.0, 0.0)]);
        let projection = MercatorProjection::new(100.0, Point::new(500.0, 500.0));
        overlay.redraw(&projection, &mut SceneGraph::default());

        assert_eq!(overlay.hit_test(&Point::new(503.0, 504.0)), Some(1));
        assert_eq!(overlay.hit_test(&Point::new(520.0, 500.0)), None);
        // zero radius points are never hit
        let far = projection.project(LngLat::new(90.0, 0.0));
        assert_eq!(overlay.hit_test(&far), None);
    }
}
