// crates/branchmap-core/src/geometry/projection.rs
use super::topology::Feature;
use geo::{Area, Centroid, Coord, CoordsIter, MapCoords, MultiPolygon};
use std::f64::consts::FRAC_PI_4;
use std::fmt::Write;

/// Latitude clamp that keeps Mercator finite.
const MAX_LATITUDE: f64 = 85.051_128_78;

/// Spherical Mercator fitted to a viewport.
///
/// `fit_size` picks one uniform scale so the features' projected bounds fill
/// `width x height`, then centres them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub scale: f64,
    pub translate: [f64; 2],
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: [0.0, 0.0],
        }
    }
}

/// Unscaled Mercator: x grows east, y grows south (screen orientation).
fn mercator_raw(Coord { x: lon, y: lat }: Coord) -> [f64; 2] {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = lon.to_radians();
    let y = -(FRAC_PI_4 + lat / 2.0).tan().ln();
    [x, y]
}

impl Projection {
    pub fn fit_size(width: f64, height: f64, features: &[Feature]) -> Self {
        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for c in features.iter().flat_map(|f| f.geometry.coords_iter()) {
            let [x, y] = mercator_raw(c);
            min = [min[0].min(x), min[1].min(y)];
            max = [max[0].max(x), max[1].max(y)];
        }
        if !min[0].is_finite() {
            return Self::default();
        }

        let span = [max[0] - min[0], max[1] - min[1]];
        let scale = match (span[0] > 0.0, span[1] > 0.0) {
            (true, true) => (width / span[0]).min(height / span[1]),
            (true, false) => width / span[0],
            (false, true) => height / span[1],
            (false, false) => 1.0,
        };
        let translate = [
            (width - scale * (max[0] + min[0])) / 2.0,
            (height - scale * (max[1] + min[1])) / 2.0,
        ];
        Self { scale, translate }
    }

    /// `[lon, lat]` to viewport coordinates.
    pub fn project(&self, p: impl Into<Coord>) -> Coord {
        let [x, y] = mercator_raw(p.into());
        Coord {
            x: x * self.scale + self.translate[0],
            y: y * self.scale + self.translate[1],
        }
    }

    /// SVG path data for all polygons of a feature.
    pub fn path_data(&self, geometry: &MultiPolygon<f64>) -> String {
        let mut d = String::new();
        let rings = geometry
            .iter()
            .flat_map(|poly| std::iter::once(poly.exterior()).chain(poly.interiors()));
        for ring in rings {
            for (i, c) in ring.coords().enumerate() {
                let Coord { x, y } = self.project(*c);
                let cmd = if i == 0 { 'M' } else { 'L' };
                let _ = write!(d, "{cmd}{x:.2},{y:.2}");
            }
            if !ring.0.is_empty() {
                d.push('Z');
            }
        }
        d
    }

    /// Label anchor: centroid of the largest polygon, measured after
    /// projection so the label sits where the shape is drawn.
    pub fn centroid(&self, geometry: &MultiPolygon<f64>) -> Option<[f64; 2]> {
        geometry
            .iter()
            .filter_map(|poly| {
                let projected = poly.map_coords(|c| self.project(c));
                let centre = projected.centroid()?;
                Some((projected.unsigned_area(), centre))
            })
            .max_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, p)| [p.x(), p.y()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Polygon};

    fn square_polygon(x0: f64, y0: f64, size: f64) -> Polygon<f64> {
        polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
        ]
    }

    fn square(name: &str, x0: f64, y0: f64, size: f64) -> Feature {
        Feature {
            name: name.to_owned(),
            geometry: MultiPolygon::new(vec![square_polygon(x0, y0, size)]),
        }
    }

    #[test]
    fn fit_size_fills_the_viewport() {
        let features = [square("A", 70.0, 10.0, 20.0)];
        let proj = Projection::fit_size(600.0, 600.0, &features);

        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for c in features[0].geometry.coords_iter() {
            let p = proj.project(c);
            xs.push(p.x);
            ys.push(p.y);
        }
        let (min_x, max_x) = (xs.iter().cloned().fold(f64::INFINITY, f64::min), xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max));
        let (min_y, max_y) = (ys.iter().cloned().fold(f64::INFINITY, f64::min), ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max));

        // Taller than wide in Mercator: height is the binding dimension.
        assert!((max_y - min_y - 600.0).abs() < 1e-6);
        assert!(min_y.abs() < 1e-6);
        // Horizontally centred.
        assert!(((min_x + max_x) / 2.0 - 300.0).abs() < 1e-6);
    }

    #[test]
    fn north_is_up() {
        let features = [square("A", 70.0, 10.0, 20.0)];
        let proj = Projection::fit_size(600.0, 600.0, &features);
        let south = proj.project([80.0, 10.0]);
        let north = proj.project([80.0, 30.0]);
        assert!(north.y < south.y);
    }

    #[test]
    fn centroid_picks_largest_polygon() {
        let mut f = square("Main", 70.0, 10.0, 20.0);
        f.geometry.0.push(square_polygon(95.0, 10.0, 1.0));
        let proj = Projection::fit_size(600.0, 600.0, std::slice::from_ref(&f));
        let [cx, _] = proj.centroid(&f.geometry).unwrap();
        let main_mid = proj.project([80.0, 20.0]).x;
        assert!((cx - main_mid).abs() < 1e-6);
    }

    #[test]
    fn path_data_closes_each_ring() {
        let f = square("A", 70.0, 10.0, 20.0);
        let proj = Projection::fit_size(100.0, 100.0, std::slice::from_ref(&f));
        let d = proj.path_data(&f.geometry);
        assert!(d.starts_with('M'));
        assert!(d.ends_with('Z'));
        assert_eq!(d.matches('L').count(), 4);
    }

    #[test]
    fn empty_input_keeps_identity() {
        assert_eq!(Projection::fit_size(10.0, 10.0, &[]), Projection::default());
    }
}
