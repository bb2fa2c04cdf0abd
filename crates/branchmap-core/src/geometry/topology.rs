// crates/branchmap-core/src/geometry/topology.rs

//! TopoJSON decoding.
//!
//! A topology stores every boundary once in a shared `arcs` table; polygons
//! reference arcs by index (`!i` means arc `i` reversed). Quantized
//! topologies delta-encode arc positions and carry a `transform`.

use crate::error::{Result, SelectorError};
use crate::loader::common_io;
use geo::{LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Property keys holding a region (state) name, in lookup order.
pub const REGION_NAME_KEYS: &[&str] = &["ST_NM", "NAME_1"];
/// Property keys holding a district name, in lookup order.
pub const DISTRICT_NAME_KEYS: &[&str] = &["NAME_2", "DISTRICT", "name"];
/// Name given to features that carry none of the expected keys.
pub const UNKNOWN_NAME: &str = "Unknown";

/// `[longitude, latitude]`
type Position = [f64; 2];

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum TopoGeometry {
    GeometryCollection {
        #[serde(default)]
        geometries: Vec<TopoGeometry>,
    },
    Polygon {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        properties: Map<String, Value>,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
        #[serde(default)]
        properties: Map<String, Value>,
    },
    /// Points, lines and anything else the selector does not draw.
    #[serde(other)]
    Unsupported,
}

/// A decoded TopoJSON document.
#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<Transform>,
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,
    /// Kept as a map so object order (the "first object") is preserved.
    pub objects: Map<String, Value>,
}

/// A named polygonal feature in longitude/latitude.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

impl Topology {
    /// Parse a topology from raw (optionally gzip-compressed) bytes.
    ///
    /// Any failure is a [`SelectorError::DatasetLoad`]: the selector treats a
    /// malformed response exactly like a failed request.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let reader = common_io::open_bytes(bytes)
            .map_err(|e| SelectorError::DatasetLoad(format!("unreadable topology: {e}")))?;
        let topo: Topology = serde_json::from_reader(reader)
            .map_err(|e| SelectorError::DatasetLoad(format!("topology parse error: {e}")))?;
        Ok(topo)
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.objects.keys().map(String::as_str)
    }

    /// Decode the features of one object. `None` selects the first object,
    /// which is how per-region topologies (whose object name varies) are read.
    pub fn features(&self, object: Option<&str>, name_keys: &[&str]) -> Result<Vec<Feature>> {
        let (object_name, value) = match object {
            Some(name) => self
                .objects
                .get(name)
                .map(|v| (name, v))
                .ok_or_else(|| SelectorError::DatasetLoad(format!("object '{name}' not found in topology")))?,
            None => self
                .objects
                .iter()
                .next()
                .map(|(k, v)| (k.as_str(), v))
                .ok_or_else(|| SelectorError::DatasetLoad("topology has no objects".into()))?,
        };

        let geometry: TopoGeometry = serde_json::from_value(value.clone()).map_err(|e| {
            SelectorError::DatasetLoad(format!("object '{object_name}' is malformed: {e}"))
        })?;

        let arcs = self.decode_arcs();
        let mut out = Vec::new();
        collect_features(&geometry, &arcs, name_keys, &mut out)?;
        Ok(out)
    }

    /// Absolute arc coordinates (undoes quantization when a transform is set).
    fn decode_arcs(&self) -> Vec<Vec<Position>> {
        self.arcs
            .iter()
            .map(|arc| {
                let (mut x, mut y) = (0.0, 0.0);
                arc.iter()
                    .filter(|p| p.len() >= 2)
                    .map(|p| match self.transform {
                        Some(t) => {
                            x += p[0];
                            y += p[1];
                            [x * t.scale[0] + t.translate[0], y * t.scale[1] + t.translate[1]]
                        }
                        None => [p[0], p[1]],
                    })
                    .collect()
            })
            .collect()
    }
}

fn collect_features(
    geometry: &TopoGeometry,
    arcs: &[Vec<Position>],
    name_keys: &[&str],
    out: &mut Vec<Feature>,
) -> Result<()> {
    match geometry {
        TopoGeometry::GeometryCollection { geometries } => {
            for g in geometries {
                collect_features(g, arcs, name_keys, out)?;
            }
        }
        TopoGeometry::Polygon { arcs: rings, properties } => out.push(Feature {
            name: feature_name(properties, name_keys),
            geometry: MultiPolygon::new(vec![stitch_polygon(rings, arcs)?]),
        }),
        TopoGeometry::MultiPolygon { arcs: polys, properties } => out.push(Feature {
            name: feature_name(properties, name_keys),
            geometry: MultiPolygon::new(
                polys
                    .iter()
                    .map(|rings| stitch_polygon(rings, arcs))
                    .collect::<Result<_>>()?,
            ),
        }),
        TopoGeometry::Unsupported => {}
    }
    Ok(())
}

/// First non-empty string under any of `keys`, else [`UNKNOWN_NAME`].
pub fn feature_name(properties: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| properties.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_NAME)
        .to_owned()
}

/// First ring is the exterior, the rest are holes.
fn stitch_polygon(rings: &[Vec<i64>], arcs: &[Vec<Position>]) -> Result<Polygon<f64>> {
    let mut rings = rings
        .iter()
        .map(|ring| stitch_ring(ring, arcs).map(LineString::from))
        .collect::<Result<Vec<_>>>()?
        .into_iter();
    let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
    Ok(Polygon::new(exterior, rings.collect()))
}

/// Concatenate arcs into one ring. Consecutive arcs share an endpoint, so the
/// first point of every arc after the first is dropped.
fn stitch_ring(indices: &[i64], arcs: &[Vec<Position>]) -> Result<Vec<Position>> {
    let mut ring: Vec<Position> = Vec::new();
    for &index in indices {
        let (arc_index, reversed) = if index >= 0 {
            (index as usize, false)
        } else {
            (!index as usize, true)
        };
        let arc = arcs.get(arc_index).ok_or_else(|| {
            SelectorError::DatasetLoad(format!("arc index {index} out of range ({} arcs)", arcs.len()))
        })?;

        let skip = usize::from(!ring.is_empty());
        if reversed {
            ring.extend(arc.iter().rev().skip(skip).copied());
        } else {
            ring.extend(arc.iter().skip(skip).copied());
        }
    }
    Ok(ring)
}
