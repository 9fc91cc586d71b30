//! GeoJSON input and output for the command line.

use anyhow::{bail, Context, Result};
use conduit_buffer::{BufferLayers, Feature, FeatureCollection, FieldValue, Point2};
use geo::MultiPolygon;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Read a GeoJSON `FeatureCollection` of line features.
pub fn read_lines(path: &Path) -> Result<FeatureCollection> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_lines(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Parse GeoJSON text into features. Feature ids are positional.
pub fn parse_lines(text: &str) -> Result<FeatureCollection> {
    let root: Value = serde_json::from_str(text)?;
    if root.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        bail!("expected a GeoJSON FeatureCollection");
    }
    let Some(items) = root.get("features").and_then(Value::as_array) else {
        bail!("FeatureCollection has no features array");
    };

    let features = items
        .iter()
        .enumerate()
        .map(|(fid, item)| parse_feature(fid as u64, item))
        .collect();

    let mut collection = FeatureCollection::from_features(features);
    if let Some(crs) = root.get("crs").filter(|c| !c.is_null()) {
        collection = collection.with_crs(crs.to_string());
    }
    Ok(collection)
}

fn parse_feature(fid: u64, item: &Value) -> Feature {
    let geometry = item.get("geometry").map(line_vertices).unwrap_or_default();
    let mut feature = Feature::new(fid, geometry);
    if let Some(properties) = item.get("properties").and_then(Value::as_object) {
        for (name, value) in properties {
            feature = feature.with_attribute(name.clone(), field_value(value));
        }
    }
    feature
}

/// Polyline vertices of a geometry. Anything other than a single line comes
/// back empty and is skipped downstream as invalid geometry.
fn line_vertices(geometry: &Value) -> Vec<Point2> {
    let coords = geometry.get("coordinates");
    match geometry.get("type").and_then(Value::as_str) {
        Some("LineString") => coords.map(positions).unwrap_or_default(),
        Some("MultiLineString") => match coords.and_then(Value::as_array) {
            Some(parts) if parts.len() == 1 => positions(&parts[0]),
            Some(parts) => {
                warn!(parts = parts.len(), "multi-part line not supported");
                Vec::new()
            }
            None => Vec::new(),
        },
        Some(other) => {
            warn!(geometry = other, "non-line geometry ignored");
            Vec::new()
        }
        None => Vec::new(),
    }
}

fn positions(coords: &Value) -> Vec<Point2> {
    coords
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|p| {
                    let x = p.get(0)?.as_f64()?;
                    let y = p.get(1)?.as_f64()?;
                    Some(Point2::new(x, y))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn field_value(value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Number(n) => n.as_f64().map_or(FieldValue::Null, FieldValue::Number),
        Value::String(s) => FieldValue::Text(s.clone()),
        Value::Bool(b) => FieldValue::Text(b.to_string()),
        other => FieldValue::Text(other.to_string()),
    }
}

/// GeoJSON coordinates of a multipolygon.
fn multipolygon_coordinates(mp: &MultiPolygon<f64>) -> Value {
    let ring = |ls: &geo::LineString<f64>| -> Value {
        ls.coords().map(|c| json!([c.x, c.y])).collect::<Vec<_>>().into()
    };
    mp.iter()
        .map(|poly| {
            std::iter::once(poly.exterior())
                .chain(poly.interiors())
                .map(ring)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .into()
}

/// Build a polygon layer as a GeoJSON `FeatureCollection`.
pub fn layer_json<'a, T, I>(name: &str, crs: Option<&str>, records: I) -> Result<Value>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = (&'a T, &'a MultiPolygon<f64>)>,
{
    let features = records
        .into_iter()
        .map(|(record, geometry)| {
            Ok(json!({
                "type": "Feature",
                "properties": serde_json::to_value(record)?,
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": multipolygon_coordinates(geometry),
                },
            }))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut root = Map::new();
    root.insert("type".into(), "FeatureCollection".into());
    root.insert("name".into(), name.into());
    if let Some(crs) = crs {
        root.insert("crs".into(), serde_json::from_str(crs)?);
    }
    root.insert("features".into(), features.into());
    Ok(Value::Object(root))
}

/// Write the four output layers into `dir`, returning the written paths.
pub fn write_layers(dir: &Path, layers: &BufferLayers, crs: Option<&str>) -> Result<Vec<String>> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let outputs = [
        (
            "conduits",
            layer_json("conduits", crs, layers.conduits.iter().map(|r| (r, &r.geometry)))?,
        ),
        (
            "walls",
            layer_json("walls", crs, layers.walls.iter().map(|r| (r, &r.geometry)))?,
        ),
        (
            "excavation",
            layer_json("excavation", crs, layers.excavation.iter().map(|r| (r, &r.geometry)))?,
        ),
        (
            "total",
            layer_json("total", crs, layers.total.iter().map(|r| (r, &r.geometry)))?,
        ),
    ];

    let mut written = Vec::with_capacity(outputs.len());
    for (name, value) in outputs {
        let path = dir.join(format!("{}.geojson", name));
        let text = serde_json::to_string_pretty(&value)?;
        fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
        written.push(path.display().to_string());
    }
    Ok(written)
}
