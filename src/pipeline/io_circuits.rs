// Reading the district geometry out of a GeoJSON feature collection.

use std::fs;

use geo_types::MultiPolygon;
use geojson::{FeatureCollection, GeoJson};
use log::debug;
use serde_json::Value as JSValue;
use snafu::prelude::*;

use circuit_tally::DistrictShape;

use crate::pipeline::*;

pub const DISTRICT_PROPERTY: &str = "circuito";
pub const REGION_PROPERTY: &str = "cabecera";

/// Reads the geometry table from a path, going through the archive layer
/// when the input is zipped.
pub fn read_circuits_path(path: &str, entry: Option<&str>) -> MapResult<Vec<DistrictShape>> {
    let raw = if io_archive::is_archive(path) {
        io_archive::read_archive_entry_path(path, entry, ".geojson")?
    } else {
        fs::read(path).context(GeoJsonOpenSnafu { path })?
    };
    let text = String::from_utf8_lossy(&raw);
    parse_circuits(&text, path)
}

pub fn parse_circuits(text: &str, path: &str) -> MapResult<Vec<DistrictShape>> {
    let gj: GeoJson = text.parse::<GeoJson>().context(GeoJsonParseSnafu { path })?;
    let collection = FeatureCollection::try_from(gj).context(GeoJsonParseSnafu { path })?;

    let mut res: Vec<DistrictShape> = Vec::new();
    for (index, feature) in collection.features.into_iter().enumerate() {
        let district_code = read_property(&feature, DISTRICT_PROPERTY, index)?;
        let header_region = read_property(&feature, REGION_PROPERTY, index)?;
        let geometry = feature.geometry.context(GeoNotPolygonalSnafu { index })?;
        let shape = to_multi_polygon(geometry, index)?;
        debug!(
            "parse_circuits: feature {}: circuito {:?} cabecera {:?}",
            index, district_code, header_region
        );
        res.push(DistrictShape {
            district_code,
            header_region,
            shape,
        });
    }
    Ok(res)
}

/// The district code is a string in some exports and a bare number in
/// others. Both are accepted.
fn read_property(feature: &geojson::Feature, name: &str, index: usize) -> MapResult<String> {
    match feature.property(name) {
        Some(JSValue::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(JSValue::Number(n)) => Ok(n.to_string()),
        _ => GeoSchemaMismatchSnafu { index, name }.fail(),
    }
}

fn to_multi_polygon(geometry: geojson::Geometry, index: usize) -> MapResult<MultiPolygon<f64>> {
    match geo_types::Geometry::<f64>::try_from(geometry).ok() {
        Some(geo_types::Geometry::Polygon(p)) => Ok(MultiPolygon(vec![p])),
        Some(geo_types::Geometry::MultiPolygon(mp)) => Ok(mp),
        _ => GeoNotPolygonalSnafu { index }.fail(),
    }
}
