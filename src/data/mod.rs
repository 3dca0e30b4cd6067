pub mod incidents;

pub use incidents::{DataSelector, IncidentRecord, IncidentTable, YearInterval, YEAR_MAX, YEAR_MIN};

use crate::error::{Error, Result};
use crate::map::Basemap;
use geojson::{GeoJson, Geometry, Value};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Load the available Natural Earth GeoJSON layers into the basemap.
/// The first file found per layer wins; unreadable files are logged and skipped.
pub fn load_all_geojson(basemap: &mut Basemap, data_dir: &Path) -> Result<()> {
    let coastline_files = ["ne_50m_coastline.json", "ne_110m_coastline.json", "natural-earth.json"];
    let border_files = [
        "ne_50m_borders.json",
        "ne_50m_admin_0_boundary_lines_land.json",
        "ne_110m_admin_0_boundary_lines_land.json",
    ];
    let land_files = ["ne_50m_land.json", "ne_110m_land.json"];

    if let Some(geojson) = first_readable(data_dir, &coastline_files) {
        for line in geojson_rings(&geojson, Shape::Lines) {
            basemap.add_coastline(line);
        }
    }
    if let Some(geojson) = first_readable(data_dir, &border_files) {
        for line in geojson_rings(&geojson, Shape::Lines) {
            basemap.add_border(line);
        }
    }
    if let Some(geojson) = first_readable(data_dir, &land_files) {
        for ring in geojson_rings(&geojson, Shape::Polygons) {
            basemap.add_land(ring);
        }
    }

    info!(
        dir = %data_dir.display(),
        coastlines = basemap.coastlines.len(),
        borders = basemap.borders.len(),
        land = basemap.land.len(),
        "loaded basemap"
    );
    Ok(())
}

fn first_readable(data_dir: &Path, candidates: &[&str]) -> Option<GeoJson> {
    for filename in candidates {
        let path = data_dir.join(filename);
        if !path.exists() {
            continue;
        }
        match read_geojson(&path) {
            Ok(geojson) => return Some(geojson),
            Err(e) => warn!(file = %filename, error = %e, "failed to load GeoJSON"),
        }
    }
    None
}

fn read_geojson(path: &Path) -> Result<GeoJson> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(content.parse::<GeoJson>()?)
}

/// Which geometries a layer takes: lines also accept polygon outlines
#[derive(Clone, Copy, PartialEq, Eq)]
enum Shape {
    Lines,
    Polygons,
}

/// All (lon, lat) paths of the requested shape in a GeoJSON document
fn geojson_rings(geojson: &GeoJson, shape: Shape) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    match geojson {
        GeoJson::FeatureCollection(fc) => fc
            .features
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .for_each(|g| collect_rings(g, shape, &mut out)),
        GeoJson::Feature(f) => {
            if let Some(g) = &f.geometry {
                collect_rings(g, shape, &mut out);
            }
        }
        GeoJson::Geometry(g) => collect_rings(g, shape, &mut out),
    }
    out
}

fn to_path(coords: &[Vec<f64>]) -> Vec<(f64, f64)> {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| (c[0], c[1]))
        .collect()
}

/// Exterior ring of each polygon; holes don't show at map scale
fn exteriors<'a>(
    polygons: impl Iterator<Item = &'a Vec<Vec<Vec<f64>>>> + 'a,
) -> impl Iterator<Item = Vec<(f64, f64)>> + 'a {
    polygons.filter_map(|rings| rings.first()).map(|ring| to_path(ring))
}

fn collect_rings(geometry: &Geometry, shape: Shape, out: &mut Vec<Vec<(f64, f64)>>) {
    match &geometry.value {
        Value::LineString(coords) if shape == Shape::Lines => out.push(to_path(coords)),
        Value::MultiLineString(lines) if shape == Shape::Lines => {
            out.extend(lines.iter().map(|l| to_path(l)));
        }
        Value::Polygon(rings) => out.extend(exteriors(std::iter::once(rings))),
        Value::MultiPolygon(polygons) => out.extend(exteriors(polygons.iter())),
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_rings(g, shape, out);
            }
        }
        _ => {}
    }
}

/// Generate a simple world outline for when no data files are available.
/// Each continent is both a coastline and a land polygon.
pub fn generate_simple_world(basemap: &mut Basemap) {
    let continents: [&[(f64, f64)]; 8] = [
        // North America
        &[
            (-168.0, 65.0), (-166.0, 60.0), (-141.0, 60.0), (-130.0, 55.0),
            (-125.0, 48.0), (-124.0, 40.0), (-117.0, 32.0), (-110.0, 25.0),
            (-105.0, 20.0), (-95.0, 16.0), (-88.0, 14.0), (-83.0, 9.0),
            (-77.0, 8.0), (-83.0, 15.0), (-88.0, 21.0), (-97.0, 25.0),
            (-97.0, 28.0), (-82.0, 24.0), (-80.0, 25.0), (-81.0, 31.0),
            (-75.0, 35.0), (-70.0, 41.0), (-67.0, 45.0), (-65.0, 47.0),
            (-55.0, 47.0), (-52.0, 47.0), (-55.0, 52.0), (-58.0, 55.0),
            (-64.0, 60.0), (-73.0, 62.0), (-80.0, 63.0), (-95.0, 62.0),
            (-110.0, 68.0), (-130.0, 70.0), (-145.0, 70.0), (-168.0, 65.0),
        ],
        // South America
        &[
            (-77.0, 8.0), (-75.0, 11.0), (-70.0, 12.0), (-60.0, 8.0),
            (-50.0, 0.0), (-35.0, -5.0), (-35.0, -10.0), (-38.0, -15.0),
            (-40.0, -22.0), (-48.0, -25.0), (-55.0, -34.0), (-58.0, -38.0),
            (-65.0, -42.0), (-68.0, -50.0), (-70.0, -55.0), (-75.0, -52.0),
            (-75.0, -45.0), (-72.0, -40.0), (-72.0, -30.0), (-70.0, -20.0),
            (-76.0, -14.0), (-81.0, -5.0), (-80.0, 0.0), (-77.0, 8.0),
        ],
        // Europe
        &[
            (-10.0, 36.0), (-5.0, 36.0), (0.0, 38.0), (5.0, 43.0),
            (10.0, 44.0), (15.0, 45.0), (20.0, 40.0), (25.0, 37.0),
            (30.0, 40.0), (35.0, 42.0), (40.0, 43.0), (40.0, 55.0),
            (30.0, 60.0), (25.0, 65.0), (20.0, 70.0), (10.0, 71.0),
            (5.0, 62.0), (5.0, 58.0), (-5.0, 58.0), (-10.0, 52.0),
            (-5.0, 48.0), (-5.0, 43.0), (-10.0, 36.0),
        ],
        // Africa
        &[
            (-17.0, 15.0), (-17.0, 21.0), (-15.0, 28.0), (-5.0, 35.0),
            (10.0, 37.0), (20.0, 33.0), (25.0, 32.0), (32.0, 31.0),
            (35.0, 28.0), (43.0, 12.0), (51.0, 12.0), (45.0, 2.0),
            (40.0, -5.0), (40.0, -15.0), (35.0, -22.0), (32.0, -28.0),
            (27.0, -34.0), (20.0, -35.0), (18.0, -32.0), (14.0, -23.0),
            (12.0, -12.0), (12.0, -5.0), (9.0, 4.0), (5.0, 5.0),
            (-5.0, 5.0), (-10.0, 7.0), (-15.0, 11.0), (-17.0, 15.0),
        ],
        // Asia
        &[
            (35.0, 42.0), (40.0, 43.0), (48.0, 41.0), (54.0, 37.0),
            (57.0, 25.0), (52.0, 17.0), (43.0, 13.0), (35.0, 28.0),
            (34.0, 36.0), (36.0, 37.0), (50.0, 30.0), (60.0, 25.0),
            (67.0, 24.0), (73.0, 18.0), (77.0, 8.0), (80.0, 15.0),
            (88.0, 22.0), (92.0, 22.0), (98.0, 16.0), (100.0, 7.0),
            (104.0, 1.0), (105.0, 10.0), (109.0, 12.0), (108.0, 20.0),
            (115.0, 22.0), (120.0, 25.0), (122.0, 30.0), (120.0, 36.0),
            (126.0, 37.0), (129.0, 35.0), (130.0, 43.0), (140.0, 48.0),
            (142.0, 54.0), (135.0, 55.0), (143.0, 59.0), (156.0, 57.0),
            (163.0, 62.0), (180.0, 66.0), (180.0, 70.0), (140.0, 72.0),
            (110.0, 76.0), (80.0, 73.0), (68.0, 69.0), (55.0, 68.0),
            (40.0, 66.0), (40.0, 55.0), (40.0, 43.0), (35.0, 42.0),
        ],
        // Australia
        &[
            (115.0, -20.0), (120.0, -18.0), (130.0, -12.0), (136.0, -12.0),
            (141.0, -17.0), (143.0, -11.0), (146.0, -19.0), (153.0, -25.0),
            (153.0, -30.0), (150.0, -36.0), (146.0, -39.0), (140.0, -38.0),
            (135.0, -35.0), (130.0, -32.0), (125.0, -33.0), (115.0, -35.0),
            (114.0, -26.0), (115.0, -20.0),
        ],
        // Greenland
        &[
            (-73.0, 78.0), (-60.0, 82.0), (-30.0, 83.0), (-20.0, 75.0),
            (-22.0, 70.0), (-40.0, 65.0), (-44.0, 60.0), (-50.0, 64.0),
            (-55.0, 70.0), (-73.0, 78.0),
        ],
        // Antarctica
        &[
            (-180.0, -84.0), (-180.0, -78.0), (-150.0, -76.0), (-100.0, -73.0),
            (-60.0, -64.0), (-40.0, -78.0), (0.0, -70.0), (60.0, -67.0),
            (100.0, -66.0), (140.0, -66.0), (170.0, -72.0), (180.0, -78.0),
            (180.0, -84.0), (-180.0, -84.0),
        ],
    ];

    for ring in continents {
        basemap.add_coastline(ring.to_vec());
        basemap.add_land(ring.to_vec());
    }

    // A handful of well-known land borders
    let borders: [&[(f64, f64)]; 5] = [
        &[(-123.0, 49.0), (-95.0, 49.0), (-83.0, 46.0), (-75.0, 45.0), (-67.0, 45.0)],
        &[(-117.0, 32.5), (-108.0, 31.3), (-106.0, 31.8), (-97.0, 26.0)],
        &[(-5.0, 43.0), (3.0, 42.5), (8.0, 46.0), (15.0, 47.0), (24.0, 48.0), (30.0, 52.0), (40.0, 55.0)],
        &[(73.0, 35.0), (80.0, 30.0), (88.0, 27.0), (97.0, 28.0)],
        &[(87.0, 49.0), (97.0, 42.0), (110.0, 42.0), (120.0, 47.0), (130.0, 43.0)],
    ];
    for line in borders {
        basemap.add_border(line.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_world_has_land() {
        let mut basemap = Basemap::new();
        generate_simple_world(&mut basemap);
        assert!(basemap.has_data());
        assert_eq!(basemap.land.len(), basemap.coastlines.len());
        assert!(!basemap.borders.is_empty());
        for ring in &basemap.land {
            assert_eq!(ring.first(), ring.last());
        }
    }

    #[test]
    fn test_load_geojson_layers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("ne_110m_coastline.json"),
            r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{},
               "geometry":{"type":"MultiLineString","coordinates":[[[0,0],[10,0]],[[5,5],[6,6],[7,5]]]}}]}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("ne_110m_land.json"),
            r#"{"type":"Feature","properties":{},
               "geometry":{"type":"Polygon","coordinates":[[[0,0],[10,0],[10,10],[0,10],[0,0]],[[2,2],[3,2],[3,3],[2,2]]]}}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("ne_50m_borders.json"), "not json").unwrap();

        let mut basemap = Basemap::new();
        load_all_geojson(&mut basemap, dir.path()).unwrap();
        assert_eq!(basemap.coastlines.len(), 2);
        assert_eq!(basemap.land.len(), 1);
        assert_eq!(basemap.land[0].len(), 5);
        assert!(basemap.borders.is_empty());
    }
}
