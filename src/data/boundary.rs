use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::BoundaryError;

// ---------------------------------------------------------------------------
// Boundary geometry
// ---------------------------------------------------------------------------

/// One neighbourhood outline. Each ring is a closed list of
/// `[longitude, latitude]` points.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryPolygon {
    pub name: Option<String>,
    pub rings: Vec<Vec<[f64; 2]>>,
}

/// Background geometry drawn under the listings map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundarySet {
    pub polygons: Vec<BoundaryPolygon>,
}

impl BoundarySet {
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

type Position = Vec<f64>;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum Geometry {
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Map<String, JsonValue>>,
    geometry: JsonValue,
}

fn ring(points: Vec<Position>) -> Vec<[f64; 2]> {
    points
        .into_iter()
        .filter(|p| p.len() >= 2)
        .map(|p| [p[0], p[1]])
        .collect()
}

fn feature_name(properties: &Option<Map<String, JsonValue>>) -> Option<String> {
    let props = properties.as_ref()?;
    ["name", "neighborhood", "nhood"]
        .iter()
        .find_map(|key| props.get(*key)?.as_str().map(str::to_string))
}

/// Parse a GeoJSON feature collection. Only `Polygon` and `MultiPolygon`
/// geometries are kept; each polygon of a multipolygon becomes its own
/// [`BoundaryPolygon`].
pub fn parse_feature_collection(text: &str) -> Result<BoundarySet, BoundaryError> {
    let root: JsonValue = serde_json::from_str(text)?;
    let features = root
        .get("features")
        .and_then(JsonValue::as_array)
        .ok_or(BoundaryError::MissingFeatures)?;

    let mut polygons = Vec::new();
    for (i, raw) in features.iter().enumerate() {
        let feature: Feature = match serde_json::from_value(raw.clone()) {
            Ok(f) => f,
            Err(e) => {
                log::warn!("Skipping boundary feature {i}: {e}");
                continue;
            }
        };
        let name = feature_name(&feature.properties);
        match serde_json::from_value::<Geometry>(feature.geometry) {
            Ok(Geometry::Polygon(rings)) => polygons.push(BoundaryPolygon {
                name,
                rings: rings.into_iter().map(ring).collect(),
            }),
            Ok(Geometry::MultiPolygon(parts)) => {
                polygons.extend(parts.into_iter().map(|rings| BoundaryPolygon {
                    name: name.clone(),
                    rings: rings.into_iter().map(ring).collect(),
                }));
            }
            Err(e) => log::warn!("Skipping boundary feature {i}: unsupported geometry ({e})"),
        }
    }

    Ok(BoundarySet { polygons })
}

// ---------------------------------------------------------------------------
// Loading: cache file first, then network
// ---------------------------------------------------------------------------

/// Where boundary geometry comes from.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundarySource {
    pub url: String,
    /// Local copy read before going to the network and refreshed after a
    /// successful download.
    pub cache: Option<PathBuf>,
    pub timeout: Duration,
    /// Total number of HTTP attempts, at least one.
    pub attempts: u32,
}

/// Blocking GET of `url`, retried up to `attempts` times.
pub fn fetch(url: &str, timeout: Duration, attempts: u32) -> Result<String, BoundaryError> {
    let client = Client::builder().timeout(timeout).build()?;
    let attempts = attempts.max(1);

    let mut attempt = 1;
    loop {
        let result = client
            .get(url)
            .send()
            .map_err(BoundaryError::from)
            .and_then(|resp| {
                let status = resp.status();
                if !status.is_success() {
                    return Err(BoundaryError::Status(status.as_u16()));
                }
                Ok(resp.text()?)
            });

        match result {
            Ok(body) => return Ok(body),
            Err(e) if attempt < attempts => {
                log::warn!("Boundary download attempt {attempt}/{attempts} failed: {e}");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

fn read_cache(path: &Path) -> Result<BoundarySet, BoundaryError> {
    let text = std::fs::read_to_string(path)?;
    parse_feature_collection(&text)
}

/// Load boundaries from the cache if present and valid, else download them.
pub fn load(source: &BoundarySource) -> Result<BoundarySet, BoundaryError> {
    if let Some(path) = &source.cache {
        match read_cache(path) {
            Ok(set) => {
                log::info!("Loaded {} boundary polygons from cache", set.len());
                return Ok(set);
            }
            Err(BoundaryError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Ignoring boundary cache {}: {e}", path.display()),
        }
    }

    let body = fetch(&source.url, source.timeout, source.attempts)?;
    let set = parse_feature_collection(&body)?;
    log::info!("Downloaded {} boundary polygons from {}", set.len(), source.url);

    if let Some(path) = &source.cache {
        if let Err(e) = std::fs::write(path, &body) {
            log::warn!("Could not write boundary cache {}: {e}", path.display());
        }
    }
    Ok(set)
}

// ---------------------------------------------------------------------------
// Background fetch
// ---------------------------------------------------------------------------

/// Progress of the boundary download as seen by the UI.
#[derive(Debug, Default)]
pub enum BoundaryStatus {
    #[default]
    Disabled,
    Pending,
    Ready(BoundarySet),
    Failed(String),
}

/// Handle to a boundary load running on a worker thread.
pub struct BoundaryFetch {
    rx: Option<Receiver<Result<BoundarySet, BoundaryError>>>,
    status: BoundaryStatus,
}

impl BoundaryFetch {
    /// Start loading `source` in the background.
    pub fn spawn(source: BoundarySource) -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(load(&source));
        });
        Self {
            rx: Some(rx),
            status: BoundaryStatus::Pending,
        }
    }

    /// A handle that never produces geometry.
    pub fn disabled() -> Self {
        Self {
            rx: None,
            status: BoundaryStatus::Disabled,
        }
    }

    /// Check for a finished load without blocking and return the status.
    pub fn poll(&mut self) -> &BoundaryStatus {
        if let Some(rx) = &self.rx {
            match rx.try_recv() {
                Ok(Ok(set)) => {
                    self.status = BoundaryStatus::Ready(set);
                    self.rx = None;
                }
                Ok(Err(e)) => {
                    log::error!("Failed to load neighbourhood boundaries: {e}");
                    self.status = BoundaryStatus::Failed(e.to_string());
                    self.rx = None;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    self.status = BoundaryStatus::Failed("boundary worker stopped".to_string());
                    self.rx = None;
                }
            }
        }
        &self.status
    }

    pub fn status(&self) -> &BoundaryStatus {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"name": "Mission"},
             "geometry": {"type": "Polygon", "coordinates": [[[-122.42, 37.75], [-122.40, 37.75], [-122.40, 37.77], [-122.42, 37.75]]]}},
            {"type": "Feature", "properties": {"nhood": "Islands"},
             "geometry": {"type": "MultiPolygon", "coordinates": [
                [[[-122.37, 37.81, 0.0], [-122.36, 37.81, 0.0], [-122.36, 37.82, 0.0], [-122.37, 37.81, 0.0]]],
                [[[-122.33, 37.80], [-122.32, 37.80], [-122.32, 37.81], [-122.33, 37.80]]]
             ]}},
            {"type": "Feature", "properties": null,
             "geometry": {"type": "Point", "coordinates": [-122.4, 37.7]}}
        ]
    }"#;

    #[test]
    fn polygons_and_multipolygons_are_flattened() {
        let set = parse_feature_collection(COLLECTION).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.polygons[0].name.as_deref(), Some("Mission"));
        assert_eq!(set.polygons[0].rings[0][0], [-122.42, 37.75]);
        assert_eq!(set.polygons[1].name.as_deref(), Some("Islands"));
        assert_eq!(set.polygons[1].rings[0][1], [-122.36, 37.81]);
        assert_eq!(set.polygons[2].name.as_deref(), Some("Islands"));
    }

    #[test]
    fn missing_features_is_an_error() {
        let err = parse_feature_collection(r#"{"type": "FeatureCollection"}"#).unwrap_err();
        assert!(matches!(err, BoundaryError::MissingFeatures));
        assert!(matches!(
            parse_feature_collection("not json"),
            Err(BoundaryError::Json(_))
        ));
    }

    #[test]
    fn cache_file_is_used_before_network() {
        let path = std::env::temp_dir().join(format!("boundary-cache-{}.json", std::process::id()));
        std::fs::write(&path, COLLECTION).unwrap();

        let source = BoundarySource {
            url: "http://127.0.0.1:9/unreachable".to_string(),
            cache: Some(path.clone()),
            timeout: Duration::from_millis(10),
            attempts: 1,
        };
        let set = load(&source).unwrap();
        assert_eq!(set.len(), 3);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn background_fetch_reports_failure() {
        let mut fetch = BoundaryFetch::spawn(BoundarySource {
            url: "http://127.0.0.1:9/unreachable".to_string(),
            cache: None,
            timeout: Duration::from_millis(200),
            attempts: 1,
        });
        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        while matches!(fetch.poll(), BoundaryStatus::Pending) && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
        }
        assert!(matches!(fetch.status(), BoundaryStatus::Failed(_)));
    }

    #[test]
    fn disabled_fetch_stays_disabled() {
        let mut fetch = BoundaryFetch::disabled();
        assert!(matches!(fetch.poll(), BoundaryStatus::Disabled));
    }
}
