use serde::Deserialize;
use std::time::Duration;

/// Geographic position feeding the daily lookups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Fallback when no live position can be obtained: Jerusalem.
pub const DEFAULT_COORDINATE: Coordinate = Coordinate {
    latitude: 31.7683,
    longitude: 35.2137,
};

impl Coordinate {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

const GEOIP_URL: &str = "https://ipapi.co/json/";
const GEOIP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct GeoIpResponse {
    latitude: f64,
    longitude: f64,
    city: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("lookup returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("coordinates out of range: ({latitude}, {longitude})")]
    OutOfRange { latitude: f64, longitude: f64 },
}

/// Best-effort, single-shot position lookup. Asked once at startup; a
/// denied or failed reading is never re-prompted.
pub struct LocationResolver {
    client: Option<reqwest::Client>,
}

impl LocationResolver {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// A resolver for hosts without any location capability; `resolve`
    /// returns the default coordinate immediately.
    pub fn disabled() -> Self {
        Self { client: None }
    }

    /// Resolve the board's position. Never fails: denial, timeout, or a
    /// nonsensical reading all fall back to the default coordinate.
    pub async fn resolve(&self) -> Coordinate {
        let Some(client) = &self.client else {
            log::info!("Location capability unavailable, using default coordinate");
            return DEFAULT_COORDINATE;
        };
        match fetch_position(client).await {
            Ok((coord, city)) => {
                match city {
                    Some(city) => log::info!(
                        "Resolved position near {} ({:.4}, {:.4})",
                        city,
                        coord.latitude,
                        coord.longitude
                    ),
                    None => log::info!(
                        "Resolved position ({:.4}, {:.4})",
                        coord.latitude,
                        coord.longitude
                    ),
                }
                coord
            }
            Err(e) => {
                log::warn!("Location lookup failed: {}, using default coordinate", e);
                DEFAULT_COORDINATE
            }
        }
    }
}

async fn fetch_position(
    client: &reqwest::Client,
) -> Result<(Coordinate, Option<String>), LocationError> {
    let resp = client
        .get(GEOIP_URL)
        .timeout(GEOIP_TIMEOUT)
        .send()
        .await?;

    if !resp.status().is_success() {
        return Err(LocationError::Status(resp.status()));
    }

    let geo: GeoIpResponse = resp.json().await?;
    let coord = Coordinate {
        latitude: geo.latitude,
        longitude: geo.longitude,
    };
    if !coord.is_valid() {
        return Err(LocationError::OutOfRange {
            latitude: geo.latitude,
            longitude: geo.longitude,
        });
    }
    Ok((coord, geo.city))
}
