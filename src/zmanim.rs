use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::location::Coordinate;

const ZMANIM_TIMEOUT: Duration = Duration::from_secs(10);

/// Daily halachic times as display strings, in the shape the zmanim service
/// returns them. The optional fields only appear around Shabbat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZmanimTimes {
    pub alot_ha_shachar: String,
    pub misheyakir: String,
    pub sunrise: String,
    #[serde(rename = "sofZmanShmaMGA")]
    pub sof_zman_shma_mga: String,
    #[serde(rename = "sofZmanShmaGRA")]
    pub sof_zman_shma_gra: String,
    #[serde(rename = "sofZmanTfillaGRA")]
    pub sof_zman_tfilla_gra: String,
    pub chatzot: String,
    pub mincha_gedola: String,
    pub mincha_ketana: String,
    pub plag_ha_mincha: String,
    pub sunset: String,
    pub tzeit_ha_kochavim: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candle_lighting: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub havdalah: Option<String>,
}

/// One day's lookup result: the times plus the Hebrew date and the weekly
/// Torah portion, which key the insight lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZmanimData {
    pub date: String,
    pub hebrew: String,
    pub parasha: String,
    pub times: ZmanimTimes,
}

impl ZmanimData {
    /// A usable response fills every required field. An empty string means
    /// the day's times cannot be trusted and the lookup must count as failed.
    pub fn validate(&self) -> Result<(), ZmanimError> {
        let t = &self.times;
        let required = [
            ("date", &self.date),
            ("hebrew", &self.hebrew),
            ("parasha", &self.parasha),
            ("alotHaShachar", &t.alot_ha_shachar),
            ("misheyakir", &t.misheyakir),
            ("sunrise", &t.sunrise),
            ("sofZmanShmaMGA", &t.sof_zman_shma_mga),
            ("sofZmanShmaGRA", &t.sof_zman_shma_gra),
            ("sofZmanTfillaGRA", &t.sof_zman_tfilla_gra),
            ("chatzot", &t.chatzot),
            ("minchaGedola", &t.mincha_gedola),
            ("minchaKetana", &t.mincha_ketana),
            ("plagHaMincha", &t.plag_ha_mincha),
            ("sunset", &t.sunset),
            ("tzeitHaKochavim", &t.tzeit_ha_kochavim),
        ];
        for (name, value) in required {
            if value.is_empty() {
                return Err(ZmanimError::EmptyField(name));
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ZmanimError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("zmanim service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("required field {0} is empty")]
    EmptyField(&'static str),
}

/// Source of the day's time markers. The production implementation is the
/// HTTP client below; tests substitute stubs.
#[allow(async_fn_in_trait)]
pub trait ZmanimSource {
    async fn fetch(&self, coord: Coordinate) -> Result<ZmanimData, ZmanimError>;
}

/// HTTP client for the zmanim service. The field set and the computation
/// rules behind it belong to the service; this client only checks shape.
pub struct ZmanimClient {
    client: reqwest::Client,
    base_url: String,
}

impl ZmanimClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl ZmanimSource for ZmanimClient {
    async fn fetch(&self, coord: Coordinate) -> Result<ZmanimData, ZmanimError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("lat", coord.latitude), ("lng", coord.longitude)])
            .timeout(ZMANIM_TIMEOUT)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ZmanimError::Status(resp.status()));
        }

        let data: ZmanimData = resp.json().await?;
        data.validate()?;
        Ok(data)
    }
}
