//! Wavelog HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required).
//! Covers the reconciliation flow: fetch all station profiles, create
//! missing ones, then re-fetch once to recover the ids the creation
//! endpoint does not return.

use std::time::Duration;

use serde::Serialize;

use stationsplit_engine::model::ProfileRecord;

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
const CREATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Wavelog API client (blocking).
#[derive(Clone)]
pub struct RegistryClient {
    http: reqwest::blocking::Client,
    base_host: String,
    token: String,
}

/// Error type for registry operations.
#[derive(Debug)]
pub enum RegistryError {
    /// URL or token missing
    NotConfigured,
    /// Network error
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// JSON parsing error
    Parse(String),
    /// Response shape the registry is not supposed to produce
    Protocol(String),
    /// Creation request accepted over HTTP but refused by the registry
    Rejected(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::NotConfigured => {
                write!(f, "Registry not configured; set URL and token first")
            }
            RegistryError::Network(msg) => write!(f, "Network error: {}", msg),
            RegistryError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            RegistryError::Parse(msg) => write!(f, "Parse error: {}", msg),
            RegistryError::Protocol(msg) => write!(f, "Protocol error: {}", msg),
            RegistryError::Rejected(msg) => write!(f, "Creation rejected: {}", msg),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Station profile to be created. Serializes straight into the wire
/// field names the creation endpoint expects.
#[derive(Debug, Clone, Serialize)]
pub struct NewStation {
    #[serde(rename = "station_callsign")]
    pub callsign: String,
    #[serde(rename = "station_gridsquare")]
    pub locator: String,
    #[serde(rename = "station_profile_name")]
    pub profile_name: String,
    #[serde(rename = "station_dxcc")]
    pub dxcc: String,
    #[serde(rename = "station_cq")]
    pub cq_zone: String,
    #[serde(rename = "station_itu")]
    pub itu_zone: String,
}

/// Outcome for one station in a creation batch, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationResult {
    /// Created and found again in the re-fetched snapshot.
    Identified(String),
    /// Created, but the re-fetched snapshot gave no unambiguous id.
    IdUnclear,
    /// Creation request failed; the rest of the batch still ran.
    Failed(String),
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<CreationResult>,
    pub warnings: Vec<String>,
}

impl RegistryClient {
    /// Create a new client. The configured URL may carry the `/api`
    /// suffix; endpoints are built from the host part before it.
    pub fn new(url: &str, token: &str) -> Result<Self, RegistryError> {
        if url.trim().is_empty() || token.trim().is_empty() {
            return Err(RegistryError::NotConfigured);
        }

        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("stationsplit/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RegistryError::Network(e.to_string()))?;

        let base_host = url
            .trim()
            .trim_end_matches('/')
            .split("/api")
            .next()
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            http,
            base_host,
            token: token.trim().to_string(),
        })
    }

    /// Fetch the complete station-profile snapshot.
    pub fn fetch_all(&self) -> Result<Vec<ProfileRecord>, RegistryError> {
        let url = format!(
            "{}/index.php/api/station_info/{}",
            self.base_host, self.token
        );

        let response = self
            .http
            .get(&url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .map_err(|e| RegistryError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RegistryError::Http(status, body));
        }

        let json: serde_json::Value = response
            .json()
            .map_err(|e| RegistryError::Parse(e.to_string()))?;

        let Some(entries) = json.as_array() else {
            return Err(RegistryError::Protocol(
                "station_info did not return a list".into(),
            ));
        };

        Ok(entries.iter().map(profile_from_json).collect())
    }

    /// Create a single station profile. `Ok` means the registry reported
    /// a successful import; anything else is an error.
    pub fn create_station(&self, station: &NewStation) -> Result<(), RegistryError> {
        let url = format!(
            "{}/index.php/api/create_station/{}",
            self.base_host, self.token
        );

        // The endpoint takes a single-element array.
        let response = self
            .http
            .post(&url)
            .timeout(CREATE_TIMEOUT)
            .json(&[station])
            .send()
            .map_err(|e| RegistryError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RegistryError::Http(status, body));
        }

        let json: serde_json::Value = response
            .json()
            .map_err(|e| RegistryError::Parse(e.to_string()))?;

        let ok = json["status"].as_str() == Some("success")
            && json["message"]
                .as_str()
                .is_some_and(|m| m.contains("imported"));
        if ok {
            Ok(())
        } else {
            Err(RegistryError::Rejected(json.to_string()))
        }
    }

    /// Create a batch of stations and recover their new ids.
    ///
    /// Each creation runs independently; one failure never aborts the
    /// batch. After the whole batch, the snapshot is re-fetched exactly
    /// once and every created station is looked up in it. A failed
    /// re-fetch downgrades all created stations to [`CreationResult::IdUnclear`].
    pub fn create_and_identify(&self, stations: &[NewStation]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let mut any_created = false;

        for station in stations {
            match self.create_station(station) {
                Ok(()) => {
                    any_created = true;
                    outcome.results.push(CreationResult::IdUnclear);
                }
                Err(e) => outcome.results.push(CreationResult::Failed(e.to_string())),
            }
        }

        if !any_created {
            return outcome;
        }

        let snapshot = match self.fetch_all() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                outcome
                    .warnings
                    .push(format!("created stations could not be re-checked: {e}"));
                return outcome;
            }
        };

        for (station, result) in stations.iter().zip(outcome.results.iter_mut()) {
            if *result != CreationResult::IdUnclear {
                continue;
            }
            if let Some(id) = find_created_id(&snapshot, station) {
                *result = CreationResult::Identified(id);
            } else {
                outcome.warnings.push(format!(
                    "no unambiguous id found for {}@{} after creation",
                    station.callsign, station.locator
                ));
            }
        }

        outcome
    }
}

/// Locate a freshly created station in a snapshot.
///
/// The registry may extend the stored locator beyond what was submitted,
/// so the locator check is a prefix match on the first four characters;
/// callsign and profile name must match exactly.
pub fn find_created_id(snapshot: &[ProfileRecord], station: &NewStation) -> Option<String> {
    let call = station.callsign.to_uppercase();
    let prefix: String = station.locator.to_uppercase().chars().take(4).collect();

    snapshot
        .iter()
        .find(|p| {
            !p.station_id.is_empty()
                && p.callsign.to_uppercase() == call
                && p.locator.to_uppercase().starts_with(&prefix)
                && p.profile_name == station.profile_name
        })
        .map(|p| p.station_id.clone())
}

fn profile_from_json(entry: &serde_json::Value) -> ProfileRecord {
    let station_id = entry["station_id"]
        .as_i64()
        .map(|n| n.to_string())
        .or_else(|| entry["station_id"].as_str().map(String::from))
        .unwrap_or_default();

    ProfileRecord::new(
        station_id,
        entry["station_callsign"].as_str().unwrap_or_default(),
        entry["station_gridsquare"].as_str().unwrap_or_default(),
        entry["station_profile_name"]
            .as_str()
            .unwrap_or("Unknown profile"),
    )
}
