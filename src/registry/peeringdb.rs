//! PeeringDB metadata lookup.
//!
//! One blocking HTTPS GET per peer: `{base}/net?asn={asn}`. The interesting
//! fields are `irr_as_set`, `info_prefixes4`, and `info_prefixes6`; all of
//! them are frequently null or absent in real records, so decoding must
//! tolerate that.

use super::{RegistryData, RegistryError, RegistryResult};
use serde::Deserialize;
use std::time::Duration;

pub struct PeeringDbClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl PeeringDbClient {
    pub fn new(base_url: &str, timeout: Duration) -> RegistryResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("birdforge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RegistryError(format!("failed to build HTTP client: {}", e)))?;

        Ok(PeeringDbClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Fetch the network record for an ASN.
    pub fn lookup(&self, asn: u32) -> RegistryResult<RegistryData> {
        let url = format!("{}/net?asn={}", self.base_url, asn);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| RegistryError(format!("PeeringDB query for AS{} failed: {}", asn, e)))?;

        if !response.status().is_success() {
            return Err(RegistryError(format!(
                "PeeringDB query for AS{} returned HTTP {}",
                asn,
                response.status()
            )));
        }

        let body: NetResponse = response
            .json()
            .map_err(|e| RegistryError(format!("PeeringDB response for AS{}: {}", asn, e)))?;

        let record = body
            .data
            .into_iter()
            .next()
            .ok_or_else(|| RegistryError(format!("no PeeringDB record for AS{}", asn)))?;

        Ok(record.into_registry_data())
    }
}

#[derive(Debug, Deserialize)]
struct NetResponse {
    #[serde(default)]
    data: Vec<NetRecord>,
}

#[derive(Debug, Deserialize)]
struct NetRecord {
    #[serde(default)]
    irr_as_set: Option<String>,
    #[serde(default)]
    info_prefixes4: Option<u32>,
    #[serde(default)]
    info_prefixes6: Option<u32>,
}

impl NetRecord {
    fn into_registry_data(self) -> RegistryData {
        RegistryData {
            max_prefix4: self.info_prefixes4,
            max_prefix6: self.info_prefixes6,
            as_set: self.irr_as_set.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_record() {
        let json = r#"{
            "data": [{
                "name": "Example Networks",
                "irr_as_set": "AS-EXAMPLE",
                "info_prefixes4": 500,
                "info_prefixes6": 100
            }]
        }"#;

        let body: NetResponse = serde_json::from_str(json).unwrap();
        let data = body.data.into_iter().next().unwrap().into_registry_data();

        assert_eq!(data.as_set, "AS-EXAMPLE");
        assert_eq!(data.max_prefix4, Some(500));
        assert_eq!(data.max_prefix6, Some(100));
    }

    #[test]
    fn tolerates_null_and_absent_fields() {
        let json = r#"{
            "data": [{
                "irr_as_set": null,
                "info_prefixes4": null
            }]
        }"#;

        let body: NetResponse = serde_json::from_str(json).unwrap();
        let data = body.data.into_iter().next().unwrap().into_registry_data();

        assert_eq!(data, RegistryData::default());
    }

    #[test]
    fn empty_data_array_decodes() {
        let body: NetResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(body.data.is_empty());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client =
            PeeringDbClient::new("https://www.peeringdb.com/api/", Duration::from_secs(1))
                .unwrap();
        assert_eq!(client.base_url, "https://www.peeringdb.com/api");
    }
}
