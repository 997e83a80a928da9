//! S3 object store.
//!
//! Fetches objects with a path-style `GET {endpoint}/{bucket}/{key}` signed
//! with AWS Signature Version 4. Path-style addressing works against AWS and
//! against S3-compatible endpoints such as LocalStack or MinIO.

use std::fmt;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::{ObjectStore, StoreError};
use crate::config::{S3Config, REDACTED};

type HmacSha256 = Hmac<Sha256>;

/// SHA-256 of an empty body; GET requests carry no payload.
pub const EMPTY_PAYLOAD_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";

/// Object store backed by an S3-compatible HTTP endpoint.
pub struct S3ObjectStore {
    client: reqwest::blocking::Client,
    config: S3Config,
}

/// Resolved request target for one object.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    url: String,
    host: String,
    canonical_uri: String,
}

impl S3ObjectStore {
    pub fn new(config: S3Config) -> Result<Self, StoreError> {
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(Self { client, config })
    }

    fn target(&self, key: &str) -> Result<Target, StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey {
                key: key.into(),
                reason: "key is empty".into(),
            });
        }

        let endpoint = reqwest::Url::parse(&self.config.endpoint_url).map_err(|e| {
            StoreError::InvalidEndpoint {
                endpoint: self.config.endpoint_url.clone(),
                reason: e.to_string(),
            }
        })?;
        let host_name = endpoint
            .host_str()
            .ok_or_else(|| StoreError::InvalidEndpoint {
                endpoint: self.config.endpoint_url.clone(),
                reason: "no host".into(),
            })?;
        let host = match endpoint.port() {
            Some(port) => format!("{host_name}:{port}"),
            None => host_name.to_string(),
        };

        let canonical_uri = format!(
            "{}/{}/{}",
            endpoint.path().trim_end_matches('/'),
            encode_segment(&self.config.bucket),
            encode_key(key)
        );
        let url = format!("{}://{}{}", endpoint.scheme(), host, canonical_uri);

        Ok(Target {
            url,
            host,
            canonical_uri,
        })
    }
}

impl ObjectStore for S3ObjectStore {
    fn name(&self) -> &str {
        "s3"
    }

    fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let target = self.target(key)?;
        let amz_date = amz_date(Utc::now());

        let headers = [
            ("host", target.host.as_str()),
            ("x-amz-content-sha256", EMPTY_PAYLOAD_SHA256),
            ("x-amz-date", amz_date.as_str()),
        ];
        let authorization = authorization_header(
            &SigningParams {
                access_key: &self.config.access_key,
                secret_key: &self.config.secret_key,
                region: &self.config.region,
                amz_date: &amz_date,
            },
            "GET",
            &target.canonical_uri,
            "",
            &headers,
            EMPTY_PAYLOAD_SHA256,
        );

        debug!(bucket = %self.config.bucket, key, url = %target.url, "fetching object");

        let resp = self
            .client
            .get(&target.url)
            .header("x-amz-content-sha256", EMPTY_PAYLOAD_SHA256)
            .header("x-amz-date", &amz_date)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .send()?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound { key: key.into() });
        }
        if !status.is_success() {
            return Err(StoreError::Status {
                key: key.into(),
                status: status.as_u16(),
                body: resp.text().unwrap_or_default(),
            });
        }

        let body = resp.bytes()?;
        debug!(key, bytes = body.len(), "fetched object");
        Ok(body.to_vec())
    }
}

// ── Signature V4 ─────────────────────────────────────────────────────

/// Credentials and request time for one signature.
#[derive(Clone, Copy)]
pub struct SigningParams<'a> {
    pub access_key: &'a str,
    pub secret_key: &'a str,
    pub region: &'a str,
    /// Request time as `YYYYMMDDTHHMMSSZ`.
    pub amz_date: &'a str,
}

impl fmt::Debug for SigningParams<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningParams")
            .field("access_key", &self.access_key)
            .field("secret_key", &REDACTED)
            .field("region", &self.region)
            .field("amz_date", &self.amz_date)
            .finish()
    }
}

impl SigningParams<'_> {
    fn date(&self) -> &str {
        self.amz_date.get(..8).unwrap_or(self.amz_date)
    }

    fn scope(&self) -> String {
        format!("{}/{}/{SERVICE}/aws4_request", self.date(), self.region)
    }
}

/// Build the `Authorization` header value for an S3 request.
///
/// `headers` are the signed headers as (lowercase name, value) pairs.
pub fn authorization_header(
    params: &SigningParams<'_>,
    method: &str,
    canonical_uri: &str,
    canonical_query: &str,
    headers: &[(&str, &str)],
    payload_hash: &str,
) -> String {
    let mut sorted: Vec<(String, String)> = headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_string()))
        .collect();
    sorted.sort();

    let signed_headers = sorted
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");
    let canonical_headers: String = sorted
        .iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect();

    let canonical_request = format!(
        "{method}\n{canonical_uri}\n{canonical_query}\n{canonical_headers}\n{signed_headers}\n{payload_hash}"
    );
    let signature = signature(params, &canonical_request);

    format!(
        "{ALGORITHM} Credential={}/{}, SignedHeaders={signed_headers}, Signature={signature}",
        params.access_key,
        params.scope()
    )
}

fn signature(params: &SigningParams<'_>, canonical_request: &str) -> String {
    let string_to_sign = format!(
        "{ALGORITHM}\n{}\n{}\n{}",
        params.amz_date,
        params.scope(),
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );
    let key = signing_key(params.secret_key, params.date(), params.region, SERVICE);
    hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()))
}

/// Derive the per-day signing key.
pub fn signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// URI-encode an object key, keeping `/` separators.
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

/// Current time in the `x-amz-date` layout.
pub fn amz_date(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H%M%SZ").to_string()
}
