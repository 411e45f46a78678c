//! `AWS4-HMAC-SHA256` request signing for the signed catalog API.
//!
//! The provider recomputes the signature server-side, so every byte of the
//! canonical request matters: header names are lower-case, values trimmed,
//! headers sorted by name, each line `\n`-terminated.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::error::CatalogError;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const CONTENT_ENCODING: &str = "amz-1.0";
pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";

const SCOPE_TERMINATOR: &str = "aws4_request";

/// Everything that identifies the call being signed, apart from the body.
#[derive(Debug, Clone, Copy)]
pub struct SigningParams<'a> {
    pub access_key: &'a str,
    pub secret_key: &'a str,
    pub region: &'a str,
    pub service: &'a str,
    /// Value sent in the `Host` header (`host[:port]`).
    pub host: &'a str,
    /// Value of the `X-Amz-Target` header naming the operation.
    pub target: &'a str,
    pub path: &'a str,
}

/// A fully signed request, ready to hand to the HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub method: &'static str,
    pub path: String,
    /// Header name/value pairs including `authorization`.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl SignedRequest {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Signs a JSON POST to `params.path` at the instant `now`.
///
/// # Errors
///
/// Returns [`CatalogError::Signing`] if the HMAC key cannot be initialised.
pub fn sign_request(
    params: &SigningParams<'_>,
    payload: &str,
    now: DateTime<Utc>,
) -> Result<SignedRequest, CatalogError> {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = now.format("%Y%m%d").to_string();

    let mut signed = vec![
        ("content-encoding", CONTENT_ENCODING.to_owned()),
        ("content-type", CONTENT_TYPE.to_owned()),
        ("host", params.host.trim().to_owned()),
        ("x-amz-date", amz_date.clone()),
        ("x-amz-target", params.target.trim().to_owned()),
    ];
    signed.sort_by_key(|(name, _)| *name);

    let canonical_headers: String = signed
        .iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect();
    let signed_headers = signed
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "POST\n{path}\n\n{canonical_headers}\n{signed_headers}\n{payload_hash}",
        path = params.path,
        payload_hash = sha256_hex(payload.as_bytes()),
    );

    let credential_scope = format!(
        "{date_stamp}/{region}/{service}/{SCOPE_TERMINATOR}",
        region = params.region,
        service = params.service,
    );

    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{credential_scope}\n{}",
        sha256_hex(canonical_request.as_bytes())
    );

    let signing_key = derive_signing_key(
        params.secret_key,
        &date_stamp,
        params.region,
        params.service,
    )?;
    let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

    let authorization = format!(
        "{ALGORITHM} Credential={access_key}/{credential_scope}, SignedHeaders={signed_headers}, Signature={signature}",
        access_key = params.access_key,
    );

    let mut headers: Vec<(String, String)> = signed
        .into_iter()
        .map(|(name, value)| (name.to_owned(), value))
        .collect();
    headers.push(("authorization".to_owned(), authorization));

    Ok(SignedRequest {
        method: "POST",
        path: params.path.to_owned(),
        headers,
        body: payload.to_owned(),
    })
}

/// `kSigning = HMAC(HMAC(HMAC(HMAC("AWS4" + secret, date), region), service), "aws4_request")`
fn derive_signing_key(
    secret_key: &str,
    date_stamp: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, CatalogError> {
    let k_date = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date_stamp.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, SCOPE_TERMINATOR.as_bytes())
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, CatalogError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| CatalogError::Signing(format!("invalid HMAC key: {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
