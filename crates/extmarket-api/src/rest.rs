// Async HTTP client for the catalog's PostgREST-style endpoint.
//
// Base path: /rest/v1/
// Auth: `apikey` header plus `Authorization: Bearer <key>`
// Totals: `Prefer: count=exact`, read back from `Content-Range`.

use reqwest::header::{AUTHORIZATION, CONTENT_RANGE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::query::RemoteQuery;
use crate::transport::TransportConfig;
use crate::types::{self, ExtensionDetailRow, ExtensionRow, LastUpdatedRow, Page};

const EXTENSIONS_TABLE: &str = "extensions";

// ── Error response shape from the REST endpoint ──────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the catalog REST endpoint.
///
/// Read-only: the marketplace never writes through this surface.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RestClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API key and transport config.
    ///
    /// Injects `apikey` and `Authorization: Bearer` as default headers.
    pub fn from_api_key(
        base_url: &str,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();

        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|e| Error::Authentication {
                message: format!("invalid API key header value: {e}"),
            })?;
        key_value.set_sensitive(true);
        headers.insert("apikey", key_value);

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid API key header value: {e}"),
            })?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base URL ends with `/rest/v1/`.
    ///
    /// Accepts either the project root (`https://x.example.co`) or the
    /// REST root itself (`https://x.example.co/rest/v1`).
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/rest/v1") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/rest/v1/"));
        }

        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP plumbing ────────────────────────────────────────────────

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(self.parse_error(status, resp).await);
        }
        let body = resp.text().await?;
        decode(body)
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::InvalidApiKey;
        }

        let raw = resp.text().await.unwrap_or_default();

        if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
            let mut message = err.message.unwrap_or_else(|| status.to_string());
            if let Some(hint) = err.hint {
                message = format!("{message} ({hint})");
            }
            Error::Rest {
                status: status.as_u16(),
                message,
                code: err.code,
            }
        } else {
            Error::Rest {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
                code: None,
            }
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Fetch one window of list rows plus the exact total count.
    pub async fn query_extensions(&self, query: &RemoteQuery) -> Result<Page<ExtensionRow>, Error> {
        let url = self.url(EXTENSIONS_TABLE)?;
        let mut params = vec![("select".to_owned(), types::LIST_COLUMNS.to_owned())];
        params.extend(query.to_query_pairs());
        debug!("GET {url} params={params:?}");

        let resp = self
            .http
            .get(url)
            .query(&params)
            .header("Prefer", "count=exact")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(self.parse_error(status, resp).await);
        }

        let content_range = resp
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        let total_count = parse_content_range_total(&content_range)?;

        let body = resp.text().await?;
        let data: Vec<ExtensionRow> = decode(body)?;

        Ok(Page {
            offset: query.offset,
            limit: query.limit,
            total_count,
            data,
        })
    }

    /// Fetch the full row for one extension. `None` if the id is unknown.
    pub async fn get_extension(&self, id: u64) -> Result<Option<ExtensionDetailRow>, Error> {
        let params = [
            ("select".to_owned(), "*".to_owned()),
            ("id".to_owned(), format!("eq.{id}")),
            ("limit".to_owned(), "1".to_owned()),
        ];
        let rows: Vec<ExtensionDetailRow> =
            self.get_with_params(EXTENSIONS_TABLE, &params).await?;
        Ok(rows.into_iter().next())
    }

    /// Most recent `last_updated` across the whole catalog (data freshness).
    pub async fn latest_update(&self) -> Result<Option<String>, Error> {
        let params = [
            ("select".to_owned(), "last_updated".to_owned()),
            ("order".to_owned(), "last_updated.desc.nullslast".to_owned()),
            ("limit".to_owned(), "1".to_owned()),
        ];
        let rows: Vec<LastUpdatedRow> = self.get_with_params(EXTENSIONS_TABLE, &params).await?;
        Ok(rows.into_iter().next().and_then(|r| r.last_updated))
    }
}

fn decode<T: DeserializeOwned>(body: String) -> Result<T, Error> {
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

/// Extract the total from `Content-Range: <range>/<total>`.
///
/// `0-49/1234` → 1234, `*/0` → 0. A `*` total means the endpoint did not
/// count, which is an error for a counted query.
pub fn parse_content_range_total(raw: &str) -> Result<u64, Error> {
    raw.rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse::<u64>().ok())
        .ok_or_else(|| Error::ContentRange {
            raw: raw.to_owned(),
        })
}
