use std::sync::Arc;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::config::credentials::Credentials;
use crate::helpers::time::now_u32;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::parser::params::{
    first_query_value, parse_rtc_params, parse_rtm_params, resolve_subject, RtcPathParams,
    RtmPathParams,
};
use crate::server::error::ApiError;
use crate::server::server::AppState;
use crate::token::{MessagingRequest, RtmRole, TokenError, TokenRequest, TokenSigner};
use crate::utils::constants::{ENDPOINT_RTC, ENDPOINT_RTE, ENDPOINT_RTM};

const RTC_CONTEXT: &str = "error generating RTC token";
const RTM_CONTEXT: &str = "error generating RTM token";
const RTE_CONTEXT: &str = "error generating tokens";

const RTC_PATH: &str = "/rtc/{channelName}/{role}/{tokenType}/{uid}";
const RTM_PATH: &str = "/rtm/{uid}";
const RTE_PATH: &str = "/rte/{channelName}/{role}/{tokenType}/{uid}";

const EXPIRY_PARAM: &str = "expiry";

type PathParams<T> = Result<Path<T>, PathRejection>;
type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtcTokenResponse {
    pub rtc_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtmTokenResponse {
    pub rtm_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BothTokensResponse {
    pub rtc_token: String,
    pub rtm_token: String,
}

/// Read-only request context: credentials, signer and the expiry default.
#[derive(Clone)]
pub struct TokenState {
    pub credentials: Arc<Credentials>,
    pub signer: Arc<dyn TokenSigner>,
    pub default_expiry_seconds: u32,
}

impl TokenState {
    pub fn new(
        credentials: Arc<Credentials>,
        signer: Arc<dyn TokenSigner>,
        default_expiry_seconds: u32,
    ) -> Self {
        Self {
            credentials,
            signer,
            default_expiry_seconds,
        }
    }

    pub fn rtc_request(
        &self,
        path: &RtcPathParams,
        expiry: Option<&str>,
    ) -> Result<TokenRequest, TokenError> {
        Ok(parse_rtc_params(
            path,
            expiry,
            self.default_expiry_seconds,
            now_u32(),
        )?)
    }

    pub fn rtm_request(
        &self,
        path: &RtmPathParams,
        expiry: Option<&str>,
    ) -> Result<MessagingRequest, TokenError> {
        Ok(parse_rtm_params(
            path,
            expiry,
            self.default_expiry_seconds,
            now_u32(),
        )?)
    }

    pub fn sign_rtc(&self, request: &TokenRequest) -> Result<String, TokenError> {
        let subject = resolve_subject(&request.token_type, &request.subject)?;
        Ok(self.signer.sign_communication_token(
            &self.credentials,
            &request.channel_name,
            &subject,
            request.role,
            request.expires_at,
        )?)
    }

    pub fn sign_rtm(&self, subject: &str, expires_at: u32) -> Result<String, TokenError> {
        Ok(self.signer.sign_messaging_token(
            &self.credentials,
            subject,
            RtmRole::User,
            expires_at,
        )?)
    }
}

/// Health and token routes. Trailing slashes are accepted.
pub fn token_router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route(RTC_PATH, get(get_rtc_token))
        .route(&format!("{}/", RTC_PATH), get(get_rtc_token))
        .route(RTM_PATH, get(get_rtm_token))
        .route(&format!("{}/", RTM_PATH), get(get_rtm_token))
        .route(RTE_PATH, get(get_both_tokens))
        .route(&format!("{}/", RTE_PATH), get(get_both_tokens))
}

async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        message: "ping".to_string(),
    })
}

fn reject(metrics: &Metrics, endpoint: &str, context: &str, err: TokenError) -> ApiError {
    warn!(endpoint, reason = err.kind(), "{}: {}", context, err);
    metrics
        .token_failures
        .with_label_values(&[endpoint, err.kind()])
        .inc();
    ApiError::bad_request(context, err)
}

/// Extraction failures get the same JSON body as token errors.
fn reject_request(
    metrics: &Metrics,
    endpoint: &str,
    context: &str,
    detail: impl std::fmt::Display,
) -> ApiError {
    warn!(endpoint, reason = "request", "{}: {}", context, detail);
    metrics
        .token_failures
        .with_label_values(&[endpoint, "request"])
        .inc();
    ApiError::bad_request(context, detail)
}

fn extract<T>(
    metrics: &Metrics,
    endpoint: &str,
    context: &str,
    path: PathParams<T>,
    query: QueryPairs,
) -> Result<(T, Vec<(String, String)>), ApiError> {
    let Path(path) = path.map_err(|e| reject_request(metrics, endpoint, context, e.body_text()))?;
    let Query(query) =
        query.map_err(|e| reject_request(metrics, endpoint, context, e.body_text()))?;
    Ok((path, query))
}

fn observe(metrics: &Metrics, endpoint: &str, start: Instant) {
    metrics
        .token_issue_duration
        .with_label_values(&[endpoint])
        .observe(start.elapsed().as_secs_f64());
}

async fn get_rtc_token(
    State(state): State<AppState>,
    path: PathParams<RtcPathParams>,
    query: QueryPairs,
) -> Result<Json<RtcTokenResponse>, ApiError> {
    let metrics = get_metrics().await;
    let start = Instant::now();
    metrics.token_requests.with_label_values(&[ENDPOINT_RTC]).inc();
    let (path, query) = extract(metrics, ENDPOINT_RTC, RTC_CONTEXT, path, query)?;

    let tokens = &state.token_state;
    let result = tokens
        .rtc_request(&path, first_query_value(&query, EXPIRY_PARAM))
        .and_then(|request| tokens.sign_rtc(&request));
    observe(metrics, ENDPOINT_RTC, start);

    let rtc_token = result.map_err(|e| reject(metrics, ENDPOINT_RTC, RTC_CONTEXT, e))?;
    info!(channel = %path.channel_name, token_type = %path.token_type, "issued rtc token");
    Ok(Json(RtcTokenResponse { rtc_token }))
}

async fn get_rtm_token(
    State(state): State<AppState>,
    path: PathParams<RtmPathParams>,
    query: QueryPairs,
) -> Result<Json<RtmTokenResponse>, ApiError> {
    let metrics = get_metrics().await;
    let start = Instant::now();
    metrics.token_requests.with_label_values(&[ENDPOINT_RTM]).inc();
    let (path, query) = extract(metrics, ENDPOINT_RTM, RTM_CONTEXT, path, query)?;

    let tokens = &state.token_state;
    let result = tokens
        .rtm_request(&path, first_query_value(&query, EXPIRY_PARAM))
        .and_then(|request| tokens.sign_rtm(&request.subject, request.expires_at));
    observe(metrics, ENDPOINT_RTM, start);

    let rtm_token = result.map_err(|e| reject(metrics, ENDPOINT_RTM, RTM_CONTEXT, e))?;
    info!("issued rtm token");
    Ok(Json(RtmTokenResponse { rtm_token }))
}

/// Parse once, then sign both. A parse failure stops before any signing.
async fn get_both_tokens(
    State(state): State<AppState>,
    path: PathParams<RtcPathParams>,
    query: QueryPairs,
) -> Result<Json<BothTokensResponse>, ApiError> {
    let metrics = get_metrics().await;
    let start = Instant::now();
    metrics.token_requests.with_label_values(&[ENDPOINT_RTE]).inc();
    let (path, query) = extract(metrics, ENDPOINT_RTE, RTE_CONTEXT, path, query)?;

    let tokens = &state.token_state;
    let request = tokens
        .rtc_request(&path, first_query_value(&query, EXPIRY_PARAM))
        .map_err(|e| reject(metrics, ENDPOINT_RTE, RTE_CONTEXT, e))?;

    let rtc_token = tokens.sign_rtc(&request);
    let rtm_token = tokens.sign_rtm(&request.subject, request.expires_at);
    observe(metrics, ENDPOINT_RTE, start);

    let rtc_token = rtc_token.map_err(|e| reject(metrics, ENDPOINT_RTE, RTC_CONTEXT, e))?;
    let rtm_token = rtm_token.map_err(|e| reject(metrics, ENDPOINT_RTE, RTM_CONTEXT, e))?;
    info!(channel = %path.channel_name, token_type = %path.token_type, "issued rtc and rtm tokens");
    Ok(Json(BothTokensResponse {
        rtc_token,
        rtm_token,
    }))
}
