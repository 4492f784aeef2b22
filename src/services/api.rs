use std::{thread, time::Duration};

use rand::{thread_rng, Rng};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde_json::Value;

use crate::model::account::Account;
use crate::services::catalog;

use super::error::JobError;

const MAX_RETRIES: usize = 3;
const BASE_DELAY_MS: u64 = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

/// What a single API request looks like before an account is applied.
pub struct RequestSpec {
    pub method: Method,
    /// Path below the install prefix, e.g. `/ocs/v1.php/cloud/users`.
    pub path: String,
    pub requires_auth: bool,
    /// OCS endpoints need the `OCS-APIRequest` header and `format=json`;
    /// the wipe endpoint explicitly must not send either.
    pub ocs: bool,
    /// Form-encoded body, implies a POST payload.
    pub form: Option<Vec<(String, String)>>,
}

impl RequestSpec {
    pub fn ocs_get(path: impl Into<String>) -> Self {
        RequestSpec {
            method: Method::Get,
            path: path.into(),
            requires_auth: true,
            ocs: true,
            form: None,
        }
    }
}

fn backoff(attempt: usize) -> Duration {
    let jitter: u64 = thread_rng().gen_range(0..200);
    let ms = BASE_DELAY_MS * (2_u64.pow(attempt as u32)) + jitter;
    Duration::from_millis(ms)
}

// 408/429/5xx are typically temporary
fn should_retry_http(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

/// Credential checks before anything goes on the wire.
pub fn check_account(account: &Account, requires_auth: bool) -> Result<(), JobError> {
    if account.host.trim().is_empty() {
        return Err(JobError::MissingHost);
    }
    if requires_auth && account.username.trim().is_empty() {
        return Err(JobError::MissingUser);
    }
    if requires_auth && account.password.is_empty() {
        return Err(JobError::MissingPassword);
    }
    Ok(())
}

pub fn build_url(account: &Account, spec: &RequestSpec) -> Result<Url, JobError> {
    let scheme = if account.use_ssl { "https" } else { "http" };

    let mut raw = format!("{scheme}://{}", account.host);
    if account.port != 0 {
        raw.push_str(&format!(":{}", account.port));
    }

    let prefix = account.install_path.trim_end_matches('/');
    if !prefix.is_empty() {
        if !prefix.starts_with('/') {
            raw.push('/');
        }
        raw.push_str(prefix);
    }
    raw.push_str(&spec.path);

    if spec.ocs {
        raw.push_str("?format=json");
    }

    Url::parse(&raw).map_err(|_| JobError::InvalidRequestUrl(raw))
}

fn build_client(account: &Account) -> Result<Client, JobError> {
    let mut builder = Client::builder().danger_accept_invalid_certs(account.ignore_ssl_errors);
    if account.request_timeout > 0 {
        builder = builder.timeout(Duration::from_secs(account.request_timeout));
    }
    builder
        .build()
        .map_err(|e| classify_transport(&e, account.request_timeout))
}

/// Perform the request with retries on temporary failures and return the
/// final HTTP status and body. Only transport-level problems are errors
/// here; HTTP error statuses are left to the caller so jobs can apply
/// their own meaning to 403/404.
pub fn perform(account: &Account, spec: &RequestSpec) -> Result<(StatusCode, String), JobError> {
    log::info!("{}", catalog::tr("libwolkanlin-info-msg-req-setup", &[]));

    check_account(account, spec.requires_auth)?;
    let url = build_url(account, spec)?;
    let client = build_client(account)?;

    log::info!("{}", catalog::tr("libwolkanlin-info-msg-req-send", &[]));
    log::debug!("API URL: {url}");

    let mut last_err: Option<JobError> = None;

    for attempt in 0..MAX_RETRIES {
        let mut req = match spec.method {
            Method::Get => client.get(url.clone()),
            Method::Post => client.post(url.clone()),
            Method::Delete => client.delete(url.clone()),
        };

        req = req
            .header("User-Agent", &account.user_agent)
            .header("Accept", "application/json");
        if spec.ocs {
            req = req.header("OCS-APIRequest", "true");
        }
        if spec.requires_auth {
            req = req.basic_auth(&account.username, Some(&account.password));
        }
        if let Some(form) = &spec.form {
            req = req.form(form);
        }

        match req.send() {
            Ok(resp) => {
                let status = resp.status();
                let body = match resp.text() {
                    Ok(t) => t,
                    Err(e) => {
                        last_err = Some(classify_transport(&e, account.request_timeout));
                        thread::sleep(backoff(attempt));
                        continue;
                    }
                };

                log::info!("{}", catalog::tr("libwolkanlin-info-msg-req-checking", &[]));
                log::debug!("HTTP status code: {}", status.as_u16());

                if !status.is_success() && should_retry_http(status) && attempt + 1 < MAX_RETRIES {
                    last_err = Some(classify_http(status, &body));
                    thread::sleep(backoff(attempt));
                    continue;
                }

                return Ok((status, body));
            }
            Err(e) => {
                let err = classify_transport(&e, account.request_timeout);
                // Timeouts and SSL failures are final, retry the rest.
                let retryable = matches!(err, JobError::Network(_));
                last_err = Some(err);
                if retryable && attempt + 1 < MAX_RETRIES {
                    thread::sleep(backoff(attempt));
                    continue;
                }
                break;
            }
        }
    }

    Err(last_err.unwrap_or(JobError::Unknown))
}

pub fn classify_transport(e: &reqwest::Error, timeout_secs: u64) -> JobError {
    if e.is_timeout() {
        return JobError::RequestTimedOut(timeout_secs);
    }

    let detail = e.to_string();
    let lowered = detail.to_lowercase();
    if lowered.contains("certificate") || lowered.contains("ssl") || lowered.contains("tls") {
        log::error!("SSL error: {detail}");
        return JobError::Ssl;
    }

    log::error!("Network error: {detail}");
    JobError::Network(detail)
}

/// Map an HTTP error status onto the job error taxonomy. Jobs with special
/// meanings for 403/404 check those before falling back here.
pub fn classify_http(status: StatusCode, body: &str) -> JobError {
    match status {
        StatusCode::UNAUTHORIZED => JobError::AuthNFailed,
        StatusCode::FORBIDDEN => JobError::AuthZFailed,
        _ => JobError::Network(extract_error_message(status, body)),
    }
}

/// Pull a human readable message out of an error reply body. OCS wraps it
/// in `ocs.meta.message`, other replies sometimes in a flat `message`;
/// otherwise a bounded piece of the raw body has to do.
fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = v
            .get("ocs")
            .and_then(|o| o.get("meta"))
            .and_then(|m| m.get("message"))
            .and_then(|m| m.as_str())
        {
            return format!("HTTP {}: {msg}", status.as_u16());
        }
        if let Some(msg) = v.get("message").and_then(|m| m.as_str()) {
            return format!("HTTP {}: {msg}", status.as_u16());
        }
    }

    let trimmed = body.trim();
    let snippet: String = trimmed.chars().take(400).collect();
    if snippet.len() < trimmed.len() {
        format!("HTTP {}: {snippet}...", status.as_u16())
    } else {
        format!("HTTP {}: {snippet}", status.as_u16())
    }
}

/// Validate a reply that must contain a JSON object, per the common reply
/// handling of all jobs: non-empty body, valid JSON, object shape, and the
/// OCS failure status code if the envelope carries one.
pub fn check_json_object(body: &str) -> Result<(Value, i64), JobError> {
    if body.trim().is_empty() {
        return Err(JobError::EmptyReply);
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| JobError::JsonParse(e.to_string()))?;

    if value.is_null() {
        return Err(JobError::EmptyReply);
    }
    if !value.is_object() {
        return Err(JobError::WrongOutputType);
    }

    let mut status_code = 0i64;
    if let Some(meta) = value.get("ocs").and_then(|o| o.get("meta")) {
        let failed = meta
            .get("status")
            .and_then(|s| s.as_str())
            .map(|s| s.eq_ignore_ascii_case("failure"))
            .unwrap_or(false);
        if failed {
            status_code = meta.get("statuscode").and_then(|c| c.as_i64()).unwrap_or(0);
            log::debug!("OCS status code: {status_code}");
        }
    }

    Ok((value, status_code))
}
