use reqwest::StatusCode;
use serde_json::Value;

use crate::model::account::Account;
use crate::model::status::{ServerStatus, WipeStatus};
use crate::model::user::User;
use crate::services::api::{self, Method, RequestSpec};
use crate::services::catalog;

use super::error::JobError;

fn ocs_data(value: &Value) -> Result<Value, JobError> {
    value
        .pointer("/ocs/data")
        .cloned()
        .ok_or(JobError::WrongOutputType)
}

/// GET `/ocs/v1.php/cloud/users/{id}`, metadata for a single user.
pub fn get_user(account: &Account, id: &str) -> Result<User, JobError> {
    if id.trim().is_empty() {
        return Err(JobError::EmptyUser);
    }

    log::info!(
        "{}: {} = {id}",
        catalog::tr("libwolkanlin-job-desc-get-user-title", &[]),
        catalog::tr("libwolkanlin-job-desc-get-user-field1", &[])
    );

    let spec = RequestSpec::ocs_get(format!("/ocs/v1.php/cloud/users/{id}"));
    let (status, body) = api::perform(account, &spec)?;
    user_from_reply(status, &body, id)
}

fn user_from_reply(status: StatusCode, body: &str, id: &str) -> Result<User, JobError> {
    if !status.is_success() {
        return Err(api::classify_http(status, body));
    }

    let (value, ocs_code) = api::check_json_object(body)?;
    if ocs_code == 404 {
        return Err(JobError::NotFound(id.to_string()));
    }
    if ocs_code > 0 {
        return Err(JobError::Unknown);
    }

    serde_json::from_value(ocs_data(&value)?).map_err(|e| JobError::JsonParse(e.to_string()))
}

/// GET `/ocs/v1.php/cloud/users`, ids of all users on the server.
pub fn get_user_list(account: &Account) -> Result<Vec<String>, JobError> {
    log::info!("{}", catalog::tr("libwolkanlin-job-desc-get-users-title", &[]));

    let spec = RequestSpec::ocs_get("/ocs/v1.php/cloud/users");
    let (status, body) = api::perform(account, &spec)?;
    user_list_from_reply(status, &body)
}

fn user_list_from_reply(status: StatusCode, body: &str) -> Result<Vec<String>, JobError> {
    if !status.is_success() {
        return Err(api::classify_http(status, body));
    }

    let (value, ocs_code) = api::check_json_object(body)?;
    if ocs_code > 0 {
        return Err(JobError::Unknown);
    }

    let users = ocs_data(&value)?
        .get("users")
        .and_then(|u| u.as_array())
        .ok_or(JobError::WrongOutputType)?
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();
    Ok(users)
}

/// GET `/status.php`, public server status. A plain endpoint: neither
/// authentication nor the OCS conventions apply.
pub fn get_server_status(account: &Account) -> Result<ServerStatus, JobError> {
    log::info!("{}", catalog::tr("libwolkanlin-job-desc-get-server-status-title", &[]));

    let spec = server_status_spec();
    let (status, body) = api::perform(account, &spec)?;
    server_status_from_reply(status, &body)
}

fn server_status_spec() -> RequestSpec {
    RequestSpec {
        method: Method::Get,
        path: "/status.php".to_string(),
        requires_auth: false,
        ocs: false,
        form: None,
    }
}

fn server_status_from_reply(status: StatusCode, body: &str) -> Result<ServerStatus, JobError> {
    if !status.is_success() {
        return Err(api::classify_http(status, body));
    }

    let (value, _) = api::check_json_object(body)?;
    serde_json::from_value(value).map_err(|e| JobError::JsonParse(e.to_string()))
}

/// GET `/ocs/v2.php/core/getapppassword` converts the login password into
/// an application password. 403 means the current password already is one.
pub fn get_app_password(account: &Account) -> Result<String, JobError> {
    log::info!("{}", catalog::tr("libwolkanlin-job-desc-get-apppass-title", &[]));

    let spec = RequestSpec::ocs_get("/ocs/v2.php/core/getapppassword");
    let (status, body) = api::perform(account, &spec)?;
    app_password_from_reply(status, &body)
}

fn app_password_from_reply(status: StatusCode, body: &str) -> Result<String, JobError> {
    if status == StatusCode::FORBIDDEN {
        return Err(JobError::AlreadyAppPassword);
    }
    if !status.is_success() {
        return Err(api::classify_http(status, body));
    }

    let (value, ocs_code) = api::check_json_object(body)?;
    if ocs_code > 0 {
        return Err(JobError::Unknown);
    }

    ocs_data(&value)?
        .get("apppassword")
        .and_then(|p| p.as_str())
        .map(str::to_string)
        .ok_or(JobError::WrongOutputType)
}

/// DELETE `/ocs/v2.php/core/apppassword` invalidates the application
/// password used for this request.
pub fn delete_app_password(account: &Account) -> Result<(), JobError> {
    log::info!("{}", catalog::tr("libwolkanlin-job-desc-del-apppass-title", &[]));

    let spec = RequestSpec {
        method: Method::Delete,
        path: "/ocs/v2.php/core/apppassword".to_string(),
        requires_auth: true,
        ocs: true,
        form: None,
    };
    let (status, body) = api::perform(account, &spec)?;

    if !status.is_success() {
        return Err(api::classify_http(status, &body));
    }

    let (_, ocs_code) = api::check_json_object(&body)?;
    if ocs_code > 0 {
        return Err(JobError::Unknown);
    }
    Ok(())
}

/// POST `/index.php/core/wipe/check` asks whether a remote wipe is
/// pending for the given app password/token. Sent without authentication,
/// OCS header or `format=json`; the server answers 404 when nothing is
/// pending.
pub fn check_wipe_status(account: &Account, token: Option<&str>) -> Result<WipeStatus, JobError> {
    log::info!("{}", catalog::tr("libwolkanlin-job-desc-get-wipe-status-title", &[]));

    let token = match token {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => account.password.clone(),
    };
    if token.is_empty() {
        return Err(JobError::MissingToken);
    }

    let spec = RequestSpec {
        method: Method::Post,
        path: "/index.php/core/wipe/check".to_string(),
        requires_auth: false,
        ocs: false,
        form: Some(vec![("token".to_string(), token)]),
    };
    let (status, body) = api::perform(account, &spec)?;
    wipe_status_from_reply(status, &body)
}

fn wipe_status_from_reply(status: StatusCode, body: &str) -> Result<WipeStatus, JobError> {
    if status == StatusCode::NOT_FOUND {
        return Ok(WipeStatus { wipe: false });
    }
    if !status.is_success() {
        return Err(api::classify_http(status, body));
    }

    let (value, _) = api::check_json_object(body)?;
    serde_json::from_value(value).map_err(|e| JobError::JsonParse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_BODY: &str = r#"{
        "ocs": {
            "meta": {"status": "ok", "statuscode": 100, "message": "OK"},
            "data": {
                "enabled": true,
                "id": "jdoe",
                "displayname": "John Doe",
                "email": "jdoe@example.org",
                "groups": ["users"],
                "quota": {"free": 100, "used": 10, "quota": 110, "total": 110, "relative": 9.1}
            }
        }
    }"#;

    #[test]
    fn user_reply_parses_ocs_data() {
        let user = user_from_reply(StatusCode::OK, USER_BODY, "jdoe").unwrap();
        assert_eq!(user.id, "jdoe");
        assert_eq!(user.displayname, "John Doe");
        assert_eq!(user.quota.used, 10);
    }

    #[test]
    fn user_reply_maps_ocs_404_to_not_found() {
        let body = r#"{"ocs":{"meta":{"status":"failure","statuscode":404},"data":{}}}"#;
        let err = user_from_reply(StatusCode::OK, body, "nobody").unwrap_err();
        assert_eq!(err, JobError::NotFound("nobody".to_string()));
    }

    #[test]
    fn user_reply_maps_http_401() {
        let err = user_from_reply(StatusCode::UNAUTHORIZED, "", "jdoe").unwrap_err();
        assert_eq!(err, JobError::AuthNFailed);
    }

    #[test]
    fn empty_user_id_is_rejected_before_any_request() {
        let err = get_user(&Account::default(), "  ").unwrap_err();
        assert_eq!(err, JobError::EmptyUser);
    }

    #[test]
    fn user_list_reply_extracts_ids() {
        let body = r#"{"ocs":{"meta":{"status":"ok"},"data":{"users":["admin","jdoe"]}}}"#;
        let users = user_list_from_reply(StatusCode::OK, body).unwrap();
        assert_eq!(users, vec!["admin", "jdoe"]);
    }

    #[test]
    fn server_status_is_a_plain_request() {
        let spec = server_status_spec();
        assert!(!spec.ocs);
        assert!(!spec.requires_auth);

        let account = Account {
            host: "cloud.example.org".to_string(),
            ..Account::default()
        };
        let url = api::build_url(&account, &spec).unwrap();
        assert_eq!(url.as_str(), "https://cloud.example.org/status.php");
        assert!(url.query().is_none());
    }

    #[test]
    fn server_status_reply_parses() {
        let body = r#"{"installed":true,"maintenance":true,"version":"21.0.0.18","productname":"Nextcloud"}"#;
        let status = server_status_from_reply(StatusCode::OK, body).unwrap();
        assert!(status.maintenance);
        assert_eq!(status.version, "21.0.0.18");
    }

    #[test]
    fn app_password_reply_handles_conversion() {
        let body = r#"{"ocs":{"meta":{"status":"ok"},"data":{"apppassword":"abc123"}}}"#;
        assert_eq!(
            app_password_from_reply(StatusCode::OK, body).unwrap(),
            "abc123"
        );
        assert_eq!(
            app_password_from_reply(StatusCode::FORBIDDEN, "").unwrap_err(),
            JobError::AlreadyAppPassword
        );
    }

    #[test]
    fn wipe_404_means_no_wipe_pending() {
        let status = wipe_status_from_reply(StatusCode::NOT_FOUND, "").unwrap();
        assert!(!status.wipe);

        let status = wipe_status_from_reply(StatusCode::OK, r#"{"wipe":true}"#).unwrap();
        assert!(status.wipe);
    }

    #[test]
    fn wipe_needs_password_or_token() {
        let account = Account {
            host: "cloud.example.org".to_string(),
            ..Account::default()
        };
        let err = check_wipe_status(&account, None).unwrap_err();
        assert_eq!(err, JobError::MissingToken);
    }
}
