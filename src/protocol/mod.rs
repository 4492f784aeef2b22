use std::path::PathBuf;

use serde_json::{json, Value};

use crate::model::account::Account;
use crate::model::catalog::Catalog;
use crate::parsers::ts;
use crate::services::error::JobError;
use crate::services::{account, catalog, encoding, jobs, memory, merge, qa};

mod command;
use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

/// Job failures additionally carry the stable error code; the message is
/// localized through the active catalog.
fn job_err(id: Value, e: JobError) -> String {
    json!({
        "id": id,
        "status": "error",
        "code": e.code(),
        "message": catalog::localized_error(&e)
    })
    .to_string()
}

fn catalog_from_payload(payload: &Value, key: &str) -> Result<Catalog, String> {
    let value = payload
        .get(key)
        .cloned()
        .ok_or_else(|| format!("payload.{key} is required"))?;
    serde_json::from_value(value).map_err(|e| format!("invalid payload.{key}: {e}"))
}

/// Account resolution order: inline object, stored account path, process
/// default. No account at all is the MissingConfig job error.
fn resolve_account(payload: &Value) -> Result<Account, JobError> {
    if let Some(inline) = payload.get("account") {
        if !inline.is_null() {
            return serde_json::from_value(inline.clone())
                .map_err(|_| JobError::MissingConfig);
        }
    }

    if let Some(path) = payload.get("account_path").and_then(|v| v.as_str()) {
        if !path.is_empty() {
            return account::open_account(path).map_err(|e| {
                log::error!("Failed to open account: {e}");
                JobError::MissingConfig
            });
        }
    }

    account::get_default_account().ok_or(JobError::MissingConfig)
}

fn string_args(payload: &Value) -> Vec<String> {
    payload
        .get("args")
        .and_then(|v| v.as_array())
        .map(|a| {
            a.iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

pub fn handle(input: &str) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let cmd_str = get_cmd(&req);
    let payload = get_payload(&req);

    match Command::from(cmd_str) {
        Command::Ping => ok(id, json!({ "message": "wolkanlin-core alive" })),

        Command::CatalogParse => {
            let text = payload.get("text").and_then(|v| v.as_str()).unwrap_or("");
            if text.is_empty() {
                return err(id, "payload.text is required");
            }
            match ts::parse(text) {
                Ok(catalog) => ok(id, json!({ "catalog": catalog })),
                Err(e) => err(id, e),
            }
        }

        Command::CatalogRender => {
            let catalog = match catalog_from_payload(payload, "catalog") {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };
            match ts::render(&catalog) {
                Ok(text) => ok(id, json!({ "text": text })),
                Err(e) => err(id, e),
            }
        }

        Command::CatalogTemplate => {
            let template = catalog::template();
            match ts::render(&template) {
                Ok(text) => ok(id, json!({ "catalog": template, "text": text })),
                Err(e) => err(id, e),
            }
        }

        Command::CatalogQa => {
            let catalog = match catalog_from_payload(payload, "catalog") {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };
            let issues = qa::run(&catalog);
            ok(id, json!({ "issues": issues }))
        }

        Command::CatalogMerge => {
            let existing = match catalog_from_payload(payload, "catalog") {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };
            // Template defaults to the built-in source catalog.
            let template = if payload.get("template").is_some() {
                match catalog_from_payload(payload, "template") {
                    Ok(c) => c,
                    Err(e) => return err(id, e),
                }
            } else {
                catalog::template()
            };

            let memory_path = memory::store::default_path();
            let mut entries = memory::store::load(&memory_path);
            let (merged, report) = merge::merge(&existing, &template, &mut entries);
            if let Err(e) = memory::store::save(&memory_path, &entries) {
                log::warn!("Failed to save translation memory: {e}");
            }

            ok(id, json!({ "catalog": merged, "report": report }))
        }

        Command::CatalogTr => {
            let msg_id = payload.get("message_id").and_then(|v| v.as_str()).unwrap_or("");
            if msg_id.is_empty() {
                return err(id, "payload.message_id is required");
            }
            let args = string_args(payload);
            ok(id, json!({ "text": catalog::tr(msg_id, &args) }))
        }

        Command::CatalogLoad => {
            let path = payload.get("path").and_then(|v| v.as_str()).unwrap_or("");
            if path.is_empty() {
                return err(id, "payload.path is required");
            }
            match catalog::load(&PathBuf::from(path)) {
                Ok((language, count)) => {
                    ok(id, json!({ "language": language, "messages": count }))
                }
                Err(e) => err(id, e),
            }
        }

        Command::DetectEncoding => {
            let path = payload.get("path").and_then(|v| v.as_str()).unwrap_or("");
            if path.is_empty() {
                return err(id, "payload.path is required");
            }
            match encoding::detect_from_file(&PathBuf::from(path)) {
                Ok(result) => ok(id, serde_json::to_value(result).unwrap_or(json!({}))),
                Err(e) => err(id, e),
            }
        }

        Command::AccountList => ok(id, json!({ "accounts": account::list_accounts() })),

        Command::AccountCreate => {
            let value = payload.get("account").cloned().unwrap_or(Value::Null);
            if value.is_null() {
                return err(id, "payload.account is required");
            }
            let acc: Account = match serde_json::from_value(value) {
                Ok(a) => a,
                Err(e) => return err(id, format!("invalid payload.account: {e}")),
            };
            match account::create_account(acc) {
                Ok(created) => ok(id, json!({ "account": created })),
                Err(e) => err(id, e),
            }
        }

        Command::AccountOpen => {
            let path = payload.get("account_path").and_then(|v| v.as_str()).unwrap_or("");
            if path.is_empty() {
                return err(id, "payload.account_path is required");
            }
            match account::open_account(path) {
                Ok(acc) => ok(id, json!({ "account": acc })),
                Err(e) => err(id, e),
            }
        }

        Command::AccountSave => {
            let value = payload.get("account").cloned().unwrap_or(Value::Null);
            if value.is_null() {
                return err(id, "payload.account is required");
            }
            let acc: Account = match serde_json::from_value(value) {
                Ok(a) => a,
                Err(e) => return err(id, format!("invalid payload.account: {e}")),
            };
            match account::save_account(acc) {
                Ok(saved) => ok(id, json!({ "account": saved })),
                Err(e) => err(id, e),
            }
        }

        Command::AccountUse => {
            // Clearing the default is an empty payload.
            if payload.is_null()
                || (payload.get("account").is_none() && payload.get("account_path").is_none())
            {
                account::set_default_account(None);
                return ok(id, json!({ "default": Value::Null }));
            }
            match resolve_account(payload) {
                Ok(acc) => {
                    let name = acc.name.clone();
                    account::set_default_account(Some(acc));
                    ok(id, json!({ "default": name }))
                }
                Err(e) => job_err(id, e),
            }
        }

        Command::UserGet => {
            let user_id = payload.get("user_id").and_then(|v| v.as_str()).unwrap_or("");
            let acc = match resolve_account(payload) {
                Ok(a) => a,
                Err(e) => return job_err(id, e),
            };
            match jobs::get_user(&acc, user_id) {
                Ok(user) => ok(id, json!({ "user": user })),
                Err(e) => job_err(id, e),
            }
        }

        Command::UserList => {
            let acc = match resolve_account(payload) {
                Ok(a) => a,
                Err(e) => return job_err(id, e),
            };
            match jobs::get_user_list(&acc) {
                Ok(users) => ok(id, json!({ "users": users })),
                Err(e) => job_err(id, e),
            }
        }

        Command::StatusGet => {
            let acc = match resolve_account(payload) {
                Ok(a) => a,
                Err(e) => return job_err(id, e),
            };
            match jobs::get_server_status(&acc) {
                Ok(status) => ok(id, json!({ "server_status": status })),
                Err(e) => job_err(id, e),
            }
        }

        Command::AppPasswordGet => {
            let acc = match resolve_account(payload) {
                Ok(a) => a,
                Err(e) => return job_err(id, e),
            };
            match jobs::get_app_password(&acc) {
                Ok(app_password) => ok(id, json!({ "app_password": app_password })),
                Err(e) => job_err(id, e),
            }
        }

        Command::AppPasswordDelete => {
            let acc = match resolve_account(payload) {
                Ok(a) => a,
                Err(e) => return job_err(id, e),
            };
            match jobs::delete_app_password(&acc) {
                Ok(()) => ok(id, json!({ "deleted": true })),
                Err(e) => job_err(id, e),
            }
        }

        Command::WipeCheck => {
            let token = payload.get("token").and_then(|v| v.as_str());
            let acc = match resolve_account(payload) {
                Ok(a) => a,
                Err(e) => return job_err(id, e),
            };
            match jobs::check_wipe_status(&acc, token) {
                Ok(status) => ok(id, json!({ "wipe_status": status })),
                Err(e) => job_err(id, e),
            }
        }

        Command::Unknown => err(id, "unknown command"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(request: Value) -> Value {
        serde_json::from_str(&handle(&request.to_string())).unwrap()
    }

    #[test]
    fn ping_answers() {
        let resp = roundtrip(json!({ "id": 1, "cmd": "ping" }));
        assert_eq!(resp["status"], "ok");
        assert_eq!(resp["id"], 1);
    }

    #[test]
    fn invalid_json_is_a_protocol_error() {
        let resp: Value = serde_json::from_str(&handle("{nope")).unwrap();
        assert_eq!(resp["status"], "error");
        assert_eq!(resp["message"], "invalid json");
    }

    #[test]
    fn unknown_command_is_rejected() {
        let resp = roundtrip(json!({ "id": 2, "cmd": "nope" }));
        assert_eq!(resp["status"], "error");
        assert_eq!(resp["message"], "unknown command");
    }

    #[test]
    fn template_renders_the_shipped_catalog() {
        let resp = roundtrip(json!({ "id": 3, "cmd": "catalog.template" }));
        assert_eq!(resp["status"], "ok");
        let text = resp["payload"]["text"].as_str().unwrap();
        assert!(text.contains("<TS version=\"2.1\""));
        assert!(text.contains("libwolkanlin-error-authn-failed"));
        assert!(text.contains("type=\"unfinished\""));
    }

    #[test]
    fn parse_and_qa_through_the_protocol() {
        let text = r#"<TS version="2.1" language="en" sourcelanguage="en">
<context><name></name>
    <message id="dup"><source>a</source><translation type="unfinished"></translation></message>
    <message id="dup"><source>b</source><translation type="unfinished"></translation></message>
</context>
</TS>"#;

        let parsed = roundtrip(json!({ "id": 4, "cmd": "catalog.parse", "payload": { "text": text } }));
        assert_eq!(parsed["status"], "ok");

        let qa = roundtrip(json!({
            "id": 5,
            "cmd": "catalog.qa",
            "payload": { "catalog": parsed["payload"]["catalog"] }
        }));
        assert_eq!(qa["status"], "ok");
        let issues = qa["payload"]["issues"].as_array().unwrap();
        assert!(issues.iter().any(|i| i["code"] == "DUPLICATE_ID"));
    }

    #[test]
    fn tr_resolves_builtin_messages() {
        let resp = roundtrip(json!({
            "id": 6,
            "cmd": "catalog.tr",
            "payload": { "message_id": "libwolkanlin-error-request-timeout", "args": ["300"] }
        }));
        assert_eq!(resp["payload"]["text"], "The request timed out after 300 seconds.");
    }

    #[test]
    fn job_without_account_reports_missing_config() {
        let resp = roundtrip(json!({ "id": 7, "cmd": "user.list", "payload": {} }));
        assert_eq!(resp["status"], "error");
        assert_eq!(resp["code"], "missing-config");
        assert_eq!(resp["message"], "No configuration set.");
    }

    #[test]
    fn job_with_inline_account_validates_input_locally() {
        let resp = roundtrip(json!({
            "id": 8,
            "cmd": "user.get",
            "payload": {
                "user_id": "",
                "account": { "name": "t", "host": "cloud.example.org",
                             "username": "u", "password": "p" }
            }
        }));
        assert_eq!(resp["status"], "error");
        assert_eq!(resp["code"], "empty-user");
        assert_eq!(resp["message"], "Can not get user data for empty user name.");
    }

    #[test]
    fn missing_payload_fields_are_protocol_errors() {
        let resp = roundtrip(json!({ "id": 9, "cmd": "catalog.parse", "payload": {} }));
        assert_eq!(resp["status"], "error");

        let resp = roundtrip(json!({ "id": 10, "cmd": "catalog.render", "payload": {} }));
        assert_eq!(resp["status"], "error");
        assert_eq!(resp["message"], "payload.catalog is required");
    }
}
