use std::path::Path;
use std::sync::{OnceLock, RwLock};

use crate::model::catalog::{Catalog, TsContext};
use crate::model::message::Message;
use crate::parsers::ts;
use crate::services::{encoding, placeholder};

use super::error::JobError;

/// Every user-facing string of the job layer: message id, canonical English
/// source text and the translator-facing extracomment. This table is the
/// single source the template catalog is generated from.
pub const BUILTIN_MESSAGES: &[(&str, &str, &str)] = &[
    (
        "libwolkanlin-job-desc-del-apppass-title",
        "Deleting application password",
        "Job title",
    ),
    (
        "libwolkanlin-job-desc-get-apppass-title",
        "Check for possibility to convert to application password",
        "Job title",
    ),
    (
        "libwolkanlin-error-get-apppass-already-converted",
        "The password used is already an application password.",
        "Error message if app pass conversion fails because an app password is already in use",
    ),
    (
        "libwolkanlin-job-desc-get-user-title",
        "Requesting user data",
        "Job title",
    ),
    (
        "libwolkanlin-job-desc-get-user-field1",
        "User name",
        "Job description field name, means the user name metadata should be requested for",
    ),
    (
        "libwolkanlin-job-desc-get-server-status-title",
        "Requesting server status information",
        "Job title",
    ),
    (
        "libwolkanlin-job-desc-get-users-title",
        "Requesting user list",
        "Job title",
    ),
    (
        "libwolkanlin-job-desc-get-wipe-status-title",
        "Requesting wipe status",
        "Job title",
    ),
    (
        "libwolkanlin-error-get-user-empty-id",
        "Can not get user data for empty user name.",
        "Error message if the user name has not been set.",
    ),
    (
        "libwolkanlin-error-get-user-not-found",
        "Cannot get user information for %1. The user was not found.",
        "Error message if the user was not found, %1 will be replaced by the user name.",
    ),
    (
        "libwolkanlin-error-get-wipe-status-missing-token",
        "Can not get wipe status with empty application password/token.",
        "Error message if the password/token has not been set.",
    ),
    (
        "libwolkanlin-error-unknown-ssl",
        "Can not perform API request. An unknown SSL error has occured.",
        "Error message",
    ),
    (
        "libwolkanlin-info-msg-req-checking",
        "Checking reply",
        "Job info message to display state information",
    ),
    (
        "libwolkanlin-info-msg-req-setup",
        "Setting up request",
        "Job info message to display state information",
    ),
    (
        "libwolkanlin-info-msg-req-send",
        "Sending request",
        "Job info message to display state information",
    ),
    (
        "libwolkanlin-error-missing-config",
        "No configuration set.",
        "Error message",
    ),
    (
        "libwolkanlin-error-missing-host",
        "Missing remote host name.",
        "Error message",
    ),
    (
        "libwolkanlin-error-missing-user",
        "Missing username.",
        "Error message",
    ),
    (
        "libwolkanlin-error-missing-password",
        "Missing user password.",
        "Error message",
    ),
    (
        "libwolkanlin-error-authn-failed",
        "Authentication failed at the remote server, please check your username and password.",
        "Error message",
    ),
    (
        "libwolkanlin-error-authz-failed",
        "Authorization failed, you are not allowed to perform this request.",
        "Error message",
    ),
    (
        "libwolkanlin-error-invalid-req-url",
        "The URL (%1) generated to perform the request is not valid, please check your input values.",
        "Error message, %1 will be the invalid URL string.",
    ),
    (
        "libwolkanlin-error-request-timeout",
        "The request timed out after %1 seconds.",
        "Error message, %1 will be the request timeout in seconds",
    ),
    (
        "libwolkanlin-error-json-parser",
        "Failed to parse the received JSON data: %1",
        "Error message, %1 will be the JSON parser error string.",
    ),
    (
        "libwolkanlin-error-invalid-output-type",
        "Unexpected JSON type in received data.",
        "Error message",
    ),
    (
        "libwolkanlin-error-empty-json",
        "Unexpected empty reply data.",
        "Error message",
    ),
    (
        "libwolkanlin-error-invalid-image-type",
        "Expected reply content of type image, but received content of type “%1”.",
        "Error message",
    ),
    (
        "libwolkanlin-error-unknown",
        "Sorry, but unfortunately an unknown error has occurred.",
        "Error message",
    ),
];

/// The source/template catalog: all built-in messages, unfinished, in one
/// anonymous context. Rendering this is what produces the shipped `.ts`.
pub fn template() -> Catalog {
    let mut catalog = Catalog::new("en", "en");
    catalog.contexts.push(TsContext {
        name: String::new(),
        messages: BUILTIN_MESSAGES
            .iter()
            .map(|(id, source, comment)| Message::unfinished(id, source, Some(comment)))
            .collect(),
    });
    catalog
}

fn active() -> &'static RwLock<Option<Catalog>> {
    static ACTIVE: OnceLock<RwLock<Option<Catalog>>> = OnceLock::new();
    ACTIVE.get_or_init(|| RwLock::new(None))
}

/// Install `catalog` as the process-wide translation source used by
/// [`tr`]. Replaces any previously loaded catalog.
pub fn install(catalog: Catalog) {
    let mut guard = active().write().expect("active catalog lock poisoned");
    log::debug!(
        "Installing catalog for language {:?} with {} messages",
        catalog.language,
        catalog.message_count()
    );
    *guard = Some(catalog);
}

/// Read a `.ts` file from disk (transport encoding detected) and install it
/// as the active catalog. Returns language and message count.
pub fn load(path: &Path) -> Result<(String, usize), String> {
    let text = encoding::read_to_string(path)?;
    let catalog = ts::parse(&text)?;
    let language = catalog.language.clone();
    let count = catalog.message_count();
    install(catalog);
    Ok((language, count))
}

/// Resolve a message id to display text and substitute `%N` placeholders.
///
/// Lookup order: active catalog, then the built-in English source text.
/// An unknown id resolves to the id itself so a missing string stays
/// diagnosable instead of disappearing.
pub fn tr(id: &str, args: &[String]) -> String {
    {
        let guard = active().read().expect("active catalog lock poisoned");
        if let Some(catalog) = guard.as_ref() {
            if let Some(m) = catalog.find(id) {
                return placeholder::substitute(m.display_text(), args);
            }
        }
    }

    match BUILTIN_MESSAGES.iter().find(|(mid, _, _)| *mid == id) {
        Some((_, source, _)) => placeholder::substitute(source, args),
        None => {
            log::warn!("No message with id {id} in catalog or builtins");
            id.to_string()
        }
    }
}

/// Human readable, localized text for a job error.
pub fn localized_error(err: &JobError) -> String {
    match err.message_id() {
        Some(id) => tr(id, &err.args()),
        None => err.to_string(),
    }
}
