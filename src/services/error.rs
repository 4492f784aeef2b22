use thiserror::Error;

/// Everything that can go wrong while performing an API job.
///
/// Each variant maps onto a message id in the built-in catalog so the
/// user-facing text can be localized through a loaded translation file;
/// the `Display` impl carries the canonical English source strings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JobError {
    #[error("No configuration set.")]
    MissingConfig,

    #[error("Missing remote host name.")]
    MissingHost,

    #[error("Missing username.")]
    MissingUser,

    #[error("Missing user password.")]
    MissingPassword,

    /// Wipe status needs an application password or a wipe token.
    #[error("Can not get wipe status with empty application password/token.")]
    MissingToken,

    #[error("Authentication failed at the remote server, please check your username and password.")]
    AuthNFailed,

    #[error("Authorization failed, you are not allowed to perform this request.")]
    AuthZFailed,

    #[error("The URL ({0}) generated to perform the request is not valid, please check your input values.")]
    InvalidRequestUrl(String),

    #[error("The request timed out after {0} seconds.")]
    RequestTimedOut(u64),

    #[error("Failed to parse the received JSON data: {0}")]
    JsonParse(String),

    #[error("Unexpected JSON type in received data.")]
    WrongOutputType,

    #[error("Unexpected empty reply data.")]
    EmptyReply,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Can not perform API request. An unknown SSL error has occured.")]
    Ssl,

    #[error("Can not get user data for empty user name.")]
    EmptyUser,

    #[error("Cannot get user information for {0}. The user was not found.")]
    NotFound(String),

    #[error("The password used is already an application password.")]
    AlreadyAppPassword,

    #[error("Sorry, but unfortunately an unknown error has occurred.")]
    Unknown,
}

impl JobError {
    /// Stable machine-readable code for the protocol.
    pub fn code(&self) -> &'static str {
        match self {
            JobError::MissingConfig => "missing-config",
            JobError::MissingHost => "missing-host",
            JobError::MissingUser => "missing-user",
            JobError::MissingPassword => "missing-password",
            JobError::MissingToken => "missing-token",
            JobError::AuthNFailed => "authn-failed",
            JobError::AuthZFailed => "authz-failed",
            JobError::InvalidRequestUrl(_) => "invalid-request-url",
            JobError::RequestTimedOut(_) => "request-timeout",
            JobError::JsonParse(_) => "json-parse-error",
            JobError::WrongOutputType => "wrong-output-type",
            JobError::EmptyReply => "empty-reply",
            JobError::Network(_) => "network-error",
            JobError::Ssl => "ssl-error",
            JobError::EmptyUser => "empty-user",
            JobError::NotFound(_) => "not-found",
            JobError::AlreadyAppPassword => "already-app-password",
            JobError::Unknown => "unknown",
        }
    }

    /// Catalog id of the user-facing message, `None` when the error has no
    /// translatable text of its own (plain transport errors).
    pub fn message_id(&self) -> Option<&'static str> {
        match self {
            JobError::MissingConfig => Some("libwolkanlin-error-missing-config"),
            JobError::MissingHost => Some("libwolkanlin-error-missing-host"),
            JobError::MissingUser => Some("libwolkanlin-error-missing-user"),
            JobError::MissingPassword => Some("libwolkanlin-error-missing-password"),
            JobError::MissingToken => Some("libwolkanlin-error-get-wipe-status-missing-token"),
            JobError::AuthNFailed => Some("libwolkanlin-error-authn-failed"),
            JobError::AuthZFailed => Some("libwolkanlin-error-authz-failed"),
            JobError::InvalidRequestUrl(_) => Some("libwolkanlin-error-invalid-req-url"),
            JobError::RequestTimedOut(_) => Some("libwolkanlin-error-request-timeout"),
            JobError::JsonParse(_) => Some("libwolkanlin-error-json-parser"),
            JobError::WrongOutputType => Some("libwolkanlin-error-invalid-output-type"),
            JobError::EmptyReply => Some("libwolkanlin-error-empty-json"),
            JobError::Network(_) => None,
            JobError::Ssl => Some("libwolkanlin-error-unknown-ssl"),
            JobError::EmptyUser => Some("libwolkanlin-error-get-user-empty-id"),
            JobError::NotFound(_) => Some("libwolkanlin-error-get-user-not-found"),
            JobError::AlreadyAppPassword => {
                Some("libwolkanlin-error-get-apppass-already-converted")
            }
            JobError::Unknown => Some("libwolkanlin-error-unknown"),
        }
    }

    /// Arguments substituted for `%1`, `%2`, … in the catalog text.
    pub fn args(&self) -> Vec<String> {
        match self {
            JobError::InvalidRequestUrl(url) => vec![url.clone()],
            JobError::RequestTimedOut(secs) => vec![secs.to_string()],
            JobError::JsonParse(detail) => vec![detail.clone()],
            JobError::NotFound(user) => vec![user.clone()],
            _ => Vec::new(),
        }
    }
}
