use serde::{Deserialize, Serialize};

fn default_user_agent() -> String {
    format!("wolkanlin-core/{}", env!("CARGO_PKG_VERSION"))
}

fn default_use_ssl() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    300
}

/// Connection data for one remote server.
///
/// Everything a job needs to reach the API: where the server lives, how to
/// authenticate and how the request itself should behave.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Account {
    #[serde(default)]
    pub name: String,

    /// Directory the account was loaded from, empty for inline accounts.
    #[serde(default)]
    pub account_path: String,

    #[serde(default)]
    pub host: String,

    /// 0 means the default port for the scheme.
    #[serde(default)]
    pub port: u16,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Path prefix when the server is not installed at the web root.
    #[serde(default)]
    pub install_path: String,

    #[serde(default = "default_use_ssl")]
    pub use_ssl: bool,

    #[serde(default)]
    pub ignore_ssl_errors: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for Account {
    fn default() -> Self {
        Account {
            name: String::new(),
            account_path: String::new(),
            host: String::new(),
            port: 0,
            username: String::new(),
            password: String::new(),
            install_path: String::new(),
            use_ssl: default_use_ssl(),
            ignore_ssl_errors: false,
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
        }
    }
}
