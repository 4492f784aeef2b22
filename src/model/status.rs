use serde::{Deserialize, Serialize};

/// Reply of the public `status.php` endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ServerStatus {
    #[serde(default)]
    pub installed: bool,

    #[serde(default)]
    pub maintenance: bool,

    #[serde(default, alias = "needsDbUpgrade")]
    pub needs_db_upgrade: bool,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub versionstring: String,

    #[serde(default)]
    pub edition: String,

    #[serde(default)]
    pub productname: String,

    #[serde(default, alias = "extendedSupport")]
    pub extended_support: bool,
}

/// Result of the remote wipe check endpoint. The server answers 404 when
/// no wipe is pending, so `wipe: false` covers that case as well.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct WipeStatus {
    #[serde(default)]
    pub wipe: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_status_php_payload() {
        let data = serde_json::json!({
            "installed": true,
            "maintenance": false,
            "needsDbUpgrade": false,
            "version": "21.0.0.18",
            "versionstring": "21.0.0",
            "edition": "Enterprise",
            "productname": "Nextcloud",
            "extendedSupport": false
        });

        let status: ServerStatus = serde_json::from_value(data).unwrap();
        assert!(status.installed);
        assert!(!status.maintenance);
        assert_eq!(status.versionstring, "21.0.0");
        assert_eq!(status.productname, "Nextcloud");
    }
}
