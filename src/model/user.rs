use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// User record as found under `ocs.data` in the user endpoint reply.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct User {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default, alias = "storageLocation")]
    pub storage_location: String,

    #[serde(default)]
    pub id: String,

    /// Milliseconds since the epoch, 0 if the user never logged in.
    #[serde(default, alias = "lastLogin")]
    pub last_login: i64,

    #[serde(default)]
    pub backend: String,

    #[serde(default)]
    pub subadmin: Vec<String>,

    #[serde(default)]
    pub quota: Quota,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub displayname: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub website: String,

    #[serde(default)]
    pub twitter: String,

    #[serde(default)]
    pub groups: Vec<String>,

    #[serde(default)]
    pub language: String,

    #[serde(default)]
    pub locale: String,
}

impl User {
    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        if self.last_login <= 0 {
            return None;
        }
        Utc.timestamp_millis_opt(self.last_login).single()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Quota {
    #[serde(default)]
    pub free: i64,

    #[serde(default)]
    pub used: i64,

    /// Granted quota in bytes; negative values encode "unlimited".
    #[serde(default)]
    pub quota: i64,

    #[serde(default)]
    pub total: i64,

    /// Used part in percent.
    #[serde(default)]
    pub relative: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_ocs_user_payload() {
        let data = serde_json::json!({
            "enabled": true,
            "storageLocation": "/var/www/nextcloud/data/jdoe",
            "id": "jdoe",
            "lastLogin": 1_616_418_000_000i64,
            "backend": "Database",
            "subadmin": ["accounting"],
            "quota": {
                "free": 209_639_477_248i64,
                "used": 75_917_312i64,
                "quota": 209_715_395_584i64,
                "total": 209_715_394_560i64,
                "relative": 0.04
            },
            "email": "jdoe@example.org",
            "displayname": "John Doe",
            "phone": "+49123456789",
            "address": "Some Street 1",
            "website": "https://example.org",
            "twitter": "@jdoe",
            "groups": ["users", "accounting"],
            "language": "de",
            "locale": "de_DE"
        });

        let user: User = serde_json::from_value(data).unwrap();
        assert_eq!(user.id, "jdoe");
        assert_eq!(user.displayname, "John Doe");
        assert_eq!(user.groups, vec!["users", "accounting"]);
        assert_eq!(user.quota.used, 75_917_312);
        assert!(user.enabled);

        let login = user.last_login_at().unwrap();
        assert_eq!(login.timestamp_millis(), 1_616_418_000_000);
    }

    #[test]
    fn never_logged_in_has_no_timestamp() {
        let user = User::default();
        assert!(user.last_login_at().is_none());
    }
}
