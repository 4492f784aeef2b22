use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{OnceLock, RwLock};

use crate::model::account::Account;

fn accounts_base_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("WOLKANLIN_ACCOUNTS_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    if let Ok(data) = std::env::var("XDG_DATA_HOME") {
        if !data.trim().is_empty() {
            return PathBuf::from(data).join("wolkanlin").join("accounts");
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("wolkanlin")
            .join("accounts");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("accounts")
}

/// Turn an account name into a safe directory name: basename only, invalid
/// characters replaced.
fn safe_account_dir_name(name: &str) -> String {
    // Both separators are split by hand so names coming from a Windows
    // host reduce to their basename on every platform.
    let n = name
        .trim()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .to_string();

    let mut out = String::with_capacity(n.len());
    for ch in n.chars() {
        let ok = ch.is_ascii_alphanumeric() || ch == ' ' || ch == '_' || ch == '-' || ch == '.';
        out.push(if ok { ch } else { '_' });
    }

    let out = out.trim().trim_matches('.').to_string();
    if out.is_empty() {
        "Account".to_string()
    } else {
        out
    }
}

pub fn list_accounts() -> Vec<Account> {
    list_in(&accounts_base_dir())
}

fn list_in(base: &Path) -> Vec<Account> {
    let mut accounts = Vec::new();

    if let Ok(entries) = fs::read_dir(base) {
        for entry in entries.flatten() {
            let path = entry.path().join("account.json");
            if path.exists() {
                if let Ok(data) = fs::read_to_string(&path) {
                    if let Ok(account) = serde_json::from_str::<Account>(&data) {
                        accounts.push(account);
                    }
                }
            }
        }
    }

    accounts.sort_by(|a, b| a.name.cmp(&b.name));
    accounts
}

pub fn create_account(account: Account) -> Result<Account, String> {
    create_in(&accounts_base_dir(), account)
}

fn create_in(base: &Path, mut account: Account) -> Result<Account, String> {
    if account.name.trim().is_empty() {
        return Err("account name is required".to_string());
    }
    if account.host.trim().is_empty() {
        return Err("account host is required".to_string());
    }

    let account_dir = base.join(safe_account_dir_name(&account.name));
    if account_dir.exists() {
        return Err("account already exists".to_string());
    }

    fs::create_dir_all(&account_dir).map_err(|e| format!("failed to create account directory: {e}"))?;
    account.account_path = account_dir.to_string_lossy().to_string();

    write_account(&account_dir, &account)?;
    log::info!("Created account {:?} for host {:?}", account.name, account.host);
    Ok(account)
}

pub fn open_account(account_path: &str) -> Result<Account, String> {
    let path = Path::new(account_path).join("account.json");

    if !path.exists() {
        return Err("account.json not found".to_string());
    }

    let data = fs::read_to_string(&path).map_err(|e| format!("failed to read account.json: {e}"))?;
    serde_json::from_str::<Account>(&data).map_err(|e| format!("invalid account.json: {e}"))
}

pub fn save_account(account: Account) -> Result<Account, String> {
    save_in(&accounts_base_dir(), account)
}

fn save_in(base: &Path, mut account: Account) -> Result<Account, String> {
    let account_dir: PathBuf = {
        let p = account.account_path.trim().to_string();
        if p.is_empty() {
            base.join(safe_account_dir_name(&account.name))
        } else {
            PathBuf::from(p)
        }
    };

    fs::create_dir_all(&account_dir).map_err(|e| format!("failed to create account directory: {e}"))?;
    account.account_path = account_dir.to_string_lossy().to_string();

    write_account(&account_dir, &account)?;
    Ok(account)
}

fn write_account(dir: &Path, account: &Account) -> Result<(), String> {
    let json =
        serde_json::to_string_pretty(account).map_err(|e| format!("failed to serialize account: {e}"))?;
    fs::write(dir.join("account.json"), json).map_err(|e| format!("failed to write account.json: {e}"))
}

fn default_account() -> &'static RwLock<Option<Account>> {
    static DEFAULT: OnceLock<RwLock<Option<Account>>> = OnceLock::new();
    DEFAULT.get_or_init(|| RwLock::new(None))
}

/// Install the account jobs fall back to when the request carries none.
pub fn set_default_account(account: Option<Account>) {
    let mut guard = default_account().write().expect("default account lock poisoned");
    match &account {
        Some(a) => log::debug!("Setting default account to {:?}", a.name),
        None => log::debug!("Clearing default account"),
    }
    *guard = account;
}

pub fn get_default_account() -> Option<Account> {
    default_account()
        .read()
        .expect("default account lock poisoned")
        .clone()
}
