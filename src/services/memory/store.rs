use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::model::MemoryEntry;
use super::{hash, normalize};

const MEMORY_FILE: &str = "translation_memory.json";

pub fn default_path() -> PathBuf {
    match std::env::var("WOLKANLIN_TM_FILE") {
        Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => PathBuf::from(MEMORY_FILE),
    }
}

/// Load the memory file. A missing or unreadable file yields an empty
/// memory; records missing their derived match key are migrated and the
/// cleaned-up file is written back.
pub fn load(path: &Path) -> Vec<MemoryEntry> {
    if !path.exists() {
        return Vec::new();
    }

    let data = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            log::warn!("Failed to read {}: {e}", path.display());
            return Vec::new();
        }
    };

    let mut entries: Vec<MemoryEntry> = match serde_json::from_str(&data) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("Failed to parse {}: {e}", path.display());
            return Vec::new();
        }
    };

    let mut migrated = false;
    for e in entries.iter_mut() {
        migrated |= ensure_match_key(e);
    }

    let (deduped, removed) = dedup(entries);
    if removed > 0 {
        migrated = true;
    }

    let mut final_entries = deduped;
    sort_entries(&mut final_entries);

    if migrated {
        if let Err(e) = save(path, &final_entries) {
            log::warn!("Failed to persist migrated memory: {e}");
        }
    }

    final_entries
}

pub fn save(path: &Path, entries: &[MemoryEntry]) -> Result<(), String> {
    let mut v: Vec<MemoryEntry> = entries.to_vec();
    for e in v.iter_mut() {
        ensure_match_key(e);
    }

    let (mut v, _removed) = dedup(v);
    sort_entries(&mut v);

    let json = serde_json::to_string_pretty(&v).map_err(|e| e.to_string())?;
    write_atomic(path, json.as_bytes())
}

fn ensure_match_key(e: &mut MemoryEntry) -> bool {
    let mut changed = false;

    if e.normalized.is_empty() {
        e.normalized = normalize::normalize(&e.source);
        changed = true;
    }
    if e.hash.is_empty() {
        e.hash = hash::hash_norm(&e.normalized);
        changed = true;
    }

    changed
}

fn dedup(entries: Vec<MemoryEntry>) -> (Vec<MemoryEntry>, usize) {
    let mut map: HashMap<(String, String, String), MemoryEntry> = HashMap::new();
    let mut removed = 0usize;

    for mut e in entries {
        ensure_match_key(&mut e);

        let key = (
            e.source_language.clone(),
            e.target_language.clone(),
            e.hash.clone(),
        );

        match map.get_mut(&key) {
            None => {
                map.insert(key, e);
            }
            Some(existing) => {
                if pick_better(existing, &e) {
                    *existing = e;
                }
                removed += 1;
            }
        }
    }

    (map.into_values().collect(), removed)
}

// Prefer the entry that actually has a translation; among translated ones
// keep the existing record so earlier (reviewed) texts win over rewrites.
fn pick_better(current: &MemoryEntry, candidate: &MemoryEntry) -> bool {
    current.translation.trim().is_empty() && !candidate.translation.trim().is_empty()
}

fn sort_entries(entries: &mut Vec<MemoryEntry>) {
    entries.sort_by(|a, b| {
        (&a.source_language, &a.target_language, &a.normalized, &a.source)
            .cmp(&(&b.source_language, &b.target_language, &b.normalized, &b.source))
    });
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), String> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
    }

    fs::write(&tmp, bytes).map_err(|e| e.to_string())?;

    if path.exists() {
        fs::remove_file(path).map_err(|e| e.to_string())?;
    }

    fs::rename(&tmp, path).map_err(|e| e.to_string())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "memory".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(src: &str, tr: &str) -> MemoryEntry {
        MemoryEntry {
            source_language: "en".to_string(),
            target_language: "de".to_string(),
            source: src.to_string(),
            translation: tr.to_string(),
            normalized: String::new(),
            hash: String::new(),
        }
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translation_memory.json");

        save(&path, &[entry("Missing username.", "Benutzername fehlt.")]).unwrap();
        let loaded = load(&path);

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].source, "Missing username.");
        assert!(!loaded[0].hash.is_empty());
        assert_eq!(loaded[0].normalized, "missing username.");
    }

    #[test]
    fn save_dedups_same_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translation_memory.json");

        save(
            &path,
            &[
                entry("Checking reply", ""),
                entry("checking   REPLY", "Antwort wird geprüft"),
            ],
        )
        .unwrap();

        let loaded = load(&path);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].translation, "Antwort wird geprüft");
    }

    #[test]
    fn load_migrates_records_without_match_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translation_memory.json");

        let raw = serde_json::json!([{
            "source_language": "en",
            "target_language": "de",
            "source": "Sending request",
            "translation": "Anfrage wird gesendet"
        }]);
        fs::write(&path, serde_json::to_string(&raw).unwrap()).unwrap();

        let loaded = load(&path);
        assert_eq!(loaded.len(), 1);
        assert!(!loaded[0].hash.is_empty());

        // migration was persisted
        let reread: Vec<MemoryEntry> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(!reread[0].hash.is_empty());
    }

    #[test]
    fn missing_file_is_empty_memory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("nope.json")).is_empty());
    }
}
