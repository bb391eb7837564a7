//! On-disk fixtures.

use std::fs;
use std::path::Path;

use serde_json::Value;

/// Write a legacy auth file (and its parent directory).
pub fn write_legacy_auth(path: &Path, data: &Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(data).unwrap()).unwrap();
}

/// Create `<root>/accounts/<name>/` in the older layout with an
/// `account.json` marker and a direct `auth.json`.
pub fn write_old_layout_account(root: &Path, name: &str, auth: &Value) {
    let dir = root.join("accounts").join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("account.json"), r#"{"name": "old"}"#).unwrap();
    fs::write(dir.join("auth.json"), auth.to_string()).unwrap();
}

/// Read a JSON file.
pub fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}
