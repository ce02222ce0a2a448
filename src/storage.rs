use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write a text artifact (HTML page, exported plot) in one go.
pub fn write_text<P: AsRef<Path>>(path: P, contents: &str) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    f.write_all(contents.as_bytes())?;
    Ok(())
}

/// Save any serializable value as pretty JSON.
pub fn save_json<T, P>(value: &T, path: P) -> Result<()>
where
    T: Serialize + ?Sized,
    P: AsRef<Path>,
{
    let s = serde_json::to_string_pretty(value)?;
    write_text(path, &s)
}

/// Read a JSON file into any deserializable value (e.g. a saved form).
pub fn load_json<T, P>(path: P) -> Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    serde_json::from_reader(f).with_context(|| format!("parse {}", path.display()))
}
