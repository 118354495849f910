use anyhow::Result;
use fs2::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{File, OpenOptions, create_dir_all};
use std::io::{ErrorKind::NotFound, Read, Seek, SeekFrom, Write};
use std::path::Path;

fn parse_or_default<T: DeserializeOwned + Default>(file: &mut File, path: &Path) -> Result<T> {
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    if contents.trim().is_empty() {
        log::debug!("File is empty: {:?}", path);
        return Ok(T::default());
    }
    Ok(serde_json::from_str(&contents)?)
}

/// Reads a JSON document under a shared lock. A missing or empty file reads as
/// `T::default()`.
pub fn read_locked<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == NotFound => return Ok(T::default()),
        Err(e) => return Err(e.into()),
    };
    FileExt::lock_shared(&file)?;
    parse_or_default(&mut file, path)
}

/// Read-modify-write of a JSON document under an exclusive lock. The document
/// is rewritten only when `update` reports a change.
pub fn update_locked<T, R, F>(path: &Path, update: F) -> Result<R>
where
    T: DeserializeOwned + Serialize + Default,
    F: FnOnce(&mut T) -> (R, bool),
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    FileExt::lock_exclusive(&file)?;
    file.seek(SeekFrom::Start(0))?;
    let mut document: T = parse_or_default(&mut file, path)?;

    let (result, changed) = update(&mut document);
    if changed {
        log::debug!("Saving updated data to file: {:?}", path);
        let json = serde_json::to_string_pretty(&document)?;
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(json.as_bytes())?;
        file.sync_data()?;
    }
    Ok(result)
}
