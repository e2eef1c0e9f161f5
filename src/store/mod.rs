use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, sync::Mutex};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Anything kept in a collection file.
pub trait Record {
    fn id(&self) -> i64;
}

/// Id for the next record appended to `items`: the last element's id + 1, or 1
/// for an empty collection. This is not max + 1; deleting the last record
/// makes its id available again.
pub fn next_id<T: Record>(items: &[T]) -> AppResult<i64> {
    match items.last() {
        None => Ok(1),
        Some(last) => last.id().checked_add(1).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("id {} has no successor", last.id()))
        }),
    }
}

// ── JsonStore ────────────────────────────────────────────────────────────────

/// One collection persisted as a pretty-printed JSON array in a single file.
///
/// Every access goes through `lock`, so read-modify-write cycles issued by this
/// process never interleave.
#[derive(Debug)]
pub struct JsonStore<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole collection, creating the file as `[]` if it is missing.
    pub async fn load(&self) -> AppResult<Vec<T>> {
        let _guard = self.lock.lock().await;
        read_collection(&self.path).await
    }

    /// Loads the collection, applies `f`, and overwrites the file with the
    /// result. Nothing is written when `f` fails.
    pub async fn mutate<R, F>(&self, f: F) -> AppResult<R>
    where
        F: FnOnce(&mut Vec<T>) -> AppResult<R>,
    {
        let _guard = self.lock.lock().await;
        let mut items = read_collection(&self.path).await?;
        let out = f(&mut items)?;
        write_collection(&self.path, &items).await?;
        Ok(out)
    }
}

// ── File helpers ─────────────────────────────────────────────────────────────

async fn read_collection<T: DeserializeOwned>(path: &Path) -> AppResult<Vec<T>> {
    if !fs::try_exists(path).await? {
        fs::write(path, "[]").await?;
        debug!(path = %path.display(), "Created empty collection file");
    }

    let data = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&data)?)
}

/// Full overwrite through a sibling temp file and a rename, so readers never
/// see a half-written document.
async fn write_collection<T: Serialize>(path: &Path, items: &[T]) -> AppResult<()> {
    let json = serde_json::to_string_pretty(items)?;
    let tmp = temp_path(path);

    fs::write(&tmp, json).await?;
    fs::rename(&tmp, path).await?;

    debug!(path = %path.display(), count = items.len(), "Collection written");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
