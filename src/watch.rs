//! Reloading data files when they change on disk.
//!
//! Each open file gets its own subscription. Events for the file are
//! debounced and forwarded to [`Reloadable::on_external_change`]; the file
//! itself decides whether the change was its own write.
//!
//! ```no_run
//! use std::sync::Arc;
//! use succ::{watch, DataFile, DataFileOptions};
//!
//! let file = Arc::new(DataFile::open_path("settings.succ", DataFileOptions::new()).unwrap());
//! file.set_reload_callback(|| println!("settings changed"));
//! let _subscription = watch::subscribe(&file.path(), &file).unwrap();
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use tracing::{debug, warn};

use crate::data_file::Reloadable;
use crate::error::{Error, Result};

/// Quiet period after the last event before a change is reported.
pub const DEBOUNCE: Duration = Duration::from_millis(100);

/// A live subscription. Dropping it stops the notifications.
pub struct Subscription {
    _debouncer: Debouncer<RecommendedWatcher>,
    path: PathBuf,
}

impl Subscription {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Calls `document.on_external_change()` once the file at `path` has been
/// written and then left alone for [`DEBOUNCE`].
///
/// A burst of events is reported once, after it ends, so the last write of
/// the burst is always the one seen. The subscription holds only a weak
/// reference to the document, so it does not keep the document alive.
pub fn subscribe<D>(path: &Path, document: &Arc<D>) -> Result<Subscription>
where
    D: Reloadable + 'static,
{
    let path = path.to_path_buf();
    let directory = path
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| Error::storage(format!("{} has no parent directory", path.display())))?;
    let file_name = path.file_name().map(ToOwned::to_owned);

    let target: Weak<D> = Arc::downgrade(document);
    let watched = path.clone();

    let mut debouncer = new_debouncer(DEBOUNCE, move |res: DebounceEventResult| match res {
        Ok(events) => {
            if !events
                .iter()
                .any(|event| event.path.file_name() == file_name.as_deref())
            {
                return;
            }
            // Removal is not a change of contents.
            if !watched.is_file() {
                return;
            }
            let Some(document) = target.upgrade() else {
                return;
            };
            match document.on_external_change() {
                Ok(true) => debug!(path = %watched.display(), "reloaded after external change"),
                Ok(false) => {}
                Err(e) => warn!(path = %watched.display(), "failed to reload data file: {}", e),
            }
        }
        Err(e) => warn!("file watcher error: {}", e),
    })
    .map_err(|e| Error::storage(format!("failed to create file watcher: {e}")))?;

    debouncer
        .watcher()
        .watch(&directory, RecursiveMode::NonRecursive)
        .map_err(|e| {
            Error::storage(format!("failed to watch {}: {e}", directory.display()))
        })?;

    Ok(Subscription {
        _debouncer: debouncer,
        path,
    })
}
