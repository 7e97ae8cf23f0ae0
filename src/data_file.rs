//! Typed, default-aware access to one SUCC file.
//!
//! A [`DataFile`] owns a [`Storage`], the parsed [`Document`] and the
//! [`Style`] used for new text. Reads of missing keys fall back to the caller's
//! default, then to the default file, then to the type's zero value, and the
//! resolved value is written into the document so the file gains the key.
//! Writes save straight away while autosave is on, and a save whose text has
//! not changed is skipped.
//!
//! ```rust
//! use succ::{DataFile, DataFileOptions, MemoryStorage};
//!
//! let storage = MemoryStorage::new("# window settings\nwidth: 800");
//! let file = DataFile::open(
//!     storage.clone(),
//!     DataFileOptions::new().with_default_text("width: 640\nheight: 480"),
//! )
//! .unwrap();
//!
//! assert_eq!(file.get::<u32>("width").unwrap(), 800);
//! assert_eq!(file.get::<u32>("height").unwrap(), 480);
//!
//! file.set("width", &1024u32).unwrap();
//! assert_eq!(storage.contents(), "# window settings\nwidth: 1024\nheight: 480");
//! ```
//!
//! Every operation holds the file's lock for its whole duration, so a reload
//! never interleaves with a write.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::base_types::BaseTypeRegistry;
use crate::codec::Codec;
use crate::descriptor::Descriptor;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::storable::Storable;
use crate::storage::{FileStorage, Storage};
use crate::style::Style;
use crate::value::Value;

type ReloadCallback = Arc<dyn Fn() + Send + Sync>;

/// Settings for opening a data file.
///
/// ```rust
/// use succ::{BoolStyle, DataFileOptions, Style};
///
/// let options = DataFileOptions::new()
///     .with_style(Style::new().with_bool_style(BoolStyle::YesNo))
///     .with_default_text("enabled: yes")
///     .with_auto_save(false);
/// assert!(!options.auto_save());
/// ```
#[derive(Clone)]
pub struct DataFileOptions {
    style: Style,
    default_text: String,
    auto_save: bool,
    registry: Option<Arc<RwLock<BaseTypeRegistry>>>,
}

impl Default for DataFileOptions {
    fn default() -> Self {
        DataFileOptions {
            style: Style::default(),
            default_text: String::new(),
            auto_save: true,
            registry: None,
        }
    }
}

impl fmt::Debug for DataFileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataFileOptions")
            .field("style", &self.style)
            .field("default_text", &self.default_text)
            .field("auto_save", &self.auto_save)
            .field("shared_registry", &self.registry.is_none())
            .finish()
    }
}

impl DataFileOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Text of the default file. Missing keys are looked up here, and a new
    /// file starts out with this text.
    #[must_use]
    pub fn with_default_text(mut self, text: impl Into<String>) -> Self {
        self.default_text = text.into();
        self
    }

    #[must_use]
    pub fn with_auto_save(mut self, auto_save: bool) -> Self {
        self.auto_save = auto_save;
        self
    }

    /// Uses `registry` instead of the process-wide one.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<RwLock<BaseTypeRegistry>>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[inline]
    #[must_use]
    pub fn style(&self) -> &Style {
        &self.style
    }

    #[inline]
    #[must_use]
    pub fn default_text(&self) -> &str {
        &self.default_text
    }

    #[inline]
    #[must_use]
    pub fn auto_save(&self) -> bool {
        self.auto_save
    }
}

/// Something a change watcher can notify.
pub trait Reloadable: Send + Sync {
    /// Called when the backing text may have changed outside this process.
    /// Returns whether the document was reloaded.
    fn on_external_change(&self) -> Result<bool>;
}

/// The parts shared by writable and read-only files: defaults and registry.
struct Shared {
    default_text: String,
    defaults: Document,
    registry: Arc<RwLock<BaseTypeRegistry>>,
    on_reload: Mutex<Option<ReloadCallback>>,
}

impl Shared {
    fn new(options: &DataFileOptions) -> Result<Self> {
        options.style.validate()?;
        Ok(Shared {
            default_text: options.default_text.clone(),
            defaults: Document::parse(&options.default_text)?,
            registry: options
                .registry
                .clone()
                .unwrap_or_else(BaseTypeRegistry::global),
            on_reload: Mutex::new(None),
        })
    }

    /// Looks `path` up in `document`; on a miss resolves the fallback value.
    /// The flag is true when the value came from `document`.
    fn lookup(
        &self,
        codec: &Codec<'_>,
        document: &Document,
        path: &[&str],
        descriptor: &Descriptor,
        default: Option<&Value>,
    ) -> Result<(Value, bool)> {
        if path.is_empty() {
            return Err(Error::invalid_key("", "path must contain at least one key"));
        }
        if let Some(value) = document.decode_at(codec, path, descriptor)? {
            return Ok((value, true));
        }
        let fallback = match default {
            Some(value) => value.clone(),
            None => match self.defaults.decode_at(codec, path, descriptor)? {
                Some(value) => value,
                None => descriptor.zero_value(),
            },
        };
        Ok((fallback, false))
    }

    fn notify_reloaded(&self) {
        let callback = self.on_reload.lock().clone();
        if let Some(callback) = callback {
            callback();
        }
    }
}

struct State<S> {
    storage: S,
    document: Document,
    style: Style,
    auto_save: bool,
    /// Text last read from or written to storage.
    last_text: String,
    ignore_next_change: bool,
}

impl<S: Storage> State<S> {
    fn load(&mut self) -> Result<()> {
        let text = self.storage.read()?;
        self.document = Document::parse(&text)?;
        debug!(
            file = %self.storage.identifier(),
            lines = self.document.lines().len(),
            "loaded data file"
        );
        self.last_text = text;
        Ok(())
    }

    fn save(&mut self) -> Result<bool> {
        let text = self.document.to_text(&self.style);
        if text == self.last_text {
            debug!(file = %self.storage.identifier(), "text unchanged; skipping save");
            return Ok(false);
        }
        self.storage.write(&text)?;
        debug!(file = %self.storage.identifier(), bytes = text.len(), "saved data file");
        self.last_text = text;
        self.ignore_next_change = true;
        Ok(true)
    }

    fn auto_save(&mut self) -> Result<()> {
        if self.auto_save {
            self.save()?;
        }
        Ok(())
    }
}

/// A writable SUCC file.
pub struct DataFile<S: Storage> {
    state: Mutex<State<S>>,
    shared: Shared,
}

impl<S: Storage> fmt::Debug for DataFile<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataFile")
            .field("identifier", &self.identifier())
            .finish_non_exhaustive()
    }
}

impl DataFile<FileStorage> {
    /// Opens the file at `path`. See [`FileStorage::new`] for path handling.
    pub fn open_path(path: impl AsRef<Path>, options: DataFileOptions) -> Result<Self> {
        Self::open(FileStorage::new(path)?, options)
    }

    #[must_use]
    pub fn path(&self) -> std::path::PathBuf {
        self.state.lock().storage.path().to_path_buf()
    }
}

impl<S: Storage> DataFile<S> {
    /// Opens `storage` with default options.
    pub fn new(storage: S) -> Result<Self> {
        Self::open(storage, DataFileOptions::default())
    }

    /// Opens `storage`. Storage that does not exist yet is created with the
    /// default text.
    pub fn open(mut storage: S, options: DataFileOptions) -> Result<Self> {
        let shared = Shared::new(&options)?;
        if !storage.exists() {
            debug!(file = %storage.identifier(), "creating data file from defaults");
            storage.write(&shared.default_text)?;
        }
        let mut state = State {
            storage,
            document: Document::new(),
            style: options.style,
            auto_save: options.auto_save,
            last_text: String::new(),
            ignore_next_change: false,
        };
        state.load()?;
        Ok(DataFile {
            state: Mutex::new(state),
            shared,
        })
    }

    /// Re-reads the text from storage, replacing the whole tree.
    pub fn reload(&self) -> Result<()> {
        self.state.lock().load()
    }

    /// Writes the document to storage unless its text is unchanged.
    /// Returns whether anything was written.
    pub fn save(&self) -> Result<bool> {
        self.state.lock().save()
    }

    /// The document's current text, saved or not.
    #[must_use]
    pub fn raw_text(&self) -> String {
        let state = self.state.lock();
        state.document.to_text(&state.style)
    }

    #[must_use]
    pub fn identifier(&self) -> String {
        self.state.lock().storage.identifier()
    }

    #[must_use]
    pub fn auto_save(&self) -> bool {
        self.state.lock().auto_save
    }

    pub fn set_auto_save(&self, auto_save: bool) {
        self.state.lock().auto_save = auto_save;
    }

    #[must_use]
    pub fn style(&self) -> Style {
        self.state.lock().style.clone()
    }

    /// Replaces the style used for text written from now on.
    pub fn set_style(&self, style: Style) -> Result<()> {
        style.validate()?;
        self.state.lock().style = style;
        Ok(())
    }

    /// Runs `callback` after every reload caused by an external change.
    pub fn set_reload_callback<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.shared.on_reload.lock() = Some(Arc::new(callback));
    }

    #[must_use]
    pub fn key_exists(&self, key: &str) -> bool {
        self.state.lock().document.key_exists(key)
    }

    #[must_use]
    pub fn key_exists_at_path(&self, path: &[&str]) -> bool {
        self.state.lock().document.key_exists_at_path(path)
    }

    #[must_use]
    pub fn top_level_keys(&self) -> Vec<String> {
        self.state.lock().document.top_level_keys()
    }

    pub fn get<T: Storable>(&self, key: &str) -> Result<T> {
        self.get_at_path(&[key])
    }

    /// Like [`get`](Self::get), with `default` used for a missing key.
    pub fn get_or<T: Storable>(&self, key: &str, default: T) -> Result<T> {
        self.get_at_path_or(&[key], default)
    }

    pub fn get_at_path<T: Storable>(&self, path: &[&str]) -> Result<T> {
        self.resolve_at_path(path, &T::descriptor(), None, T::from_value)
    }

    pub fn get_at_path_or<T: Storable>(&self, path: &[&str], default: T) -> Result<T> {
        let default = default.to_value();
        self.resolve_at_path(path, &T::descriptor(), Some(&default), T::from_value)
    }

    /// Reads `key` if it exists, without writing anything.
    pub fn try_get<T: Storable>(&self, key: &str) -> Result<Option<T>> {
        let state = self.state.lock();
        let registry = self.shared.registry.read();
        let codec = Codec::new(&state.style, &registry);
        state
            .document
            .decode_at(&codec, &[key], &T::descriptor())?
            .map(T::from_value)
            .transpose()
    }

    pub fn get_value(
        &self,
        key: &str,
        descriptor: &Descriptor,
        default: Option<&Value>,
    ) -> Result<Value> {
        self.get_value_at_path(&[key], descriptor, default)
    }

    /// Reads the value at `path`. A missing value is resolved from `default`,
    /// the default file or the type's zero value, then stored at `path`.
    pub fn get_value_at_path(
        &self,
        path: &[&str],
        descriptor: &Descriptor,
        default: Option<&Value>,
    ) -> Result<Value> {
        self.resolve_at_path(path, descriptor, default, Ok)
    }

    /// A missing value is stored only after `convert` accepts it.
    fn resolve_at_path<R>(
        &self,
        path: &[&str],
        descriptor: &Descriptor,
        default: Option<&Value>,
        convert: impl FnOnce(Value) -> Result<R>,
    ) -> Result<R> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let registry = self.shared.registry.read();
        let codec = Codec::new(&state.style, &registry);
        let (value, found) =
            self.shared
                .lookup(&codec, &state.document, path, descriptor, default)?;
        if found {
            return convert(value);
        }
        let resolved = convert(value.clone())?;
        debug!(path = ?path, "storing default for missing key");
        state.document.encode_at(&codec, path, &value, descriptor)?;
        state.auto_save()?;
        Ok(resolved)
    }

    pub fn set<T: Storable>(&self, key: &str, value: &T) -> Result<()> {
        self.set_value_at_path(&[key], &value.to_value(), &T::descriptor())
    }

    pub fn set_at_path<T: Storable>(&self, path: &[&str], value: &T) -> Result<()> {
        self.set_value_at_path(path, &value.to_value(), &T::descriptor())
    }

    /// Like [`set`](Self::set), but rewrites the key's node from scratch,
    /// dropping formatting such as a multi-line block.
    pub fn set_fresh<T: Storable>(&self, key: &str, value: &T) -> Result<()> {
        self.edit(|codec, document| {
            document.encode_fresh_at(codec, &[key], &value.to_value(), &T::descriptor())
        })
    }

    pub fn set_value(&self, key: &str, value: &Value, descriptor: &Descriptor) -> Result<()> {
        self.set_value_at_path(&[key], value, descriptor)
    }

    pub fn set_value_at_path(
        &self,
        path: &[&str],
        value: &Value,
        descriptor: &Descriptor,
    ) -> Result<()> {
        self.edit(|codec, document| document.encode_at(codec, path, value, descriptor))
    }

    fn edit<F>(&self, edit: F) -> Result<()>
    where
        F: FnOnce(&Codec<'_>, &mut Document) -> Result<()>,
    {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        {
            let registry = self.shared.registry.read();
            edit(&Codec::new(&state.style, &registry), &mut state.document)?;
        }
        state.auto_save()
    }

    /// Removes a top-level key. Returns whether it existed.
    pub fn delete_key(&self, key: &str) -> Result<bool> {
        let mut state = self.state.lock();
        if !state.document.remove(key) {
            return Ok(false);
        }
        debug!(key, "deleted key");
        state.auto_save()?;
        Ok(true)
    }

    /// Writes each saved field of a structured value as a top-level key, then
    /// saves once. Keys that are not fields are left alone.
    pub fn save_as_object<T: Storable>(&self, value: &T) -> Result<()> {
        let descriptor = T::descriptor();
        if !matches!(descriptor, Descriptor::Complex(_)) {
            return Err(Error::type_mismatch("a structured type", &descriptor.name()));
        }
        self.save_whole(&value.to_value(), &descriptor)
    }

    /// Writes each entry of a map as a top-level key and removes every other
    /// key, then saves once.
    pub fn save_as_map<M: Storable>(&self, map: &M) -> Result<()> {
        let descriptor = M::descriptor();
        if !matches!(descriptor, Descriptor::Map { .. }) {
            return Err(Error::type_mismatch("a map", &descriptor.name()));
        }
        self.save_whole(&map.to_value(), &descriptor)
    }

    fn save_whole(&self, value: &Value, descriptor: &Descriptor) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let mut document = state.document.clone();
        {
            let registry = self.shared.registry.read();
            Codec::new(&state.style, &registry).encode_document(&mut document, value, descriptor)?;
        }
        state.document = document;
        state.save()?;
        Ok(())
    }

    /// Reads the whole file as one structured value. Missing fields keep the
    /// value the type's constructor gives them.
    pub fn get_as_object<T: Storable>(&self) -> Result<T> {
        self.get_whole()
    }

    /// Reads every top-level key as an entry of a map.
    pub fn get_as_map<M: Storable>(&self) -> Result<M> {
        self.get_whole()
    }

    fn get_whole<T: Storable>(&self) -> Result<T> {
        let state = self.state.lock();
        let registry = self.shared.registry.read();
        let value = Codec::new(&state.style, &registry)
            .decode_document(&state.document, &T::descriptor())?;
        T::from_value(value)
    }

    /// Replaces the stored text with the default file's text and reloads.
    pub fn reset_to_default_data(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.storage.write(&self.shared.default_text)?;
        state.ignore_next_change = true;
        state.load()
    }
}

impl<S: Storage> Reloadable for DataFile<S> {
    /// Reloads unless the change is this file's own latest write, that is,
    /// a write is pending acknowledgement and storage still holds exactly
    /// the saved text. The reload callback runs after the lock is released.
    fn on_external_change(&self) -> Result<bool> {
        {
            let mut state = self.state.lock();
            if std::mem::take(&mut state.ignore_next_change)
                && state.storage.read()? == state.last_text
            {
                debug!(file = %state.storage.identifier(), "ignoring change from own write");
                return Ok(false);
            }
            state.load()?;
        }
        self.shared.notify_reloaded();
        Ok(true)
    }
}

struct ReadState<S> {
    storage: S,
    document: Document,
    style: Style,
}

/// A SUCC file that is only ever read.
///
/// Lookups resolve defaults the same way as [`DataFile`] but nothing is
/// stored and storage is never written, not even when it does not exist.
pub struct ReadOnlyDataFile<S: Storage> {
    state: Mutex<ReadState<S>>,
    shared: Shared,
}

impl<S: Storage> fmt::Debug for ReadOnlyDataFile<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOnlyDataFile")
            .field("identifier", &self.state.lock().storage.identifier())
            .finish_non_exhaustive()
    }
}

impl<S: Storage> ReadOnlyDataFile<S> {
    pub fn new(storage: S) -> Result<Self> {
        Self::open(storage, DataFileOptions::default())
    }

    pub fn open(storage: S, options: DataFileOptions) -> Result<Self> {
        let shared = Shared::new(&options)?;
        let document = Document::parse(&storage.read()?)?;
        Ok(ReadOnlyDataFile {
            state: Mutex::new(ReadState {
                storage,
                document,
                style: options.style,
            }),
            shared,
        })
    }

    pub fn reload(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.document = Document::parse(&state.storage.read()?)?;
        Ok(())
    }

    /// Runs `callback` after every reload caused by an external change.
    pub fn set_reload_callback<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.shared.on_reload.lock() = Some(Arc::new(callback));
    }

    #[must_use]
    pub fn key_exists(&self, key: &str) -> bool {
        self.state.lock().document.key_exists(key)
    }

    #[must_use]
    pub fn key_exists_at_path(&self, path: &[&str]) -> bool {
        self.state.lock().document.key_exists_at_path(path)
    }

    #[must_use]
    pub fn top_level_keys(&self) -> Vec<String> {
        self.state.lock().document.top_level_keys()
    }

    pub fn get<T: Storable>(&self, key: &str) -> Result<T> {
        self.get_at_path(&[key])
    }

    pub fn get_or<T: Storable>(&self, key: &str, default: T) -> Result<T> {
        self.get_at_path_or(&[key], default)
    }

    pub fn get_at_path<T: Storable>(&self, path: &[&str]) -> Result<T> {
        T::from_value(self.get_value_at_path(path, &T::descriptor(), None)?)
    }

    pub fn get_at_path_or<T: Storable>(&self, path: &[&str], default: T) -> Result<T> {
        let default = default.to_value();
        T::from_value(self.get_value_at_path(path, &T::descriptor(), Some(&default))?)
    }

    pub fn get_value_at_path(
        &self,
        path: &[&str],
        descriptor: &Descriptor,
        default: Option<&Value>,
    ) -> Result<Value> {
        let state = self.state.lock();
        let registry = self.shared.registry.read();
        let codec = Codec::new(&state.style, &registry);
        self.shared
            .lookup(&codec, &state.document, path, descriptor, default)
            .map(|(value, _)| value)
    }

    pub fn get_as_object<T: Storable>(&self) -> Result<T> {
        let state = self.state.lock();
        let registry = self.shared.registry.read();
        let value = Codec::new(&state.style, &registry)
            .decode_document(&state.document, &T::descriptor())?;
        T::from_value(value)
    }
}

impl<S: Storage> Reloadable for ReadOnlyDataFile<S> {
    fn on_external_change(&self) -> Result<bool> {
        self.reload()?;
        self.shared.notify_reloaded();
        Ok(true)
    }
}
