//! Typed observable preference cells and their per-object cache.

use std::{
    any::{Any, TypeId},
    cell::RefCell,
    collections::HashMap,
    rc::Rc,
};

use leptos::{
    create_rw_signal, try_with_owner, Owner, ReadSignal, RwSignal, SignalGet,
    SignalGetUntracked, SignalSet, SignalWithUntracked,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    decode_setting, OptionalSerializedPref, PrefsError, SerializedPref, SettingType, SettingValue,
    SettingsListener, SharedSettings,
};

/// Conversion between a cell's value and its stored form.
pub struct Codec<T> {
    decode: fn(&str, &SettingValue) -> Result<T, PrefsError>,
    encode: fn(&str, &T) -> Result<SettingValue, PrefsError>,
}

impl<T> Clone for Codec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Codec<T> {}

impl<T: SettingType> Codec<T> {
    /// Stores `T` as its primitive variant.
    pub fn primitive() -> Self {
        Self {
            decode: decode_primitive::<T>,
            encode: encode_primitive::<T>,
        }
    }
}

impl<T: Serialize + DeserializeOwned> Codec<T> {
    /// Stores `T` as JSON text.
    pub fn json() -> Self {
        Self {
            decode: decode_setting::<T>,
            encode: encode_json::<T>,
        }
    }
}

fn decode_primitive<T: SettingType>(key: &str, value: &SettingValue) -> Result<T, PrefsError> {
    T::from_setting(value).ok_or_else(|| PrefsError::TypeMismatch {
        key: key.to_string(),
        expected: T::KIND,
        found: value.kind(),
    })
}

fn encode_primitive<T: SettingType>(_key: &str, value: &T) -> Result<SettingValue, PrefsError> {
    Ok(value.clone().into_setting())
}

fn encode_json<T: Serialize>(key: &str, value: &T) -> Result<SettingValue, PrefsError> {
    serde_json::to_string(value)
        .map(SettingValue::String)
        .map_err(|err| PrefsError::Serialize {
            key: key.to_string(),
            message: err.to_string(),
        })
}

struct CellInner<T: 'static> {
    settings: SharedSettings,
    key: String,
    default: T,
    value: RwSignal<T>,
    codec: Codec<T>,
    _listener: SettingsListener,
}

/// Observable value bound to one store key.
///
/// Starts from the stored value (or the default when missing or unreadable)
/// and follows later writes to the key, including writes made through other
/// cells or directly on the store. Removing the key resets it to the default.
///
/// Once the reactive owner of the backing signal is gone, reads go straight
/// to the store and writes still reach it.
pub struct PrefCell<T: 'static> {
    inner: Rc<CellInner<T>>,
}

impl<T: 'static> Clone for PrefCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> PrefCell<T> {
    /// Binds `key` on `settings` using `codec`, under the current owner.
    pub fn new(
        settings: SharedSettings,
        key: impl Into<String>,
        default: T,
        codec: Codec<T>,
    ) -> Self {
        Self::with_owner(None, settings, key, default, codec)
    }

    /// Like [`new`](Self::new) with the signal owned by `owner`.
    ///
    /// Falls back to the current owner when `owner` is `None` or disposed.
    pub fn with_owner(
        owner: Option<Owner>,
        settings: SharedSettings,
        key: impl Into<String>,
        default: T,
        codec: Codec<T>,
    ) -> Self {
        let key = key.into();
        let initial = stored_or_default(&settings, &key, &default, codec);
        let value = owner
            .and_then(|owner| try_with_owner(owner, || create_rw_signal(initial.clone())).ok())
            .unwrap_or_else(|| create_rw_signal(initial));

        let listener = settings.add_listener(&key, {
            let key = key.clone();
            let default = default.clone();
            Rc::new(move |raw: Option<&SettingValue>| {
                let next = match raw.map(|raw| (codec.decode)(&key, raw)) {
                    Some(Ok(next)) => next,
                    Some(Err(err)) => {
                        logger::ll_w!(cause = err; "ignoring unreadable write to `{key}`");
                        return;
                    }
                    None => default.clone(),
                };
                if value
                    .try_with_untracked(|current| current != &next)
                    .unwrap_or(false)
                {
                    let _ = value.try_set(next);
                }
            })
        });

        Self {
            inner: Rc::new(CellInner {
                settings,
                key,
                default,
                value,
                codec,
                _listener: listener,
            }),
        }
    }

    /// Storage key.
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Value used when the key is missing.
    pub fn default_value(&self) -> &T {
        &self.inner.default
    }

    /// Current value, tracked by the reactive system.
    pub fn get(&self) -> T {
        self.inner
            .value
            .try_get()
            .unwrap_or_else(|| self.read_store())
    }

    /// Current value without subscribing the caller.
    pub fn get_untracked(&self) -> T {
        self.inner
            .value
            .try_get_untracked()
            .unwrap_or_else(|| self.read_store())
    }

    fn read_store(&self) -> T {
        let inner = &self.inner;
        stored_or_default(&inner.settings, &inner.key, &inner.default, inner.codec)
    }

    /// Read side for views.
    pub fn signal(&self) -> ReadSignal<T> {
        self.inner.value.read_only()
    }

    /// Writes `value` to the store and publishes it.
    ///
    /// # Errors
    ///
    /// Returns an error when the value cannot be encoded; nothing is written.
    pub fn update(&self, value: T) -> Result<(), PrefsError> {
        let raw = (self.inner.codec.encode)(&self.inner.key, &value)?;
        self.inner.settings.put_value(&self.inner.key, raw);
        // Stores without listeners still update the cell.
        if self
            .inner
            .value
            .try_with_untracked(|current| current != &value)
            .unwrap_or(false)
        {
            let _ = self.inner.value.try_set(value);
        }
        Ok(())
    }

    /// Applies `f` to a copy of the current value and writes the result.
    ///
    /// # Errors
    ///
    /// Returns an error when the value cannot be encoded.
    pub fn modify(&self, f: impl FnOnce(&mut T)) -> Result<(), PrefsError> {
        let mut value = self.get_untracked();
        f(&mut value);
        self.update(value)
    }
}

fn stored_or_default<T: Clone>(
    settings: &SharedSettings,
    key: &str,
    default: &T,
    codec: Codec<T>,
) -> T {
    match settings.get_value(key).map(|raw| (codec.decode)(key, &raw)) {
        Some(Ok(value)) => value,
        Some(Err(err)) => {
            logger::ll_w!(cause = err; "using default for unreadable preference `{key}`");
            default.clone()
        }
        None => default.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CellKey {
    store: usize,
    key: String,
    ty: TypeId,
}

/// Memoizes cells by (store instance, key, value type).
///
/// Cells created through the cache are owned by the reactive owner current
/// when the cache was built, not by whichever scope first asks for them.
pub struct CellCache {
    owner: Option<Owner>,
    cells: RefCell<HashMap<CellKey, Box<dyn Any>>>,
}

impl Default for CellCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CellCache {
    /// Creates an empty cache owned by the current reactive owner.
    pub fn new() -> Self {
        Self {
            owner: Owner::current(),
            cells: RefCell::default(),
        }
    }

    /// Owner of the cells created through this cache.
    pub fn owner(&self) -> Option<Owner> {
        self.owner
    }

    /// Returns the cached cell for `key`, creating it with `create` on first use.
    pub fn get_or_insert_with<T: 'static>(
        &self,
        settings: &SharedSettings,
        key: &str,
        create: impl FnOnce() -> PrefCell<T>,
    ) -> PrefCell<T> {
        let cache_key = CellKey {
            store: Rc::as_ptr(settings) as *const () as usize,
            key: key.to_string(),
            ty: TypeId::of::<T>(),
        };
        if let Some(cell) = self
            .cells
            .borrow()
            .get(&cache_key)
            .and_then(|cell| cell.downcast_ref::<PrefCell<T>>())
        {
            return cell.clone();
        }

        let cell = create();
        self.cells
            .borrow_mut()
            .insert(cache_key, Box::new(cell.clone()));
        cell
    }

    /// Number of cached cells.
    pub fn len(&self) -> usize {
        self.cells.borrow().len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.cells.borrow().is_empty()
    }

    /// Drops every cached cell.
    pub fn clear(&self) {
        self.cells.borrow_mut().clear();
    }
}

fn cached_cell<P, T>(prefs: &P, key: &str, default: T, codec: Codec<T>) -> PrefCell<T>
where
    P: PrefsObject + ?Sized,
    T: Clone + PartialEq + 'static,
{
    let settings = prefs.settings();
    let cells = prefs.cells();
    cells.get_or_insert_with(settings, key, || {
        PrefCell::with_owner(cells.owner(), settings.clone(), key, default, codec)
    })
}

/// A group of preferences backed by one observable store.
///
/// Implementors expose the store and a [`CellCache`]; the factory methods bind
/// typed cells to keys and return the same cell for repeated calls.
pub trait PrefsObject {
    /// Backing store.
    fn settings(&self) -> &SharedSettings;

    /// Cell memoization for this object.
    fn cells(&self) -> &CellCache;

    /// Boolean cell for `key`.
    fn bool_cell(&self, key: &str, default: bool) -> PrefCell<bool> {
        cached_cell(self, key, default, Codec::primitive())
    }

    /// 32-bit integer cell for `key`.
    fn int_cell(&self, key: &str, default: i32) -> PrefCell<i32> {
        cached_cell(self, key, default, Codec::primitive())
    }

    /// 64-bit integer cell for `key`.
    fn long_cell(&self, key: &str, default: i64) -> PrefCell<i64> {
        cached_cell(self, key, default, Codec::primitive())
    }

    /// 32-bit float cell for `key`.
    fn float_cell(&self, key: &str, default: f32) -> PrefCell<f32> {
        cached_cell(self, key, default, Codec::primitive())
    }

    /// 64-bit float cell for `key`.
    fn double_cell(&self, key: &str, default: f64) -> PrefCell<f64> {
        cached_cell(self, key, default, Codec::primitive())
    }

    /// Text cell for `key`.
    fn string_cell(&self, key: &str, default: impl Into<String>) -> PrefCell<String> {
        cached_cell(self, key, default.into(), Codec::primitive())
    }

    /// JSON-serialized cell for `key`.
    fn serialized_cell<T>(&self, key: &str, default: T) -> PrefCell<T>
    where
        T: Serialize + DeserializeOwned + Clone + PartialEq + 'static,
    {
        cached_cell(self, key, default, Codec::json())
    }

    /// Uncached JSON accessor with a default.
    fn serialized<T>(&self, key: &str, default: T) -> SerializedPref<T>
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        SerializedPref::new(self.settings().clone(), key, default)
    }

    /// Uncached JSON accessor for a value that may be absent.
    fn serialized_optional<T>(&self, key: &str) -> OptionalSerializedPref<T>
    where
        T: Serialize + DeserializeOwned,
    {
        OptionalSerializedPref::new(self.settings().clone(), key)
    }
}
