//! Key-value settings store contracts and in-memory adapters.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// One stored primitive value.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    /// Boolean value.
    Bool(bool),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Text, also used for serialized objects.
    String(String),
}

impl SettingValue {
    /// Short name of the stored type, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::String(_) => "string",
        }
    }
}

/// Rust types that map onto exactly one [`SettingValue`] variant.
pub trait SettingType: Sized + Clone + 'static {
    /// Variant name, matching [`SettingValue::kind`].
    const KIND: &'static str;

    /// Extracts `Self` when `value` holds the matching variant.
    fn from_setting(value: &SettingValue) -> Option<Self>;

    /// Wraps `self` in its variant.
    fn into_setting(self) -> SettingValue;
}

macro_rules! setting_type {
    ($ty:ty, $variant:ident, $kind:literal) => {
        impl SettingType for $ty {
            const KIND: &'static str = $kind;

            fn from_setting(value: &SettingValue) -> Option<Self> {
                match value {
                    SettingValue::$variant(inner) => Some(inner.clone()),
                    _ => None,
                }
            }

            fn into_setting(self) -> SettingValue {
                SettingValue::$variant(self)
            }
        }
    };
}

setting_type!(bool, Bool, "bool");
setting_type!(i32, Int, "int");
setting_type!(i64, Long, "long");
setting_type!(f32, Float, "float");
setting_type!(f64, Double, "double");
setting_type!(String, String, "string");

/// External key-value store the preference layer forwards to.
pub trait Settings {
    /// All stored keys, in no particular order.
    fn keys(&self) -> Vec<String>;

    /// Returns `true` when `key` has a value.
    fn has_key(&self, key: &str) -> bool {
        self.get_value(key).is_some()
    }

    /// Reads the raw value for `key`.
    fn get_value(&self, key: &str) -> Option<SettingValue>;

    /// Writes the raw value for `key`.
    fn put_value(&self, key: &str, value: SettingValue);

    /// Deletes `key`.
    fn remove(&self, key: &str);

    /// Deletes every key.
    fn clear(&self);
}

/// Typed accessors over any [`Settings`] implementation.
pub trait SettingsExt: Settings {
    /// Reads `key` as `T`; `None` when missing or stored with another type.
    fn get<T: SettingType>(&self, key: &str) -> Option<T> {
        self.get_value(key)
            .and_then(|value| T::from_setting(&value))
    }

    /// Reads `key` as `T`, falling back to `default`.
    fn get_or<T: SettingType>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Writes `value` under `key`.
    fn put<T: SettingType>(&self, key: &str, value: T) {
        self.put_value(key, value.into_setting());
    }
}

impl<S: Settings + ?Sized> SettingsExt for S {}

/// Callback fired after a key changes; `None` means the key was removed.
pub type SettingsListenerFn = Rc<dyn Fn(Option<&SettingValue>)>;

/// Settings store that reports per-key changes.
pub trait ObservableSettings: Settings {
    /// Registers `listener` for `key`; dropping the handle deregisters it.
    fn add_listener(&self, key: &str, listener: SettingsListenerFn) -> SettingsListener;
}

/// Shared handle to an observable store.
pub type SharedSettings = Rc<dyn ObservableSettings>;

/// Drop-based listener registration handle.
#[must_use = "dropping the handle deregisters the listener"]
pub struct SettingsListener {
    release: Option<Box<dyn FnOnce()>>,
}

impl SettingsListener {
    /// Wraps a deregistration callback.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Handle for stores that never notify.
    pub fn inert() -> Self {
        Self { release: None }
    }
}

impl Drop for SettingsListener {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Store that keeps nothing.
pub struct NoopSettings;

impl Settings for NoopSettings {
    fn keys(&self) -> Vec<String> {
        Vec::new()
    }

    fn get_value(&self, _key: &str) -> Option<SettingValue> {
        None
    }

    fn put_value(&self, _key: &str, _value: SettingValue) {}

    fn remove(&self, _key: &str) {}

    fn clear(&self) {}
}

impl ObservableSettings for NoopSettings {
    fn add_listener(&self, _key: &str, _listener: SettingsListenerFn) -> SettingsListener {
        SettingsListener::inert()
    }
}

#[derive(Default)]
struct MemoryInner {
    values: HashMap<String, SettingValue>,
    listeners: HashMap<String, Vec<(u64, SettingsListenerFn)>>,
    next_listener_id: u64,
}

#[derive(Clone, Default)]
/// In-memory observable store keyed by string. Clones share the same map.
pub struct MemorySettings {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemorySettings {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the store in a [`SharedSettings`] handle.
    pub fn shared(&self) -> SharedSettings {
        Rc::new(self.clone())
    }

    fn notify(&self, key: &str, value: Option<&SettingValue>) {
        let listeners: Vec<SettingsListenerFn> = self
            .inner
            .borrow()
            .listeners
            .get(key)
            .map(|listeners| listeners.iter().map(|(_, f)| f.clone()).collect())
            .unwrap_or_default();
        for listener in listeners {
            listener(value);
        }
    }
}

impl std::fmt::Debug for MemorySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySettings")
            .field("values", &self.inner.borrow().values)
            .finish()
    }
}

impl Settings for MemorySettings {
    fn keys(&self) -> Vec<String> {
        self.inner.borrow().values.keys().cloned().collect()
    }

    fn get_value(&self, key: &str) -> Option<SettingValue> {
        self.inner.borrow().values.get(key).cloned()
    }

    fn put_value(&self, key: &str, value: SettingValue) {
        self.inner
            .borrow_mut()
            .values
            .insert(key.to_string(), value.clone());
        self.notify(key, Some(&value));
    }

    fn remove(&self, key: &str) {
        let removed = self.inner.borrow_mut().values.remove(key);
        if removed.is_some() {
            self.notify(key, None);
        }
    }

    fn clear(&self) {
        let keys: Vec<String> = self.inner.borrow_mut().values.drain().map(|(k, _)| k).collect();
        for key in keys {
            self.notify(&key, None);
        }
    }
}

impl ObservableSettings for MemorySettings {
    fn add_listener(&self, key: &str, listener: SettingsListenerFn) -> SettingsListener {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_listener_id;
            inner.next_listener_id += 1;
            inner
                .listeners
                .entry(key.to_string())
                .or_default()
                .push((id, listener));
            id
        };

        let weak = Rc::downgrade(&self.inner);
        let key = key.to_string();
        SettingsListener::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.borrow_mut();
                if let Some(listeners) = inner.listeners.get_mut(&key) {
                    listeners.retain(|(listener_id, _)| *listener_id != id);
                    if listeners.is_empty() {
                        inner.listeners.remove(&key);
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn memory_settings_round_trip_and_remove() {
        let settings = MemorySettings::new();
        settings.put("flag", true);
        settings.put("count", 42_i32);
        assert_eq!(settings.get::<bool>("flag"), Some(true));
        assert_eq!(settings.get_or("count", 0_i32), 42);
        assert!(settings.has_key("count"));

        settings.remove("flag");
        assert_eq!(settings.get::<bool>("flag"), None);
        assert_eq!(settings.keys(), vec!["count".to_string()]);
    }

    #[test]
    fn typed_reads_do_not_coerce_between_variants() {
        let settings = MemorySettings::new();
        settings.put("n", 7_i32);
        assert_eq!(settings.get::<i64>("n"), None);
        assert_eq!(settings.get::<i32>("n"), Some(7));
    }

    #[test]
    fn listeners_fire_until_dropped() {
        let settings = MemorySettings::new();
        let hits = Rc::new(Cell::new(0));
        let listener = settings.add_listener("k", {
            let hits = hits.clone();
            Rc::new(move |_: Option<&SettingValue>| hits.set(hits.get() + 1))
        });

        settings.put("k", 1_i64);
        settings.put("other", 1_i64);
        settings.remove("k");
        assert_eq!(hits.get(), 2);

        drop(listener);
        settings.put("k", 2_i64);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn clear_notifies_removed_keys() {
        let settings = MemorySettings::new();
        settings.put("a", "x".to_string());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _listener = settings.add_listener("a", {
            let seen = seen.clone();
            Rc::new(move |value: Option<&SettingValue>| seen.borrow_mut().push(value.cloned()))
        });
        settings.clear();
        assert_eq!(*seen.borrow(), vec![None]);
        assert!(settings.keys().is_empty());
    }

    #[test]
    fn noop_settings_is_empty() {
        let settings = NoopSettings;
        settings.put("k", 1.5_f64);
        assert_eq!(settings.get::<f64>("k"), None);
        let _listener = settings.add_listener("k", Rc::new(|_: Option<&SettingValue>| {}));
    }
}
