//! JSON-backed object values stored as text per key.

use serde::{de::DeserializeOwned, Serialize};

use crate::{PrefsError, SettingValue, Settings, SharedSettings};

/// Serializes `value` to JSON and stores it under `key`.
///
/// # Errors
///
/// Returns an error when serialization fails; the store is left untouched.
pub fn encode_value<S: Settings + ?Sized, T: Serialize + ?Sized>(
    settings: &S,
    key: &str,
    value: &T,
) -> Result<(), PrefsError> {
    let raw = serde_json::to_string(value).map_err(|err| PrefsError::Serialize {
        key: key.to_string(),
        message: err.to_string(),
    })?;
    settings.put_value(key, SettingValue::String(raw));
    Ok(())
}

/// Stores `Some(value)` as JSON; `None` removes the key.
///
/// # Errors
///
/// Returns an error when serialization fails.
pub fn encode_optional<S: Settings + ?Sized, T: Serialize>(
    settings: &S,
    key: &str,
    value: Option<&T>,
) -> Result<(), PrefsError> {
    match value {
        Some(value) => encode_value(settings, key, value),
        None => {
            settings.remove(key);
            Ok(())
        }
    }
}

/// Parses a stored value as JSON.
///
/// # Errors
///
/// Returns an error when the value is not text or does not parse as `T`.
pub fn decode_setting<T: DeserializeOwned>(key: &str, value: &SettingValue) -> Result<T, PrefsError> {
    let SettingValue::String(raw) = value else {
        return Err(PrefsError::TypeMismatch {
            key: key.to_string(),
            expected: "string",
            found: value.kind(),
        });
    };
    serde_json::from_str(raw).map_err(|err| PrefsError::Deserialize {
        key: key.to_string(),
        message: err.to_string(),
    })
}

/// Loads and parses `key`; `Ok(None)` when the key is missing.
///
/// # Errors
///
/// Returns an error when the stored value cannot be decoded as `T`.
pub fn try_decode_value<S: Settings + ?Sized, T: DeserializeOwned>(
    settings: &S,
    key: &str,
) -> Result<Option<T>, PrefsError> {
    settings
        .get_value(key)
        .map(|value| decode_setting(key, &value))
        .transpose()
}

/// Loads `key`, falling back to `default` when it is missing or unreadable.
pub fn decode_value<S: Settings + ?Sized, T: DeserializeOwned>(
    settings: &S,
    key: &str,
    default: T,
) -> T {
    match try_decode_value(settings, key) {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(err) => {
            logger::ll_w!(cause = err; "using default for unreadable preference `{key}`");
            default
        }
    }
}

/// Loads `key` as an optional value; unreadable values read as `None`.
pub fn decode_optional<S: Settings + ?Sized, T: DeserializeOwned>(
    settings: &S,
    key: &str,
) -> Option<T> {
    match try_decode_value(settings, key) {
        Ok(value) => value,
        Err(err) => {
            logger::ll_w!(cause = err; "ignoring unreadable preference `{key}`");
            None
        }
    }
}

/// Uncached accessor for a serialized value with a default.
///
/// Every read goes to the store, so independent accessors on the same store
/// always agree.
pub struct SerializedPref<T> {
    settings: SharedSettings,
    key: String,
    default: T,
}

impl<T: Serialize + DeserializeOwned + Clone> SerializedPref<T> {
    /// Binds `key` on `settings`.
    pub fn new(settings: SharedSettings, key: impl Into<String>, default: T) -> Self {
        Self {
            settings,
            key: key.into(),
            default,
        }
    }

    /// Storage key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current value, or the default.
    pub fn get(&self) -> T {
        decode_value(&*self.settings, &self.key, self.default.clone())
    }

    /// Stores `value`.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization fails.
    pub fn set(&self, value: &T) -> Result<(), PrefsError> {
        encode_value(&*self.settings, &self.key, value)
    }

    /// Reads, modifies and stores the value.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization fails.
    pub fn modify(&self, f: impl FnOnce(&mut T)) -> Result<(), PrefsError> {
        let mut value = self.get();
        f(&mut value);
        self.set(&value)
    }
}

/// Uncached accessor for a serialized value that may be absent.
pub struct OptionalSerializedPref<T> {
    settings: SharedSettings,
    key: String,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> OptionalSerializedPref<T> {
    /// Binds `key` on `settings`.
    pub fn new(settings: SharedSettings, key: impl Into<String>) -> Self {
        Self {
            settings,
            key: key.into(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Storage key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current value, if stored and readable.
    pub fn get(&self) -> Option<T> {
        decode_optional(&*self.settings, &self.key)
    }

    /// Stores `Some(value)` or removes the key for `None`.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization fails.
    pub fn set(&self, value: Option<&T>) -> Result<(), PrefsError> {
        encode_optional(&*self.settings, &self.key, value)
    }
}
