//! Typed preference cells over an observable key-value store.
//!
//! [`Settings`] is the boundary to whatever persists the values; this crate
//! ships only [`MemorySettings`] and [`NoopSettings`]. Preference groups
//! implement [`PrefsObject`] and get memoized [`PrefCell`]s for primitive and
//! JSON-serialized values.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use thiserror::Error;

mod cell;
mod serialized;
mod settings;

pub use cell::{CellCache, Codec, PrefCell, PrefsObject};
pub use serialized::{
    decode_optional, decode_setting, decode_value, encode_optional, encode_value, try_decode_value,
    OptionalSerializedPref, SerializedPref,
};
pub use settings::{
    MemorySettings, NoopSettings, ObservableSettings, SettingType, SettingValue, Settings,
    SettingsExt, SettingsListener, SettingsListenerFn, SharedSettings,
};

/// Failures while converting preference values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrefsError {
    /// The value could not be serialized.
    #[error("failed to serialize preference `{key}`: {message}")]
    Serialize {
        /// Preference key.
        key: String,
        /// Serializer message.
        message: String,
    },
    /// The stored text could not be parsed.
    #[error("failed to deserialize preference `{key}`: {message}")]
    Deserialize {
        /// Preference key.
        key: String,
        /// Parser message.
        message: String,
    },
    /// The stored value has a different primitive type.
    #[error("preference `{key}` holds a {found} value, expected {expected}")]
    TypeMismatch {
        /// Preference key.
        key: String,
        /// Type the caller asked for.
        expected: &'static str,
        /// Type found in the store.
        found: &'static str,
    },
}
