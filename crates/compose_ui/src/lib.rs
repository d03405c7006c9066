//! Leptos helpers for asynchronous state, rich inline text and icon decoration.
//!
//! [`AsyncResultView`] renders exactly one presentation for the current
//! [`ui_state::AsyncResult`]; [`use_produce`] and [`use_produce_keyed`] drive a
//! single-flight producer from the reactive graph. [`InlinedTextBuilder`] builds
//! text with inline icons and links, and [`DrawableText`] places a leading or
//! trailing icon next to its content.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod drawable;
mod inlined;
mod loading;
mod produce;
mod render;
mod theme;
mod utils;

pub use drawable::{DrawableText, IconDecoration, IconSide};
pub use inlined::{
    provide_uri_handler, use_uri_handler, Annotation, IconImage, InlineIcon, InlinedText,
    InlinedTextBuilder, RichText, Segment, UriHandler, DEFAULT_ICON_SIZE, ICON_ALT_TEXT,
    SECONDARY_COLOR, URL_TAG,
};
pub use loading::{LoadingAxis, LoadingLayout, LoadingScope};
pub use produce::{
    use_produce, use_produce_keyed, use_produce_keyed_on, ProduceDriver, Produced, SignalSink,
    Spawner,
};
pub use render::{AsyncResultView, DefaultRetryButton};
pub use theme::{
    provide_retry_button_theme, use_retry_button_theme, Dp, ErrorContent, LoadingContent,
    RetryButtonTheme,
};
pub use utils::{check, ButtonColors, DEFAULT_ANIMATION_MS};

/// Convenience imports for crates rendering asynchronous state.
pub mod prelude {
    pub use crate::{
        use_produce, use_produce_keyed, AsyncResultView, DrawableText, Dp, IconDecoration,
        IconImage, InlinedText, InlinedTextBuilder, LoadingScope, RetryButtonTheme, RichText,
    };
    pub use ui_state::{AsyncResult, Failure, OperationError, RetryAction, WrapAsSucceeded};
}
