//! Presentation defaults shared through Leptos context.

use std::{fmt, ops::Add, rc::Rc};

use leptos::*;
use ui_state::Failure;

use crate::{render::DefaultRetryButton, LoadingScope};

/// Length in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Dp(pub f32);

impl Dp {
    /// Zero length.
    pub const ZERO: Self = Self(0.0);

    /// Raw pixel value.
    pub fn px(self) -> f32 {
        self.0
    }
}

impl Add for Dp {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl fmt::Display for Dp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px", self.0)
    }
}

/// Renders the loading presentation.
pub type LoadingContent = Rc<dyn Fn(&LoadingScope) -> View>;

/// Renders the error presentation for a failed state.
pub type ErrorContent = Rc<dyn Fn(Failure) -> View>;

/// Default loading, error and spacing choices for [`crate::AsyncResultView`].
#[derive(Clone)]
pub struct RetryButtonTheme {
    /// Loading presentation; renders nothing by default.
    pub loading_content: LoadingContent,
    /// Error presentation; a "Retry" button bound to the failure's retry
    /// action by default.
    pub retry_button_content: ErrorContent,
    /// Gap after each item of a loading row.
    pub row_space: Dp,
    /// Padding around a loading row.
    pub row_padding: Dp,
    /// Gap after each item repeated with [`LoadingScope::times`].
    pub times_space: Dp,
}

impl Default for RetryButtonTheme {
    fn default() -> Self {
        Self {
            loading_content: Rc::new(|_| ().into_view()),
            retry_button_content: Rc::new(|failure| {
                view! { <DefaultRetryButton failure /> }.into_view()
            }),
            row_space: Dp(8.0),
            row_padding: Dp(16.0),
            times_space: Dp(8.0),
        }
    }
}

impl fmt::Debug for RetryButtonTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryButtonTheme")
            .field("row_space", &self.row_space)
            .field("row_padding", &self.row_padding)
            .field("times_space", &self.times_space)
            .finish_non_exhaustive()
    }
}

/// Makes `theme` the default for descendants of the current owner.
pub fn provide_retry_button_theme(theme: RetryButtonTheme) {
    provide_context(theme);
}

/// Returns the nearest provided theme, or the built-in defaults.
pub fn use_retry_button_theme() -> RetryButtonTheme {
    use_context::<RetryButtonTheme>().unwrap_or_default()
}
