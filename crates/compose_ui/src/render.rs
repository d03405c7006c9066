//! Rendering an [`AsyncResult`] as exactly one presentation.

use leptos::*;
use ui_state::{AsyncResult, Failure};

use crate::{use_retry_button_theme, ErrorContent, LoadingContent, LoadingScope};

#[component]
/// Renders the error, loading or content presentation for the current state.
///
/// Presentations not supplied as props come from the [`crate::RetryButtonTheme`]
/// in context, then from the built-in defaults.
pub fn AsyncResultView<T, C, V>(
    #[prop(into)] state: Signal<AsyncResult<T>>,
    content: C,
    #[prop(optional)] loading: Option<LoadingContent>,
    #[prop(optional)] error: Option<ErrorContent>,
) -> impl IntoView
where
    T: Clone + 'static,
    C: Fn(T) -> V + 'static,
    V: IntoView + 'static,
{
    let theme = use_retry_button_theme();
    let scope = LoadingScope::new(&theme);
    let loading = loading.unwrap_or_else(|| theme.loading_content.clone());
    let error = error.unwrap_or_else(|| theme.retry_button_content.clone());

    move || {
        state.get().fold(
            |failure| error(failure.clone()),
            || loading(&scope),
            |value| content(value.clone()).into_view(),
        )
    }
}

#[component]
/// Built-in error presentation: a "Retry" button bound to the failure's retry action.
pub fn DefaultRetryButton(failure: Failure) -> impl IntoView {
    let title = failure.message();
    let retry = failure.retry;
    view! {
        <button
            type="button"
            class="ui-retry-button"
            title=title
            data-ui-primitive="true"
            data-ui-kind="retry-button"
            on:click=move |_| retry.invoke()
        >
            "Retry"
        </button>
    }
}
