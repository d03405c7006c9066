//! Placeholder layouts for the loading presentation.

use leptos::*;

use crate::{Dp, RetryButtonTheme};

/// Direction placeholders are laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingAxis {
    /// Stacked in the surrounding flow.
    Column,
    /// Side by side inside a padded row.
    Row,
}

impl LoadingAxis {
    fn token(self) -> &'static str {
        match self {
            Self::Column => "column",
            Self::Row => "row",
        }
    }
}

/// How many placeholders to draw and how to space them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadingLayout {
    /// Layout direction.
    pub axis: LoadingAxis,
    /// Number of placeholder copies.
    pub count: usize,
    /// Square spacer drawn after every copy.
    pub spacer: Dp,
    /// Padding around the row; always zero for columns.
    pub padding: Dp,
}

impl LoadingLayout {
    /// `count` copies in the surrounding flow, each followed by `spacer`.
    pub fn times(count: usize, spacer: Dp) -> Self {
        Self {
            axis: LoadingAxis::Column,
            count,
            spacer,
            padding: Dp::ZERO,
        }
    }

    /// `count` copies in a row padded by `padding`, each followed by `spacer`.
    pub fn row(count: usize, spacer: Dp, padding: Dp) -> Self {
        Self {
            axis: LoadingAxis::Row,
            count,
            spacer,
            padding,
        }
    }

    /// Inline style of the row container, if the layout has one.
    pub fn container_style(&self) -> Option<String> {
        match self.axis {
            LoadingAxis::Column => None,
            LoadingAxis::Row => Some(format!(
                "display: flex; flex-direction: row; padding: {};",
                self.padding
            )),
        }
    }

    /// Inline style of the spacer following each copy.
    pub fn spacer_style(&self) -> String {
        format!(
            "width: {0}; height: {0}; flex-shrink: 0;",
            self.spacer
        )
    }

    /// Renders `content` according to this layout.
    pub fn render<V: IntoView>(&self, content: impl Fn() -> V) -> View {
        let spacer_style = self.spacer_style();
        let items = (0..self.count)
            .map(|_| {
                view! {
                    <>
                        {content()}
                        <div
                            style=spacer_style.clone()
                            aria-hidden="true"
                            data-ui-kind="loading-spacer"
                        ></div>
                    </>
                }
            })
            .collect_view();

        match self.container_style() {
            None => items,
            Some(style) => view! {
                <div
                    style=style
                    data-ui-primitive="true"
                    data-ui-kind="loading-row"
                    data-ui-axis=self.axis.token()
                >
                    {items}
                </div>
            }
            .into_view(),
        }
    }
}

/// Combinators available to a loading presentation.
///
/// Spacing comes from the [`RetryButtonTheme`] in effect where the view is
/// rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadingScope {
    row_space: Dp,
    row_padding: Dp,
    times_space: Dp,
}

impl LoadingScope {
    /// Scope using the spacing of `theme`.
    pub fn new(theme: &RetryButtonTheme) -> Self {
        Self {
            row_space: theme.row_space,
            row_padding: theme.row_padding,
            times_space: theme.times_space,
        }
    }

    /// Layout for [`times`](Self::times).
    pub fn times_layout(&self, count: usize) -> LoadingLayout {
        LoadingLayout::times(count, self.times_space)
    }

    /// Layout for [`row`](Self::row).
    pub fn row_layout(&self, count: usize) -> LoadingLayout {
        LoadingLayout::row(count, self.row_space, self.row_padding)
    }

    /// Layout for [`row_spaced`](Self::row_spaced).
    pub fn row_spaced_layout(&self, count: usize, spaced_by: Dp) -> LoadingLayout {
        LoadingLayout::row(count, spaced_by, self.row_padding)
    }

    /// Repeats `content` `count` times.
    ///
    /// Copies are separated by the theme's `times_space`. This differs from
    /// the row combinators, and from the classic layout that reused the row
    /// gap `row_space` here.
    pub fn times<V: IntoView>(&self, count: usize, content: impl Fn() -> V) -> View {
        self.times_layout(count).render(content)
    }

    /// Repeats `content` `count` times in a padded row.
    pub fn row<V: IntoView>(&self, count: usize, content: impl Fn() -> V) -> View {
        self.row_layout(count).render(content)
    }

    /// Like [`row`](Self::row) with an explicit gap between items.
    pub fn row_spaced<V: IntoView>(
        &self,
        count: usize,
        spaced_by: Dp,
        content: impl Fn() -> V,
    ) -> View {
        self.row_spaced_layout(count, spaced_by).render(content)
    }
}

impl Default for LoadingScope {
    fn default() -> Self {
        Self::new(&RetryButtonTheme::default())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn times_stacks_copies_without_a_container() {
        let layout = LoadingScope::default().times_layout(3);
        assert_eq!(layout, LoadingLayout::times(3, Dp(8.0)));
        assert_eq!(layout.container_style(), None);
        assert_eq!(
            layout.spacer_style(),
            "width: 8px; height: 8px; flex-shrink: 0;"
        );
    }

    #[test]
    fn times_spacing_is_independent_of_the_row_gap() {
        let scope = LoadingScope::new(&RetryButtonTheme {
            row_space: Dp(4.0),
            times_space: Dp(10.0),
            ..RetryButtonTheme::default()
        });
        assert_eq!(scope.times_layout(2).spacer, Dp(10.0));
        assert_eq!(scope.row_layout(2).spacer, Dp(4.0));
    }

    #[test]
    fn rows_use_theme_padding_and_spacing() {
        let scope = LoadingScope::new(&RetryButtonTheme {
            row_space: Dp(4.0),
            row_padding: Dp(12.0),
            ..RetryButtonTheme::default()
        });

        let row = scope.row_layout(2);
        assert_eq!(row.axis, LoadingAxis::Row);
        assert_eq!(row.spacer, Dp(4.0));
        assert_eq!(
            row.container_style().as_deref(),
            Some("display: flex; flex-direction: row; padding: 12px;")
        );

        let spaced = scope.row_spaced_layout(5, Dp(1.0));
        assert_eq!(spaced.count, 5);
        assert_eq!(spaced.spacer, Dp(1.0));
        assert_eq!(spaced.padding, Dp(12.0));
    }
}
