//! Leading and trailing icons drawn next to text.

use leptos::*;

use crate::{utils::merge_layout_class, Dp, IconImage};

/// Side of the content the icon sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconSide {
    /// Before the content.
    Start,
    /// After the content.
    End,
}

impl IconSide {
    fn token(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

/// Geometry of an icon decorating some content.
///
/// The content is inset by `image_size + padding` on the icon's side and the
/// icon is centred vertically.
#[derive(Debug, Clone, PartialEq)]
pub struct IconDecoration {
    /// Side the icon is drawn on.
    pub side: IconSide,
    /// Square icon size.
    pub image_size: Dp,
    /// Gap between icon and content.
    pub padding: Dp,
    /// Colour the icon is tinted with; `None` draws the image as is.
    pub tint: Option<String>,
}

impl IconDecoration {
    /// Leading icon, 16px with a 4px gap, tinted with the text colour.
    pub fn drawable_start() -> Self {
        Self {
            side: IconSide::Start,
            image_size: Dp(16.0),
            padding: Dp(4.0),
            tint: Some("currentColor".to_string()),
        }
    }

    /// Trailing icon, 16px with a 4px gap, tinted with the text colour.
    pub fn drawable_end() -> Self {
        Self {
            side: IconSide::End,
            ..Self::drawable_start()
        }
    }

    /// Sets the icon size.
    pub fn with_size(mut self, image_size: Dp) -> Self {
        self.image_size = image_size;
        self
    }

    /// Sets the gap between icon and content.
    pub fn with_padding(mut self, padding: Dp) -> Self {
        self.padding = padding;
        self
    }

    /// Sets or clears the tint.
    pub fn with_tint(mut self, tint: Option<String>) -> Self {
        self.tint = tint;
        self
    }

    /// Inset applied to the content on the icon's side.
    pub fn content_inset(&self) -> Dp {
        self.image_size + self.padding
    }

    /// Inline style of the decorated container.
    pub fn container_style(&self) -> String {
        let inset = match self.side {
            IconSide::Start => "padding-left",
            IconSide::End => "padding-right",
        };
        format!(
            "position: relative; display: inline-block; {inset}: {};",
            self.content_inset()
        )
    }

    /// Inline style of the icon element showing `image`.
    pub fn icon_style(&self, image: &IconImage) -> String {
        let edge = match self.side {
            IconSide::Start => "left",
            IconSide::End => "right",
        };
        let mut style = format!(
            "position: absolute; {edge}: 0; top: 50%; transform: translateY(-50%); \
             width: {0}; height: {0};",
            self.image_size
        );
        match &self.tint {
            Some(tint) => style.push_str(&format!(
                " background-color: {tint}; mask: url(\"{src}\") center / contain no-repeat; \
                 -webkit-mask: url(\"{src}\") center / contain no-repeat;",
                src = image.src
            )),
            None => style.push_str(&format!(
                " background: url(\"{}\") center / contain no-repeat;",
                image.src
            )),
        }
        style
    }
}

#[component]
/// Content with an icon drawn before or after it.
pub fn DrawableText(
    icon: IconImage,
    #[prop(default = IconDecoration::drawable_start())] decoration: IconDecoration,
    #[prop(optional)] layout_class: Option<&'static str>,
    children: Children,
) -> impl IntoView {
    view! {
        <span
            class=merge_layout_class("ui-drawable-text", layout_class)
            style=decoration.container_style()
            data-ui-primitive="true"
            data-ui-kind="drawable-text"
            data-ui-side=decoration.side.token()
        >
            <span
                style=decoration.icon_style(&icon)
                aria-hidden="true"
                data-ui-kind="drawable-icon"
            ></span>
            {children()}
        </span>
    }
}
