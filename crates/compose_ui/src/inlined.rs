//! Text with inline icons, underlined runs and clickable links.

use std::{collections::BTreeMap, fmt, ops::Range, rc::Rc};

use leptos::*;

use crate::{
    utils::{bool_token, merge_layout_class},
    Dp,
};

/// Annotation tag carried by link runs.
pub const URL_TAG: &str = "URL";

/// Alternate text standing in for an inline icon.
pub const ICON_ALT_TEXT: &str = "[icon]";

/// Icon size used by [`InlinedTextBuilder::append_icon`].
pub const DEFAULT_ICON_SIZE: Dp = Dp(16.0);

/// Colour of underlined and link runs unless overridden.
pub const SECONDARY_COLOR: &str = "var(--ui-color-secondary, currentColor)";

/// Image drawn for an icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconImage {
    /// Image URL or data URI.
    pub src: String,
}

impl IconImage {
    /// Icon loaded from `src`.
    pub fn new(src: impl Into<String>) -> Self {
        Self { src: src.into() }
    }
}

/// Icon placed inline, addressed by its placeholder id.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineIcon {
    /// Placeholder id, `<<icon{n}>>`.
    pub id: String,
    /// Image to draw.
    pub image: IconImage,
    /// Square size of the placeholder.
    pub size: Dp,
}

/// One run of a [`RichText`].
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Unstyled text.
    Text(String),
    /// Text in the secondary colour, underlined.
    Underlined(String),
    /// Underlined text opening `url` when activated.
    Link {
        /// Visible text.
        text: String,
        /// Target.
        url: String,
    },
    /// Inline icon placeholder.
    Icon {
        /// Key into [`RichText::inline_content`].
        id: String,
    },
}

impl Segment {
    fn text(&self) -> &str {
        match self {
            Self::Text(text) | Self::Underlined(text) | Self::Link { text, .. } => text,
            Self::Icon { .. } => ICON_ALT_TEXT,
        }
    }
}

/// Tagged metadata attached to a range of the plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Tag, e.g. [`URL_TAG`].
    pub tag: &'static str,
    /// Payload.
    pub item: String,
    /// Character range covered.
    pub range: Range<usize>,
}

/// Immutable output of [`InlinedTextBuilder`].
///
/// Offsets are counted in characters of [`plain_text`](Self::plain_text),
/// where every icon contributes its alternate text.
#[derive(Debug, Clone, PartialEq)]
pub struct RichText {
    segments: Vec<(Range<usize>, Segment)>,
    inline_content: BTreeMap<String, InlineIcon>,
    secondary: String,
}

impl RichText {
    /// Runs with their character ranges, in order.
    pub fn segments(&self) -> impl Iterator<Item = (&Range<usize>, &Segment)> {
        self.segments.iter().map(|(range, segment)| (range, segment))
    }

    /// Icons by placeholder id.
    pub fn inline_content(&self) -> &BTreeMap<String, InlineIcon> {
        &self.inline_content
    }

    /// Colour used for underlined and link runs.
    pub fn secondary_color(&self) -> &str {
        &self.secondary
    }

    /// Text with icons replaced by [`ICON_ALT_TEXT`].
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .map(|(_, segment)| segment.text())
            .collect()
    }

    /// Length of [`plain_text`](Self::plain_text) in characters.
    pub fn len(&self) -> usize {
        self.segments.last().map_or(0, |(range, _)| range.end)
    }

    /// `true` when nothing was appended.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Annotations tagged `tag` that overlap `start..=end`.
    pub fn annotations(&self, tag: &str, start: usize, end: usize) -> Vec<Annotation> {
        self.segments
            .iter()
            .filter_map(|(range, segment)| match segment {
                Segment::Link { url, .. } if tag == URL_TAG => Some(Annotation {
                    tag: URL_TAG,
                    item: url.clone(),
                    range: range.clone(),
                }),
                _ => None,
            })
            .filter(|annotation| annotation.range.start <= end && start < annotation.range.end)
            .collect()
    }

    /// `true` when any run is a link.
    pub fn has_links(&self) -> bool {
        self.segments
            .iter()
            .any(|(_, segment)| matches!(segment, Segment::Link { .. }))
    }

    /// Target of the link covering character `offset`.
    pub fn url_at(&self, offset: usize) -> Option<&str> {
        self.segments
            .iter()
            .find_map(|(range, segment)| match segment {
                Segment::Link { url, .. } if range.contains(&offset) => Some(url.as_str()),
                _ => None,
            })
    }
}

/// Builds a [`RichText`] one run at a time.
#[derive(Debug, Clone)]
pub struct InlinedTextBuilder {
    segments: Vec<(Range<usize>, Segment)>,
    inline_content: BTreeMap<String, InlineIcon>,
    secondary: String,
    cursor: usize,
    next_icon: usize,
}

impl Default for InlinedTextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InlinedTextBuilder {
    /// Empty builder using [`SECONDARY_COLOR`].
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            inline_content: BTreeMap::new(),
            secondary: SECONDARY_COLOR.to_string(),
            cursor: 0,
            next_icon: 0,
        }
    }

    /// Overrides the colour of underlined and link runs.
    pub fn with_secondary(mut self, color: impl Into<String>) -> Self {
        self.secondary = color.into();
        self
    }

    fn push(&mut self, segment: Segment) -> &mut Self {
        let len = segment.text().chars().count();
        if len == 0 && !matches!(segment, Segment::Icon { .. }) {
            return self;
        }
        let range = self.cursor..self.cursor + len;
        self.cursor = range.end;
        self.segments.push((range, segment));
        self
    }

    /// Appends unstyled text.
    pub fn append_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Segment::Text(text.into()))
    }

    /// Appends an icon at [`DEFAULT_ICON_SIZE`].
    pub fn append_icon(&mut self, image: IconImage) -> &mut Self {
        self.append_icon_sized(image, DEFAULT_ICON_SIZE)
    }

    /// Appends an icon drawn at `size`.
    pub fn append_icon_sized(&mut self, image: IconImage, size: Dp) -> &mut Self {
        let id = format!("<<icon{}>>", self.next_icon);
        self.next_icon += 1;
        self.inline_content.insert(
            id.clone(),
            InlineIcon {
                id: id.clone(),
                image,
                size,
            },
        );
        self.push(Segment::Icon { id })
    }

    /// Appends underlined text in the secondary colour.
    pub fn append_underlined(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Segment::Underlined(text.into()))
    }

    /// Appends underlined text that opens `url`.
    pub fn append_link(&mut self, text: impl Into<String>, url: impl Into<String>) -> &mut Self {
        self.push(Segment::Link {
            text: text.into(),
            url: url.into(),
        })
    }

    /// Appends every run of `text`, renumbering its icons.
    pub fn append_rich(&mut self, text: &RichText) -> &mut Self {
        for (_, segment) in &text.segments {
            match segment {
                Segment::Icon { id } => {
                    if let Some(icon) = text.inline_content.get(id) {
                        self.append_icon_sized(icon.image.clone(), icon.size);
                    }
                }
                other => {
                    self.push(other.clone());
                }
            }
        }
        self
    }

    /// Finishes the text.
    pub fn build(&self) -> RichText {
        RichText {
            segments: self.segments.clone(),
            inline_content: self.inline_content.clone(),
            secondary: self.secondary.clone(),
        }
    }
}

/// Opens link targets on behalf of [`InlinedText`].
#[derive(Clone)]
pub struct UriHandler(Rc<dyn Fn(&str)>);

impl UriHandler {
    /// Handler calling `open` with each activated URL.
    pub fn new(open: impl Fn(&str) + 'static) -> Self {
        Self(Rc::new(open))
    }

    /// Opens `uri`.
    pub fn open_uri(&self, uri: &str) {
        (self.0)(uri);
    }
}

impl fmt::Debug for UriHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UriHandler(..)")
    }
}

/// Routes link activation under the current owner through `handler`.
pub fn provide_uri_handler(handler: UriHandler) {
    provide_context(handler);
}

/// The provided handler; `None` leaves navigation to the browser.
pub fn use_uri_handler() -> Option<UriHandler> {
    use_context::<UriHandler>()
}

fn emphasis_style(color: &str) -> String {
    format!("color: {color}; text-decoration: underline;")
}

fn render_segment(text: &RichText, segment: &Segment, handler: Option<UriHandler>) -> View {
    match segment {
        Segment::Text(value) => value.clone().into_view(),
        Segment::Underlined(value) => view! {
            <span style=emphasis_style(&text.secondary) data-ui-kind="inlined-underline">
                {value.clone()}
            </span>
        }
        .into_view(),
        Segment::Link { text: label, url } => {
            let target = url.clone();
            view! {
                <a
                    href=url.clone()
                    style=emphasis_style(&text.secondary)
                    data-ui-kind="inlined-link"
                    on:click=move |ev| {
                        if let Some(handler) = handler.as_ref() {
                            ev.prevent_default();
                            handler.open_uri(&target);
                        }
                    }
                >
                    {label.clone()}
                </a>
            }
            .into_view()
        }
        Segment::Icon { id } => match text.inline_content.get(id) {
            Some(icon) => view! {
                <img
                    src=icon.image.src.clone()
                    alt=ICON_ALT_TEXT
                    width=icon.size.px().to_string()
                    height=icon.size.px().to_string()
                    style="vertical-align: middle;"
                    data-ui-kind="inlined-icon"
                    data-ui-icon=icon.id.clone()
                />
            }
            .into_view(),
            None => {
                logger::ll_w!("inline icon `{id}` has no content");
                ICON_ALT_TEXT.into_view()
            }
        },
    }
}

#[component]
/// Renders a [`RichText`]; links open through the [`UriHandler`] in context.
pub fn InlinedText(
    text: RichText,
    #[prop(optional)] layout_class: Option<&'static str>,
    #[prop(optional, into)] color: Option<String>,
) -> impl IntoView {
    let handler = use_uri_handler();
    let runs = text
        .segments
        .iter()
        .map(|(_, segment)| render_segment(&text, segment, handler.clone()))
        .collect_view();

    view! {
        <span
            class=merge_layout_class("ui-inlined-text", layout_class)
            style=color.map(|color| format!("color: {color};"))
            data-ui-primitive="true"
            data-ui-kind="inlined-text"
            data-ui-links=bool_token(text.has_links())
        >
            {runs}
        </span>
    }
}
