//! Call-site tag inference.

const CLOSURE_SEGMENT: &str = "::{{closure}}";

/// Where a log call came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Short `module$function` tag.
    pub tag: String,
    /// `file.rs:line` of the call, when known.
    pub line: Option<String>,
}

impl Source {
    /// Creates a source.
    pub fn new(tag: impl Into<String>, line: Option<String>) -> Self {
        Self {
            tag: tag.into(),
            line,
        }
    }
}

/// Builds a short tag from a fully qualified function path.
///
/// Closure segments are dropped and only the last module and the function
/// name are kept: `app::screens::home::load::{{closure}}` becomes `home$load`.
pub fn create_stack_element_tag(path: &str) -> String {
    let mut path = path;
    while let Some(stripped) = path.strip_suffix(CLOSURE_SEGMENT) {
        path = stripped;
    }

    let mut segments = path.rsplit("::").filter(|segment| !segment.is_empty());
    match (segments.next(), segments.next()) {
        (Some(function), Some(module)) => format!("{module}${function}"),
        (Some(function), None) => function.to_string(),
        _ => String::new(),
    }
}

/// Final component of a source path as produced by `file!()`.
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Stem of a source file, used as the tag when only a location is known.
pub fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    name.strip_suffix(".rs").unwrap_or(name)
}
