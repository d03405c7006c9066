//! Tagging logger shim over `tracing`.
//!
//! Every event carries a short `tag` field inferred from the call site
//! (`module$function`) and a `--->(file.rs:line)` suffix pointing at the call.
//! Events are emitted under the [`TARGET`] target; whichever subscriber is
//! installed decides where they go. [`init_console`] installs one that prints
//! through `leptos::logging`.
//!
//! ```
//! logger::ll_i!("loaded {} items", 3);
//! ```

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::{error::Error, fmt, panic::Location};

mod console;
mod tag;

pub use console::{init_console, ConsoleWriter, MakeConsoleWriter};
pub use tag::{create_stack_element_tag, file_name, file_stem, Source};
pub use tracing::Level;

#[doc(hidden)]
pub use tracing as __tracing;

/// Target of every event emitted by this crate.
pub const TARGET: &str = "logger";

/// Emits one event. Used by the `ll_*` macros.
///
/// The call-site line is appended to the message; the tag and the cause's
/// display text travel as the `tag` and `cause` fields.
pub fn log_at(
    level: Level,
    source: Option<Source>,
    message: fmt::Arguments<'_>,
    cause: Option<&dyn Error>,
) {
    let (tag, message) = match source {
        Some(Source { tag, line: Some(line) }) => (Some(tag), format!("{message}--->({line})")),
        Some(Source { tag, line: None }) => (Some(tag), message.to_string()),
        None => (None, message.to_string()),
    };
    let tag = tag.as_deref();
    let cause = cause.map(ToString::to_string);
    let cause = cause.as_deref();

    match level {
        Level::ERROR => tracing::error!(target: TARGET, tag, cause, "{message}"),
        Level::WARN => tracing::warn!(target: TARGET, tag, cause, "{message}"),
        Level::INFO => tracing::info!(target: TARGET, tag, cause, "{message}"),
        Level::DEBUG => tracing::debug!(target: TARGET, tag, cause, "{message}"),
        _ => tracing::trace!(target: TARGET, tag, cause, "{message}"),
    }
}

#[track_caller]
fn caller_source() -> Source {
    let location = Location::caller();
    Source::new(
        file_stem(location.file()),
        Some(format!("{}:{}", file_name(location.file()), location.line())),
    )
}

/// Logs at error level, tagged with the caller's file.
#[track_caller]
pub fn error(message: impl fmt::Display) {
    log_at(Level::ERROR, Some(caller_source()), format_args!("{message}"), None);
}

/// Logs an error together with its cause.
#[track_caller]
pub fn error_with(cause: &dyn Error, message: impl fmt::Display) {
    log_at(
        Level::ERROR,
        Some(caller_source()),
        format_args!("{message}"),
        Some(cause),
    );
}

/// Logs at warn level, tagged with the caller's file.
#[track_caller]
pub fn warn(message: impl fmt::Display) {
    log_at(Level::WARN, Some(caller_source()), format_args!("{message}"), None);
}

/// Logs a warning together with its cause.
#[track_caller]
pub fn warn_with(cause: &dyn Error, message: impl fmt::Display) {
    log_at(
        Level::WARN,
        Some(caller_source()),
        format_args!("{message}"),
        Some(cause),
    );
}

/// Logs at info level, tagged with the caller's file.
#[track_caller]
pub fn info(message: impl fmt::Display) {
    log_at(Level::INFO, Some(caller_source()), format_args!("{message}"), None);
}

/// Logs at debug level, tagged with the caller's file.
#[track_caller]
pub fn debug(message: impl fmt::Display) {
    log_at(Level::DEBUG, Some(caller_source()), format_args!("{message}"), None);
}

#[doc(hidden)]
#[macro_export]
macro_rules! __ll_source {
    () => {{
        fn __ll_here() {}
        let path = ::std::any::type_name_of_val(&__ll_here);
        let path = path.strip_suffix("::__ll_here").unwrap_or(path);
        $crate::Source::new(
            $crate::create_stack_element_tag(path),
            ::std::option::Option::Some(::std::format!(
                "{}:{}",
                $crate::file_name(::std::file!()),
                ::std::line!()
            )),
        )
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __ll_log {
    ($level:expr, cause = $cause:expr; $($arg:tt)+) => {
        if $crate::__tracing::enabled!(target: $crate::TARGET, $level) {
            $crate::log_at(
                $level,
                ::std::option::Option::Some($crate::__ll_source!()),
                ::std::format_args!($($arg)+),
                ::std::option::Option::Some(&$cause as &dyn ::std::error::Error),
            )
        }
    };
    ($level:expr, $($arg:tt)+) => {
        if $crate::__tracing::enabled!(target: $crate::TARGET, $level) {
            $crate::log_at(
                $level,
                ::std::option::Option::Some($crate::__ll_source!()),
                ::std::format_args!($($arg)+),
                ::std::option::Option::None,
            )
        }
    };
}

/// Logs at debug level with a call-site tag.
#[macro_export]
macro_rules! ll_d {
    ($($arg:tt)+) => { $crate::__ll_log!($crate::Level::DEBUG, $($arg)+) };
}

/// Logs at info level with a call-site tag.
#[macro_export]
macro_rules! ll_i {
    ($($arg:tt)+) => { $crate::__ll_log!($crate::Level::INFO, $($arg)+) };
}

/// Logs at warn level with a call-site tag. Accepts `cause = err;` first.
#[macro_export]
macro_rules! ll_w {
    ($($arg:tt)+) => { $crate::__ll_log!($crate::Level::WARN, $($arg)+) };
}

/// Logs at error level with a call-site tag. Accepts `cause = err;` first.
#[macro_export]
macro_rules! ll_e {
    ($($arg:tt)+) => { $crate::__ll_log!($crate::Level::ERROR, $($arg)+) };
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;
    use tracing::{
        field::{Field, Visit},
        level_filters::LevelFilter,
        Event, Subscriber,
    };
    use tracing_subscriber::{layer::Context, prelude::*, Layer};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Captured {
        level: Level,
        target: String,
        tag: Option<String>,
        message: String,
        cause: Option<String>,
    }

    #[derive(Default)]
    struct Fields {
        tag: Option<String>,
        message: String,
        cause: Option<String>,
    }

    impl Visit for Fields {
        fn record_str(&mut self, field: &Field, value: &str) {
            match field.name() {
                "tag" => self.tag = Some(value.to_string()),
                "cause" => self.cause = Some(value.to_string()),
                _ => {}
            }
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.message = format!("{value:?}");
            }
        }
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<Captured>>>);

    impl Capture {
        fn events(&self) -> Vec<Captured> {
            self.0.lock().expect("capture lock").clone()
        }
    }

    impl<S: Subscriber> Layer<S> for Capture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = Fields::default();
            event.record(&mut fields);
            self.0.lock().expect("capture lock").push(Captured {
                level: *event.metadata().level(),
                target: event.metadata().target().to_string(),
                tag: fields.tag,
                message: fields.message,
                cause: fields.cause,
            });
        }
    }

    fn captured(max_level: Level, emit: impl FnOnce()) -> Vec<Captured> {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::registry()
            .with(capture.clone().with_filter(LevelFilter::from_level(max_level)));
        tracing::subscriber::with_default(subscriber, emit);
        capture.events()
    }

    #[test]
    fn macro_tags_with_enclosing_function() {
        let events = captured(Level::TRACE, || ll_e!("Hello log"));

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.level, Level::ERROR);
        assert_eq!(event.target, TARGET);
        assert_eq!(
            event.tag.as_deref(),
            Some("tests$macro_tags_with_enclosing_function")
        );
        assert!(event.message.starts_with("Hello log--->(lib.rs:"));
        assert!(event.message.ends_with(')'));
        assert_eq!(event.cause, None);
    }

    #[test]
    fn macro_inside_closure_uses_outer_function() {
        let events = captured(Level::TRACE, || {
            let emit = || ll_i!("from closure {}", 1);
            emit();
        });
        assert_eq!(
            events[0].tag.as_deref(),
            Some("tests$macro_inside_closure_uses_outer_function")
        );
        assert!(events[0].message.starts_with("from closure 1--->"));
    }

    #[test]
    fn cause_is_attached() {
        let events = captured(Level::TRACE, || {
            let err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
            ll_w!(cause = err; "could not load {}", "prefs");
        });

        let event = &events[0];
        assert_eq!(event.level, Level::WARN);
        assert!(event.message.starts_with("could not load prefs"));
        assert_eq!(event.cause.as_deref(), Some("missing file"));
    }

    #[test]
    fn subscriber_level_filters_events() {
        let events = captured(Level::WARN, || {
            ll_d!("hidden");
            info("hidden too");
            warn("shown");
        });
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::WARN);
        assert!(events[0].message.starts_with("shown--->(lib.rs:"));
    }

    #[test]
    fn track_caller_functions_tag_with_file() {
        let events = captured(Level::TRACE, || error_with(&std::fmt::Error, "formatting broke"));
        let event = &events[0];
        assert_eq!(event.tag.as_deref(), Some("lib"));
        assert!(event.message.starts_with("formatting broke--->(lib.rs:"));
        assert_eq!(
            event.cause.as_deref(),
            Some("an error occurred when formatting an argument")
        );
    }

    #[test]
    fn untagged_events_keep_the_plain_message() {
        let events = captured(Level::TRACE, || {
            log_at(Level::DEBUG, None, format_args!("plain {}", 2), None);
            log_at(
                Level::TRACE,
                Some(Source::new("home$load".to_string(), None)),
                format_args!("no line"),
                None,
            );
        });
        assert_eq!(events[0].tag, None);
        assert_eq!(events[0].message, "plain 2");
        assert_eq!(events[1].level, Level::TRACE);
        assert_eq!(events[1].tag.as_deref(), Some("home$load"));
        assert_eq!(events[1].message, "no line");
    }
}
