//! Small helpers shared by the components.

/// Default duration of [`ButtonColors::animate_enabled`] transitions.
pub const DEFAULT_ANIMATION_MS: u32 = 100;

/// Applies `block` to `value` only when `condition` holds.
pub fn check<T>(value: T, condition: bool, block: impl FnOnce(T) -> T) -> T {
    if condition {
        block(value)
    } else {
        value
    }
}

/// Container and content colours of a button in both states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonColors {
    /// Background while enabled.
    pub container: String,
    /// Foreground while enabled.
    pub content: String,
    /// Background while disabled.
    pub disabled_container: String,
    /// Foreground while disabled.
    pub disabled_content: String,
    /// Linear background transition, in milliseconds.
    pub transition_ms: Option<u32>,
}

impl ButtonColors {
    /// Colours whose background eases linearly to the state's container
    /// colour over `duration_ms`.
    ///
    /// Both container colours are set to the target so the button keeps the
    /// animated colour whichever state it renders in.
    pub fn animate_enabled(&self, enabled: bool, duration_ms: u32) -> Self {
        let target = if enabled {
            self.container.clone()
        } else {
            self.disabled_container.clone()
        };
        Self {
            container: target.clone(),
            disabled_container: target,
            transition_ms: Some(duration_ms),
            ..self.clone()
        }
    }

    /// Inline style for a button in the given state.
    pub fn style(&self, enabled: bool) -> String {
        let (background, color) = if enabled {
            (&self.container, &self.content)
        } else {
            (&self.disabled_container, &self.disabled_content)
        };
        let mut style = format!("background-color: {background}; color: {color};");
        if let Some(ms) = self.transition_ms {
            style.push_str(&format!(" transition: background-color {ms}ms linear;"));
        }
        style
    }
}

pub(crate) fn merge_layout_class(base: &'static str, layout_class: Option<&'static str>) -> String {
    match layout_class {
        Some(layout_class) if !layout_class.is_empty() => format!("{base} {layout_class}"),
        _ => base.to_string(),
    }
}

pub(crate) fn bool_token(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
