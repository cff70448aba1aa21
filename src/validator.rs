//! Required-parameter validation for planner-proposed actions.

use tracing::warn;

use crate::types::{Action, ActionKind};

/// Check that an action carries the parameters its kind requires.
///
/// `navigate` needs a `url`; `type` needs both `selector` and `text`
/// (an empty `text` is a valid value, absence is not). `click` is
/// accepted with neither `selector` nor `text` here; the executor
/// resolves or rejects it. The remaining kinds only have optional
/// parameters with defaults.
///
/// Invalid actions are reported purely as `false`; the missing parameter
/// is logged as a warning and nothing else happens.
pub fn validate(action: &Action) -> bool {
    let missing = match action.kind {
        ActionKind::Navigate => {
            if action.params.url.is_none() {
                Some("url")
            } else {
                None
            }
        }
        ActionKind::Type => {
            if action.params.selector.is_none() {
                Some("selector")
            } else if action.params.text.is_none() {
                Some("text")
            } else {
                None
            }
        }
        ActionKind::Click
        | ActionKind::Scroll
        | ActionKind::Wait
        | ActionKind::Extract
        | ActionKind::Complete => None,
    };

    match missing {
        Some(param) => {
            warn!(kind = ?action.kind, param, "action is missing a required parameter");
            false
        }
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionParams;

    fn action(kind: ActionKind, params: ActionParams) -> Action {
        Action { kind, params }
    }

    #[test]
    fn navigate_requires_url() {
        assert!(!validate(&action(ActionKind::Navigate, ActionParams::default())));
        assert!(validate(&action(
            ActionKind::Navigate,
            ActionParams {
                url: Some("example.com".to_string()),
                ..Default::default()
            }
        )));
    }

    #[test]
    fn type_requires_selector_and_text() {
        assert!(!validate(&action(ActionKind::Type, ActionParams::default())));
        assert!(!validate(&action(
            ActionKind::Type,
            ActionParams {
                selector: Some("#q".to_string()),
                ..Default::default()
            }
        )));
        // Empty string is a valid text value.
        assert!(validate(&action(
            ActionKind::Type,
            ActionParams {
                selector: Some("#q".to_string()),
                text: Some(String::new()),
                ..Default::default()
            }
        )));
    }

    #[test]
    fn click_without_target_passes_validation() {
        // Target resolution is the executor's job.
        assert!(validate(&action(ActionKind::Click, ActionParams::default())));
    }

    #[test]
    fn parameterless_kinds_are_valid() {
        for kind in [
            ActionKind::Scroll,
            ActionKind::Wait,
            ActionKind::Extract,
            ActionKind::Complete,
        ] {
            assert!(validate(&action(kind, ActionParams::default())));
        }
    }
}
