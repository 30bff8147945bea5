//! Show or hide the minify button.
//!
//! The visibility is computed from scratch on every event, from the
//! configuration and the active document only.

use crate::{
    config::{EffectiveConfig, HideButton},
    detect::MinifiedDetector,
    document::Document,
    host::StatusAffordance,
};

/// Visibility of the minify button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// The button is visible.
    Shown,
    /// The button is hidden.
    Hidden,
}

impl Visibility {
    /// Return the visibility at startup, before any document is looked at.
    pub fn initial(config: &EffectiveConfig) -> Self {
        match config.hide_button {
            HideButton::Never => Self::Shown,
            HideButton::Always | HideButton::Auto => Self::Hidden,
        }
    }

    /// Return `true` if the button is visible.
    pub fn is_shown(self) -> bool {
        self == Self::Shown
    }
}

/// Compute the visibility of the button for the active document.
pub fn decide(
    config: &EffectiveConfig,
    active: Option<&Document>,
    detector: &dyn MinifiedDetector,
) -> Visibility {
    match config.hide_button {
        HideButton::Never => Visibility::Shown,
        HideButton::Always => Visibility::Hidden,
        HideButton::Auto => match active {
            Some(document)
                if document.language().is_some() && !detector.is_minified(document) =>
            {
                Visibility::Shown
            },
            _ => Visibility::Hidden,
        },
    }
}

/// Drive a [`StatusAffordance`].
///
/// The affordance is created hidden, and is only told about changes.
pub struct StatusButton {
    affordance: Box<dyn StatusAffordance>,
    state: Visibility,
}

impl StatusButton {
    /// Wrap a hidden affordance.
    pub fn new(affordance: impl StatusAffordance + 'static) -> Self {
        Self {
            affordance: Box::new(affordance),
            state: Visibility::Hidden,
        }
    }

    /// Return the current visibility.
    pub fn state(&self) -> Visibility {
        self.state
    }

    /// Show or hide the button.
    pub fn apply(&mut self, visibility: Visibility) {
        if visibility == self.state {
            return;
        }

        match visibility {
            Visibility::Shown => self.affordance.show(),
            Visibility::Hidden => self.affordance.hide(),
        }

        self.state = visibility;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{decide, StatusButton, Visibility};
    use crate::{
        config::{EffectiveConfig, HideButton},
        detect::Heuristic,
        document::Document,
        host::StatusAffordance,
        output_path::OutputTemplate,
    };

    /// Record calls to `show` and `hide`.
    #[derive(Clone, Default)]
    struct Button(Arc<Mutex<Vec<&'static str>>>);

    impl Button {
        fn calls(&self) -> Vec<&'static str> {
            self.0.lock().unwrap().clone()
        }
    }

    impl StatusAffordance for Button {
        fn show(&self) {
            self.0.lock().unwrap().push("show");
        }

        fn hide(&self) {
            self.0.lock().unwrap().push("hide");
        }
    }

    fn config(hide_button: HideButton) -> EffectiveConfig {
        EffectiveConfig {
            hide_button,
            ..Default::default()
        }
    }

    #[test]
    fn initial() {
        const CASES: [(HideButton, Visibility); 3] = [
            (HideButton::Never, Visibility::Shown),
            (HideButton::Always, Visibility::Hidden),
            (HideButton::Auto, Visibility::Hidden),
        ];

        for (input, expected) in CASES {
            let result = Visibility::initial(&config(input));
            assert_eq!(
                result, expected,
                "\ninitial({input:?}) expected {expected:?} but received {result:?}"
            );
        }
    }

    #[test]
    fn decisions() {
        let template = OutputTemplate::default();
        let detector = Heuristic::new(&template);

        let source = Document::new("app.js", "javascript", "function foo() {\n  return 1;\n}\n");
        let minified = Document::new("app.js", "javascript", "x=1;".repeat(300));
        let named = Document::new("app.min.js", "javascript", "a()");
        let text = Document::new("notes.txt", "plaintext", "hello");

        let cases = [
            (HideButton::Never, None, Visibility::Shown),
            (HideButton::Never, Some(&minified), Visibility::Shown),
            (HideButton::Always, Some(&source), Visibility::Hidden),
            (HideButton::Auto, Some(&source), Visibility::Shown),
            (HideButton::Auto, Some(&minified), Visibility::Hidden),
            (HideButton::Auto, Some(&named), Visibility::Hidden),
            (HideButton::Auto, Some(&text), Visibility::Hidden),
            (HideButton::Auto, None, Visibility::Hidden),
        ];

        for (hide_button, active, expected) in cases {
            let result = decide(&config(hide_button), active, &detector);
            assert_eq!(
                result,
                expected,
                "\n{hide_button:?} with {:?} expected {expected:?} but received {result:?}",
                active.map(|document| &document.path)
            );
        }
    }

    #[test]
    fn signature_removed() {
        let template = OutputTemplate::default();
        let detector = Heuristic::new(&template);
        let config = config(HideButton::Auto);

        let content = "x=1;".repeat(300);
        let minified = Document::new("app.js", "javascript", content.clone());
        let formatted = Document::new("app.js", "javascript", content.replace(';', ";\n"));

        assert_eq!(decide(&config, Some(&minified), &detector), Visibility::Hidden);
        assert_eq!(decide(&config, Some(&formatted), &detector), Visibility::Shown);
    }

    #[test]
    fn button_only_applies_changes() {
        let button = Button::default();
        let mut status = StatusButton::new(button.clone());

        status.apply(Visibility::Hidden);
        status.apply(Visibility::Shown);
        status.apply(Visibility::Shown);
        status.apply(Visibility::Hidden);

        assert_eq!(button.calls(), vec!["show", "hide"]);
        assert_eq!(status.state(), Visibility::Hidden);
    }
}
