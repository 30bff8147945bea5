//! Tell whether a document is already minified.
//!
//! Detection is a heuristic: it may be wrong, but the same document always
//! gets the same answer.

use std::path::Path;

use crate::{
    document::{Document, Language},
    output_path::OutputTemplate,
};

/// Lines at least this long are typical of minified files.
const LONG_LINE: usize = 500;

/// Mean line length above which a file is considered minified.
const MEAN_LINE: usize = 200;

/// Classify documents as minified or not.
pub trait MinifiedDetector {
    /// Return `true` if the document looks minified.
    fn is_minified(&self, document: &Document) -> bool;
}

impl<F> MinifiedDetector for F
where
    F: Fn(&Document) -> bool,
{
    fn is_minified(&self, document: &Document) -> bool {
        (self)(document)
    }
}

/// Default detector.
///
/// A document is minified if its file name carries the output postfix (e.g.
/// `app.min.js`), or if its content has at least one very long line and a
/// high mean line length. Empty documents are not minified.
#[derive(Debug, Clone, Copy)]
pub struct Heuristic<'a> {
    template: &'a OutputTemplate,
}

impl<'a> Heuristic<'a> {
    /// Create a detector recognizing the postfixes of `template`.
    pub fn new(template: &'a OutputTemplate) -> Self {
        Self { template }
    }

    /// Return `true` if the file stem ends with the postfix of its language.
    pub fn has_marker(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let postfix = self
            .template
            .postfix_for(Language::from_path(path));

        path.file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.strip_suffix(postfix))
            .is_some_and(|rest| rest.len() > 1 && rest.ends_with('.'))
    }
}

impl MinifiedDetector for Heuristic<'_> {
    fn is_minified(&self, document: &Document) -> bool {
        self.has_marker(&document.path) || looks_minified(&document.content)
    }
}

/// Inspect line lengths of a text.
fn looks_minified(content: &str) -> bool {
    let content = content.trim_end();

    if content.is_empty() {
        return false;
    }

    let (count, longest) = content
        .lines()
        .fold((0, 0), |(count, longest), line| {
            (count + 1, longest.max(line.chars().count()))
        });

    let mean = content.chars().count() / count;

    longest >= LONG_LINE && mean > MEAN_LINE
}

#[cfg(test)]
mod tests {
    use super::{Heuristic, MinifiedDetector};
    use crate::{
    document::{Document, Language},
    output_path::OutputTemplate,
};

    #[test]
    fn marker() {
        const CASES: [(&str, bool); 8] = [
            ("app.min.js", true),
            ("dist/style.min.css", true),
            ("data.min.json", true),
            ("app.js", false),
            ("min.js", false),
            (".min.js", false),
            ("admin.js", false),
            ("app.minified.js", false),
        ];

        let template = OutputTemplate::default();
        let detector = Heuristic::new(&template);

        for (input, expected) in CASES {
            let result = detector.has_marker(input);
            assert_eq!(
                result, expected,
                "\nhas_marker({input:?}) expected {expected:?} but received {result:?}"
            );
        }
    }

    #[test]
    fn marker_language_postfix() {
        let template = OutputTemplate {
            css_postfix: Some("tiny".to_owned()),
            ..Default::default()
        };
        let detector = Heuristic::new(&template);

        assert!(detector.has_marker("style.tiny.css"));
        assert!(!detector.has_marker("style.min.css"));
        assert!(detector.has_marker("app.min.js"));
    }

    #[test]
    fn content() {
        let template = OutputTemplate::default();
        let detector = Heuristic::new(&template);

        let minified = format!("var a=1;{}", "a+=1;".repeat(200));
        let formatted = "function foo() {\n  return 1;\n}\n".repeat(50);
        // One long line among many short ones
        let mixed = format!("{}{}\n", "// short\n".repeat(100), "x".repeat(600));

        const CASES: [(&str, bool); 2] = [("", false), ("\n\n\n", false)];

        for (input, expected) in CASES {
            let document = Document::new("app.js", "javascript", input);
            assert_eq!(detector.is_minified(&document), expected, "{input:?}");
        }

        assert!(detector.is_minified(&Document::new("app.js", "javascript", minified.clone())));
        assert!(!detector.is_minified(&Document::new("app.js", "javascript", formatted)));
        assert!(!detector.is_minified(&Document::new("app.js", "javascript", mixed)));

        // Removing the minified signature changes the classification
        let reformatted = minified.replace(';', ";\n");
        assert!(!detector.is_minified(&Document::new("app.js", "javascript", reformatted)));
    }

    #[test]
    fn closure() {
        let detector = |document: &Document| document.content.starts_with("/*min*/");

        assert!(detector.is_minified(&Document::new("a.js", "javascript", "/*min*/a()")));
        assert!(!detector.is_minified(&Document::new("a.js", "javascript", "a()")));
    }
}
