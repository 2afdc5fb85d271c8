//! Diagram text repair.
//!
//! LLM responses (and occasionally user-supplied diagram text) arrive in all
//! kinds of broken shapes: wrapped in Markdown code fences, containing
//! several concatenated documents, or missing markers entirely. This module
//! canonicalizes any input into a single well-formed document with exactly
//! one `@startuml` first line and one `@enduml` last line.
//!
//! `normalize` is idempotent: running it twice yields the same output as
//! running it once. There is no unrepairable input; an empty string degrades
//! to `@startuml\n\n@enduml`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Opening marker of a PlantUML document.
pub const START_MARKER: &str = "@startuml";

/// Closing marker of a PlantUML document.
pub const END_MARKER: &str = "@enduml";

// The opener may also be the very last line of the input, with no newline
// after it, so the pattern accepts end-of-input as the terminator.
static FENCE_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^```(?:plantuml)?(?:\n|$)").expect("fence-open pattern must compile")
});

static FENCE_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)```$").expect("fence-close pattern must compile"));

// An end marker immediately followed by a start marker means the model glued
// several documents together; the pair is collapsed into a single body.
static GLUED_DOCUMENTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@enduml\s*@startuml").expect("glued-documents pattern must compile"));

/// Repair arbitrary diagram text into a single well-formed PlantUML document.
///
/// Order matters: fences are stripped first so that marker tokens inside
/// them become visible to the later steps, then glued documents are merged,
/// then every marker occurrence is removed and a single pair is re-applied
/// around the trimmed body.
pub fn normalize(text: &str) -> String {
    let text = FENCE_OPEN.replace_all(text, "");
    let text = FENCE_CLOSE.replace_all(&text, "");
    let text = GLUED_DOCUMENTS.replace_all(&text, "\n");

    let body = text.replace(START_MARKER, "").replace(END_MARKER, "");
    let body = body.trim();

    format!("{START_MARKER}\n{body}\n{END_MARKER}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(document: &str) {
        assert!(document.starts_with("@startuml\n"));
        assert!(document.ends_with("\n@enduml"));
        assert_eq!(document.matches(START_MARKER).count(), 1);
        assert_eq!(document.matches(END_MARKER).count(), 1);
    }

    #[test]
    fn test_empty_input_degrades_to_empty_document() {
        assert_eq!(normalize(""), "@startuml\n\n@enduml");
    }

    #[test]
    fn test_already_valid_document_is_unchanged() {
        let input = "@startuml\nclass Foo\n@enduml";
        assert_eq!(normalize(input), input);
    }

    #[test]
    fn test_missing_markers_are_added() {
        let output = normalize("class Foo\nclass Bar");
        assert_eq!(output, "@startuml\nclass Foo\nclass Bar\n@enduml");
    }

    #[test]
    fn test_code_fences_are_stripped() {
        let output = normalize("```plantuml\n@startuml\nX\n@enduml\n```");
        assert!(!output.contains('`'));
        assert!(output.contains('X'));
        assert_well_formed(&output);
    }

    #[test]
    fn test_bare_code_fence_is_stripped() {
        let output = normalize("```\n@startuml\nX\n@enduml\n```");
        assert!(!output.contains('`'));
        assert_well_formed(&output);
    }

    #[test]
    fn test_fence_opener_on_last_line_is_stripped() {
        // A truncated response can end mid-fence, with no trailing newline.
        let output = normalize("x\n```plantuml");
        assert_eq!(output, "@startuml\nx\n@enduml");
    }

    #[test]
    fn test_glued_documents_are_merged() {
        let output = normalize("@startuml\nA\n@enduml\n@startuml\nB\n@enduml");
        assert_well_formed(&output);
        assert!(output.contains('A'));
        assert!(output.contains('B'));
    }

    #[test]
    fn test_duplicate_start_markers_are_collapsed() {
        let output = normalize("@startuml\n@startuml\nA\n@enduml");
        assert_well_formed(&output);
        assert!(output.contains('A'));
    }

    #[test]
    fn test_trailing_whitespace_is_trimmed() {
        let output = normalize("@startuml\nA\n\n\n@enduml\n\n");
        assert_eq!(output, "@startuml\nA\n@enduml");
    }

    #[test]
    fn test_idempotence() {
        let inputs = [
            "",
            "plain text",
            "@startuml\nA\n@enduml",
            "@startuml\nA\n@enduml\n@startuml\nB\n@enduml",
            "```plantuml\n@startuml\nX\n@enduml\n```",
            "  \n@enduml\nstray\n@startuml\n",
            "no markers at all\njust lines",
            "x\n```plantuml",
            "```",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_markers_in_any_order_are_repaired() {
        let output = normalize("@enduml\nbody\n@startuml");
        assert_well_formed(&output);
        assert!(output.contains("body"));
    }
}
