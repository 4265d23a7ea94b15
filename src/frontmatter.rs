//! Front matter extraction.
//!
//! A markdown document may open with a YAML block fenced by boundary lines:
//!
//! ```text
//! ---
//! title: A title
//! category: Programming
//! tags: [c, python]
//! ---
//! Body text starts here.
//! ```
//!
//! Extraction is a pure function of its input: every call returns both the
//! remaining body and the parsed mapping, so nothing from one document can
//! leak into the next.
//!
//! ## Rules
//!
//! - The block only counts when the very first line is exactly [`BOUNDARY`].
//!   Anything else means "no front matter" and the input is returned untouched.
//! - The block ends at the next line exactly equal to [`BOUNDARY`]. Neither
//!   boundary line is part of the block or of the body.
//! - An unterminated block swallows the rest of the document; the body is empty.
//! - An empty or whitespace-only block is an empty mapping.

use serde_yaml_ng::{Mapping, Value};
use thiserror::Error;

/// Line that opens and closes a front matter block.
pub const BOUNDARY: &str = "---";

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("front matter is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
    #[error("front matter must be a mapping of keys to values, found {0}")]
    NotAMapping(&'static str),
}

/// Split a sequence of lines into (body lines, metadata).
///
/// Body lines are borrowed from the input; the metadata is parsed from the
/// lines between the boundaries.
pub fn extract<'a>(lines: &[&'a str]) -> Result<(Vec<&'a str>, Mapping), FrontMatterError> {
    match lines.first() {
        Some(&first) if first == BOUNDARY => {}
        _ => return Ok((lines.to_vec(), Mapping::new())),
    }

    let rest = &lines[1..];
    let (block, body) = match rest.iter().position(|line| *line == BOUNDARY) {
        Some(end) => (&rest[..end], &rest[end + 1..]),
        None => (rest, &rest[rest.len()..]),
    };

    let metadata = parse_block(&block.join("\n"))?;
    Ok((body.to_vec(), metadata))
}

/// Split a whole document into (body text, metadata).
///
/// Lines are rejoined with `\n`, which also normalizes `\r\n` endings.
pub fn split(document: &str) -> Result<(String, Mapping), FrontMatterError> {
    let lines: Vec<&str> = document.lines().collect();
    let (body, metadata) = extract(&lines)?;
    Ok((body.join("\n"), metadata))
}

fn parse_block(block: &str) -> Result<Mapping, FrontMatterError> {
    if block.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match serde_yaml_ng::from_str::<Value>(block)? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        other => Err(FrontMatterError::NotAMapping(value_kind(&other))),
    }
}

/// Human-readable name of a YAML value's type, for error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str) -> Value {
        Value::String(k.to_string())
    }

    #[test]
    fn no_front_matter_returns_input_unchanged() {
        let lines = ["body text", "---", "more"];
        let (body, metadata) = extract(&lines).unwrap();
        assert_eq!(body, lines.to_vec());
        assert!(metadata.is_empty());
    }

    #[test]
    fn empty_input_has_no_front_matter() {
        let (body, metadata) = extract(&[]).unwrap();
        assert!(body.is_empty());
        assert!(metadata.is_empty());
    }

    #[test]
    fn boundary_must_match_exactly() {
        let lines = ["--- ", "title: x", "---", "body"];
        let (body, metadata) = extract(&lines).unwrap();
        assert_eq!(body.len(), 4);
        assert!(metadata.is_empty());
    }

    #[test]
    fn extracts_nested_metadata_and_body() {
        let lines = [
            "---",
            "extends: 'post.html'",
            "title: 'A title'",
            "category: Programming",
            "tags: ['c', 'python']",
            "external_links:",
            "    - title: 'An external link'",
            "      link: https://github.com/mwhamgenomics",
            "---",
            "body text",
        ];
        let (body, metadata) = extract(&lines).unwrap();

        assert_eq!(body, vec!["body text"]);
        assert_eq!(metadata.len(), 5);
        assert_eq!(metadata["extends"], key("post.html"));
        assert_eq!(metadata["category"], key("Programming"));
        assert_eq!(
            metadata["tags"],
            Value::Sequence(vec![key("c"), key("python")])
        );

        let links = metadata["external_links"].as_sequence().unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(
            links[0]["link"],
            key("https://github.com/mwhamgenomics")
        );
    }

    #[test]
    fn body_is_everything_after_closing_boundary() {
        let lines = ["---", "a: 1", "---", "", "---", "second"];
        let (body, _) = extract(&lines).unwrap();
        assert_eq!(body, vec!["", "---", "second"]);
    }

    #[test]
    fn unterminated_block_consumes_everything() {
        let lines = ["---", "title: x", "category: y"];
        let (body, metadata) = extract(&lines).unwrap();
        assert!(body.is_empty());
        assert_eq!(metadata.len(), 2);
    }

    #[test]
    fn empty_block_is_empty_mapping() {
        let (body, metadata) = extract(&["---", "---", "body"]).unwrap();
        assert_eq!(body, vec!["body"]);
        assert!(metadata.is_empty());

        let (_, metadata) = extract(&["---", "   ", "", "---"]).unwrap();
        assert!(metadata.is_empty());
    }

    #[test]
    fn comment_only_block_is_empty_mapping() {
        let (_, metadata) = extract(&["---", "# nothing yet", "---"]).unwrap();
        assert!(metadata.is_empty());
    }

    #[test]
    fn scalar_block_is_rejected() {
        let result = extract(&["---", "just a string", "---"]);
        assert!(matches!(result, Err(FrontMatterError::NotAMapping("a string"))));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = extract(&["---", "title: [unclosed", "---"]);
        assert!(matches!(result, Err(FrontMatterError::Yaml(_))));
    }

    #[test]
    fn reserialized_metadata_parses_to_the_same_mapping() {
        let lines = [
            "---",
            "title: Round trip",
            "tags: [a, b]",
            "nested:",
            "  depth: 2",
            "  items: [1, 2.5, true]",
            "---",
        ];
        let (_, metadata) = extract(&lines).unwrap();

        let yaml = serde_yaml_ng::to_string(&metadata).unwrap();
        let mut doc = vec![BOUNDARY];
        doc.extend(yaml.lines());
        doc.push(BOUNDARY);
        let (_, reparsed) = extract(&doc).unwrap();

        assert_eq!(reparsed, metadata);
    }

    #[test]
    fn split_joins_body_lines() {
        let (body, metadata) = split("---\r\ntitle: x\r\n---\r\nline one\r\nline two\r\n").unwrap();
        assert_eq!(body, "line one\nline two");
        assert_eq!(metadata["title"], key("x"));
    }
}
