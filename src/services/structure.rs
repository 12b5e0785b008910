//! Line-oriented block heuristics.
//!
//! A block declaration is a line starting with `class`, `def`, `function`
//! or `interface`, followed by whitespace and an identifier. No grammar is parsed.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use crate::domain::models::Section;

static DECLARATION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:class|def|function|interface)\s+\w").expect("valid declaration regex")
});

static SECTION_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(class|def|function|interface)\s+(\w+)").expect("valid section regex")
});

static NEXT_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:class|def|function|interface)\s").expect("valid boundary regex")
});

/// Whether `line` opens a block. Leading whitespace is not skipped.
pub fn is_declaration(line: &str) -> bool {
    DECLARATION_LINE.is_match(line)
}

/// Every named block declared in `content`, in order of appearance
pub fn find_sections(content: &str) -> Vec<Section> {
    SECTION_DECLARATION
        .captures_iter(content)
        .map(|caps| {
            let kind = caps[1].to_string();
            let name = caps[2].to_string();
            let pattern = format!(
                r"(?m)^{}\s+{}\b",
                regex::escape(&kind),
                regex::escape(&name)
            );
            Section {
                kind,
                name,
                pattern,
            }
        })
        .collect()
}

/// Byte range of `section` in `text`: from its declaration up to, but not
/// including, the newline before the next block declaration (or to the end
/// of `text`).
pub fn section_span(text: &str, section: &Section) -> Result<Option<Range<usize>>, regex::Error> {
    let locator = Regex::new(&section.pattern)?;
    let Some(declaration) = locator.find(text) else {
        return Ok(None);
    };

    let end = NEXT_DECLARATION
        .find_at(text, declaration.end())
        .map_or(text.len(), |next| next.start() - 1);

    Ok(Some(declaration.start()..end))
}
