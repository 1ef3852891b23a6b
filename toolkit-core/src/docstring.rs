//! Google-style docstring parsing for per-parameter descriptions.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::parameters::TypeCategory;

static SECTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:Args|Arguments|Parameters|Params|Keyword Args|Keyword Arguments):\s*$")
        .expect("section header pattern is valid")
});

static ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\*{0,2}(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*(?:\((?P<type>[^)]*)\))?\s*:\s*(?P<text>.*)$")
        .expect("entry pattern is valid")
});

/// A single documented parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDoc {
    pub name: String,
    pub type_name: Option<String>,
    pub description: String,
}

/// Parsed documentation text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Docstring {
    /// First paragraph of the text.
    pub summary: Option<String>,
    pub params: Vec<ParamDoc>,
}

impl Docstring {
    /// Parse documentation text. Never fails; unrecognized layouts yield no
    /// parameter entries.
    pub fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        Self {
            summary: summary(&lines),
            params: parse_params(&lines),
        }
    }

    /// Look up a parameter description by exact name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.description.as_str())
    }
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn summary(lines: &[&str]) -> Option<String> {
    let paragraph: Vec<&str> = lines
        .iter()
        .map(|l| l.trim())
        .skip_while(|l| l.is_empty())
        .take_while(|l| !l.is_empty() && !SECTION_HEADER.is_match(l))
        .collect();
    if paragraph.is_empty() {
        None
    } else {
        Some(paragraph.join(" "))
    }
}

struct Pending {
    name: String,
    type_name: Option<String>,
    head: String,
    continuation: Vec<String>,
}

impl Pending {
    fn finish(self) -> ParamDoc {
        let Pending {
            name,
            mut type_name,
            head,
            continuation,
        } = self;

        // `name: type` with the description on the following lines
        let head_is_type = type_name.is_none()
            && !continuation.is_empty()
            && !head.contains(char::is_whitespace)
            && TypeCategory::from_declared(&head) != TypeCategory::Unknown;
        let mut parts = Vec::with_capacity(continuation.len() + 1);
        if head_is_type {
            type_name = Some(head);
        } else if !head.is_empty() {
            parts.push(head);
        }
        parts.extend(continuation);

        ParamDoc {
            name,
            type_name,
            description: parts.join(" "),
        }
    }
}

fn parse_params(lines: &[&str]) -> Vec<ParamDoc> {
    let mut params = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        i += 1;
        if !SECTION_HEADER.is_match(line.trim()) {
            continue;
        }

        let header_indent = indent_of(line);
        let mut entry_indent: Option<usize> = None;
        let mut current: Option<Pending> = None;

        while i < lines.len() {
            let line = lines[i];
            let trimmed = line.trim();
            if trimmed.is_empty() {
                i += 1;
                continue;
            }
            let indent = indent_of(line);
            if indent <= header_indent {
                break;
            }
            i += 1;

            let level = *entry_indent.get_or_insert(indent);
            let entry = (indent <= level).then(|| ENTRY.captures(trimmed)).flatten();
            match entry {
                Some(caps) => {
                    if let Some(done) = current.take() {
                        params.push(done.finish());
                    }
                    current = Some(Pending {
                        name: caps["name"].to_string(),
                        type_name: caps.name("type").map(|m| m.as_str().trim().to_string()),
                        head: caps["text"].trim().to_string(),
                        continuation: Vec::new(),
                    });
                }
                None => {
                    if let Some(pending) = current.as_mut() {
                        pending.continuation.push(trimmed.to_string());
                    }
                }
            }
        }

        if let Some(done) = current.take() {
            params.push(done.finish());
        }
    }

    params
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const GOOGLE_DOC: &str = "
        search_google(query, _config)

        Performs a Google search query using the provided configuration and returns
        the organic search results.

        Args:
            query (str): The search query string.
            _config (dict): Configuration dictionary containing parameters for the
                search such as the number of results.

        Returns:
            list: A list of dictionaries containing the organic search results.
    ";

    const TYPE_ON_HEAD_DOC: &str = "Search for YouTube videos.

Args:
    query: str
        The search query to use for fetching YouTube results.
    _config: dict
        A configuration dictionary.

Returns:
    list | dict
";

    #[test]
    fn test_google_style_entries() {
        let doc = Docstring::parse(GOOGLE_DOC);
        assert_eq!(doc.summary.as_deref(), Some("search_google(query, _config)"));
        assert_eq!(doc.params.len(), 2);
        assert_eq!(
            doc.params[0],
            ParamDoc {
                name: "query".into(),
                type_name: Some("str".into()),
                description: "The search query string.".into(),
            }
        );
        assert_eq!(
            doc.param("_config"),
            Some(
                "Configuration dictionary containing parameters for the search such as the number of results."
            )
        );
    }

    #[test]
    fn test_type_on_entry_line() {
        let doc = Docstring::parse(TYPE_ON_HEAD_DOC);
        assert_eq!(doc.params.len(), 2);
        assert_eq!(doc.params[0].type_name.as_deref(), Some("str"));
        assert_eq!(
            doc.param("query"),
            Some("The search query to use for fetching YouTube results.")
        );
        // Returns section is not mistaken for a parameter
        assert!(doc.param("list").is_none());
    }

    #[test]
    fn test_single_word_head_stays_in_description() {
        let doc = Docstring::parse("Args:\n    query: Free-form\n        text to search for.\n");
        assert_eq!(doc.param("query"), Some("Free-form text to search for."));
        assert_eq!(doc.params[0].type_name, None);
    }

    #[test]
    fn test_malformed_documentation_degrades() {
        assert_eq!(Docstring::parse("").params, vec![]);
        assert_eq!(Docstring::parse("Args:").params, vec![]);
        let doc = Docstring::parse("Args:\n  ???\n  query: the query");
        assert_eq!(doc.params.len(), 1);
        assert_eq!(doc.param("query"), Some("the query"));
        assert_eq!(doc.param("missing"), None);
        assert_eq!(Docstring::parse("just text").summary.as_deref(), Some("just text"));
    }
}
