//! Tree/query capability over parsed HTML.
//!
//! Extraction code only needs a handful of operations on a document: walk
//! child elements, read an attribute, read text, and match simple selectors.
//! [`Node`] captures exactly that, so parsers can run against a real
//! [`html_scraper`] tree or a synthetic one built directly in tests.

use html_scraper::ElementRef;

/// A simple element selector: `tag`, `#id`, `.class`, or a compound such as
/// `table.table-course-days` or `select#form-search-subject`.
///
/// Combinators (descendant, child, sibling) are expressed with the
/// traversal methods on [`Node`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Query {
    pub fn parse(selector: &str) -> Self {
        let mut query = Query {
            tag: None,
            id: None,
            classes: Vec::new(),
        };

        let selector = selector.trim();
        let tag_end = selector.find(['#', '.']).unwrap_or(selector.len());
        if tag_end > 0 {
            query.tag = Some(selector[..tag_end].to_ascii_lowercase());
        }

        let mut rest = &selector[tag_end..];
        while let Some(marker) = rest.chars().next() {
            let body = &rest[marker.len_utf8()..];
            let end = body.find(['#', '.']).unwrap_or(body.len());
            let name = &body[..end];
            if !name.is_empty() {
                if marker == '#' {
                    query.id = Some(name.to_string());
                } else {
                    query.classes.push(name.to_string());
                }
            }
            rest = &body[end..];
        }

        query
    }

    pub fn matches<N: Node>(&self, node: &N) -> bool {
        if let Some(tag) = &self.tag
            && !node.tag_name().eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if let Some(id) = &self.id
            && node.attribute("id") != Some(id.as_str())
        {
            return false;
        }
        self.classes.iter().all(|class| node.has_class(class))
    }
}

/// Read-only access to an element in a parsed document.
pub trait Node: Clone + Sized {
    /// Lowercase element name, e.g. `"td"`.
    fn tag_name(&self) -> &str;

    fn attribute(&self, name: &str) -> Option<&str>;

    /// Direct child elements in document order. Text and comment nodes are not included.
    fn child_nodes(&self) -> Vec<Self>;

    /// All descendant text concatenated in document order, untrimmed.
    fn text_content(&self) -> String;

    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    fn matches(&self, query: &Query) -> bool {
        query.matches(self)
    }

    /// Every descendant element in pre-order (document order), excluding `self`.
    ///
    /// Walks with an explicit stack, so nesting depth is bounded by memory
    /// rather than the call stack.
    fn descendants(&self) -> impl Iterator<Item = Self> {
        Descendants {
            stack: self.child_nodes().into_iter().rev().collect(),
        }
    }

    fn find(&self, query: &Query) -> Vec<Self> {
        self.descendants()
            .filter(|node| node.matches(query))
            .collect()
    }

    /// First matching descendant in document order. Stops at the match.
    fn find_first(&self, query: &Query) -> Option<Self> {
        self.descendants().find(|node| node.matches(query))
    }

    fn children_matching(&self, query: &Query) -> Vec<Self> {
        self.child_nodes()
            .into_iter()
            .filter(|node| node.matches(query))
            .collect()
    }
}

impl<'a> Node for ElementRef<'a> {
    fn tag_name(&self) -> &str {
        self.value().name()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }

    fn child_nodes(&self) -> Vec<Self> {
        self.children().filter_map(ElementRef::wrap).collect()
    }

    fn text_content(&self) -> String {
        self.text().collect()
    }

    fn descendants(&self) -> impl Iterator<Item = Self> {
        // The tree's own traversal yields `self` first
        (**self).descendants().skip(1).filter_map(ElementRef::wrap)
    }
}

/// Pre-order walk over owned nodes. Pending siblings sit on `stack` in
/// reverse, so the next node in document order is always on top.
struct Descendants<N> {
    stack: Vec<N>,
}

impl<N: Node> Iterator for Descendants<N> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        let node = self.stack.pop()?;
        self.stack.extend(node.child_nodes().into_iter().rev());
        Some(node)
    }
}
