//! Read-only DOM queries over a rendered page snapshot.

use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose start separates words in the text rendering.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// A parsed snapshot of the rendered document.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    pub fn query<'a>(&'a self, selector: &Selector) -> Option<ElementRef<'a>> {
        self.html.select(selector).next()
    }

    pub fn query_all<'a>(&'a self, selector: &Selector) -> Vec<ElementRef<'a>> {
        self.html.select(selector).collect()
    }
}

/// A detached copy of one element's subtree.
pub struct Fragment {
    html: Html,
}

impl Fragment {
    /// The copied element itself.
    pub fn root(&self) -> Option<ElementRef<'_>> {
        self.html.root_element().children().find_map(ElementRef::wrap)
    }
}

/// Query helpers in the vocabulary of the page source.
pub trait ElementExt<'a> {
    fn attribute(&self, name: &str) -> Option<&'a str>;

    /// Rendered text with whitespace collapsed.
    fn inner_text(&self) -> String;

    fn outer_html(&self) -> String;

    /// First matching descendant.
    fn query(&self, selector: &Selector) -> Option<ElementRef<'a>>;

    fn query_all(&self, selector: &Selector) -> Vec<ElementRef<'a>>;

    /// True when the element itself or any descendant matches.
    fn matches_or_contains(&self, selector: &Selector) -> bool;

    /// Copy the subtree with every element matching `strip` removed.
    fn sanitized(&self, strip: &[Selector]) -> Fragment;
}

impl<'a> ElementExt<'a> for ElementRef<'a> {
    fn attribute(&self, name: &str) -> Option<&'a str> {
        self.value().attr(name)
    }

    fn inner_text(&self) -> String {
        let mut raw = String::new();
        for node in self.descendants() {
            match node.value() {
                Node::Text(text) => raw.push_str(text),
                Node::Element(el) if BLOCK_ELEMENTS.contains(&el.name()) => raw.push(' '),
                _ => {}
            }
        }
        collapse_whitespace(&raw)
    }

    fn outer_html(&self) -> String {
        self.html()
    }

    fn query(&self, selector: &Selector) -> Option<ElementRef<'a>> {
        self.select(selector).next()
    }

    fn query_all(&self, selector: &Selector) -> Vec<ElementRef<'a>> {
        self.select(selector).collect()
    }

    fn matches_or_contains(&self, selector: &Selector) -> bool {
        selector.matches(self) || self.select(selector).next().is_some()
    }

    fn sanitized(&self, strip: &[Selector]) -> Fragment {
        let mut html = Html::parse_fragment(&self.html());
        let keep = html
            .root_element()
            .children()
            .find_map(ElementRef::wrap)
            .map(|el| el.id());

        let doomed: Vec<_> = strip
            .iter()
            .flat_map(|selector| html.select(selector).map(|el| el.id()).collect::<Vec<_>>())
            .filter(|id| Some(*id) != keep)
            .collect();

        for id in doomed {
            if let Some(mut node) = html.tree.get_mut(id) {
                node.detach();
            }
        }

        Fragment { html }
    }
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
