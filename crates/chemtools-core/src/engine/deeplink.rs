use url::{Url, form_urlencoded};

/// Page the deep links point at.
pub const FULL_PAGE: &str = "full-page.html";

/// Base used to resolve relative links such as `?category=pk` or `#tool=x`.
const RELATIVE_BASE: &str = "chemtools://local/";

/// The `category` and `tool` requested by a link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeepLink {
    pub category: Option<String>,
    pub tool: Option<String>,
}

impl DeepLink {
    pub fn new(category: impl Into<String>, tool: Option<String>) -> Self {
        Self {
            category: Some(category.into()),
            tool,
        }
    }

    /// Reads `category` and `tool` from a URL.
    ///
    /// Accepts absolute URLs, relative ones (`full-page.html?category=pk`) and bare query or hash
    /// strings. Query parameters win over hash parameters; empty values count as absent. Input
    /// that is not a URL at all yields an empty link.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let Some(url) = Url::parse(input)
            .ok()
            .or_else(|| Url::parse(RELATIVE_BASE).ok()?.join(input).ok())
        else {
            return Self::default();
        };

        let mut link = Self::default();
        link.absorb(url.query_pairs());
        if let Some(fragment) = url.fragment() {
            link.absorb(form_urlencoded::parse(fragment.as_bytes()));
        }
        link
    }

    /// Formats the link as `full-page.html?category=..&tool=..`.
    pub fn to_href(&self) -> String {
        self.to_href_on(FULL_PAGE)
    }

    pub fn to_href_on(&self, page: &str) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if let Some(category) = &self.category {
            serializer.append_pair("category", category);
        }
        if let Some(tool) = &self.tool {
            serializer.append_pair("tool", tool);
        }
        let query = serializer.finish();
        if query.is_empty() {
            page.to_string()
        } else {
            format!("{page}?{query}")
        }
    }

    fn absorb<'a, I>(&mut self, pairs: I)
    where
        I: Iterator<Item = (std::borrow::Cow<'a, str>, std::borrow::Cow<'a, str>)>,
    {
        for (key, value) in pairs {
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_ref() {
                "category" => &mut self.category,
                "tool" => &mut self.tool,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
    }
}
