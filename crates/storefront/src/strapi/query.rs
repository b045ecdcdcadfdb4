//! Strapi query-string builder.
//!
//! Strapi's REST API reads nested parameters in bracket notation
//! (`pagination[page]=2`, `filters[title][$containsi]=lamp`). Keys and values
//! are form-encoded on the wire; Strapi decodes the brackets back.

use shopfront_core::CategoryId;

/// Relations every product request populates.
pub const PRODUCT_POPULATE: [&str; 2] = ["images", "productCategory"];

/// An ordered list of Strapi query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrapiQuery {
    pairs: Vec<(String, String)>,
}

impl StrapiQuery {
    /// Empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Query for product endpoints: populates images and category.
    #[must_use]
    pub fn products() -> Self {
        PRODUCT_POPULATE
            .iter()
            .enumerate()
            .fold(Self::new(), |query, (i, relation)| {
                query.push(format!("populate[{i}]"), *relation)
            })
    }

    /// Request one page of results.
    #[must_use]
    pub fn paginate(self, page: u32, page_size: u32) -> Self {
        self.push("pagination[page]", page.to_string())
            .push("pagination[pageSize]", page_size.to_string())
    }

    /// Case-insensitive substring match on the title.
    #[must_use]
    pub fn title_contains(self, text: &str) -> Self {
        self.push("filters[title][$containsi]", text)
    }

    /// Products whose category id is one of `ids`.
    #[must_use]
    pub fn in_categories(self, ids: &[CategoryId]) -> Self {
        ids.iter().enumerate().fold(self, |query, (i, id)| {
            query.push(
                format!("filters[productCategory][id][$in][{i}]"),
                id.to_string(),
            )
        })
    }

    /// Parameters in insertion order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Value of the first parameter named `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Form-encoded rendering, used for logging.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    fn push(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }
}
