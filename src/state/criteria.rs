/// Search filters sent as query parameters
///
/// Blank values never make it in: the server reads an absent parameter as
/// "no filter", whereas `?materialNm=` would filter on the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    filters: Vec<(String, String)>,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(field, value)` pairs in input order
    pub fn from_inputs<'a, I>(inputs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut criteria = Self::new();
        for (field, value) in inputs {
            criteria.insert(field, value);
        }
        criteria
    }

    /// Add or replace a filter. Blank values remove it.
    pub fn insert(&mut self, field: &str, value: &str) {
        self.filters.retain(|(f, _)| f != field);

        let value = value.trim();
        if !value.is_empty() {
            self.filters.push((field.to_string(), value.to_string()));
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.filters
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Query pairs, ready for `RequestBuilder::query`
    pub fn pairs(&self) -> &[(String, String)] {
        &self.filters
    }
}
