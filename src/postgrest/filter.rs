//! Filter operations for PostgrestClient

/// Operator for filter expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equal to
    Eq,

    /// Not equal to
    Neq,
}

impl FilterOperator {
    /// Convert the operator to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
        }
    }

    /// Render `operator.value` as PostgREST expects it in the query string
    pub fn apply(&self, value: &str) -> String {
        format!("{}.{}", self.as_str(), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_operator_prefix() {
        assert_eq!(FilterOperator::Eq.apply("SKU1"), "eq.SKU1");
        assert_eq!(FilterOperator::Neq.apply("42"), "neq.42");
    }
}
