use serde::Deserialize;
use utoipa::IntoParams;

const DEFAULT_LIMIT: i64 = 5;
const MAX_LIMIT: i64 = 100;

/// `?limit=&offset=` query for list endpoints
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Page size (default: 5, clamped to 1..=100)
    #[param(minimum = 1, maximum = 100, example = 5)]
    pub limit: Option<i64>,

    /// Rows to skip (default: 0)
    #[param(minimum = 0, example = 0)]
    pub offset: Option<i64>,
}

impl ListQuery {
    /// Returns `(limit, offset)` with out-of-range values pulled back in range.
    pub fn resolve(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(ListQuery::default().resolve(), (5, 0));
    }

    #[test]
    fn test_clamping() {
        let query = ListQuery {
            limit: Some(1000),
            offset: Some(-3),
        };
        assert_eq!(query.resolve(), (100, 0));

        let query = ListQuery {
            limit: Some(0),
            offset: Some(10),
        };
        assert_eq!(query.resolve(), (1, 10));
    }
}
