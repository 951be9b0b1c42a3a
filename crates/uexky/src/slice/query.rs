use crate::{Error, Result};

/// A directional page request.
///
/// Exactly one of `before` and `after` must be set. An empty cursor string
/// is a valid request for the edge of the ordering (the first page when
/// paging `after`, the last one when paging `before`), while an absent
/// cursor means the direction was not requested.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct SliceQuery {
    pub before: Option<String>,
    pub after: Option<String>,
    pub limit: i64,
}

impl SliceQuery {
    pub fn after(cursor: impl Into<String>, limit: i64) -> Self {
        Self {
            before: None,
            after: Some(cursor.into()),
            limit,
        }
    }

    pub fn before(cursor: impl Into<String>, limit: i64) -> Self {
        Self {
            before: Some(cursor.into()),
            after: None,
            limit,
        }
    }

    /// Checks the request and returns its anchor and page size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Params`] if both or neither cursors are set, or if
    /// `limit` is not positive.
    pub(crate) fn validate(&self) -> Result<(Anchor<'_>, usize)> {
        let anchor = match (self.before.as_deref(), self.after.as_deref()) {
            (Some(cursor), None) => Anchor::Before(cursor),
            (None, Some(cursor)) => Anchor::After(cursor),
            _ => return Err(Error::params("you must specify either before or after")),
        };
        let limit = usize::try_from(self.limit)
            .ok()
            .filter(|&limit| limit > 0)
            .ok_or_else(|| {
                Error::params(format!("limit must be a positive integer, got {}", self.limit))
            })?;
        Ok((anchor, limit))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Anchor<'a> {
    Before(&'a str),
    After(&'a str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn exactly_one_direction() {
        assert_eq!(
            SliceQuery::after("", 10).validate().unwrap(),
            (Anchor::After(""), 10)
        );
        assert_eq!(
            SliceQuery::before("BAAB", 3).validate().unwrap(),
            (Anchor::Before("BAAB"), 3)
        );

        let both = SliceQuery {
            before: Some(String::new()),
            after: Some(String::new()),
            limit: 10,
        };
        assert_eq!(both.validate().unwrap_err().kind(), ErrorKind::Params);

        let neither = SliceQuery {
            limit: 10,
            ..SliceQuery::default()
        };
        assert_eq!(neither.validate().unwrap_err().kind(), ErrorKind::Params);
    }

    #[test]
    fn limit_must_be_positive() {
        for limit in [0, -1, i64::MIN] {
            let err = SliceQuery::after("", limit).validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Params, "limit {limit}");
        }
        assert!(SliceQuery::after("", i64::MAX).validate().is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_from_request_json() {
        let query: SliceQuery = serde_json::from_str(r#"{"after":"","limit":10}"#).unwrap();
        assert_eq!(query, SliceQuery::after("", 10));

        let query: SliceQuery = serde_json::from_str(r#"{"before":"FBAA","limit":2}"#).unwrap();
        assert_eq!(query, SliceQuery::before("FBAA", 2));

        assert!(serde_json::from_str::<SliceQuery>(r#"{"after":"","limit":1.5}"#).is_err());
    }
}
