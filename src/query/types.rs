use crate::errors::DbError;
use bson::Bson;
use serde::{Deserialize, Serialize};

// Safety limits to prevent resource abuse
pub(crate) const MAX_PATH_DEPTH: usize = 32;
pub(crate) const MAX_IN_SET: usize = 1000;
pub(crate) const MAX_SORT_FIELDS: usize = 8;
pub(crate) const MAX_PROJECTION_FIELDS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: Order,
}

impl SortSpec {
    #[must_use]
    pub fn asc(field: &str) -> Self {
        Self { field: field.to_string(), order: Order::Asc }
    }

    #[must_use]
    pub fn desc(field: &str) -> Self {
        Self { field: field.to_string(), order: Order::Desc }
    }

    /// Parse a space-separated key list; a leading `-` marks a descending key.
    #[must_use]
    pub fn parse_list(keys: &str) -> Vec<Self> {
        keys.split_whitespace()
            .filter_map(|k| match k.strip_prefix('-') {
                Some("") => None,
                Some(field) => Some(Self::desc(field)),
                None => Some(Self::asc(k.strip_prefix('+').unwrap_or(k))),
            })
            .collect()
    }
}

/// Field selection: either keep only the listed fields, or drop them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    Include(Vec<String>),
    Exclude(Vec<String>),
}

impl Projection {
    /// Parse a space-separated field list. `-field` entries exclude; the two forms cannot be mixed.
    ///
    /// # Errors
    /// Returns `DbError::QueryError` when inclusion and exclusion are mixed.
    pub fn parse(fields: &str) -> Result<Option<Self>, DbError> {
        let mut include = Vec::new();
        let mut exclude = Vec::new();
        for f in fields.split_whitespace().take(MAX_PROJECTION_FIELDS) {
            match f.strip_prefix('-') {
                Some("") => {}
                Some(name) => exclude.push(name.to_string()),
                None => include.push(f.to_string()),
            }
        }
        match (include.is_empty(), exclude.is_empty()) {
            (true, true) => Ok(None),
            (false, true) => Ok(Some(Self::Include(include))),
            (true, false) => Ok(Some(Self::Exclude(exclude))),
            (false, false) => {
                Err(DbError::QueryError("cannot mix field inclusion and exclusion".into()))
            }
        }
    }
}

/// Options for `find_docs`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub projection: Option<Projection>,
    pub sort: Option<Vec<SortSpec>>,
    pub limit: Option<usize>,
    pub skip: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    True,
    And(Vec<Filter>),
    In { path: String, values: Vec<Bson> },
    Nin { path: String, values: Vec<Bson> },
    Cmp { path: String, op: CmpOp, value: Bson },
}

impl Filter {
    #[must_use]
    pub fn eq(path: &str, value: impl Into<Bson>) -> Self {
        Self::Cmp { path: path.to_string(), op: CmpOp::Eq, value: value.into() }
    }

    /// Conjunction that flattens nested `And` and drops `True`.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        let mut parts = Vec::new();
        for f in [self, other] {
            match f {
                Self::True => {}
                Self::And(fs) => parts.extend(fs),
                f => parts.push(f),
            }
        }
        match parts.len() {
            0 => Self::True,
            1 => parts.remove(0),
            _ => Self::And(parts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_list_parses_direction() {
        assert_eq!(
            SortSpec::parse_list("-createdAt name"),
            vec![SortSpec::desc("createdAt"), SortSpec::asc("name")]
        );
        assert!(SortSpec::parse_list("  - ").is_empty());
    }

    #[test]
    fn projection_forms() {
        assert_eq!(
            Projection::parse("name description").unwrap(),
            Some(Projection::Include(vec!["name".into(), "description".into()]))
        );
        assert_eq!(
            Projection::parse("-password").unwrap(),
            Some(Projection::Exclude(vec!["password".into()]))
        );
        assert_eq!(Projection::parse("").unwrap(), None);
        assert!(Projection::parse("name -password").is_err());
    }

    #[test]
    fn and_flattens() {
        let f = Filter::True.and(Filter::eq("a", 1)).and(Filter::eq("b", 2));
        assert!(matches!(f, Filter::And(ref v) if v.len() == 2));
        assert_eq!(Filter::True.and(Filter::True), Filter::True);
    }
}
