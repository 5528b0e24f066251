//! Query-string parsing with bracket nesting.
//!
//! `a=1` gives a string, repeated keys or `a[]=` give a list, and `a[lte]=5` gives a nested
//! map, so `averageCost[lte]=10000&careers[in]=Business` becomes
//! `{averageCost: {lte: "10000"}, careers: {in: "Business"}}`.

use serde::Serialize;
use std::collections::BTreeMap;

/// Deepest bracket nesting honored; anything beyond stays part of the last key verbatim.
const MAX_DEPTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Str(String),
    List(Vec<QueryValue>),
    Map(BTreeMap<String, QueryValue>),
}

impl QueryValue {
    /// All string leaves of a scalar or list, in order. Maps yield nothing.
    #[must_use]
    pub fn strings(&self) -> Vec<&str> {
        match self {
            Self::Str(s) => vec![s.as_str()],
            Self::List(items) => items.iter().flat_map(Self::strings).collect(),
            Self::Map(_) => Vec::new(),
        }
    }

    /// The first string leaf, for parameters that are meant to be scalar.
    #[must_use]
    pub fn first_str(&self) -> Option<&str> {
        self.strings().into_iter().next()
    }

    fn push(&mut self, value: Self) {
        match self {
            Self::List(items) => items.push(value),
            Self::Str(_) => {
                let old = std::mem::replace(self, Self::List(Vec::new()));
                if let Self::List(items) = self {
                    items.push(old);
                    items.push(value);
                }
            }
            // a scalar repeated onto a map key is dropped; the structured form wins
            Self::Map(_) => {}
        }
    }
}

/// Parsed HTTP query parameters. Immutable once built; derive variants with `without`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuerySpec(BTreeMap<String, QueryValue>);

impl QuerySpec {
    /// Parse a raw (percent-encoded) query string, without the leading `?`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        Self::from_pairs(url::form_urlencoded::parse(raw.as_bytes()))
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut root = BTreeMap::new();
        for (k, v) in pairs {
            let path = split_key(k.as_ref());
            if path.is_empty() {
                continue;
            }
            insert(&mut root, &path, v.into());
        }
        Self(root)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// A copy with the given top-level keys removed.
    #[must_use]
    pub fn without(&self, keys: &[&str]) -> Self {
        let mut out = self.0.clone();
        for k in keys {
            out.remove(*k);
        }
        Self(out)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &QueryValue)> {
        self.0.iter()
    }
}

// "a[b][]" -> ["a", "b", ""]; malformed brackets keep the key literal.
fn split_key(key: &str) -> Vec<String> {
    let Some(open) = key.find('[') else {
        return if key.is_empty() { Vec::new() } else { vec![key.to_string()] };
    };
    if open == 0 {
        return vec![key.to_string()];
    }
    let mut parts = vec![key[..open].to_string()];
    let mut rest = &key[open..];
    while let Some(inner) = rest.strip_prefix('[') {
        let Some(close) = inner.find(']') else { break };
        if parts.len() > MAX_DEPTH {
            break;
        }
        parts.push(inner[..close].to_string());
        rest = &inner[close + 1..];
    }
    // `[]` only appends at the end of a path
    let inner_list = parts.iter().rev().skip(1).any(String::is_empty);
    if inner_list || (!rest.is_empty() && parts.len() == 1) {
        return vec![key.to_string()];
    }
    if !rest.is_empty() {
        // unparsed tail: fold it back into the last segment
        if let Some(last) = parts.last_mut() {
            last.push_str(rest);
        }
    }
    parts
}

fn insert(map: &mut BTreeMap<String, QueryValue>, path: &[String], value: String) {
    let (head, tail) = (&path[0], &path[1..]);
    match tail.first() {
        None => match map.get_mut(head) {
            Some(existing) => existing.push(QueryValue::Str(value)),
            None => {
                map.insert(head.clone(), QueryValue::Str(value));
            }
        },
        Some(next) if next.is_empty() => {
            let entry = map.entry(head.clone()).or_insert_with(|| QueryValue::List(Vec::new()));
            entry.push(QueryValue::Str(value));
        }
        Some(_) => {
            let entry = map.entry(head.clone()).or_insert_with(|| QueryValue::Map(BTreeMap::new()));
            if let QueryValue::Map(inner) = entry {
                insert(inner, tail, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> QueryValue {
        QueryValue::Str(v.to_string())
    }

    #[test]
    fn scalars_and_repeats() {
        let q = QuerySpec::parse("housing=true&careers=A&careers=B");
        assert_eq!(q.get("housing"), Some(&s("true")));
        assert_eq!(q.get("careers"), Some(&QueryValue::List(vec![s("A"), s("B")])));
    }

    #[test]
    fn brackets_nest() {
        let q = QuerySpec::parse("averageCost%5Blte%5D=10000&averageCost[gt]=5&tags[]=x");
        let QueryValue::Map(m) = q.get("averageCost").unwrap() else { panic!("expected map") };
        assert_eq!(m.get("lte"), Some(&s("10000")));
        assert_eq!(m.get("gt"), Some(&s("5")));
        assert_eq!(q.get("tags"), Some(&QueryValue::List(vec![s("x")])));
    }

    #[test]
    fn decoding_and_leading_question_mark() {
        let q = QuerySpec::parse("?location.state=MA&name=Dev+Works%21");
        assert_eq!(q.get("location.state"), Some(&s("MA")));
        assert_eq!(q.get("name"), Some(&s("Dev Works!")));
    }

    #[test]
    fn malformed_brackets_stay_literal() {
        let q = QuerySpec::parse("a[b=1&[x]=2&c[d]e=3");
        assert_eq!(q.get("a[b"), Some(&s("1")));
        assert_eq!(q.get("[x]"), Some(&s("2")));
        let QueryValue::Map(m) = q.get("c").unwrap() else { panic!("expected map") };
        assert_eq!(m.get("de"), Some(&s("3")));
    }

    #[test]
    fn list_marker_inside_a_path_stays_literal() {
        let q = QuerySpec::parse("a[][gt]=1&b[in][]=2");
        assert_eq!(q.get("a[][gt]"), Some(&s("1")));
        assert_eq!(q.get("a"), None);
        let QueryValue::Map(m) = q.get("b").unwrap() else { panic!("expected map") };
        assert_eq!(m.get("in"), Some(&QueryValue::List(vec![s("2")])));
    }

    #[test]
    fn without_strips_keys() {
        let q = QuerySpec::parse("select=name&page=2&name=x");
        let f = q.without(&["select", "sort", "page", "limit"]);
        assert_eq!(f.len(), 1);
        assert!(f.contains_key("name"));
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn serializes_as_plain_json() {
        let q = QuerySpec::parse("averageCost[lte]=10000&careers=A&careers=B");
        let json = serde_json::to_string(&q).unwrap();
        assert_eq!(json, r#"{"averageCost":{"lte":"10000"},"careers":["A","B"]}"#);
    }

    #[test]
    fn strings_flatten_lists() {
        let q = QuerySpec::parse("select=name&select=description");
        assert_eq!(q.get("select").unwrap().strings(), vec!["name", "description"]);
        assert_eq!(q.get("select").unwrap().first_str(), Some("name"));
    }
}
