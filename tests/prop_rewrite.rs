use devcamper::advanced::{BARE_OPERATORS, RESERVED_KEYS, filter_document, rewrite_operators};
use devcamper::query_string::QuerySpec;
use proptest::prelude::*;

fn field() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z]{0,10}".prop_filter("not reserved or an operator", |f| {
        !RESERVED_KEYS.contains(&f.as_str()) && !BARE_OPERATORS.contains(&f.as_str())
    })
}

proptest! {
    #[test]
    fn prop_reserved_keys_never_filter(f in field(), v in "[a-z0-9]{1,6}", page in "[0-9]{1,3}") {
        let q = QuerySpec::parse(&format!("{f}={v}&select=a,b&sort=-c&page={page}&limit=5"));
        let doc = filter_document(&q).unwrap();
        prop_assert_eq!(doc.len(), 1);
        prop_assert!(doc.contains_key(&f));
        for k in RESERVED_KEYS {
            prop_assert!(!doc.contains_key(k));
        }
    }

    #[test]
    fn prop_each_operator_marked_exactly_once(f in field(), op_idx in 0usize..5, n in 0i64..100_000) {
        let op = BARE_OPERATORS[op_idx];
        let q = QuerySpec::parse(&format!("{f}[{op}]={n}"));
        let doc = filter_document(&q).unwrap();
        let inner = doc.get_document(&f).unwrap();
        let marked = format!("${op}");
        prop_assert!(inner.contains_key(&marked));
        prop_assert!(!inner.contains_key(op));
        prop_assert!(!inner.keys().any(|k| k.starts_with("$$")));
    }

    #[test]
    fn prop_longer_names_untouched(prefix in "[a-z]{0,3}", suffix in "[a-z]{1,3}", op_idx in 0usize..5) {
        let op = BARE_OPERATORS[op_idx];
        let key = format!("{prefix}{op}{suffix}");
        prop_assume!(!BARE_OPERATORS.contains(&key.as_str()));
        let json = format!(r#"{{"{key}":{{"{key}":"{op}"}}}}"#);
        prop_assert_eq!(rewrite_operators(&json).unwrap(), json);
    }

    #[test]
    fn prop_rewrite_is_idempotent(f in field(), op_idx in 0usize..5, v in "[a-z]{0,5}") {
        let op = BARE_OPERATORS[op_idx];
        let json = format!(r#"{{"{f}":{{"{op}":"{v}"}}}}"#);
        let once = rewrite_operators(&json).unwrap();
        prop_assert_eq!(rewrite_operators(&once).unwrap(), once);
    }
}
