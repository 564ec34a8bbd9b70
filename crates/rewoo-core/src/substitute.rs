//! Evidence substitution.
//!
//! Replaces `#E<n>` references with the results stored under them. The text
//! is scanned once: each whole `#E<digits>` token is looked up and replaced
//! if bound, left alone if not. Inserted values are never scanned again, so
//! a result that happens to contain `#E2` stays as written, and `#E1` never
//! matches the front of `#E10`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::state::ResultStore;

static VARIABLE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#E[0-9]+").expect("variable token pattern is a valid regex"));

/// Return `text` with every bound evidence variable replaced by its value.
pub fn substitute(text: &str, results: &ResultStore) -> String {
    if results.is_empty() {
        return text.to_string();
    }
    VARIABLE_TOKEN
        .replace_all(text, |caps: &Captures| {
            let token = &caps[0];
            results.get(token).unwrap_or(token).to_string()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(pairs: &[(&str, &str)]) -> ResultStore {
        let mut s = ResultStore::new();
        for (k, v) in pairs {
            s.insert(*k, *v).unwrap();
        }
        s
    }

    #[test]
    fn replaces_every_occurrence() {
        let results = store(&[("#E1", "5")]);
        let out = substitute("#E1 plus #E1 is twice #E1", &results);
        assert_eq!(out, "5 plus 5 is twice 5");
        assert!(!out.contains("#E1"));
    }

    #[test]
    fn replaces_every_bound_variable() {
        let results = store(&[("#E1", "Paris"), ("#E2", "2.1 million")]);
        assert_eq!(
            substitute("population of #E1 is #E2", &results),
            "population of Paris is 2.1 million"
        );
    }

    #[test]
    fn leaves_unbound_variables_alone() {
        let results = store(&[("#E1", "5")]);
        assert_eq!(substitute("#E1 and #E3", &results), "5 and #E3");
    }

    #[test]
    fn does_not_match_prefix_of_longer_variable() {
        let results = store(&[("#E1", "one"), ("#E10", "ten")]);
        assert_eq!(substitute("#E10 #E1", &results), "ten one");

        let only_first = store(&[("#E1", "one")]);
        assert_eq!(substitute("#E10", &only_first), "#E10");
    }

    #[test]
    fn inserted_values_are_not_rescanned() {
        let results = store(&[("#E1", "see #E2"), ("#E2", "boom")]);
        assert_eq!(substitute("#E1", &results), "see #E2");

        let self_ref = store(&[("#E1", "#E1!")]);
        assert_eq!(substitute("#E1 #E1", &self_ref), "#E1! #E1!");
    }

    #[test]
    fn empty_store_is_identity() {
        let results = ResultStore::new();
        assert_eq!(substitute("Double #E1", &results), "Double #E1");
    }

    #[test]
    fn store_is_untouched() {
        let results = store(&[("#E1", "5")]);
        let before = results.clone();
        let _ = substitute("#E1", &results);
        assert_eq!(results, before);
    }
}
