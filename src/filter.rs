//! Name filter over the resident catalog page

use crate::state::Summary;

/// Indices of the entries whose name contains `term`, ignoring case.
///
/// The term is lower-cased once and compared against each lower-cased name.
/// An empty or whitespace-only term matches everything. Input order is kept.
pub fn matching_indices(list: &[Summary], term: &str) -> Vec<usize> {
    if term.trim().is_empty() {
        return (0..list.len()).collect();
    }
    let needle = term.to_lowercase();
    list.iter()
        .enumerate()
        .filter(|(_, entry)| entry.name.to_lowercase().contains(&needle))
        .map(|(idx, _)| idx)
        .collect()
}

/// The subset of `list` matching `term`, in input order.
pub fn filter(list: &[Summary], term: &str) -> Vec<Summary> {
    matching_indices(list, term)
        .into_iter()
        .map(|idx| list[idx].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dex(names: &[&str]) -> Vec<Summary> {
        names
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                Summary::new(
                    *name,
                    format!("https://pokeapi.co/api/v2/pokemon/{}/", idx + 1),
                )
            })
            .collect()
    }

    fn names(list: &[Summary]) -> Vec<&str> {
        list.iter().map(|entry| entry.name.as_str()).collect()
    }

    fn kanto() -> Vec<Summary> {
        dex(&[
            "bulbasaur",
            "ivysaur",
            "venusaur",
            "charmander",
            "charmeleon",
            "charizard",
            "squirtle",
            "wartortle",
            "blastoise",
            "mr-mime",
            "farfetchd",
        ])
    }

    #[test]
    fn test_empty_term_returns_list_unchanged() {
        let list = kanto();
        assert_eq!(filter(&list, ""), list);
    }

    #[test]
    fn test_whitespace_term_means_no_filter() {
        let list = kanto();
        assert_eq!(filter(&list, "   "), list);
    }

    #[test]
    fn test_substring_match_keeps_order() {
        let list = kanto();
        assert_eq!(
            names(&filter(&list, "char")),
            vec!["charmander", "charmeleon", "charizard"]
        );
        assert_eq!(
            names(&filter(&list, "saur")),
            vec!["bulbasaur", "ivysaur", "venusaur"]
        );
    }

    #[test]
    fn test_match_ignores_case() {
        let list = kanto();
        assert_eq!(names(&filter(&list, "CHAR")), names(&filter(&list, "char")));

        let mixed = dex(&["Mr-Mime", "Jynx"]);
        assert_eq!(names(&filter(&mixed, "mr-m")), vec!["Mr-Mime"]);
    }

    #[test]
    fn test_no_other_normalization() {
        let list = kanto();
        // Inner and surrounding whitespace are part of the term.
        assert!(filter(&list, " char").is_empty());
        assert!(filter(&list, "mr mime").is_empty());
    }

    #[test]
    fn test_results_are_subsequence_containing_term() {
        let list = kanto();
        for term in ["a", "ar", "t", "oise", "zz", "e", "-"] {
            let result = filter(&list, term);
            let needle = term.to_lowercase();
            assert!(result
                .iter()
                .all(|entry| entry.name.to_lowercase().contains(&needle)));

            let indices = matching_indices(&list, term);
            assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
            assert_eq!(indices.len(), result.len());
        }
    }

    #[test]
    fn test_filter_is_idempotent() {
        let list = kanto();
        for term in ["", "a", "char", "SAUR", "x"] {
            let once = filter(&list, term);
            assert_eq!(filter(&once, term), once);
        }
    }
}
