//! Closest-match suggestions for misspelled tool and field names.

fn normalize(value: &str) -> Vec<char> {
    value
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn contains(haystack: &[char], needle: &[char]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|window| window == needle)
}

fn edit_distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut corner = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = if ca == cb { corner } else { corner + 1 };
            corner = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(row[j + 1] + 1);
        }
    }
    row[b.len()]
}

fn score(input: &[char], candidate: &[char]) -> usize {
    if input == candidate {
        return 0;
    }
    if contains(input, candidate) || contains(candidate, input) {
        return 1;
    }
    edit_distance(input, candidate)
}

fn allowed_distance(len: usize) -> usize {
    match len {
        0 => 0,
        1..=4 => 1,
        5..=8 => 2,
        _ => len / 3,
    }
}

/// Ranks `candidates` by closeness to `input` and returns up to `limit`
/// of those within the distance threshold for the input's length.
pub fn suggest(input: &str, candidates: &[String], limit: usize) -> Vec<String> {
    let needle = normalize(input);
    if needle.is_empty() || candidates.is_empty() || limit == 0 {
        return Vec::new();
    }
    let allowed = allowed_distance(needle.len());

    let mut scored: Vec<(usize, &String)> = candidates
        .iter()
        .filter_map(|candidate| {
            let score = score(&needle, &normalize(candidate));
            (score <= allowed).then_some((score, candidate))
        })
        .collect();
    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    let mut out: Vec<String> = Vec::new();
    for (_, candidate) in scored {
        if !out.contains(candidate) {
            out.push(candidate.clone());
        }
        if out.len() >= limit {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn suggests_the_closest_tool_name() {
        let candidates = names(&[
            "search_contracts",
            "get_contract_details",
            "get_organizations",
            "get_statistics",
        ]);
        assert_eq!(
            suggest("serch_contracts", &candidates, 3),
            vec!["search_contracts".to_string()]
        );
    }

    #[test]
    fn suggests_close_field_names() {
        let candidates = names(&["query", "limit", "offset"]);
        assert_eq!(suggest("limt", &candidates, 3), vec!["limit".to_string()]);
    }

    #[test]
    fn unrelated_input_yields_nothing() {
        let candidates = names(&["query", "limit", "offset"]);
        assert!(suggest("zzz", &candidates, 3).is_empty());
    }

    #[test]
    fn empty_input_yields_nothing() {
        let candidates = names(&["query"]);
        assert!(suggest("  ", &candidates, 3).is_empty());
    }
}
