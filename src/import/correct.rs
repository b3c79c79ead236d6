//! Resolution of the `correct_choices` column against a parsed choice list.
//!
//! Three forms are accepted: comma-separated 1-based indices ("1,3"),
//! pipe-separated 1-based indices ("1|3"), and pipe-separated literal choice
//! texts ("B|D"). Numeric-vs-text detection picks the form; text matching is
//! case-insensitive on trimmed values.

use std::collections::BTreeSet;

enum CorrectSpec {
    Indices(Vec<usize>),
    Texts(Vec<String>),
}

fn detect(raw: &str) -> CorrectSpec {
    let (tokens, comma_separated): (Vec<&str>, bool) = if raw.contains('|') {
        (raw.split('|').collect(), false)
    } else {
        (raw.split(',').collect(), true)
    };

    let tokens: Vec<&str> = tokens
        .into_iter()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect();

    let indices: Option<Vec<usize>> = tokens
        .iter()
        .map(|token| token.parse::<usize>().ok())
        .collect();

    if let Some(indices) = indices {
        if !indices.is_empty() {
            return CorrectSpec::Indices(indices);
        }
    }

    if comma_separated {
        // a comma here is content, not a separator ("Paris, France")
        CorrectSpec::Texts(vec![raw.trim().to_string()])
    } else {
        CorrectSpec::Texts(tokens.into_iter().map(String::from).collect())
    }
}

/// Resolves `raw` to the 0-based set of correct choice positions. Errors
/// carry a human-readable message; the caller assigns the error kind.
pub fn resolve_correct_set(raw: &str, choices: &[String]) -> Result<BTreeSet<usize>, String> {
    if raw.trim().is_empty() {
        return Err("no correct choice specified".to_string());
    }

    let mut resolved = BTreeSet::new();

    match detect(raw) {
        CorrectSpec::Indices(indices) => {
            for index in indices {
                if index == 0 || index > choices.len() {
                    return Err(format!(
                        "choice index {index} out of range (1..={})",
                        choices.len()
                    ));
                }
                resolved.insert(index - 1);
            }
        }
        CorrectSpec::Texts(texts) => {
            for text in texts {
                let wanted = text.trim().to_lowercase();
                let position = choices
                    .iter()
                    .position(|choice| choice.trim().to_lowercase() == wanted);

                match position {
                    Some(position) => {
                        resolved.insert(position);
                    }
                    None => {
                        return Err(format!("\"{text}\" does not match any choice"));
                    }
                }
            }
        }
    }

    Ok(resolved)
}

#[cfg(test)]
mod test {
    use super::*;

    fn choices(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn comma_separated_indices() {
        let set = resolve_correct_set("1,3", &choices(&["A", "B", "C", "D"])).unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn pipe_separated_indices() {
        let set = resolve_correct_set("1|3", &choices(&["A", "B", "C", "D"])).unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn pipe_separated_texts() {
        let set = resolve_correct_set("B|D", &choices(&["A", "B", "C", "D"])).unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn single_numeric_token_is_an_index() {
        let set = resolve_correct_set("3", &choices(&["2", "3", "4", "5"])).unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn single_text_token_matches_case_insensitively() {
        let set = resolve_correct_set("h2o", &choices(&["H2O", "CO2", "O2"])).unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn text_with_comma_is_one_literal() {
        let set =
            resolve_correct_set("Paris, France", &choices(&["Paris, France", "Rome"])).unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn index_out_of_range_is_an_error() {
        let err = resolve_correct_set("5", &choices(&["A", "B"])).unwrap_err();
        assert!(err.contains("out of range"));

        let err = resolve_correct_set("0", &choices(&["A", "B"])).unwrap_err();
        assert!(err.contains("out of range"));
    }

    #[test]
    fn unknown_text_is_an_error() {
        let err = resolve_correct_set("E", &choices(&["A", "B"])).unwrap_err();
        assert!(err.contains("does not match"));
    }

    #[test]
    fn empty_value_is_an_error() {
        assert!(resolve_correct_set("  ", &choices(&["A", "B"])).is_err());
    }

    #[test]
    fn duplicate_references_collapse() {
        let set = resolve_correct_set("2,2", &choices(&["A", "B"])).unwrap();
        assert_eq!(set.len(), 1);
    }
}
