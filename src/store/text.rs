//! Text folding and matching used by the search primitives.

/// Lowercase and strip the accents found in Spanish and other Latin scripts
pub fn fold(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ä' | 'ã' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Split folded text into alphanumeric tokens
pub fn tokens(text: &str) -> Vec<String> {
    fold(text)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ranked-path match. A document matches when it contains the query as a
/// case- and accent-insensitive substring, or when every query token
/// prefixes some document token.
///
/// Always a superset of [`contains_ignore_case`]. A blank query never matches.
pub fn full_text_matches(document: &str, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return false;
    }
    if contains_ignore_case(document, query) || fold(document).contains(&fold(query)) {
        return true;
    }

    let query_tokens = tokens(query);
    if query_tokens.is_empty() {
        return false;
    }
    let doc_tokens = tokens(document);
    query_tokens
        .iter()
        .all(|q| doc_tokens.iter().any(|d| d.starts_with(q.as_str())))
}

/// Case-insensitive substring containment
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_strips_accents() {
        assert_eq!(fold("Matemáticas Ñandú"), "matematicas nandu");
    }

    #[test]
    fn test_full_text_is_accent_tolerant() {
        assert!(full_text_matches("Matemáticas Discretas GII", "matematicas"));
        assert!(full_text_matches("Matematicas Discretas GII", "MATEMÁTICAS"));
    }

    #[test]
    fn test_full_text_requires_every_token() {
        assert!(full_text_matches("Redes de Computadores", "redes comp"));
        assert!(!full_text_matches("Redes de Computadores", "redes sistemas"));
    }

    #[test]
    fn test_full_text_accepts_infix_and_accented_fragments() {
        assert!(full_text_matches("Bases de Datos GII", "atos"));
        assert!(full_text_matches("Programación GII", "ión"));
        assert!(full_text_matches("Programación GII", "ACION"));
        assert!(!full_text_matches("Redes GII", "datos"));
    }

    #[test]
    fn test_full_text_covers_substring_matches() {
        let documents = ["Bases de Datos GII", "Programación  Paralela MUIARFID", "Ética GIIROB"];
        let queries = ["atos", "ión", "n  p", "ÉTI", "giir", "s de d", "zzz"];
        for document in documents {
            for query in queries {
                if contains_ignore_case(document, query) {
                    assert!(full_text_matches(document, query), "{document} / {query}");
                }
            }
        }
    }

    #[test]
    fn test_empty_query_never_matches() {
        assert!(!full_text_matches("anything", "  "));
        assert!(!full_text_matches("anything", "  ,, "));
    }
}
