use crate::model::Procedure;

/// Find the catalog entry for a free-text procedure name.
///
/// Comparison is case-insensitive against both the German and the English
/// title. An entry matches when a title contains the name or the name contains
/// a title, so both abbreviated catalog titles and verbose PDF text resolve.
/// The first matching entry in catalog order wins; there is no ranking.
pub fn match_procedure<'a>(name: &str, catalog: &'a [Procedure]) -> Option<&'a Procedure> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    catalog.iter().find(|procedure| {
        titles(procedure).any(|title| title.contains(&needle) || needle.contains(&title))
    })
}

/// Lowercased, non-empty titles of a catalog entry.
fn titles(procedure: &Procedure) -> impl Iterator<Item = String> + '_ {
    std::iter::once(procedure.title_de.as_str())
        .chain(procedure.title_en.as_deref())
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn procedure(id: &str, title_de: &str, title_en: Option<&str>) -> Procedure {
        Procedure {
            id: id.into(),
            title_de: title_de.into(),
            title_en: title_en.map(String::from),
            code: None,
        }
    }

    fn catalog() -> Vec<Procedure> {
        vec![
            procedure("p1", "Appendektomie", Some("Appendectomy")),
            procedure("p2", "Cholezystektomie", None),
        ]
    }

    #[test]
    fn test_name_contains_title() {
        let catalog = catalog();
        let m = match_procedure("Appendektomie laparoskopisch", &catalog).unwrap();
        assert_eq!(m.id, "p1");
    }

    #[test]
    fn test_title_contains_name() {
        let catalog = catalog();
        let m = match_procedure("Append", &catalog).unwrap();
        assert_eq!(m.id, "p1");
    }

    #[test]
    fn test_unrelated_name_does_not_match_other_entry() {
        let catalog = vec![procedure("p1", "Appendektomie", None)];
        assert!(match_procedure("Cholezystektomie", &catalog).is_none());
    }

    #[test]
    fn test_case_insensitive() {
        let catalog = catalog();
        assert_eq!(match_procedure("CHOLEZYSTEKTOMIE", &catalog).unwrap().id, "p2");
    }

    #[test]
    fn test_english_title_matches() {
        let catalog = catalog();
        assert_eq!(
            match_procedure("Laparoscopic appendectomy", &catalog).unwrap().id,
            "p1"
        );
    }

    #[test]
    fn test_umlauts_are_lowercased() {
        let catalog = vec![procedure("p1", "Dünndarmresektion", None)];
        assert!(match_procedure("DÜNNDARMRESEKTION", &catalog).is_some());
    }

    #[test]
    fn test_first_match_in_catalog_order_wins() {
        let catalog = vec![
            procedure("generic", "Hernie", None),
            procedure("specific", "Leistenhernie", None),
        ];
        assert_eq!(match_procedure("Leistenhernie", &catalog).unwrap().id, "generic");
    }

    #[test]
    fn test_empty_name_matches_nothing() {
        let catalog = catalog();
        assert!(match_procedure("   ", &catalog).is_none());
    }

    #[test]
    fn test_empty_title_is_ignored() {
        let catalog = vec![
            procedure("blank", "", Some("")),
            procedure("p1", "Appendektomie", None),
        ];
        assert_eq!(match_procedure("Appendektomie", &catalog).unwrap().id, "p1");
    }
}
