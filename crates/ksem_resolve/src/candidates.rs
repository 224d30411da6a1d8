//! Candidate names: the strings a raw reference token may stand for.

/// A declaration matches when any name it declares is one of these.
/// Order carries no meaning for matching.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Candidates {
    names: Vec<String>,
}

impl Candidates {
    /// The reference text, used unmodified.
    pub fn single(name: impl Into<String>) -> Self {
        let name = name.into();
        let names = if name.is_empty() { vec![] } else { vec![name] };
        Self { names }
    }

    /// Normalize a label token.
    ///
    /// A label is written with a leading quote and may embed `separator`
    /// before a suffix. For `` `plus`-SYMBOL `` this yields
    /// `` `plus`-SYMBOL ``, `` plus`-SYMBOL `` and `plus`.
    pub fn label(raw: &str, separator: char) -> Self {
        let mut names = Vec::with_capacity(3);
        push_nonempty(&mut names, raw);

        let mut chars = raw.chars();
        if chars.next().is_some() {
            let unquoted = chars.as_str();
            push_nonempty(&mut names, unquoted);
            if let Some(pos) = unquoted.find(separator) {
                push_nonempty(&mut names, &unquoted[..pos]);
            }
        }

        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Whether any of `declared` is a candidate.
    pub fn matches_any<'n>(&self, declared: impl IntoIterator<Item = &'n str>) -> bool {
        declared.into_iter().any(|name| self.contains(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// Empty strings never name a declaration.
fn push_nonempty(names: &mut Vec<String>, name: &str) {
    if !name.is_empty() {
        names.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(raw: &str) -> Vec<String> {
        Candidates::label(raw, '`').iter().map(String::from).collect()
    }

    #[test]
    fn test_label_with_separator_yields_three() {
        assert_eq!(label("`plus`-SYMBOL"), vec!["`plus`-SYMBOL", "plus`-SYMBOL", "plus"]);
    }

    #[test]
    fn test_closed_label_yields_three() {
        assert_eq!(label("`_+_`"), vec!["`_+_`", "_+_`", "_+_"]);
    }

    #[test]
    fn test_label_without_separator_yields_two() {
        assert_eq!(label("'plus"), vec!["'plus", "plus"]);
    }

    #[test]
    fn test_quote_is_dropped_whatever_it_is() {
        assert_eq!(label("#foo"), vec!["#foo", "foo"]);
    }

    #[test]
    fn test_multibyte_quote() {
        assert_eq!(label("«bar`x"), vec!["«bar`x", "bar`x", "bar"]);
    }

    #[test]
    fn test_empty_label_has_no_candidates() {
        assert!(Candidates::label("", '`').is_empty());
        assert!(Candidates::single("").is_empty());
    }

    #[test]
    fn test_lone_quote() {
        assert_eq!(label("`"), vec!["`"]);
        // Separator right after the quote leaves an empty short form.
        assert_eq!(label("``x"), vec!["``x", "`x"]);
    }

    #[test]
    fn test_custom_separator() {
        let c = Candidates::label("`plus#Int", '#');
        assert!(c.contains("plus"));
        assert!(!c.contains("plus`"));
    }

    #[test]
    fn test_single_is_unmodified() {
        let c = Candidates::single("`plus`");
        assert_eq!(c.len(), 1);
        assert!(c.contains("`plus`"));
        assert!(!c.contains("plus"));
    }

    #[test]
    fn test_matches_any() {
        let c = Candidates::label("`plus`", '`');
        assert!(c.matches_any(["minus", "plus"]));
        assert!(!c.matches_any(["minus"]));
        assert!(!c.matches_any(std::iter::empty()));
    }
}
