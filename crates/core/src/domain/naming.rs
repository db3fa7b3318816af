// Wire Name Conversion
//
// Declared method names ("GetLoginKind") become lowercase, underscore
// separated wire names ("get_login_kind"). Callers on other services
// compute the same names, so the splitting rules are fixed.

/// Character classes used to split an identifier into runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Lower,
    Upper,
    Digit,
    Separator,
    Other,
}

impl CharClass {
    fn of(c: char) -> Self {
        if c == '_' {
            CharClass::Separator
        } else if c.is_lowercase() {
            CharClass::Lower
        } else if c.is_uppercase() {
            CharClass::Upper
        } else if c.is_numeric() {
            // any numeric category, so '²' and 'Ⅻ' split like decimal digits
            CharClass::Digit
        } else {
            CharClass::Other
        }
    }
}

/// Convert a mixed-case identifier into its wire name.
///
/// # Example
///
/// ```
/// use svcbind_core::domain::naming::to_wire_name;
///
/// assert_eq!(to_wire_name("PDFLoader"), "pdf_loader");
/// assert_eq!(to_wire_name("GetLoginKind"), "get_login_kind");
/// ```
pub fn to_wire_name(name: &str) -> String {
    split_words(name)
        .iter()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Split an identifier at case, digit and punctuation boundaries.
///
/// Runs of underscores act as separators and never become words, which
/// keeps [`to_wire_name`] stable when applied to its own output.
pub fn split_words(name: &str) -> Vec<String> {
    let mut runs: Vec<(CharClass, Vec<char>)> = Vec::new();
    for c in name.chars() {
        let class = CharClass::of(c);
        match runs.last_mut() {
            Some((last, run)) if *last == class => run.push(c),
            _ => runs.push((class, vec![c])),
        }
    }

    // "PDFL" + "oader" -> "PDF" + "Loader"
    for i in 0..runs.len().saturating_sub(1) {
        if runs[i].0 == CharClass::Upper && runs[i + 1].0 == CharClass::Lower {
            if let Some(c) = runs[i].1.pop() {
                runs[i + 1].1.insert(0, c);
            }
        }
    }

    runs.into_iter()
        .filter(|(class, run)| *class != CharClass::Separator && !run.is_empty())
        .map(|(_, run)| run.into_iter().collect())
        .collect()
}
