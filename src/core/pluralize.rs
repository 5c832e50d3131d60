//! Pluralization of relation field names
//!
//! "Many" relation fields are exposed under the plural form of their base
//! name (`subTask` → `subTasks`, `category` → `categories`). Only the tail of
//! a camelCase name is inflected, so prefixes are preserved.

/// Nouns whose plural does not follow a suffix rule
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
];

/// Nouns that are identical in singular and plural
const UNCOUNTABLE: &[&str] = &["data", "information", "equipment", "series", "species"];

/// Singular nouns ending in a lone `s` that would otherwise read as plural
const SINGULAR_S: &[&str] = &["alias", "atlas", "bias", "canvas", "gas", "lens"];

/// Utility for converting singular field names to their plural form
pub struct Pluralizer;

impl Pluralizer {
    /// Convert a singular noun to its plural form
    ///
    /// # Examples
    ///
    /// ```
    /// use this_relations::core::pluralize::Pluralizer;
    ///
    /// assert_eq!(Pluralizer::pluralize("relation"), "relations");
    /// assert_eq!(Pluralizer::pluralize("category"), "categories");
    /// assert_eq!(Pluralizer::pluralize("subTask"), "subTasks");
    /// assert_eq!(Pluralizer::pluralize("assignedPerson"), "assignedPeople");
    /// ```
    pub fn pluralize(singular: &str) -> String {
        if singular.is_empty() {
            return singular.to_string();
        }

        let (prefix, tail) = split_last_word(singular);
        let lower_tail = tail.to_lowercase();

        if UNCOUNTABLE.contains(&lower_tail.as_str()) {
            return singular.to_string();
        }

        if is_plural(&lower_tail) {
            return singular.to_string();
        }

        if let Some((_, plural)) = IRREGULAR.iter().find(|(s, _)| *s == lower_tail) {
            let inflected = if tail.starts_with(|c: char| c.is_uppercase()) {
                upper_case_first(plural)
            } else {
                plural.to_string()
            };
            return format!("{}{}", prefix, inflected);
        }

        match singular {
            // Words ending in consonant + y -> ies
            s if s.ends_with('y')
                && !s.ends_with("ay")
                && !s.ends_with("ey")
                && !s.ends_with("iy")
                && !s.ends_with("oy")
                && !s.ends_with("uy")
                && s.len() > 1 =>
            {
                format!("{}ies", &s[..s.len() - 1])
            }

            // Words ending in s, sh, ch, x, z -> es
            s if s.ends_with('s')
                || s.ends_with("sh")
                || s.ends_with("ch")
                || s.ends_with('x')
                || s.ends_with('z') =>
            {
                format!("{}es", s)
            }

            // Words ending in fe -> ves
            s if s.ends_with("fe") && s.len() > 2 => {
                format!("{}ves", &s[..s.len() - 2])
            }

            // Words ending in lf -> ves (shelf, wolf)
            s if s.ends_with("lf") => {
                format!("{}ves", &s[..s.len() - 1])
            }

            // Consonant + o -> es, with common exceptions
            s if s.ends_with('o') && s.len() > 1 => {
                let before_o = s[..s.len() - 1].chars().last().unwrap_or('a');
                if matches!(before_o, 'a' | 'e' | 'i' | 'o' | 'u') {
                    format!("{}s", s)
                } else {
                    match lower_tail.as_str() {
                        "photo" | "piano" | "halo" | "memo" | "todo" => format!("{}s", s),
                        _ => format!("{}es", s),
                    }
                }
            }

            // Default: just add s
            s => format!("{}s", s),
        }
    }
}

/// Already plural: an irregular plural, or a trailing `s` that is not part
/// of a singular ending (`class`, `status`, `analysis`)
///
/// Other singular nouns ending in a lone `s` are only recognized through
/// `SINGULAR_S`; anything missing from it is left as is.
fn is_plural(word: &str) -> bool {
    if IRREGULAR.iter().any(|(_, plural)| *plural == word) {
        return true;
    }
    !SINGULAR_S.contains(&word)
        && word.len() > 2
        && word.ends_with('s')
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
}

/// Lower-case the first character of a name (`SubTask` → `subTask`)
pub fn lower_case_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Upper-case the first character of a name (`subTask` → `SubTask`)
pub fn upper_case_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Split a camelCase name before its last upper-case letter
fn split_last_word(name: &str) -> (&str, &str) {
    match name.rfind(|c: char| c.is_uppercase()) {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => ("", name),
    }
}
