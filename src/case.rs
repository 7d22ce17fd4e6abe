//! Identifier conversion for resource names: type identifier -> plural -> URL-safe token.

/// Irregular plurals matched on the lower-cased final word.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("foot", "feet"),
    ("tooth", "teeth"),
];

/// Words with identical singular and plural.
const UNCOUNTABLE: &[&str] = &["data", "equipment", "information", "metadata", "news", "series", "sheep", "species"];

/// Pluralize the last word of an identifier with simple English rules.
/// e.g. "BlogPost" -> "BlogPosts", "Category" -> "Categories", "Box" -> "Boxes"
pub fn pluralize(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let split = last_word_start(s);
    let (head, word) = s.split_at(split);
    let lower = word.to_lowercase();

    if UNCOUNTABLE.contains(&lower.as_str()) {
        return s.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == lower) {
        return format!("{}{}", head, match_case(word, plural));
    }

    let mut out = s.to_string();
    if lower.ends_with('y') && !ends_with_vowel_y(&lower) {
        out.pop();
        out.push_str(suffix_case(word, "ies"));
    } else if ["s", "x", "z", "ch", "sh"].iter().any(|end| lower.ends_with(end)) {
        out.push_str(suffix_case(word, "es"));
    } else {
        out.push_str(suffix_case(word, "s"));
    }
    out
}

/// Convert an identifier to lower-case kebab form, keeping acronyms together.
/// e.g. "BlogPosts" -> "blog-posts", "HTTPRequests" -> "http-requests", "user_roles" -> "user-roles"
pub fn to_kebab_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == ' ' || c == '-' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map(|n| n.is_lowercase()).unwrap_or(false);
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && !out.ends_with('-') {
                out.push('-');
            }
        }
        out.extend(c.to_lowercase());
    }
    out.trim_end_matches('-').to_string()
}

/// Convert a kebab-case token to snake_case (table names).
pub fn kebab_to_snake(s: &str) -> String {
    s.replace('-', "_")
}

/// Canonical resource name for a bare type identifier: pluralize, then kebab-ify.
pub fn resource_name(type_ident: &str) -> String {
    to_kebab_case(&pluralize(type_ident))
}

/// Last path segment of a Rust type name, without generic arguments.
/// e.g. "my_app::models::BlogPost" -> "BlogPost"
pub fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

fn last_word_start(s: &str) -> usize {
    let chars: Vec<(usize, char)> = s.char_indices().collect();
    for i in (1..chars.len()).rev() {
        let (idx, c) = chars[i];
        let prev = chars[i - 1].1;
        if prev == '_' || prev == '-' {
            return idx;
        }
        if c.is_uppercase() && prev.is_lowercase() {
            return idx;
        }
    }
    0
}

fn ends_with_vowel_y(lower: &str) -> bool {
    let mut rev = lower.chars().rev();
    rev.next();
    matches!(rev.next(), Some('a' | 'e' | 'i' | 'o' | 'u'))
}

/// Acronym-style words (all upper-case) take upper-case suffixes.
fn suffix_case(word: &str, suffix: &'static str) -> &'static str {
    let all_upper = word.len() > 1 && word.chars().all(|c| !c.is_alphabetic() || c.is_uppercase());
    if all_upper {
        match suffix {
            "ies" => "IES",
            "es" => "ES",
            _ => "S",
        }
    } else {
        suffix
    }
}

fn match_case(word: &str, plural: &str) -> String {
    let mut chars = plural.chars();
    match (word.chars().next(), chars.next()) {
        (Some(w), Some(p)) if w.is_uppercase() => p.to_uppercase().chain(chars).collect(),
        _ => plural.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pluralizes_common_endings() {
        assert_eq!(pluralize("Post"), "Posts");
        assert_eq!(pluralize("Category"), "Categories");
        assert_eq!(pluralize("Day"), "Days");
        assert_eq!(pluralize("Box"), "Boxes");
        assert_eq!(pluralize("Address"), "Addresses");
        assert_eq!(pluralize("Match"), "Matches");
        assert_eq!(pluralize("BlogPost"), "BlogPosts");
    }

    #[test]
    fn pluralizes_irregular_last_word() {
        assert_eq!(pluralize("Person"), "People");
        assert_eq!(pluralize("SalesPerson"), "SalesPeople");
        assert_eq!(pluralize("Child"), "Children");
        assert_eq!(pluralize("Metadata"), "Metadata");
    }

    #[test]
    fn kebab_case_splits_words_and_acronyms() {
        assert_eq!(to_kebab_case("BlogPosts"), "blog-posts");
        assert_eq!(to_kebab_case("HTTPRequests"), "http-requests");
        assert_eq!(to_kebab_case("user_roles"), "user-roles");
        assert_eq!(to_kebab_case("Users"), "users");
        assert_eq!(to_kebab_case("Oauth2Tokens"), "oauth2-tokens");
    }

    #[test]
    fn resource_names() {
        assert_eq!(resource_name("User"), "users");
        assert_eq!(resource_name("BlogPost"), "blog-posts");
        assert_eq!(resource_name("Category"), "categories");
        assert_eq!(resource_name("APIKey"), "api-keys");
    }

    #[test]
    fn short_type_names() {
        assert_eq!(short_type_name("my_app::models::BlogPost"), "BlogPost");
        assert_eq!(short_type_name("crate::Wrapper<crate::Inner>"), "Wrapper");
        assert_eq!(short_type_name("Plain"), "Plain");
    }
}
