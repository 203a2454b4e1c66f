//! English inflection rules.
//!
//! Resource names arrive as identifiers (`customer`, `customers`,
//! `blog__post`, `LineItem`) and are turned into labels, route keys and
//! translation keys with the functions in this module. The rule tables follow
//! the conventional English inflections used by most web frameworks: regular
//! suffix rules, a handful of irregular words, and uncountable nouns whose
//! singular and plural are identical.

use std::sync::OnceLock;

use regex::Regex;

use crate::utils::text::capfirst;

/// Words whose singular and plural forms are the same.
const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "jeans",
    "police",
];

/// Irregular `(singular, plural)` pairs.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("child", "children"),
    ("sex", "sexes"),
    ("move", "moves"),
    ("zombie", "zombies"),
];

/// Plural rules, most specific first.
const PLURAL_RULES: &[(&str, &str)] = &[
    (r"(?i)(quiz)$", "${1}zes"),
    (r"(?i)^(oxen)$", "${1}"),
    (r"(?i)^(ox)$", "${1}en"),
    (r"(?i)^(m|l)ice$", "${1}ice"),
    (r"(?i)^(m|l)ouse$", "${1}ice"),
    (r"(?i)(matr|vert|ind)(?:ix|ex)$", "${1}ices"),
    (r"(?i)(x|ch|ss|sh)$", "${1}es"),
    (r"(?i)([^aeiouy]|qu)y$", "${1}ies"),
    (r"(?i)(hive)$", "${1}s"),
    (r"(?i)(?:([^f])fe|([lr])f)$", "${1}${2}ves"),
    (r"(?i)sis$", "ses"),
    (r"(?i)([ti])a$", "${1}a"),
    (r"(?i)([ti])um$", "${1}a"),
    (r"(?i)(buffal|tomat)o$", "${1}oes"),
    (r"(?i)(bu)s$", "${1}ses"),
    (r"(?i)(alias|status)$", "${1}es"),
    (r"(?i)(octop|vir)i$", "${1}i"),
    (r"(?i)(octop|vir)us$", "${1}i"),
    (r"(?i)^(ax|test)is$", "${1}es"),
    (r"(?i)s$", "s"),
    (r"$", "s"),
];

/// Singular rules, most specific first.
const SINGULAR_RULES: &[(&str, &str)] = &[
    (r"(?i)(database)s$", "${1}"),
    (r"(?i)(quiz)zes$", "${1}"),
    (r"(?i)(matr)ices$", "${1}ix"),
    (r"(?i)(vert|ind)ices$", "${1}ex"),
    (r"(?i)^(ox)en", "${1}"),
    (r"(?i)(alias|status)(es)?$", "${1}"),
    (r"(?i)(octop|vir)(us|i)$", "${1}us"),
    (r"(?i)^(a)x[ie]s$", "${1}xis"),
    (r"(?i)(cris|test)(is|es)$", "${1}is"),
    (r"(?i)(shoe)s$", "${1}"),
    (r"(?i)(o)es$", "${1}"),
    (r"(?i)(bus)(es)?$", "${1}"),
    (r"(?i)^(m|l)ice$", "${1}ouse"),
    (r"(?i)(x|ch|ss|sh)es$", "${1}"),
    (r"(?i)(m)ovies$", "${1}ovie"),
    (r"(?i)(s)eries$", "${1}eries"),
    (r"(?i)([^aeiouy]|qu)ies$", "${1}y"),
    (r"(?i)([lr])ves$", "${1}f"),
    (r"(?i)(tive)s$", "${1}"),
    (r"(?i)(hive)s$", "${1}"),
    (r"(?i)([^f])ves$", "${1}fe"),
    (r"(?i)(^analy)(sis|ses)$", "${1}sis"),
    (
        r"(?i)((a)naly|(b)a|(d)iagno|(p)arenthe|(p)rogno|(s)ynop|(t)he)(sis|ses)$",
        "${1}sis",
    ),
    (r"(?i)([ti])a$", "${1}um"),
    (r"(?i)(n)ews$", "${1}ews"),
    (r"(?i)(ss)$", "${1}"),
    (r"(?i)s$", ""),
];

fn compile(rules: &'static [(&'static str, &'static str)]) -> Vec<(Regex, &'static str)> {
    rules
        .iter()
        .filter_map(|(pattern, replacement)| {
            Regex::new(pattern).ok().map(|re| (re, *replacement))
        })
        .collect()
}

fn plural_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| compile(PLURAL_RULES))
}

fn singular_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| compile(SINGULAR_RULES))
}

/// Splits `word` into everything up to the last `_`/`/` separated segment and
/// that segment.
fn split_last_segment(word: &str) -> (&str, &str) {
    word.rfind(['_', '/'])
        .map_or(("", word), |idx| (&word[..=idx], &word[idx + 1..]))
}

/// Returns `replacement` with the first letter's case copied from `original`.
fn match_case(original: &str, replacement: &str) -> String {
    if original.chars().next().is_some_and(char::is_uppercase) {
        capfirst(replacement)
    } else {
        replacement.to_string()
    }
}

fn is_uncountable(word: &str) -> bool {
    let (_, last) = split_last_segment(word);
    let last = last.to_lowercase();
    UNCOUNTABLE.contains(&last.as_str())
}

fn apply_rules(word: &str, rules: &[(Regex, &'static str)]) -> String {
    for (re, replacement) in rules {
        if re.is_match(word) {
            return re.replace(word, *replacement).into_owned();
        }
    }
    word.to_string()
}

/// Returns the plural form of `word`.
///
/// # Examples
///
/// ```
/// use backoffice_core::utils::inflector::pluralize;
///
/// assert_eq!(pluralize("customer"), "customers");
/// assert_eq!(pluralize("category"), "categories");
/// assert_eq!(pluralize("person"), "people");
/// assert_eq!(pluralize("series"), "series");
/// assert_eq!(pluralize("customers"), "customers");
/// ```
pub fn pluralize(word: &str) -> String {
    if word.is_empty() || is_uncountable(word) {
        return word.to_string();
    }
    let (prefix, last) = split_last_segment(word);
    let lower = last.to_lowercase();
    for (singular, plural) in IRREGULAR {
        if lower == *singular || lower == *plural {
            return format!("{prefix}{}", match_case(last, plural));
        }
    }
    apply_rules(word, plural_rules())
}

/// Returns the singular form of `word`.
///
/// # Examples
///
/// ```
/// use backoffice_core::utils::inflector::singularize;
///
/// assert_eq!(singularize("customers"), "customer");
/// assert_eq!(singularize("categories"), "category");
/// assert_eq!(singularize("people"), "person");
/// assert_eq!(singularize("series"), "series");
/// assert_eq!(singularize("customer"), "customer");
/// ```
pub fn singularize(word: &str) -> String {
    if word.is_empty() || is_uncountable(word) {
        return word.to_string();
    }
    let (prefix, last) = split_last_segment(word);
    let lower = last.to_lowercase();
    for (singular, plural) in IRREGULAR {
        if lower == *singular || lower == *plural {
            return format!("{prefix}{}", match_case(last, singular));
        }
    }
    apply_rules(word, singular_rules())
}

/// Converts `CamelCase` and `Module::Name` identifiers to `snake_case` and
/// `module/name`.
pub fn underscore(word: &str) -> String {
    let word = word.replace("::", "/");
    let mut out = String::with_capacity(word.len() + 4);
    let chars: Vec<char> = word.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = prev.is_some_and(|p| {
                p.is_lowercase()
                    || p.is_ascii_digit()
                    || (p.is_uppercase() && next.is_some_and(char::is_lowercase))
            });
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else if c == '-' {
            out.push('_');
        } else {
            out.push(c);
        }
    }
    out
}

/// Converts `snake_case` and `module/name` identifiers to `CamelCase` and
/// `Module::Name`.
pub fn camelize(word: &str) -> String {
    word.split('/')
        .map(|segment| segment.split('_').map(capfirst).collect::<String>())
        .collect::<Vec<_>>()
        .join("::")
}

/// Returns the class name for a table-style identifier (`line_items` ->
/// `LineItem`).
pub fn classify(word: &str) -> String {
    camelize(&singularize(word))
}

/// Turns an attribute name into a human label (`first_name` -> `First name`,
/// `customer_id` -> `Customer`).
pub fn humanize(word: &str) -> String {
    let word = word.strip_suffix("_id").unwrap_or(word);
    let word = word.trim_start_matches('_').replace('_', " ");
    capfirst(&word.to_lowercase())
}

/// Capitalizes every word of a humanized identifier (`blog_post` ->
/// `Blog Post`).
pub fn titleize(word: &str) -> String {
    humanize(&underscore(word))
        .split(' ')
        .map(capfirst)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns the route key used for a resource's index route.
///
/// Uncountable names get an `_index` suffix so that the collection route
/// does not collide with the member route.
///
/// # Examples
///
/// ```
/// use backoffice_core::utils::inflector::route_key;
///
/// assert_eq!(route_key("customer"), "customers");
/// assert_eq!(route_key("series"), "series_index");
/// assert_eq!(route_key("blog/post"), "blog_posts");
/// ```
pub fn route_key(name: &str) -> String {
    let singular = singularize(&underscore(name)).replace('/', "_");
    let plural = pluralize(&singular);
    if plural == singular {
        format!("{plural}_index")
    } else {
        plural
    }
}
