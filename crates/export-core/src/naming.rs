//! Display name normalization for generated source and file names

/// Convert a display name into the identifier used as import binding and
/// file stem.
///
/// `-` and `_` act as word separators. The first word is lower-cased; every
/// following word gets an upper-case first letter with the rest untouched.
pub fn to_identifier(display_name: &str) -> String {
    let mut words = split_words(display_name);

    let Some(first) = words.next() else {
        return String::new();
    };

    let mut ident = first.to_lowercase();
    for word in words {
        let mut chars = word.chars();
        if let Some(head) = chars.next() {
            ident.extend(head.to_uppercase());
            ident.push_str(chars.as_str());
        }
    }
    ident
}

/// Lower-case, dash-joined form of a display name, used for route segments
pub fn to_slug(display_name: &str) -> String {
    split_words(display_name)
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn split_words(name: &str) -> impl Iterator<Item = &str> {
    name.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
}
