// src/sanitize.rs
//! Subject key sanitizer: canonical `[a-z0-9_-]` alphabet.

/// Lower-case the input and replace every character outside `[a-z0-9_-]`
/// with `-`. Total; empty input yields an empty key.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '_' | '-' => c,
            _ => '-',
        })
        .collect()
}
