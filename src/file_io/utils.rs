// File I/O - Utilities
use std::collections::HashSet;

/// Sanitize a filename to be safe for filesystem use
pub fn sanitize_filename(name: &str) -> String {
    let sanitized = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .trim_matches('.')
        .to_string();

    if sanitized.is_empty() {
        "untitled".to_string()
    } else {
        sanitized
    }
}

/// First free name among `stem`, `stem_2`, `stem_3`, ... and mark it used
pub fn unique_stem(stem: &str, used: &mut HashSet<String>) -> String {
    let base = sanitize_filename(stem);
    let mut candidate = base.clone();
    let mut n = 2;

    while !used.insert(candidate.to_lowercase()) {
        candidate = format!("{}_{}", base, n);
        n += 1;
    }

    candidate
}
