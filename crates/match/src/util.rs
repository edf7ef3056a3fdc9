use std::collections::HashMap;

/// Uppercase and keep only `A-Z`, `0-9` and CJK/Hangul/kana characters.
///
/// OCR output differs from the catalog mostly in spacing and punctuation,
/// so both sides are reduced to this dense key before scoring.
pub fn normalize_key(s: &str) -> String {
    s.chars()
        .flat_map(char::to_uppercase)
        .filter(|&c| c.is_ascii_uppercase() || c.is_ascii_digit() || is_cjk(c))
        .collect()
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{1100}'..='\u{11FF}'   // Hangul Jamo
        | '\u{3040}'..='\u{30FF}' // Hiragana, Katakana
        | '\u{3130}'..='\u{318F}' // Hangul compatibility Jamo
        | '\u{3400}'..='\u{4DBF}' // CJK extension A
        | '\u{4E00}'..='\u{9FFF}' // CJK unified ideographs
        | '\u{AC00}'..='\u{D7A3}' // Hangul syllables
        | '\u{F900}'..='\u{FAFF}' // CJK compatibility ideographs
    )
}

/// Sørensen–Dice coefficient over character bigrams, in `[0.0, 1.0]`.
///
/// Whitespace is ignored. Identical strings score 1.0; strings shorter than
/// two characters score 0.0 unless identical.
pub fn bigram_similarity(s1: &str, s2: &str) -> f64 {
    let a: Vec<char> = s1.chars().filter(|c| !c.is_whitespace()).collect();
    let b: Vec<char> = s2.chars().filter(|c| !c.is_whitespace()).collect();

    if a == b {
        return 1.0;
    }
    if a.len() < 2 || b.len() < 2 {
        return 0.0;
    }

    let mut pool: HashMap<(char, char), usize> = HashMap::with_capacity(a.len());
    for w in a.windows(2) {
        *pool.entry((w[0], w[1])).or_default() += 1;
    }

    // Each bigram of `a` can be consumed once.
    let mut shared = 0usize;
    for w in b.windows(2) {
        if let Some(n) = pool.get_mut(&(w[0], w[1])) {
            if *n > 0 {
                *n -= 1;
                shared += 1;
            }
        }
    }

    (2 * shared) as f64 / (a.len() + b.len() - 2) as f64
}
