//! Text normalization and tokenization.
//!
//! Every comparison key in Codex (entity names, aliases, queries) passes
//! through [`Normalize`], so two spellings that differ only in case,
//! punctuation, spacing or common diacritics compare equal.

/// Characters removed during normalization.
///
/// Space and `+` are listed here too; [`Normalize`] can keep them.
const BLANK: &[char] = &[
    '(', ' ', ')', '\'', '"', '-', '~', '_', '.', '&', '?', '!', '%', '$', '—', '’', '@', '+',
    '/', '\\', '·', ':', ',', '|', 'ω', 'θ', '*', '}', '{', ';',
];

/// Percent-escapes left behind by wiki-style catalog keys (already lowercased).
const ESCAPES: &[(&str, &str)] = &[
    ("%27", ""),
    ("%22", ""),
    ("%c3%a1", "a"),
    ("%c3%ad", "i"),
    ("%c3%ba", "u"),
    ("%c3%a7", "c"),
    ("%c3%a9", "e"),
];

/// Folds an accented letter to its base form.
fn fold(ch: char) -> Option<&'static str> {
    Some(match ch {
        'é' => "e",
        'ð' => "d",
        'á' | 'ä' => "a",
        'ö' | 'ó' | 'ø' | 'ò' => "o",
        'ý' => "y",
        'þ' => "p",
        'ú' | 'ù' => "u",
        'í' => "i",
        'æ' => "ae",
        'ñ' => "n",
        _ => return None,
    })
}

/// Normalization settings.
///
/// ```
/// use codex_foundation::Normalize;
///
/// assert_eq!(Normalize::new().apply("Marth (Hero)"), "marthhero");
/// assert_eq!(Normalize::new().keep_space().apply("Líf  Hero"), "lif  hero");
/// assert_eq!(Normalize::new().apply("Killing Edge+"), "killingedge+");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Normalize {
    /// Keep every `+` in place instead of isolating the trailing run.
    pub keep_plus: bool,
    /// Keep spaces instead of removing them.
    pub keep_space: bool,
}

impl Normalize {
    /// Default settings: spaces removed, trailing `+` run preserved.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            keep_plus: false,
            keep_space: false,
        }
    }

    /// Keeps every `+` character.
    #[must_use]
    pub const fn keep_plus(mut self) -> Self {
        self.keep_plus = true;
        self
    }

    /// Keeps space characters.
    #[must_use]
    pub const fn keep_space(mut self) -> Self {
        self.keep_space = true;
        self
    }

    /// Normalizes `text`.
    ///
    /// - Lower-cases the input
    /// - Sets aside a trailing run of `+` (unless `keep_plus`)
    /// - Decodes percent-escapes, removes punctuation, folds diacritics
    /// - Re-appends the `+` run when anything else survived, then trims
    #[must_use]
    pub fn apply(self, text: &str) -> String {
        let mut text = text.to_lowercase();

        let mut plus = 0;
        if !self.keep_plus {
            while text.len() > 1 && text.ends_with('+') {
                text.pop();
                plus += 1;
            }
        }

        for (from, to) in ESCAPES {
            if text.contains(from) {
                text = text.replace(from, to);
            }
        }

        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            let kept = (ch == '+' && self.keep_plus) || (ch == ' ' && self.keep_space);
            if !kept && BLANK.contains(&ch) {
                continue;
            }
            match fold(ch) {
                Some(base) => out.push_str(base),
                None => out.push(ch),
            }
        }

        // A lone `+` run is noise, not a suffix.
        if plus > 0 && !out.trim().is_empty() {
            out.extend(std::iter::repeat_n('+', plus));
        }

        out.trim().to_string()
    }
}

/// Normalizes `text` with default settings.
#[must_use]
pub fn normalize(text: &str) -> String {
    Normalize::new().apply(text)
}

/// Splits text on single spaces, dropping empty tokens.
///
/// ```
/// use codex_foundation::tokenize;
///
/// assert_eq!(tokenize("  marth   -str+5 "), vec!["marth", "-str+5"]);
/// ```
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(' ')
        .map(str::trim)
        .filter(|word| !word.is_empty())
        .map(String::from)
        .collect()
}

/// Splits text on `separator`, trimming pieces and dropping empty ones.
#[must_use]
pub fn split_list(text: &str, separator: char) -> Vec<String> {
    text.split(separator)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(String::from)
        .collect()
}

/// True for a bare level word: digits, optionally joined by `/`.
///
/// ```
/// use codex_foundation::is_level_run;
///
/// assert!(is_level_run("40"));
/// assert!(is_level_run("5/5"));
/// assert!(!is_level_run("lvl40"));
/// ```
#[must_use]
pub fn is_level_run(word: &str) -> bool {
    word.chars().any(|ch| ch.is_ascii_digit()) && word.chars().all(|ch| ch.is_ascii_digit() || ch == '/')
}
