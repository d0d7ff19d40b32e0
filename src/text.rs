//! Tokenization helpers shared by every stage.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use unicode_normalization::UnicodeNormalization;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\w']+").expect("word pattern"));

static EMOJI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{1F300}-\x{1FAD6}\x{1F900}-\x{1F9FF}\x{2600}-\x{27BF}]").expect("emoji pattern")
});

/// Raw word matches, original casing.
pub fn words(text: &str) -> Vec<&str> {
    WORD_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// NFC-normalized, lowercased word tokens.
pub fn lower_words(text: &str) -> Vec<String> {
    words(text)
        .into_iter()
        .map(|w| w.nfc().collect::<String>().to_lowercase())
        .collect()
}

/// Lowercased tokens longer than two characters that are not stop words.
pub fn content_tokens(text: &str, stopwords: &BTreeSet<String>) -> Vec<String> {
    lower_words(text)
        .into_iter()
        .filter(|t| t.chars().count() > 2 && !stopwords.contains(t))
        .collect()
}

/// Split after `.`, `!` or `?` when followed by whitespace; empty pieces dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let text = text.trim();
    let mut out = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut iter = text.char_indices().peekable();

    while let Some((i, c)) = iter.next() {
        if c.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            let piece = text[start..i].trim();
            if !piece.is_empty() {
                out.push(piece);
            }
            // swallow the whole whitespace run
            let mut next_start = i + c.len_utf8();
            while let Some(&(j, ws)) = iter.peek() {
                if !ws.is_whitespace() {
                    break;
                }
                next_start = j + ws.len_utf8();
                iter.next();
            }
            start = next_start;
            prev = None;
            continue;
        }
        prev = Some(c);
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

pub fn count_emojis(text: &str) -> usize {
    EMOJI_RE.find_iter(text).count()
}

pub fn has_emoji(text: &str) -> bool {
    EMOJI_RE.is_match(text)
}

/// True when any character (newlines aside) repeats `min_run` times in a row.
pub fn has_repeated_run(text: &str, min_run: usize) -> bool {
    let mut run = 0usize;
    let mut last: Option<char> = None;
    for c in text.chars() {
        if c == '\n' {
            last = None;
            run = 0;
            continue;
        }
        if Some(c) == last {
            run += 1;
        } else {
            last = Some(c);
            run = 1;
        }
        if run >= min_run {
            return true;
        }
    }
    false
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn pstdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mu = mean(values);
    let var = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentences_split_on_terminal_punctuation_and_space() {
        assert_eq!(split_sentences("Fai questo! Funziona?"), vec!["Fai questo!", "Funziona?"]);
        assert_eq!(split_sentences("  v1.2 is out.  Really\n\nyes "), vec!["v1.2 is out.", "Really\n\nyes"]);
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn content_tokens_drop_short_and_stop_words() {
        let stop: BTreeSet<String> = ["con".to_string()].into_iter().collect();
        assert_eq!(content_tokens("Io vado CON l'amico al mare", &stop), vec!["vado", "l'amico", "mare"]);
    }

    #[test]
    fn repeated_run_needs_three_in_a_row() {
        assert!(has_repeated_run("siiii", 3));
        assert!(!has_repeated_run("aa\na", 3));
        assert!(!has_repeated_run("abab", 3));
    }

    #[test]
    fn emoji_ranges() {
        assert_eq!(count_emojis("ciao 🔥🔥 ☀"), 3);
        assert!(!has_emoji("plain text"));
    }

    #[test]
    fn population_stdev() {
        assert_eq!(pstdev(&[0.0, 0.0, 1.0, 1.0]), 0.5);
        assert_eq!(pstdev(&[3.0]), 0.0);
    }
}
