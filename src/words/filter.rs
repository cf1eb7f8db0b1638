/// Stop words, stored the way they look after punctuation stripping.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "the", "it", "them", "their", "those", "us", "you", "i", "they", "in", "on",
    "with", "at", "under", "over", "above", "below", "we", "by", "to", "that", "can", "cant",
    "who", "are", "only", "now", "him", "her", "from", "he", "she", "for", "every", "so", "our",
    "of", "yours", "all", "was", "will", "is", "having", "as", "up", "down", "out", "after", "not",
    "be", "my", "rt", "this", "or", "nor", "these", "off", "his", "its", "because", "no", "amp",
    "ur", "me", "how", "has", "have", "into",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Lowercased map key.
    pub key: String,
    /// Original casing, punctuation removed.
    pub display: String,
}

fn is_stripped_punctuation(c: char) -> bool {
    // '#' survives so hashtags reach the elimination check
    (c.is_ascii_punctuation() && c != '#')
        || matches!(
            c,
            '\u{00A1}'
                | '\u{00AB}'
                | '\u{00B7}'
                | '\u{00BB}'
                | '\u{00BF}'
                | '\u{2010}'..='\u{2027}'
                | '\u{2030}'..='\u{205E}'
                | '\u{3001}'..='\u{3003}'
        )
}

pub fn strip_punctuation(token: &str) -> String {
    token.chars().filter(|&c| !is_stripped_punctuation(c)).collect()
}

/// Map key for a raw word: punctuation stripped, lowercased.
pub fn normalize(word: &str) -> String {
    strip_punctuation(word.trim()).to_lowercase()
}

/// True when `word` should not become an entry. Case-insensitive and total:
/// the empty string is eliminated too.
pub fn is_eliminated(word: &str) -> bool {
    let word = word.to_lowercase();
    word.is_empty()
        || word.parse::<i64>().is_ok()
        || word.starts_with('#')
        || word.starts_with("http")
        || STOP_WORDS.contains(&word.as_str())
}

/// Whitespace-delimited tokens of `message` that survive the filter.
pub fn tokenize(message: &str) -> impl Iterator<Item = Token> + '_ {
    message.split_whitespace().filter_map(|raw| {
        let display = strip_punctuation(raw);
        let key = display.to_lowercase();
        if is_eliminated(&key) {
            None
        } else {
            Some(Token { key, display })
        }
    })
}
