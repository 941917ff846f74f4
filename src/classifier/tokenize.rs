use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{Alphabetic}\p{Nd}]{2,}").expect("static token regex"));

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
        "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
        "an", "and", "another", "any", "anyone", "anything", "are", "around", "as", "at",
        "be", "became", "because", "become", "been", "before", "being", "below", "beside",
        "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing", "done",
        "down", "during", "each", "either", "else", "enough", "even", "ever", "every", "few",
        "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
        "herself", "him", "himself", "his", "how", "however", "if", "in", "into", "is", "it",
        "its", "itself", "just", "least", "less", "made", "many", "may", "me", "meanwhile",
        "might", "more", "most", "much", "must", "my", "myself", "neither", "no", "nor",
        "not", "now", "of", "off", "often", "on", "once", "one", "only", "onto", "or",
        "other", "others", "our", "ours", "ourselves", "out", "over", "own", "per", "rather",
        "same", "she", "should", "since", "so", "some", "such", "than", "that", "the",
        "their", "theirs", "them", "themselves", "then", "there", "these", "they", "this",
        "those", "though", "through", "thus", "to", "too", "toward", "towards", "under",
        "until", "up", "upon", "us", "very", "via", "was", "we", "were", "what", "whatever",
        "when", "where", "whether", "which", "while", "who", "whom", "whose", "why", "will",
        "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    ]
    .into_iter()
    .collect()
});

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token)
}

/// Split text into lower-case word tokens.
///
/// Tokens are runs of at least two alphanumeric characters; stop words are
/// dropped. Training and inference share this function.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| !is_stop_word(t))
        .map(str::to_string)
        .collect()
}
