//! Stop-word tables.
//!
//! Two layers, merged once into a static set on first use:
//!
//! 1. Standard English function words.
//! 2. Ticket filler: courtesy phrases, greetings and request boilerplate that
//!    show up in nearly every support message and carry no topic signal.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Layer 1: standard English stop words.
const ENGLISH: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "ain", "all", "am", "an",
    "and", "any", "are", "aren", "aren't", "as", "at", "be", "because", "been",
    "before", "being", "below", "between", "both", "but", "by", "can", "couldn",
    "couldn't", "d", "did", "didn", "didn't", "do", "does", "doesn", "doesn't",
    "doing", "don", "don't", "down", "during", "each", "few", "for", "from",
    "further", "had", "hadn", "hadn't", "has", "hasn", "hasn't", "have", "haven",
    "haven't", "having", "he", "her", "here", "hers", "herself", "him", "himself",
    "his", "how", "i", "if", "in", "into", "is", "isn", "isn't", "it", "it's",
    "its", "itself", "just", "ll", "m", "ma", "me", "mightn", "mightn't", "more",
    "most", "mustn", "mustn't", "my", "myself", "needn", "needn't", "no", "nor",
    "not", "now", "o", "of", "off", "on", "once", "only", "or", "other", "our",
    "ours", "ourselves", "out", "over", "own", "re", "s", "same", "shan",
    "shan't", "she", "she's", "should", "should've", "shouldn", "shouldn't", "so",
    "some", "such", "t", "than", "that", "that'll", "the", "their", "theirs",
    "them", "themselves", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "until", "up", "ve", "very", "was", "wasn",
    "wasn't", "we", "were", "weren", "weren't", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "won", "won't", "wouldn",
    "wouldn't", "y", "you", "you'd", "you'll", "you're", "you've", "your",
    "yours", "yourself", "yourselves",
];

/// Layer 2: support-ticket filler.
const TICKET_FILLER: &[&str] = &[
    "able", "accordingly", "almost", "along", "already", "also", "another",
    "asked", "came", "cannot", "come", "consider", "dear", "done", "enable",
    "following", "give", "given", "hello", "hence", "hereby", "herewith", "hey",
    "however", "instead", "kind", "kindly", "know", "like", "madam", "made",
    "make", "making", "many", "mention", "much", "need", "needful", "obtain",
    "obtained", "please", "provided", "regard", "regarding", "regards",
    "related", "required", "said", "sent", "shall", "since", "sir", "soon",
    "still", "take", "taken", "takes", "taking", "team", "thank", "thanking",
    "thanks", "thankyou", "therefore", "till", "towards", "user", "want",
    "whereas", "whether", "within", "without", "whose", "would",
];

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    ENGLISH
        .iter()
        .chain(TICKET_FILLER.iter())
        .copied()
        .collect()
});

/// Whether `token` (already lower-cased) is in the English + ticket stop list.
pub(crate) fn is_english_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_layers_present() {
        assert!(is_english_stop_word("the"));
        assert!(is_english_stop_word("kindly"));
        assert!(is_english_stop_word("cannot"));
        assert!(!is_english_stop_word("password"));
        assert!(!is_english_stop_word("invoice"));
    }
}
