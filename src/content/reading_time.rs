//! Reading time estimate

use lazy_static::lazy_static;
use regex::Regex;

use super::post::ContentGroup;
use super::richtext::as_text;

/// Average reading rate
pub const WORDS_PER_MINUTE: usize = 200;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").unwrap();
}

/// Split text into word tokens on whitespace; punctuation is kept
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Word tokens of a body text: every character that is neither a word
/// character nor whitespace is removed before splitting
pub fn body_tokens(text: &str) -> Vec<String> {
    NON_WORD
        .replace_all(text, "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Every word of the content in document order: each heading split on
/// whitespace, followed by the sanitized words of its body
pub fn content_words(content: &[ContentGroup]) -> Vec<String> {
    let mut words = Vec::new();
    for group in content {
        words.extend(tokenize(&group.heading).into_iter().map(str::to_string));
        words.extend(body_tokens(&as_text(&group.body)));
    }
    words
}

/// Minutes needed to read `word_count` words, rounded up; `None` when there
/// is nothing to read
pub fn minutes_for(word_count: usize) -> Option<u32> {
    if word_count == 0 {
        return None;
    }
    Some(word_count.div_ceil(WORDS_PER_MINUTE) as u32)
}

/// Reading time of a post body; `None` when the post has no content
pub fn reading_time(content: Option<&[ContentGroup]>) -> Option<u32> {
    minutes_for(content_words(content?).len())
}
