#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStats {
    pub word_count: usize,
    pub char_count: usize,
}

impl TextStats {
    /// Count words and characters in the current text.
    ///
    /// Words are maximal runs of non-whitespace; characters are Unicode
    /// scalar values, whitespace included. Empty or whitespace-only text
    /// has zero words.
    pub fn of(text: &str) -> Self {
        Self {
            word_count: text.split_whitespace().count(),
            char_count: text.chars().count(),
        }
    }
}
