/// Contiguous slice of the proposed content, applied in sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based first line
    pub start_line: usize,
    /// Inclusive last line
    pub end_line: usize,
    pub content: String,
    pub is_first: bool,
    pub is_last: bool,
}
