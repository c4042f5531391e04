/// How far the player is through the current level or drill pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    /// Answered in this level or pass; the showing problem is not counted.
    pub answered: usize,
    /// Still to answer, including the showing problem and queued retries.
    pub remaining: usize,
    pub is_complete: bool,
}
