/// Configuration options for the literate source filter.
///
/// # Examples
///
/// ```rust
/// use gelstage::{LiterateOptions, LiterateReader};
///
/// let options = LiterateOptions {
///     marker: b'|',
///     ..Default::default()
/// };
/// let reader = LiterateReader::with_options(&b"|x\n"[..], options);
/// ```
///
/// # Default
///
/// `marker` is `b'>'` and `scratch_capacity` is 128 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiterateOptions {
    /// Byte that marks a line as code when it is the first byte of the line.
    ///
    /// The marker itself is dropped; the rest of the line, including its
    /// line terminator, is copied through. Every other line is prose and is
    /// discarded.
    ///
    /// # Default
    ///
    /// `b'>'`
    pub marker: u8,

    /// Initial size of the scratch buffer the filter reads its source into.
    ///
    /// A pull asking for more bytes than this grows the scratch to the
    /// requested size, so this only bounds the size of the first reads.
    ///
    /// # Default
    ///
    /// `128`
    pub scratch_capacity: usize,
}

impl Default for LiterateOptions {
    fn default() -> Self {
        Self {
            marker: b'>',
            scratch_capacity: 128,
        }
    }
}
