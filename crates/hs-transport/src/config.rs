/// Configuration for ring links.
///
/// ```rust
/// use hs_transport::LinkConfig;
///
/// let config = LinkConfig::new().max_frame_size(4096);
/// assert_eq!(config.frame_limit(), 4096);
/// ```
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Largest frame a link accepts, in bytes.
    pub(crate) max_frame_size: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkConfig {
    /// Create a new config with defaults (64 KiB frames).
    pub fn new() -> Self {
        Self {
            max_frame_size: 64 * 1024,
        }
    }

    /// Set the largest accepted frame size.
    pub fn max_frame_size(mut self, bytes: usize) -> Self {
        self.max_frame_size = bytes;
        self
    }

    pub fn frame_limit(&self) -> usize {
        self.max_frame_size
    }
}
