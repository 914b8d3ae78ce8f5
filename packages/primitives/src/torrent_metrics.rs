use derive_more::Constructor;

/// Aggregate metrics for all torrents in the tracker, used by the
/// diagnostic status page.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Constructor)]
pub struct TorrentsMetrics {
    /// Total number of seeders across all torrents.
    pub complete: u64,
    /// Total number of leechers across all torrents.
    pub incomplete: u64,
    /// Total number of torrents with at least one peer.
    pub torrents: u64,
}

impl TorrentsMetrics {
    /// Total number of peers across all torrents.
    #[must_use]
    pub fn peers(&self) -> u64 {
        self.complete + self.incomplete
    }
}
