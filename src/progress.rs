use serde::Serialize;

/// Progress of a single build download.
///
/// `Indeterminate` is reported once the archive is on disk and extraction starts,
/// and is the implicit state when the server sends no `Content-Length`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum DownloadProgress {
    Percent(f64), // 0.0..=100.0
    Indeterminate,
}

impl DownloadProgress {
    pub fn percent(&self) -> Option<f64> {
        match self {
            DownloadProgress::Percent(p) => Some(*p),
            DownloadProgress::Indeterminate => None,
        }
    }
}

/// Turns byte counts into monotonic, bounded percentages.
#[derive(Debug, Clone)]
pub struct PercentTracker {
    total_bytes: Option<u64>,
    read_bytes: u64,
    last: f64,
}

impl PercentTracker {
    pub fn new(total_bytes: Option<u64>) -> Self {
        Self {
            total_bytes: total_bytes.filter(|t| *t > 0),
            read_bytes: 0,
            last: 0.0,
        }
    }

    /// Records a chunk and returns the percentage to report, if the total is known.
    pub fn advance(&mut self, chunk_len: usize) -> Option<DownloadProgress> {
        self.read_bytes = self.read_bytes.saturating_add(chunk_len as u64);
        let total = self.total_bytes?;
        let pct = (self.read_bytes as f64 / total as f64 * 100.0).clamp(0.0, 100.0);
        self.last = self.last.max(pct);
        Some(DownloadProgress::Percent(self.last))
    }

    pub fn read_bytes(&self) -> u64 {
        self.read_bytes
    }
}
