//! Simulated download lifecycle

mod item;
mod manager;

pub use item::{create_download_item, estimate_total_bytes, DownloadItem, SizeClass};
pub use manager::{DownloadManager, InstallSink};
