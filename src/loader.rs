//! Background asset loading.
//!
//! `gltf::import` runs on a spawned thread; the parsed document and
//! buffer data cross back over a channel that the frame loop polls.
//! The poll site is the only place the loaded asset is first touched.

use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;

/// A parsed glTF file, images discarded.
pub struct GltfAsset {
    pub document: gltf::Document,
    pub buffers: Vec<gltf::buffer::Data>,
}

pub struct AssetLoader {
    receiver: Receiver<anyhow::Result<GltfAsset>>,
}

impl AssetLoader {
    /// Starts loading immediately. The result is delivered through
    /// [`Self::poll`] at most once.
    pub fn spawn(path: PathBuf) -> Self {
        let (sender, receiver) = channel();

        thread::spawn(move || {
            log::debug!("Loading model from {}", path.display());

            let result = gltf::import(&path)
                .map(|(document, buffers, _images)| GltfAsset { document, buffers })
                .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", path.display(), e));

            // The receiver may be gone if the window closed first.
            let _ = sender.send(result);
        });

        Self { receiver }
    }

    /// Non-blocking check for the load result. Returns `None` while
    /// the load is still in flight (or after the result was taken).
    pub fn poll(&mut self) -> Option<anyhow::Result<GltfAsset>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_asset_reports_an_error_instead_of_panicking() {
        let mut loader = AssetLoader::spawn(PathBuf::from("does/not/exist.gltf"));

        // The worker finishes quickly for a missing file; wait for it.
        let result = loop {
            if let Some(result) = loader.poll() {
                break result;
            }
            thread::yield_now();
        };

        assert!(result.is_err());
    }

    #[test]
    fn test_result_is_delivered_at_most_once() {
        let mut loader = AssetLoader::spawn(PathBuf::from("does/not/exist.gltf"));

        while loader.poll().is_none() {
            thread::yield_now();
        }

        assert!(loader.poll().is_none());
    }
}
