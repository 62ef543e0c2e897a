use std::collections::VecDeque;
use std::sync::{mpsc, Arc};

use super::{AssetLoader, AssetSource, AttachCompletion};
use crate::error::AssetAttachError;
use crate::viewer::ViewerKey;

/// Loads each asset on its own short-lived worker thread.
///
/// Workers only produce values; results travel back over a channel and are
/// applied by whoever polls, on the polling thread.
pub struct ThreadedAssetSource<L> {
    loader: Arc<L>,
    completion_tx: mpsc::Sender<AttachCompletion>,
    completion_rx: mpsc::Receiver<AttachCompletion>,
    in_flight: usize,
}

impl<L: AssetLoader + 'static> ThreadedAssetSource<L> {
    /// Source backed by `loader`.
    #[must_use]
    pub fn new(loader: L) -> Self {
        let (completion_tx, completion_rx) = mpsc::channel();
        Self {
            loader: Arc::new(loader),
            completion_tx,
            completion_rx,
            in_flight: 0,
        }
    }

    /// Requests whose results have not been polled yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

impl<L: AssetLoader + 'static> AssetSource for ThreadedAssetSource<L> {
    fn request(&mut self, key: ViewerKey, path: &str) {
        let loader = Arc::clone(&self.loader);
        let tx = self.completion_tx.clone();
        let owned_path = path.to_owned();

        let spawned = std::thread::Builder::new()
            .name(format!("asset-loader-{}", key.slot()))
            .spawn(move || {
                let result = loader.load(&owned_path);
                // The receiver is gone once the source is dropped; the
                // result is simply discarded then.
                let _ = tx.send(AttachCompletion {
                    key,
                    path: owned_path,
                    result,
                });
            });

        self.in_flight += 1;
        if let Err(e) = spawned {
            log::warn!("failed to spawn loader thread for {path}: {e}");
            let _ = self.completion_tx.send(AttachCompletion {
                key,
                path: path.to_owned(),
                result: Err(AssetAttachError::Unreachable {
                    path: path.to_owned(),
                    message: format!("failed to spawn loader thread: {e}"),
                }),
            });
        }
    }

    fn poll(&mut self) -> Option<AttachCompletion> {
        let completion = self.completion_rx.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(completion)
    }
}

/// Loads synchronously inside [`request`](AssetSource::request) and queues
/// the result for the next [`poll`](AssetSource::poll).
///
/// For hosts without threads. The caller still observes the completion
/// out of band, never from inside `request`.
pub struct InlineAssetSource<L> {
    loader: L,
    ready: VecDeque<AttachCompletion>,
}

impl<L: AssetLoader> InlineAssetSource<L> {
    /// Source backed by `loader`.
    #[must_use]
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            ready: VecDeque::new(),
        }
    }
}

impl<L: AssetLoader> AssetSource for InlineAssetSource<L> {
    fn request(&mut self, key: ViewerKey, path: &str) {
        let result = self.loader.load(path);
        self.ready.push_back(AttachCompletion {
            key,
            path: path.to_owned(),
            result,
        });
    }

    fn poll(&mut self) -> Option<AttachCompletion> {
        self.ready.pop_front()
    }
}
