//! Application state management

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::admission::{AdmissionQueue, LiveNotifierSet, RequestStore};
use crate::config::Config;
use crate::ocr::{OcrAdapter, TextDetector};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    store: RequestStore,
    queue: AdmissionQueue,
    notifiers: LiveNotifierSet,
    /// Bounds simultaneous OCR invocations; waiters are served in FIFO order.
    ocr_slots: Semaphore,
    adapter: OcrAdapter,
}

impl AppState {
    /// Create application state around a detection engine.
    ///
    /// The detector is injected so tests can substitute a stub for the real
    /// model-backed engine.
    pub fn new(config: Config, detector: Arc<dyn TextDetector>) -> Self {
        let adapter = OcrAdapter::new(detector, &config.ocr);
        let ocr_slots = Semaphore::new(config.queue.concurrency);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store: RequestStore::new(),
                queue: AdmissionQueue::new(),
                notifiers: LiveNotifierSet::new(),
                ocr_slots,
                adapter,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn store(&self) -> &RequestStore {
        &self.inner.store
    }

    pub fn queue(&self) -> &AdmissionQueue {
        &self.inner.queue
    }

    pub fn notifiers(&self) -> &LiveNotifierSet {
        &self.inner.notifiers
    }

    pub fn ocr_slots(&self) -> &Semaphore {
        &self.inner.ocr_slots
    }

    pub fn adapter(&self) -> &OcrAdapter {
        &self.inner.adapter
    }
}
