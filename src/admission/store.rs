//! Request store
//!
//! Owns the uploaded payloads and the per-request state machine. One record
//! exists per request id from upload until the reaper deletes it; status only
//! moves forward: queued, then processing, then completed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::AppError;
use crate::ocr::TextBox;

use super::notifiers::LiveNotifierSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Queued,
    Processing,
    Completed,
}

struct RequestRecord {
    status: RequestStatus,
    /// Raw upload, present until processing begins.
    payload: Option<Bytes>,
    /// Set exactly once, at the processing -> completed transition.
    result: Option<Vec<TextBox>>,
    created_at: Instant,
}

#[derive(Clone, Default)]
pub struct RequestStore {
    inner: Arc<Mutex<HashMap<Uuid, RequestRecord>>>,
}

impl RequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly uploaded request with status queued.
    pub fn create(&self, id: Uuid, payload: Bytes) {
        let mut records = self.inner.lock();
        records.insert(
            id,
            RequestRecord {
                status: RequestStatus::Queued,
                payload: Some(payload),
                result: None,
                created_at: Instant::now(),
            },
        );
    }

    pub fn status(&self, id: Uuid) -> Option<RequestStatus> {
        self.inner.lock().get(&id).map(|record| record.status)
    }

    pub fn result(&self, id: Uuid) -> Option<Vec<TextBox>> {
        self.inner.lock().get(&id).and_then(|record| record.result.clone())
    }

    /// Flip a queued request to processing and take its payload.
    ///
    /// The check-and-flip happens under one lock, so of two concurrent calls
    /// on the same id exactly one wins; the loser fails with
    /// `AlreadyProcessing`. An unknown id and an already-completed id fail
    /// uniformly with `NotFoundOrExpired`.
    pub fn begin_processing(&self, id: Uuid) -> Result<Bytes, AppError> {
        let mut records = self.inner.lock();
        let record = records
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFoundOrExpired(id.to_string()))?;

        match record.status {
            RequestStatus::Processing => Err(AppError::AlreadyProcessing(id.to_string())),
            RequestStatus::Completed => Err(AppError::NotFoundOrExpired(id.to_string())),
            RequestStatus::Queued => {
                record.status = RequestStatus::Processing;
                record
                    .payload
                    .take()
                    .ok_or_else(|| AppError::Internal(format!("queued request {id} has no payload")))
            }
        }
    }

    /// Flip a processing request to completed and store its result.
    pub fn complete(&self, id: Uuid, boxes: Vec<TextBox>) -> Result<(), AppError> {
        let mut records = self.inner.lock();
        let record = records
            .get_mut(&id)
            .ok_or_else(|| AppError::Internal(format!("completing unknown request {id}")))?;

        if record.status != RequestStatus::Processing {
            return Err(AppError::Internal(format!(
                "completing request {id} that is not processing"
            )));
        }

        record.status = RequestStatus::Completed;
        record.result = Some(boxes);
        Ok(())
    }

    /// Delete a record unconditionally.
    pub fn remove(&self, id: Uuid) -> bool {
        self.inner.lock().remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Ids eligible for reaping: queued or completed, unobserved by any live
    /// notifier, and older than the grace window. Processing records are
    /// never eligible.
    pub fn reapable(&self, notifiers: &LiveNotifierSet, grace: Duration) -> Vec<Uuid> {
        let records = self.inner.lock();
        records
            .iter()
            .filter(|(id, record)| is_reapable(**id, record, notifiers, grace))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Delete a record only if it is still reapable.
    ///
    /// Eligibility is re-checked under the same lock that deletes, so a
    /// request admitted to processing after a [`reapable`](Self::reapable)
    /// snapshot was taken is left alone.
    pub fn remove_if_reapable(
        &self,
        id: Uuid,
        notifiers: &LiveNotifierSet,
        grace: Duration,
    ) -> bool {
        let mut records = self.inner.lock();
        match records.get(&id) {
            Some(record) if is_reapable(id, record, notifiers, grace) => {
                records.remove(&id);
                true
            }
            _ => false,
        }
    }
}

fn is_reapable(
    id: Uuid,
    record: &RequestRecord,
    notifiers: &LiveNotifierSet,
    grace: Duration,
) -> bool {
    matches!(
        record.status,
        RequestStatus::Queued | RequestStatus::Completed
    ) && !notifiers.contains(id)
        && record.created_at.elapsed() >= grace
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> Bytes {
        Bytes::from_static(b"image bytes")
    }

    #[test]
    fn processing_takes_the_payload() {
        let store = RequestStore::new();
        let id = Uuid::new_v4();
        store.create(id, payload());

        let taken = store.begin_processing(id).unwrap();
        assert_eq!(taken, payload());
        assert_eq!(store.status(id), Some(RequestStatus::Processing));
    }

    #[test]
    fn second_begin_processing_conflicts() {
        let store = RequestStore::new();
        let id = Uuid::new_v4();
        store.create(id, payload());

        store.begin_processing(id).unwrap();
        let second = store.begin_processing(id);
        assert!(matches!(second, Err(AppError::AlreadyProcessing(_))));
        assert_eq!(store.status(id), Some(RequestStatus::Processing));
    }

    #[test]
    fn completed_request_is_treated_as_expired() {
        let store = RequestStore::new();
        let id = Uuid::new_v4();
        store.create(id, payload());

        store.begin_processing(id).unwrap();
        store.complete(id, vec![]).unwrap();

        let again = store.begin_processing(id);
        assert!(matches!(again, Err(AppError::NotFoundOrExpired(_))));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let store = RequestStore::new();
        let result = store.begin_processing(Uuid::new_v4());
        assert!(matches!(result, Err(AppError::NotFoundOrExpired(_))));
    }

    #[test]
    fn complete_requires_processing_status() {
        let store = RequestStore::new();
        let id = Uuid::new_v4();
        store.create(id, payload());

        let result = store.complete(id, vec![]);
        assert!(matches!(result, Err(AppError::Internal(_))));
        assert_eq!(store.status(id), Some(RequestStatus::Queued));
    }

    #[test]
    fn concurrent_begin_processing_has_one_winner() {
        let store = RequestStore::new();
        let id = Uuid::new_v4();
        store.create(id, payload());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.begin_processing(id).is_ok())
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
    }

    #[test]
    fn reapable_skips_processing_and_observed_records() {
        let store = RequestStore::new();
        let notifiers = LiveNotifierSet::new();

        let queued = Uuid::new_v4();
        let observed = Uuid::new_v4();
        let processing = Uuid::new_v4();
        store.create(queued, payload());
        store.create(observed, payload());
        store.create(processing, payload());
        store.begin_processing(processing).unwrap();

        let _guard = notifiers.register(observed);

        let eligible = store.reapable(&notifiers, Duration::ZERO);
        assert_eq!(eligible, vec![queued]);
    }

    #[test]
    fn record_admitted_after_eligibility_snapshot_is_not_removed() {
        let store = RequestStore::new();
        let notifiers = LiveNotifierSet::new();
        let id = Uuid::new_v4();
        store.create(id, payload());

        // Snapshot taken while the record is still queued and unobserved.
        let eligible = store.reapable(&notifiers, Duration::ZERO);
        assert_eq!(eligible, vec![id]);

        // The request is admitted to processing before the deletion runs.
        store.begin_processing(id).unwrap();

        assert!(!store.remove_if_reapable(id, &notifiers, Duration::ZERO));
        assert_eq!(store.status(id), Some(RequestStatus::Processing));
        store.complete(id, vec![]).unwrap();
    }

    #[test]
    fn remove_if_reapable_deletes_stale_records() {
        let store = RequestStore::new();
        let notifiers = LiveNotifierSet::new();
        let id = Uuid::new_v4();
        store.create(id, payload());

        assert!(store.remove_if_reapable(id, &notifiers, Duration::ZERO));
        assert!(store.is_empty());
        assert!(!store.remove_if_reapable(id, &notifiers, Duration::ZERO));
    }

    #[test]
    fn reapable_honors_the_grace_window() {
        let store = RequestStore::new();
        let notifiers = LiveNotifierSet::new();
        store.create(Uuid::new_v4(), payload());

        assert!(store.reapable(&notifiers, Duration::from_secs(60)).is_empty());
        assert_eq!(store.reapable(&notifiers, Duration::ZERO).len(), 1);
    }
}
