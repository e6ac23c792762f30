//! Background thread for mask outline extraction.
//!
//! Requests are tagged with the region batch generation they belong to. When
//! a new batch arrives the owner calls [`OutlineTasks::begin_generation`]; the
//! worker then skips queued requests from older generations instead of
//! decoding them. Anything that still slips through is tagged, so the owner
//! can drop late results by comparing generations.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use roomlens_raster::OutlineSettings;

use super::TaskError;
use crate::mask_outline::{Highlight, extract_highlight};
use crate::model::{Generation, MaskBlob, RegionId};

/// Request to extract one region's outline.
struct OutlineRequest {
    generation: Generation,
    region_id: RegionId,
    mask: MaskBlob,
}

/// Message sent to the worker thread.
enum WorkerMessage {
    Extract(OutlineRequest),
    Shutdown,
}

/// A finished extraction.
#[derive(Debug)]
pub struct OutlineResult {
    pub generation: Generation,
    pub region_id: RegionId,
    pub highlight: Highlight,
}

/// Task group for per-region outline extraction, scoped to the live generation.
pub struct OutlineTasks {
    request_tx: Sender<WorkerMessage>,
    result_rx: Receiver<OutlineResult>,
    thread_handle: Option<JoinHandle<()>>,
    /// Generation the worker should still spend time on.
    live_generation: Arc<AtomicU64>,
    /// Requests sent but not yet answered.
    pending: HashSet<(Generation, RegionId)>,
}

impl OutlineTasks {
    /// Spawn the worker thread.
    pub fn spawn(settings: OutlineSettings) -> Result<Self, TaskError> {
        let (request_tx, request_rx) = mpsc::channel::<WorkerMessage>();
        let (result_tx, result_rx) = mpsc::channel::<OutlineResult>();
        let live_generation = Arc::new(AtomicU64::new(0));

        let worker_generation = Arc::clone(&live_generation);
        let thread_handle = thread::Builder::new()
            .name("outline-worker".to_string())
            .spawn(move || {
                log::debug!("Outline worker thread started");
                Self::thread_loop(request_rx, result_tx, worker_generation, settings);
                log::debug!("Outline worker thread exiting");
            })
            .map_err(|source| TaskError::Spawn {
                name: "outline-worker",
                source,
            })?;

        Ok(Self {
            request_tx,
            result_rx,
            thread_handle: Some(thread_handle),
            live_generation,
            pending: HashSet::new(),
        })
    }

    fn thread_loop(
        request_rx: Receiver<WorkerMessage>,
        result_tx: Sender<OutlineResult>,
        live_generation: Arc<AtomicU64>,
        settings: OutlineSettings,
    ) {
        loop {
            match request_rx.recv() {
                Ok(WorkerMessage::Extract(request)) => {
                    if request.generation != live_generation.load(Ordering::Acquire) {
                        log::trace!(
                            "Skipping outline for region {} from stale generation {}",
                            request.region_id,
                            request.generation
                        );
                        continue;
                    }
                    let highlight = extract_highlight(&request.mask, &settings);
                    let result = OutlineResult {
                        generation: request.generation,
                        region_id: request.region_id,
                        highlight,
                    };
                    if result_tx.send(result).is_err() {
                        log::warn!("Result channel closed, outline worker exiting");
                        break;
                    }
                }
                Ok(WorkerMessage::Shutdown) => break,
                // Owner dropped without a shutdown message
                Err(_) => break,
            }
        }
    }

    /// Make `generation` the only one worth computing.
    ///
    /// Pending bookkeeping for older generations is forgotten immediately;
    /// their queued requests are skipped by the worker.
    pub fn begin_generation(&mut self, generation: Generation) {
        self.live_generation.store(generation, Ordering::Release);
        self.pending.retain(|(g, _)| *g == generation);
    }

    pub fn live_generation(&self) -> Generation {
        self.live_generation.load(Ordering::Acquire)
    }

    /// Queue an extraction. Returns `false` if the same request is already in
    /// flight or the worker is gone.
    pub fn request(&mut self, generation: Generation, region_id: RegionId, mask: MaskBlob) -> bool {
        if !self.pending.insert((generation, region_id)) {
            return false;
        }
        let request = OutlineRequest {
            generation,
            region_id,
            mask,
        };
        if self.request_tx.send(WorkerMessage::Extract(request)).is_err() {
            log::error!("Failed to queue outline for region {}: worker gone", region_id);
            self.pending.remove(&(generation, region_id));
            return false;
        }
        true
    }

    /// Take one finished result without blocking.
    pub fn take_one_result(&mut self) -> Option<OutlineResult> {
        match self.result_rx.try_recv() {
            Ok(result) => {
                self.pending.remove(&(result.generation, result.region_id));
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Outline worker disconnected");
                None
            }
        }
    }

    /// Block until a result arrives or `timeout` elapses.
    pub fn wait_for_result(&mut self, timeout: Duration) -> Option<OutlineResult> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(result) => {
                self.pending.remove(&(result.generation, result.region_id));
                Some(result)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("Outline worker disconnected");
                None
            }
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, generation: Generation, region_id: RegionId) -> bool {
        self.pending.contains(&(generation, region_id))
    }
}

impl Drop for OutlineTasks {
    fn drop(&mut self) {
        // No generation matches MAX, so queued work is skipped on the way out.
        self.live_generation.store(Generation::MAX, Ordering::Release);
        let _ = self.request_tx.send(WorkerMessage::Shutdown);

        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                log::warn!("Outline worker panicked: {:?}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_image::opaque_mask_png;

    const TIMEOUT: Duration = Duration::from_secs(10);

    #[test]
    fn test_extracts_for_live_generation() {
        let mut tasks = OutlineTasks::spawn(OutlineSettings::default()).unwrap();
        tasks.begin_generation(1);
        assert!(tasks.request(1, 7, MaskBlob::from(opaque_mask_png(6, 4))));
        assert!(tasks.is_pending(1, 7));

        let result = tasks.wait_for_result(TIMEOUT).expect("no outline result");
        assert_eq!((result.generation, result.region_id), (1, 7));
        assert_eq!(result.highlight.outline().unwrap().painted_count(), 16);
        assert_eq!(tasks.pending_count(), 0);
    }

    #[test]
    fn test_duplicate_request_rejected() {
        let mut tasks = OutlineTasks::spawn(OutlineSettings::default()).unwrap();
        tasks.begin_generation(1);
        let mask = MaskBlob::from(opaque_mask_png(3, 3));
        assert!(tasks.request(1, 2, mask.clone()));
        assert!(!tasks.request(1, 2, mask));
    }

    #[test]
    fn test_stale_generation_requests_are_skipped() {
        let mut tasks = OutlineTasks::spawn(OutlineSettings::default()).unwrap();
        // Nothing queued for generation 1 may run once generation 2 is live.
        tasks.begin_generation(2);
        tasks.request(1, 1, MaskBlob::from(opaque_mask_png(5, 5)));
        tasks.request(2, 1, MaskBlob::from(opaque_mask_png(8, 8)));

        let result = tasks.wait_for_result(TIMEOUT).expect("no outline result");
        assert_eq!(result.generation, 2);
        assert_eq!(result.highlight.outline().unwrap().width(), 8);
        assert!(tasks.wait_for_result(Duration::from_millis(200)).is_none());
    }

    #[test]
    fn test_begin_generation_forgets_old_pending() {
        let mut tasks = OutlineTasks::spawn(OutlineSettings::default()).unwrap();
        tasks.begin_generation(1);
        tasks.request(1, 3, MaskBlob::from(opaque_mask_png(4, 4)));
        tasks.begin_generation(2);
        assert!(!tasks.is_pending(1, 3));
        assert_eq!(tasks.live_generation(), 2);
    }

    #[test]
    fn test_undecodable_mask_returns_raw() {
        let mut tasks = OutlineTasks::spawn(OutlineSettings::default()).unwrap();
        tasks.begin_generation(1);
        let mask = MaskBlob::from(vec![0u8; 32]);
        tasks.request(1, 9, mask.clone());
        let result = tasks.wait_for_result(TIMEOUT).expect("no outline result");
        assert_eq!(result.highlight, Highlight::RawMask(mask));
    }
}
