//! One-shot background preprocessing.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use super::{ImageFile, PreparedImage, PreprocessError, PreprocessLimits, prepare_with};
use crate::state::TaskError;

/// A single upload being prepared on its own thread.
///
/// The result can be taken exactly once, by [`poll`](Self::poll) or
/// [`wait`](Self::wait).
pub struct PreprocessTask {
    name: String,
    result_rx: Receiver<Result<PreparedImage, PreprocessError>>,
    thread_handle: Option<JoinHandle<()>>,
    finished: bool,
}

impl PreprocessTask {
    pub(super) fn spawn(limits: PreprocessLimits, file: ImageFile) -> Result<Self, TaskError> {
        let (result_tx, result_rx) = mpsc::channel();
        let name = file.name.clone();

        let thread_handle = thread::Builder::new()
            .name("preprocess".to_string())
            .spawn(move || {
                let result = prepare_with(&limits, file);
                // Receiver gone means the owner lost interest.
                let _ = result_tx.send(result);
            })
            .map_err(|source| TaskError::Spawn {
                name: "preprocess",
                source,
            })?;

        log::debug!("Preprocessing {} in the background", name);
        Ok(Self {
            name,
            result_rx,
            thread_handle: Some(thread_handle),
            finished: false,
        })
    }

    /// Name of the file being prepared.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Take the result if it is ready.
    pub fn poll(&mut self) -> Option<Result<PreparedImage, PreprocessError>> {
        if self.finished {
            return None;
        }
        match self.result_rx.try_recv() {
            Ok(result) => Some(self.finish(result)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.finish(Err(PreprocessError::TaskLost))),
        }
    }

    /// Block until the result is ready.
    pub fn wait(&mut self) -> Result<PreparedImage, PreprocessError> {
        if self.finished {
            return Err(PreprocessError::TaskLost);
        }
        let result = self
            .result_rx
            .recv()
            .unwrap_or(Err(PreprocessError::TaskLost));
        self.finish(result)
    }

    fn finish(
        &mut self,
        result: Result<PreparedImage, PreprocessError>,
    ) -> Result<PreparedImage, PreprocessError> {
        self.finished = true;
        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                log::warn!("Preprocess thread for {} panicked: {:?}", self.name, e);
            }
        }
        result
    }
}
