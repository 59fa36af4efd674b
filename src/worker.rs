// Background analysis: one thread per request, replies over a channel the
// UI keeps for its whole lifetime. A worker that dies without replying is
// noticed through its join handle, so the session never stays loading.

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::api::Analyzer;
use crate::error::AnalysisError;
use crate::model::AnalysisResult;
use crate::session::{AnalysisTicket, Completion, RequestId, Session};

pub type AnalysisOutcome = (RequestId, Result<AnalysisResult, AnalysisError>);

pub struct AnalysisWorker {
    request: RequestId,
    handle: JoinHandle<()>,
}

impl AnalysisWorker {
    pub fn spawn<A>(analyzer: A, ticket: AnalysisTicket, outcomes: Sender<AnalysisOutcome>) -> Self
    where
        A: Analyzer + 'static,
    {
        let request = ticket.request();
        let handle = thread::spawn(move || {
            let outcome = analyzer.analyze(ticket.payload());
            // The receiver lives as long as the menu; a send error only
            // means the user already quit.
            let _ = outcomes.send((ticket.request(), outcome));
        });
        Self { request, handle }
    }

    pub fn request(&self) -> RequestId {
        self.request
    }

    /// Wait up to `timeout` for a reply and hand it to the session. Returns
    /// `true` once the session is no longer waiting on this worker.
    pub fn settle(
        &self,
        session: &mut Session,
        outcomes: &Receiver<AnalysisOutcome>,
        timeout: Duration,
    ) -> bool {
        match outcomes.recv_timeout(timeout) {
            Ok((id, outcome)) => return session.complete_analysis(id, outcome) == Completion::Applied,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                session.complete_analysis(self.request, Err(AnalysisError::WorkerStopped));
                return true;
            }
        }

        if !self.handle.is_finished() {
            return false;
        }
        // A worker sends before it exits, so its reply is queued by now
        // unless it panicked.
        while let Ok((id, outcome)) = outcomes.try_recv() {
            if session.complete_analysis(id, outcome) == Completion::Applied {
                return true;
            }
        }
        log::error!("analysis worker for {} exited without a reply", self.request);
        session.complete_analysis(self.request, Err(AnalysisError::WorkerStopped));
        true
    }
}
