// Upload session state.
//
// The session is always in exactly one `Phase`. Each phase carries only
// the data that is meaningful in it, so combinations such as "loading and
// showing a result" cannot be represented.
//
// Analysis is split into `Session::begin_analysis`, which hands out an
// `AnalysisTicket`, and `Session::complete_analysis`, which applies the
// outcome only if the ticket still matches the request the session is
// waiting for. A response for an image the user has since reset or
// replaced is reported as `Completion::Stale` and dropped.

use std::fmt;
use std::sync::Arc;

use crate::api::Analyzer;
use crate::error::AnalysisError;
use crate::image::{ImagePayload, SelectedImage};
use crate::model::AnalysisResult;

/// Identifies one analysis request within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub enum Phase {
    #[default]
    NoImage,
    Previewing {
        image: SelectedImage,
    },
    Analyzing {
        image: SelectedImage,
        request: RequestId,
    },
    Analyzed {
        image: SelectedImage,
        request: RequestId,
        result: Arc<AnalysisResult>,
    },
    Errored {
        image: SelectedImage,
        message: &'static str,
    },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::NoImage => "no-image",
            Phase::Previewing { .. } => "previewing",
            Phase::Analyzing { .. } => "analyzing",
            Phase::Analyzed { .. } => "analyzed",
            Phase::Errored { .. } => "errored",
        }
    }
}

/// Handed out when an analysis starts; carries what the worker needs.
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    request: RequestId,
    payload: ImagePayload,
}

impl AnalysisTicket {
    pub fn request(&self) -> RequestId {
        self.request
    }

    pub fn payload(&self) -> &ImagePayload {
        &self.payload
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

#[derive(Debug, Default)]
pub struct Session {
    phase: Phase,
    last_request: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Replace whatever was selected before. Any result or error goes with
    /// it, and the previous preview is released.
    pub fn select_image(&mut self, image: SelectedImage) {
        log::info!(
            "selected {} (was {})",
            image.preview().summary(),
            self.phase.name()
        );
        self.phase = Phase::Previewing { image };
    }

    pub fn reset(&mut self) {
        log::debug!("reset from {}", self.phase.name());
        self.phase = Phase::NoImage;
    }

    /// Move to `Analyzing` and return the ticket for the request to issue.
    /// Returns `None` without touching the session when there is nothing
    /// to analyze or a request is already in flight.
    pub fn begin_analysis(&mut self) -> Option<AnalysisTicket> {
        let image = match std::mem::take(&mut self.phase) {
            Phase::Previewing { image } | Phase::Errored { image, .. } => image,
            other => {
                self.phase = other;
                return None;
            }
        };

        self.last_request += 1;
        let request = RequestId(self.last_request);
        let ticket = AnalysisTicket {
            request,
            payload: image.payload().clone(),
        };
        log::info!("starting analysis {request} for {}", image.preview().summary());
        self.phase = Phase::Analyzing { image, request };
        Some(ticket)
    }

    /// Apply the outcome of `request` if the session is still waiting for
    /// it.
    pub fn complete_analysis(
        &mut self,
        request: RequestId,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> Completion {
        let image = match std::mem::take(&mut self.phase) {
            Phase::Analyzing {
                image,
                request: waiting,
            } if waiting == request => image,
            other => {
                log::warn!(
                    "ignoring stale response for analysis {request} (session is {})",
                    other.name()
                );
                self.phase = other;
                return Completion::Stale;
            }
        };

        self.phase = match outcome {
            Ok(result) => Phase::Analyzed {
                image,
                request,
                result: Arc::new(result),
            },
            Err(err) => {
                log::error!("analysis {request} failed: {err}");
                Phase::Errored {
                    image,
                    message: err.user_message(),
                }
            }
        };
        Completion::Applied
    }

    /// Run one analysis synchronously against `analyzer`. Returns `None`
    /// when no request was issued.
    pub fn start_analysis(&mut self, analyzer: &dyn Analyzer) -> Option<Completion> {
        let ticket = self.begin_analysis()?;
        let outcome = analyzer.analyze(ticket.payload());
        Some(self.complete_analysis(ticket.request(), outcome))
    }

    pub fn image(&self) -> Option<&SelectedImage> {
        match &self.phase {
            Phase::NoImage => None,
            Phase::Previewing { image }
            | Phase::Analyzing { image, .. }
            | Phase::Analyzed { image, .. }
            | Phase::Errored { image, .. } => Some(image),
        }
    }

    pub fn result(&self) -> Option<&Arc<AnalysisResult>> {
        match &self.phase {
            Phase::Analyzed { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Request that produced the current result, used to key the reveal.
    pub fn result_request(&self) -> Option<RequestId> {
        match &self.phase {
            Phase::Analyzed { request, .. } => Some(*request),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&'static str> {
        match &self.phase {
            Phase::Errored { message, .. } => Some(*message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Analyzing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ANALYSIS_FAILED_MESSAGE;
    use crate::model::EmissionRange;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn image(name: &str) -> SelectedImage {
        SelectedImage::from_payload(ImagePayload::new(name, "image/jpeg", vec![0xffu8, 0xd8]))
    }

    fn result(total: f64) -> AnalysisResult {
        AnalysisResult {
            total_co2_kg: total,
            range: EmissionRange {
                min: total - 0.5,
                max: total + 0.5,
            },
            comparison: "Setara dengan menyalakan lampu 10 jam".into(),
            items: Vec::new(),
        }
    }

    fn server_error() -> AnalysisError {
        AnalysisError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
        }
    }

    /// Stand-in analyzer that counts calls.
    struct Scripted {
        calls: AtomicUsize,
        fail: bool,
    }

    impl Scripted {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl Analyzer for Scripted {
        fn analyze(&self, _image: &ImagePayload) -> Result<AnalysisResult, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(server_error())
            } else {
                Ok(result(2.4))
            }
        }
    }

    /// Sessions in each phase that still holds an image.
    fn sessions_in_every_phase() -> Vec<Session> {
        let mut previewing = Session::new();
        previewing.select_image(image("a.jpg"));

        let mut analyzing = Session::new();
        analyzing.select_image(image("a.jpg"));
        analyzing.begin_analysis();

        let mut analyzed = Session::new();
        analyzed.select_image(image("a.jpg"));
        analyzed.start_analysis(&Scripted::new(false));

        let mut errored = Session::new();
        errored.select_image(image("a.jpg"));
        errored.start_analysis(&Scripted::new(true));

        vec![Session::new(), previewing, analyzing, analyzed, errored]
    }

    #[test]
    fn selecting_an_image_clears_result_and_error_from_any_phase() {
        for mut session in sessions_in_every_phase() {
            session.select_image(image("b.jpg"));
            assert!(matches!(session.phase(), Phase::Previewing { .. }));
            assert!(session.result().is_none());
            assert!(session.error().is_none());
            assert!(!session.is_loading());
            assert_eq!(session.image().unwrap().payload().file_name, "b.jpg");
        }
    }

    #[test]
    fn reselecting_or_resetting_releases_the_previous_preview() {
        let mut session = Session::new();
        session.select_image(image("a.jpg"));
        let first = session.image().unwrap().preview().watch();

        session.select_image(image("b.jpg"));
        assert!(first.upgrade().is_none());
        let second = session.image().unwrap().preview().watch();
        assert!(second.upgrade().is_some());

        session.begin_analysis().unwrap();
        assert!(second.upgrade().is_some());

        session.reset();
        assert!(second.upgrade().is_none());
    }

    #[test]
    fn reset_always_returns_to_no_image() {
        for mut session in sessions_in_every_phase() {
            session.reset();
            assert!(matches!(session.phase(), Phase::NoImage));
            assert!(session.image().is_none());
            assert!(session.result().is_none());
        }
    }

    #[test]
    fn analysis_without_an_image_is_a_no_op() {
        let analyzer = Scripted::new(false);
        let mut session = Session::new();
        assert_eq!(session.start_analysis(&analyzer), None);
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
        assert!(matches!(session.phase(), Phase::NoImage));
    }

    #[test]
    fn successful_analysis_stores_the_result() {
        let analyzer = Scripted::new(false);
        let mut session = Session::new();
        session.select_image(image("a.jpg"));

        assert_eq!(session.start_analysis(&analyzer), Some(Completion::Applied));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.result().unwrap().total_co2_kg, 2.4);
        assert!(session.error().is_none());
        assert!(!session.is_loading());
        assert!(session.result_request().is_some());
    }

    #[test]
    fn failed_analysis_keeps_the_preview_and_shows_the_fixed_message() {
        let mut session = Session::new();
        session.select_image(image("a.jpg"));
        session.start_analysis(&Scripted::new(true));

        assert_eq!(session.error(), Some(ANALYSIS_FAILED_MESSAGE));
        assert!(session.result().is_none());
        assert!(!session.is_loading());
        assert!(session.image().is_some());
    }

    #[test]
    fn an_errored_session_can_retry() {
        let mut session = Session::new();
        session.select_image(image("a.jpg"));
        session.start_analysis(&Scripted::new(true));
        assert_eq!(
            session.start_analysis(&Scripted::new(false)),
            Some(Completion::Applied)
        );
        assert!(session.result().is_some());
        assert!(session.error().is_none());
    }

    #[test]
    fn only_one_request_can_be_in_flight() {
        let mut session = Session::new();
        session.select_image(image("a.jpg"));
        let first = session.begin_analysis().unwrap();
        assert!(session.is_loading());
        assert!(session.begin_analysis().is_none());
        assert_eq!(
            session.complete_analysis(first.request(), Ok(result(1.0))),
            Completion::Applied
        );
        // The result screen offers no analyze trigger either.
        assert!(session.begin_analysis().is_none());
    }

    #[test]
    fn late_response_after_reset_and_reselect_is_ignored() {
        let mut session = Session::new();
        session.select_image(image("old.jpg"));
        let old = session.begin_analysis().unwrap();

        session.reset();
        session.select_image(image("new.jpg"));
        let new = session.begin_analysis().unwrap();
        assert_ne!(old.request(), new.request());

        assert_eq!(
            session.complete_analysis(old.request(), Ok(result(9.9))),
            Completion::Stale
        );
        assert!(session.is_loading());
        assert!(session.result().is_none());

        assert_eq!(
            session.complete_analysis(new.request(), Ok(result(1.2))),
            Completion::Applied
        );
        assert_eq!(session.result().unwrap().total_co2_kg, 1.2);
        assert_eq!(session.image().unwrap().payload().file_name, "new.jpg");
    }

    #[test]
    fn late_failure_does_not_clobber_a_fresh_preview() {
        let mut session = Session::new();
        session.select_image(image("old.jpg"));
        let old = session.begin_analysis().unwrap();
        session.select_image(image("new.jpg"));

        assert_eq!(
            session.complete_analysis(old.request(), Err(server_error())),
            Completion::Stale
        );
        assert!(matches!(session.phase(), Phase::Previewing { .. }));
        assert!(session.error().is_none());
    }

    #[test]
    fn ticket_carries_the_selected_bytes() {
        let mut session = Session::new();
        session.select_image(image("a.jpg"));
        let ticket = session.begin_analysis().unwrap();
        assert_eq!(ticket.payload().file_name, "a.jpg");
        assert_eq!(&ticket.payload().bytes[..], &[0xff, 0xd8]);
    }
}
