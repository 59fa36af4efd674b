// Character-by-character reveal of the comparison sentence.
//
// `Typewriter` is the pure state machine: one character per tick, done
// after exactly as many ticks as the text has characters. `RevealTask`
// drives it from a timer thread, and `TypewriterPresenter` makes sure at
// most one task is alive. Every event a task sends is tagged with the
// request id of the result it belongs to; the presenter drops events that
// do not match the current one, so two texts can never interleave.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::session::RequestId;

/// Pacing used by the result screen.
pub const DEFAULT_TICK: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Revealed(char),
    Finished,
}

#[derive(Debug, Clone, Default)]
pub struct Typewriter {
    source: Vec<char>,
    revealed: String,
    position: usize,
}

impl Typewriter {
    pub fn new(text: &str) -> Self {
        Self {
            source: text.chars().collect(),
            revealed: String::with_capacity(text.len()),
            position: 0,
        }
    }

    pub fn tick(&mut self) -> Tick {
        match self.source.get(self.position) {
            Some(&ch) => {
                self.revealed.push(ch);
                self.position += 1;
                Tick::Revealed(ch)
            }
            None => Tick::Finished,
        }
    }

    pub fn revealed(&self) -> &str {
        &self.revealed
    }

    pub fn is_done(&self) -> bool {
        self.position >= self.source.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealEvent {
    Char { key: RequestId, ch: char },
    Done { key: RequestId },
}

/// A running reveal. Dropping it cancels the timer and joins its thread.
pub struct RevealTask {
    key: RequestId,
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl RevealTask {
    pub fn spawn(key: RequestId, text: &str, period: Duration, events: Sender<RevealEvent>) -> Self {
        let (cancel, cancelled) = mpsc::channel::<()>();
        let mut typewriter = Typewriter::new(text);

        let handle = thread::spawn(move || {
            while !typewriter.is_done() {
                // Any message or a dropped sender means cancel.
                match cancelled.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                }
                if let Tick::Revealed(ch) = typewriter.tick() {
                    if events.send(RevealEvent::Char { key, ch }).is_err() {
                        return;
                    }
                }
            }
            let _ = events.send(RevealEvent::Done { key });
        });

        Self {
            key,
            cancel: Some(cancel),
            handle: Some(handle),
        }
    }

    pub fn key(&self) -> RequestId {
        self.key
    }

    pub fn cancel(&mut self) {
        self.cancel.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("reveal timer for {} panicked", self.key);
            }
        }
    }
}

impl Drop for RevealTask {
    fn drop(&mut self) {
        if self.handle.is_some() {
            log::debug!("cancelling reveal timer for {}", self.key);
            self.cancel();
        }
    }
}

/// Owns the revealed prefix shown on the result screen and the single
/// timer producing it.
pub struct TypewriterPresenter {
    period: Duration,
    sender: Sender<RevealEvent>,
    events: Receiver<RevealEvent>,
    task: Option<RevealTask>,
    current: Option<RequestId>,
    revealed: String,
    done: bool,
}

impl TypewriterPresenter {
    pub fn new(period: Duration) -> Self {
        let (sender, events) = mpsc::channel();
        Self {
            period,
            sender,
            events,
            task: None,
            current: None,
            revealed: String::new(),
            done: true,
        }
    }

    /// Start revealing `text` for the result produced by `key`, cancelling
    /// any reveal still in progress.
    pub fn present(&mut self, key: RequestId, text: &str) {
        self.stop();
        self.current = Some(key);
        self.done = text.is_empty();
        if !self.done {
            self.task = Some(RevealTask::spawn(key, text, self.period, self.sender.clone()));
        }
    }

    /// Back to idle with nothing revealed.
    pub fn clear(&mut self) {
        self.stop();
        self.current = None;
        self.done = true;
    }

    /// Key of the result being presented, if any.
    pub fn current(&self) -> Option<RequestId> {
        self.current
    }

    pub fn revealed(&self) -> &str {
        &self.revealed
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Apply every event already queued. Returns whether the revealed text
    /// changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.events.try_recv() {
                Ok(event) => changed |= self.apply(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return changed,
            }
        }
    }

    /// Block up to `timeout` for the next event, then drain the rest.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        if self.done {
            return false;
        }
        match self.events.recv_timeout(timeout) {
            Ok(event) => {
                let changed = self.apply(event);
                self.poll() || changed
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    fn apply(&mut self, event: RevealEvent) -> bool {
        match event {
            RevealEvent::Char { key, ch } if Some(key) == self.current => {
                self.revealed.push(ch);
                true
            }
            RevealEvent::Done { key } if Some(key) == self.current => {
                self.done = true;
                self.task = None;
                false
            }
            _ => false,
        }
    }

    fn stop(&mut self) {
        if let Some(mut task) = self.task.take() {
            log::debug!("superseding reveal for {}", task.key());
            task.cancel();
        }
        // Anything still queued belongs to the task just stopped.
        while self.events.try_recv().is_ok() {}
        self.revealed.clear();
    }
}

impl Drop for TypewriterPresenter {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn key(n: u64) -> RequestId {
        RequestId::new(n)
    }

    fn run_until_done(presenter: &mut TypewriterPresenter) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !presenter.is_done() {
            assert!(Instant::now() < deadline, "reveal never finished");
            presenter.wait(Duration::from_millis(50));
        }
    }

    #[test]
    fn reveals_full_text_after_exactly_n_ticks() {
        let text = "Setara 5 km";
        let mut typewriter = Typewriter::new(text);
        let n = text.chars().count();
        for i in 1..=n {
            assert!(!typewriter.is_done());
            assert!(matches!(typewriter.tick(), Tick::Revealed(_)));
            assert_eq!(typewriter.revealed().chars().count(), i);
        }
        assert!(typewriter.is_done());
        assert_eq!(typewriter.revealed(), text);
        assert_eq!(typewriter.tick(), Tick::Finished);
        assert_eq!(typewriter.revealed(), text);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let mut typewriter = Typewriter::new("CO₂e 🌍");
        let mut ticks = 0;
        while let Tick::Revealed(_) = typewriter.tick() {
            ticks += 1;
        }
        assert_eq!(ticks, 6);
        assert_eq!(typewriter.revealed(), "CO₂e 🌍");
    }

    #[test]
    fn empty_text_is_done_immediately() {
        let mut typewriter = Typewriter::new("");
        assert!(typewriter.is_done());
        assert_eq!(typewriter.tick(), Tick::Finished);
    }

    #[test]
    fn timer_reveals_the_whole_text_then_stops() {
        let mut presenter = TypewriterPresenter::new(Duration::from_millis(1));
        presenter.present(key(1), "Hemat energi");
        run_until_done(&mut presenter);
        assert_eq!(presenter.revealed(), "Hemat energi");

        thread::sleep(Duration::from_millis(20));
        assert!(!presenter.poll());
        assert_eq!(presenter.revealed(), "Hemat energi");
    }

    #[test]
    fn task_sends_one_event_per_character_then_done() {
        let (tx, rx) = mpsc::channel();
        let k = key(1);
        let task = RevealTask::spawn(k, "abc", Duration::from_millis(1), tx);
        let events: Vec<_> = rx.iter().take(4).collect();
        drop(task);
        assert_eq!(
            events,
            vec![
                RevealEvent::Char { key: k, ch: 'a' },
                RevealEvent::Char { key: k, ch: 'b' },
                RevealEvent::Char { key: k, ch: 'c' },
                RevealEvent::Done { key: k },
            ]
        );
    }

    #[test]
    fn new_result_restarts_the_reveal_without_mixing_texts() {
        let mut presenter = TypewriterPresenter::new(Duration::from_millis(2));
        presenter.present(key(1), "xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx");
        presenter.wait(Duration::from_millis(100));
        assert!(!presenter.revealed().is_empty());

        presenter.present(key(2), "yyyy");
        assert_eq!(presenter.revealed(), "");
        run_until_done(&mut presenter);
        assert_eq!(presenter.revealed(), "yyyy");
    }

    #[test]
    fn events_for_other_keys_are_ignored() {
        let mut presenter = TypewriterPresenter::new(Duration::from_secs(60));
        presenter.present(key(2), "zz");
        presenter
            .sender
            .send(RevealEvent::Char { key: key(1), ch: 'x' })
            .unwrap();
        assert!(!presenter.poll());
        assert_eq!(presenter.revealed(), "");
    }

    #[test]
    fn clear_cancels_and_empties() {
        let mut presenter = TypewriterPresenter::new(Duration::from_millis(1));
        presenter.present(key(1), "abcdef");
        presenter.clear();
        assert_eq!(presenter.current(), None);
        assert_eq!(presenter.revealed(), "");
        assert!(presenter.is_done());
        thread::sleep(Duration::from_millis(10));
        assert!(!presenter.poll());
    }

    #[test]
    fn empty_comparison_needs_no_timer() {
        let mut presenter = TypewriterPresenter::new(DEFAULT_TICK);
        presenter.present(key(1), "");
        assert!(presenter.is_done());
        assert_eq!(presenter.revealed(), "");
    }
}
