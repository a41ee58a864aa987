use std::sync::mpsc::Sender;
use std::thread;

use tracing::debug;

use crate::error::Result;

/// Lifecycle of one view's data.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

/// Identifies the request a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Holds a view's state and accepts only the newest request's result.
///
/// Every `begin` bumps the generation; a completion carrying an older ticket
/// is discarded, so a slow response can never overwrite a newer one.
#[derive(Debug)]
pub struct Presenter<T> {
    name: &'static str,
    generation: u64,
    state: FetchState<T>,
}

impl<T> Presenter<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            generation: 0,
            state: FetchState::Idle,
        }
    }

    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.state = FetchState::Loading;
        debug!(view = self.name, generation = self.generation, "request started");
        Ticket(self.generation)
    }

    /// Store a result. Returns false when the ticket is stale.
    pub fn complete(&mut self, ticket: Ticket, result: Result<T>) -> bool {
        if ticket.0 != self.generation {
            debug!(
                view = self.name,
                stale = ticket.0,
                current = self.generation,
                "discarding stale response"
            );
            return false;
        }
        self.state = match result {
            Ok(data) => FetchState::Ready(data),
            Err(e) => FetchState::Failed(e.to_string()),
        };
        true
    }

    /// Drop whatever is shown and ignore anything still in flight.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = FetchState::Idle;
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, FetchState::Loading)
    }
}

#[cfg(test)]
impl<T> Presenter<T> {
    pub fn data(&self) -> Option<&T> {
        match &self.state {
            FetchState::Ready(data) => Some(data),
            _ => None,
        }
    }
}

/// Run `job` on a worker thread and post its result, tagged with `ticket`.
pub fn spawn_job<M, T, F, W>(tx: &Sender<M>, ticket: Ticket, job: F, wrap: W)
where
    M: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
    W: FnOnce(Ticket, Result<T>) -> M + Send + 'static,
{
    let tx = tx.clone();
    thread::spawn(move || {
        let result = job();
        // The receiver is gone once the dashboard has exited.
        let _ = tx.send(wrap(ticket, result));
    });
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;
    use crate::error::PainelError;

    #[test]
    fn test_begin_sets_loading() {
        let mut p: Presenter<u32> = Presenter::new("test");
        assert_eq!(p.state(), &FetchState::Idle);
        p.begin();
        assert!(p.is_loading());
    }

    #[test]
    fn test_latest_request_wins() {
        let mut p: Presenter<&str> = Presenter::new("test");
        let first = p.begin();
        let second = p.begin();

        assert!(p.complete(second, Ok("new")));
        assert!(!p.complete(first, Ok("old")));
        assert_eq!(p.data(), Some(&"new"));
    }

    #[test]
    fn test_stale_response_while_loading_is_ignored() {
        let mut p: Presenter<&str> = Presenter::new("test");
        let first = p.begin();
        let _second = p.begin();
        assert!(!p.complete(first, Ok("old")));
        assert!(p.is_loading());
    }

    #[test]
    fn test_failure_keeps_message() {
        let mut p: Presenter<u32> = Presenter::new("test");
        let t = p.begin();
        assert!(p.complete(t, Err(PainelError::Other("sem conexão".into()))));
        assert_eq!(p.state(), &FetchState::Failed("sem conexão".into()));
        assert_eq!(p.data(), None);
    }

    #[test]
    fn test_reset_invalidates_in_flight() {
        let mut p: Presenter<u32> = Presenter::new("test");
        let t = p.begin();
        p.reset();
        assert!(!p.complete(t, Ok(1)));
        assert_eq!(p.state(), &FetchState::Idle);
    }

    #[test]
    fn test_spawn_job_posts_tagged_result() {
        let (tx, rx) = mpsc::channel();
        let mut p: Presenter<u32> = Presenter::new("test");
        let ticket = p.begin();
        spawn_job(&tx, ticket, || Ok(42), |t, r| (t, r));

        let (t, r) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(t, ticket);
        assert!(p.complete(t, r));
        assert_eq!(p.data(), Some(&42));
    }
}
