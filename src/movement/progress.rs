/// Sink for intermediate position snapshots during incremental motion.
///
/// Invoked synchronously from inside a move; implementations decide whether
/// the snapshot goes anywhere.
pub trait ProgressReporter: Send {
    fn report(&mut self, snapshot: &str);
}

impl<F> ProgressReporter for F
where
    F: FnMut(&str) + Send,
{
    fn report(&mut self, snapshot: &str) {
        self(snapshot)
    }
}

/// Reporter used when the caller has nowhere to send progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&mut self, _snapshot: &str) {}
}

/// Collects every snapshot; handy for callers that only need them afterwards.
#[derive(Debug, Default, Clone)]
pub struct CollectProgress {
    pub snapshots: Vec<String>,
}

impl ProgressReporter for CollectProgress {
    fn report(&mut self, snapshot: &str) {
        self.snapshots.push(snapshot.to_string());
    }
}
