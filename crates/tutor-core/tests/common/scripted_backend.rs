//! In-memory completion backend that replays a fixed script of outcomes.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tutor_core::remote::{CompletionBackend, CompletionPayload, CompletionRequest};
use tutor_core::retry::RemoteFailure;

pub type Outcome = Result<CompletionPayload, RemoteFailure>;

/// Returns scripted outcomes in order; the last one repeats once the script runs out.
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Outcome>>,
    last: Mutex<Option<Outcome>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Outcome>) -> Self {
        assert!(!script.is_empty(), "script needs at least one outcome");
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// `failures` copies of `failure` followed by `success`.
    pub fn failing_then(failure: RemoteFailure, failures: usize, success: &str) -> Self {
        let mut script: Vec<Outcome> = vec![Err(failure); failures];
        script.push(Ok(CompletionPayload::new(success)));
        Self::new(script)
    }

    pub fn always(outcome: Outcome) -> Self {
        Self::new(vec![outcome])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, _request: &CompletionRequest) -> Outcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(outcome) => {
                *last = Some(outcome.clone());
                outcome
            }
            None => last.clone().expect("script has at least one outcome"),
        }
    }
}

/// A valid two-question payload as the completion service would return it.
pub const TWO_QUESTIONS: &str = r#"[
  {"question": "Solve for x: 6x = 42",
   "options": {"A": "x = 6", "B": "x = 7", "C": "x = 8", "D": "x = 36"},
   "correct": "B",
   "explanation": "Divide both sides by 6: x = 7.",
   "topic": "linear_equations"},
  {"question": "Solve for x: x - 9 = 4",
   "options": {"A": "x = 5", "B": "x = -5", "C": "x = 13", "D": "x = 36"},
   "correct": "C",
   "explanation": "Add 9 to both sides: x = 13.",
   "topic": "linear_equations"}
]"#;
