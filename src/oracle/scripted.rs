use std::sync::Mutex;

use crate::error::{AppError, Result};
use crate::oracle::{Oracle, OracleRequest};

/// Replays canned outcomes in order and records every request it sees.
pub struct ScriptedOracle {
    replies: Mutex<Vec<Result<String>>>,
    pub calls: Mutex<Vec<OracleRequest>>,
}

impl ScriptedOracle {
    pub fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn ok(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Oracle for ScriptedOracle {
    fn generate(&self, request: &OracleRequest) -> Result<String> {
        self.calls.lock().unwrap().push(request.clone());
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Err(AppError::OracleTransport("script exhausted".into()));
        }
        replies.remove(0)
    }
}
