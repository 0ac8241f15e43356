use std::sync::Mutex;

use basira::error::{AppError, Result};
use basira::oracle::{Oracle, OracleRequest};

/// Replays canned replies in order and records every request.
pub struct ScriptedOracle {
    replies: Mutex<Vec<Result<String>>>,
    pub calls: Mutex<Vec<OracleRequest>>,
}

#[allow(dead_code)]
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
            return Err(AppError::OracleTransport("no scripted reply left".into()));
        }
        replies.remove(0)
    }
}
