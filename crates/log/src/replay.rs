use std::collections::VecDeque;

use glam::IVec3;

/// Errors from one replay exchange.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("no response left for {url}")]
    Exhausted { url: String },
}

/// Carries one replay request to the playable endpoint and returns the
/// response text.
///
/// Exchanges are blocking. Taking `&mut self` keeps at most one exchange in
/// flight per transport; timeouts are the implementor's concern.
pub trait ReplayTransport {
    fn exchange(&mut self, url: &str, body: &str) -> Result<String, TransportError>;
}

/// Request body submitting one acceleration.
pub fn acc_request(accel: IVec3) -> String {
    format!("ACC {} {} {}", accel.x, accel.y, accel.z)
}

/// Transport answering from a queue of canned responses.
///
/// Records every request it receives, in order.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: VecDeque<Result<String, String>>,
    requests: Vec<(String, String)>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a script where responses are separated by lines of `---`.
    pub fn from_script(script: &str) -> Self {
        let mut transport = Self::new();
        let mut current = String::new();
        for line in script.lines() {
            if line.trim() == "---" {
                transport.push_response(std::mem::take(&mut current));
            } else {
                current.push_str(line);
                current.push('\n');
            }
        }
        if !current.trim().is_empty() {
            transport.push_response(current);
        }
        transport
    }

    pub fn push_response(&mut self, text: impl Into<String>) -> &mut Self {
        self.responses.push_back(Ok(text.into()));
        self
    }

    /// Queue a failed exchange.
    pub fn push_failure(&mut self, message: impl Into<String>) -> &mut Self {
        self.responses.push_back(Err(message.into()));
        self
    }

    pub fn remaining(&self) -> usize {
        self.responses.len()
    }

    /// Requests received so far as `(url, body)` pairs.
    pub fn requests(&self) -> &[(String, String)] {
        &self.requests
    }
}

impl ReplayTransport for ScriptedTransport {
    fn exchange(&mut self, url: &str, body: &str) -> Result<String, TransportError> {
        self.requests.push((url.to_string(), body.to_string()));
        match self.responses.pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(TransportError::Request {
                url: url.to_string(),
                message,
            }),
            None => Err(TransportError::Exhausted {
                url: url.to_string(),
            }),
        }
    }
}
