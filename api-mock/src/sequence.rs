//! Scripted multi-call endpoints
//!
//! A [`ResponseSequence`] answers the Nth call with the Nth scripted step,
//! which keeps "fail twice, then succeed" style endpoints explicit and
//! inspectable instead of hiding a counter inside a closure.

use crate::envelope::{build_response, ApiCode};
use crate::error::{MockError, Result};
use crate::routing::Handler;
use crate::types::{ApiRequest, ApiResponse};
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};

/// One scripted answer
#[derive(Debug, Clone)]
pub enum SequenceStep {
    Respond {
        status: u16,
        code: ApiCode,
        message: Option<String>,
        data: Option<Value>,
    },
    /// Simulated transport failure
    Fail(String),
}

/// What happens once every step has been used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhenExhausted {
    RepeatLast,
    Fail,
}

/// Position of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    /// The next call receives step `n` (0-based)
    AtStep(usize),
    /// Every step was used; `calls` counts all calls so far
    Exhausted { calls: usize },
}

#[derive(Debug)]
pub struct ResponseSequence {
    steps: Vec<SequenceStep>,
    calls: Mutex<usize>,
    when_exhausted: WhenExhausted,
}

impl Default for ResponseSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseSequence {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            calls: Mutex::new(0),
            when_exhausted: WhenExhausted::Fail,
        }
    }

    /// Append an envelope response
    #[must_use]
    pub fn respond<C: Into<ApiCode>>(
        mut self,
        status: u16,
        code: C,
        message: Option<&str>,
        data: Option<Value>,
    ) -> Self {
        self.steps.push(SequenceStep::Respond {
            status,
            code: code.into(),
            message: message.map(str::to_string),
            data,
        });
        self
    }

    /// Append a 200 `Success` response
    #[must_use]
    pub fn success(self, data: Option<Value>) -> Self {
        self.respond(200, ApiCode::Success, None, data)
    }

    /// Append a 409 `Conflict` response
    #[must_use]
    pub fn conflict(self) -> Self {
        self.respond(
            409,
            ApiCode::Conflict,
            Some("The resource was modified concurrently"),
            None,
        )
    }

    /// Append a simulated transport failure
    #[must_use]
    pub fn fail<S: Into<String>>(mut self, message: S) -> Self {
        self.steps.push(SequenceStep::Fail(message.into()));
        self
    }

    /// Keep answering with the last step after the script runs out
    #[must_use]
    pub fn repeat_last(mut self) -> Self {
        self.when_exhausted = WhenExhausted::RepeatLast;
        self
    }

    /// Number of calls answered so far
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SequenceState {
        let calls = self.calls();
        if calls < self.steps.len() {
            SequenceState::AtStep(calls)
        } else {
            SequenceState::Exhausted { calls }
        }
    }

    fn next_step(&self) -> Option<SequenceStep> {
        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        let index = *calls;
        *calls += 1;

        match self.steps.get(index) {
            Some(step) => Some(step.clone()),
            None if self.when_exhausted == WhenExhausted::RepeatLast => self.steps.last().cloned(),
            None => None,
        }
    }

    /// Answer a request with the next scripted step
    pub fn answer(&self, request: &ApiRequest) -> Result<ApiResponse> {
        match self.next_step() {
            Some(SequenceStep::Respond {
                status,
                code,
                message,
                data,
            }) => build_response(request, status, code, message.as_deref(), data),
            Some(SequenceStep::Fail(message)) => Err(MockError::transport(message)),
            None => Err(MockError::general(format!(
                "Response sequence for {} {} exhausted after {} steps",
                request.method,
                request.path(),
                self.steps.len()
            ))),
        }
    }
}

impl Handler {
    /// Answer requests routed here from a scripted sequence
    pub fn then_sequence(&self, sequence: Arc<ResponseSequence>) -> Self {
        self.then_call(move |request| sequence.answer(request))
    }
}
