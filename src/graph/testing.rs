//! Queued-response mocks for the collaborator traits

use super::traits::{Classifier, ClassifyError, Decision, Generator};
use super::GenerationError;
use crate::llm::FunctionDefinition;
use crate::message::Message;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// `Classifier` returning queued decisions in order
pub struct MockClassifier {
    responses: Mutex<VecDeque<Result<Decision, ClassifyError>>>,
    calls: Mutex<usize>,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(0),
        }
    }

    pub fn queue(&self, response: Result<Decision, ClassifyError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(
        &self,
        _system: &str,
        _history: &[Message],
        _handlers: &[FunctionDefinition],
    ) -> Result<Decision, ClassifyError> {
        *self.calls.lock().unwrap() += 1;
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no queued classification response")
    }
}

/// `Generator` returning queued completions in order
pub struct MockGenerator {
    responses: Mutex<VecDeque<Result<String, GenerationError>>>,
    calls: Mutex<usize>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(0),
        }
    }

    pub fn queue(&self, response: Result<String, GenerationError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(
        &self,
        _system: &str,
        _history: &[Message],
    ) -> Result<String, GenerationError> {
        *self.calls.lock().unwrap() += 1;
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no queued generation response")
    }
}
