//! Scripted transport for unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::TransportError;
use crate::http::HttpRequest;
use crate::sink::ResponseSink;
use crate::transport::Transport;

pub(crate) enum Reply {
    Body(u16, Vec<u8>),
    Fail(String),
}

/// Replays queued replies in order and records every request it sees.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: VecDeque<Reply>,
    pub(crate) seen: Rc<RefCell<Vec<HttpRequest>>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn ok(mut self, body: &str) -> Self {
        self.replies.push_back(Reply::Body(200, body.as_bytes().to_vec()));
        self
    }

    pub(crate) fn status(mut self, status: u16, body: &str) -> Self {
        self.replies.push_back(Reply::Body(status, body.as_bytes().to_vec()));
        self
    }

    pub(crate) fn fail(mut self, message: &str) -> Self {
        self.replies.push_back(Reply::Fail(message.to_string()));
        self
    }

    pub(crate) fn requests(&self) -> Rc<RefCell<Vec<HttpRequest>>> {
        Rc::clone(&self.seen)
    }
}

impl Transport for ScriptedTransport {
    fn execute(
        &mut self,
        request: &HttpRequest,
        sink: &mut dyn ResponseSink,
    ) -> Result<u16, TransportError> {
        self.seen.borrow_mut().push(request.clone());
        match self.replies.pop_front() {
            Some(Reply::Body(status, body)) => {
                // Deliver in two chunks to exercise accumulation.
                let (head, tail) = body.split_at(body.len() / 2);
                sink.write_chunk(head).map_err(TransportError::Sink)?;
                sink.write_chunk(tail).map_err(TransportError::Sink)?;
                Ok(status)
            }
            Some(Reply::Fail(message)) => Err(TransportError::Request(message)),
            None => Err(TransportError::Request("no scripted reply".to_string())),
        }
    }
}
