/*!
 * Confirmation Gate
 * Single-slot pending-confirmation state machine
 *
 * Idle is both the initial state and the state between requests. A request
 * moves the gate to AwaitingConfirmation; the next resolved input moves it
 * back to Idle.
 */

use std::fmt;
use tracing::{debug, warn};

use super::state::MessageSink;
use crate::config::CONFIRMATION_TOKEN;

/// Callback run with the payload and the session context
pub type ConfirmCallback<P, C> = Box<dyn FnOnce(P, &mut C)>;

/// A prompt, its payload and what to do on each answer
pub struct ConfirmationRequest<P, C> {
    prompt: Vec<String>,
    payload: P,
    on_confirm: ConfirmCallback<P, C>,
    on_cancel: Option<ConfirmCallback<P, C>>,
}

impl<P, C> ConfirmationRequest<P, C> {
    pub fn new<F>(prompt: Vec<String>, payload: P, on_confirm: F) -> Self
    where
        F: FnOnce(P, &mut C) + 'static,
    {
        Self {
            prompt,
            payload,
            on_confirm: Box::new(on_confirm),
            on_cancel: None,
        }
    }

    pub fn on_cancel<F>(mut self, on_cancel: F) -> Self
    where
        F: FnOnce(P, &mut C) + 'static,
    {
        self.on_cancel = Some(Box::new(on_cancel));
        self
    }

    pub fn prompt(&self) -> &[String] {
        &self.prompt
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    fn cancel(self, ctx: &mut C)
    where
        C: MessageSink,
    {
        match self.on_cancel {
            Some(on_cancel) => on_cancel(self.payload, ctx),
            None => ctx.append_message("Operation cancelled."),
        }
    }
}

/// Outcome of `ConfirmationGate::request`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The gate is now awaiting an answer
    Pending,
    /// Another request was already pending; this one was cancelled
    Rejected,
}

/// Outcome of `ConfirmationGate::resolve`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing was pending; the input belongs to someone else
    NotHandled,
    Confirmed,
    Cancelled,
}

/// Guards destructive operations behind an explicit "YES"
pub struct ConfirmationGate<P, C> {
    pending: Option<ConfirmationRequest<P, C>>,
}

impl<P, C> Default for ConfirmationGate<P, C> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<P, C> fmt::Debug for ConfirmationGate<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.pending.is_some() {
            "awaiting_confirmation"
        } else {
            "idle"
        };
        f.debug_struct("ConfirmationGate")
            .field("state", &state)
            .finish()
    }
}

impl<P, C: MessageSink> ConfirmationGate<P, C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a request is waiting for an answer
    #[inline]
    pub fn is_awaiting(&self) -> bool {
        self.pending.is_some()
    }

    /// Place a request on the gate
    ///
    /// If one is already pending the new request is cancelled right away and
    /// the pending one is left untouched.
    pub fn request(&mut self, request: ConfirmationRequest<P, C>, ctx: &mut C) -> RequestOutcome {
        if self.pending.is_some() {
            warn!("confirmation already pending, rejecting new request");
            request.cancel(ctx);
            return RequestOutcome::Rejected;
        }

        for line in &request.prompt {
            ctx.append_message(line);
        }
        ctx.append_message(&format!("Type '{}' to confirm.", CONFIRMATION_TOKEN));
        self.pending = Some(request);
        debug!("awaiting confirmation");
        RequestOutcome::Pending
    }

    /// Answer the pending request
    ///
    /// Only the exact token confirms; any other input cancels.
    pub fn resolve(&mut self, input: &str, ctx: &mut C) -> Resolution {
        let Some(request) = self.pending.take() else {
            return Resolution::NotHandled;
        };

        if input == CONFIRMATION_TOKEN {
            debug!("confirmation accepted");
            (request.on_confirm)(request.payload, ctx);
            Resolution::Confirmed
        } else {
            debug!("confirmation declined");
            request.cancel(ctx);
            Resolution::Cancelled
        }
    }
}
