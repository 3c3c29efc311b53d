use std::sync::Arc;

use tokio::sync::oneshot;

use crate::api::models::{Ack, ContactFields, Field, UnknownField};
use crate::api::{DeliveryError, Gateway};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Sending,
    Sent,
    Failed,
}

impl Status {
    /// Text of the submit button.
    pub fn label(self) -> &'static str {
        match self {
            Status::Idle => "Submit",
            Status::Sending => "Sending...",
            Status::Sent => "Sent",
            Status::Failed => "Failed to send",
        }
    }
}

/// Success/failure indicator shown next to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultFlag {
    Unset,
    Success,
    Fail,
}

impl From<Status> for ResultFlag {
    fn from(status: Status) -> Self {
        match status {
            Status::Sent => ResultFlag::Success,
            Status::Failed => ResultFlag::Fail,
            Status::Idle | Status::Sending => ResultFlag::Unset,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub fields: ContactFields,
    pub status: Status,
}

/// An in-flight delivery started by [`FormController::submit`].
pub struct PendingSubmit {
    attempt: u64,
    rx: oneshot::Receiver<Result<Ack, DeliveryError>>,
}

impl PendingSubmit {
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub async fn wait(self) -> Delivery {
        Delivery {
            attempt: self.attempt,
            result: self.rx.await.unwrap_or(Err(DeliveryError::Dropped)),
        }
    }
}

/// Outcome of one numbered attempt, fed back through [`FormController::resolve`].
#[derive(Debug)]
pub struct Delivery {
    pub attempt: u64,
    pub result: Result<Ack, DeliveryError>,
}

/// Owns the one live submission of a contact form session.
pub struct FormController<G: Gateway> {
    gateway: Arc<G>,
    submission: Submission,
    /// Number of the latest attempt; only its outcome may land.
    attempt: u64,
}

impl<G: Gateway> FormController<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway: Arc::new(gateway),
            submission: Submission::default(),
            attempt: 0,
        }
    }

    pub fn edit(&mut self, field: Field, value: impl Into<String>) {
        self.submission.fields.set(field, value);
    }

    pub fn edit_by_name(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), UnknownField> {
        let field: Field = name.parse()?;
        self.edit(field, value);
        Ok(())
    }

    /// Starts a delivery of the current fields. Returns `None` without touching
    /// anything while a previous attempt is still in flight.
    pub fn submit(&mut self) -> Option<PendingSubmit> {
        if self.submission.status == Status::Sending {
            log::debug!("submit ignored: delivery already in flight");
            return None;
        }
        self.transition(Status::Sending);
        self.attempt += 1;

        let snapshot = self.submission.fields.clone();
        let gateway = Arc::clone(&self.gateway);
        let rx = crate::utils::run_async_to_main(async move { gateway.send(snapshot).await });
        Some(PendingSubmit {
            attempt: self.attempt,
            rx,
        })
    }

    /// Applies the outcome of the in-flight delivery. Outcomes of attempts
    /// that were superseded or reset away are dropped.
    pub fn resolve(&mut self, delivery: Delivery) {
        if self.submission.status != Status::Sending || delivery.attempt != self.attempt {
            log::warn!(
                "dropping outcome of attempt {} (current attempt {}, {:?})",
                delivery.attempt,
                self.attempt,
                self.submission.status
            );
            return;
        }
        match delivery.result {
            Ok(_) => {
                self.transition(Status::Sent);
                self.submission.fields = ContactFields::default();
            }
            Err(e) => {
                log::debug!("submission failed, keeping field values: {e}");
                self.transition(Status::Failed);
            }
        }
    }

    pub async fn submit_and_wait(&mut self) -> Status {
        if let Some(pending) = self.submit() {
            let delivery = pending.wait().await;
            self.resolve(delivery);
        }
        self.submission.status
    }

    /// Back to an empty, idle form, as on navigating away. A request still in
    /// flight runs to completion but its outcome is no longer applied.
    pub fn reset(&mut self) {
        if self.submission.status == Status::Sending {
            log::debug!("reset abandons in-flight attempt {}", self.attempt);
        }
        self.submission = Submission::default();
    }

    pub fn fields(&self) -> &ContactFields {
        &self.submission.fields
    }

    pub fn field(&self, field: Field) -> &str {
        self.submission.fields.get(field)
    }

    pub fn status(&self) -> Status {
        self.submission.status
    }

    pub fn result_flag(&self) -> ResultFlag {
        self.submission.status.into()
    }

    pub fn button_label(&self) -> &'static str {
        self.submission.status.label()
    }

    fn transition(&mut self, next: Status) {
        log::debug!("contact form: {:?} -> {:?}", self.submission.status, next);
        self.submission.status = next;
    }
}
