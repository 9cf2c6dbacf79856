use super::error::NotifyError;
use super::metrics::record_email;
use super::providers::{EmailMessage, EmailProvider};
use crate::models::ResolvedContact;
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Sends one email per resolved contact that has an email address.
#[derive(Clone)]
pub struct Dispatcher {
    provider: Arc<dyn EmailProvider>,
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn EmailProvider>) -> Self {
        Self { provider }
    }

    /// Sends in the order given and returns how many emails went out.
    ///
    /// SMS-only contacts are skipped. The first failed send aborts the loop:
    /// later contacts are never attempted and earlier sends are not reported.
    // FIXME: fail-fast drops the remaining recipients on the first rejection;
    // decide whether callers want a per-recipient report instead.
    #[instrument(skip(self, contacts, message), fields(contacts = contacts.len()))]
    pub async fn dispatch(
        &self,
        contacts: &[ResolvedContact],
        subject: &str,
        message: &str,
    ) -> Result<usize, NotifyError> {
        let mut sent = 0;

        for contact in contacts {
            let Some(to) = contact.email.as_deref() else {
                debug!(sms = ?contact.sms, "skipping contact without email");
                continue;
            };

            let email = EmailMessage {
                to: to.to_string(),
                subject: subject.to_string(),
                body: message.to_string(),
            };

            match self.provider.send(&email).await {
                Ok(response) => {
                    record_email("sent");
                    debug!(to = %to, provider_id = ?response.provider_id, "email accepted");
                    sent += 1;
                }
                Err(source) => {
                    record_email("failed");
                    error!(to = %to, error = %source, "email send failed, aborting dispatch");
                    return Err(NotifyError::SendFailure {
                        recipient: to.to_string(),
                        source,
                    });
                }
            }
        }

        Ok(sent)
    }
}
