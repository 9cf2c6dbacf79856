use super::{EmailMessage, EmailProvider, ProviderError, ProviderResponse};
use crate::config::SmtpConfig;
use async_trait::async_trait;
use lettre::{
    message::{
        header::{ContentTransferEncoding, ContentType},
        Mailbox,
    },
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Build the MIME message: `text/plain; charset=utf-8`, quoted-printable body.
pub fn compose(from: &Mailbox, email: &EmailMessage) -> Result<Message, ProviderError> {
    let to_mailbox: Mailbox = email
        .to
        .parse()
        .map_err(|e| ProviderError::InvalidRecipient(format!("Invalid recipient: {}", e)))?;

    Message::builder()
        .from(from.clone())
        .to(to_mailbox)
        .subject(&email.subject)
        .header(ContentType::TEXT_PLAIN)
        .header(ContentTransferEncoding::QuotedPrintable)
        .body(email.body.clone())
        .map_err(|e| ProviderError::SendFailed(format!("Failed to build message: {}", e)))
}

pub struct SmtpProvider {
    config: SmtpConfig,
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpProvider {
    pub fn new(config: SmtpConfig) -> Result<Self, ProviderError> {
        if !config.enabled {
            return Err(ProviderError::NotEnabled(
                "SMTP email provider is not enabled".to_string(),
            ));
        }

        let from: Mailbox = config
            .sender()
            .parse()
            .map_err(|e| ProviderError::Configuration(format!("Invalid from address: {}", e)))?;

        let creds = Credentials::new(config.user.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| {
                ProviderError::Configuration(format!("Failed to create SMTP relay: {}", e))
            })?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            config,
            from,
            transport,
        })
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, email: &EmailMessage) -> Result<ProviderResponse, ProviderError> {
        let message = compose(&self.from, email)?;

        let response = self.transport.send(message).await.map_err(|e| {
            if e.is_permanent() {
                ProviderError::SendFailed(format!("Relay rejected message: {}", e))
            } else {
                ProviderError::Connection(format!("Failed to send email: {}", e))
            }
        })?;

        let provider_id = response.message().next().map(|s| s.to_string());

        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "Email sent successfully"
        );

        Ok(ProviderResponse::success(provider_id))
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}

/// Records every message instead of sending it.
///
/// Recipients registered with [`MockEmailProvider::fail_for`] are rejected.
pub struct MockEmailProvider {
    enabled: bool,
    send_count: AtomicU64,
    sent: Mutex<Vec<EmailMessage>>,
    attempted: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
}

impl MockEmailProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            send_count: AtomicU64::new(0),
            sent: Mutex::new(Vec::new()),
            attempted: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail_for(self, recipient: impl Into<String>) -> Self {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(recipient.into());
        }
        self
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    /// Messages that were accepted, in send order.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Every recipient a send was attempted for, including rejected ones.
    pub fn attempted(&self) -> Vec<String> {
        self.attempted.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EmailProvider for MockEmailProvider {
    async fn send(&self, email: &EmailMessage) -> Result<ProviderResponse, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotEnabled(
                "Mock email provider is not enabled".to_string(),
            ));
        }

        if let Ok(mut attempted) = self.attempted.lock() {
            attempted.push(email.to.clone());
        }

        let rejected = self
            .failing
            .lock()
            .map(|f| f.contains(&email.to))
            .unwrap_or(false);
        if rejected {
            return Err(ProviderError::SendFailed(format!(
                "[MOCK] relay rejected {}",
                email.to
            )));
        }

        let count = self.send_count.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email.clone());
        }

        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "[MOCK] Email would be sent"
        );

        Ok(ProviderResponse::success(Some(format!("mock-email-{}", count))))
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
