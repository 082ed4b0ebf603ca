//! Pooled SMTP relay transport.
//!
//! One [`SmtpMailer`] is created at startup and shared by every request.
//! lettre's pool caps the number of concurrent relay connections; the
//! mailer additionally recycles the whole pool after a fixed number of
//! deliveries so no connection carries more than the configured message
//! budget.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::PoolConfig;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::{MailError, Mailer, OutgoingEmail};
use crate::Config;

type Transport = AsyncSmtpTransport<Tokio1Executor>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// TLS from the first byte (SMTPS, usually port 465).
    Implicit,
    /// Plain connection upgraded with STARTTLS (usually port 587).
    StartTls,
}

impl fmt::Display for TlsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TlsMode::Implicit => f.write_str("tls"),
            TlsMode::StartTls => f.write_str("starttls"),
        }
    }
}

/// Where and how to reach the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayEndpoint {
    pub host: String,
    pub port: u16,
    pub tls: TlsMode,
}

impl RelayEndpoint {
    /// Resolve the relay from `SMTP_HOST`/`SMTP_PORT`, or from the named
    /// managed service when no host is given.
    pub fn from_config(config: &Config) -> Result<Self, MailError> {
        if let Some(host) = &config.smtp_host {
            let port = config.smtp_port.unwrap_or(587);
            return Ok(Self {
                host: host.clone(),
                port,
                tls: tls_for_port(port),
            });
        }

        let (host, default_port) = match config.email_service.to_ascii_lowercase().as_str() {
            "gmail" => ("smtp.gmail.com", 465),
            "outlook" | "hotmail" | "office365" => ("smtp.office365.com", 587),
            "yahoo" => ("smtp.mail.yahoo.com", 465),
            other => {
                warn!(service = %other, "smtp_unknown_service");
                return Err(MailError::MissingConfig("SMTP_HOST"));
            }
        };

        let port = config.smtp_port.unwrap_or(default_port);
        Ok(Self {
            host: host.to_string(),
            port,
            tls: tls_for_port(port),
        })
    }
}

fn tls_for_port(port: u16) -> TlsMode {
    if port == 465 {
        TlsMode::Implicit
    } else {
        TlsMode::StartTls
    }
}

/// Everything needed to (re)build the pooled transport.
#[derive(Clone)]
struct TransportSettings {
    endpoint: RelayEndpoint,
    credentials: Option<Credentials>,
    timeout: Duration,
    max_connections: u32,
}

impl TransportSettings {
    fn build(&self) -> Result<Transport, MailError> {
        let builder = match self.endpoint.tls {
            TlsMode::Implicit => Transport::relay(&self.endpoint.host),
            TlsMode::StartTls => Transport::starttls_relay(&self.endpoint.host),
        }
        .map_err(|e| MailError::Smtp(e.to_string()))?;

        let mut builder = builder
            .port(self.endpoint.port)
            .timeout(Some(self.timeout))
            .pool_config(PoolConfig::new().max_size(self.max_connections));

        if let Some(credentials) = &self.credentials {
            builder = builder.credentials(credentials.clone());
        }

        Ok(builder.build())
    }
}

/// SMTP mailer backed by a shared, recyclable lettre connection pool.
#[derive(Clone)]
pub struct SmtpMailer {
    inner: Arc<SmtpMailerInner>,
}

struct SmtpMailerInner {
    settings: TransportSettings,
    from: Address,
    transport: RwLock<Arc<Transport>>,
    sent: AtomicUsize,
    recycle_after: usize,
}

impl SmtpMailer {
    /// Create the mailer from application configuration.
    ///
    /// Requires `EMAIL_USER`, which doubles as the sender address.
    /// Credentials are only presented when `EMAIL_PASS` is also set.
    pub fn from_config(config: &Config) -> Result<Self, MailError> {
        let user = config
            .email_user
            .as_deref()
            .ok_or(MailError::MissingConfig("EMAIL_USER"))?;

        let from: Address = user
            .parse()
            .map_err(|_| MailError::InvalidAddress(user.to_string()))?;

        let settings = TransportSettings {
            endpoint: RelayEndpoint::from_config(config)?,
            credentials: config
                .email_pass
                .as_ref()
                .map(|pass| Credentials::new(user.to_string(), pass.clone())),
            timeout: Duration::from_secs(config.smtp_timeout_secs),
            max_connections: config.pool_max_connections,
        };

        let transport = settings.build()?;

        info!(
            host = %settings.endpoint.host,
            port = settings.endpoint.port,
            tls = %settings.endpoint.tls,
            authenticated = settings.credentials.is_some(),
            pool_max_connections = config.pool_max_connections,
            pool_max_messages = config.pool_max_messages,
            "smtp_transport_configured"
        );

        let recycle_after = config.pool_max_messages * config.pool_max_connections as usize;

        Ok(Self {
            inner: Arc::new(SmtpMailerInner {
                settings,
                from,
                transport: RwLock::new(Arc::new(transport)),
                sent: AtomicUsize::new(0),
                recycle_after: recycle_after.max(1),
            }),
        })
    }

    /// Relay endpoint this mailer delivers through.
    pub fn endpoint(&self) -> &RelayEndpoint {
        &self.inner.settings.endpoint
    }

    /// Hand out the current pool, swapping in a fresh one once the
    /// message budget of the old pool is spent.
    async fn transport(&self) -> Result<Arc<Transport>, MailError> {
        let prev = self.inner.sent.fetch_add(1, Ordering::Relaxed);

        // Every pool carries exactly `recycle_after` messages.
        if prev > 0 && prev % self.inner.recycle_after == 0 {
            let fresh = Arc::new(self.inner.settings.build()?);
            let mut transport = self.inner.transport.write().await;
            *transport = fresh;
            info!(messages_sent = prev, "smtp_pool_recycled");
        }

        Ok(self.inner.transport.read().await.clone())
    }
}

/// Turn an [`OutgoingEmail`] into a lettre message sent from `from`.
pub fn build_message(from: &Address, email: &OutgoingEmail) -> Result<Message, MailError> {
    let sender = Mailbox::new(Some(email.from_name.clone()), from.clone());

    let to: Mailbox = email
        .to
        .parse()
        .map_err(|_| MailError::InvalidAddress(email.to.clone()))?;

    let mut builder = Message::builder().from(sender).to(to);

    if let Some(reply_to) = &email.reply_to {
        let mailbox: Mailbox = reply_to
            .parse()
            .map_err(|_| MailError::InvalidAddress(reply_to.clone()))?;
        builder = builder.reply_to(mailbox);
    }

    builder
        .subject(email.subject.as_str())
        .singlepart(SinglePart::html(email.html.clone()))
        .map_err(|e| MailError::Build(e.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let message = build_message(&self.inner.from, email)?;
        let transport = self.transport().await?;

        transport
            .send(message)
            .await
            .map_err(|e| MailError::Smtp(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CorsPolicy, DispatchMode};

    fn config() -> Config {
        Config {
            port: 8285,
            email_user: Some("relay@example.com".to_string()),
            email_pass: Some("secret".to_string()),
            receiver_email: Some("admin@example.com".to_string()),
            email_service: "gmail".to_string(),
            smtp_host: None,
            smtp_port: None,
            smtp_timeout_secs: 10,
            pool_max_connections: 3,
            pool_max_messages: 100,
            dispatch_mode: DispatchMode::EagerAck,
            cors: CorsPolicy::Any,
            operator_name: "Gaurav".to_string(),
        }
    }

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            from_name: "Alice".to_string(),
            to: "admin@example.com".to_string(),
            reply_to: Some("alice@example.com".to_string()),
            subject: "Hello".to_string(),
            html: "<p>Hi</p>".to_string(),
        }
    }

    #[test]
    fn test_endpoint_named_service() {
        let endpoint = RelayEndpoint::from_config(&config()).unwrap();
        assert_eq!(endpoint.host, "smtp.gmail.com");
        assert_eq!(endpoint.port, 465);
        assert_eq!(endpoint.tls, TlsMode::Implicit);
    }

    #[test]
    fn test_endpoint_explicit_host() {
        let mut config = config();
        config.smtp_host = Some("mail.example.com".to_string());
        let endpoint = RelayEndpoint::from_config(&config).unwrap();
        assert_eq!(endpoint.port, 587);
        assert_eq!(endpoint.tls, TlsMode::StartTls);

        config.smtp_port = Some(465);
        let endpoint = RelayEndpoint::from_config(&config).unwrap();
        assert_eq!(endpoint.tls, TlsMode::Implicit);
    }

    #[test]
    fn test_endpoint_unknown_service() {
        let mut config = config();
        config.email_service = "carrier-pigeon".to_string();
        assert!(matches!(
            RelayEndpoint::from_config(&config),
            Err(MailError::MissingConfig("SMTP_HOST"))
        ));
    }

    #[test]
    fn test_build_message_envelope() {
        let from: Address = "relay@example.com".parse().unwrap();
        let message = build_message(&from, &email()).unwrap();

        let envelope = message.envelope();
        assert_eq!(envelope.from().map(|a| a.to_string()), Some("relay@example.com".to_string()));
        assert_eq!(envelope.to()[0].to_string(), "admin@example.com");

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Reply-To: alice@example.com"));
        assert!(raw.contains("Alice"));
    }

    #[test]
    fn test_build_message_invalid_recipient() {
        let from: Address = "relay@example.com".parse().unwrap();
        let mut email = email();
        email.to = "not-an-address".to_string();

        assert!(matches!(
            build_message(&from, &email),
            Err(MailError::InvalidAddress(addr)) if addr == "not-an-address"
        ));
    }

    #[tokio::test]
    async fn test_from_config_requires_user() {
        let mut config = config();
        config.email_user = None;
        assert!(matches!(
            SmtpMailer::from_config(&config),
            Err(MailError::MissingConfig("EMAIL_USER"))
        ));
    }

    #[tokio::test]
    async fn test_from_config_builds_pool() {
        let mailer = SmtpMailer::from_config(&config()).unwrap();
        assert_eq!(mailer.endpoint().host, "smtp.gmail.com");
        assert_eq!(mailer.inner.recycle_after, 300);
    }

    #[tokio::test]
    async fn test_pool_recycled_at_message_budget() {
        let mut config = config();
        config.pool_max_connections = 1;
        config.pool_max_messages = 2;
        let mailer = SmtpMailer::from_config(&config).unwrap();

        let first = mailer.transport().await.unwrap();
        let second = mailer.transport().await.unwrap();
        let third = mailer.transport().await.unwrap();
        let fourth = mailer.transport().await.unwrap();
        let fifth = mailer.transport().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&second, &third));
        assert!(Arc::ptr_eq(&third, &fourth));
        assert!(!Arc::ptr_eq(&fourth, &fifth));
    }
}
