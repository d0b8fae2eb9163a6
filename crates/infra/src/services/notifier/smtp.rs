use super::INotifier;
use crate::config::SmtpConfig;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use renewal_reminders_domain::ReminderMessage;
use tracing::info;

/// Delivers reminders as plain text emails through an SMTP relay
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid SMTP_FROM: `{}`. Error: {}", config.from, e))?;

        // Implicit TLS on 465, STARTTLS otherwise
        let builder = if config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        };
        let mut builder = builder.port(config.port);
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            mailer: builder.build(),
            from,
        })
    }
}

#[async_trait::async_trait]
impl INotifier for SmtpNotifier {
    async fn send(&self, message: &ReminderMessage) -> anyhow::Result<()> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid recipient: `{}`. Error: {}", message.to, e))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())?;

        self.mailer.send(email).await?;
        info!("Reminder email sent to: {}", message.to);
        Ok(())
    }
}
