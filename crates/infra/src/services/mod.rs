mod notifier;

pub use notifier::{
    create_notifier, INotifier, InMemoryNotifier, SmtpNotifier, WebhookNotifier,
};
