//! Infrastructure layer: record storage, notifications, configuration, seeding.

pub mod config;
pub mod notify;
pub mod seed;
pub mod store;

pub use config::{NotificationSettings, RegistrarConfig};
pub use notify::{Notifier, NotifyError, OutboundMessage, OutboxNotifier, TracingNotifier};
pub use store::{InMemoryRecordStore, RecordStore, StoreError, UnitOfWork};
