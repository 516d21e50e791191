mod notifier;

pub use notifier::{Delivery, Notifier};
