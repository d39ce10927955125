//! medq event bus and notification infrastructure.
//!
//! The queue engine informs the notification collaborator fire-and-forget:
//! handlers publish a [`QueueEvent`] to the in-process [`EventBus`] and move
//! on; the [`NotificationRelay`] forwards events to the external
//! notification service in the background. Delivery failures are logged and
//! never block or roll back a core operation.

pub mod bus;
pub mod relay;

pub use bus::{EventBus, QueueEvent};
pub use relay::NotificationRelay;
