mod dispatcher;
mod payload;
mod registry;
mod scheduler;
pub(crate) mod vapid;

pub use dispatcher::BroadcastTally;
pub(crate) use dispatcher::Dispatcher;
pub(crate) use payload::PayloadBuilder;
pub use registry::{Registration, SubscriptionRegistry};
pub(crate) use scheduler::DeliveryScheduler;
pub use vapid::{VapidCredentials, VapidError, generate_vapid_credentials, resolve_vapid_config};
