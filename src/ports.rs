pub(crate) mod push;
pub(crate) mod time;

pub(crate) use self::push::{DeliveryOutcome, PushSender};
pub(crate) use self::time::TimeProvider;
