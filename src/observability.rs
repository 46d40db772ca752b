use biometrics::{Collector, Counter};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("librarius.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("librarius.client.request_errors");

pub(crate) static FRAME_EVENTS: Counter = Counter::new("librarius.frames.events");
pub(crate) static FRAME_MALFORMED: Counter = Counter::new("librarius.frames.malformed");
pub(crate) static STREAM_TRUNCATIONS: Counter = Counter::new("librarius.stream.truncations");

pub(crate) static SESSION_SENDS: Counter = Counter::new("librarius.session.sends");
pub(crate) static SESSION_CANCELS: Counter = Counter::new("librarius.session.cancels");
pub(crate) static SESSION_FAILURES: Counter = Counter::new("librarius.session.failures");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);

    collector.register_counter(&FRAME_EVENTS);
    collector.register_counter(&FRAME_MALFORMED);
    collector.register_counter(&STREAM_TRUNCATIONS);

    collector.register_counter(&SESSION_SENDS);
    collector.register_counter(&SESSION_CANCELS);
    collector.register_counter(&SESSION_FAILURES);
}
