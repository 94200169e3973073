//! Decode-then-dispatch for a single wire event, shared by both topologies.

use kritor_framework::Dispatcher;
use kritor_protocol::{EventStructure, decode_event};
use tracing::{trace, warn};

/// Decodes `wire` and dispatches it.
///
/// Returns `false` if the event could not be decoded. Decode failures are
/// logged and never propagate: the caller moves on to the next event.
pub(crate) async fn process(dispatcher: &Dispatcher, wire: &EventStructure) -> bool {
    let event = match decode_event(wire) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, event_type = wire.event_type, "Dropping undecodable event");
            return false;
        }
    };

    let outcome = dispatcher.dispatch(event).await;
    trace!(
        invoked = outcome.invoked,
        failed = outcome.failures.len(),
        "Event dispatched"
    );
    true
}
