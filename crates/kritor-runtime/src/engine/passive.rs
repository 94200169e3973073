//! Passive topology: one subscription unit per category.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use kritor_core::Category;
use kritor_framework::Dispatcher;
use kritor_protocol::{EventService, EventType};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use super::pipeline::process;

/// Runs one category's subscription until `token` is cancelled.
///
/// The only suspension points are opening a subscription, receiving the
/// next event, and the resubscribe pause; cancellation is observed at each
/// of them. A handler that is already running is never interrupted.
pub(crate) async fn run_subscription(
    category: Category,
    events: Arc<dyn EventService>,
    dispatcher: Dispatcher,
    token: CancellationToken,
    resubscribe_delay: Duration,
) {
    let event_type = EventType::from(category);

    async move {
        info!("Subscription unit started");

        'units: loop {
            let subscribed = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                subscribed = events.subscribe(event_type) => subscribed,
            };

            match subscribed {
                Ok(mut stream) => {
                    debug!("Subscribed");
                    loop {
                        let next = tokio::select! {
                            biased;
                            _ = token.cancelled() => break 'units,
                            next = stream.next() => next,
                        };

                        match next {
                            Some(Ok(wire)) => {
                                process(&dispatcher, &wire).await;
                            }
                            Some(Err(e)) => {
                                warn!(error = %e, "Subscription failed");
                                break;
                            }
                            None => {
                                debug!("Subscription ended");
                                break;
                            }
                        }
                    }
                }
                Err(e) => warn!(error = %e, "Failed to subscribe"),
            }

            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(resubscribe_delay) => {}
            }
        }

        info!("Subscription unit stopped");
    }
    .instrument(info_span!("subscription", category = %category))
    .await
}
