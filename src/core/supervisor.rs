//! # Supervisor: restart loop, shared retry budget, and shutdown/drain.
//!
//! The [`Supervisor`] turns a list of [`ServiceSpec`]s into running
//! [`Service`]s, waits for whichever completes first, restarts that one
//! service while the shared [`RetryBudget`] lasts, and finally cancels and
//! drains everything.
//!
//! ## High-level architecture
//! ```text
//! Inputs to run():
//!   Vec<ServiceSpec>, impl ShutdownSource  ──►  Supervisor::run()
//!
//! Preparation:
//!   - Bus::new(cfg.bus_capacity)
//!   - listener: Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!   - Service::start() for every spec ─► Slot { service, completion }
//!
//! Restart loop (at most R + 1 completions):
//!   select! (biased) {
//!     shutdown.requested()       ─► ShutdownRequested, exit loop
//!     next_completion(slots)     ─► (slot, outcome)
//!          ├─ Err ─► ServiceFailed
//!          ├─ budget.consume()
//!          │    ├─ Restart   ─► slot.completion = slot.service.start()   (only this slot)
//!          │    └─ Exhausted ─► BudgetExhausted, exit loop
//!          └─ BudgetRemaining
//!   }
//!
//! Shutdown path (both exits):
//!   ShuttingDown ─► service.stop() for every slot
//!               ─► completion.wait() for every slot (unbounded)
//!               ─► AllDrained
//!               ─► drop bus, join listener (all events delivered)
//! ```
//!
//! ## Tie-break
//! When several sources are ready at once the shutdown source wins, then
//! services in registration order. The choice is deterministic.
//!
//! ## Known gap
//! Drain waits for every worker without a deadline; a service that ignores
//! its token blocks `run` forever.

use std::{
    collections::HashSet,
    future::{Future, poll_fn},
    sync::Arc,
    task::Poll,
};

use tokio::{select, sync::broadcast::error::RecvError, task::JoinHandle};

use crate::{
    core::{
        config::SupervisorConfig,
        report::{CompletionRecord, DrainOutcome, ExitReason, RunReport},
        shutdown::ShutdownSource,
    },
    error::RuntimeError,
    events::{Bus, Event, EventKind},
    policies::{RetryBudget, Verdict},
    services::{Completion, Outcome, Service, ServiceSpec},
    subscribers::{Subscribe, SubscriberSet},
};

/// A supervised service and the completion of its current run.
struct Slot {
    service: Service,
    completion: Completion,
}

/// Owns the restart loop and the shutdown/drain protocol.
pub struct Supervisor {
    cfg: SupervisorConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl Supervisor {
    /// Returns a builder for a supervisor with the given configuration.
    pub fn builder(cfg: SupervisorConfig) -> super::builder::SupervisorBuilder {
        super::builder::SupervisorBuilder::new(cfg)
    }

    pub(super) fn new_internal(
        cfg: SupervisorConfig,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        Self { cfg, subscribers }
    }

    /// Runs the given services until the budget is exhausted or `shutdown`
    /// fires, then cancels and drains all of them.
    ///
    /// Every event published during the run has been delivered to the
    /// subscribers when this returns.
    pub async fn run<S: ShutdownSource>(
        &self,
        specs: Vec<ServiceSpec>,
        mut shutdown: S,
    ) -> Result<RunReport, RuntimeError> {
        ensure_unique(&specs)?;

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let listener = self.spawn_listener(&bus);

        let mut slots = self.start_services(&bus, &specs);
        let (exit, completions) = self.restart_loop(&bus, &mut slots, &mut shutdown).await;
        let drained = stop_and_drain(&bus, &mut slots).await;

        // Services hold bus clones; the listener ends once all are gone.
        drop(slots);
        drop(bus);
        let events_flushed = join_listener(listener).await;

        Ok(RunReport {
            exit,
            completions,
            drained,
            events_flushed,
        })
    }

    /// Forwards bus events to the subscriber set until the bus closes.
    fn spawn_listener(&self, bus: &Bus) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(self.subscribers.clone(), bus.downgrade());

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            set.shutdown().await;
        })
    }

    fn start_services(&self, bus: &Bus, specs: &[ServiceSpec]) -> Vec<Slot> {
        specs
            .iter()
            .map(|spec| {
                let mut service = Service::with_effective_timeout(
                    spec.name_arc(),
                    spec.timeout(),
                    self.cfg.effective_timeout(spec.timeout()),
                    bus.clone(),
                );
                let completion = service.start();
                Slot {
                    service,
                    completion,
                }
            })
            .collect()
    }

    async fn restart_loop<S: ShutdownSource>(
        &self,
        bus: &Bus,
        slots: &mut [Slot],
        shutdown: &mut S,
    ) -> (ExitReason, Vec<CompletionRecord>) {
        let mut budget = RetryBudget::new(self.cfg.retries);
        let mut completions = Vec::new();
        let mut requested = shutdown.requested();

        loop {
            let (idx, outcome) = select! {
                biased;
                cause = &mut requested => {
                    bus.publish(Event::new(EventKind::ShutdownRequested).with_reason(cause.as_str()));
                    return (ExitReason::ShutdownRequested(cause), completions);
                }
                next = next_completion(slots) => match next {
                    Some(ready) => ready,
                    None => return (ExitReason::NothingToSupervise, completions),
                },
            };

            let slot = &mut slots[idx];
            let name = slot.service.name_arc();
            if let Err(e) = &outcome {
                bus.publish(
                    Event::new(EventKind::ServiceFailed)
                        .with_service(Arc::clone(&name))
                        .with_reason(e.to_string()),
                );
            }

            let (restarted, remaining) = match budget.consume() {
                Verdict::Restart { remaining } => {
                    slot.completion = slot.service.start();
                    bus.publish(
                        Event::new(EventKind::ServiceRestarted).with_service(Arc::clone(&name)),
                    );
                    (true, remaining)
                }
                Verdict::Exhausted => {
                    bus.publish(
                        Event::new(EventKind::BudgetExhausted).with_service(Arc::clone(&name)),
                    );
                    (false, budget.remaining())
                }
            };
            bus.publish(Event::new(EventKind::BudgetRemaining).with_remaining(remaining));

            completions.push(CompletionRecord {
                service: name,
                error: outcome.err(),
                restarted,
                remaining,
            });
            if !restarted {
                return (ExitReason::BudgetExhausted, completions);
            }
        }
    }
}

/// Waits for the first unconsumed completion, scanning in registration order.
///
/// Resolves to `None` when no slot has a pending completion left.
fn next_completion(slots: &mut [Slot]) -> impl Future<Output = Option<(usize, Outcome)>> + '_ {
    poll_fn(move |cx| {
        let mut live = false;
        for (idx, slot) in slots.iter_mut().enumerate() {
            if slot.completion.is_consumed() {
                continue;
            }
            live = true;
            if let Poll::Ready(Some(outcome)) = slot.completion.poll_wait(cx) {
                return Poll::Ready(Some((idx, outcome)));
            }
        }
        if live { Poll::Pending } else { Poll::Ready(None) }
    })
}

/// Cancels every service, then reads every completion to its terminal state.
async fn stop_and_drain(bus: &Bus, slots: &mut [Slot]) -> Vec<(Arc<str>, DrainOutcome)> {
    bus.publish(Event::new(EventKind::ShuttingDown));
    for slot in slots.iter() {
        slot.service.stop();
    }

    let mut drained = Vec::with_capacity(slots.len());
    for slot in slots.iter_mut() {
        let name = slot.service.name_arc();
        let outcome = match slot.completion.wait().await {
            None => DrainOutcome::AlreadyObserved,
            Some(Ok(())) => DrainOutcome::Clean,
            Some(Err(e)) => {
                bus.publish(
                    Event::new(EventKind::DrainFailed)
                        .with_service(Arc::clone(&name))
                        .with_reason(e.to_string()),
                );
                DrainOutcome::Failed(e)
            }
        };
        drained.push((name, outcome));
    }

    bus.publish(Event::new(EventKind::AllDrained));
    drained
}

/// Waits for the listener to finish delivering; false if it died first.
async fn join_listener(listener: JoinHandle<()>) -> bool {
    match listener.await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "event listener failed; events may be lost");
            false
        }
    }
}

fn ensure_unique(specs: &[ServiceSpec]) -> Result<(), RuntimeError> {
    let mut seen = HashSet::with_capacity(specs.len());
    for spec in specs {
        if !seen.insert(spec.name()) {
            return Err(RuntimeError::DuplicateService {
                name: spec.name().to_string(),
            });
        }
    }
    Ok(())
}
