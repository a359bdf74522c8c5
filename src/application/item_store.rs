// Optimistic inventory store.
//
// Purpose
// - Keep the locally displayed inventory responsive while the remote inventory
//   API, slower and possibly failing, stays the source of truth.
//
// Responsibilities
// - Apply every mutation to the local collection before its network call starts.
// - Confirm with the server's record on success, roll back on failure, and
//   surface a readable error for every rollback.
// - Route every successful full refresh to the low-stock detection worker.
//
// Concurrency
// - One actor task owns the collection. Handles send it commands; each network
//   call runs in its own task and reports back to the actor as a settlement.
//   State is only touched inside the actor, between awaits.
// - Overlapping mutations of the same item settle in resolution order.

use crate::application::errors::SyncError;
use crate::core::inventory_record::{InventoryRecord, ItemDraft};
use crate::core::ports::{GatewayError, InventoryGateway};
use crate::core::transaction::{ItemCollection, Settled, Transaction};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

type Reply<T> = oneshot::Sender<Result<T, SyncError>>;
type Accepted = oneshot::Sender<Result<(), SyncError>>;

const ERROR_BACKLOG: usize = 32;

/// A remote call the store already applied locally and is waiting on.
/// Dropping it does not cancel the call; confirmation or rollback still happens.
#[must_use = "the outcome carries the error to show the user"]
pub struct Pending<T> {
    outcome: oneshot::Receiver<Result<T, SyncError>>,
}

impl<T> Pending<T> {
    pub async fn outcome(self) -> Result<T, SyncError> {
        self.outcome.await.unwrap_or(Err(SyncError::StoreClosed))
    }
}

enum Command {
    Load {
        reply: Reply<Vec<InventoryRecord>>,
    },
    Add {
        draft: ItemDraft,
        accepted: Accepted,
        reply: Reply<InventoryRecord>,
    },
    Update {
        updated: InventoryRecord,
        original: InventoryRecord,
        accepted: Accepted,
        reply: Reply<InventoryRecord>,
    },
    Delete {
        record: InventoryRecord,
        accepted: Accepted,
        reply: Reply<()>,
    },
    Close,
}

enum Resolution {
    Record(Reply<InventoryRecord>),
    Unit(Reply<()>),
}

impl Resolution {
    fn succeed(self, record: InventoryRecord) {
        let _ = match self {
            Resolution::Record(reply) => reply.send(Ok(record)).map_err(|_| ()),
            Resolution::Unit(reply) => reply.send(Ok(())).map_err(|_| ()),
        };
    }

    fn fail(self, error: SyncError) {
        let _ = match self {
            Resolution::Record(reply) => reply.send(Err(error)).map_err(|_| ()),
            Resolution::Unit(reply) => reply.send(Err(error)).map_err(|_| ()),
        };
    }
}

enum Settlement {
    Loaded {
        outcome: Result<Vec<InventoryRecord>, GatewayError>,
        reply: Reply<Vec<InventoryRecord>>,
    },
    Mutation {
        txn: Transaction,
        outcome: Result<Option<InventoryRecord>, GatewayError>,
        resolution: Resolution,
    },
}

#[derive(Clone)]
pub struct OptimisticItemStore {
    commands: mpsc::UnboundedSender<Command>,
    items: watch::Receiver<Vec<InventoryRecord>>,
    errors: broadcast::Sender<String>,
}

impl OptimisticItemStore {
    /// Starts the owning actor on the current tokio runtime.
    pub fn spawn<G>(gateway: Arc<G>) -> Self
    where
        G: InventoryGateway + 'static,
    {
        Self::spawn_with_refresh_route(gateway, None)
    }

    pub fn spawn_with_refresh_route<G>(
        gateway: Arc<G>,
        refresh_route: Option<mpsc::UnboundedSender<Vec<InventoryRecord>>>,
    ) -> Self
    where
        G: InventoryGateway + 'static,
    {
        let (commands, inbox) = mpsc::unbounded_channel();
        let (settlements_tx, settlements) = mpsc::unbounded_channel();
        let (items_tx, items) = watch::channel(Vec::new());
        let (errors, _) = broadcast::channel(ERROR_BACKLOG);
        let actor = ItemStoreActor {
            gateway,
            collection: ItemCollection::default(),
            items: items_tx,
            errors: errors.clone(),
            refresh_route,
            settlements_tx,
            in_flight: 0,
        };
        tokio::spawn(actor.run(inbox, settlements));
        Self {
            commands,
            items,
            errors,
        }
    }

    pub fn snapshot(&self) -> Vec<InventoryRecord> {
        self.items.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<InventoryRecord>> {
        self.items.clone()
    }

    /// Messages for every failed refresh or rolled back mutation.
    pub fn subscribe_errors(&self) -> broadcast::Receiver<String> {
        self.errors.subscribe()
    }

    pub fn load(&self) -> Result<Pending<Vec<InventoryRecord>>, SyncError> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(Command::Load { reply })
            .map_err(|_| SyncError::StoreClosed)?;
        Ok(Pending { outcome })
    }

    /// Resolves once the provisional record is visible locally.
    pub async fn add(&self, draft: ItemDraft) -> Result<Pending<InventoryRecord>, SyncError> {
        let (reply, outcome) = oneshot::channel();
        self.submit(|accepted| Command::Add {
            draft,
            accepted,
            reply,
        })
        .await?;
        Ok(Pending { outcome })
    }

    pub async fn update(
        &self,
        updated: InventoryRecord,
        original: InventoryRecord,
    ) -> Result<Pending<InventoryRecord>, SyncError> {
        let (reply, outcome) = oneshot::channel();
        self.submit(|accepted| Command::Update {
            updated,
            original,
            accepted,
            reply,
        })
        .await?;
        Ok(Pending { outcome })
    }

    pub async fn delete(&self, record: InventoryRecord) -> Result<Pending<()>, SyncError> {
        let (reply, outcome) = oneshot::channel();
        self.submit(|accepted| Command::Delete {
            record,
            accepted,
            reply,
        })
        .await?;
        Ok(Pending { outcome })
    }

    /// Stops accepting commands on every handle. Commands already queued and
    /// calls already in flight still settle; later calls fail with `StoreClosed`.
    pub fn close(&self) {
        let _ = self.commands.send(Command::Close);
    }

    async fn submit(&self, build: impl FnOnce(Accepted) -> Command) -> Result<(), SyncError> {
        let (accepted, ack) = oneshot::channel();
        self.commands
            .send(build(accepted))
            .map_err(|_| SyncError::StoreClosed)?;
        ack.await.unwrap_or(Err(SyncError::StoreClosed))
    }
}

struct ItemStoreActor<G> {
    gateway: Arc<G>,
    collection: ItemCollection,
    items: watch::Sender<Vec<InventoryRecord>>,
    errors: broadcast::Sender<String>,
    refresh_route: Option<mpsc::UnboundedSender<Vec<InventoryRecord>>>,
    settlements_tx: mpsc::UnboundedSender<Settlement>,
    in_flight: usize,
}

impl<G> ItemStoreActor<G>
where
    G: InventoryGateway + 'static,
{
    async fn run(
        mut self,
        mut inbox: mpsc::UnboundedReceiver<Command>,
        mut settlements: mpsc::UnboundedReceiver<Settlement>,
    ) {
        let mut inbox_open = true;
        while inbox_open || self.in_flight > 0 {
            tokio::select! {
                Some(settlement) = settlements.recv() => {
                    self.in_flight -= 1;
                    self.settle(settlement);
                }
                command = inbox.recv(), if inbox_open => match command {
                    Some(Command::Close) => {
                        tracing::debug!(in_flight = self.in_flight, "inventory store closing");
                        inbox.close();
                    }
                    Some(command) => self.handle(command),
                    None => inbox_open = false,
                },
            }
        }
        tracing::debug!("inventory store stopped");
    }

    fn publish(&self) {
        self.items.send_replace(self.collection.items().to_vec());
    }

    fn surface(&self, error: &SyncError) {
        let _ = self.errors.send(error.to_string());
    }

    fn spawn_call<Fut>(
        &mut self,
        call: Fut,
        finish: impl FnOnce(Fut::Output) -> Settlement + Send + 'static,
    )
    where
        Fut: Future + Send + 'static,
        Fut::Output: Send,
    {
        self.in_flight += 1;
        let settlements = self.settlements_tx.clone();
        tokio::spawn(async move {
            let output = call.await;
            let _ = settlements.send(finish(output));
        });
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Load { reply } => {
                let gateway = self.gateway.clone();
                self.spawn_call(async move { gateway.list_all().await }, move |outcome| {
                    Settlement::Loaded { outcome, reply }
                });
            }
            Command::Add {
                draft,
                accepted,
                reply,
            } => {
                let txn = self.collection.begin_create(draft.into_provisional());
                tracing::debug!(item = %txn.target, "provisional item added");
                self.publish();
                let _ = accepted.send(Ok(()));
                let gateway = self.gateway.clone();
                let record = txn.applied.clone();
                self.spawn_call(
                    async move { gateway.create(&record).await.map(Some) },
                    move |outcome| Settlement::Mutation {
                        txn,
                        outcome,
                        resolution: Resolution::Record(reply),
                    },
                );
            }
            Command::Update {
                updated,
                original,
                accepted,
                reply,
            } => match self.collection.begin_update(updated, original) {
                Ok(txn) => {
                    tracing::debug!(item = %txn.target, "item updated locally");
                    self.publish();
                    let _ = accepted.send(Ok(()));
                    let gateway = self.gateway.clone();
                    let record = txn.applied.clone();
                    self.spawn_call(
                        async move { gateway.update(&record).await.map(Some) },
                        move |outcome| Settlement::Mutation {
                            txn,
                            outcome,
                            resolution: Resolution::Record(reply),
                        },
                    );
                }
                Err(reason) => {
                    let _ = accepted.send(Err(reason.into()));
                }
            },
            Command::Delete {
                record,
                accepted,
                reply,
            } => match self.collection.begin_delete(record) {
                Ok(txn) => {
                    tracing::debug!(item = %txn.target, "item removed locally");
                    self.publish();
                    let _ = accepted.send(Ok(()));
                    let gateway = self.gateway.clone();
                    let id = txn.target.clone();
                    self.spawn_call(
                        async move { gateway.delete(&id).await.map(|()| None::<InventoryRecord>) },
                        move |outcome| Settlement::Mutation {
                            txn,
                            outcome,
                            resolution: Resolution::Unit(reply),
                        },
                    );
                }
                Err(reason) => {
                    let _ = accepted.send(Err(reason.into()));
                }
            },
            // Intercepted by `run`, which owns the inbox.
            Command::Close => {}
        }
    }

    fn settle(&mut self, settlement: Settlement) {
        match settlement {
            Settlement::Loaded { outcome, reply } => match outcome {
                Ok(items) => {
                    tracing::debug!(count = items.len(), "inventory refreshed");
                    self.collection.replace_all(items.clone());
                    self.publish();
                    if let Some(route) = &self.refresh_route {
                        if route.send(items.clone()).is_err() {
                            tracing::warn!("refresh route closed, low stock detection skipped");
                        }
                    }
                    let _ = reply.send(Ok(items));
                }
                Err(source) => {
                    let error = SyncError::Load(source);
                    tracing::warn!(%error, "inventory refresh failed, keeping local items");
                    self.surface(&error);
                    let _ = reply.send(Err(error));
                }
            },
            Settlement::Mutation {
                txn,
                outcome,
                resolution,
            } => match outcome {
                Ok(confirmed) => {
                    let server_record = confirmed.clone().unwrap_or_else(|| txn.applied.clone());
                    let settled = self.collection.confirm(&txn, confirmed);
                    if settled == Settled::Detached {
                        tracing::debug!(kind = ?txn.kind, item = %txn.target, "confirmed item no longer local");
                    } else {
                        tracing::debug!(kind = ?txn.kind, item = %txn.target, "mutation confirmed");
                    }
                    self.publish();
                    resolution.succeed(server_record);
                }
                Err(source) => {
                    self.collection.roll_back(&txn);
                    self.publish();
                    let error = SyncError::rolled_back(&txn, source);
                    tracing::warn!(kind = ?txn.kind, item = %txn.target, %error, "mutation rolled back");
                    self.surface(&error);
                    resolution.fail(error);
                }
            },
        }
    }
}
