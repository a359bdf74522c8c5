// Optimistic mutations over the local inventory collection.
//
// Purpose
// - Apply a mutation locally before the remote store answers, and settle it
//   uniformly once it does.
//
// Responsibilities
// - Record {kind, target identity, pre-state} for every optimistic mutation.
// - On success put the server's record in the slot, on failure restore the pre-state.
// - Locate slots by identity at settle time, never by a remembered index.
// - Never perform input or output.

use crate::core::inventory_record::{InventoryRecord, ItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub kind: MutationKind,
    pub target: ItemId,
    /// What the slot held before the mutation. `None` for creates.
    pub pre_state: Option<InventoryRecord>,
    /// The record the mutation put (or tried to put) in place.
    pub applied: InventoryRecord,
}

impl Transaction {
    pub fn item_name(&self) -> &str {
        match &self.pre_state {
            Some(record) => &record.name,
            None => &self.applied.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    UnknownItem(ItemId),
    IdentityChanged { from: ItemId, to: ItemId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled {
    /// The slot now holds this server-confirmed record.
    Confirmed(InventoryRecord),
    /// The remote call succeeded but the slot no longer exists locally.
    Detached,
    Removed,
    RolledBack,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ItemCollection {
    items: Vec<InventoryRecord>,
}

impl ItemCollection {
    pub fn new(items: Vec<InventoryRecord>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[InventoryRecord] {
        &self.items
    }

    pub fn replace_all(&mut self, items: Vec<InventoryRecord>) {
        self.items = items;
    }

    fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    pub fn get(&self, id: &ItemId) -> Option<&InventoryRecord> {
        self.position(id).map(|index| &self.items[index])
    }

    pub fn begin_create(&mut self, provisional: InventoryRecord) -> Transaction {
        self.items.push(provisional.clone());
        Transaction {
            kind: MutationKind::Create,
            target: provisional.id.clone(),
            pre_state: None,
            applied: provisional,
        }
    }

    pub fn begin_update(
        &mut self,
        updated: InventoryRecord,
        original: InventoryRecord,
    ) -> Result<Transaction, RejectReason> {
        if updated.id != original.id {
            return Err(RejectReason::IdentityChanged {
                from: original.id,
                to: updated.id,
            });
        }
        let index = self
            .position(&original.id)
            .ok_or_else(|| RejectReason::UnknownItem(original.id.clone()))?;
        self.items[index] = updated.clone();
        Ok(Transaction {
            kind: MutationKind::Update,
            target: original.id.clone(),
            pre_state: Some(original),
            applied: updated,
        })
    }

    pub fn begin_delete(&mut self, record: InventoryRecord) -> Result<Transaction, RejectReason> {
        let index = self
            .position(&record.id)
            .ok_or_else(|| RejectReason::UnknownItem(record.id.clone()))?;
        self.items.remove(index);
        Ok(Transaction {
            kind: MutationKind::Delete,
            target: record.id.clone(),
            pre_state: Some(record.clone()),
            applied: record,
        })
    }

    /// Applies the server's answer. `confirmed` is `None` for deletes.
    pub fn confirm(&mut self, txn: &Transaction, confirmed: Option<InventoryRecord>) -> Settled {
        match (txn.kind, confirmed) {
            (MutationKind::Delete, _) => Settled::Removed,
            (_, None) => Settled::Detached,
            (MutationKind::Create | MutationKind::Update, Some(record)) => {
                match self.position(&txn.target) {
                    Some(index) => {
                        self.items[index] = record.clone();
                        Settled::Confirmed(record)
                    }
                    None => Settled::Detached,
                }
            }
        }
    }

    pub fn roll_back(&mut self, txn: &Transaction) -> Settled {
        match txn.kind {
            MutationKind::Create => {
                if let Some(index) = self.position(&txn.target) {
                    self.items.remove(index);
                }
                Settled::Removed
            }
            MutationKind::Update => {
                if let (Some(index), Some(original)) =
                    (self.position(&txn.target), &txn.pre_state)
                {
                    self.items[index] = original.clone();
                }
                Settled::RolledBack
            }
            MutationKind::Delete => {
                if let Some(original) = &txn.pre_state {
                    if self.position(&original.id).is_none() {
                        self.items.push(original.clone());
                    }
                }
                Settled::RolledBack
            }
        }
    }
}
