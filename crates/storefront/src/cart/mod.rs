//! Cart store.
//!
//! Holds the shopper's cart lines, persists the full list under the `cart`
//! storage key after every mutation and publishes a [`CartSnapshot`] to
//! subscribers so badges and summaries stay current.
//!
//! Mutations write to storage first and only then commit in memory, so a
//! failed write leaves the cart exactly as it was.

mod line;

pub use line::{CartLine, LineKey};

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

use anime_tribes_core::storage::{self, keys};
use anime_tribes_core::{Money, PersistError, Storage};

/// Errors returned by cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// A line was added with a quantity of zero.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The cart could not be written to storage.
    #[error("failed to persist cart: {0}")]
    Persistence(#[from] PersistError),
}

/// What subscribers see after each change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    /// Sum of all line quantities.
    pub count: u32,
}

impl CartSnapshot {
    fn of(lines: &[CartLine]) -> Self {
        Self {
            lines: lines.to_vec(),
            count: total_quantity(lines),
        }
    }
}

/// The cart store.
pub struct CartStore<S: Storage> {
    storage: S,
    lines: Vec<CartLine>,
    count: u32,
    tx: watch::Sender<CartSnapshot>,
}

impl<S: Storage> CartStore<S> {
    /// Open the store, rehydrating any persisted cart.
    ///
    /// A missing value yields an empty cart. A corrupt value is logged and
    /// also yields an empty cart. Persisted lines with a zero quantity are
    /// dropped.
    pub fn open(storage: S) -> Self {
        let lines = match storage::load_json::<Vec<CartLine>, _>(&storage, keys::CART) {
            Ok(Some(lines)) => {
                let before = lines.len();
                let lines: Vec<CartLine> = lines.into_iter().filter(|l| l.quantity > 0).collect();
                if lines.len() != before {
                    warn!(dropped = before - lines.len(), "Dropped empty cart lines on load");
                }
                lines
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to load cart from storage, starting empty");
                Vec::new()
            }
        };

        let (tx, _rx) = watch::channel(CartSnapshot::of(&lines));
        let count = total_quantity(&lines);
        debug!(lines = lines.len(), count, "Cart opened");

        Self {
            storage,
            lines,
            count,
            tx,
        }
    }

    /// Current lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Total number of units across all lines.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Find the line for `key`.
    #[must_use]
    pub fn get(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.matches(key))
    }

    /// Receive a snapshot after every committed change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.tx.subscribe()
    }

    /// Add a line, merging it into an existing line for the same selection.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a zero quantity, or
    /// [`CartError::Persistence`] if the cart could not be saved.
    pub fn add(&mut self, line: CartLine) -> Result<(), CartError> {
        if line.quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let mut next = self.lines.clone();
        let key = line.key();
        match next.iter_mut().find(|l| l.matches(&key)) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
            }
            None => next.push(line),
        }

        debug!(product_id = %key.product_id, "Adding to cart");
        self.commit(next)
    }

    /// Remove the line for `key`. Removing a missing line is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persistence`] if the cart could not be saved.
    pub fn remove(&mut self, key: &LineKey) -> Result<(), CartError> {
        if self.get(key).is_none() {
            return Ok(());
        }
        let next: Vec<CartLine> = self
            .lines
            .iter()
            .filter(|l| !l.matches(key))
            .cloned()
            .collect();
        self.commit(next)
    }

    /// Overwrite the quantity of the line for `key`.
    ///
    /// A quantity of zero removes the line. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persistence`] if the cart could not be saved.
    pub fn update_quantity(&mut self, key: &LineKey, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(key);
        }

        let mut next = self.lines.clone();
        let Some(line) = next.iter_mut().find(|l| l.matches(key)) else {
            return Ok(());
        };
        line.quantity = quantity;
        self.commit(next)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persistence`] if the cart could not be saved.
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.commit(Vec::new())
    }

    fn commit(&mut self, next: Vec<CartLine>) -> Result<(), CartError> {
        storage::save_json(&self.storage, keys::CART, &next)?;

        self.count = total_quantity(&next);
        self.lines = next;
        self.tx.send_replace(CartSnapshot::of(&self.lines));
        Ok(())
    }
}

fn total_quantity(lines: &[CartLine]) -> u32 {
    lines
        .iter()
        .fold(0u32, |sum, line| sum.saturating_add(line.quantity))
}
