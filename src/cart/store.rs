//! Keeps cart contents in the database and pushes every change to the
//! visitors watching that cart.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use rusqlite::Connection;
use tokio::sync::watch;

use crate::{
    Error,
    cart::{
        CartId, CartItem,
        db::{add_cart_item, clear_cart, get_cart_items, remove_cart_item},
    },
    product::ProductId,
};

type Channels = Arc<Mutex<HashMap<CartId, watch::Sender<Vec<CartItem>>>>>;

/// The carts of all visitors.
///
/// A channel only exists for a cart while something holds a
/// [CartSubscription] to it.
#[derive(Debug, Clone)]
pub struct CartStore {
    db_connection: Arc<Mutex<Connection>>,
    channels: Channels,
}

impl CartStore {
    pub fn new(db_connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            db_connection,
            channels: Arc::default(),
        }
    }

    /// The contents of the cart, in the order products were first added.
    pub fn items(&self, cart_id: CartId) -> Result<Vec<CartItem>, Error> {
        let connection = self
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        get_cart_items(cart_id, &connection)
    }

    /// Add one of `product_id` to the cart and return the new contents.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if the product does not exist.
    pub fn add_product(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<Vec<CartItem>, Error> {
        self.mutate(cart_id, |connection| {
            add_cart_item(cart_id, product_id, connection)
        })
    }

    /// Remove `product_id` from the cart and return the new contents.
    ///
    /// # Errors
    ///
    /// Returns [Error::RemoveMissingCartItem] if the product is not in the cart.
    pub fn remove_product(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<Vec<CartItem>, Error> {
        self.mutate(cart_id, |connection| {
            remove_cart_item(cart_id, product_id, connection)
        })
    }

    pub fn clear(&self, cart_id: CartId) -> Result<(), Error> {
        self.mutate(cart_id, |connection| clear_cart(cart_id, connection))
            .map(|_| ())
    }

    /// Watch the contents of a cart.
    ///
    /// The subscription starts with the current contents and sees every
    /// later change. Dropping it unsubscribes.
    pub fn subscribe(&self, cart_id: CartId) -> Result<CartSubscription, Error> {
        // Lock order is always the database, then the channels.
        let connection = self
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;
        let mut channels = self
            .channels
            .lock()
            .map_err(|_| Error::SubscriptionLockError)?;

        let receiver = match channels.get(&cart_id) {
            Some(sender) => sender.subscribe(),
            None => {
                let (sender, receiver) = watch::channel(get_cart_items(cart_id, &connection)?);
                channels.insert(cart_id, sender);
                tracing::debug!("Opened channel for cart {cart_id}");
                receiver
            }
        };

        Ok(CartSubscription {
            cart_id,
            receiver: Some(receiver),
            channels: self.channels.clone(),
        })
    }

    /// Re-read every watched cart and publish the ones that changed.
    ///
    /// Deleting products or categories removes cart entries without going
    /// through the store. The caller must not hold the database lock.
    pub fn refresh_subscribers(&self) -> Result<(), Error> {
        let connection = self
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;
        let channels = self
            .channels
            .lock()
            .map_err(|_| Error::SubscriptionLockError)?;

        for (cart_id, sender) in channels.iter() {
            let items = get_cart_items(*cart_id, &connection)?;

            sender.send_if_modified(|current| {
                let changed = *current != items;
                if changed {
                    *current = items;
                }
                changed
            });
        }

        Ok(())
    }

    /// How many carts currently have at least one subscriber.
    pub fn open_channel_count(&self) -> usize {
        self.channels
            .lock()
            .map(|channels| channels.len())
            .unwrap_or_default()
    }

    /// Apply `change` and publish the new contents of the cart.
    ///
    /// Publishing happens under the database lock so subscribers see changes
    /// to a cart in the order they were written.
    fn mutate(
        &self,
        cart_id: CartId,
        change: impl FnOnce(&Connection) -> Result<(), Error>,
    ) -> Result<Vec<CartItem>, Error> {
        let connection = self
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        change(&connection)?;
        let items = get_cart_items(cart_id, &connection)?;
        self.publish(cart_id, &items);

        Ok(items)
    }

    fn publish(&self, cart_id: CartId, items: &[CartItem]) {
        match self.channels.lock() {
            Ok(channels) => {
                if let Some(sender) = channels.get(&cart_id) {
                    sender.send_replace(items.to_vec());
                }
            }
            Err(error) => {
                tracing::error!("Could not publish cart {cart_id}: {error}");
            }
        }
    }
}

/// A live view of one cart's contents.
///
/// Dropping the last subscription of a cart removes the cart's channel from
/// the [CartStore].
#[derive(Debug)]
pub struct CartSubscription {
    cart_id: CartId,
    // Only `None` while dropping.
    receiver: Option<watch::Receiver<Vec<CartItem>>>,
    channels: Channels,
}

impl CartSubscription {
    pub fn cart_id(&self) -> CartId {
        self.cart_id
    }

    /// The latest contents, marking them as seen.
    pub fn current(&mut self) -> Vec<CartItem> {
        self.receiver
            .as_mut()
            .map(|receiver| receiver.borrow_and_update().clone())
            .unwrap_or_default()
    }

    /// Wait until the cart changes and return its new contents.
    ///
    /// # Errors
    ///
    /// Returns [Error::CartChannelClosed] if the channel was removed.
    pub async fn changed(&mut self) -> Result<Vec<CartItem>, Error> {
        let receiver = self.receiver.as_mut().ok_or(Error::CartChannelClosed)?;

        receiver
            .changed()
            .await
            .map_err(|_| Error::CartChannelClosed)?;

        Ok(receiver.borrow_and_update().clone())
    }
}

impl Drop for CartSubscription {
    fn drop(&mut self) {
        let Ok(mut channels) = self.channels.lock() else {
            return;
        };

        // Drop the receiver while holding the lock so that two subscriptions
        // dropping at once cannot both see the other as still alive.
        drop(self.receiver.take());

        let is_last = channels
            .get(&self.cart_id)
            .is_some_and(|sender| sender.receiver_count() == 0);

        if is_last {
            channels.remove(&self.cart_id);
            tracing::debug!("Closed channel for cart {}", self.cart_id);
        }
    }
}
