//! Member cart assembled before a request is submitted.

use crate::error::LifecycleError;
use crate::types::ComponentId;
use serde::{Deserialize, Serialize};

/// A component and the units wanted
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Wanted component
    pub component_id: ComponentId,
    /// Units wanted
    pub quantity: u32,
}

impl CartItem {
    /// Creates a cart item
    #[must_use]
    pub fn new(component_id: impl Into<ComponentId>, quantity: u32) -> Self {
        Self {
            component_id: component_id.into(),
            quantity,
        }
    }
}

/// Ordered set of cart items, at most one per component
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates an empty cart
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Builds a cart from raw items, merging duplicates in first-seen order
    ///
    /// # Errors
    ///
    /// [`LifecycleError::Validation`] if merged units overflow.
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Result<Self, LifecycleError> {
        let mut cart = Self::new();
        for item in items {
            cart.add(item.component_id, item.quantity)?;
        }
        Ok(cart)
    }

    /// Adds units, merging with an existing entry for the same component
    ///
    /// Zero units are ignored.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::Validation`] if the merged units overflow.
    pub fn add(&mut self, component_id: ComponentId, quantity: u32) -> Result<(), LifecycleError> {
        if quantity == 0 {
            return Ok(());
        }
        match self
            .items
            .iter_mut()
            .find(|item| item.component_id == component_id)
        {
            Some(item) => {
                item.quantity = item.quantity.checked_add(quantity).ok_or_else(|| {
                    LifecycleError::validation(format!(
                        "Quantity for component {component_id} is too large"
                    ))
                })?;
            },
            None => self.items.push(CartItem {
                component_id,
                quantity,
            }),
        }
        Ok(())
    }

    /// Items in insertion order
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether the cart holds nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
