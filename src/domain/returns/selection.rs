use std::collections::BTreeMap;

use super::value_objects::{ItemId, OrderId, OrderItem};

// ============================================================================
// Selection Set - items marked for return within one expanded order
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSet {
    order_id: OrderId,
    items: BTreeMap<ItemId, OrderItem>,
}

impl SelectionSet {
    /// Empty selection scoped to `order_id`
    pub fn new(order_id: OrderId) -> Self {
        Self {
            order_id,
            items: BTreeMap::new(),
        }
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Add the item if absent, remove it if present. Returns whether the item
    /// is selected afterwards.
    pub fn toggle(&mut self, item: &OrderItem) -> bool {
        if self.items.remove(&item.id).is_some() {
            false
        } else {
            self.items.insert(item.id.clone(), item.clone());
            true
        }
    }

    pub fn contains(&self, item_id: &ItemId) -> bool {
        self.items.contains_key(item_id)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_ids(&self) -> impl Iterator<Item = &ItemId> {
        self.items.keys()
    }

    pub fn items(&self) -> impl Iterator<Item = &OrderItem> {
        self.items.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> OrderItem {
        OrderItem {
            id: ItemId::from(id),
            product_name: format!("Product {id}"),
            product_image: format!("/images/{id}.jpg"),
            quantity: 1,
            rental_days: None,
            return_date: None,
        }
    }

    #[test]
    fn test_toggle_a_b_a_leaves_b() {
        let (a, b) = (item("A"), item("B"));
        let mut selection = SelectionSet::new(OrderId::from("O1"));

        assert!(selection.toggle(&a));
        assert!(selection.toggle(&b));
        assert!(!selection.toggle(&a));

        assert_eq!(selection.len(), 1);
        assert!(selection.contains(&b.id));
        assert!(!selection.contains(&a.id));
    }

    #[test]
    fn test_membership_follows_toggle_parity() {
        let items = [item("A"), item("B"), item("C")];
        let mut selection = SelectionSet::new(OrderId::from("O1"));
        let mut counts = [0usize; 3];

        // Deterministic mixed sequence of toggles
        let sequence = [0, 1, 1, 2, 0, 0, 2, 1, 2, 2, 0];
        for &idx in &sequence {
            selection.toggle(&items[idx]);
            counts[idx] += 1;

            for (i, it) in items.iter().enumerate() {
                assert_eq!(selection.contains(&it.id), counts[i] % 2 == 1);
            }
        }
    }

    #[test]
    fn test_clear_empties_selection_but_keeps_scope() {
        let mut selection = SelectionSet::new(OrderId::from("O1"));
        selection.toggle(&item("A"));
        selection.toggle(&item("B"));

        selection.clear();

        assert!(selection.is_empty());
        assert_eq!(selection.order_id().as_str(), "O1");
    }

    #[test]
    fn test_item_ids_are_ordered() {
        let mut selection = SelectionSet::new(OrderId::from("O1"));
        selection.toggle(&item("C"));
        selection.toggle(&item("A"));

        let ids: Vec<&str> = selection.item_ids().map(ItemId::as_str).collect();
        assert_eq!(ids, vec!["A", "C"]);
    }
}
