use std::collections::HashMap;

use serde::Serialize;

use crate::schema::{Quantity, ShoppingRow, Uuid};

/// Identity under which ingredient lines merge on the shopping list.
///
/// A catalog food id and an equal-looking display name are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MergeKey {
    Name(String),
    Food(Uuid),
    Unique(uuid::Uuid),
}

impl MergeKey {
    fn from_row(row: &ShoppingRow) -> Self {
        match (&row.name, row.food_id) {
            (Some(name), _) => MergeKey::Name(name.clone()),
            (None, Some(food_id)) => MergeKey::Food(food_id),
            (None, None) => MergeKey::Unique(uuid::Uuid::new_v4()),
        }
    }

    fn display_id(&self, food_id: Option<Uuid>) -> String {
        if let Some(food_id) = food_id {
            return food_id.to_string();
        }
        match self {
            MergeKey::Name(name) => name.clone(),
            MergeKey::Food(food_id) => food_id.to_string(),
            MergeKey::Unique(generated) => generated.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingListItem {
    pub id: String,
    pub name: Option<String>,
    pub quantity: Quantity,
}

/// Folds the ingredient lines of every recipe planned in a week into one
/// deduplicated list, preserving the order of first occurrence.
///
/// Quantities merge by summing values (a missing value counts as 0) under the
/// unit of the group's first line. Lines measured in different units are
/// still summed; the list is an approximation for the shop, not a unit
/// conversion. A line with neither a name nor a food id gets a fresh key and
/// never merges with anything.
pub fn aggregate_ingredients(rows: Vec<ShoppingRow>) -> Vec<ShoppingListItem> {
    let mut index: HashMap<MergeKey, usize> = HashMap::new();
    let mut items: Vec<ShoppingListItem> = Vec::new();

    for row in rows {
        let key = MergeKey::from_row(&row);
        match index.get(&key) {
            Some(&at) => {
                let total = items[at].quantity.value.unwrap_or(0.0)
                    + row.quantity_value.unwrap_or(0.0);
                items[at].quantity.value = Some(total);
            }
            None => {
                let item = ShoppingListItem {
                    id: key.display_id(row.food_id),
                    name: row.name,
                    quantity: Quantity {
                        value: Some(row.quantity_value.unwrap_or(0.0)),
                        unit: row.quantity_unit,
                    },
                };
                index.insert(key, items.len());
                items.push(item);
            }
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        food_id: Option<Uuid>,
        name: Option<&str>,
        value: Option<f64>,
        unit: Option<&str>,
    ) -> ShoppingRow {
        ShoppingRow {
            food_id,
            name: name.map(str::to_string),
            quantity_value: value,
            quantity_unit: unit.map(str::to_string),
        }
    }

    #[test]
    fn empty_input_yields_empty_list() {
        assert!(aggregate_ingredients(vec![]).is_empty());
    }

    #[test]
    fn distinct_lines_pass_through_unchanged() {
        let items = aggregate_ingredients(vec![
            row(None, Some("Tomato"), Some(200.0), Some("GRAM")),
            row(None, Some("Pasta"), Some(500.0), Some("GRAM")),
        ]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity.value, Some(200.0));
        assert_eq!(items[1].quantity.value, Some(500.0));
    }

    #[test]
    fn same_name_sums_quantities() {
        let items = aggregate_ingredients(vec![
            row(None, Some("flour"), Some(200.0), Some("g")),
            row(None, Some("flour"), Some(50.0), Some("g")),
        ]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name.as_deref(), Some("flour"));
        assert_eq!(items[0].quantity.value, Some(250.0));
        assert_eq!(items[0].quantity.unit.as_deref(), Some("g"));
    }

    #[test]
    fn missing_values_count_as_zero() {
        let items = aggregate_ingredients(vec![
            row(None, Some("Salt"), None, None),
            row(None, Some("Salt"), Some(5.0), Some("GRAM")),
        ]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity.value, Some(5.0));
        // first line had no unit, and the first line's unit wins
        assert_eq!(items[0].quantity.unit, None);
    }

    #[test]
    fn mismatched_units_sum_under_first_unit() {
        let items = aggregate_ingredients(vec![
            row(None, Some("Milk"), Some(200.0), Some("ML")),
            row(None, Some("Milk"), Some(1.0), Some("CUP")),
        ]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity.value, Some(201.0));
        assert_eq!(items[0].quantity.unit.as_deref(), Some("ML"));
    }

    #[test]
    fn name_takes_priority_over_food_id() {
        let items = aggregate_ingredients(vec![
            row(Some(7), Some("Eggs"), Some(4.0), None),
            row(Some(8), Some("Eggs"), Some(3.0), None),
        ]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity.value, Some(7.0));
        // id reflects the first line's catalog reference
        assert_eq!(items[0].id, "7");
    }

    #[test]
    fn food_id_merges_unnamed_lines() {
        let items = aggregate_ingredients(vec![
            row(Some(12), None, Some(1.0), Some("KPL")),
            row(Some(12), None, Some(2.0), Some("KPL")),
        ]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity.value, Some(3.0));
        assert_eq!(items[0].id, "12");
    }

    #[test]
    fn food_id_never_collides_with_equal_name() {
        let items = aggregate_ingredients(vec![
            row(Some(42), None, Some(1.0), None),
            row(None, Some("42"), Some(1.0), None),
        ]);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn anonymous_lines_never_merge() {
        let items = aggregate_ingredients(vec![
            row(None, None, Some(1.0), Some("GRAM")),
            row(None, None, Some(1.0), Some("GRAM")),
        ]);
        assert_eq!(items.len(), 2);
        assert_ne!(items[0].id, items[1].id);
    }

    #[test]
    fn output_preserves_first_seen_order() {
        let items = aggregate_ingredients(vec![
            row(None, Some("Zucchini"), Some(1.0), None),
            row(None, Some("Apple"), Some(2.0), None),
            row(None, Some("Zucchini"), Some(1.0), None),
            row(None, Some("Meat"), Some(300.0), Some("GRAM")),
        ]);
        let names: Vec<_> = items.iter().map(|i| i.name.as_deref().unwrap()).collect();
        assert_eq!(names, vec!["Zucchini", "Apple", "Meat"]);
    }
}
