use super::item::Item;
use crate::domain::{OptimizerError, OptimizerResult};

/// Number of item slots in a loadout
pub const LOADOUT_SLOTS: usize = 6;

/// Fixed-size set of item slots; a slot may stay empty
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Loadout<'a> {
    slots: [Option<&'a Item>; LOADOUT_SLOTS],
}

impl<'a> Loadout<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `item` into the first free slot and return that slot's index
    pub fn insert(&mut self, item: &'a Item) -> OptimizerResult<usize> {
        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or_else(|| {
                OptimizerError::model(format!(
                    "Loadout is full; cannot insert '{}'",
                    item.name()
                ))
            })?;
        self.slots[index] = Some(item);
        Ok(index)
    }

    pub fn slot(&self, index: usize) -> Option<&'a Item> {
        self.slots.get(index).copied().flatten()
    }

    pub fn slots(&self) -> &[Option<&'a Item>; LOADOUT_SLOTS] {
        &self.slots
    }

    /// Filled slots in slot order
    pub fn items(&self) -> impl Iterator<Item = &'a Item> + '_ {
        self.slots.iter().flatten().copied()
    }

    pub fn count_items(&self) -> usize {
        self.items().count()
    }

    pub fn starter_count(&self) -> usize {
        self.items().filter(|item| item.is_starter()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.count_items() == LOADOUT_SLOTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loadout::Stats;

    #[test]
    fn fills_slots_in_order() {
        let items: Vec<Item> = (0..LOADOUT_SLOTS)
            .map(|i| Item::new(format!("item_{}", i), Stats::default()))
            .collect();
        let mut loadout = Loadout::new();
        assert_eq!(loadout.count_items(), 0);
        assert_eq!(loadout.slot(0), None);

        for (i, item) in items.iter().enumerate() {
            assert_eq!(loadout.insert(item).unwrap(), i);
        }

        assert!(loadout.is_complete());
        assert_eq!(loadout.slot(5).map(Item::name), Some("item_5"));
        assert_eq!(loadout.slot(6), None);
    }

    #[test]
    fn full_loadout_rejects_inserts() {
        let item = Item::new("Boots", Stats::default());
        let mut loadout = Loadout::new();
        for _ in 0..LOADOUT_SLOTS {
            loadout.insert(&item).unwrap();
        }

        assert!(matches!(loadout.insert(&item), Err(OptimizerError::Model(_))));
    }

    #[test]
    fn counts_starters() {
        let starter = Item::starter("Bumba's", Stats::default());
        let boots = Item::new("Boots", Stats::default());
        let mut loadout = Loadout::new();
        loadout.insert(&starter).unwrap();
        loadout.insert(&boots).unwrap();

        assert_eq!(loadout.starter_count(), 1);
        assert!(!loadout.is_complete());
    }
}
