use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Which power stat drives a target's damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerType {
    #[default]
    Physical,
    Magical,
}

impl fmt::Display for PowerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerType::Physical => write!(f, "Physical"),
            PowerType::Magical => write!(f, "Magical"),
        }
    }
}

/// Additive stat bundle shared by targets and items
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stats {
    pub power_physical: f64,
    pub power_magical: f64,
    /// Attack speed contribution, in percent
    pub attack_speed: f64,
    pub health: f64,
    pub mana: f64,
    pub physical_protection: f64,
    pub magical_protection: f64,
}

impl Stats {
    /// The power stat relevant for `power_type`; the other one is ignored
    pub fn power(&self, power_type: PowerType) -> f64 {
        match power_type {
            PowerType::Physical => self.power_physical,
            PowerType::Magical => self.power_magical,
        }
    }
}

impl Add for Stats {
    type Output = Stats;

    fn add(self, rhs: Stats) -> Stats {
        Stats {
            power_physical: self.power_physical + rhs.power_physical,
            power_magical: self.power_magical + rhs.power_magical,
            attack_speed: self.attack_speed + rhs.attack_speed,
            health: self.health + rhs.health,
            mana: self.mana + rhs.mana,
            physical_protection: self.physical_protection + rhs.physical_protection,
            magical_protection: self.magical_protection + rhs.magical_protection,
        }
    }
}

impl Sum for Stats {
    fn sum<I: Iterator<Item = Stats>>(iter: I) -> Self {
        iter.fold(Stats::default(), Add::add)
    }
}

impl<'a> Sum<&'a Stats> for Stats {
    fn sum<I: Iterator<Item = &'a Stats>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// A piece of equipment that can fill a loadout slot
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    name: String,
    stats: Stats,
    starter: bool,
}

impl Item {
    pub fn new(name: impl Into<String>, stats: Stats) -> Self {
        Self {
            name: name.into(),
            stats,
            starter: false,
        }
    }

    /// A starter item; a loadout holds at most one of them
    pub fn starter(name: impl Into<String>, stats: Stats) -> Self {
        Self::new(name, stats).with_starter(true)
    }

    pub fn with_starter(mut self, starter: bool) -> Self {
        self.starter = starter;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn is_starter(&self) -> bool {
        self.starter
    }
}

/// The character a loadout is built for
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    name: String,
    power_type: PowerType,
    base_stats: Stats,
}

impl Target {
    pub fn new(name: impl Into<String>, power_type: PowerType, base_stats: Stats) -> Self {
        Self {
            name: name.into(),
            power_type,
            base_stats,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn power_type(&self) -> PowerType {
        self.power_type
    }

    pub fn base_stats(&self) -> &Stats {
        &self.base_stats
    }

    /// Damage metric with no items equipped
    pub fn base_metric(&self) -> f64 {
        Self::metric(&self.base_stats, self.power_type)
    }

    /// Damage metric with `items` equipped on top of the base stats:
    /// `power × (1 + attack_speed / 100)`
    pub fn metric_with<'a, I>(&self, items: I) -> f64
    where
        I: IntoIterator<Item = &'a Item>,
    {
        let total = self.base_stats + items.into_iter().map(Item::stats).sum::<Stats>();
        Self::metric(&total, self.power_type)
    }

    fn metric(stats: &Stats, power_type: PowerType) -> f64 {
        stats.power(power_type) * (1.0 + stats.attack_speed / 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warrior() -> Target {
        Target::new(
            "Warrior",
            PowerType::Physical,
            Stats {
                power_physical: 40.0,
                power_magical: 500.0,
                attack_speed: 100.0,
                ..Stats::default()
            },
        )
    }

    #[test]
    fn base_metric_uses_only_the_relevant_power() {
        assert_eq!(warrior().base_metric(), 80.0);
    }

    #[test]
    fn items_add_to_base_stats() {
        let blade = Item::new(
            "Blade",
            Stats {
                power_physical: 10.0,
                attack_speed: 20.0,
                health: 100.0,
                ..Stats::default()
            },
        );

        // (40 + 10) × (1 + 120 / 100)
        assert!((warrior().metric_with([&blade]) - 110.0).abs() < 1e-9);
        assert_eq!(warrior().metric_with(std::iter::empty()), warrior().base_metric());
    }

    #[test]
    fn magical_target_ignores_physical_power() {
        let mage = Target::new(
            "Mage",
            PowerType::Magical,
            Stats {
                power_physical: 1000.0,
                power_magical: 50.0,
                ..Stats::default()
            },
        );
        assert_eq!(mage.base_metric(), 50.0);
    }

    #[test]
    fn starter_flag() {
        assert!(Item::starter("Bumba's", Stats::default()).is_starter());
        assert!(!Item::new("Boots", Stats::default()).is_starter());
    }
}
