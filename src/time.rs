//! Time Tracking
//!
//! Estimate and spent seconds per (ticket, person), summed over duplicate
//! entries.

use std::collections::{BTreeMap, HashMap};
use std::ops::{Add, AddAssign};

use crate::error::ApiError;
use crate::models::{PersonId, TicketKey, TimeColumns};

/// Spent vs. estimated seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub spent: u64,
    pub estimate: u64,
}

impl Progress {
    /// spent / estimate clamped to [0, 1]; 0 without an estimate
    pub fn fraction(&self) -> f64 {
        if self.estimate == 0 {
            return 0.0;
        }
        (self.spent as f64 / self.estimate as f64).clamp(0.0, 1.0)
    }
}

impl Add for Progress {
    type Output = Progress;

    fn add(self, other: Progress) -> Progress {
        Progress {
            spent: self.spent + other.spent,
            estimate: self.estimate + other.estimate,
        }
    }
}

impl AddAssign for Progress {
    fn add_assign(&mut self, other: Progress) {
        *self = *self + other;
    }
}

/// Aggregated time entries: ticket -> person -> seconds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeTable {
    pub estimate: HashMap<TicketKey, BTreeMap<PersonId, u64>>,
    pub spent: HashMap<TicketKey, BTreeMap<PersonId, u64>>,
}

impl TimeTable {
    pub fn from_columns(columns: &TimeColumns) -> Result<Self, ApiError> {
        columns.check()?;
        let mut table = TimeTable::default();
        let rows = columns
            .tickets
            .iter()
            .zip(&columns.people)
            .zip(columns.estimates.iter().zip(&columns.spent));
        for ((ticket, person), (estimate, spent)) in rows {
            table.add(*ticket, *person, *estimate, *spent);
        }
        Ok(table)
    }

    /// Add one entry to the sums for (ticket, person)
    pub fn add(&mut self, ticket: TicketKey, person: PersonId, estimate: u64, spent: u64) {
        *self.estimate.entry(ticket).or_default().entry(person).or_default() += estimate;
        *self.spent.entry(ticket).or_default().entry(person).or_default() += spent;
    }

    /// The ticket's own time, summed over people
    pub fn progress(&self, ticket: TicketKey) -> Progress {
        let sum = |m: &HashMap<TicketKey, BTreeMap<PersonId, u64>>| {
            m.get(&ticket).map(|people| people.values().sum::<u64>()).unwrap_or(0)
        };
        Progress {
            spent: sum(&self.spent),
            estimate: sum(&self.estimate),
        }
    }

    /// Per-person breakdown for one ticket as (person, progress)
    pub fn by_person(&self, ticket: TicketKey) -> Vec<(PersonId, Progress)> {
        let mut people: BTreeMap<PersonId, Progress> = BTreeMap::new();
        if let Some(estimates) = self.estimate.get(&ticket) {
            for (person, seconds) in estimates {
                people.entry(*person).or_default().estimate += seconds;
            }
        }
        if let Some(spent) = self.spent.get(&ticket) {
            for (person, seconds) in spent {
                people.entry(*person).or_default().spent += seconds;
            }
        }
        people.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> TimeColumns {
        TimeColumns {
            tickets: vec![1, 1, 1, 2],
            people: vec![10, 10, 11, 10],
            estimates: vec![3600, 1800, 600, 100],
            spent: vec![60, 60, 0, 50],
        }
    }

    #[test]
    fn test_duplicate_entries_are_summed() {
        let table = TimeTable::from_columns(&columns()).unwrap();
        assert_eq!(table.estimate[&1][&10], 5400);
        assert_eq!(table.spent[&1][&10], 120);
        assert_eq!(table.estimate[&1][&11], 600);
        assert_eq!(table.progress(1), Progress { spent: 120, estimate: 6000 });
        assert_eq!(table.progress(2), Progress { spent: 50, estimate: 100 });
        assert_eq!(table.progress(3), Progress::default());
    }

    #[test]
    fn test_by_person() {
        let table = TimeTable::from_columns(&columns()).unwrap();
        assert_eq!(
            table.by_person(1),
            vec![
                (10, Progress { spent: 120, estimate: 5400 }),
                (11, Progress { spent: 0, estimate: 600 }),
            ]
        );
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let mut cols = columns();
        cols.spent.pop();
        assert!(TimeTable::from_columns(&cols).is_err());
    }

    #[test]
    fn test_fraction_is_clamped() {
        assert_eq!(Progress { spent: 5, estimate: 0 }.fraction(), 0.0);
        assert_eq!(Progress { spent: 50, estimate: 100 }.fraction(), 0.5);
        assert_eq!(Progress { spent: 300, estimate: 100 }.fraction(), 1.0);
    }
}
