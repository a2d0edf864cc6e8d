//! Frontend Models
//!
//! Ticket data as held by the client, and the JSON shapes exchanged with the
//! ticket API. The bulk endpoint sends tickets and time entries as parallel
//! arrays (one array per field), which are zipped back into records here.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Unexpected, Visitor};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub type TicketKey = u32;
pub type PersonId = u32;

/// Ticket record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub key: TicketKey,
    pub title: String,
    pub description: String,
    pub parent: Option<TicketKey>,
    #[serde(rename = "type")]
    pub ticket_type: i32,
    pub status: i32,
    pub priority: i32,
    /// Manual rank among tickets of the same priority
    pub order: f64,
    pub creator: Option<PersonId>,
    pub last_updated_by: Option<PersonId>,
    pub created_on: Option<DateTime<Utc>>,
    pub last_updated_on: Option<DateTime<Utc>>,
    /// Derived from the other tickets' `parent`, sorted ascending
    #[serde(skip)]
    pub children: Vec<TicketKey>,
}

impl Ticket {
    /// Local record for a ticket that only exists in a create request so far
    pub fn from_new(key: TicketKey, new: &NewTicket, order: f64) -> Self {
        Self {
            key,
            title: new.title.clone(),
            description: new.description.clone(),
            parent: new.parent,
            ticket_type: new.ticket_type,
            status: new.status,
            priority: new.priority,
            order,
            creator: None,
            last_updated_by: None,
            created_on: None,
            last_updated_on: None,
            children: Vec::new(),
        }
    }
}

/// Lookup table from a small enum value to its display name.
///
/// The server may send either `{"0": "Bug", ...}` or `["Bug", ...]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameTable(BTreeMap<i32, String>);

impl NameTable {
    pub fn get(&self, value: i32) -> Option<&str> {
        self.0.get(&value).map(String::as_str)
    }

    /// Display name, or the bare number for unknown values
    pub fn name(&self, value: i32) -> String {
        self.get(value).map(str::to_string).unwrap_or_else(|| value.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &str)> + '_ {
        self.0.iter().map(|(value, name)| (*value, name.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(i32, String)> for NameTable {
    fn from_iter<I: IntoIterator<Item = (i32, String)>>(iter: I) -> Self {
        NameTable(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for NameTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NameTableVisitor;

        impl<'de> Visitor<'de> for NameTableVisitor {
            type Value = NameTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a list of names or a map from value to name")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut names = BTreeMap::new();
                let mut value = 0;
                while let Some(name) = seq.next_element::<String>()? {
                    names.insert(value, name);
                    value += 1;
                }
                Ok(NameTable(names))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut names = BTreeMap::new();
                while let Some((key, name)) = map.next_entry::<String, String>()? {
                    let value = key
                        .trim()
                        .parse::<i32>()
                        .map_err(|_| de::Error::invalid_value(Unexpected::Str(&key), &"an integer key"))?;
                    names.insert(value, name);
                }
                Ok(NameTable(names))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(NameTable::default())
            }
        }

        deserializer.deserialize_any(NameTableVisitor)
    }
}

// ========================
// Wire Types
// ========================

/// `GET /api/tickets` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketsPayload {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub max_key: TicketKey,
    #[serde(default)]
    pub name_types: NameTable,
    #[serde(default)]
    pub name_priorities: NameTable,
    #[serde(default)]
    pub name_statuses: NameTable,
    pub tickets: TicketColumns,
    #[serde(default)]
    pub ticket_time: TimeColumns,
}

/// Tickets as parallel arrays
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketColumns {
    pub keys: Vec<TicketKey>,
    pub parents: Vec<Option<TicketKey>>,
    pub titles: Vec<String>,
    pub descriptions: Vec<Option<String>>,
    pub types: Vec<i32>,
    pub priorities: Vec<i32>,
    pub statuses: Vec<i32>,
    #[serde(default)]
    pub orders: Vec<f64>,
    #[serde(default)]
    pub creators: Vec<Option<PersonId>>,
    #[serde(default)]
    pub last_updated_by: Vec<Option<PersonId>>,
    #[serde(default)]
    pub created_on: Vec<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub last_updated_on: Vec<Option<DateTime<Utc>>>,
}

fn check_column(column: &'static str, found: usize, expected: usize) -> Result<(), ApiError> {
    if found == expected {
        Ok(())
    } else {
        Err(ApiError::ColumnMismatch { column, expected, found })
    }
}

fn check_optional_column(column: &'static str, found: usize, expected: usize) -> Result<(), ApiError> {
    if found == 0 {
        Ok(())
    } else {
        check_column(column, found, expected)
    }
}

impl TicketColumns {
    /// Zip the columns into tickets. `children` is left empty.
    pub fn into_tickets(self) -> Result<Vec<Ticket>, ApiError> {
        let n = self.keys.len();
        check_column("parents", self.parents.len(), n)?;
        check_column("titles", self.titles.len(), n)?;
        check_column("descriptions", self.descriptions.len(), n)?;
        check_column("types", self.types.len(), n)?;
        check_column("priorities", self.priorities.len(), n)?;
        check_column("statuses", self.statuses.len(), n)?;
        check_optional_column("orders", self.orders.len(), n)?;
        check_optional_column("creators", self.creators.len(), n)?;
        check_optional_column("last_updated_by", self.last_updated_by.len(), n)?;
        check_optional_column("created_on", self.created_on.len(), n)?;
        check_optional_column("last_updated_on", self.last_updated_on.len(), n)?;

        let mut parents = self.parents.into_iter();
        let mut titles = self.titles.into_iter();
        let mut descriptions = self.descriptions.into_iter();
        let mut types = self.types.into_iter();
        let mut priorities = self.priorities.into_iter();
        let mut statuses = self.statuses.into_iter();
        let mut orders = self.orders.into_iter();
        let mut creators = self.creators.into_iter();
        let mut updaters = self.last_updated_by.into_iter();
        let mut created = self.created_on.into_iter();
        let mut updated = self.last_updated_on.into_iter();

        let tickets = self
            .keys
            .into_iter()
            .map(|key| Ticket {
                key,
                // 0 is the server's "no parent"
                parent: parents.next().flatten().filter(|p| *p != 0),
                title: titles.next().unwrap_or_default(),
                description: descriptions.next().flatten().unwrap_or_default(),
                ticket_type: types.next().unwrap_or_default(),
                priority: priorities.next().unwrap_or_default(),
                status: statuses.next().unwrap_or_default(),
                order: orders.next().unwrap_or(key as f64),
                creator: creators.next().flatten(),
                last_updated_by: updaters.next().flatten(),
                created_on: created.next().flatten(),
                last_updated_on: updated.next().flatten(),
                children: Vec::new(),
            })
            .collect();
        Ok(tickets)
    }
}

/// Time entries as parallel arrays, one row per logged (ticket, person) entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeColumns {
    #[serde(default)]
    pub tickets: Vec<TicketKey>,
    #[serde(default)]
    pub people: Vec<PersonId>,
    /// Seconds
    #[serde(default)]
    pub estimates: Vec<u64>,
    /// Seconds
    #[serde(default)]
    pub spent: Vec<u64>,
}

impl TimeColumns {
    pub fn check(&self) -> Result<(), ApiError> {
        let n = self.tickets.len();
        check_column("ticket_time.people", self.people.len(), n)?;
        check_column("ticket_time.estimates", self.estimates.len(), n)?;
        check_column("ticket_time.spent", self.spent.len(), n)
    }
}

/// `POST /api/tickets` body
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub parent: Option<TicketKey>,
    pub priority: i32,
    #[serde(rename = "type")]
    pub ticket_type: i32,
    pub status: i32,
}

/// `PATCH /api/ticket/:key` body: only the fields that change.
///
/// `parent: Some(None)` clears the parent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TicketPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Option<TicketKey>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ticket_type: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
}

impl TicketPatch {
    pub fn is_empty(&self) -> bool {
        *self == TicketPatch::default()
    }

    /// The fields of `self` that `shadow` records as changed
    pub fn restricted_to(&self, shadow: &TicketPatch) -> TicketPatch {
        fn keep<T: Clone>(value: &Option<T>, changed: &Option<T>) -> Option<T> {
            changed.as_ref().and(value.clone())
        }
        TicketPatch {
            title: keep(&self.title, &shadow.title),
            description: keep(&self.description, &shadow.description),
            parent: keep(&self.parent, &shadow.parent),
            ticket_type: keep(&self.ticket_type, &shadow.ticket_type),
            status: keep(&self.status, &shadow.status),
            priority: keep(&self.priority, &shadow.priority),
            order: keep(&self.order, &shadow.order),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> serde_json::Value {
        json!({
            "count": 3,
            "max_key": 12,
            "name_types": ["Task", "Bug"],
            "name_priorities": {"3": "Normal", "4": "High"},
            "name_statuses": {},
            "tickets": {
                "keys": [1, 2, 12],
                "parents": [null, 1, 0],
                "titles": ["Root", "Child", "Other"],
                "descriptions": ["", null, "text"],
                "types": [0, 1, 0],
                "priorities": [3, 4, 3],
                "statuses": [0, 0, 1]
            },
            "ticket_time": {
                "tickets": [2],
                "people": [7],
                "estimates": [3600],
                "spent": [1800]
            }
        })
    }

    #[test]
    fn test_decode_columnar_tickets() {
        let payload: TicketsPayload = serde_json::from_value(payload()).unwrap();
        assert_eq!(payload.count, 3);
        assert_eq!(payload.max_key, 12);

        let tickets = payload.tickets.into_tickets().unwrap();
        assert_eq!(tickets.len(), 3);
        assert_eq!(tickets[1].key, 2);
        assert_eq!(tickets[1].parent, Some(1));
        assert_eq!(tickets[1].description, "");
        assert_eq!(tickets[1].ticket_type, 1);
        assert_eq!(tickets[1].priority, 4);
        // Missing order column falls back to the key
        assert_eq!(tickets[2].order, 12.0);
        // Parent 0 means root
        assert_eq!(tickets[2].parent, None);
    }

    #[test]
    fn test_column_mismatch_names_column() {
        let mut value = payload();
        value["tickets"]["titles"] = json!(["only one"]);
        let payload: TicketsPayload = serde_json::from_value(value).unwrap();
        let err = payload.tickets.into_tickets().unwrap_err();
        match err {
            ApiError::ColumnMismatch { column, expected, found } => {
                assert_eq!(column, "titles");
                assert_eq!(expected, 3);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_optional_column_must_match_when_present() {
        let mut value = payload();
        value["tickets"]["orders"] = json!([1.0, 2.0]);
        let payload: TicketsPayload = serde_json::from_value(value).unwrap();
        assert!(matches!(
            payload.tickets.into_tickets(),
            Err(ApiError::ColumnMismatch { column: "orders", .. })
        ));
    }

    #[test]
    fn test_name_table_list_and_map() {
        let payload: TicketsPayload = serde_json::from_value(payload()).unwrap();
        assert_eq!(payload.name_types.get(1), Some("Bug"));
        assert_eq!(payload.name_priorities.name(4), "High");
        assert_eq!(payload.name_priorities.name(9), "9");
        assert!(payload.name_statuses.is_empty());
    }

    #[test]
    fn test_name_table_rejects_non_numeric_key() {
        let result: Result<NameTable, _> = serde_json::from_value(json!({"high": "High"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_ticket_time_is_empty() {
        let mut value = payload();
        value.as_object_mut().unwrap().remove("ticket_time");
        let payload: TicketsPayload = serde_json::from_value(value).unwrap();
        assert!(payload.ticket_time.tickets.is_empty());
        assert!(payload.ticket_time.check().is_ok());
    }

    #[test]
    fn test_patch_serializes_only_changed_fields() {
        let patch = TicketPatch {
            priority: Some(4),
            order: Some(1.5),
            parent: Some(None),
            ..Default::default()
        };
        let body = serde_json::to_value(&patch).unwrap();
        assert_eq!(body, json!({"priority": 4, "order": 1.5, "parent": null}));
        assert!(TicketPatch::default().is_empty());
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_new_ticket_uses_type_field() {
        let new = NewTicket {
            title: "t".into(),
            ticket_type: 2,
            ..Default::default()
        };
        let body = serde_json::to_value(&new).unwrap();
        assert_eq!(body["type"], json!(2));
        assert_eq!(body["parent"], json!(null));
    }
}
