//! Storage collaborators for call records and subscribers
//!
//! The engines never talk to a concrete backend. The generator writes
//! through [`RecordStore::save`], the aggregator reads through
//! [`RecordStore::find_by_role`], and both enumerate subscribers through
//! [`SubscriberDirectory`].
//!
//! `find_by_role` reports absence explicitly: `Ok(None)` means the store
//! has no index entry for the subscriber in that role, which is a different
//! answer from an entry whose records are later filtered down to nothing.
//!
//! # Example
//!
//! ```
//! use cdr2udr_core::store::{InMemoryRecordStore, RecordStore};
//! use cdr2udr_core::types::{CallRecord, CallRole, CallType, Msisdn};
//! use chrono::{TimeDelta, TimeZone, Utc};
//!
//! let store = InMemoryRecordStore::new();
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
//! let record = CallRecord::new(
//!     CallType::Outgoing,
//!     Msisdn::new("79001112233"),
//!     Msisdn::new("79101112233"),
//!     start,
//!     start + TimeDelta::minutes(3),
//! )
//! .unwrap();
//! store.save(record).unwrap();
//!
//! let caller = Msisdn::new("79001112233");
//! assert_eq!(store.find_by_initiator(&caller).unwrap().map(|r| r.len()), Some(1));
//! assert!(store.find_by_receiver(&caller).unwrap().is_none());
//! ```

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{CdrError, Result};
use crate::types::{CallRecord, CallRole, Msisdn, Subscriber};

/// Persistent (or in-memory) home of generated call records
pub trait RecordStore: Send + Sync {
    /// Persist one record
    fn save(&self, record: CallRecord) -> Result<()>;

    /// Records where `msisdn` plays `role`, or `None` when it never did
    fn find_by_role(&self, msisdn: &Msisdn, role: CallRole) -> Result<Option<Vec<CallRecord>>>;

    /// Every stored record in insertion order
    fn all(&self) -> Result<Vec<CallRecord>>;

    /// Remove every record
    fn clear(&self) -> Result<()>;

    /// Records where `msisdn` placed the call
    fn find_by_initiator(&self, msisdn: &Msisdn) -> Result<Option<Vec<CallRecord>>> {
        self.find_by_role(msisdn, CallRole::Initiator)
    }

    /// Records where `msisdn` received the call
    fn find_by_receiver(&self, msisdn: &Msisdn) -> Result<Option<Vec<CallRecord>>> {
        self.find_by_role(msisdn, CallRole::Receiver)
    }
}

/// Registry of known subscribers
pub trait SubscriberDirectory: Send + Sync {
    /// Register a subscriber, returning the existing entry for known numbers
    fn register(&self, msisdn: Msisdn) -> Result<Subscriber>;

    /// All registered subscribers in registration order
    fn subscribers(&self) -> Result<Vec<Subscriber>>;

    /// Remove every subscriber
    fn clear(&self) -> Result<()>;

    /// All registered numbers in registration order
    fn list_all(&self) -> Result<Vec<Msisdn>> {
        Ok(self
            .subscribers()?
            .into_iter()
            .map(|subscriber| subscriber.msisdn)
            .collect())
    }

    /// Whether `msisdn` is registered
    fn contains(&self, msisdn: &Msisdn) -> Result<bool> {
        Ok(self
            .subscribers()?
            .iter()
            .any(|subscriber| &subscriber.msisdn == msisdn))
    }
}

fn poisoned(what: &str) -> CdrError {
    CdrError::Store(format!("{what} lock poisoned"))
}

#[derive(Debug, Default)]
struct RecordIndex {
    records: Vec<CallRecord>,
    by_initiator: HashMap<Msisdn, Vec<usize>>,
    by_receiver: HashMap<Msisdn, Vec<usize>>,
}

impl RecordIndex {
    fn index_for(&self, role: CallRole) -> &HashMap<Msisdn, Vec<usize>> {
        match role {
            CallRole::Initiator => &self.by_initiator,
            CallRole::Receiver => &self.by_receiver,
        }
    }
}

/// Record store backed by a vector with per-role indexes
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    inner: RwLock<RecordIndex>,
}

impl InMemoryRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.records.len())
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, RecordIndex>> {
        self.inner.read().map_err(|_| poisoned("record store"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, RecordIndex>> {
        self.inner.write().map_err(|_| poisoned("record store"))
    }
}

impl RecordStore for InMemoryRecordStore {
    fn save(&self, record: CallRecord) -> Result<()> {
        let mut index = self.write()?;
        let position = index.records.len();

        index
            .by_initiator
            .entry(record.caller().clone())
            .or_default()
            .push(position);
        index
            .by_receiver
            .entry(record.receiver().clone())
            .or_default()
            .push(position);
        index.records.push(record);

        Ok(())
    }

    fn find_by_role(&self, msisdn: &Msisdn, role: CallRole) -> Result<Option<Vec<CallRecord>>> {
        let index = self.read()?;

        Ok(index.index_for(role).get(msisdn).map(|positions| {
            positions
                .iter()
                .map(|&position| index.records[position].clone())
                .collect()
        }))
    }

    fn all(&self) -> Result<Vec<CallRecord>> {
        Ok(self.read()?.records.clone())
    }

    fn clear(&self) -> Result<()> {
        *self.write()? = RecordIndex::default();
        Ok(())
    }
}

/// Subscriber directory preserving registration order
#[derive(Debug, Default)]
pub struct InMemorySubscriberDirectory {
    inner: RwLock<Vec<Subscriber>>,
}

impl InMemorySubscriberDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory pre-populated with `numbers`
    pub fn with_numbers<I, S>(numbers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let directory = Self::new();
        for number in numbers {
            directory.register(Msisdn::new(number))?;
        }
        Ok(directory)
    }
}

impl SubscriberDirectory for InMemorySubscriberDirectory {
    fn register(&self, msisdn: Msisdn) -> Result<Subscriber> {
        let mut subscribers = self.inner.write().map_err(|_| poisoned("subscriber directory"))?;

        if let Some(existing) = subscribers.iter().find(|s| s.msisdn == msisdn) {
            return Ok(existing.clone());
        }

        let subscriber = Subscriber {
            id: subscribers.len() as u64 + 1,
            msisdn,
        };
        subscribers.push(subscriber.clone());
        Ok(subscriber)
    }

    fn subscribers(&self) -> Result<Vec<Subscriber>> {
        Ok(self
            .inner
            .read()
            .map_err(|_| poisoned("subscriber directory"))?
            .clone())
    }

    fn clear(&self) -> Result<()> {
        self.inner
            .write()
            .map_err(|_| poisoned("subscriber directory"))?
            .clear();
        Ok(())
    }
}
