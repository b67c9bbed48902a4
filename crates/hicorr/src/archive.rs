//! The interface to the storage layer.
//!
//! Containers are persisted in archives (in practice, files written by the
//! analysis framework) together with a handful of string-keyed scalars
//! used for bookkeeping. Bindings to concrete file formats live outside of
//! this crate; they only need to implement [`Archive`], [`ArchiveSource`]
//! and [`ArchiveSink`]. [`MemoryArchive`] & [`MemoryArchiveStore`] are
//! in-memory implementations.

use crate::{BinnedContainer, Error};
use std::collections::BTreeMap;

/// The scalar that holds the number of events that an archive was built
/// from
pub const EVENTS_PROCESSED: &str = "nEventsProcessed";

/// The prefix of the scalars counting the events accepted by each event
/// filter (`nEventsAccepted_<filter>`)
pub const ACCEPTED_PREFIX: &str = "nEventsAccepted_";

/// A bookkeeping value
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    Int(i64),
    Double(f64),
}

impl Scalar {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Scalar::Int(v) => v as f64,
            Scalar::Double(v) => v,
        }
    }
}

impl core::ops::Add for Scalar {
    type Output = Scalar;

    /// Integers stay integers (saturating), anything else is promoted to a
    /// double
    fn add(self, rhs: Scalar) -> Scalar {
        match (self, rhs) {
            (Scalar::Int(a), Scalar::Int(b)) => Scalar::Int(a.saturating_add(b)),
            (a, b) => Scalar::Double(a.as_f64() + b.as_f64()),
        }
    }
}

pub trait Archive {
    /// the name the archive was opened or created with
    fn name(&self) -> &str;

    /// names of the stored containers, in storage order
    fn list_named_objects(&self) -> Result<Vec<String>, Error>;

    fn read_object(&self, name: &str) -> Result<BinnedContainer, Error>;

    /// store `container` under its own name (replacing any existing object
    /// with that name)
    fn write_object(&mut self, container: &BinnedContainer) -> Result<(), Error>;

    /// names of the stored scalars, in storage order
    fn list_scalars(&self) -> Result<Vec<String>, Error>;

    /// Returns `Ok(None)` when the scalar doesn't exist
    fn read_scalar(&self, name: &str) -> Result<Option<Scalar>, Error>;

    fn write_scalar(&mut self, name: &str, value: Scalar) -> Result<(), Error>;
}

/// Opens existing archives for reading
pub trait ArchiveSource {
    type Archive: Archive;

    fn open(&self, name: &str) -> Result<Self::Archive, Error>;
}

/// Creates new (empty) archives for writing
pub trait ArchiveSink {
    type Archive: Archive;

    fn create(&mut self, name: &str) -> Result<&mut Self::Archive, Error>;

    /// Remove an archive created by [`ArchiveSink::create`] whose writing
    /// failed part way. Discarding a name that doesn't exist is not an
    /// error.
    fn discard(&mut self, name: &str) -> Result<(), Error>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryArchive {
    name: String,
    objects: Vec<BinnedContainer>,
    scalars: Vec<(String, Scalar)>,
}

impl MemoryArchive {
    pub fn new(name: &str) -> Self {
        MemoryArchive {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    pub fn objects(&self) -> &[BinnedContainer] {
        &self.objects
    }

    pub fn find_object(&self, name: &str) -> Option<&BinnedContainer> {
        self.objects.iter().find(|c| c.name() == name)
    }

    pub fn find_scalar(&self, name: &str) -> Option<Scalar> {
        self.scalars
            .iter()
            .find_map(|(key, value)| (key == name).then_some(*value))
    }
}

impl Archive for MemoryArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_named_objects(&self) -> Result<Vec<String>, Error> {
        Ok(self.objects.iter().map(|c| c.name().to_owned()).collect())
    }

    fn read_object(&self, name: &str) -> Result<BinnedContainer, Error> {
        self.find_object(name)
            .cloned()
            .ok_or_else(|| Error::archive_io(&self.name, Some(name), "no such object"))
    }

    fn write_object(&mut self, container: &BinnedContainer) -> Result<(), Error> {
        match self.objects.iter_mut().find(|c| c.name() == container.name()) {
            Some(existing) => *existing = container.clone(),
            None => self.objects.push(container.clone()),
        }
        Ok(())
    }

    fn list_scalars(&self) -> Result<Vec<String>, Error> {
        Ok(self.scalars.iter().map(|(key, _)| key.clone()).collect())
    }

    fn read_scalar(&self, name: &str) -> Result<Option<Scalar>, Error> {
        Ok(self.find_scalar(name))
    }

    fn write_scalar(&mut self, name: &str, value: Scalar) -> Result<(), Error> {
        match self.scalars.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.scalars.push((name.to_owned(), value)),
        }
        Ok(())
    }
}

/// A set of [`MemoryArchive`]s, keyed by name.
///
/// As an [`ArchiveSource`], opening an archive hands out a copy. Opening a
/// name that isn't present is an ArchiveIo error.
#[derive(Clone, Debug, Default)]
pub struct MemoryArchiveStore {
    archives: BTreeMap<String, MemoryArchive>,
}

impl MemoryArchiveStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, archive: MemoryArchive) {
        self.archives.insert(archive.name.clone(), archive);
    }

    pub fn get(&self, name: &str) -> Option<&MemoryArchive> {
        self.archives.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.archives.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.archives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }
}

impl ArchiveSource for MemoryArchiveStore {
    type Archive = MemoryArchive;

    fn open(&self, name: &str) -> Result<MemoryArchive, Error> {
        self.archives
            .get(name)
            .cloned()
            .ok_or_else(|| Error::archive_io(name, None, "no such archive"))
    }
}

impl ArchiveSink for MemoryArchiveStore {
    type Archive = MemoryArchive;

    /// creating an archive that already exists truncates it
    fn create(&mut self, name: &str) -> Result<&mut MemoryArchive, Error> {
        self.archives
            .insert(name.to_owned(), MemoryArchive::new(name));
        self.archives
            .get_mut(name)
            .ok_or_else(|| Error::archive_io(name, None, "archive vanished after creation"))
    }

    fn discard(&mut self, name: &str) -> Result<(), Error> {
        self.archives.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Axis;

    #[test]
    fn scalar_sums() {
        assert_eq!(Scalar::Int(2) + Scalar::Int(3), Scalar::Int(5));
        assert_eq!(Scalar::Int(2) + Scalar::Double(0.5), Scalar::Double(2.5));
        assert_eq!(Scalar::Int(i64::MAX) + Scalar::Int(1), Scalar::Int(i64::MAX));
    }

    #[test]
    fn memory_round_trip() {
        let mut store = MemoryArchiveStore::new();
        let archive = store.create("out").unwrap();
        let h = BinnedContainer::histogram_1d("h", Axis::regular("x", 2, 0.0, 1.0).unwrap())
            .unwrap();
        archive.write_object(&h).unwrap();
        archive.write_scalar(EVENTS_PROCESSED, Scalar::Int(7)).unwrap();

        let reopened = store.open("out").unwrap();
        assert_eq!(reopened.list_named_objects().unwrap(), ["h"]);
        assert_eq!(
            reopened.read_scalar(EVENTS_PROCESSED).unwrap(),
            Some(Scalar::Int(7))
        );
        assert_eq!(reopened.read_scalar("other").unwrap(), None);
        assert!(reopened.read_object("missing").unwrap_err().is_archive_io());
        assert!(store.open("missing").unwrap_err().is_archive_io());

        store.discard("out").unwrap();
        assert!(store.is_empty());
        store.discard("out").unwrap();
    }
}
