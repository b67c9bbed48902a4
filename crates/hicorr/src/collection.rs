use crate::{BinnedContainer, Error};

/// An ordered, named set of containers.
///
/// Parallel collections (e.g. the same analysis output from several
/// subsamples) are expected to correspond in lock-step: container `i` of one
/// collection pairs up with container `i` of the other. Use
/// [`ContainerCollection::check_same_size`] before any cross-collection
/// operation.
#[derive(Clone, Debug, Default)]
pub struct ContainerCollection {
    name: String,
    containers: Vec<BinnedContainer>,
}

impl ContainerCollection {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            containers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn push(&mut self, container: BinnedContainer) {
        self.containers.push(container);
    }

    /// Replace the container with the same name, or append it if there is
    /// none
    pub fn put(&mut self, container: BinnedContainer) {
        match self.index_of(container.name()) {
            Some(i) => self.containers[i] = container,
            None => self.containers.push(container),
        }
    }

    pub fn get(&self, i: usize) -> Option<&BinnedContainer> {
        self.containers.get(i)
    }

    pub fn get_mut(&mut self, i: usize) -> Option<&mut BinnedContainer> {
        self.containers.get_mut(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BinnedContainer> {
        self.containers.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, BinnedContainer> {
        self.containers.iter_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.containers.iter().map(BinnedContainer::name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.containers.iter().position(|c| c.name() == name)
    }

    pub fn find(&self, name: &str) -> Option<&BinnedContainer> {
        self.containers.iter().find(|c| c.name() == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut BinnedContainer> {
        self.containers.iter_mut().find(|c| c.name() == name)
    }

    /// Look up the `ordinal`-th (1-based) operand of `operation` by name,
    /// reporting a NullOperand error when it is missing
    pub fn operand(
        &self,
        operation: &'static str,
        ordinal: usize,
        name: &str,
    ) -> Result<&BinnedContainer, Error> {
        self.find(name)
            .ok_or_else(|| Error::null_operand(operation, ordinal, name))
    }

    /// Check that `other` holds as many containers as `self`
    pub fn check_same_size(&self, other: &ContainerCollection) -> Result<(), Error> {
        if self.len() == other.len() {
            Ok(())
        } else {
            Err(Error::collection_size(self.len(), other.len()))
        }
    }

    pub fn into_containers(self) -> Vec<BinnedContainer> {
        self.containers
    }
}

impl<'a> IntoIterator for &'a ContainerCollection {
    type Item = &'a BinnedContainer;
    type IntoIter = std::slice::Iter<'a, BinnedContainer>;

    fn into_iter(self) -> Self::IntoIter {
        self.containers.iter()
    }
}
