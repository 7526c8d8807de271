use serde::{Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Phantom-typed index into one of the scenario arenas.
///
/// The inner value is the position of the entity in its owning `Vec`, so ids
/// are cheap to copy and double as genes of a placement vector.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct Id<T> {
    index: usize,
    _marker: PhantomData<T>,
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.index as u64)
    }
}

impl<T> Id<T> {
    pub fn new(index: usize) -> Self {
        Id { index, _marker: PhantomData }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index)
    }
}

impl<T> From<Id<T>> for usize {
    fn from(id_wrapper: Id<T>) -> Self {
        id_wrapper.index
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full_name = std::any::type_name::<T>();
        let clean_name = full_name.split("::").last().unwrap_or(full_name);
        let display_name = clean_name.replace("Tag", "Id");

        write!(f, "{}: {}", display_name, self.index)
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct SwitchTag;
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct LinkTag;
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct ServerTag;
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct ServiceTag;
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct ApplicationTag;
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct UserTag;
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct ProviderTag;

pub type SwitchId = Id<SwitchTag>;
pub type LinkId = Id<LinkTag>;
pub type ServerId = Id<ServerTag>;
pub type ServiceId = Id<ServiceTag>;
pub type ApplicationId = Id<ApplicationTag>;
pub type UserId = Id<UserTag>;

/// Infrastructure-provider identifier. Unlike the arena ids above this is an
/// external label, not an index, but it shares the same newtype idiom.
pub type ProviderId = Id<ProviderTag>;
