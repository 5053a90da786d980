use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type StableIdType = u64;

/// Stable identifier for a spawned world entity, independent of the ECS
/// `Entity` generation so it stays readable in logs and client payloads.
#[derive(Component, Reflect, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct NetId(pub StableIdType, pub String);

impl fmt::Display for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}-{})", self.1, self.0)
    }
}

#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct NetIdFactory {
    counter: StableIdType,
}

impl NetIdFactory {
    pub fn next(&mut self, kind: impl Into<String>) -> NetId {
        self.counter += 1;

        NetId(self.counter, kind.into())
    }

    /// Ids keep increasing across game-over resets so stale references held
    /// by pending callbacks can never alias a freshly spawned entity.
    pub fn issued(&self) -> StableIdType {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_tagged() {
        let mut factory = NetIdFactory::default();
        let a = factory.next("zombie");
        let b = factory.next("ripper");
        assert_ne!(a, b);
        assert_eq!(b.to_string(), "(ripper-2)");
        assert_eq!(factory.issued(), 2);
    }
}
