use std::fmt::{Debug, Display};
use std::hash::Hash;

use serde::{de::DeserializeOwned, Serialize};

/// A domain record with an identifier that stays stable across mutations.
pub trait Entity {
    type Id: Clone + Eq + Ord + Hash + Display + Debug + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Human-readable kind used in error messages and log fields.
    const KIND: &'static str;

    fn id(&self) -> &Self::Id;
}
