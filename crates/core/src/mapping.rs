// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Opaque string-to-string mappings passed through to resource scripts.
//!
//! The protocol never interprets their contents; they are serialized
//! verbatim. Insertion order is preserved on the wire, but equality is
//! order-insensitive (`IndexMap` compares by key-value pairs).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

macro_rules! opaque_mapping {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub IndexMap<String, String>);

        impl $name {
            pub fn new() -> Self {
                Self(IndexMap::new())
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn get(&self, key: &str) -> Option<&str> {
                self.0.get(key).map(String::as_str)
            }

            pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
                self.0.insert(key.into(), value.into());
            }
        }

        impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for $name {
            fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
                Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
            }
        }
    };
}

opaque_mapping! {
    /// One revision of a resource. Equality is structural; ordering of a
    /// check's returned list is the producing script's contract.
    pub struct Version;
}

opaque_mapping! {
    /// Resource source configuration, passed verbatim to check/in/out.
    pub struct Source;
}

opaque_mapping! {
    /// Step parameters, passed verbatim to in/out scripts.
    pub struct Params;
}

#[cfg(test)]
#[path = "mapping_tests.rs"]
mod tests;
