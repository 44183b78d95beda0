//! Serialization of tries as plain maps of entries.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::analyzer::KeyAnalyzer;
use crate::trie::PatriciaTrie;

impl<K, V, A> Serialize for PatriciaTrie<K, V, A>
where
    K: Serialize,
    V: Serialize,
    A: KeyAnalyzer<K>,
{
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct TrieVisitor<K, V, A> {
    marker: PhantomData<(K, V, A)>,
}

impl<'de, K, V, A> Visitor<'de> for TrieVisitor<K, V, A>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
    A: KeyAnalyzer<K> + Default,
{
    type Value = PatriciaTrie<K, V, A>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of bit string keys to values")
    }

    fn visit_map<M: MapAccess<'de>>(
        self,
        mut access: M,
    ) -> Result<Self::Value, M::Error> {
        let mut trie = PatriciaTrie::new(A::default());
        while let Some((key, value)) = access.next_entry()? {
            trie.insert(key, value).map_err(serde::de::Error::custom)?;
        }
        Ok(trie)
    }
}

impl<'de, K, V, A> Deserialize<'de> for PatriciaTrie<K, V, A>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
    A: KeyAnalyzer<K> + Default,
{
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TrieVisitor {
            marker: PhantomData,
        })
    }
}
