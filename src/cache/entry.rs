/// A resident key-value pair held in the recency list.
#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    /// Swaps in a new value and hands back the old one.
    pub(crate) fn replace_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    pub(crate) fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}
