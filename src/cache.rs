use log::{debug, trace};
use std::collections::{hash_map::Entry, HashMap, VecDeque};
use std::hash::Hash;

/// Bounded LRU cache for fetched sub-records, e.g. invoice line items keyed by
/// invoice number. Owned by the data-access layer that fills it.
#[derive(Debug)]
pub struct RecordCache<K, V> {
    capacity: usize,
    entries: HashMap<K, V>,
    // front is least recently used
    order: VecDeque<K>,
}

impl<K, V> RecordCache<K, V>
where
    K: Eq + Hash + Clone,
{
    // capacity 0 is treated as 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.entries.contains_key(key) {
            self.touch(key);
        }
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(slot) = self.entries.get_mut(&key) {
            let old = std::mem::replace(slot, value);
            self.touch(&key);
            return Some(old);
        }
        self.make_room();
        self.order.push_back(key.clone());
        self.entries.insert(key, value);
        None
    }

    /// Errors from `fetch` are returned and not cached, so the next call
    /// retries.
    pub fn get_or_try_insert_with<E, F>(&mut self, key: K, fetch: F) -> Result<&V, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        if !self.entries.contains_key(&key) {
            debug!("record cache miss, fetching");
            let value = fetch(&key)?;
            self.make_room();
            self.order.push_back(key.clone());
            return Ok(&*self.entries.entry(key).or_insert(value));
        }
        self.touch(&key);
        let Self { entries, order, .. } = self;
        match entries.entry(key) {
            Entry::Occupied(e) => Ok(&*e.into_mut()),
            Entry::Vacant(e) => {
                let value = fetch(e.key())?;
                order.push_back(e.key().clone());
                Ok(&*e.insert(value))
            }
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.order
            .iter()
            .filter_map(|k| self.entries.get_key_value(k))
    }

    // evict until one more entry fits
    fn make_room(&mut self) {
        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(evicted) => {
                    trace!("evicting least recently used record");
                    self.entries.remove(&evicted);
                }
                None => break,
            }
        }
    }

    fn touch(&mut self, key: &K) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RecordCache;
    use std::cell::Cell;
    use test_log::test;

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = RecordCache::new(2);
        cache.insert("INV-1", vec![1]);
        cache.insert("INV-2", vec![2]);

        // touching INV-1 makes INV-2 the eviction candidate
        assert_eq!(cache.get(&"INV-1"), Some(&vec![1]));
        cache.insert("INV-3", vec![3]);

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&"INV-1"));
        assert!(!cache.contains(&"INV-2"));
        assert!(cache.contains(&"INV-3"));

        let keys: Vec<_> = cache.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["INV-1", "INV-3"]);
    }

    #[test]
    fn test_replace_keeps_size() {
        let mut cache = RecordCache::new(2);
        assert_eq!(cache.insert(1, "a"), None);
        assert_eq!(cache.insert(1, "b"), Some("a"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&1), Some(&"b"));
    }

    #[test]
    fn test_fetch_only_on_miss() {
        let calls = Cell::new(0);
        let fetch = |k: &u32| -> Result<String, String> {
            calls.set(calls.get() + 1);
            Ok(format!("items for {}", k))
        };

        let mut cache = RecordCache::new(4);
        assert_eq!(cache.get_or_try_insert_with(7, fetch).unwrap(), "items for 7");
        assert_eq!(cache.get_or_try_insert_with(7, fetch).unwrap(), "items for 7");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_fetch_into_full_cache_evicts() {
        let mut cache = RecordCache::new(1);
        cache.insert(1, "one".to_string());

        let v = cache.get_or_try_insert_with(2, |k| Ok::<_, ()>(format!("#{}", k)));
        assert_eq!(v.map(String::as_str), Ok("#2"));
        assert_eq!(cache.len(), 1);
        assert!(!cache.contains(&1));

        // a hit returns the cached value without fetching
        let v = cache.get_or_try_insert_with(2, |_| Err("should not fetch"));
        assert_eq!(v.map(String::as_str), Ok("#2"));
    }

    #[test]
    fn test_fetch_errors_are_not_cached() {
        let mut cache: RecordCache<u32, String> = RecordCache::new(4);
        let err = cache.get_or_try_insert_with(1, |_| Err("backend unavailable"));
        assert_eq!(err, Err("backend unavailable"));
        assert!(cache.is_empty());

        let ok = cache.get_or_try_insert_with(1, |_| Ok::<_, &str>("ok".to_string()));
        assert_eq!(ok.map(String::as_str), Ok("ok"));
    }

    #[test]
    fn test_remove_clear_and_zero_capacity() {
        let mut cache = RecordCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.insert('a', 1);
        cache.insert('b', 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.remove(&'b'), Some(2));
        assert_eq!(cache.remove(&'b'), None);
        assert!(cache.is_empty());

        cache.insert('c', 3);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.iter().count(), 0);
    }
}
