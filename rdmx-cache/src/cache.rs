use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
pub use string_cache::DefaultAtom as Atom;

lazy_static! {
    static ref TEXT_INTERNER: RwLock<Vec<Atom>> = RwLock::new(Vec::new());
}

/// Intern a label and return its stable ID.
pub fn intern_text(s: &str) -> usize {
    let atom = Atom::from(s);
    let mut v = TEXT_INTERNER
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    match v.iter().position(|a| *a == atom) {
        Some(idx) => idx,
        None => {
            v.push(atom);
            v.len() - 1
        }
    }
}

/// Number of labels interned so far.
pub fn text_count() -> usize {
    TEXT_INTERNER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .len()
}

pub fn get_text(id: usize) -> Option<Atom> {
    TEXT_INTERNER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(id)
        .cloned()
}

/// Bounded map from an interned string (plus a variant key such as a color)
/// to a rendered value. Entries that were not used since the last sweep are
/// dropped once the map is full, so per-trial strings like latencies do not
/// accumulate over a session.
pub struct AtomCache<K, V> {
    map: HashMap<(Atom, K), (V, bool)>,
    capacity: usize,
}

impl<K, V> AtomCache<K, V>
where
    K: Eq + std::hash::Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn get_or_insert_with(&mut self, text: &str, variant: K, make: impl FnOnce() -> V) -> V {
        let key = (Atom::from(text), variant);
        if let Some((value, used)) = self.map.get_mut(&key) {
            *used = true;
            return value.clone();
        }
        if self.map.len() >= self.capacity {
            self.sweep();
        }
        let value = make();
        self.map.insert(key, (value.clone(), true));
        value
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn sweep(&mut self) {
        self.map.retain(|_, (_, used)| *used);
        if self.map.len() >= self.capacity {
            self.map.clear();
        }
        for (_, used) in self.map.values_mut() {
            *used = false;
        }
    }
}
