
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use parking_lot::Mutex;

use crate::ast::ObjectId;

/// Identity <=> short string bijection, used only to make debug output legible.
#[derive(Debug, Default)]
pub struct PtrIdMap {
    ids: Mutex<HashMap<ObjectId, String>>,
}

impl PtrIdMap {
    pub fn new() -> PtrIdMap {
        PtrIdMap {
            ids: Mutex::new(HashMap::new()),
        }
    }

    /// Return the label of `id`, assigning the next free one on first sight.
    pub fn ptr_to_id(&self, id: ObjectId) -> String {
        let mut ids = self.ids.lock();
        let next = ids.len();

        match ids.entry(id) {
            Entry::Occupied(o) => o.get().clone(),
            Entry::Vacant(v) => v.insert(label(next)).clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn clear(&self) {
        self.ids.lock().clear();
    }
}

/// Base 26 letters, least significant digit first, wrapped in parentheses.
fn label(mut n: usize) -> String {
    let mut s = String::from("(");

    loop {
        s.push((b'A' + (n % 26) as u8) as char);
        n /= 26;
        if n == 0 {
            break;
        }
    }

    s.push(')');
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn labels_are_sequential() {
        assert_eq!("(A)", label(0));
        assert_eq!("(B)", label(1));
        assert_eq!("(Z)", label(25));
        assert_eq!("(AB)", label(26));
        assert_eq!("(BB)", label(27));
    }

    #[test]
    fn same_identity_same_label() {
        let map = PtrIdMap::new();

        let first = map.ptr_to_id(ObjectId::new(42));
        let second = map.ptr_to_id(ObjectId::new(42));

        assert_eq!(first, second);
        assert_eq!(1, map.len());
    }

    #[test]
    fn distinct_identities_distinct_labels() {
        let map = PtrIdMap::new();

        let a = map.ptr_to_id(ObjectId::new(7));
        let b = map.ptr_to_id(ObjectId::new(3));

        assert_eq!("(A)", a);
        assert_eq!("(B)", b);
        assert_ne!(a, b);
    }

    #[test]
    fn concurrent_lookups_keep_bijection() {
        let map = PtrIdMap::new();

        thread::scope(|s| {
            for worker in 0..4 {
                let map = &map;
                s.spawn(move || {
                    for i in 0..100 {
                        map.ptr_to_id(ObjectId::new((worker * 1000 + i) as u64));
                    }
                });
            }
        });

        assert_eq!(400, map.len());

        let labels = (0..4)
            .flat_map(|worker| (0..100).map(move |i| (worker * 1000 + i) as u64))
            .map(|raw| map.ptr_to_id(ObjectId::new(raw)))
            .collect::<HashSet<_>>();

        assert_eq!(400, labels.len());
        assert_eq!(400, map.len());
    }
}
