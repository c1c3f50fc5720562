use crate::node::Node;
use crate::shuffle::{StableMap, split_rows};
use crate::{PCollection, Partition, RFBound};
use std::hash::Hash;
use std::sync::Arc;

impl<T: RFBound> PCollection<T> {
    /// Derive a key and produce `(K, T)`.
    pub fn key_by<K, F>(self, key_fn: F) -> PCollection<(K, T)>
    where
        K: RFBound + Eq + Hash,
        F: 'static + Send + Sync + Fn(&T) -> K,
    {
        self.map(move |t| (key_fn(t), t.clone()))
    }
}

impl<K: RFBound + Eq + Hash, V: RFBound> PCollection<(K, V)> {
    /// Group values by key: `(K, V)` to `(K, Vec<V>)`.
    ///
    /// Every row lands in exactly one group; duplicates are kept. Within a
    /// group, values keep their partition order.
    pub fn group_by_key(self) -> PCollection<(K, Vec<V>)> {
        let local = Arc::new(|p: Partition| -> Partition {
            let kv = *p.downcast::<Vec<(K, V)>>().expect("GBK local: bad input");
            let mut m: StableMap<K, Vec<V>> = StableMap::default();
            for (k, v) in kv {
                m.entry(k).or_default().push(v);
            }
            Box::new(m) as Partition
        });

        let merge = Arc::new(|parts: Vec<Partition>, n: usize| -> Vec<Partition> {
            let mut acc: StableMap<K, Vec<V>> = StableMap::default();
            for p in parts {
                let m = *p
                    .downcast::<StableMap<K, Vec<V>>>()
                    .expect("GBK merge: bad part");
                for (k, vs) in m {
                    acc.entry(k).or_default().extend(vs);
                }
            }
            split_rows(acc.into_iter().collect::<Vec<(K, Vec<V>)>>(), n)
        });

        self.then(Node::GroupByKey { local, merge })
    }
}
