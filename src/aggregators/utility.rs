use std::collections::BTreeMap;

/// Sums `value` per distinct `key`, returning groups in ascending key order.
pub fn sum_by<T, K: Ord>(
    items: &[T],
    key: impl Fn(&T) -> K,
    value: impl Fn(&T) -> u64,
) -> BTreeMap<K, u64> {
    let mut groups = BTreeMap::new();
    for item in items {
        *groups.entry(key(item)).or_insert(0) += value(item);
    }
    groups
}
