//! Value counting.

use std::{collections::HashMap, hash::Hash};

/// Count occurrences of each value, most frequent first.
///
/// Values with equal counts keep the order in which they were first seen.
pub fn value_counts<I, T>(values: I) -> Vec<(T, usize)>
where
    I: IntoIterator<Item = T>,
    T: Eq + Hash + Clone,
{
    let mut seen: HashMap<T, (usize, usize)> = HashMap::new();
    for value in values {
        let order = seen.len();
        seen.entry(value).or_insert((order, 0)).1 += 1;
    }

    let mut counts: Vec<(T, usize, usize)> = seen
        .into_iter()
        .map(|(value, (order, count))| (value, order, count))
        .collect();
    counts.sort_by(|a, b| b.2.cmp(&a.2).then(a.1.cmp(&b.1)));
    counts.into_iter().map(|(value, _, count)| (value, count)).collect()
}

/// The `n` most frequent values, see [`value_counts`].
pub fn top_n<I, T>(values: I, n: usize) -> Vec<(T, usize)>
where
    I: IntoIterator<Item = T>,
    T: Eq + Hash + Clone,
{
    let mut counts = value_counts(values);
    counts.truncate(n);
    counts
}

/// Group `values` by key, keeping groups in order of first appearance.
pub fn group_by<I, K, V>(values: I) -> Vec<(K, Vec<V>)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Eq + Hash + Clone,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<V>)> = Vec::new();
    for (key, value) in values {
        if let Some(&i) = index.get(&key) {
            groups[i].1.push(value);
        } else {
            index.insert(key.clone(), groups.len());
            groups.push((key, vec![value]));
        }
    }
    groups
}
