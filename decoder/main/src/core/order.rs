//! Length-sorted batching helpers.
//!
//! Grouping prompts of similar length into the same batch keeps padding
//! overhead low. The sort permutation is recorded so completions can be
//! returned in the caller's original prompt order.

/// Sort prompts by byte length, shortest first, keeping the permutation.
///
/// The sort is stable so equal-length prompts keep their relative order.
/// `order[k]` is the original index of the k-th sorted prompt.
pub fn sort_by_len(prompts: &[String]) -> (Vec<String>, Vec<usize>) {
    let mut indexed: Vec<(usize, &String)> = prompts.iter().enumerate().collect();
    indexed.sort_by_key(|(_, p)| p.len());

    let mut sorted = Vec::with_capacity(prompts.len());
    let mut order = Vec::with_capacity(prompts.len());
    for (original, prompt) in indexed {
        sorted.push(prompt.clone());
        order.push(original);
    }
    (sorted, order)
}

/// Invert a sort permutation: place `items[k]` back at position `order[k]`.
pub fn restore_order<T>(items: Vec<T>, order: &[usize]) -> Vec<T> {
    debug_assert_eq!(items.len(), order.len());
    let mut slots: Vec<Option<T>> = Vec::with_capacity(items.len());
    slots.resize_with(items.len(), || None);
    for (item, &original) in items.into_iter().zip(order) {
        slots[original] = Some(item);
    }
    slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn prompts(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn sorts_shortest_first() {
        let (sorted, order) = sort_by_len(&prompts(&["aaaa", "a", "aa"]));
        assert_eq!(sorted, prompts(&["a", "aa", "aaaa"]));
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn stable_for_equal_lengths() {
        let (sorted, order) = sort_by_len(&prompts(&["bb", "aa", "c"]));
        assert_eq!(sorted, prompts(&["c", "bb", "aa"]));
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn restore_inverts_sort() {
        let original = prompts(&["medium!", "x", "the longest prompt", "four"]);
        let (sorted, order) = sort_by_len(&original);
        assert_eq!(restore_order(sorted, &order), original);
    }

    #[test]
    fn restore_is_identity_without_reordering() {
        let original = prompts(&["a", "bb", "ccc"]);
        let (sorted, order) = sort_by_len(&original);
        assert_eq!(sorted, original);
        assert_eq!(restore_order(sorted, &order), original);
    }

    #[test]
    fn empty_input() {
        let (sorted, order) = sort_by_len(&[]);
        assert!(sorted.is_empty());
        assert!(order.is_empty());
        assert!(restore_order::<String>(vec![], &order).is_empty());
    }

    #[test]
    fn random_permutations_round_trip() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for n in [1usize, 2, 5, 17, 64] {
            let mut original: Vec<String> =
                (0..n).map(|i| "x".repeat(i % 9) + &i.to_string()).collect();
            original.shuffle(&mut rng);
            let (sorted, order) = sort_by_len(&original);
            for pair in sorted.windows(2) {
                assert!(pair[0].len() <= pair[1].len());
            }
            assert_eq!(restore_order(sorted, &order), original);
        }
    }
}
