use proptest::prelude::*;
use tk_core::{BoundedTopK, Reversed, Natural};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// The retained set never grows past capacity.
    #[test]
    fn prop_never_exceeds_capacity(
        capacity in 1usize..64,
        values in prop::collection::vec(any::<i32>(), 0..500)
    ) {
        let topk = BoundedTopK::natural(capacity).unwrap();
        for v in values {
            topk.record(v);
            prop_assert!(topk.len() <= capacity);
        }
    }

    /// The retained set equals the largest `capacity` values fed in.
    #[test]
    fn prop_keeps_largest(
        capacity in 1usize..32,
        values in prop::collection::hash_set(any::<i64>(), 32..300)
    ) {
        let values: Vec<i64> = values.into_iter().collect();
        let topk = BoundedTopK::natural(capacity).unwrap();
        topk.record_all(values.iter().copied());

        let mut expected = values.clone();
        expected.sort_unstable();
        let expected = expected.split_off(expected.len() - capacity);

        prop_assert!(topk.is_ready());
        prop_assert_eq!(topk.snapshot().unwrap().into_vec(), expected);
    }

    /// With duplicates allowed, the retained multiset matches the sorted tail.
    #[test]
    fn prop_keeps_largest_with_duplicates(
        capacity in 1usize..16,
        values in prop::collection::vec(0u8..8, 16..200)
    ) {
        let topk = BoundedTopK::natural(capacity).unwrap();
        topk.record_all(values.iter().copied());

        let mut expected = values.clone();
        expected.sort_unstable();
        let expected = expected.split_off(expected.len() - capacity);
        prop_assert_eq!(topk.snapshot().unwrap().into_vec(), expected);
    }

    /// Reversing the order retains the smallest values, listed largest first.
    #[test]
    fn prop_reversed_keeps_smallest(
        capacity in 1usize..16,
        values in prop::collection::hash_set(any::<i32>(), 16..100)
    ) {
        let values: Vec<i32> = values.into_iter().collect();
        let topk = BoundedTopK::new(capacity, Reversed(Natural)).unwrap();
        topk.record_all(values.iter().copied());

        let mut expected = values.clone();
        expected.sort_unstable();
        expected.truncate(capacity);
        expected.reverse();
        prop_assert_eq!(topk.snapshot().unwrap().into_vec(), expected);
    }

    /// Earlier snapshots are unaffected by later records.
    #[test]
    fn prop_snapshots_are_isolated(
        capacity in 1usize..16,
        first in prop::collection::vec(any::<i16>(), 16..64),
        later in prop::collection::vec(any::<i16>(), 0..64)
    ) {
        let topk = BoundedTopK::natural(capacity).unwrap();
        topk.record_all(first.iter().copied());
        let before = topk.snapshot().unwrap();
        let copy = before.clone().into_vec();
        topk.record_all(later.iter().copied());
        prop_assert_eq!(before.into_vec(), copy);
        prop_assert_eq!(topk.len(), capacity);
    }
}
