use proptest::prelude::*;
use repo_finder::search::Permutation;
use std::collections::HashSet;

proptest! {
    #[test]
    fn prop_permutation_is_bijection(key in any::<u64>(), len in 0u64..2000) {
        let permutation = Permutation::new(key, len);
        let image: HashSet<u64> = (0..len).map(|i| permutation.apply(i)).collect();

        prop_assert_eq!(image.len() as u64, len);
        prop_assert!(image.iter().all(|&v| v < len));
    }

    #[test]
    fn prop_permutation_is_deterministic(key in any::<u64>(), len in 1u64..500) {
        let a = Permutation::new(key, len).to_vec();
        let b = Permutation::new(key, len).to_vec();
        prop_assert_eq!(a, b);
    }
}
