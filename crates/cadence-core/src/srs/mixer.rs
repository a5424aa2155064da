//! Fixed-ratio mixer
//!
//! Blends new and due items at a fixed review share, topping up from
//! whichever pool still has items.

use rand::seq::SliceRandom;
use rand::Rng;

/// Review share of a mixed sprint
pub const DEFAULT_REVIEW_SHARE: f64 = 0.7;

/// Mix `new` and `review` items into at most `total` items, shuffled
pub fn mix_items_for_sprint<T: Clone, R: Rng + ?Sized>(
    new: &[T],
    review: &[T],
    total: usize,
    review_share: f64,
    rng: &mut R,
) -> Vec<T> {
    if review.is_empty() {
        return shuffled_prefix(new, total, rng);
    }
    if new.is_empty() {
        return shuffled_prefix(review, total, rng);
    }

    let review_count = ((total as f64 * review_share).ceil() as usize).min(review.len());
    let new_count = total.saturating_sub(review_count).min(new.len());

    let mut final_review = review_count;
    let mut final_new = new_count;

    let deficit = total.saturating_sub(review_count + new_count);
    if deficit > 0 {
        if new.len() < new_count + deficit {
            final_review = (review_count + deficit).min(review.len());
        } else {
            final_new = new_count + deficit;
        }
    }

    let mut mixed = shuffled_prefix(review, final_review, rng);
    mixed.extend(shuffled_prefix(new, final_new, rng));
    mixed.shuffle(rng);
    mixed
}

fn shuffled_prefix<T: Clone, R: Rng + ?Sized>(items: &[T], count: usize, rng: &mut R) -> Vec<T> {
    let mut pool = items.to_vec();
    pool.shuffle(rng);
    pool.truncate(count);
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ids(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    fn count_prefix(items: &[String], prefix: &str) -> usize {
        items.iter().filter(|s| s.starts_with(prefix)).count()
    }

    #[test]
    fn test_seventy_thirty_split() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mixed = mix_items_for_sprint(&ids("n", 20), &ids("r", 20), 10, DEFAULT_REVIEW_SHARE, &mut rng);

        assert_eq!(mixed.len(), 10);
        assert_eq!(count_prefix(&mixed, "r"), 7);
        assert_eq!(count_prefix(&mixed, "n"), 3);
    }

    #[test]
    fn test_only_new_items() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mixed = mix_items_for_sprint(&ids("n", 4), &[], 10, DEFAULT_REVIEW_SHARE, &mut rng);
        assert_eq!(mixed.len(), 4);
    }

    #[test]
    fn test_only_review_items() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mixed = mix_items_for_sprint(&[], &ids("r", 15), 10, DEFAULT_REVIEW_SHARE, &mut rng);
        assert_eq!(mixed.len(), 10);
        assert_eq!(count_prefix(&mixed, "r"), 10);
    }

    #[test]
    fn test_short_review_pool_is_topped_up_with_new() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mixed = mix_items_for_sprint(&ids("n", 20), &ids("r", 2), 10, DEFAULT_REVIEW_SHARE, &mut rng);

        assert_eq!(mixed.len(), 10);
        assert_eq!(count_prefix(&mixed, "r"), 2);
        assert_eq!(count_prefix(&mixed, "n"), 8);
    }

    #[test]
    fn test_short_new_pool_is_topped_up_with_review() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mixed = mix_items_for_sprint(&ids("n", 1), &ids("r", 20), 10, DEFAULT_REVIEW_SHARE, &mut rng);

        assert_eq!(mixed.len(), 10);
        assert_eq!(count_prefix(&mixed, "n"), 1);
        assert_eq!(count_prefix(&mixed, "r"), 9);
    }

    #[test]
    fn test_both_pools_short() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mixed = mix_items_for_sprint(&ids("n", 2), &ids("r", 3), 10, DEFAULT_REVIEW_SHARE, &mut rng);
        assert_eq!(mixed.len(), 5);
    }

    #[test]
    fn test_no_duplicates() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut mixed = mix_items_for_sprint(&ids("n", 6), &ids("r", 6), 10, DEFAULT_REVIEW_SHARE, &mut rng);
        let len = mixed.len();
        mixed.sort();
        mixed.dedup();
        assert_eq!(mixed.len(), len);
    }
}
