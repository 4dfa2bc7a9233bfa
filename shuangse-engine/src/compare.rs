use std::collections::BTreeSet;

use shuangse_db::models::Ticket;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub red_hits: usize,
    pub blue_hit: u8,
}

/// Rouges communs (intersection d'ensembles) et bleu identique entre la
/// référence et une grille.
pub fn compare(reference: &Ticket, candidate: &Ticket) -> Score {
    let reference_reds: BTreeSet<u8> = reference.reds.iter().copied().collect();
    let candidate_reds: BTreeSet<u8> = candidate.reds.iter().copied().collect();
    let red_hits = reference_reds.intersection(&candidate_reds).count();
    let blue_hit = u8::from(reference.blue == candidate.blue);
    Score { red_hits, blue_hit }
}

pub fn compare_all(reference: &Ticket, candidates: &[Ticket]) -> Vec<(Ticket, Score)> {
    candidates
        .iter()
        .map(|c| (*c, compare(reference, c)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(reds: [u8; 6], blue: u8) -> Ticket {
        Ticket::new(reds, blue, 0.0)
    }

    #[test]
    fn test_compare_identical() {
        let a = t([3, 8, 15, 21, 27, 33], 9);
        assert_eq!(compare(&a, &a), Score { red_hits: 6, blue_hit: 1 });
    }

    #[test]
    fn test_compare_disjoint() {
        let a = t([1, 2, 3, 4, 5, 6], 1);
        let b = t([7, 8, 9, 10, 11, 12], 2);
        assert_eq!(compare(&a, &b), Score { red_hits: 0, blue_hit: 0 });
    }

    #[test]
    fn test_compare_partial_is_symmetric() {
        let a = t([1, 2, 3, 4, 5, 6], 7);
        let b = t([1, 2, 3, 10, 11, 12], 7);
        assert_eq!(compare(&a, &b), Score { red_hits: 3, blue_hit: 1 });
        assert_eq!(compare(&b, &a), compare(&a, &b));
    }

    #[test]
    fn test_compare_ignores_order() {
        let draw = t([1, 2, 3, 4, 5, 6], 7);
        let unsorted = t([6, 5, 4, 3, 2, 1], 8);
        assert_eq!(compare(&draw, &unsorted).red_hits, 6);
    }

    #[test]
    fn test_compare_counts_repeated_reds_once() {
        let repeated = t([1, 1, 1, 1, 1, 1], 1);
        let regular = t([1, 2, 3, 4, 5, 6], 1);
        assert_eq!(compare(&repeated, &regular), Score { red_hits: 1, blue_hit: 1 });
        assert_eq!(compare(&regular, &repeated).red_hits, 1);
        assert_eq!(compare(&repeated, &repeated).red_hits, 1);
    }

    #[test]
    fn test_compare_all_keeps_candidate_order() {
        let draw = t([1, 2, 3, 4, 5, 6], 7);
        let favs = vec![t([1, 2, 10, 11, 12, 13], 7), t([20, 21, 22, 23, 24, 25], 1)];
        let scores = compare_all(&draw, &favs);
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].0, favs[0]);
        assert_eq!(scores[0].1, Score { red_hits: 2, blue_hit: 1 });
        assert_eq!(scores[1].1, Score { red_hits: 0, blue_hit: 0 });
    }
}
