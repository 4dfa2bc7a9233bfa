use std::collections::BTreeSet;

use shuangse_db::models::{RED_COUNT, Ticket};
use shuangse_engine::generator::{Conditions, SumRange, ZoneQuota, total_quota};

/// Saisie brute d'une génération sous conditions, telle que tapée par
/// l'utilisateur. Chaque champ est interprété avec tolérance : une valeur
/// illisible est simplement ignorée.
#[derive(Debug, Clone, Default)]
pub struct RawConditions {
    pub count: String,
    pub odd: String,
    pub sum: String,
    pub exclude_reds: String,
    pub exclude_blues: String,
    pub zones: String,
}

impl RawConditions {
    pub fn count(&self) -> usize {
        parse_count(&self.count)
    }

    pub fn to_conditions(&self) -> Conditions {
        Conditions {
            zones: parse_zones(&self.zones),
            odd_count: parse_odd(&self.odd),
            sum_range: parse_sum_range(&self.sum),
            excluded_reds: parse_number_set(&self.exclude_reds),
            excluded_blues: parse_number_set(&self.exclude_blues),
        }
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Vide ou invalide → 1.
pub fn parse_count(s: &str) -> usize {
    s.trim().parse().unwrap_or(1)
}

pub fn parse_odd(s: &str) -> Option<usize> {
    let s = s.trim();
    if is_digits(s) { s.parse().ok() } else { None }
}

/// `"a-b"`, bornes remises dans l'ordre.
pub fn parse_sum_range(s: &str) -> Option<SumRange> {
    let (a, b) = s.trim().split_once('-')?;
    let a: u32 = a.trim().parse().ok()?;
    let b: u32 = b.trim().parse().ok()?;
    Some(SumRange {
        low: a.min(b),
        high: a.max(b),
    })
}

pub fn parse_number_set(s: &str) -> BTreeSet<u8> {
    s.split_whitespace()
        .filter(|tok| is_digits(tok))
        .filter_map(|tok| tok.parse().ok())
        .collect()
}

/// `"1-20:3,21-33:3"`. Un segment illisible, ou des quotas dont le total
/// n'est pas 6, invalident toute la saisie.
pub fn parse_zones(s: &str) -> Option<Vec<ZoneQuota>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let mut zones = Vec::new();
    for segment in s.split(',') {
        let (range, quota) = segment.split_once(':')?;
        let (low, high) = range.split_once('-')?;
        zones.push(ZoneQuota::new(
            low.trim().parse().ok()?,
            high.trim().parse().ok()?,
            quota.trim().parse().ok()?,
        ));
    }
    if total_quota(&zones) != Some(RED_COUNT) {
        return None;
    }
    Some(zones)
}

/// 6 rouges séparés par des espaces et un bleu, tous numériques.
pub fn parse_draw(reds: &str, blue: &str) -> Option<(Vec<u8>, u8)> {
    let tokens: Vec<&str> = reds.split_whitespace().collect();
    let blue = blue.trim();
    if tokens.len() != RED_COUNT || !tokens.iter().all(|t| is_digits(t)) || !is_digits(blue) {
        return None;
    }
    let reds = tokens
        .iter()
        .map(|t| t.parse().ok())
        .collect::<Option<Vec<u8>>>()?;
    Some((reds, blue.parse().ok()?))
}

/// Clé canonique d'une saisie : normalisée si la grille est lisible,
/// sinon prise telle quelle.
pub fn canonical_key(text: &str) -> String {
    Ticket::parse(text)
        .map(|t| t.format())
        .unwrap_or_else(|_| text.trim().to_string())
}

/// Résout une sélection : numéro de ligne (1-based) dans la dernière liste
/// affichée, ou grille au format canonique.
pub fn resolve_selection(input: &str, shown: &[Ticket]) -> Option<Ticket> {
    let input = input.trim();
    if is_digits(input) {
        let idx: usize = input.parse().ok()?;
        return idx.checked_sub(1).and_then(|i| shown.get(i)).copied();
    }
    Ticket::parse(input).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count_defaults_to_one() {
        assert_eq!(parse_count("5"), 5);
        assert_eq!(parse_count(" 12 "), 12);
        assert_eq!(parse_count(""), 1);
        assert_eq!(parse_count("abc"), 1);
        assert_eq!(parse_count("-3"), 1);
    }

    #[test]
    fn test_parse_odd() {
        assert_eq!(parse_odd("3"), Some(3));
        assert_eq!(parse_odd(""), None);
        assert_eq!(parse_odd("-1"), None);
        assert_eq!(parse_odd("trois"), None);
    }

    #[test]
    fn test_parse_sum_range_normalizes() {
        assert_eq!(parse_sum_range("80-120"), Some(SumRange { low: 80, high: 120 }));
        assert_eq!(parse_sum_range("120 - 80"), Some(SumRange { low: 80, high: 120 }));
        assert_eq!(parse_sum_range("80"), None);
        assert_eq!(parse_sum_range("a-b"), None);
        assert_eq!(parse_sum_range(""), None);
    }

    #[test]
    fn test_parse_number_set_skips_garbage() {
        let set = parse_number_set("1 2 x 33 -4 2");
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![1, 2, 33]);
        assert!(parse_number_set("").is_empty());
    }

    #[test]
    fn test_parse_zones() {
        assert_eq!(
            parse_zones("1-20:3,21-33:3"),
            Some(vec![ZoneQuota::new(1, 20, 3), ZoneQuota::new(21, 33, 3)])
        );
        assert_eq!(
            parse_zones(" 1-11:2, 12-22:2, 23-33:2 "),
            Some(vec![
                ZoneQuota::new(1, 11, 2),
                ZoneQuota::new(12, 22, 2),
                ZoneQuota::new(23, 33, 2),
            ])
        );
    }

    #[test]
    fn test_parse_zones_rejects_bad_totals_and_segments() {
        assert_eq!(parse_zones("1-10:4,11-33:1"), None);
        assert_eq!(parse_zones("1-20:3,21-33"), None);
        assert_eq!(parse_zones("1:3,21-33:3"), None);
        assert_eq!(parse_zones(""), None);
    }

    #[test]
    fn test_parse_zones_overflowing_quotas() {
        assert_eq!(parse_zones("1-20:18446744073709551615,21-33:7"), None);
        assert_eq!(parse_zones("1-20:18446744073709551615,21-33:18446744073709551615"), None);
    }

    #[test]
    fn test_parse_draw() {
        assert_eq!(
            parse_draw("1 2 3 4 5 6", "7"),
            Some((vec![1, 2, 3, 4, 5, 6], 7))
        );
        assert_eq!(parse_draw("1 2 3 4 5", "7"), None);
        assert_eq!(parse_draw("1 2 3 4 5 x", "7"), None);
        assert_eq!(parse_draw("1 2 3 4 5 6", ""), None);
    }

    #[test]
    fn test_raw_conditions_to_conditions() {
        let raw = RawConditions {
            count: "4".to_string(),
            odd: "3".to_string(),
            sum: "80-120".to_string(),
            exclude_reds: "1 2".to_string(),
            exclude_blues: "3 6".to_string(),
            zones: "1-20:3,21-33:3".to_string(),
        };
        let conditions = raw.to_conditions();
        assert_eq!(raw.count(), 4);
        assert_eq!(conditions.odd_count, Some(3));
        assert_eq!(conditions.sum_range, Some(SumRange { low: 80, high: 120 }));
        assert!(conditions.excluded_reds.contains(&1));
        assert!(conditions.excluded_blues.contains(&6));
        assert_eq!(conditions.active_zones().map(|z| z.len()), Some(2));
    }

    #[test]
    fn test_canonical_key() {
        assert_eq!(canonical_key("6 5 4 3 2 1|7"), "01 02 03 04 05 06 | 07");
        assert_eq!(canonical_key("  n'importe quoi "), "n'importe quoi");
    }

    #[test]
    fn test_resolve_selection() {
        let shown = vec![
            Ticket::new([1, 2, 3, 4, 5, 6], 7, 0.0),
            Ticket::new([7, 8, 9, 10, 11, 12], 13, 0.0),
        ];
        assert_eq!(resolve_selection("2", &shown), Some(shown[1]));
        assert_eq!(resolve_selection("0", &shown), None);
        assert_eq!(resolve_selection("3", &shown), None);
        assert_eq!(
            resolve_selection("01 02 03 04 05 06 | 07", &[]),
            Some(shown[0])
        );
        assert_eq!(resolve_selection("", &shown), None);
    }
}
