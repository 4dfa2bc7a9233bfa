use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use shuangse_db::models::{
    BLUE_MAX, BLUE_MIN, RED_COUNT, RED_MAX, RED_MIN, Ticket, now_ts, odd_count, red_sum,
};
use shuangse_db::store::{Store, StoreError};

/// Plafond de tentatives pour la génération sous conditions.
pub const MAX_ATTEMPTS: usize = 10_000;

/// Exactement `quota` rouges dans `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneQuota {
    pub low: u8,
    pub high: u8,
    pub quota: usize,
}

impl ZoneQuota {
    pub fn new(low: u8, high: u8, quota: usize) -> Self {
        Self { low, high, quota }
    }
}

/// Bornes incluses sur la somme des rouges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SumRange {
    pub low: u32,
    pub high: u32,
}

impl SumRange {
    pub fn contains(&self, sum: u32) -> bool {
        self.low <= sum && sum <= self.high
    }
}

#[derive(Debug, Clone, Default)]
pub struct Conditions {
    pub zones: Option<Vec<ZoneQuota>>,
    pub odd_count: Option<usize>,
    pub sum_range: Option<SumRange>,
    pub excluded_reds: BTreeSet<u8>,
    pub excluded_blues: BTreeSet<u8>,
}

impl Conditions {
    /// Les zones ne s'appliquent que si les quotas totalisent 6 ; sinon
    /// elles sont ignorées et le tirage se fait sur toute la plage.
    pub fn active_zones(&self) -> Option<&[ZoneQuota]> {
        self.zones
            .as_deref()
            .filter(|zones| total_quota(zones) == Some(RED_COUNT))
    }
}

/// Total des quotas, `None` en cas de dépassement.
pub fn total_quota(zones: &[ZoneQuota]) -> Option<usize> {
    zones
        .iter()
        .try_fold(0usize, |acc, z| acc.checked_add(z.quota))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Filled,
    AttemptsExhausted,
    RedPoolTooSmall,
    BluePoolEmpty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationReport {
    pub attempts: usize,
    pub stop: StopReason,
}

/// Génère des grilles et les consigne dans l'historique du `Store`.
pub struct Generator<'a> {
    store: &'a Store,
    rng: StdRng,
}

impl<'a> Generator<'a> {
    pub fn new(store: &'a Store, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self { store, rng }
    }

    pub fn generate_random(&mut self, count: usize) -> Result<Vec<Ticket>, StoreError> {
        let tickets: Vec<Ticket> = (0..count).map(|_| random_ticket(&mut self.rng)).collect();
        self.store.append_history(&tickets)?;
        Ok(tickets)
    }

    /// Peut rendre moins de `count` grilles (contraintes infaisables ou
    /// budget épuisé) ; ce n'est pas une erreur. L'historique n'est écrit que
    /// si au moins une grille a été acceptée.
    pub fn generate_with_conditions(
        &mut self,
        count: usize,
        conditions: &Conditions,
    ) -> Result<Vec<Ticket>, StoreError> {
        let (tickets, report) = sample_with_conditions(&mut self.rng, count, conditions);
        debug!(
            requested = count,
            accepted = tickets.len(),
            attempts = report.attempts,
            stop = ?report.stop,
            "génération sous conditions"
        );
        if !tickets.is_empty() {
            self.store.append_history(&tickets)?;
        }
        Ok(tickets)
    }
}

pub fn random_ticket<R: Rng + ?Sized>(rng: &mut R) -> Ticket {
    let pool: Vec<u8> = (RED_MIN..=RED_MAX).collect();
    let reds = pick_sorted(&pool, rng);
    let blue = rng.random_range(BLUE_MIN..=BLUE_MAX);
    Ticket::new(reds, blue, now_ts())
}

/// Échantillonnage par rejet, sans effet de bord sur le stockage.
pub fn sample_with_conditions<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    conditions: &Conditions,
) -> (Vec<Ticket>, GenerationReport) {
    let zones = conditions.active_zones();
    let red_pool: Vec<u8> = (RED_MIN..=RED_MAX)
        .filter(|r| !conditions.excluded_reds.contains(r))
        .collect();
    let blue_pool: Vec<u8> = (BLUE_MIN..=BLUE_MAX)
        .filter(|b| !conditions.excluded_blues.contains(b))
        .collect();

    // Au plus une grille acceptée par tentative.
    let mut accepted: Vec<Ticket> = Vec::with_capacity(count.min(MAX_ATTEMPTS));
    let mut attempts = 0;

    let stop = loop {
        if accepted.len() >= count {
            break StopReason::Filled;
        }
        if attempts >= MAX_ATTEMPTS {
            break StopReason::AttemptsExhausted;
        }
        attempts += 1;

        let reds = match zones {
            Some(zones) => match draw_zoned(zones, &conditions.excluded_reds, rng) {
                Some(reds) => reds,
                None => continue,
            },
            None => {
                if red_pool.len() < RED_COUNT {
                    break StopReason::RedPoolTooSmall;
                }
                pick_sorted(&red_pool, rng)
            }
        };

        if let Some(target) = conditions.odd_count {
            if odd_count(&reds) != target {
                continue;
            }
        }
        if let Some(range) = conditions.sum_range {
            if !range.contains(red_sum(&reds)) {
                continue;
            }
        }

        // Un bleu impossible arrête tout le lot, pas seulement la tentative.
        let Some(&blue) = blue_pool.choose(rng) else {
            break StopReason::BluePoolEmpty;
        };

        let ticket = Ticket::new(reds, blue, now_ts());
        if accepted.contains(&ticket) {
            continue;
        }
        accepted.push(ticket);
    };

    (accepted, GenerationReport { attempts, stop })
}

/// Tire chaque zone dans l'ordre. `None` si une zone n'a pas assez de
/// candidats une fois retirés les numéros déjà choisis et les exclus.
fn draw_zoned<R: Rng + ?Sized>(
    zones: &[ZoneQuota],
    excluded: &BTreeSet<u8>,
    rng: &mut R,
) -> Option<[u8; RED_COUNT]> {
    let mut chosen: Vec<u8> = Vec::with_capacity(RED_COUNT);
    for zone in zones {
        let low = zone.low.max(RED_MIN);
        let high = zone.high.min(RED_MAX);
        let pool: Vec<u8> = (low..=high)
            .filter(|r| !chosen.contains(r) && !excluded.contains(r))
            .collect();
        if pool.len() < zone.quota {
            return None;
        }
        chosen.extend(pool.choose_multiple(rng, zone.quota).copied());
    }
    if chosen.len() != RED_COUNT {
        return None;
    }
    let mut reds = [0u8; RED_COUNT];
    reds.copy_from_slice(&chosen);
    reds.sort();
    Some(reds)
}

fn pick_sorted<R: Rng + ?Sized>(pool: &[u8], rng: &mut R) -> [u8; RED_COUNT] {
    let mut reds = [0u8; RED_COUNT];
    for (slot, &r) in reds.iter_mut().zip(pool.choose_multiple(rng, RED_COUNT)) {
        *slot = r;
    }
    reds.sort();
    reds
}
