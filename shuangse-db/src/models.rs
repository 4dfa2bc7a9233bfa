use std::fmt;
use std::hash::{Hash, Hasher};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

pub const RED_MIN: u8 = 1;
pub const RED_MAX: u8 = 33;
pub const RED_COUNT: usize = 6;
pub const BLUE_MIN: u8 = 1;
pub const BLUE_MAX: u8 = 16;

/// Séparateur entre les rouges et le bleu dans la forme canonique.
pub const SEPARATOR: &str = " | ";

/// Une grille : 6 rouges triés + 1 bleu, horodatée.
///
/// La construction ne valide rien : c'est au générateur ou au parseur de
/// garantir l'invariant avant de persister. L'égalité et le hachage ne portent
/// que sur les numéros, `ts` est une métadonnée.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ticket {
    pub reds: [u8; RED_COUNT],
    pub blue: u8,
    #[serde(default)]
    pub ts: f64,
}

impl Ticket {
    pub fn new(reds: [u8; RED_COUNT], blue: u8, ts: f64) -> Self {
        Self { reds, blue, ts }
    }

    /// Forme canonique `"01 02 03 04 05 06 | 07"`, clé d'identité.
    pub fn format(&self) -> String {
        let reds = self
            .reds
            .iter()
            .map(|r| format!("{:02}", r))
            .collect::<Vec<_>>()
            .join(" ");
        format!("{}{}{:02}", reds, SEPARATOR, self.blue)
    }

    /// Inverse de `format`. Accepte aussi `"...06|07"` sans espaces.
    pub fn parse(text: &str) -> Result<Self> {
        let (red_part, blue_part) = text
            .split_once('|')
            .with_context(|| format!("Séparateur '|' manquant : '{}'", text.trim()))?;

        let reds: Vec<u8> = red_part
            .split_whitespace()
            .map(|s| {
                s.parse::<u8>()
                    .with_context(|| format!("Rouge invalide : '{}'", s))
            })
            .collect::<Result<_>>()?;
        if reds.len() != RED_COUNT {
            bail!("{} rouges attendus, {} trouvés", RED_COUNT, reds.len());
        }

        let blue_str = blue_part.trim();
        let blue = blue_str
            .parse::<u8>()
            .with_context(|| format!("Bleu invalide : '{}'", blue_str))?;

        let mut arr = [0u8; RED_COUNT];
        arr.copy_from_slice(&reds);
        arr.sort();
        validate_ticket(&arr, blue)?;

        Ok(Self::new(arr, blue, 0.0))
    }

    pub fn odd_count(&self) -> usize {
        odd_count(&self.reds)
    }

    pub fn red_sum(&self) -> u32 {
        red_sum(&self.reds)
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl PartialEq for Ticket {
    fn eq(&self, other: &Self) -> bool {
        self.reds == other.reds && self.blue == other.blue
    }
}

impl Eq for Ticket {}

impl Hash for Ticket {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.reds.hash(state);
        self.blue.hash(state);
    }
}

pub fn validate_ticket(reds: &[u8], blue: u8) -> Result<()> {
    if reds.len() != RED_COUNT {
        bail!("{} rouges attendus, {} fournis", RED_COUNT, reds.len());
    }
    for &r in reds {
        if !(RED_MIN..=RED_MAX).contains(&r) {
            bail!("Rouge {} hors limites ({}-{})", r, RED_MIN, RED_MAX);
        }
    }
    if !(BLUE_MIN..=BLUE_MAX).contains(&blue) {
        bail!("Bleu {} hors limites ({}-{})", blue, BLUE_MIN, BLUE_MAX);
    }
    for i in 0..reds.len() {
        for j in (i + 1)..reds.len() {
            if reds[i] == reds[j] {
                bail!("Rouge en double : {}", reds[i]);
            }
        }
    }
    Ok(())
}

pub fn odd_count(reds: &[u8]) -> usize {
    reds.iter().filter(|&&r| r % 2 == 1).count()
}

pub fn red_sum(reds: &[u8]) -> u32 {
    reds.iter().map(|&r| r as u32).sum()
}

/// Secondes depuis l'epoch, à la milliseconde.
pub fn now_ts() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
