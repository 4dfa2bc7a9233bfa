mod display;
mod input;
mod interactive;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::display::{display_scores, display_tickets};
use crate::input::{RawConditions, canonical_key, parse_draw};
use shuangse_db::models::{Ticket, now_ts};
use shuangse_db::store::{Store, default_data_dir};
use shuangse_engine::compare::compare_all;
use shuangse_engine::generator::Generator;

#[derive(Parser)]
#[command(name = "shuangse", about = "Générateur de grilles double couleur (6 rouges + 1 bleu)")]
struct Cli {
    /// Répertoire des fichiers JSON (historique, favoris, dernier tirage)
    #[arg(long, global = true, env = "SHUANGSE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Journalisation détaillée (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Générer des grilles au hasard
    Random {
        /// Nombre de grilles
        #[arg(short, long, default_value = "5")]
        count: usize,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Générer des grilles sous conditions
    Generate {
        /// Nombre de grilles (invalide = 1)
        #[arg(short, long, default_value = "1")]
        count: String,

        /// Nombre exact de rouges impairs
        #[arg(long, default_value = "")]
        odd: String,

        /// Plage de somme des rouges (ex: 80-120)
        #[arg(long, default_value = "")]
        sum: String,

        /// Rouges exclus (ex: "1 2")
        #[arg(long, default_value = "")]
        exclude_reds: String,

        /// Bleus exclus (ex: "3 6")
        #[arg(long, default_value = "")]
        exclude_blues: String,

        /// Zones de rouges avec quotas (ex: 1-20:3,21-33:3)
        #[arg(long, default_value = "")]
        zones: String,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Lister l'historique (le plus récent en premier)
    History {
        /// Nombre de grilles à afficher
        #[arg(short, long, default_value = "50")]
        last: usize,
    },

    /// Ajouter une grille aux favoris (ex: "01 02 03 04 05 06 | 07")
    Favorite { ticket: String },

    /// Lister les favoris
    Favorites,

    /// Retirer une grille des favoris
    Unfavorite { ticket: String },

    /// Retirer une grille de l'historique
    Forget { ticket: String },

    /// Enregistrer le dernier tirage
    Draw {
        /// 6 rouges (ex: "3 8 15 21 27 33")
        #[arg(short, long)]
        reds: String,

        /// Bleu
        #[arg(short, long)]
        blue: String,
    },

    /// Afficher le dernier tirage enregistré
    Latest,

    /// Comparer les favoris au dernier tirage
    Compare,

    /// Afficher le répertoire des données
    DataDir,

    /// Mode interactif
    Interactive,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let dir = cli.data_dir.unwrap_or_else(default_data_dir);
    let store = Store::open(&dir);
    tracing::debug!(?dir, "répertoire des données");

    match cli.command {
        Command::Random { count, seed } => cmd_random(&store, count, seed).map(drop),
        Command::Generate {
            count,
            odd,
            sum,
            exclude_reds,
            exclude_blues,
            zones,
            seed,
        } => {
            let raw = RawConditions {
                count,
                odd,
                sum,
                exclude_reds,
                exclude_blues,
                zones,
            };
            cmd_generate(&store, &raw, seed).map(drop)
        }
        Command::History { last } => cmd_history(&store, last).map(drop),
        Command::Favorite { ticket } => {
            let ticket = Ticket::parse(&ticket).context("Format incorrect")?;
            cmd_favorite(&store, ticket)
        }
        Command::Favorites => cmd_favorites(&store).map(drop),
        Command::Unfavorite { ticket } => cmd_unfavorite(&store, &ticket),
        Command::Forget { ticket } => cmd_forget(&store, &ticket),
        Command::Draw { reds, blue } => cmd_draw(&store, &reds, &blue),
        Command::Latest => cmd_latest(&store),
        Command::Compare => cmd_compare(&store),
        Command::DataDir => {
            println!("{}", dir.display());
            Ok(())
        }
        Command::Interactive => interactive::run_interactive(&store),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_random(store: &Store, count: usize, seed: Option<u64>) -> Result<Vec<Ticket>> {
    let tickets = Generator::new(store, seed)
        .generate_random(count)
        .context("Échec de l'enregistrement de l'historique")?;
    display_tickets(&format!("🎲 {} grille(s) aléatoire(s)", tickets.len()), &tickets);
    Ok(tickets)
}

fn cmd_generate(store: &Store, raw: &RawConditions, seed: Option<u64>) -> Result<Vec<Ticket>> {
    let count = raw.count();
    let conditions = raw.to_conditions();
    if !raw.zones.trim().is_empty() && conditions.zones.is_none() {
        println!("Zones ignorées (format invalide ou quotas ≠ 6).");
    }

    let tickets = Generator::new(store, seed)
        .generate_with_conditions(count, &conditions)
        .context("Échec de l'enregistrement de l'historique")?;

    display_tickets(&format!("🎯 Génération sous conditions : {} grille(s)", tickets.len()), &tickets);
    if tickets.len() < count {
        println!("Contraintes trop strictes : {} grille(s) sur {} demandée(s).", tickets.len(), count);
    }
    Ok(tickets)
}

fn cmd_history(store: &Store, last: usize) -> Result<Vec<Ticket>> {
    let tickets = store.load_history(last);
    if tickets.is_empty() {
        println!("Historique vide. Lancez d'abord : shuangse random");
        return Ok(tickets);
    }
    display_tickets(
        &format!("📜 {} dernière(s) grille(s) sur {}", tickets.len(), store.history_len()),
        &tickets,
    );
    Ok(tickets)
}

fn cmd_favorite(store: &Store, mut ticket: Ticket) -> Result<()> {
    ticket.ts = now_ts();
    if store.save_favorite(&ticket)? {
        println!("Ajouté aux favoris : {}", ticket);
    } else {
        println!("Déjà dans les favoris : {}", ticket);
    }
    Ok(())
}

fn cmd_favorites(store: &Store) -> Result<Vec<Ticket>> {
    let favs = store.load_favorites();
    if favs.is_empty() {
        println!("Aucun favori.");
        return Ok(favs);
    }
    display_tickets(&format!("⭐ {} favori(s)", favs.len()), &favs);
    Ok(favs)
}

fn cmd_unfavorite(store: &Store, text: &str) -> Result<()> {
    let key = canonical_key(text);
    if store.delete_favorite(&key)? {
        println!("Favori supprimé : {}", key);
    } else {
        println!("Favori introuvable : {}", key);
    }
    Ok(())
}

fn cmd_forget(store: &Store, text: &str) -> Result<()> {
    let key = canonical_key(text);
    if store.delete_history_entry(&key)? {
        println!("Entrée supprimée de l'historique : {}", key);
    } else {
        println!("Entrée introuvable dans l'historique : {}", key);
    }
    Ok(())
}

fn cmd_draw(store: &Store, reds: &str, blue: &str) -> Result<()> {
    let Some((reds, blue)) = parse_draw(reds, blue) else {
        bail!("Format incorrect : 6 rouges et 1 bleu attendus");
    };
    let ticket = store.set_latest_draw(&reds, blue)?;
    println!("Dernier tirage mis à jour : {}", ticket);
    Ok(())
}

fn cmd_latest(store: &Store) -> Result<()> {
    match store.latest_draw() {
        Some(draw) => display_tickets("🏁 Dernier tirage", &[draw]),
        None => println!("Aucun tirage enregistré. Lancez d'abord : shuangse draw"),
    }
    Ok(())
}

fn cmd_compare(store: &Store) -> Result<()> {
    let Some(draw) = store.latest_draw() else {
        println!("Aucun tirage enregistré. Lancez d'abord : shuangse draw");
        return Ok(());
    };
    let favs = store.load_favorites();
    if favs.is_empty() {
        println!("Aucun favori à comparer.");
        return Ok(());
    }
    display_scores(&draw, &compare_all(&draw, &favs));
    Ok(())
}
