use std::io::{self, Write};

use anyhow::{Context, Result, bail};

use crate::input::{RawConditions, resolve_selection};
use shuangse_db::models::Ticket;
use shuangse_db::store::Store;

#[derive(Debug, PartialEq)]
enum InteractiveCommand {
    Random,
    Generate,
    History,
    Favorite,
    Favorites,
    Draw,
    Compare,
    Delete,
    Quit,
}

fn parse_command(input: &str) -> Option<InteractiveCommand> {
    match input.trim().to_lowercase().as_str() {
        "1" | "aleatoire" | "aléatoire" | "random" | "rand" => Some(InteractiveCommand::Random),
        "2" | "conditions" | "generer" | "générer" | "generate" | "gen" => {
            Some(InteractiveCommand::Generate)
        }
        "3" | "historique" | "history" | "hist" => Some(InteractiveCommand::History),
        "4" | "favori" | "favorite" | "fav" => Some(InteractiveCommand::Favorite),
        "5" | "favoris" | "favorites" | "favs" => Some(InteractiveCommand::Favorites),
        "6" | "tirage" | "draw" => Some(InteractiveCommand::Draw),
        "7" | "comparer" | "compare" | "comp" => Some(InteractiveCommand::Compare),
        "8" | "supprimer" | "delete" | "del" => Some(InteractiveCommand::Delete),
        "9" | "quitter" | "quit" | "q" | "exit" => Some(InteractiveCommand::Quit),
        _ => None,
    }
}

fn display_menu() {
    println!();
    println!("── Mode interactif ──");
    println!("  1. aleatoire  5 grilles au hasard");
    println!("  2. conditions Génération sous conditions");
    println!("  3. historique 50 dernières grilles");
    println!("  4. favori     Ajouter une grille aux favoris");
    println!("  5. favoris    Lister les favoris");
    println!("  6. tirage     Saisir le dernier tirage");
    println!("  7. comparer   Comparer les favoris au tirage");
    println!("  8. supprimer  Retirer un favori ou une entrée d'historique");
    println!("  9. quitter    Quitter");
    println!();
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    if read == 0 {
        bail!("Fin de saisie");
    }
    Ok(input.trim().to_string())
}

fn prompt_with_default(msg: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}] : ", msg, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Ligne de la dernière liste affichée, ou grille saisie en clair.
fn prompt_selection(shown: &[Ticket]) -> Result<Ticket> {
    let msg = if shown.is_empty() {
        "Grille (ex: 01 02 03 04 05 06 | 07) : ".to_string()
    } else {
        format!("Ligne (1-{}) ou grille : ", shown.len())
    };
    let input = prompt(&msg)?;
    match resolve_selection(&input, shown) {
        Some(ticket) => Ok(ticket),
        None => bail!("Format incorrect : '{}'", input),
    }
}

fn cmd_generate_interactive(store: &Store) -> Result<Vec<Ticket>> {
    let raw = RawConditions {
        count: prompt_with_default("Nombre de grilles", "1")?,
        odd: prompt("Nombre d'impairs (vide = libre) : ")?,
        sum: prompt("Somme des rouges (ex: 80-120) : ")?,
        exclude_reds: prompt("Rouges exclus (ex: 1 2) : ")?,
        exclude_blues: prompt("Bleus exclus (ex: 3 6) : ")?,
        zones: prompt("Zones (ex: 1-20:3,21-33:3) : ")?,
    };
    super::cmd_generate(store, &raw, None)
}

fn cmd_history_interactive(store: &Store) -> Result<Vec<Ticket>> {
    let n_str = prompt_with_default("Nombre de grilles", "50")?;
    let n: usize = n_str.parse().context("Nombre invalide")?;
    super::cmd_history(store, n)
}

fn cmd_draw_interactive(store: &Store) -> Result<()> {
    let reds = prompt("6 rouges (séparés par des espaces, 1-33) : ")?;
    let blue = prompt("Bleu (1-16) : ")?;
    super::cmd_draw(store, &reds, &blue)
}

fn cmd_delete_interactive(store: &Store, shown: &[Ticket]) -> Result<()> {
    let target = prompt_with_default("Favori ou historique ? (f/h)", "f")?;
    let ticket = prompt_selection(shown)?;
    match target.to_lowercase().as_str() {
        "f" => super::cmd_unfavorite(store, &ticket.format()),
        "h" => super::cmd_forget(store, &ticket.format()),
        other => bail!("Choix inconnu : '{}'", other),
    }
}

pub fn run_interactive(store: &Store) -> Result<()> {
    println!("Bienvenue dans le mode interactif de shuangse !");
    println!("Données : {}", store.history_path().display());

    // Dernière liste affichée, pour sélectionner une grille par son numéro.
    let mut shown: Vec<Ticket> = Vec::new();

    loop {
        display_menu();
        let input = match prompt("> ") {
            Ok(s) => s,
            Err(_) => break, // EOF / Ctrl+D
        };

        if input.is_empty() {
            continue;
        }

        let listed = match parse_command(&input) {
            Some(InteractiveCommand::Quit) => {
                println!("Au revoir !");
                break;
            }
            Some(InteractiveCommand::Random) => super::cmd_random(store, 5, None).map(Some),
            Some(InteractiveCommand::Generate) => cmd_generate_interactive(store).map(Some),
            Some(InteractiveCommand::History) => cmd_history_interactive(store).map(Some),
            Some(InteractiveCommand::Favorites) => super::cmd_favorites(store).map(Some),
            Some(InteractiveCommand::Favorite) => prompt_selection(&shown)
                .and_then(|ticket| super::cmd_favorite(store, ticket))
                .map(|_| None),
            Some(InteractiveCommand::Draw) => cmd_draw_interactive(store).map(|_| None),
            Some(InteractiveCommand::Compare) => super::cmd_compare(store).map(|_| None),
            Some(InteractiveCommand::Delete) => {
                cmd_delete_interactive(store, &shown).map(|_| None)
            }
            None => {
                println!("Commande inconnue : '{}'. Tapez un numéro (1-9) ou un nom de commande.", input);
                Ok(None)
            }
        };

        match listed {
            Ok(Some(tickets)) => shown = tickets,
            Ok(None) => {}
            Err(e) => println!("Erreur: {e:#}"),
        }
    }

    Ok(())
}
