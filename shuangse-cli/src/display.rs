use chrono::{DateTime, Local};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

use shuangse_db::models::Ticket;
use shuangse_engine::compare::Score;

fn reds_str(ticket: &Ticket) -> String {
    ticket
        .reds
        .iter()
        .map(|r| format!("{:02}", r))
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_ts(ts: f64) -> String {
    if ts <= 0.0 {
        return "—".to_string();
    }
    let secs = ts.trunc() as i64;
    let nanos = (ts.fract() * 1e9) as u32;
    DateTime::from_timestamp(secs, nanos)
        .map(|d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "—".to_string())
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn display_tickets(title: &str, tickets: &[Ticket]) {
    if tickets.is_empty() {
        println!("Aucune grille à afficher.");
        return;
    }

    println!("\n{title}\n");
    let mut table = new_table(vec!["#", "Rouges", "Bleu", "Impairs", "Somme", "Date"]);

    for (i, ticket) in tickets.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(reds_str(ticket)).fg(Color::Red),
            Cell::new(format!("{:02}", ticket.blue)).fg(Color::Blue),
            Cell::new(ticket.odd_count()),
            Cell::new(ticket.red_sum()),
            Cell::new(format_ts(ticket.ts)),
        ]);
    }
    println!("{table}");
}

pub fn display_scores(reference: &Ticket, scores: &[(Ticket, Score)]) {
    println!("\n🎯 Dernier tirage : {}\n", reference);

    let mut table = new_table(vec!["Grille", "Rouges trouvés", "Bleu trouvé"]);

    for (ticket, score) in scores {
        let red_color = match score.red_hits {
            5..=6 => Color::Green,
            3..=4 => Color::Yellow,
            _ => Color::White,
        };
        let blue_color = if score.blue_hit == 1 {
            Color::Blue
        } else {
            Color::White
        };
        table.add_row(vec![
            Cell::new(ticket.format()),
            Cell::new(score.red_hits).fg(red_color),
            Cell::new(score.blue_hit).fg(blue_color),
        ]);
    }
    println!("{table}");
}
