use colored::Colorize;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use crate::distribution::StateDistribution;
use crate::strategy::StrategyId;
use crate::tournament::TournamentTable;

fn colored_pct(p: f64) -> String {
    let pct = format!("{:.2}", p * 100.0);
    if p >= 0.6 {
        pct.green().to_string()
    } else if p >= 0.4 {
        pct.yellow().to_string()
    } else {
        pct.red().to_string()
    }
}

pub fn win_bar(p: f64, width: usize) -> String {
    let filled = ((p * width as f64) as usize).min(width);
    let bar: String = "\u{2588}".repeat(filled) + &"\u{2591}".repeat(width - filled);
    let pct = format!("{:.2}%", p * 100.0);

    if p >= 0.6 {
        format!("{} {}", bar.green(), pct)
    } else if p >= 0.4 {
        format!("{} {}", bar.yellow(), pct)
    } else {
        format!("{} {}", bar.red(), pct)
    }
}

/// P1 win percentage heat grid: rows are P1 strategies, columns P2.
pub fn tournament_grid(table: &TournamentTable) -> String {
    let mut grid = Table::new();
    grid.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![Cell::new("P1 \\ P2".bold().to_string())];
    for name in &table.strategies {
        header.push(Cell::new(name).set_alignment(CellAlignment::Center));
    }
    header.push(Cell::new("mean".bold().to_string()).set_alignment(CellAlignment::Center));
    grid.set_header(header);

    let means = table.row_means();
    for (i, name) in table.strategies.iter().enumerate() {
        let mut row = vec![Cell::new(name.bold().to_string())];
        for j in 0..table.size() {
            row.push(
                Cell::new(colored_pct(table.get(i, j).p1_win)).set_alignment(CellAlignment::Right),
            );
        }
        row.push(Cell::new(colored_pct(means[i]).bold().to_string()).set_alignment(CellAlignment::Right));
        grid.add_row(row);
    }

    format!(
        "  {} (bound {}, success rate {}, {})\n{}",
        "Tournament".bold(),
        table.bound,
        table.success_rate,
        table.mode,
        grid
    )
}

/// Probability mass by `(p1_mine, p1_theirs)`, turn marginalised.
pub fn distribution_grid(dist: &StateDistribution) -> String {
    let cells = dist.grid();
    let side = cells.len();

    let mut grid = Table::new();
    grid.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![Cell::new("mine \\ theirs".bold().to_string())];
    for theirs in 0..side {
        header.push(Cell::new(theirs).set_alignment(CellAlignment::Center));
    }
    grid.set_header(header);

    for (mine, row_cells) in cells.iter().enumerate() {
        let mut row = vec![Cell::new(mine.to_string().bold().to_string())];
        for (theirs, m) in row_cells.iter().enumerate() {
            let text = format!("{:.3}", m.to_f64());
            // P1 has won in row 0, P2 in the last column.
            let text = if m.is_zero() {
                text.dimmed().to_string()
            } else if mine == 0 {
                text.green().to_string()
            } else if theirs == side - 1 {
                text.red().to_string()
            } else {
                text
            };
            row.push(Cell::new(text).set_alignment(CellAlignment::Right));
        }
        grid.add_row(row);
    }

    format!(
        "  {} after {} turns\n{}",
        "State distribution".bold(),
        dist.turns(),
        grid
    )
}

pub fn strategy_list() -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Strategy").set_alignment(CellAlignment::Left),
        Cell::new("Kind").set_alignment(CellAlignment::Left),
        Cell::new("Rule").set_alignment(CellAlignment::Left),
    ]);
    for id in StrategyId::ALL {
        let kind = if id.is_mixed() { "mixed" } else { "pure" };
        table.add_row(vec![
            Cell::new(id.as_str().bold().to_string()),
            Cell::new(kind),
            Cell::new(id.description()),
        ]);
    }
    table.to_string()
}

pub fn print_section(title: &str, content: &str) {
    println!("\n{}", title.cyan().bold());
    println!("  {}", content);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

pub fn print_success(msg: &str) {
    println!("{}", msg.green().bold());
}
