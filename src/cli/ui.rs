use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Large prices are shortened with `K`/`M` suffixes.
pub fn format_price(price: f64) -> String {
    let magnitude = price.abs();
    if magnitude >= 1_000_000.0 {
        format!("{:.1}M", price / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{:.1}K", price / 1_000.0)
    } else {
        format!("{price:.2}")
    }
}

/// Renders a change as `abs (pct%)`, e.g. `+10.00 (+10.00%)`.
pub fn format_delta(absolute: f64, percent: f64) -> String {
    format!("{absolute:+.2} ({percent:+.2}%)")
}

pub fn price_cell(price: f64) -> Cell {
    Cell::new(format_price(price)).set_alignment(CellAlignment::Right)
}

/// Creates a cell for displaying a change with color coding.
pub fn change_cell(text: String, change: f64) -> Cell {
    let color = if change >= 0.0 {
        Color::Green
    } else {
        Color::Red
    };
    Cell::new(text).fg(color).set_alignment(CellAlignment::Right)
}

/// Creates a cell for a missing value, red when caused by an error.
pub fn na_cell(has_error: bool) -> Cell {
    let color = if has_error {
        Color::Red
    } else {
        Color::DarkGrey
    };
    Cell::new("N/A").fg(color)
}

pub fn error_cell(message: &str) -> Cell {
    Cell::new(message).fg(Color::Red)
}

/// Creates a new `indicatif::ProgressBar` with standard styling.
pub fn new_progress_bar(len: u64) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    let pb = ProgressBar::new(len);
    pb.set_style(style);
    pb
}

/// Prints a separator line matching the terminal width.
pub fn print_separator() {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    println!("\n{}", "─".repeat(term_width));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price_suffixes() {
        assert_eq!(format_price(1_234_567.0), "1.2M");
        assert_eq!(format_price(3_420.0), "3.4K");
        assert_eq!(format_price(999.994), "999.99");
        assert_eq!(format_price(1.08), "1.08");
    }

    #[test]
    fn test_format_delta_signs() {
        assert_eq!(format_delta(10.0, 10.0), "+10.00 (+10.00%)");
        assert_eq!(format_delta(-2.5, -1.25), "-2.50 (-1.25%)");
        assert_eq!(format_delta(0.0, 0.0), "+0.00 (+0.00%)");
    }
}
