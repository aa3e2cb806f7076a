use std::path::{Path, PathBuf};

use badge_core::pricing::{format_cents, SessionMode};
use badge_core::session::OrderHandoff;
use console::Style;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    price: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            price: Style::new().green().bold(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_order_summary(handoff: &OrderHandoff, badges: &[PathBuf], json: &Path) {
    let s = Styles::new();
    let summary = &handoff.summary;

    println!();
    println!("  {}", s.title.apply_to("Badge Order"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(11)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Mode"),
        s.value.apply_to(summary.mode)
    );
    if let Some(count) = handoff.replication_count {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Copies"),
            s.value.apply_to(count)
        );
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Quantity"),
        s.value.apply_to(summary.quantity)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Unit price"),
        s.value.apply_to(format_cents(summary.price_per_unit_cents))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Total"),
        s.price.apply_to(format_cents(summary.total_cents))
    );
    println!();

    println!("  {}", s.header.apply_to("Artifacts"));
    for (item, path) in handoff.artifacts.iter().zip(badges) {
        let copies = match summary.mode {
            SessionMode::Personal => String::new(),
            SessionMode::Event => format!(" x{}", item.copies),
        };
        println!(
            "    {:<8}{}{}",
            s.label.apply_to(item.design_id),
            s.path.apply_to(path.display()),
            copies
        );
    }
    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Handoff"),
        s.path.apply_to(json.display())
    );
    println!();
}
