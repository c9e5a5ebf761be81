use crate::context::Context;
use crate::output::print_json;
use bizdash_core::parse::{parse_lines, parse_money};
use chrono::Datelike;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum VtoSubcommand {
    /// Print the yearly goals
    Show {
        /// Year (default: this year)
        #[arg(long)]
        year: Option<i32>,
    },
}

pub fn run(ctx: &Context, subcmd: VtoSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        VtoSubcommand::Show { year } => show(ctx, year, json),
    }
}

fn show(ctx: &Context, year: Option<i32>, json: bool) -> anyhow::Result<()> {
    let year = year.unwrap_or_else(|| chrono::Local::now().date_naive().year());
    let goals = ctx.repo()?.goals_for_year(year)?;

    if json {
        return print_json(&goals);
    }

    let Some(g) = goals else {
        println!("No goals recorded for {year}.");
        return Ok(());
    };

    println!("Goals for {year}");
    for (label, raw) in [("Revenue", &g.revenue_target), ("Profit", &g.profit_target)] {
        if raw.trim().is_empty() {
            continue;
        }
        match parse_money(raw) {
            Some(v) => println!("  {label}: {raw} ({v:.0})"),
            None => println!("  {label}: {raw}"),
        }
    }
    for (title, body) in [("Measurables", &g.measurables), ("Goals", &g.goals)] {
        let lines = parse_lines(body);
        if lines.is_empty() {
            continue;
        }
        println!("\n{title}:");
        for (i, line) in lines.iter().enumerate() {
            println!("  {}. {line}", i + 1);
        }
    }
    Ok(())
}
