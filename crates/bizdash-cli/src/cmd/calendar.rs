use crate::context::Context;
use crate::output::print_json;
use bizdash_core::calendar::{month_bounds, parse_month, upcoming, MonthGrid};
use chrono::Datelike;

pub fn run(ctx: &Context, month: Option<&str>, json: bool) -> anyhow::Result<()> {
    let today = chrono::Local::now().date_naive();
    let (year, month) = match month {
        Some(m) => parse_month(m)?,
        None => (today.year(), today.month()),
    };
    let (first, last) = month_bounds(year, month)?;
    let repo = ctx.repo()?;
    let events = repo.events_between(first, last)?;
    let grid = MonthGrid::build(year, month, &events, today)?;

    if json {
        return print_json(&grid);
    }

    println!("{:^34}", grid.title);
    println!(" Mon  Tue  Wed  Thu  Fri  Sat  Sun");
    for week in &grid.weeks {
        let cells: Vec<String> = week
            .iter()
            .map(|d| {
                if !d.in_month {
                    return "    ".to_string();
                }
                let mark = if d.is_today {
                    '*'
                } else if d.events.is_empty() {
                    ' '
                } else {
                    '+'
                };
                format!("{:>3}{mark}", d.date.day())
            })
            .collect();
        println!("{}", cells.join(" ").trim_end());
    }

    if grid.event_count == 0 {
        println!("\nNo events this month.");
    } else {
        println!("\nEvents:");
        for e in events.iter().filter(|e| e.event_date <= last) {
            match e.end_date {
                Some(end) if end != e.event_date => {
                    println!("  {} .. {}  {}", e.event_date, end, e.title)
                }
                _ => println!("  {}  {}", e.event_date, e.title),
            }
        }
    }

    let soon = upcoming(
        &repo.events_between(today, today + chrono::Duration::days(365))?,
        today,
        ctx.config.dashboard.upcoming_events,
    );
    if !soon.is_empty() {
        println!("\nUpcoming:");
        for e in soon {
            println!("  {}  {}", e.event_date, e.title);
        }
    }
    Ok(())
}
