use crate::context::Context;
use crate::output::{print_json, print_table};
use bizdash_core::parse::{parse_attendees, parse_lines, parse_scorecard, parse_todos};
use bizdash_core::record::Level10Meeting;
use bizdash_core::summary::{average_rating, MeetingSummary};
use bizdash_core::week::Week;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Level10Subcommand {
    /// Print a week's meeting
    Show {
        /// Any date in the week, or YYYY-Www (default: this week)
        #[arg(long)]
        week: Option<String>,
    },
    /// Scorecard, to-do, and rating numbers for a week
    Summary {
        #[arg(long)]
        week: Option<String>,
    },
}

pub fn run(ctx: &Context, subcmd: Level10Subcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        Level10Subcommand::Show { week } => show(ctx, week.as_deref(), json),
        Level10Subcommand::Summary { week } => summary(ctx, week.as_deref(), json),
    }
}

fn resolve(week: Option<&str>) -> anyhow::Result<Week> {
    Ok(match week {
        Some(w) => Week::parse(w)?,
        None => Week::current(),
    })
}

fn load(ctx: &Context, week: Week) -> anyhow::Result<Option<Level10Meeting>> {
    Ok(ctx.repo()?.meeting_for_week(week)?)
}

fn show(ctx: &Context, week: Option<&str>, json: bool) -> anyhow::Result<()> {
    let week = resolve(week)?;
    let meeting = load(ctx, week)?;

    if json {
        return print_json(&meeting);
    }

    let Some(m) = meeting else {
        println!("No meeting recorded. ({})", week.label());
        return Ok(());
    };

    println!("Level 10: {}", week.label());
    let attendees = parse_attendees(&m.attendees);
    if !attendees.is_empty() {
        println!("Attendees: {}", attendees.join(", "));
    }
    for (title, body) in [
        ("Segue", &m.segue),
        ("Rock review", &m.rock_review),
        ("Headlines", &m.headlines),
        ("IDS", &m.ids_notes),
        ("Conclusion", &m.conclusion),
    ] {
        let lines = parse_lines(body);
        if lines.is_empty() {
            continue;
        }
        println!("\n{title}:");
        for line in lines {
            println!("  - {line}");
        }
    }

    let scorecard = parse_scorecard(&m.scorecard);
    if !scorecard.is_empty() {
        println!("\nScorecard:");
        let rows = scorecard
            .iter()
            .map(|e| {
                vec![
                    e.metric.clone(),
                    fmt_num(e.actual),
                    fmt_num(e.goal),
                    match e.on_track {
                        Some(true) => "yes".to_string(),
                        Some(false) => "no".to_string(),
                        None => "-".to_string(),
                    },
                ]
            })
            .collect();
        print_table(&["METRIC", "ACTUAL", "GOAL", "ON TRACK"], rows);
    }

    let todos = parse_todos(&m.todos);
    if !todos.is_empty() {
        println!("\nTo-dos:");
        for t in todos {
            let mark = if t.done { "x" } else { " " };
            match t.owner {
                Some(owner) => println!("  [{mark}] {} ({owner})", t.text),
                None => println!("  [{mark}] {}", t.text),
            }
        }
    }

    if let Some(r) = m.rating {
        println!("\nRating: {r}/10");
    }
    Ok(())
}

fn summary(ctx: &Context, week: Option<&str>, json: bool) -> anyhow::Result<()> {
    let week = resolve(week)?;
    let repo = ctx.repo()?;
    let meeting = repo
        .meeting_for_week(week)?
        .unwrap_or_else(|| Level10Meeting::new(week));
    let summary = MeetingSummary::of(&meeting);
    let average = average_rating(&repo.all_meetings()?);

    if json {
        return print_json(&serde_json::json!({
            "week": week,
            "summary": summary,
            "average_rating": average,
        }));
    }

    println!("{}", week.label());
    println!("  attendees:  {}", summary.attendees);
    println!(
        "  scorecard:  {}/{} on track ({}%)",
        summary.scorecard_on_track, summary.scorecard_metrics, summary.scorecard_on_track_pct
    );
    println!(
        "  to-dos:     {}/{} done ({}%)",
        summary.todos_done, summary.todos_total, summary.todos_done_pct
    );
    match summary.rating {
        Some(r) => println!("  rating:     {r}/10"),
        None => println!("  rating:     -"),
    }
    if let Some(avg) = average {
        println!("  average:    {avg}");
    }
    Ok(())
}

fn fmt_num(n: Option<f64>) -> String {
    n.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
