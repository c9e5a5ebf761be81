use crate::context::Context;
use crate::output::{or_dash, print_json, print_table, truncate};
use bizdash_core::summary::RockSummary;
use bizdash_core::week::Quarter;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum RocksSubcommand {
    /// List a quarter's rocks
    List {
        /// YYYY-Qn (default: this quarter)
        #[arg(long)]
        quarter: Option<String>,
    },
    /// Completion by status and owner
    Summary {
        #[arg(long)]
        quarter: Option<String>,
    },
}

pub fn run(ctx: &Context, subcmd: RocksSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        RocksSubcommand::List { quarter } => list(ctx, quarter.as_deref(), json),
        RocksSubcommand::Summary { quarter } => summary(ctx, quarter.as_deref(), json),
    }
}

fn resolve(quarter: Option<&str>) -> anyhow::Result<Quarter> {
    Ok(match quarter {
        Some(q) => Quarter::parse(q)?,
        None => Quarter::current(),
    })
}

fn list(ctx: &Context, quarter: Option<&str>, json: bool) -> anyhow::Result<()> {
    let quarter = resolve(quarter)?;
    let rocks = ctx.repo()?.rocks_for_quarter(quarter)?;

    if json {
        return print_json(&rocks);
    }
    if rocks.is_empty() {
        println!("No rocks for {quarter}.");
        return Ok(());
    }
    let rows = rocks
        .iter()
        .map(|r| {
            vec![
                r.id.clone().unwrap_or_default(),
                r.status.to_string(),
                or_dash(&r.owner),
                r.due_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
                truncate(&r.title, 60),
            ]
        })
        .collect();
    print_table(&["ID", "STATUS", "OWNER", "DUE", "TITLE"], rows);
    Ok(())
}

fn summary(ctx: &Context, quarter: Option<&str>, json: bool) -> anyhow::Result<()> {
    let quarter = resolve(quarter)?;
    let rocks = ctx.repo()?.rocks_for_quarter(quarter)?;
    let s = RockSummary::of(&rocks);

    if json {
        return print_json(&serde_json::json!({ "quarter": quarter, "summary": s }));
    }
    println!(
        "{quarter}: {} rocks, {} done ({}%), {} on track, {} off track",
        s.total, s.done, s.completion_pct, s.on_track, s.off_track
    );
    if !s.by_owner.is_empty() {
        let rows = s
            .by_owner
            .iter()
            .map(|(owner, o)| vec![owner.clone(), o.total.to_string(), o.done.to_string()])
            .collect();
        print_table(&["OWNER", "ROCKS", "DONE"], rows);
    }
    Ok(())
}
