use crate::context::Context;
use crate::output::{or_dash, print_json, print_table};
use bizdash_core::record::Association;
use bizdash_core::store::Query;
use bizdash_core::summary::AssociationSummary;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum AssociationsSubcommand {
    /// List memberships
    List,
    /// Dues total and upcoming renewals
    Summary,
}

pub fn run(ctx: &Context, subcmd: AssociationsSubcommand, json: bool) -> anyhow::Result<()> {
    let assocs: Vec<Association> = ctx
        .repo()?
        .list(&Query::all().order_by("name", false))?;
    match subcmd {
        AssociationsSubcommand::List => list(&assocs, json),
        AssociationsSubcommand::Summary => summary(ctx, &assocs, json),
    }
}

fn list(assocs: &[Association], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&assocs);
    }
    if assocs.is_empty() {
        println!("No associations.");
        return Ok(());
    }
    let rows = assocs
        .iter()
        .map(|a| {
            vec![
                a.id.clone().unwrap_or_default(),
                a.name.clone(),
                or_dash(&a.membership_level),
                or_dash(&a.annual_dues),
                a.renewal_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".into()),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "LEVEL", "DUES", "RENEWS"], rows);
    Ok(())
}

fn summary(ctx: &Context, assocs: &[Association], json: bool) -> anyhow::Result<()> {
    let today = chrono::Local::now().date_naive();
    let window = ctx.config.dashboard.renewal_window_days;
    let s = AssociationSummary::of(assocs, today, window);

    if json {
        return print_json(&s);
    }
    println!(
        "{} memberships, {:.2} in annual dues ({} unpriced)",
        s.memberships, s.total_annual_dues, s.unpriced
    );
    if s.renewals_due.is_empty() {
        println!("No renewals in the next {window} days.");
        return Ok(());
    }
    let rows = s
        .renewals_due
        .iter()
        .map(|r| {
            let when = if r.days_until < 0 {
                format!("{} days overdue", -r.days_until)
            } else {
                format!("in {} days", r.days_until)
            };
            vec![r.name.clone(), r.renewal_date.to_string(), when]
        })
        .collect();
    print_table(&["NAME", "RENEWS", "WHEN"], rows);
    Ok(())
}
