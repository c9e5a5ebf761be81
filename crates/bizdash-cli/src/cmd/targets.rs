use crate::context::Context;
use crate::output::{or_dash, print_json, print_table, truncate};
use bizdash_core::record::Target;
use bizdash_core::store::Query;
use bizdash_core::summary::PipelineSummary;
use bizdash_core::types::TargetStage;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum TargetsSubcommand {
    /// List sales targets
    List {
        /// Only targets at this stage
        #[arg(long)]
        stage: Option<String>,
    },
    /// Pipeline totals by stage
    Summary,
}

pub fn run(ctx: &Context, subcmd: TargetsSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TargetsSubcommand::List { stage } => list(ctx, stage.as_deref(), json),
        TargetsSubcommand::Summary => summary(ctx, json),
    }
}

fn list(ctx: &Context, stage: Option<&str>, json: bool) -> anyhow::Result<()> {
    let mut query = Query::all().order_by("company", false);
    if let Some(s) = stage {
        let stage: TargetStage = s.parse()?;
        query = query.eq("stage", stage);
    }
    let targets: Vec<Target> = ctx.repo()?.list(&query)?;

    if json {
        return print_json(&targets);
    }
    if targets.is_empty() {
        println!("No targets.");
        return Ok(());
    }
    let rows = targets
        .iter()
        .map(|t| {
            vec![
                t.id.clone().unwrap_or_default(),
                t.company.clone(),
                t.stage.to_string(),
                or_dash(&t.estimated_value),
                truncate(&or_dash(&t.next_step), 40),
            ]
        })
        .collect();
    print_table(&["ID", "COMPANY", "STAGE", "VALUE", "NEXT STEP"], rows);
    Ok(())
}

fn summary(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let targets: Vec<Target> = ctx.repo()?.list(&Query::all())?;
    let s = PipelineSummary::of(&targets);

    if json {
        return print_json(&s);
    }
    println!(
        "{} targets, {:.2} open, {:.2} won, win rate {}%",
        s.total, s.open_value, s.won_value, s.win_rate_pct
    );
    let rows = TargetStage::all()
        .iter()
        .map(|stage| {
            let n = s.by_stage.get(stage.as_str()).copied().unwrap_or(0);
            vec![stage.to_string(), n.to_string()]
        })
        .collect();
    print_table(&["STAGE", "COUNT"], rows);
    Ok(())
}
