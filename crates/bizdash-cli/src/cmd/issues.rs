use crate::context::Context;
use crate::output::{or_dash, print_json, print_table, truncate};
use bizdash_core::record::Issue;
use bizdash_core::summary::IssueSummary;
use bizdash_core::types::{IssueStatus, Priority};
use anyhow::Context as _;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum IssuesSubcommand {
    /// List issues, open first and by priority
    List {
        /// Only issues with this status (open, solved)
        #[arg(long)]
        status: Option<String>,
        /// Print the summary instead of the list
        #[arg(long)]
        summary: bool,
    },
    /// Add an open issue
    Add {
        title: String,
        /// high, medium, or low
        #[arg(long, default_value = "medium")]
        priority: String,
        #[arg(long, default_value = "")]
        owner: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Mark an issue solved
    Solve { id: String },
}

pub fn run(ctx: &Context, subcmd: IssuesSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        IssuesSubcommand::List { status, summary } => list(ctx, status.as_deref(), summary, json),
        IssuesSubcommand::Add {
            title,
            priority,
            owner,
            description,
        } => add(ctx, title, &priority, owner, description, json),
        IssuesSubcommand::Solve { id } => solve(ctx, &id, json),
    }
}

fn list(ctx: &Context, status: Option<&str>, summary: bool, json: bool) -> anyhow::Result<()> {
    let status: Option<IssueStatus> = status.map(str::parse).transpose()?;
    let issues = ctx.repo()?.prioritized_issues(status)?;

    if summary {
        let s = IssueSummary::of(&issues);
        if json {
            return print_json(&s);
        }
        println!("open: {}  solved: {}", s.open, s.solved);
        for (priority, count) in &s.open_by_priority {
            println!("  {priority}: {count}");
        }
        return Ok(());
    }

    if json {
        return print_json(&issues);
    }
    if issues.is_empty() {
        println!("No issues.");
        return Ok(());
    }
    let rows = issues
        .iter()
        .map(|i| {
            vec![
                i.id.clone().unwrap_or_default(),
                i.priority.to_string(),
                i.status.to_string(),
                or_dash(&i.owner),
                truncate(&i.title, 60),
            ]
        })
        .collect();
    print_table(&["ID", "PRIORITY", "STATUS", "OWNER", "TITLE"], rows);
    Ok(())
}

fn add(
    ctx: &Context,
    title: String,
    priority: &str,
    owner: String,
    description: String,
    json: bool,
) -> anyhow::Result<()> {
    let priority: Priority = priority.parse()?;
    let mut issue = Issue::new(title, priority);
    issue.owner = owner;
    issue.description = description;
    let saved = ctx.repo()?.save(issue)?;

    if json {
        return print_json(&saved);
    }
    println!(
        "Added issue {} [{}]: {}",
        saved.id.as_deref().unwrap_or("?"),
        saved.priority,
        saved.title
    );
    Ok(())
}

fn solve(ctx: &Context, id: &str, json: bool) -> anyhow::Result<()> {
    let repo = ctx.repo()?;
    let mut issue: Issue = repo.get(id)?;
    issue
        .solve()
        .with_context(|| format!("cannot solve issue '{id}'"))?;
    let saved = repo.save(issue)?;

    if json {
        return print_json(&saved);
    }
    println!("Solved: {}", saved.title);
    Ok(())
}
