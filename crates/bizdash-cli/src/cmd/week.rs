use crate::output::print_json;
use bizdash_core::week::{Quarter, Week};

pub fn run(week: Option<&str>, json: bool) -> anyhow::Result<()> {
    let week = match week {
        Some(w) => Week::parse(w)?,
        None => Week::current(),
    };
    let quarter = Quarter::containing(week.start());

    if json {
        return print_json(&serde_json::json!({
            "start": week.start(),
            "end": week.end(),
            "iso": week.iso(),
            "label": week.label(),
            "quarter": quarter,
            "prev": week.prev(),
            "next": week.next(),
        }));
    }

    println!("{} ({})", week.label(), week.iso());
    println!("  {} .. {}", week.start(), week.end());
    println!("  quarter: {quarter}");
    println!("  prev: {}  next: {}", week.prev(), week.next());
    Ok(())
}
