//! The `nomodia status` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::{open_engine, print_current, GlobalArgs};

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let (_, engine) = open_engine(global)?;
    let session = engine.session();
    let progress = engine.progress();

    let mut table = Table::new();
    table.set_header(vec!["Session", "Status", "Answered", "Remaining", "Updated"]);
    table.add_row(vec![
        Cell::new(session.session_id),
        Cell::new(engine.status()),
        Cell::new(format!("{}/{}", progress.answered, progress.total)),
        Cell::new(progress.remaining),
        Cell::new(session.updated_at.format("%Y-%m-%d %H:%M UTC")),
    ]);
    println!("{table}");

    print_current(&engine);
    Ok(())
}
