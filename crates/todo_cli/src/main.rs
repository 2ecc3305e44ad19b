//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `todo_core` linkage without the mobile shell.
//! - Optionally summarize the item collection stored in a database file.
//!
//! Usage: `todo_cli [DB_PATH]`

use std::process::ExitCode;
use todo_core::db::open_db;
use todo_core::{FilterType, ItemCounts, ItemStore, SqliteSlotRepository};

fn main() -> ExitCode {
    println!("todo_core ping={}", todo_core::ping());
    println!("todo_core version={}", todo_core::core_version());
    println!("todo_core format_version={}", todo_core::CURRENT_FORMAT_VERSION);

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match summarize(&db_path) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("todo_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn summarize(db_path: &str) -> Result<Vec<String>, String> {
    let conn = open_db(db_path).map_err(|err| err.to_string())?;
    let repo = SqliteSlotRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let items = ItemStore::new(repo).load().map_err(|err| err.to_string())?;
    let counts = ItemCounts::of(&items);

    let mut lines = FilterType::ALL
        .iter()
        .map(|filter| todo_core::filter_label(*filter, &counts))
        .collect::<Vec<_>>();
    lines.extend(items.iter().map(|item| {
        format!(
            "[{}] {} {}",
            if item.completed { "x" } else { " " },
            item.id,
            item.title
        )
    }));
    Ok(lines)
}
