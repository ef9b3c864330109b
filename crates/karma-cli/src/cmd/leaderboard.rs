use crate::cmd::open_manager;
use crate::output::{print_json, print_table, Align};
use std::path::Path;

pub fn run(manifest: &Path, limit: Option<usize>, json: bool) -> anyhow::Result<()> {
    let manager = open_manager(manifest)?;
    let mut profiles = manager.list_profiles();
    if let Some(n) = limit {
        profiles.truncate(n);
    }

    if json {
        print_json(&profiles)?;
        return Ok(());
    }

    if profiles.is_empty() {
        println!("No karma awarded yet.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = profiles
        .iter()
        .enumerate()
        .map(|(i, p)| {
            vec![
                format!("{}", i + 1),
                p.username.clone(),
                p.karma.to_string(),
                p.role.clone(),
            ]
        })
        .collect();
    print_table(
        &[
            ("RANK", Align::Right),
            ("USER", Align::Left),
            ("KARMA", Align::Right),
            ("ROLE", Align::Left),
        ],
        &rows,
    );
    Ok(())
}
