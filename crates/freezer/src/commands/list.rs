use colored::Colorize;
use freezer_config::Settings;
use freezer_core::{DumpStore, select_latest};

pub async fn handle(settings: &Settings, project: &str, server_name: &str) -> anyhow::Result<()> {
    let store = DumpStore::new(&settings.output_dir, project);
    let ids = store.list(server_name).await?;

    if ids.is_empty() {
        println!(
            "{}",
            format!(
                "ℹ No dumps for '{}' in {}",
                server_name,
                store.server_path(server_name).display()
            )
            .dimmed()
        );
        return Ok(());
    }

    let latest = select_latest(&ids);
    println!("{}", format!("Dumps of '{}':", server_name).bold());
    for id in &ids {
        if Some(id.as_str()) == latest {
            println!("  {} {}", id.cyan(), "(latest)".green());
        } else {
            println!("  {}", id);
        }
    }

    Ok(())
}
