use crate::ServerArgs;
use crate::context;
use colored::Colorize;
use freezer_config::Settings;

pub async fn handle(settings: &Settings, server: &ServerArgs) -> anyhow::Result<()> {
    println!(
        "{}",
        format!("Dumping server '{}'...", server.server_name).yellow()
    );

    let freezer = context::build_freezer(settings, server)?;
    let dump_id = freezer.create_server_dump(&server.server_name).await?;

    println!();
    println!(
        "{}",
        format!("✓ '{}' dumped", server.server_name).green().bold()
    );
    println!("  dump id: {}", dump_id.cyan());

    Ok(())
}
