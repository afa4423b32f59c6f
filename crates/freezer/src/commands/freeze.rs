use crate::ServerArgs;
use crate::context;
use colored::Colorize;
use freezer_config::Settings;

pub async fn handle(settings: &Settings, server: &ServerArgs) -> anyhow::Result<()> {
    println!(
        "{}",
        format!("Freezing server '{}'...", server.server_name).yellow()
    );

    let freezer = context::build_freezer(settings, server)?;
    let dump_id = freezer.freeze(&server.server_name).await?;

    let path = freezer.store().dump_path(&server.server_name, &dump_id);
    println!();
    println!(
        "{}",
        format!("✓ '{}' frozen", server.server_name).green().bold()
    );
    println!("  dump id: {}", dump_id.cyan());
    println!("  path:    {}", path.display());

    Ok(())
}
