use crate::ServerArgs;
use crate::context;
use colored::Colorize;
use freezer_config::Settings;

pub async fn handle(
    settings: &Settings,
    server: &ServerArgs,
    dump_id: Option<&str>,
) -> anyhow::Result<()> {
    match dump_id {
        Some(id) => println!(
            "{}",
            format!("Unfreezing server '{}' from dump {}...", server.server_name, id).yellow()
        ),
        None => println!(
            "{}",
            format!("Unfreezing server '{}' from the latest dump...", server.server_name).yellow()
        ),
    }

    let freezer = context::build_freezer(settings, server)?;
    freezer.unfreeze(&server.server_name, dump_id).await?;

    println!();
    println!(
        "{}",
        format!("✓ '{}' restored", server.server_name).green().bold()
    );

    Ok(())
}
