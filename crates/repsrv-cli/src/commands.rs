use colored::Colorize;
use repsrv_server::ReportServer;

use crate::cli::{Cli, Command, ServerArgs};

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Config(args) => cmd_config(args),
    }
}

async fn cmd_serve(args: ServerArgs) -> anyhow::Result<()> {
    let config = args.resolve()?;
    let server = ReportServer::new(config)?;
    println!(
        "{} report server on {} (actor: {})",
        "✓".green().bold(),
        server.config().bind_addr.to_string().bold(),
        server.state().store.well_known().actor().as_str().cyan()
    );
    server.serve().await?;
    Ok(())
}

fn cmd_config(args: ServerArgs) -> anyhow::Result<()> {
    let config = args.resolve()?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
