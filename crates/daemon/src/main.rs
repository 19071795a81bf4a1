// CLI modules
mod cli;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Bucket, Daemon, Health, Init, Mgr, Version};

command_enum! {
    (Bucket, Bucket),
    (Daemon, Daemon),
    (Health, Health),
    (Init, Init),
    (Mgr, Mgr),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Resolve remote and credentials: explicit flag > config > defaults
    let ctx = cli::op::resolve_remote(args.remote, args.config_path.clone())
        .map_err(cli::op::OpContextError::from)
        .and_then(|remote| {
            let credentials =
                cli::op::resolve_credentials(args.basic_auth, args.config_path.clone())?;
            cli::op::OpContext::new(remote, credentials, args.config_path)
        });
    let ctx = match ctx {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
