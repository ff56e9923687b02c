mod cli;

use actix_web::{web, App, HttpServer};
use movierec::{server::AppState, AppConfig, Error};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("movierec=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[actix_web::main]
async fn main() -> Result<(), std::io::Error> {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if args.len() >= 2 && args[1] == "serve" {
        let catalog = match args.get(2).map(PathBuf::from).or_else(|| config.catalog_path.clone()) {
            Some(path) => path,
            None => {
                eprintln!("Error: {}", Error::MissingCatalog);
                std::process::exit(1);
            }
        };

        let index = match cli::build_index(&catalog, &config) {
            Ok(index) => index,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        };

        let state = web::Data::new(
            AppState::new(index)
                .with_catalog(catalog, config.index_config())
                .with_top_k(config.top_k),
        );

        let address = config.bind_address();
        tracing::info!(%address, "starting server");
        HttpServer::new(move || App::new().app_data(state.clone()).configure(movierec::server::config))
            .bind(address)?
            .run()
            .await?;
    } else if args.len() <= 2 {
        let catalog = match args.get(1).map(PathBuf::from).or_else(|| config.catalog_path.clone()) {
            Some(path) => path,
            None => {
                eprintln!("Error: {}", Error::MissingCatalog);
                eprintln!("Usage: movierec [<catalog_path> [<command> [args...]]] | serve [<catalog_path>]");
                std::process::exit(1);
            }
        };
        cli::run_repl(catalog, &config);
    } else {
        cli::run_single_command(&args, &config);
    }

    Ok(())
}
