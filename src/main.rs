use actix_web::{
    middleware::{self, Condition},
    web, App, HttpServer,
};
use clap::Parser;
use database::database::{database::Database, options::DatabaseOptions};
use roster::{
    clients::server::{configure, AppState},
    token::codec::SecretKey,
};

/// 📇 Roster, lists people, adds them through a validated form and deletes them through signed links
#[derive(Parser, Debug)]
struct Cli {
    /// Location of the SQLite file, created on first start. Note: Does not support shell paths, e.g. ~
    #[clap(short, long, default_value = "database.db")]
    data: std::path::PathBuf,

    /// Port the http server will run on
    #[clap(short, long, default_value = "5000")]
    port: u16,

    /// Address the http server will run on
    #[clap(short, long, default_value = "127.0.0.1")]
    address: String,

    /// Logs every http request
    #[clap(long)]
    log_http: bool,

    #[clap(long, default_value_t = 2)]
    http_workers: usize,

    /// Signs delete links and form tokens, keep it stable so issued links stay valid across restarts
    #[clap(long, env = "ROSTER_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// Skips the CSRF check on the add form
    #[clap(long)]
    disable_csrf: bool,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Cli::parse();

    let secret_key = match args.secret_key {
        Some(secret_key) => SecretKey::from(secret_key),
        None => {
            log::warn!(
                "No secret key configured (--secret-key / ROSTER_SECRET_KEY), using a random one. Delete links and forms will not survive a restart"
            );

            SecretKey::random()
        }
    };

    let database_options = DatabaseOptions::default().set_data_file(args.data);

    let request_manager = Database::new(database_options)?.run();

    let state = web::Data::new(AppState::new(
        request_manager.clone(),
        &secret_key,
        !args.disable_csrf,
    )?);

    log::info!(
        "starting HTTP server on http://{}:{}",
        args.address,
        args.port
    );

    let log_http = args.log_http;

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(configure)
            .wrap(Condition::new(log_http, middleware::Logger::default()))
    })
    .workers(args.http_workers)
    .bind((args.address, args.port))?
    .run()
    .await?;

    let shutdown_response = request_manager.send_shutdown_request()?;

    log::info!("Shutting down server: {}", shutdown_response);

    Ok(())
}
