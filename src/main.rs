use std::{process, sync::Arc};

use hotelier::{
    application::{error::AppError, floors::FloorService, repos::FloorsRepo},
    cache::{CacheAside, CacheConfig, MemoryStore},
    config,
    domain::floors::FloorRecord,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        memory::InMemoryFloors,
        telemetry,
    },
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli().map_err(|err| {
        AppError::from(InfraError::configuration(format!(
            "failed to load configuration: {err}"
        )))
    })?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let db = init_repositories(&settings).await?;
    let repo: Arc<dyn FloorsRepo> = match db.clone() {
        Some(db) => db,
        None => {
            warn!(
                target = "hotelier::serve",
                "database url is not configured; serving floors from memory"
            );
            Arc::new(InMemoryFloors::new())
        }
    };

    let (floors, sweepers) = build_floor_service(repo, &settings.cache);
    let state = ApiState {
        floors: Arc::new(floors),
        db,
    };

    let result = serve_http(&settings, state).await;

    for handle in sweepers {
        handle.abort();
        let _ = handle.await;
    }

    result
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let database_url = settings.database.url.as_deref().ok_or_else(|| {
        AppError::validation(
            "database url is required (provide --database-url or set HOTELIER__DATABASE__URL)",
        )
    })?;

    let pool = PostgresRepositories::connect(database_url, 1)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    info!(target = "hotelier::migrate", "migrations applied");
    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Option<Arc<PostgresRepositories>>, AppError> {
    let Some(database_url) = settings.database.url.as_ref() else {
        return Ok(None);
    };

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Some(Arc::new(PostgresRepositories::new(pool))))
}

fn build_floor_service(
    repo: Arc<dyn FloorsRepo>,
    cache: &CacheConfig,
) -> (FloorService, Vec<JoinHandle<()>>) {
    if !cache.enabled {
        info!(target = "hotelier::serve", "cache disabled; reads go to the repository");
        return (FloorService::uncached(repo), Vec::new());
    }

    let policy = cache.ttl_policy();
    let records = CacheAside::<FloorRecord>::new(Arc::new(MemoryStore::<FloorRecord>::new(cache)))
        .with_policy(policy);
    let pages =
        CacheAside::<Vec<FloorRecord>>::new(Arc::new(MemoryStore::<Vec<FloorRecord>>::new(cache)))
            .with_policy(policy);
    let sweepers: Vec<JoinHandle<()>> = [
        records.spawn_sweeper(cache.sweep_interval()),
        pages.spawn_sweeper(cache.sweep_interval()),
    ]
    .into_iter()
    .flatten()
    .collect();

    let service = FloorService::new(repo, records, pages);
    (service, sweepers)
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "hotelier::serve",
        addr = %settings.server.addr,
        "listening"
    );

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.wait_for(|stop| *stop).await;
            })
            .await
    });

    tokio::select! {
        finished = &mut server => return server_outcome(finished),
        signal = tokio::signal::ctrl_c() => {
            if let Err(err) = signal {
                warn!(target = "hotelier::serve", error = %err, "failed to listen for shutdown signal");
            }
        }
    }

    info!(target = "hotelier::serve", "shutting down");
    let _ = shutdown_tx.send(true);

    match tokio::time::timeout(settings.server.graceful_shutdown, server).await {
        Ok(finished) => server_outcome(finished),
        Err(_) => {
            warn!(
                target = "hotelier::serve",
                "graceful shutdown timed out; dropping open connections"
            );
            Ok(())
        }
    }
}

fn server_outcome(
    finished: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match finished {
        Ok(result) => result.map_err(|err| AppError::from(InfraError::server(err.to_string()))),
        Err(join) => Err(AppError::unexpected(format!("server task failed: {join}"))),
    }
}
