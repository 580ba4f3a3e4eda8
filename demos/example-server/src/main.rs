use wiremount::prelude::*;

mod controller;

use controller::notes::NotesPlugin;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "example_server=debug,wiremount=debug".into()),
        )
        .init();

    tracing::info!("Starting Example Server...");

    if let Err(e) = run().await {
        tracing::error!("Server failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> wiremount::Result<()> {
    let config = ConfigService::new();

    let container = ContainerBuilder::new()
        .provide::<controller::notes::NoteStore>()
        .build();

    let server = App::new()
        .server_config(ServerConfig::from_config(&config)?)
        .plugin(InjectPlugin::new(container))
        .plugin(RouterPlugin::new())
        .plugin(ControllerPlugin::new(ControllerConfig::from_config(&config)))
        .plugin(NotesPlugin)
        .build()
        .await?;

    server.listen().await
}
