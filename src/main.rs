mod api;
mod app;
mod commands;
mod config;
mod logging;
mod playback;
mod recording;
mod ui;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    app::run().await
}
