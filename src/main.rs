#[tokio::main]
async fn main() {
    if let Err(error) = app::run().await {
        eprintln!("comments_admin failed: {error}");
        std::process::exit(1);
    }
}

mod api;
mod app;
mod auth;
mod dto;
mod error;
mod models;
mod query;
mod repositories;
mod services;
mod telemetry;
mod usecases;
