mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use growth_velocity::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
