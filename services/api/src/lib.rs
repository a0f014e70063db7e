mod cli;
mod infra;
mod routes;
mod server;

use mvp_planner::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
