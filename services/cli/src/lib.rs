mod cli;
mod render;
mod session;

use corenta::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
