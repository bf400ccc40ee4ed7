use std::{env, fs, process};

use chrono::Utc;
use quizmark::{
    config::Config,
    errors::{AppError, AppResult},
    grading::{grade_request, GradeRequest, GradingPolicy},
    models::dto::response::SubmissionResultDto,
};

fn run() -> AppResult<()> {
    let config = Config::from_env();
    config.validate()?;

    let path = env::args().nth(1).ok_or_else(|| {
        AppError::ValidationError("usage: quizmark <submission.json>".to_string())
    })?;
    log::info!("Grading submission document {}", path);

    let request = GradeRequest::from_json(&fs::read_to_string(&path)?)?;
    let submission = grade_request(request, &GradingPolicy::from(&config), Utc::now())?;

    let output = serde_json::to_string_pretty(&SubmissionResultDto::from(&submission))
        .map_err(|e| AppError::InternalError(format!("Failed to serialize result: {}", e)))?;
    println!("{}", output);
    Ok(())
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    if let Err(err) = run() {
        log::error!("{}", err);
        eprintln!("{}: {}", err.error_code(), err);
        process::exit(1);
    }
}
