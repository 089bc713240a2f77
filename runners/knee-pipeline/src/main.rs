use knee_pipeline::runner;
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    utils::init_logger();
    match runner::run_full() {
        Ok(result) => {
            if let Err(e) = result.analyze() {
                error!("Report error: {e}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Pipeline failed: {e}");
            ExitCode::FAILURE
        }
    }
}
