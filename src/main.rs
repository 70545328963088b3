use std::process::ExitCode;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    order_analytics::logging::init();

    match order_analytics::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
