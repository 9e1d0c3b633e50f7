use std::error::Error;
use std::process;

use bodyviz_core::pipeline::infrastructure::render_use_case_factory::build_render_use_case;
use bodyviz_core::pipeline::pipeline_config::PipelineConfig;

/// Initializes logging, renders, and exits with status 1 on failure.
pub fn render_or_exit(config: PipelineConfig) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let input = config.input.clone();
    let mut use_case = build_render_use_case(config, Some(Box::new(download_progress)));
    if let Err(e) = use_case.execute() {
        log::error!("Rendering {} failed", input.display());
        eprintln!("Error: {}", error_chain(&e));
        process::exit(1);
    }
}

/// `outer: cause: root cause`
pub fn error_chain(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading model files... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading model files... {downloaded} bytes");
    }
}
