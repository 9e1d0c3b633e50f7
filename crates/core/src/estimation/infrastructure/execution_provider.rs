/// Execution providers to register on every estimator session, best first.
///
/// ort falls back to the CPU provider when none of these can be initialized,
/// so an empty list simply means "CPU only".
pub fn preferred_execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        log::debug!("No accelerated execution provider for this platform, using CPU");
        vec![]
    }
}
