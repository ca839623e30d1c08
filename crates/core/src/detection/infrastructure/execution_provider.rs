use ort::execution_providers::ExecutionProviderDispatch;

/// Execution providers to try for the detector session, in order.
///
/// An empty list means plain CPU. ONNX Runtime falls back to CPU on its own
/// when a listed accelerator fails to register.
pub fn preferred_execution_providers() -> Vec<ExecutionProviderDispatch> {
    let providers = platform_providers();
    if providers.is_empty() {
        log::debug!("Detector running on CPU execution provider");
    }
    providers
}

#[cfg(target_os = "macos")]
fn platform_providers() -> Vec<ExecutionProviderDispatch> {
    log::debug!("Requesting CoreML execution provider");
    vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
}

#[cfg(target_os = "windows")]
fn platform_providers() -> Vec<ExecutionProviderDispatch> {
    log::debug!("Requesting DirectML execution provider");
    vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn platform_providers() -> Vec<ExecutionProviderDispatch> {
    Vec::new()
}
