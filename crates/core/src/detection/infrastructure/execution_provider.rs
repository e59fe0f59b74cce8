use std::path::Path;

use ort::execution_providers::ExecutionProviderDispatch;
use ort::session::Session;

/// Platform accelerator for ONNX inference, if one is compiled in.
///
/// ONNX Runtime falls back to CPU when the provider fails to register.
fn preferred_execution_providers() -> Vec<ExecutionProviderDispatch> {
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
        vec![]
    }
}

/// Opens an ONNX model with the platform's preferred execution providers.
pub fn open_session(model_path: &Path) -> Result<Session, Box<dyn std::error::Error>> {
    let providers = preferred_execution_providers();
    log::debug!(
        "Loading ONNX model {} ({} accelerator provider(s))",
        model_path.display(),
        providers.len()
    );
    let session = Session::builder()?
        .with_execution_providers(providers)?
        .commit_from_file(model_path)?;
    Ok(session)
}
