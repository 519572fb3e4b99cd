// Whisper Engine - Model Loading
use std::path::Path;
use whisper_rs::{WhisperContext, WhisperContextParameters};
use anyhow::{Result, anyhow};

use crate::models::{DeviceSelection, GpuType, HardwareProfile, PerformanceTier};

/// Suppress verbose whisper.cpp logs
pub fn quiet_native_logging() {
    std::env::set_var("GGML_METAL_LOG_LEVEL", "1");
    std::env::set_var("WHISPER_LOG_LEVEL", "1");
}

/// Log hardware acceleration capabilities compiled into this build
pub fn log_acceleration_capabilities() {
    #[cfg(feature = "metal")]
    log::info!("Apple Metal GPU support: enabled");

    #[cfg(feature = "openblas")]
    log::info!("OpenBLAS CPU optimization: enabled");

    #[cfg(feature = "coreml")]
    log::info!("Apple CoreML support: enabled");

    #[cfg(feature = "cuda")]
    log::info!("NVIDIA CUDA support: enabled");

    #[cfg(feature = "vulkan")]
    log::info!("Vulkan GPU support: enabled");

    #[cfg(feature = "openmp")]
    log::info!("OpenMP parallel processing: enabled");
}

/// Flash attention only pays off on fast Metal/CUDA hardware
fn flash_attention_enabled(selection: &DeviceSelection, profile: &HardwareProfile) -> bool {
    selection.uses_gpu()
        && matches!(
            (profile.gpu_type, profile.performance_tier),
            (GpuType::Metal | GpuType::Cuda, PerformanceTier::Ultra | PerformanceTier::High)
        )
}

/// Load a GGML whisper model for the resolved device
pub fn load_context(
    model_path: &Path,
    model_name: &str,
    selection: &DeviceSelection,
    profile: &HardwareProfile,
) -> Result<WhisperContext> {
    quiet_native_logging();
    log_acceleration_capabilities();

    let flash_attn = flash_attention_enabled(selection, profile);
    let context_param = WhisperContextParameters {
        use_gpu: selection.uses_gpu(),
        gpu_device: 0,
        flash_attn,
        ..Default::default()
    };

    log::info!("Loading model: {} from {}", model_name, model_path.display());

    let ctx = WhisperContext::new_with_params(&model_path.to_string_lossy(), context_param)
        .map_err(|e| anyhow!("Failed to load model {}: {}", model_name, e))?;

    let acceleration_status = match (selection.uses_gpu(), profile.gpu_type, flash_attn) {
        (false, _, _) => "CPU processing only",
        (true, GpuType::Metal, true) => "Metal GPU with Flash Attention",
        (true, GpuType::Metal, false) => "Metal GPU acceleration",
        (true, GpuType::Cuda, true) => "CUDA GPU with Flash Attention",
        (true, GpuType::Cuda, false) => "CUDA GPU acceleration",
        (true, GpuType::Vulkan, _) => "Vulkan GPU acceleration",
        (true, GpuType::None, _) => "CPU processing only",
    };

    log::info!("Successfully loaded model: {} with {} (Performance Tier: {:?})",
              model_name, acceleration_status, profile.performance_tier);

    Ok(ctx)
}
