// Compute device selection with explicit CPU fallback

use std::fmt;
use std::str::FromStr;
use clap::ValueEnum;
use log::{info, warn};
use serde::Serialize;

use super::hardware_detector::{GpuType, HardwareProfile};
use crate::errors::ConfigError;

/// Device requested for inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Cpu,
    /// NVIDIA CUDA (or Vulkan) accelerator
    Gpu,
    /// Apple Silicon Metal
    Mps,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Gpu => write!(f, "gpu"),
            Device::Mps => write!(f, "mps"),
        }
    }
}

impl FromStr for Device {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(Device::Cpu),
            "gpu" | "cuda" => Ok(Device::Gpu),
            "mps" => Ok(Device::Mps),
            other => Err(ConfigError::UnknownDevice(other.to_string())),
        }
    }
}

/// Outcome of resolving the requested device against the machine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSelection {
    pub requested: Device,
    pub resolved: Device,
    /// Set when the requested accelerator was unavailable and the CPU is used instead
    pub fallback_reason: Option<String>,
}

impl DeviceSelection {
    pub fn uses_gpu(&self) -> bool {
        self.resolved != Device::Cpu
    }
}

/// Whether this build of whisper-rs can drive a CUDA/Vulkan accelerator
fn gpu_backend_compiled() -> bool {
    cfg!(any(feature = "cuda", feature = "vulkan", feature = "hipblas"))
}

/// Whether this build of whisper-rs can drive Metal
fn metal_backend_compiled() -> bool {
    cfg!(any(target_os = "macos", feature = "metal"))
}

/// Resolve the requested device. Unavailability is never fatal; it falls back to the CPU.
pub fn resolve_device(requested: Device, profile: &HardwareProfile) -> DeviceSelection {
    let unavailable = match requested {
        Device::Cpu => None,
        Device::Gpu => match profile.gpu_type {
            GpuType::Cuda | GpuType::Vulkan if gpu_backend_compiled() => None,
            GpuType::Cuda | GpuType::Vulkan => Some(
                "GPU detected but this build has no CUDA/Vulkan support (rebuild with --features cuda or vulkan)".to_string(),
            ),
            _ => Some("no CUDA or Vulkan capable GPU detected".to_string()),
        },
        Device::Mps => match profile.gpu_type {
            GpuType::Metal if metal_backend_compiled() => None,
            _ => Some("Apple Silicon Metal is not available on this machine".to_string()),
        },
    };

    match unavailable {
        None => {
            info!("Using compute device: {}", requested);
            DeviceSelection {
                requested,
                resolved: requested,
                fallback_reason: None,
            }
        }
        Some(reason) => {
            warn!("Requested device '{}' unavailable ({}); falling back to cpu", requested, reason);
            DeviceSelection {
                requested,
                resolved: Device::Cpu,
                fallback_reason: Some(reason),
            }
        }
    }
}
