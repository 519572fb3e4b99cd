use std::sync::OnceLock;
use log::info;
use serde::Serialize;
use sysinfo::System;

/// Hardware capabilities used for device fallback and decoding parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HardwareProfile {
    pub cpu_cores: u8,
    pub gpu_type: GpuType,
    pub memory_gb: u8,
    pub performance_tier: PerformanceTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GpuType {
    None,
    Metal,      // Apple Silicon
    Cuda,       // NVIDIA
    Vulkan,     // AMD/Intel
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceTier {
    Low,      // CPU-only, limited resources
    Medium,   // CPU-only but powerful, or basic GPU
    High,     // Dedicated GPU with good compute
    Ultra,    // High-end hardware with fast GPU
}

/// Whisper decoding parameters derived from the hardware profile
#[derive(Debug, Clone, PartialEq)]
pub struct DecodingConfig {
    pub beam_size: usize,
    pub temperature: f32,
    pub threads: usize,
}

static HARDWARE_PROFILE: OnceLock<HardwareProfile> = OnceLock::new();

impl HardwareProfile {
    /// Get the detected hardware profile (cached after first call)
    pub fn detect() -> &'static HardwareProfile {
        HARDWARE_PROFILE.get_or_init(|| {
            let profile = Self::detect_hardware();
            info!("Detected hardware profile: {:?}", profile);
            profile
        })
    }

    fn detect_hardware() -> HardwareProfile {
        let cpu_cores = Self::detect_cpu_cores();
        let gpu_type = Self::detect_gpu();
        let memory_gb = Self::detect_memory_gb();
        let performance_tier = Self::calculate_performance_tier(cpu_cores, gpu_type, memory_gb);

        HardwareProfile {
            cpu_cores,
            gpu_type,
            memory_gb,
            performance_tier,
        }
    }

    fn detect_cpu_cores() -> u8 {
        std::thread::available_parallelism()
            .map(|n| n.get().min(255) as u8)
            .unwrap_or(4)
    }

    fn detect_gpu() -> GpuType {
        if Self::has_metal_support() {
            return GpuType::Metal;
        }
        if Self::has_cuda_support() {
            return GpuType::Cuda;
        }
        if Self::has_vulkan_support() {
            return GpuType::Vulkan;
        }
        GpuType::None
    }

    fn detect_memory_gb() -> u8 {
        let sys = System::new_all();
        let total_memory_bytes = sys.total_memory();
        let memory_gb = (total_memory_bytes / 1_073_741_824).min(255) as u8;
        info!("Detected system memory: {} GB ({} bytes)", memory_gb, total_memory_bytes);
        memory_gb.max(1)
    }

    /// Calculate performance tier based on hardware
    pub fn calculate_performance_tier(cpu_cores: u8, gpu_type: GpuType, memory_gb: u8) -> PerformanceTier {
        match gpu_type {
            GpuType::Metal | GpuType::Cuda => {
                if memory_gb >= 16 && cpu_cores >= 8 {
                    PerformanceTier::Ultra
                } else {
                    PerformanceTier::High
                }
            }
            GpuType::Vulkan => {
                if memory_gb >= 12 && cpu_cores >= 6 {
                    PerformanceTier::High
                } else {
                    PerformanceTier::Medium
                }
            }
            GpuType::None => {
                if cpu_cores >= 8 && memory_gb >= 16 {
                    PerformanceTier::Medium
                } else {
                    PerformanceTier::Low
                }
            }
        }
    }

    fn has_metal_support() -> bool {
        // Metal is available on Intel Macs too, but only Apple Silicon is worth it for inference
        cfg!(target_os = "macos") && std::env::consts::ARCH == "aarch64"
    }

    fn has_cuda_support() -> bool {
        if std::env::var("CUDA_PATH").is_ok() || std::env::var("CUDA_HOME").is_ok() {
            return true;
        }

        if std::path::Path::new("/usr/local/cuda").exists() {
            return true;
        }

        #[cfg(target_os = "windows")]
        {
            if std::path::Path::new("C:\\Program Files\\NVIDIA GPU Computing Toolkit").exists()
                || std::path::Path::new("C:\\Windows\\System32\\nvcuda.dll").exists()
            {
                return true;
            }
        }

        false
    }

    fn has_vulkan_support() -> bool {
        if std::env::var("VULKAN_SDK").is_ok() {
            return true;
        }

        if std::path::Path::new("/usr/lib/x86_64-linux-gnu/libvulkan.so").exists()
            || std::path::Path::new("/usr/lib/libvulkan.so").exists()
        {
            return true;
        }

        #[cfg(target_os = "windows")]
        {
            if std::path::Path::new("C:\\Windows\\System32\\vulkan-1.dll").exists() {
                return true;
            }
        }

        false
    }

    /// Decoding parameters for a whole-file Whisper pass.
    /// Beam size grows with the tier; greedy decoding on weak CPU-only machines.
    pub fn decoding_config(&self, on_gpu: bool) -> DecodingConfig {
        let tier = if on_gpu {
            self.performance_tier
        } else {
            // The accelerator is not in use, so rate the machine as CPU-only
            Self::calculate_performance_tier(self.cpu_cores, GpuType::None, self.memory_gb)
        };

        match tier {
            PerformanceTier::Ultra => DecodingConfig {
                beam_size: 8,
                temperature: 0.0,
                threads: self.cpu_cores.min(8) as usize,
            },
            PerformanceTier::High => DecodingConfig {
                beam_size: 5,
                temperature: 0.0,
                threads: self.cpu_cores.min(6) as usize,
            },
            PerformanceTier::Medium => DecodingConfig {
                beam_size: 3,
                temperature: 0.0,
                threads: self.cpu_cores.min(8) as usize,
            },
            PerformanceTier::Low => DecodingConfig {
                beam_size: 1,
                temperature: 0.0,
                threads: self.cpu_cores.clamp(1, 4) as usize,
            },
        }
    }
}
