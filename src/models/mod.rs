// Model and device lifecycle for a run
//
// - hardware_detector.rs: HardwareProfile (CPU, memory, GPU kind, tier)
// - device.rs: Device enum and CPU fallback policy
// - loader.rs: ModelLoader trait and the whisper/pyannote implementation
// - context.rs: ModelContext, the once-per-run holder of loaded models

pub mod hardware_detector;
pub mod device;
pub mod loader;
pub mod context;

pub use hardware_detector::{DecodingConfig, GpuType, HardwareProfile, PerformanceTier};
pub use device::{resolve_device, Device, DeviceSelection};
pub use loader::{LocalModelLoader, ModelLoader};
pub use context::ModelContext;
