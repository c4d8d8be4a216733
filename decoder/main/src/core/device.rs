//! Compute device selection

use candle_core::Device;

/// Whether a CUDA or Metal accelerator is available on this host.
pub fn accelerator_available() -> bool {
    candle_core::utils::cuda_is_available() || candle_core::utils::metal_is_available()
}

/// Pick the best available device: CUDA, then Metal, then CPU.
pub fn select_device() -> candle_core::Result<Device> {
    if candle_core::utils::cuda_is_available() {
        Device::new_cuda(0)
    } else if candle_core::utils::metal_is_available() {
        Device::new_metal(0)
    } else {
        Ok(Device::Cpu)
    }
}
