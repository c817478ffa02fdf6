// src/model/device.rs
use candle_core::{DType, Device, utils};

/// Device and precision the model runs with.
#[derive(Debug, Clone)]
pub struct ComputeTarget {
    pub device: Device,
    pub dtype: DType,
}

impl ComputeTarget {
    pub fn cpu() -> Self {
        Self {
            device: Device::Cpu,
            dtype: DType::F32,
        }
    }

    pub fn device_name(&self) -> &'static str {
        if self.device.is_cuda() {
            "cuda:0"
        } else if self.device.is_metal() {
            "metal:0"
        } else {
            "cpu"
        }
    }

    pub fn dtype_name(&self) -> &'static str {
        dtype_name(self.dtype)
    }
}

pub fn dtype_name(dtype: DType) -> &'static str {
    match dtype {
        DType::BF16 => "bfloat16",
        DType::F16 => "float16",
        DType::F32 => "float32",
        other => other.as_str(),
    }
}

/// CUDA with bfloat16, else Metal with float16, else CPU with float32.
pub fn select_device() -> ComputeTarget {
    if utils::cuda_is_available() {
        match Device::new_cuda(0) {
            Ok(device) => {
                return ComputeTarget {
                    device,
                    dtype: DType::BF16,
                };
            }
            Err(e) => log::warn!("CUDA reported available but failed to open: {}", e),
        }
    }

    if utils::metal_is_available() {
        match Device::new_metal(0) {
            Ok(device) => {
                return ComputeTarget {
                    device,
                    dtype: DType::F16,
                };
            }
            Err(e) => log::warn!("Metal reported available but failed to open: {}", e),
        }
    }

    ComputeTarget::cpu()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_is_stable() {
        let first = select_device();
        let second = select_device();
        assert_eq!(first.device_name(), second.device_name());
        assert_eq!(first.dtype, second.dtype);
    }

    #[cfg(not(any(feature = "cuda", feature = "metal")))]
    #[test]
    fn cpu_build_uses_full_precision() {
        let target = select_device();
        assert_eq!(target.device_name(), "cpu");
        assert_eq!(target.dtype_name(), "float32");
    }
}
