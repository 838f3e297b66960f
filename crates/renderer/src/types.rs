use std::time::Duration;

use crate::runtime::RenderPolicy;

/// Snapshot of the adapter wgpu picked, kept for logging and pacing decisions.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
    pub max_texture_dimension: u32,
}

impl AdapterProfile {
    pub fn from_wgpu(info: &wgpu::AdapterInfo, limits: &wgpu::Limits) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
            max_texture_dimension: limits.max_texture_dimension_2d,
        }
    }

    /// True for CPU rasterizers such as llvmpipe or WARP.
    pub fn is_software(&self) -> bool {
        matches!(self.device_type, wgpu::DeviceType::Cpu)
            || self.name.to_ascii_lowercase().contains("llvmpipe")
    }
}

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` mirrors the CLI flags: how large the window should be,
/// what to call it, how fast to tick, and when to stop.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    pub title: String,
    /// Frame pacing requested by the caller.
    pub policy: RenderPolicy,
    /// Close the window after this long; `None` runs until closed.
    pub run_for: Option<Duration>,
}

impl Default for RendererConfig {
    /// Provides a 720p uncapped window that runs until closed.
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            title: "vibes".into(),
            policy: RenderPolicy::default(),
            run_for: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, device_type: wgpu::DeviceType) -> AdapterProfile {
        AdapterProfile {
            name: name.into(),
            backend: wgpu::Backend::Vulkan,
            device_type,
            max_texture_dimension: 8192,
        }
    }

    #[test]
    fn detects_software_adapters() {
        assert!(profile("llvmpipe (LLVM 17.0.6, 256 bits)", wgpu::DeviceType::Other).is_software());
        assert!(profile("WARP", wgpu::DeviceType::Cpu).is_software());
        assert!(!profile("AMD Radeon", wgpu::DeviceType::DiscreteGpu).is_software());
    }
}
