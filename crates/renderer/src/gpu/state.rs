use std::time::{Duration, Instant};

use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use scene::Frame;
use tracing::debug;
use winit::dpi::PhysicalSize;

use crate::types::AdapterProfile;

use super::context::GpuContext;
use super::pipeline::{BlitPipeline, FrameTexture};

pub(crate) struct GpuState {
    context: GpuContext,
    blit: BlitPipeline,
    frame_texture: Option<FrameTexture>,
    frame_count: u64,
    frames_since_last_update: u32,
    last_fps_update: Instant,
}

impl GpuState {
    pub(crate) fn new<T>(target: &T, size: PhysicalSize<u32>) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, size)?;
        let blit = BlitPipeline::new(&context.device, context.surface_format);
        Ok(Self {
            context,
            blit,
            frame_texture: None,
            frame_count: 0,
            frames_since_last_update: 0,
            last_fps_update: Instant::now(),
        })
    }

    pub(crate) fn adapter_profile(&self) -> &AdapterProfile {
        &self.context.adapter_profile
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
    }

    /// Re-applies the current surface configuration after a lost or outdated
    /// swapchain.
    pub(crate) fn reconfigure(&mut self) {
        self.context.reconfigure();
    }

    /// Acquires the next swapchain image.
    pub(crate) fn acquire_surface(&mut self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.context.surface.get_current_texture()
    }

    /// Uploads `frame` and presents it into `output`, stretched over the
    /// whole surface.
    pub(crate) fn present_frame(&mut self, output: wgpu::SurfaceTexture, frame: &Frame) {
        let needs_texture = self
            .frame_texture
            .as_ref()
            .is_none_or(|texture| !texture.matches(frame));
        if needs_texture {
            debug!(
                width = frame.width(),
                height = frame.height(),
                "allocating frame texture"
            );
            self.frame_texture = Some(FrameTexture::new(
                &self.context.device,
                &self.blit,
                frame.width(),
                frame.height(),
            ));
        }
        let Some(texture) = self.frame_texture.as_ref() else {
            return;
        };
        texture.upload(&self.context.queue, frame);

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("blit pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.blit.pipeline);
            render_pass.set_bind_group(0, &texture.bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }
        self.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.record_frame();
    }

    fn record_frame(&mut self) {
        self.frame_count += 1;
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last_fps_update);
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames_since_last_update as f32 / elapsed.as_secs_f32();
            debug!(
                fps = fps.round(),
                frame_count = self.frame_count,
                "render stats"
            );
            self.frames_since_last_update = 0;
            self.last_fps_update = now;
        }
    }
}
