use crate::assets::{ResolvedTexture, TextureKind};
use image::RgbaImage;

/// GPU copy of the resolver's current image.
///
/// Re-uploads only when the resolved [`TextureKind`] changes; the previous
/// `wgpu::Texture` is dropped at that point.
pub struct GpuTextureSlot {
    kind: TextureKind,
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl GpuTextureSlot {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, resolved: &ResolvedTexture) -> Self {
        let texture = upload(device, queue, resolved.image());
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sphere surface sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        Self {
            kind: resolved.kind(),
            _texture: texture,
            view,
            sampler,
        }
    }

    /// Returns true when the bound view changed and bind groups must be rebuilt.
    pub fn sync(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        resolved: &ResolvedTexture,
    ) -> bool {
        if resolved.kind() == self.kind {
            return false;
        }
        let texture = upload(device, queue, resolved.image());
        self.view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self._texture = texture;
        log::debug!("GPU texture slot {:?} -> {:?}", self.kind, resolved.kind());
        self.kind = resolved.kind();
        true
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}

fn upload(device: &wgpu::Device, queue: &wgpu::Queue, image: &RgbaImage) -> wgpu::Texture {
    let (width, height) = image.dimensions();
    let size = wgpu::Extent3d {
        width: width.max(1),
        height: height.max(1),
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("sphere surface texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        image.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * size.width),
            rows_per_image: Some(size.height),
        },
        size,
    );
    texture
}
