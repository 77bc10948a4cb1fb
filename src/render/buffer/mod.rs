pub mod allocator;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum VertexAttribute {
    Position,
    Normal,
    TexCoord0,
}

impl VertexAttribute {
    pub fn format(&self) -> wgpu::VertexFormat {
        match self {
            VertexAttribute::Position | VertexAttribute::Normal => wgpu::VertexFormat::Float32x3,
            VertexAttribute::TexCoord0 => wgpu::VertexFormat::Float32x2,
        }
    }

    pub fn size(&self) -> u64 {
        self.format().size()
    }
}

pub struct VertexBuffer {
    pub gpu_buffer: wgpu::Buffer,
    pub segments: Vec<VertexBufferSegmentDescriptor>,
}

impl VertexBuffer {
    pub fn segment(&self, attribute: VertexAttribute) -> Option<&VertexBufferSegmentDescriptor> {
        self.segments
            .iter()
            .find(|segment| segment.attribute == attribute)
    }

    pub fn slice(&self, attribute: VertexAttribute) -> Option<wgpu::BufferSlice> {
        self.segment(attribute).map(|segment| {
            self.gpu_buffer.slice(
                segment.offset as wgpu::BufferAddress
                    ..(segment.offset + segment.length) as wgpu::BufferAddress,
            )
        })
    }
}

pub struct VertexBufferSegmentDescriptor {
    pub attribute: VertexAttribute,
    pub offset: usize,
    pub length: usize,
}

pub struct IndexBuffer {
    pub gpu_buffer: wgpu::Buffer,
    pub type_: wgpu::IndexFormat,
    pub count: u32,
}

impl IndexBuffer {
    pub fn from_indices(
        label: &str,
        indices: &[u32],
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Self {
        let data: &[u8] = bytemuck::cast_slice(indices);

        let gpu_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: data.len() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&gpu_buffer, 0, data);

        Self {
            gpu_buffer,
            type_: wgpu::IndexFormat::Uint32,
            count: indices.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_sizes_match_vertex_formats() {
        assert_eq!(VertexAttribute::Position.size(), 12);
        assert_eq!(VertexAttribute::Normal.size(), 12);
        assert_eq!(VertexAttribute::TexCoord0.size(), 8);
    }
}
