use anyhow::Result;

use crate::error::Error;
use crate::render::buffer::{VertexAttribute, VertexBuffer, VertexBufferSegmentDescriptor};

/// Packs every attribute stream of a primitive into one vertex buffer.
pub struct VertexBufferAllocator {
    label: String,
    segments: Vec<VertexBufferSegmentAllocationDescriptor>,
}

impl VertexBufferAllocator {
    pub fn new(label: String) -> Self {
        Self {
            label,
            segments: vec![],
        }
    }

    pub fn add_segment(&mut self, attribute: VertexAttribute, data: Vec<u8>) {
        self.segments
            .push(VertexBufferSegmentAllocationDescriptor { attribute, data });
    }

    pub fn size(&self) -> u64 {
        self.segments
            .iter()
            .map(|segment| segment.data.len() as u64)
            .sum()
    }

    pub fn finish(self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<VertexBuffer> {
        let size = self.size();
        if size == 0 {
            return Err(Error::new(format!("Vertex buffer {} has no data", self.label)).into());
        }

        let gpu_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&self.label),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Attribute streams are tightly packed f32 data, so every offset stays 4 byte aligned.
        let mut offset: usize = 0;
        let mut segment_descriptors = Vec::<VertexBufferSegmentDescriptor>::new();
        for segment in self.segments.iter() {
            queue.write_buffer(&gpu_buffer, offset as u64, &segment.data);

            segment_descriptors.push(VertexBufferSegmentDescriptor {
                attribute: segment.attribute,
                offset,
                length: segment.data.len(),
            });

            offset += segment.data.len();
        }

        Ok(VertexBuffer {
            gpu_buffer,
            segments: segment_descriptors,
        })
    }
}

struct VertexBufferSegmentAllocationDescriptor {
    attribute: VertexAttribute,
    data: Vec<u8>,
}
