use ndarray::{Array2, ArrayView3, ArrayViewMut3};

use super::face_box::FaceBox;

/// A single decoded frame: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only; the domain layer
/// treats pixel data as an `height × width × channels` raster.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Position of the frame in its source stream (0 for still images).
    pub fn index(&self) -> usize {
        self.index
    }

    /// True when the frame carries no pixels (a decode that "succeeded" with nothing).
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.channels == 0 || self.data.is_empty()
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// BT.601 luma in 8-bit fixed point, rounded.
    ///
    /// Single-channel frames are returned as-is.
    pub fn to_grayscale(&self) -> Array2<u8> {
        let h = self.height as usize;
        let w = self.width as usize;
        let c = self.channels as usize;
        if c == 1 {
            return Array2::from_shape_vec((h, w), self.data.clone())
                .expect("Frame data length must match dimensions");
        }

        let gray: Vec<u8> = self
            .data
            .chunks_exact(c)
            .map(|px| {
                let (r, g, b) = (px[0] as u32, px[1] as u32, px[2] as u32);
                ((r * 4899 + g * 9617 + b * 1868 + 8192) >> 14) as u8
            })
            .collect();
        Array2::from_shape_vec((h, w), gray).expect("Frame data length must match dimensions")
    }

    /// Copies the pixels under `region` into a new frame.
    ///
    /// The region is clipped to the frame first; no resampling happens.
    pub fn crop(&self, region: &FaceBox) -> Frame {
        let clipped = region.clamp_to(self.width, self.height);
        let channels = self.channels as usize;
        let fw = self.width as usize;
        let (x, y) = (clipped.x as usize, clipped.y as usize);
        let (w, h) = (clipped.width as usize, clipped.height as usize);

        let mut data = Vec::with_capacity(w * h * channels);
        for row in y..y + h {
            let start = (row * fw + x) * channels;
            data.extend_from_slice(&self.data[start..start + w * channels]);
        }
        Frame::new(data, w as u32, h as u32, self.channels, self.index)
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
