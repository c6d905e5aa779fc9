//! Sequential little-endian reader and writer over packet bytes

use crate::types::WheelArray;
use crate::{Result, TelemetryError};

/// Reads packed little-endian fields front to back.
///
/// Every read is bounds-checked; running off the end reports the layout size
/// the caller expected and the bytes actually present.
pub(crate) struct PacketReader<'a> {
    data: &'a [u8],
    offset: usize,
    expected: usize,
}

impl<'a> PacketReader<'a> {
    pub(crate) fn new(data: &'a [u8], expected: usize) -> Self {
        Self { data, offset: 0, expected }
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self
            .data
            .get(self.offset..self.offset + N)
            .and_then(|b| <[u8; N]>::try_from(b).ok())
            .ok_or_else(|| TelemetryError::decode(self.expected, self.data.len()))?;
        self.offset += N;
        Ok(bytes)
    }

    pub(crate) fn f32(&mut self) -> Result<f32> {
        self.take::<4>().map(f32::from_le_bytes)
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        self.take::<1>().map(|[b]| b)
    }

    pub(crate) fn vec3(&mut self) -> Result<[f32; 3]> {
        Ok([self.f32()?, self.f32()?, self.f32()?])
    }

    pub(crate) fn wheels_f32(&mut self) -> Result<WheelArray<f32>> {
        Ok(WheelArray([self.f32()?, self.f32()?, self.f32()?, self.f32()?]))
    }

    pub(crate) fn wheels_u8(&mut self) -> Result<WheelArray<u8>> {
        Ok(WheelArray(self.take::<4>()?))
    }
}

/// Appends packed little-endian fields.
pub(crate) struct PacketWriter {
    buf: Vec<u8>,
}

impl PacketWriter {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self { buf: Vec::with_capacity(capacity) }
    }

    pub(crate) fn f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub(crate) fn u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub(crate) fn vec3(&mut self, values: [f32; 3]) {
        values.into_iter().for_each(|v| self.f32(v));
    }

    pub(crate) fn wheels_f32(&mut self, wheels: WheelArray<f32>) {
        wheels.0.into_iter().for_each(|v| self.f32(v));
    }

    pub(crate) fn wheels_u8(&mut self, wheels: WheelArray<u8>) {
        self.buf.extend_from_slice(&wheels.0);
    }

    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
