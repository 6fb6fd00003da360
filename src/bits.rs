//! Битовый массив фильтра: общий интерфейс + heap-реализация.
//!
//! Раскладка: позиция p → байт p / 8, бит p % 8 (LSB first).
//! Длина в байтах всегда ceil(m / 8), минимум 1; массив не меняет размер.

use crate::consts::MIN_BITS;

/// Capability, через которую Filter ставит/проверяет биты.
/// Реализации: HeapBits (RAM) и persist::MmapBits (mmap файла).
pub trait BitStore {
    /// Длина массива в битах (m >= 1).
    fn bit_len(&self) -> u32;

    /// Сырые байты массива (первые byte_len_for(m) байт — биты фильтра).
    fn as_bytes(&self) -> &[u8];

    fn as_bytes_mut(&mut self) -> &mut [u8];

    #[inline]
    fn set_bit(&mut self, pos: u32) {
        debug_assert!(pos < self.bit_len());
        set_bit(self.as_bytes_mut(), pos);
    }

    #[inline]
    fn test_bit(&self, pos: u32) -> bool {
        debug_assert!(pos < self.bit_len());
        get_bit(self.as_bytes(), pos)
    }
}

/// m < 1 → 1.
#[inline]
pub fn clamp_bits(m: u32) -> u32 {
    m.max(MIN_BITS)
}

/// Сколько байт нужно под m бит (после clamp): ceil(max(1, m) / 8).
#[inline]
pub fn byte_len_for(m: u32) -> usize {
    let m = clamp_bits(m);
    1 + ((m - 1) / 8) as usize
}

#[inline]
pub(crate) fn set_bit(bytes: &mut [u8], pos: u32) {
    let byte = (pos / 8) as usize;
    let mask = 1u8 << (pos % 8);
    bytes[byte] |= mask;
}

#[inline]
pub(crate) fn get_bit(bytes: &[u8], pos: u32) -> bool {
    let byte = (pos / 8) as usize;
    let mask = 1u8 << (pos % 8);
    (bytes[byte] & mask) != 0
}

/// Число установленных бит в первых m битах.
pub(crate) fn count_ones(bytes: &[u8], m: u32) -> u64 {
    let full = (m / 8) as usize;
    let mut n: u64 = bytes[..full].iter().map(|b| b.count_ones() as u64).sum();
    let rem = m % 8;
    if rem != 0 {
        let mask = (1u8 << rem) - 1;
        n += (bytes[full] & mask).count_ones() as u64;
    }
    n
}

/// Heap-буфер фиксированной длины.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapBits {
    bytes: Box<[u8]>,
    m: u32,
}

impl HeapBits {
    /// Нулевой массив на max(1, m) бит.
    pub fn new(m: u32) -> Self {
        let m = clamp_bits(m);
        Self {
            bytes: vec![0u8; byte_len_for(m)].into_boxed_slice(),
            m,
        }
    }

    /// Собрать из готовых байт. Лишние байты отбрасываются, недостающие — нули.
    pub(crate) fn from_bytes(bytes: &[u8], m: u32) -> Self {
        let mut out = Self::new(m);
        let n = out.bytes.len().min(bytes.len());
        out.bytes[..n].copy_from_slice(&bytes[..n]);
        out
    }
}

impl BitStore for HeapBits {
    #[inline]
    fn bit_len(&self) -> u32 {
        self.m
    }

    #[inline]
    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_len_rounds_up_with_minimum_one() {
        assert_eq!(byte_len_for(0), 1);
        assert_eq!(byte_len_for(1), 1);
        assert_eq!(byte_len_for(8), 1);
        assert_eq!(byte_len_for(9), 2);
        assert_eq!(byte_len_for(32), 4);
        assert_eq!(byte_len_for(32000), 4000);
        assert_eq!(byte_len_for(u32::MAX), 536_870_912);
    }

    #[test]
    fn bit_layout_is_lsb_first() {
        let mut b = HeapBits::new(16);
        b.set_bit(0);
        b.set_bit(9);
        assert_eq!(b.as_bytes(), &[0b0000_0001, 0b0000_0010]);
        assert!(b.test_bit(0) && b.test_bit(9));
        assert!(!b.test_bit(1) && !b.test_bit(8));
    }

    #[test]
    fn count_ones_ignores_tail_padding() {
        let mut b = HeapBits::new(3);
        b.as_bytes_mut()[0] = 0xFF;
        assert_eq!(count_ones(b.as_bytes(), 3), 3);
        assert_eq!(count_ones(&[0xFF, 0x01], 9), 9);
    }
}
