//! Fixed-size data chunks staged between socket I/O and file writers
//!
//! 在套接字 I/O 与文件写入之间暂存的固定大小数据块
//!
//! A [`Chunk`] keeps its bytes inline so a [`StagingBuffer`] holds all of its storage in
//! the ring's slot array, with no per-chunk heap allocation.

use crate::mpmc::RingBuffer;
use std::fmt;

/// Chunk size used by the connection layer unless configured otherwise
///
/// 连接层默认使用的数据块大小
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Ring buffer of chunks moving between the network layer and disk
///
/// 在网络层与磁盘之间流动的数据块环形缓冲区
pub type StagingBuffer<const SIZE: usize, const N: usize> = RingBuffer<Chunk<SIZE>, N>;

/// Inline byte segment with a fill length
///
/// 带有填充长度的内联字节段
#[derive(Clone)]
pub struct Chunk<const SIZE: usize> {
    len: usize,
    bytes: [u8; SIZE],
}

impl<const SIZE: usize> Chunk<SIZE> {
    /// Maximum number of bytes a chunk holds
    ///
    /// 数据块可容纳的最大字节数
    pub const CAPACITY: usize = SIZE;

    /// Create an empty chunk
    ///
    /// 创建一个空数据块
    #[inline]
    pub const fn new() -> Self {
        Self {
            len: 0,
            bytes: [0; SIZE],
        }
    }

    /// Create a chunk holding the first `SIZE` bytes of `data`
    ///
    /// 创建一个包含 `data` 前 `SIZE` 个字节的数据块
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut chunk = Self::new();
        chunk.fill_from(data);
        chunk
    }

    /// Append as much of `data` as fits, returning the number of bytes taken
    ///
    /// 追加尽可能多的 `data`，返回实际写入的字节数
    pub fn fill_from(&mut self, data: &[u8]) -> usize {
        let count = self.remaining().min(data.len());
        self.bytes[self.len..self.len + count].copy_from_slice(&data[..count]);
        self.len += count;
        count
    }

    /// Get the filled bytes
    ///
    /// 获取已填充的字节
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Get the number of filled bytes
    ///
    /// 获取已填充的字节数
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if no bytes are filled
    ///
    /// 检查是否没有填充任何字节
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if every byte is filled
    ///
    /// 检查是否已全部填满
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == SIZE
    }

    /// Free bytes left in the chunk
    ///
    /// 数据块中剩余的空闲字节数
    #[inline]
    pub fn remaining(&self) -> usize {
        SIZE - self.len
    }

    /// Reset the fill length so the chunk can be reused
    ///
    /// 重置填充长度以便复用数据块
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Split `data` into consecutive chunks; only the last one may be partially filled
    ///
    /// 将 `data` 切分为连续的数据块；只有最后一块可能未填满
    pub fn split(data: &[u8]) -> Split<'_, SIZE> {
        Split { rest: data }
    }
}

impl<const SIZE: usize> Default for Chunk<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

// Only the filled prefix takes part in equality
impl<const SIZE: usize> PartialEq for Chunk<SIZE> {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<const SIZE: usize> Eq for Chunk<SIZE> {}

impl<const SIZE: usize> AsRef<[u8]> for Chunk<SIZE> {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<const SIZE: usize> fmt::Debug for Chunk<SIZE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("len", &self.len)
            .field("capacity", &SIZE)
            .finish()
    }
}

/// Iterator returned by [`Chunk::split`]
pub struct Split<'a, const SIZE: usize> {
    rest: &'a [u8],
}

impl<const SIZE: usize> Iterator for Split<'_, SIZE> {
    type Item = Chunk<SIZE>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() || SIZE == 0 {
            return None;
        }
        let (head, tail) = self.rest.split_at(self.rest.len().min(SIZE));
        self.rest = tail;
        Some(Chunk::from_bytes(head))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = if SIZE == 0 { 0 } else { self.rest.len().div_ceil(SIZE) };
        (count, Some(count))
    }
}

impl<const SIZE: usize> ExactSizeIterator for Split<'_, SIZE> {}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;

    #[test]
    fn test_fill_and_read() {
        let mut chunk: Chunk<8> = Chunk::new();
        assert!(chunk.is_empty());
        assert_eq!(chunk.fill_from(b"abc"), 3);
        assert_eq!(chunk.fill_from(b"defghij"), 5);
        assert!(chunk.is_full());
        assert_eq!(chunk.remaining(), 0);
        assert_eq!(chunk.as_bytes(), b"abcdefgh");
        assert_eq!(chunk.fill_from(b"z"), 0);

        chunk.clear();
        assert!(chunk.is_empty());
        assert_eq!(chunk.as_bytes(), b"");
    }

    #[test]
    fn test_reused_chunk_equals_fresh_chunk() {
        // A cleared chunk keeps stale bytes past its length
        // 清空后的数据块在长度之外仍保留旧字节
        let mut reused = Chunk::<4>::from_bytes(b"ab");
        reused.clear();
        reused.fill_from(b"x");

        assert_eq!(reused.as_bytes(), b"x");
        assert_eq!(reused, Chunk::<4>::from_bytes(b"x"));
        assert_ne!(reused, Chunk::<4>::from_bytes(b"xb"));
        assert_eq!(Chunk::<4>::new(), Chunk::<4>::default());
    }

    #[test]
    fn test_from_bytes_truncates() {
        let chunk: Chunk<4> = Chunk::from_bytes(b"hello");
        assert_eq!(chunk.as_bytes(), b"hell");
        assert_eq!(Chunk::<4>::CAPACITY, 4);
    }

    #[test]
    fn test_split() {
        let data: Vec<u8> = (0..10).collect();
        let split = Chunk::<4>::split(&data);
        assert_eq!(split.len(), 3);

        let chunks: Vec<Chunk<4>> = split.collect();
        assert_eq!(chunks[0].as_bytes(), &[0, 1, 2, 3]);
        assert_eq!(chunks[1].as_bytes(), &[4, 5, 6, 7]);
        assert_eq!(chunks[2].as_bytes(), &[8, 9]);
        assert_eq!(Chunk::<4>::split(&[]).count(), 0);
    }

    #[test]
    fn test_staging_buffer_round_trip() {
        let staging: StagingBuffer<16, 4> = RingBuffer::new();
        let payload = b"file contents staged from a socket read";

        let mut queued = 0;
        for chunk in Chunk::<16>::split(payload) {
            assert!(staging.push(chunk));
            queued += 1;
        }
        assert_eq!(queued, 3);

        let mut reassembled = Vec::new();
        let mut out = Chunk::default();
        while staging.get(&mut out) {
            reassembled.extend_from_slice(out.as_bytes());
        }
        assert_eq!(reassembled, payload);
    }
}
