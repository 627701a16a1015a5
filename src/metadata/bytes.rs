//! 元数据字节读写工具
//!
//! 变长整数采用无符号 LEB128；字符串为 LEB128 长度前缀 + UTF-8。
//! 长度与计数都按 u32 编码，超出时写入返回 [`EncodeError::LengthOverflow`]。

use super::{DecodeError, EncodeError};

/// u32 的 LEB128 编码最多占 5 字节
const MAX_VARINT_LEN: usize = 5;

/// 追加式字节写入器
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn u8(
        &mut self,
        value: u8,
    ) {
        self.buf.push(value);
    }

    pub fn u16_le(
        &mut self,
        value: u16,
    ) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn raw(
        &mut self,
        bytes: &[u8],
    ) {
        self.buf.extend_from_slice(bytes);
    }

    /// 写入 LEB128 变长整数
    pub fn varint(
        &mut self,
        mut value: u32,
    ) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buf.push(byte);
                return;
            }
            self.buf.push(byte | 0x80);
        }
    }

    /// 写入长度或计数
    pub fn length(
        &mut self,
        len: usize,
    ) -> Result<(), EncodeError> {
        let value = u32::try_from(len).map_err(|_| EncodeError::LengthOverflow { len })?;
        self.varint(value);
        Ok(())
    }

    /// 写入长度前缀的 UTF-8 字符串
    pub fn str(
        &mut self,
        value: &str,
    ) -> Result<(), EncodeError> {
        self.bytes(value.as_bytes())
    }

    /// 写入长度前缀的字节块
    pub fn bytes(
        &mut self,
        value: &[u8],
    ) -> Result<(), EncodeError> {
        self.length(value.len())?;
        self.buf.extend_from_slice(value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// 借用式字节读取器
///
/// 所有读取在越界时返回 [`DecodeError::UnexpectedEof`]，从不 panic。
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.offset == self.data.len()
    }

    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        let byte = *self
            .data
            .get(self.offset)
            .ok_or(DecodeError::UnexpectedEof { offset: self.offset })?;
        self.offset += 1;
        Ok(byte)
    }

    pub fn u16_le(&mut self) -> Result<u16, DecodeError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn take(
        &mut self,
        len: usize,
    ) -> Result<&'a [u8], DecodeError> {
        if len > self.remaining() {
            return Err(DecodeError::UnexpectedEof { offset: self.offset });
        }
        let slice = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    /// 读取 LEB128 变长整数
    pub fn varint(&mut self) -> Result<u32, DecodeError> {
        let start = self.offset;
        let mut result: u32 = 0;
        for i in 0..MAX_VARINT_LEN {
            let byte = self.u8()?;
            let payload = (byte & 0x7f) as u32;
            // 第 5 字节只允许携带剩余的 4 位
            if i == MAX_VARINT_LEN - 1 && payload > 0x0f {
                return Err(DecodeError::VarintOverflow { offset: start });
            }
            result |= payload << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(DecodeError::VarintOverflow { offset: start })
    }

    /// 读取长度前缀的字节块
    pub fn bytes(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.varint()? as usize;
        self.take(len)
    }

    /// 读取长度前缀的 UTF-8 字符串（借用）
    pub fn str(&mut self) -> Result<&'a str, DecodeError> {
        let start = self.offset;
        let bytes = self.bytes()?;
        std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { offset: start })
    }

    /// 确认已读完全部数据
    pub fn expect_end(&self) -> Result<(), DecodeError> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(DecodeError::TrailingBytes {
                offset: self.offset,
                remaining: self.remaining(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_boundaries() {
        for value in [0u32, 1, 127, 128, 300, 16_383, 16_384, u32::MAX] {
            let mut writer = ByteWriter::new();
            writer.varint(value);
            let bytes = writer.finish();
            let mut reader = ByteReader::new(&bytes);
            assert_eq!(reader.varint().unwrap(), value);
            assert!(reader.is_at_end());
        }
    }

    #[test]
    fn test_varint_encoding_is_compact() {
        let mut writer = ByteWriter::new();
        writer.varint(1);
        writer.varint(300);
        assert_eq!(writer.finish(), vec![0x01, 0xac, 0x02]);
    }

    #[test]
    fn test_varint_overflow() {
        let bytes = [0xff, 0xff, 0xff, 0xff, 0x1f];
        let mut reader = ByteReader::new(&bytes);
        assert!(matches!(
            reader.varint(),
            Err(DecodeError::VarintOverflow { offset: 0 })
        ));

        let endless = [0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        let mut reader = ByteReader::new(&endless);
        assert!(matches!(
            reader.varint(),
            Err(DecodeError::VarintOverflow { .. })
        ));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_length_prefix_overflow() {
        let mut writer = ByteWriter::new();
        writer.length(u32::MAX as usize).unwrap();
        assert_eq!(writer.len(), 5);

        let oversize = u32::MAX as usize + 1;
        assert_eq!(
            writer.length(oversize),
            Err(EncodeError::LengthOverflow { len: oversize })
        );
        // 失败的写入不留下任何字节
        assert_eq!(writer.len(), 5);
    }

    #[test]
    fn test_length_prefixed_string() {
        let mut writer = ByteWriter::new();
        writer.str("init").unwrap();
        let bytes = writer.finish();
        assert_eq!(bytes, b"\x04init");
        assert_eq!(ByteReader::new(&bytes).str().unwrap(), "init");
    }

    #[test]
    fn test_truncated_string() {
        let mut writer = ByteWriter::new();
        writer.varint(10);
        writer.raw(b"abc");
        let bytes = writer.finish();
        let mut reader = ByteReader::new(&bytes);
        assert!(matches!(
            reader.str(),
            Err(DecodeError::UnexpectedEof { offset: 1 })
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let bytes = [0x02, 0xc3, 0x28];
        let mut reader = ByteReader::new(&bytes);
        assert!(matches!(
            reader.str(),
            Err(DecodeError::InvalidUtf8 { offset: 0 })
        ));
    }
}
