//! 版本需求编解码
//!
//! 单条需求的紧凑二进制格式：
//!
//! ```text
//! flags:u8   bit0 = message 存在, bit1 = error_code 存在, bit2 = patch 存在
//! kind:u8    0 = LANGUAGE_VERSION, 1 = COMPILER_VERSION, 2 = API_VERSION
//! level:u8   0 = WARNING, 1 = ERROR, 2 = HIDDEN
//! major:leb128  minor:leb128  [patch:leb128]
//! [error_code:leb128]
//! [message: leb128 长度 + UTF-8]
//! ```
//!
//! 可选字段只由 presence 位决定是否存在，所以缺失的 `error_code`
//! 解码后仍然缺失，不会变成某个默认编号。未知的 flag 位视为损坏数据。
//!
//! `kind`、`level` 位于固定偏移，门控检查可以通过 [`version_kind_of`]
//! 和 [`level_of`] 直接读取而无需完整反序列化。

use super::bytes::{ByteReader, ByteWriter};
use super::requirement::{RequirementLevel, Version, VersionKind, VersionRequirement};
use super::{DecodeError, EncodeError};

const FLAG_MESSAGE: u8 = 0b001;
const FLAG_ERROR_CODE: u8 = 0b010;
const FLAG_PATCH: u8 = 0b100;
const KNOWN_FLAGS: u8 = FLAG_MESSAGE | FLAG_ERROR_CODE | FLAG_PATCH;

const OFFSET_FLAGS: usize = 0;
const OFFSET_KIND: usize = 1;
const OFFSET_LEVEL: usize = 2;
const OFFSET_VERSION: usize = 3;

/// 编码一条版本需求
pub fn encode(requirement: &VersionRequirement) -> Result<Vec<u8>, EncodeError> {
    let mut writer = ByteWriter::with_capacity(8);
    encode_into(requirement, &mut writer)?;
    Ok(writer.finish())
}

/// 编码到已有的写入器
pub fn encode_into(
    requirement: &VersionRequirement,
    writer: &mut ByteWriter,
) -> Result<(), EncodeError> {
    let mut flags = 0;
    if requirement.message.is_some() {
        flags |= FLAG_MESSAGE;
    }
    if requirement.error_code.is_some() {
        flags |= FLAG_ERROR_CODE;
    }
    if requirement.version.patch != 0 {
        flags |= FLAG_PATCH;
    }

    writer.u8(flags);
    writer.u8(requirement.kind.as_u8());
    writer.u8(requirement.level.as_u8());
    writer.varint(requirement.version.major);
    writer.varint(requirement.version.minor);
    if flags & FLAG_PATCH != 0 {
        writer.varint(requirement.version.patch);
    }
    if let Some(code) = requirement.error_code {
        writer.varint(code);
    }
    if let Some(message) = &requirement.message {
        writer.str(message)?;
    }
    Ok(())
}

/// 解码一条版本需求，要求恰好消耗全部字节
pub fn decode(bytes: &[u8]) -> Result<VersionRequirement, DecodeError> {
    let mut reader = ByteReader::new(bytes);
    let requirement = decode_from(&mut reader)?;
    reader.expect_end()?;
    Ok(requirement)
}

/// 从读取器解码一条版本需求
pub fn decode_from(reader: &mut ByteReader<'_>) -> Result<VersionRequirement, DecodeError> {
    let header = read_header(reader)?;

    let error_code = if header.flags & FLAG_ERROR_CODE != 0 {
        Some(reader.varint()?)
    } else {
        None
    };
    let message = if header.flags & FLAG_MESSAGE != 0 {
        Some(reader.str()?.to_string())
    } else {
        None
    };

    Ok(VersionRequirement {
        kind: header.kind,
        version: header.version,
        level: header.level,
        message,
        error_code,
    })
}

/// 只做结构校验，不分配内存
pub fn validate(bytes: &[u8]) -> Result<(), DecodeError> {
    let mut reader = ByteReader::new(bytes);
    let header = read_header(&mut reader)?;
    if header.flags & FLAG_ERROR_CODE != 0 {
        reader.varint()?;
    }
    if header.flags & FLAG_MESSAGE != 0 {
        reader.str()?;
    }
    reader.expect_end()
}

/// 读取能力轴，不解码其余字段
pub fn version_kind_of(bytes: &[u8]) -> Result<VersionKind, DecodeError> {
    let tag = byte_at(bytes, OFFSET_KIND)?;
    VersionKind::from_u8(tag).ok_or(DecodeError::InvalidVersionKind(tag))
}

/// 读取处理级别，不解码其余字段
pub fn level_of(bytes: &[u8]) -> Result<RequirementLevel, DecodeError> {
    let tag = byte_at(bytes, OFFSET_LEVEL)?;
    RequirementLevel::from_u8(tag).ok_or(DecodeError::InvalidLevel(tag))
}

/// 读取最低版本，不解码消息
pub fn version_of(bytes: &[u8]) -> Result<Version, DecodeError> {
    let flags = flags_of(bytes)?;
    let mut reader = ByteReader::new(bytes);
    reader.take(OFFSET_VERSION)?;
    read_version(&mut reader, flags)
}

/// 是否携带兼容性错误码
pub fn has_error_code(bytes: &[u8]) -> Result<bool, DecodeError> {
    Ok(flags_of(bytes)? & FLAG_ERROR_CODE != 0)
}

struct Header {
    flags: u8,
    kind: VersionKind,
    level: RequirementLevel,
    version: Version,
}

fn read_header(reader: &mut ByteReader<'_>) -> Result<Header, DecodeError> {
    let flags = reader.u8()?;
    if flags & !KNOWN_FLAGS != 0 {
        return Err(DecodeError::UnknownFlags { flags });
    }
    let kind_tag = reader.u8()?;
    let kind = VersionKind::from_u8(kind_tag).ok_or(DecodeError::InvalidVersionKind(kind_tag))?;
    let level_tag = reader.u8()?;
    let level = RequirementLevel::from_u8(level_tag).ok_or(DecodeError::InvalidLevel(level_tag))?;
    let version = read_version(reader, flags)?;

    Ok(Header {
        flags,
        kind,
        level,
        version,
    })
}

fn read_version(
    reader: &mut ByteReader<'_>,
    flags: u8,
) -> Result<Version, DecodeError> {
    let major = reader.varint()?;
    let minor = reader.varint()?;
    let patch = if flags & FLAG_PATCH != 0 {
        reader.varint()?
    } else {
        0
    };
    Ok(Version::with_patch(major, minor, patch))
}

fn flags_of(bytes: &[u8]) -> Result<u8, DecodeError> {
    let flags = byte_at(bytes, OFFSET_FLAGS)?;
    if flags & !KNOWN_FLAGS != 0 {
        return Err(DecodeError::UnknownFlags { flags });
    }
    Ok(flags)
}

#[inline]
fn byte_at(
    bytes: &[u8],
    offset: usize,
) -> Result<u8, DecodeError> {
    bytes
        .get(offset)
        .copied()
        .ok_or(DecodeError::UnexpectedEof { offset: bytes.len() })
}
