//! 파일 다이제스트
//!
//! 파일 내용 전체를 읽어 소문자 hex 다이제스트와 바이트 크기를 계산합니다.
//! 업로드 서버가 기대하는 형식은 MD5이며, SHA-256은 선택적으로 사용할 수 있습니다.

use std::fmt;
use std::path::Path;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 다이제스트 알고리즘
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// MD5 (기본값, 128비트)
    #[default]
    Md5,
    /// SHA-256 (256비트)
    Sha256,
}

impl DigestAlgorithm {
    /// 설정 파일에서 사용하는 식별자
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
        }
    }

    /// 문자열에서 알고리즘을 파싱합니다 (대소문자 구분 없음).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "").as_str() {
            "md5" => Some(Self::Md5),
            "sha256" => Some(Self::Sha256),
            _ => None,
        }
    }

    /// hex 다이제스트 길이 (문자 수)
    pub fn hex_len(&self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha256 => 64,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 바이트 슬라이스의 소문자 hex 다이제스트를 계산합니다.
pub fn digest_bytes(data: &[u8], algorithm: DigestAlgorithm) -> String {
    match algorithm {
        DigestAlgorithm::Md5 => hex::encode(Md5::digest(data)),
        DigestAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
    }
}

/// 파일을 읽어 다이제스트와 크기를 반환합니다.
///
/// 빈 파일은 `Ok(None)`을 반환하며 기록 대상이 아닙니다.
///
/// # Errors
///
/// 파일을 열거나 읽을 수 없으면 I/O 에러를 반환합니다.
pub fn digest_file(
    path: &Path,
    algorithm: DigestAlgorithm,
) -> std::io::Result<Option<(String, u64)>> {
    let content = std::fs::read(path)?;
    if content.is_empty() {
        return Ok(None);
    }

    let size = u64::try_from(content.len()).unwrap_or(u64::MAX);
    Ok(Some((digest_bytes(&content, algorithm), size)))
}
