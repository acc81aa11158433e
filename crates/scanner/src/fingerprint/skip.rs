//! 스킵 판정
//!
//! 파일 시스템 항목이 핑거프린트 대상인지 판정하는 순수 함수입니다. I/O를 수행하지 않습니다.
//!
//! # 규칙 (순서대로, 하나라도 일치하면 스킵)
//!
//! 1. 기본 이름이 `.`으로 시작 (숨김 항목)
//! 2. 경로 세그먼트 중 하나가 [`SKIP_DIRS`]에 포함
//! 3. 소문자 확장자가 [`BINARY_EXTENSIONS`]에 포함
//! 4. 크기가 `max_file_size` 초과
//!
//! 경로는 스캔 루트 기준 상대 경로로 전달해야 합니다. 루트 자체가 `/tmp/build/` 아래에
//! 있어도 루트 밖의 세그먼트는 판정에 사용되지 않습니다.

use std::path::{Component, Path};

use cleansource_core::config::DEFAULT_MAX_FILE_SIZE;

/// 버전 관리, 패키지 캐시, 빌드 산출물 디렉토리
pub const SKIP_DIRS: &[&str] = &[
    "node_modules",
    "vendor",
    "target",
    "build",
    ".git",
    ".svn",
    ".hg",
    "__pycache__",
    ".tox",
    "dist",
    ".gradle",
];

/// 바이너리 / 아카이브 / 미디어 확장자 (점 제외, 소문자)
pub const BINARY_EXTENSIONS: &[&str] = &[
    "exe", "dll", "so", "dylib", "jar", "war", "ear", "zip", "tar", "gz", "bz2", "7z", "rar",
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "mp3", "mp4", "avi", "mov", "wav", "pdf", "doc",
    "docx", "xls", "xlsx", "ppt", "pptx", "bin", "class", "o", "a", "lib",
];

/// 이름만으로 판정할 때 허용하는 dotfile
pub const ALLOWED_DOTFILES: &[&str] = &[".gitignore", ".dockerignore", ".editorconfig"];

/// 판정에 필요한 항목 메타데이터
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryMeta {
    /// 바이트 크기
    pub size: u64,
    /// 디렉토리 여부
    pub is_dir: bool,
}

impl EntryMeta {
    /// 파일 메타데이터를 생성합니다.
    pub fn file(size: u64) -> Self {
        Self {
            size,
            is_dir: false,
        }
    }

    /// 디렉토리 메타데이터를 생성합니다.
    pub fn dir() -> Self {
        Self {
            size: 0,
            is_dir: true,
        }
    }
}

impl From<&std::fs::Metadata> for EntryMeta {
    fn from(meta: &std::fs::Metadata) -> Self {
        Self {
            size: meta.len(),
            is_dir: meta.is_dir(),
        }
    }
}

/// 스킵 판정기
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipPredicate {
    max_file_size: u64,
}

impl Default for SkipPredicate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}

impl SkipPredicate {
    /// 크기 상한을 지정하여 판정기를 생성합니다.
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// 크기 상한 (바이트)
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// 메타데이터를 포함하여 항목의 스킵 여부를 판정합니다.
    ///
    /// 디렉토리는 숨김 규칙과 스킵 디렉토리 규칙만 적용되며,
    /// 스킵된 디렉토리는 하위 항목까지 순회에서 제외됩니다.
    pub fn should_skip(&self, path: &Path, meta: &EntryMeta) -> bool {
        if is_hidden(path) || has_skip_segment(path) {
            return true;
        }
        if meta.is_dir {
            return false;
        }
        has_binary_extension(path) || meta.size > self.max_file_size
    }

    /// 이름만으로 스킵 여부를 판정합니다 (크기 정보 없음).
    ///
    /// [`ALLOWED_DOTFILES`]에 포함된 dotfile은 스킵하지 않습니다.
    pub fn should_skip_name(&self, path: &Path) -> bool {
        if is_hidden(path) && !is_allowed_dotfile(path) {
            return true;
        }
        has_skip_segment(path) || has_binary_extension(path)
    }
}

fn base_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

fn is_hidden(path: &Path) -> bool {
    base_name(path).is_some_and(|name| name.starts_with('.'))
}

fn is_allowed_dotfile(path: &Path) -> bool {
    base_name(path).is_some_and(|name| ALLOWED_DOTFILES.contains(&name))
}

fn has_skip_segment(path: &Path) -> bool {
    path.components().any(|c| match c {
        Component::Normal(seg) => seg.to_str().is_some_and(|s| SKIP_DIRS.contains(&s)),
        _ => false,
    })
}

fn has_binary_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| BINARY_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}
