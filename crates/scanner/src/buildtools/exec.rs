//! 외부 빌드 도구 실행 파일 탐색과 실행
//!
//! 탐색 순서: 설정된 명시적 경로, `PATH` 후보(`which`), 프로젝트 래퍼(`mvnw`, `gradlew` 등).
//! 실행은 스캔 루트를 작업 디렉토리로 `tokio::process::Command`를 사용합니다.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tracing::debug;

use cleansource_core::types::BuildTool;

use crate::error::ScannerError;

/// 에러 메시지에 포함할 stderr 최대 길이
const STDERR_TAIL: usize = 512;

/// 실행할 외부 명령 (프로그램 + 고정 인자)
///
/// `python3 -m pip`처럼 프로그램 뒤에 항상 붙는 인자를 함께 보관합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: PathBuf,
    prefix_args: Vec<OsString>,
}

impl ToolCommand {
    /// 인자 없는 명령을 생성합니다.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            prefix_args: Vec::new(),
        }
    }

    /// 고정 인자를 추가합니다.
    pub fn with_prefix<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.prefix_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// 실행 파일 경로
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// 스캔 루트에서 명령을 실행하고 stdout을 반환합니다.
    ///
    /// # Errors
    ///
    /// 프로세스를 시작할 수 없거나 0이 아닌 코드로 종료하면 `ToolExecution`
    pub async fn run(
        &self,
        tool: BuildTool,
        args: &[&str],
        root: &Path,
    ) -> Result<String, ScannerError> {
        debug!(tool = %tool, command = %self, args = ?args, "running build tool");

        let output = tokio::process::Command::new(&self.program)
            .args(&self.prefix_args)
            .args(args)
            .current_dir(root)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ScannerError::ToolExecution {
                tool,
                reason: format!("failed to spawn {self}: {e}"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScannerError::ToolExecution {
                tool,
                reason: format!("{self} exited with {}: {}", output.status, tail(&stderr)),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.prefix_args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// 실행 파일 탐색 후보
#[derive(Debug, Default)]
pub struct Lookup<'a> {
    /// 설정된 명시적 경로 (존재할 때만 사용)
    pub explicit: Option<PathBuf>,
    /// `PATH`에서 찾을 이름
    pub path_candidates: &'a [&'a str],
    /// 스캔 루트 기준 래퍼 스크립트
    pub wrappers: &'a [&'a str],
}

impl Lookup<'_> {
    /// 탐색 순서대로 첫 번째로 발견된 실행 파일을 반환합니다.
    ///
    /// # Errors
    ///
    /// 어떤 후보도 없으면 `ExecutableNotFound`
    pub fn locate(&self, tool: BuildTool, root: &Path) -> Result<PathBuf, ScannerError> {
        if let Some(explicit) = &self.explicit {
            if explicit.is_file() {
                debug!(tool = %tool, path = %explicit.display(), "using configured executable");
                return Ok(explicit.clone());
            }
            debug!(
                tool = %tool,
                path = %explicit.display(),
                "configured executable does not exist, falling back to PATH"
            );
        }

        for candidate in self.path_candidates {
            if let Ok(path) = which::which(candidate) {
                debug!(tool = %tool, path = %path.display(), "found executable in PATH");
                return Ok(path);
            }
        }

        for wrapper in self.wrappers {
            let path = root.join(wrapper);
            if path.is_file() {
                debug!(tool = %tool, path = %path.display(), "using project wrapper");
                return Ok(path);
            }
        }

        Err(ScannerError::ExecutableNotFound { tool })
    }
}

/// 첫 번째로 존재하는 매니페스트 경로를 반환합니다.
///
/// # Errors
///
/// 어떤 후보도 없으면 `ManifestNotFound`
pub fn first_manifest<I, P>(tool: BuildTool, root: &Path, candidates: I) -> Result<PathBuf, ScannerError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    candidates
        .into_iter()
        .map(|c| root.join(c))
        .find(|p| p.is_file())
        .ok_or_else(|| ScannerError::ManifestNotFound {
            tool,
            dir: root.display().to_string(),
        })
}

/// 구조적 매니페스트(XML/JSON/TOML)를 읽습니다. UTF-8이 아니면 에러입니다.
pub async fn read_manifest(path: &Path) -> Result<String, ScannerError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ScannerError::io(path, e))
}

/// 줄 단위 매니페스트를 읽습니다.
///
/// 잘못된 UTF-8 바이트는 U+FFFD로 대체하므로 해당 줄만 파서에서 걸러집니다.
pub async fn read_manifest_lines(path: &Path) -> Result<String, ScannerError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ScannerError::io(path, e))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            debug!(path = %path.display(), "manifest is not valid UTF-8, decoding lossily");
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

fn tail(text: &str) -> &str {
    let text = text.trim();
    if text.len() <= STDERR_TAIL {
        return text;
    }
    let mut start = text.len() - STDERR_TAIL;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}
