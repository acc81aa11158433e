//! cleansource CLI 라이브러리
//!
//! 바이너리(`cleansource`)와 통합 테스트가 공유하는 명령 처리 로직입니다.
//!
//! # Module Structure
//!
//! - [`cli`]: clap argument definitions (no side effects)
//! - [`commands`]: One handler per subcommand (`scan`, `fingerprint`, `detect`, `config`)
//! - [`error`]: `CliError` and exit code mapping
//! - [`logging`]: tracing-subscriber initialization
//! - [`output`]: Text / JSON rendering (`OutputWriter`, `Render`)

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;

pub use error::CliError;
