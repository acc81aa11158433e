//! cleansource 스캐너 -- 소스 트리 핑거프린트와 빌드 도구 의존성 분석
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`ScannerError`)
//! - [`config`]: Engine/resolver configuration (`FingerprintConfig`, `ResolverConfig`, builder)
//! - [`fingerprint`]: Skip predicate, digest, fingerprint engine, directory size
//! - [`parser`]: Pure manifest parsers (pom.xml, package.json, build.gradle, requirements.txt, Pipfile, go.mod)
//! - [`buildtools`]: Marker table and per-ecosystem scanners (`BuildToolScanner`, `EcosystemScanner`)
//! - [`resolver`]: Runs detected scanners and collects results (`BuildToolResolver`)
//!
//! # Architecture
//!
//! ```text
//! scan root --+--> FingerprintEngine --> fingerprints.wfp
//!             |
//!             +--> detect_build_tools --> EcosystemScanner (sequential)
//!                                               |
//!                                         manifest parser (+ external tool output)
//!                                               |
//!                                        Vec<DependencyRoot>
//! ```

pub mod buildtools;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod parser;
pub mod resolver;

// --- Public API Re-exports ---

// Configuration
pub use config::{FingerprintConfig, FingerprintConfigBuilder, ResolverConfig};

// Error
pub use error::ScannerError;

// Fingerprint
pub use fingerprint::{
    DigestAlgorithm, FileRecord, FingerprintEngine, FingerprintEngineBuilder, FingerprintSummary,
    SkipPredicate, directory_size,
};

// Build tools
pub use buildtools::{BuildToolScanner, EcosystemScanner, detect_build_tools, tool_for_marker};

// Resolver
pub use resolver::{BuildToolResolver, BuildToolResolverBuilder, ResolveFailure, ResolveReport};

// Parser
pub use parser::ParsedManifest;
