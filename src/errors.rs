use crate::ast::AstId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while assigning storage to declarations.
///
/// Every variant means the declarations are inconsistent (a missing or
/// malformed definition), which the allocator cannot work around.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A struct variable references a declaration missing from the table
    #[error("Declaration {0} is not in the declaration table")]
    UnresolvedDeclaration(AstId),

    /// A struct variable references a declaration that is not a struct
    #[error("Declaration {id} is a {found}, expected a struct definition")]
    NotAStruct {
        /// The referenced declaration id
        id: AstId,
        /// Kind of the declaration that was found instead
        found: &'static str,
    },

    /// A struct contains itself by value, directly or through other structs
    #[error("Struct {0} contains itself")]
    RecursiveStruct(AstId),
}

/// Errors that can occur while loading compiler artifacts
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Artifact file or directory could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Artifact is not valid JSON or does not match the expected AST shape
    #[error("Failed to parse {path}: {source}")]
    Json {
        /// Path that failed
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// JSON parsed, but it is neither a contract artifact nor a source unit AST
    #[error("{0} is neither a contract artifact nor a SourceUnit AST")]
    Unrecognized(PathBuf),

    /// Configuration file could not be parsed
    #[error("Invalid layout config {path}: {source}")]
    Config {
        /// Config file path
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },
}
