//! # storage-layout
//!
//! Assigns storage slots and byte offsets to contract state variables the way
//! the compiler packs them: 32-byte slots, small values sharing a slot, struct
//! members laid out one by one, and inherited variables placed before the
//! variables of derived contracts.

pub mod allocate;
pub mod ast;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod output;
pub mod report;
pub mod session;
pub mod types;

pub use allocate::{
    DeclarationTable, SlotCursor, StoragePointer, StorageRange, VariableReference,
    VariableReferences,
};
pub use ast::{ContractDefinition, ContractResolver, ContractSet, Declaration};
pub use config::{LayoutConfig, StructAlignment};
pub use errors::{ArtifactError, LayoutError};
pub use report::LayoutReport;
pub use session::LayoutSession;
pub use types::{SolidityTypeSizer, TypeDefinitions, TypeSizer};
