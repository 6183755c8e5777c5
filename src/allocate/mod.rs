//! Storage slot allocation.
//!
//! Layered leaves first:
//!
//! ```text
//!   inherited_state_variables   (contract.rs, fold over the ancestor chain)
//!     → contract_state_variables  (contract.rs, one contract's own variables)
//!       → allocate_declaration    (allocator.rs, recursive over struct members)
//!         → allocate_value        (range.rs, packing inside 32-byte slots)
//!   DeclarationTable              (indexer.rs, struct member lookup)
//! ```
//!
//! The cursor is a `Copy` value handed into each step and returned from it;
//! nothing is shared between passes.

pub mod allocator;
pub mod contract;
pub mod indexer;
pub mod path;
pub mod range;

pub use allocator::{allocate_declaration, Allocation};
pub use contract::{contract_state_variables, inherited_state_variables, ContractStateInfo};
pub use indexer::{reference_declarations, DeclarationTable, ReferenceDeclaration};
pub use path::{PathSegment, SlotPath};
pub use range::{allocate_value, SlotAddress, SlotCursor, StorageRange};

use crate::ast::{AstId, ElementaryVariable};
use serde::Serialize;
use std::collections::BTreeMap;

/// Where a value lives in contract storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoragePointer {
    pub storage: StorageRange,
}

/// An elementary variable (or struct member) and its assigned storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableReference {
    pub definition: ElementaryVariable,
    pub pointer: StoragePointer,
    /// Containing struct variables, empty for top-level variables
    pub path: SlotPath,
}

impl VariableReference {
    /// Dotted name including containing struct variables.
    pub fn label(&self) -> String {
        self.path.label_for(&self.definition.header.name)
    }
}

/// Assigned storage keyed by declaration id.
pub type VariableReferences = BTreeMap<AstId, VariableReference>;
