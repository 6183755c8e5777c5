//! Serializable layout report.
//!
//! Entries are ordered by storage position, which is the real allocation
//! order; slot numbers are decimal strings so that layouts past `u64` survive
//! a JSON round trip through other tools.

use crate::allocate::{VariableReference, VariableReferences};
use crate::ast::AstId;
use crate::config::StructAlignment;
use crate::constants::SLOT_SIZE;
use serde::Serialize;

/// One elementary variable or struct member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEntry {
    pub ast_id: AstId,
    /// Dotted name, e.g. `position.amount`
    pub label: String,
    #[serde(rename = "type")]
    pub type_string: String,
    pub slot: String,
    pub offset: usize,
    pub end_slot: String,
    pub end_offset: usize,
    /// Width in bytes, decimal
    pub size: String,
    /// Ids of the containing struct variables, outermost first
    pub path: Vec<AstId>,
}

impl From<&VariableReference> for LayoutEntry {
    fn from(reference: &VariableReference) -> Self {
        let range = reference.pointer.storage;
        Self {
            ast_id: reference.definition.header.id,
            label: reference.label(),
            type_string: reference.definition.header.type_string.clone(),
            slot: range.from.slot.to_string(),
            offset: range.from.offset,
            end_slot: range.to.slot.to_string(),
            end_offset: range.to.offset,
            size: range.len().to_string(),
            path: reference
                .path
                .outermost_first()
                .into_iter()
                .map(|s| s.declaration)
                .collect(),
        }
    }
}

/// Storage layout of one contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutReport {
    pub contract: String,
    pub slot_size: usize,
    pub struct_alignment: StructAlignment,
    /// Number of slots in use (highest used slot + 1)
    pub slots_used: String,
    pub entries: Vec<LayoutEntry>,
}

impl LayoutReport {
    pub fn new(
        contract: &str,
        variables: &VariableReferences,
        struct_alignment: StructAlignment,
    ) -> Self {
        let mut references: Vec<&VariableReference> = variables.values().collect();
        references.sort_by_key(|r| (r.pointer.storage.from, r.definition.header.id));

        let slots_used = references
            .iter()
            .filter(|r| !r.pointer.storage.is_empty())
            .map(|r| r.pointer.storage.to.slot)
            .max()
            .map(|last| (last + alloy_primitives::U256::from(1)).to_string())
            .unwrap_or_else(|| "0".to_string());

        Self {
            contract: contract.to_string(),
            slot_size: SLOT_SIZE,
            struct_alignment,
            slots_used,
            entries: references.into_iter().map(LayoutEntry::from).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
