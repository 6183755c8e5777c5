//! Typed declaration model.
//!
//! Compiler ASTs are loosely typed JSON; [`loader`] turns them into the closed
//! set of [`Declaration`] variants below. Variables are classified as
//! elementary or struct exactly once, at load time, so the allocator only
//! has to match on the variant.

pub mod loader;

pub use loader::{load_paths, ContractSet};

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Stable compiler-assigned node identifier.
pub type AstId = i64;

/// Storage mutability of a variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mutability {
    /// Regular storage variable
    #[default]
    Mutable,
    /// Compile-time constant, inlined into bytecode
    Constant,
    /// Set in the constructor and stored in bytecode
    Immutable,
}

/// Fields every variable declaration carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableHeader {
    pub id: AstId,
    pub name: String,
    /// Human readable type, e.g. `uint256`
    pub type_string: String,
    /// Declared at contract level
    pub state_variable: bool,
    pub mutability: Mutability,
}

impl VariableHeader {
    /// Whether the variable lives in contract storage.
    ///
    /// Constants and immutables are flagged as state variables by the
    /// compiler but never occupy a slot.
    pub fn is_persistent(&self) -> bool {
        self.state_variable && self.mutability == Mutability::Mutable
    }
}

/// A variable whose value occupies a fixed number of bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementaryVariable {
    #[serde(flatten)]
    pub header: VariableHeader,
    /// Storage width in bytes
    pub width: U256,
}

/// A variable of struct type; its members are allocated, not the variable itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructVariable {
    #[serde(flatten)]
    pub header: VariableHeader,
    /// Id of the referenced `StructDefinition`
    pub struct_id: AstId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructDefinition {
    pub id: AstId,
    pub name: String,
    pub canonical_name: String,
    /// Member variables in declaration order
    pub members: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDefinition {
    pub id: AstId,
    pub name: String,
    pub canonical_name: String,
    pub members: Vec<String>,
}

/// A node the allocator does not care about (function, event, modifier, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherNode {
    pub id: Option<AstId>,
    pub node_type: String,
}

/// A declaration found directly inside a contract or struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Declaration {
    ElementaryVariable(ElementaryVariable),
    StructVariable(StructVariable),
    StructDefinition(StructDefinition),
    EnumDefinition(EnumDefinition),
    Other(OtherNode),
}

impl Declaration {
    /// Node id, when the node has one.
    pub fn id(&self) -> Option<AstId> {
        match self {
            Self::ElementaryVariable(v) => Some(v.header.id),
            Self::StructVariable(v) => Some(v.header.id),
            Self::StructDefinition(d) => Some(d.id),
            Self::EnumDefinition(d) => Some(d.id),
            Self::Other(o) => o.id,
        }
    }

    /// Variable header for either variable variant.
    pub fn variable(&self) -> Option<&VariableHeader> {
        match self {
            Self::ElementaryVariable(v) => Some(&v.header),
            Self::StructVariable(v) => Some(&v.header),
            _ => None,
        }
    }

    /// Short name of the node kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::ElementaryVariable(_) => "elementary variable",
            Self::StructVariable(_) => "struct variable",
            Self::StructDefinition(_) => "struct definition",
            Self::EnumDefinition(_) => "enum definition",
            Self::Other(_) => "other node",
        }
    }
}

/// A contract with its own direct children and its inheritance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDefinition {
    pub id: AstId,
    pub name: String,
    /// Names of the contract and its ancestors, most derived first
    pub linearized_base_contracts: Vec<String>,
    /// Direct child declarations in source order
    pub nodes: Vec<Declaration>,
}

/// Looks up contract definitions by name.
pub trait ContractResolver {
    /// Definition of the named contract, if it was loaded with an AST.
    fn contract_node(&self, name: &str) -> Option<&ContractDefinition>;
}

impl ContractResolver for BTreeMap<String, ContractDefinition> {
    fn contract_node(&self, name: &str) -> Option<&ContractDefinition> {
        self.get(name)
    }
}

impl ContractResolver for HashMap<String, ContractDefinition> {
    fn contract_node(&self, name: &str) -> Option<&ContractDefinition> {
        self.get(name)
    }
}
