use crate::ast::{AstId, ContractDefinition, Declaration, EnumDefinition, StructDefinition};
use crate::errors::LayoutError;
use std::collections::BTreeMap;

/// A struct or enum definition that variables can reference by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceDeclaration {
    Struct(StructDefinition),
    Enum(EnumDefinition),
}

impl ReferenceDeclaration {
    pub fn id(&self) -> AstId {
        match self {
            Self::Struct(s) => s.id,
            Self::Enum(e) => e.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Struct(s) => &s.canonical_name,
            Self::Enum(e) => &e.canonical_name,
        }
    }
}

/// Struct and enum definitions by declaration id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationTable {
    declarations: BTreeMap<AstId, ReferenceDeclaration>,
}

impl DeclarationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the struct and enum definitions among `nodes`; other nodes are skipped.
    pub fn extend_from<'a>(&mut self, nodes: impl IntoIterator<Item = &'a Declaration>) {
        for node in nodes {
            let entry = match node {
                Declaration::StructDefinition(s) => ReferenceDeclaration::Struct(s.clone()),
                Declaration::EnumDefinition(e) => ReferenceDeclaration::Enum(e.clone()),
                _ => continue,
            };
            self.declarations.insert(entry.id(), entry);
        }
    }

    pub fn get(&self, id: AstId) -> Option<&ReferenceDeclaration> {
        self.declarations.get(&id)
    }

    /// Members of the struct with the given id, in declaration order.
    pub fn struct_members(&self, id: AstId) -> Result<&[Declaration], LayoutError> {
        match self.get(id) {
            Some(ReferenceDeclaration::Struct(s)) => Ok(&s.members),
            Some(ReferenceDeclaration::Enum(_)) => Err(LayoutError::NotAStruct {
                id,
                found: "enum definition",
            }),
            None => Err(LayoutError::UnresolvedDeclaration(id)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AstId, &ReferenceDeclaration)> {
        self.declarations.iter()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

/// Collect every struct and enum declared directly in one of `contracts`.
pub fn reference_declarations<'a>(
    contracts: impl IntoIterator<Item = &'a ContractDefinition>,
) -> DeclarationTable {
    let mut table = DeclarationTable::new();
    for contract in contracts {
        table.extend_from(&contract.nodes);
    }
    table
}
