//! Compiler artifact loading.
//!
//! Accepted inputs:
//! - contract artifacts (`{ "contractName": ..., "ast": { "nodeType": "SourceUnit", ... } }`)
//! - raw `SourceUnit` ASTs
//! - standard JSON compiler output (`{ "sources": { "<file>": { "ast": ... } } }`)
//!
//! Raw nodes are read with `serde` and converted into [`Declaration`]s using a
//! [`TypeSizer`]. Two things are settled only once every source unit has been
//! read: inheritance lists, which arrive as node ids and become contract
//! names, and widths that depend on definitions from other files
//! (user-defined value types, static arrays of structs).

use super::{
    AstId, ContractDefinition, ContractResolver, Declaration, ElementaryVariable, EnumDefinition,
    Mutability, OtherNode, StructDefinition, StructVariable, VariableHeader,
};
use crate::allocate::{allocate_value, SlotCursor};
use crate::constants::{node_types, SLOT_SIZE};
use crate::errors::ArtifactError;
use crate::types::{NoDefinitions, TypeClass, TypeDefinitions, TypeDescriptor, TypeSizer};
use alloy_primitives::U256;
use reth_tracing::tracing::{debug, warn};
use serde::Deserialize;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

// ── Raw compiler AST shapes ─────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTypeDescriptions {
    #[serde(default)]
    type_identifier: Option<String>,
    #[serde(default)]
    type_string: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTypeName {
    #[serde(default)]
    node_type: String,
    #[serde(default)]
    referenced_declaration: Option<AstId>,
    #[serde(default)]
    type_descriptions: RawTypeDescriptions,
    #[serde(default)]
    base_type: Option<Box<RawTypeName>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVariable {
    id: AstId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    state_variable: bool,
    #[serde(default)]
    constant: bool,
    #[serde(default)]
    mutability: Option<String>,
    #[serde(default)]
    type_name: Option<RawTypeName>,
    #[serde(default)]
    type_descriptions: RawTypeDescriptions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStruct {
    id: AstId,
    name: String,
    #[serde(default)]
    canonical_name: Option<String>,
    #[serde(default)]
    members: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawEnumValue {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnum {
    id: AstId,
    name: String,
    #[serde(default)]
    canonical_name: Option<String>,
    #[serde(default)]
    members: Vec<RawEnumValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawValueType {
    id: AstId,
    underlying_type: RawTypeName,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContract {
    id: AstId,
    name: String,
    #[serde(default)]
    linearized_base_contracts: Vec<AstId>,
    #[serde(default)]
    nodes: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawSourceUnit {
    #[serde(default)]
    nodes: Vec<Value>,
}

// ── Contract set ────────────────────────────────────────────────────

/// Facts gathered while converting that need every source unit to resolve.
#[derive(Debug, Clone, Default)]
struct Deferred {
    /// Contract name -> linearized base ids
    bases: HashMap<String, Vec<AstId>>,
    /// Value type id -> underlying type
    value_types: HashMap<AstId, TypeDescriptor>,
    /// Variable id -> type whose width needs other definitions
    widths: HashMap<AstId, TypeDescriptor>,
}

/// All contracts loaded for one session, keyed by name.
///
/// A name mapped to `None` was seen in an artifact that carried no AST; its
/// layout is empty.
#[derive(Debug, Clone, Default)]
pub struct ContractSet {
    contracts: BTreeMap<String, Option<ContractDefinition>>,
    /// Struct and enum definitions declared outside any contract
    free_declarations: Vec<Declaration>,
    /// Contract id -> name, for resolving inheritance lists
    names_by_id: HashMap<AstId, String>,
    deferred: Deferred,
}

impl ContractSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an already-typed contract definition.
    pub fn insert(&mut self, contract: ContractDefinition) {
        self.names_by_id.insert(contract.id, contract.name.clone());
        self.contracts.insert(contract.name.clone(), Some(contract));
    }

    /// Register a contract name for which no AST is available.
    pub fn insert_missing(&mut self, name: &str) {
        self.contracts.entry(name.to_string()).or_insert(None);
    }

    /// Names of every registered contract, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.contracts.keys().map(String::as_str)
    }

    /// Whether the name was registered at all (with or without an AST).
    pub fn contains(&self, name: &str) -> bool {
        self.contracts.contains_key(name)
    }

    /// Contract definitions that have an AST.
    pub fn definitions(&self) -> impl Iterator<Item = &ContractDefinition> {
        self.contracts.values().flatten()
    }

    /// Struct and enum definitions declared at file level.
    pub fn free_declarations(&self) -> &[Declaration] {
        &self.free_declarations
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Add every contract found in one parsed JSON document.
    pub fn add_json(
        &mut self,
        value: &Value,
        path: &Path,
        sizer: &impl TypeSizer,
    ) -> Result<(), ArtifactError> {
        let json_err = |source| ArtifactError::Json {
            path: path.to_path_buf(),
            source,
        };

        if let Some(name) = value.get("contractName").and_then(Value::as_str) {
            match value.get("ast").filter(|ast| !ast.is_null()) {
                Some(ast) => self.add_source_unit(ast, sizer).map_err(json_err)?,
                None => debug!(target: "storage_layout::loader", contract = name, "artifact has no AST"),
            }
            // the artifact's own contract is registered even if its AST lacks it
            self.insert_missing(name);
            return Ok(());
        }

        if let Some(sources) = value.get("sources").and_then(Value::as_object) {
            for source in sources.values() {
                if let Some(ast) = source.get("ast") {
                    self.add_source_unit(ast, sizer).map_err(json_err)?;
                }
            }
            return Ok(());
        }

        if node_type(value) == Some(node_types::SOURCE_UNIT) {
            return self.add_source_unit(value, sizer).map_err(json_err);
        }

        Err(ArtifactError::Unrecognized(path.to_path_buf()))
    }

    fn add_source_unit(
        &mut self,
        ast: &Value,
        sizer: &impl TypeSizer,
    ) -> Result<(), serde_json::Error> {
        let unit = RawSourceUnit::deserialize(ast)?;
        for node in &unit.nodes {
            match node_type(node) {
                Some(node_types::CONTRACT_DEFINITION) => {
                    let raw = RawContract::deserialize(node)?;
                    if matches!(self.contracts.get(&raw.name), Some(Some(_))) {
                        continue;
                    }
                    let contract = convert_contract(raw, sizer, &mut self.deferred)?;
                    self.insert(contract);
                }
                Some(node_types::USER_DEFINED_VALUE_TYPE_DEFINITION) => {
                    convert_node(node, sizer, &mut self.deferred)?;
                }
                Some(node_types::STRUCT_DEFINITION) | Some(node_types::ENUM_DEFINITION) => {
                    let decl = convert_node(node, sizer, &mut self.deferred)?;
                    let known = self
                        .free_declarations
                        .iter()
                        .any(|d| d.id().is_some() && d.id() == decl.id());
                    if !known {
                        self.free_declarations.push(decl);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Settle everything that needed all artifacts: base names and dependent widths.
    pub fn resolve(&mut self, sizer: &impl TypeSizer) {
        self.resolve_bases();
        self.resolve_widths(sizer);
    }

    /// Turn pending inheritance id lists into contract names.
    ///
    /// Ids that match no loaded contract are kept as `#<id>` so that they
    /// resolve to nothing during allocation.
    pub fn resolve_bases(&mut self) {
        for (name, ids) in std::mem::take(&mut self.deferred.bases) {
            let names: Vec<String> = ids
                .iter()
                .map(|id| match self.names_by_id.get(id) {
                    Some(base) => base.clone(),
                    None => {
                        warn!(target: "storage_layout::loader", contract = %name, base_id = id, "unresolved base contract id");
                        format!("#{id}")
                    }
                })
                .collect();
            if let Some(Some(contract)) = self.contracts.get_mut(&name) {
                contract.linearized_base_contracts = names;
            }
        }
    }

    /// Size variables whose width depends on struct or value type definitions.
    ///
    /// A width that still cannot be determined stays at one slot.
    pub fn resolve_widths(&mut self, sizer: &impl TypeSizer) {
        let pending = std::mem::take(&mut self.deferred.widths);
        if pending.is_empty() {
            return;
        }

        let widths: HashMap<AstId, U256> = {
            let index = DefinitionIndex::new(self, &pending, sizer);
            pending
                .iter()
                .map(|(id, ty)| {
                    let width = index.width_of(ty).unwrap_or_else(|| {
                        warn!(
                            target: "storage_layout::loader",
                            variable = id,
                            type_identifier = %ty.type_identifier,
                            "width depends on a missing or recursive definition, using one slot"
                        );
                        U256::from(SLOT_SIZE)
                    });
                    (*id, width)
                })
                .collect()
        };

        for contract in self.contracts.values_mut().flatten() {
            apply_widths(&mut contract.nodes, &widths);
        }
        apply_widths(&mut self.free_declarations, &widths);
    }
}

fn apply_widths(nodes: &mut [Declaration], widths: &HashMap<AstId, U256>) {
    for node in nodes {
        match node {
            Declaration::ElementaryVariable(variable) => {
                if let Some(width) = widths.get(&variable.header.id) {
                    variable.width = *width;
                }
            }
            Declaration::StructDefinition(definition) => apply_widths(&mut definition.members, widths),
            _ => {}
        }
    }
}

// ── Definition index ────────────────────────────────────────────────

/// Struct and value type definitions of a whole contract set, used to size
/// types that refer to them.
///
/// Struct sizes follow the compiler: members are packed from a fresh slot,
/// nested structs start and end on slot boundaries, and the total is rounded
/// up to whole slots.
struct DefinitionIndex<'a, S> {
    sizer: &'a S,
    structs: HashMap<AstId, &'a StructDefinition>,
    value_types: &'a HashMap<AstId, TypeDescriptor>,
    /// Member widths that are themselves still pending
    pending: &'a HashMap<AstId, TypeDescriptor>,
    /// Struct id -> size; `None` while the struct is being measured
    sizes: RefCell<HashMap<AstId, Option<U256>>>,
}

impl<'a, S: TypeSizer> DefinitionIndex<'a, S> {
    fn new(set: &'a ContractSet, pending: &'a HashMap<AstId, TypeDescriptor>, sizer: &'a S) -> Self {
        let structs = set
            .definitions()
            .flat_map(|contract| contract.nodes.iter())
            .chain(set.free_declarations.iter())
            .filter_map(|node| match node {
                Declaration::StructDefinition(definition) => Some((definition.id, definition)),
                _ => None,
            })
            .collect();
        Self {
            sizer,
            structs,
            value_types: &set.deferred.value_types,
            pending,
            sizes: RefCell::new(HashMap::new()),
        }
    }

    fn width_of(&self, ty: &TypeDescriptor) -> Option<U256> {
        self.sizer.storage_size(ty, self)
    }

    fn measure(&self, definition: &StructDefinition) -> Option<U256> {
        let mut cursor = SlotCursor::ZERO;
        for member in &definition.members {
            match member {
                Declaration::ElementaryVariable(variable) => {
                    let width = match self.pending.get(&variable.header.id) {
                        Some(ty) => self.width_of(ty)?,
                        None => variable.width,
                    };
                    cursor = allocate_value(cursor, width).1;
                }
                Declaration::StructVariable(variable) => {
                    let size = self.struct_size(variable.struct_id)?;
                    cursor = allocate_value(cursor.align_to_slot(), size).1.align_to_slot();
                }
                _ => {}
            }
        }
        let slots = cursor.align_to_slot().slot().max(U256::from(1));
        Some(slots * U256::from(SLOT_SIZE))
    }
}

impl<S: TypeSizer> TypeDefinitions for DefinitionIndex<'_, S> {
    fn struct_size(&self, id: AstId) -> Option<U256> {
        let known = self.sizes.borrow().get(&id).copied();
        if let Some(size) = known {
            if size.is_none() {
                warn!(target: "storage_layout::loader", struct_id = id, "struct contains itself");
            }
            return size;
        }

        let definition = self.structs.get(&id)?;
        self.sizes.borrow_mut().insert(id, None);
        let size = self.measure(definition);
        match size {
            Some(size) => self.sizes.borrow_mut().insert(id, Some(size)),
            None => self.sizes.borrow_mut().remove(&id),
        };
        size
    }

    fn value_type(&self, id: AstId) -> Option<&TypeDescriptor> {
        self.value_types.get(&id)
    }
}

impl ContractResolver for ContractSet {
    fn contract_node(&self, name: &str) -> Option<&ContractDefinition> {
        self.contracts.get(name).and_then(Option::as_ref)
    }
}

/// Load artifacts from files and directories (non-recursive, `*.json` only).
pub fn load_paths(paths: &[PathBuf], sizer: &impl TypeSizer) -> Result<ContractSet, ArtifactError> {
    let mut set = ContractSet::new();
    for path in paths {
        for file in artifact_files(path)? {
            let text = fs::read_to_string(&file).map_err(|source| ArtifactError::Io {
                path: file.clone(),
                source,
            })?;
            let value: Value = serde_json::from_str(&text).map_err(|source| ArtifactError::Json {
                path: file.clone(),
                source,
            })?;
            set.add_json(&value, &file, sizer)?;
            debug!(target: "storage_layout::loader", file = %file.display(), contracts = set.len(), "loaded artifact");
        }
    }
    set.resolve(sizer);
    Ok(set)
}

fn artifact_files(path: &Path) -> Result<Vec<PathBuf>, ArtifactError> {
    let io_err = |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    };
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(path).map_err(io_err)? {
        let file = entry.map_err(io_err)?.path();
        if file.is_file() && file.extension().is_some_and(|ext| ext == "json") {
            files.push(file);
        }
    }
    files.sort();
    Ok(files)
}

// ── Conversion into the typed model ─────────────────────────────────

fn node_type(node: &Value) -> Option<&str> {
    node.get("nodeType").and_then(Value::as_str)
}

fn convert_contract(
    raw: RawContract,
    sizer: &impl TypeSizer,
    deferred: &mut Deferred,
) -> Result<ContractDefinition, serde_json::Error> {
    let nodes = raw
        .nodes
        .iter()
        .map(|node| convert_node(node, sizer, deferred))
        .collect::<Result<Vec<_>, _>>()?;
    deferred
        .bases
        .insert(raw.name.clone(), raw.linearized_base_contracts);
    Ok(ContractDefinition {
        id: raw.id,
        name: raw.name,
        linearized_base_contracts: Vec::new(),
        nodes,
    })
}

fn convert_node(
    node: &Value,
    sizer: &impl TypeSizer,
    deferred: &mut Deferred,
) -> Result<Declaration, serde_json::Error> {
    let kind = node_type(node).unwrap_or_default();
    let decl = match kind {
        node_types::VARIABLE_DECLARATION => {
            convert_variable(RawVariable::deserialize(node)?, sizer, deferred)
        }
        node_types::STRUCT_DEFINITION => {
            let raw = RawStruct::deserialize(node)?;
            let members = raw
                .members
                .iter()
                .map(|m| RawVariable::deserialize(m).map(|v| convert_variable(v, sizer, deferred)))
                .collect::<Result<Vec<_>, _>>()?;
            Declaration::StructDefinition(StructDefinition {
                id: raw.id,
                canonical_name: raw.canonical_name.unwrap_or_else(|| raw.name.clone()),
                name: raw.name,
                members,
            })
        }
        node_types::ENUM_DEFINITION => {
            let raw = RawEnum::deserialize(node)?;
            Declaration::EnumDefinition(EnumDefinition {
                id: raw.id,
                canonical_name: raw.canonical_name.unwrap_or_else(|| raw.name.clone()),
                name: raw.name,
                members: raw.members.into_iter().map(|m| m.name).collect(),
            })
        }
        node_types::USER_DEFINED_VALUE_TYPE_DEFINITION => {
            let raw = RawValueType::deserialize(node)?;
            let underlying = type_descriptor(&raw.underlying_type.type_descriptions, Some(&raw.underlying_type));
            deferred.value_types.insert(raw.id, underlying);
            Declaration::Other(OtherNode {
                id: Some(raw.id),
                node_type: kind.to_string(),
            })
        }
        other => Declaration::Other(OtherNode {
            id: node.get("id").and_then(Value::as_i64),
            node_type: other.to_string(),
        }),
    };
    Ok(decl)
}

fn convert_variable(raw: RawVariable, sizer: &impl TypeSizer, deferred: &mut Deferred) -> Declaration {
    let mutability = match raw.mutability.as_deref() {
        Some("constant") => Mutability::Constant,
        Some("immutable") => Mutability::Immutable,
        Some(_) => Mutability::Mutable,
        None if raw.constant => Mutability::Constant,
        None => Mutability::Mutable,
    };

    let ty = type_descriptor(&raw.type_descriptions, raw.type_name.as_ref());
    let header = VariableHeader {
        id: raw.id,
        name: raw.name,
        type_string: ty.type_string.clone(),
        state_variable: raw.state_variable,
        mutability,
    };

    if sizer.type_class(&ty) == TypeClass::Struct {
        match ty.declaration_id() {
            Some(struct_id) => return Declaration::StructVariable(StructVariable { header, struct_id }),
            None => warn!(
                target: "storage_layout::loader",
                variable = %header.name,
                type_identifier = %ty.type_identifier,
                "struct type without a referenced declaration, treating as one slot"
            ),
        }
        return Declaration::ElementaryVariable(ElementaryVariable {
            header,
            width: U256::from(SLOT_SIZE),
        });
    }

    let width = match sizer.storage_size(&ty, &NoDefinitions) {
        Some(width) => width,
        None => {
            deferred.widths.insert(header.id, ty);
            U256::from(SLOT_SIZE)
        }
    };
    Declaration::ElementaryVariable(ElementaryVariable { header, width })
}

fn type_descriptor(
    descriptions: &RawTypeDescriptions,
    type_name: Option<&RawTypeName>,
) -> TypeDescriptor {
    let descriptions = match (&descriptions.type_identifier, type_name) {
        (None, Some(name)) => &name.type_descriptions,
        _ => descriptions,
    };
    TypeDescriptor {
        type_identifier: descriptions.type_identifier.clone().unwrap_or_default(),
        type_string: descriptions.type_string.clone().unwrap_or_default(),
        referenced_declaration: type_name.and_then(|t| t.referenced_declaration),
        base: type_name
            .filter(|t| t.node_type == node_types::ARRAY_TYPE_NAME)
            .and_then(|t| t.base_type.as_deref())
            .map(|base| Box::new(type_descriptor(&base.type_descriptions, Some(base)))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SolidityTypeSizer;
    use serde_json::json;

    fn var(id: AstId, name: &str, type_identifier: &str, type_string: &str) -> Value {
        json!({
            "id": id,
            "nodeType": "VariableDeclaration",
            "name": name,
            "stateVariable": true,
            "constant": false,
            "mutability": "mutable",
            "typeName": {
                "nodeType": "ElementaryTypeName",
                "typeDescriptions": { "typeIdentifier": type_identifier, "typeString": type_string }
            },
            "typeDescriptions": { "typeIdentifier": type_identifier, "typeString": type_string }
        })
    }

    fn source_unit() -> Value {
        json!({
            "nodeType": "SourceUnit",
            "id": 100,
            "nodes": [
                { "nodeType": "PragmaDirective", "id": 1 },
                {
                    "nodeType": "StructDefinition",
                    "id": 2,
                    "name": "Free",
                    "canonicalName": "Free",
                    "members": [var(3, "x", "t_uint8", "uint8")]
                },
                {
                    "nodeType": "ContractDefinition",
                    "id": 10,
                    "name": "Base",
                    "linearizedBaseContracts": [10],
                    "nodes": [ var(11, "owner", "t_address", "address") ]
                },
                {
                    "nodeType": "ContractDefinition",
                    "id": 20,
                    "name": "Vault",
                    "linearizedBaseContracts": [20, 10],
                    "nodes": [
                        {
                            "nodeType": "StructDefinition",
                            "id": 21,
                            "name": "Position",
                            "canonicalName": "Vault.Position",
                            "members": [
                                var(22, "amount", "t_uint128", "uint128"),
                                var(23, "open", "t_bool", "bool")
                            ]
                        },
                        {
                            "nodeType": "EnumDefinition",
                            "id": 24,
                            "name": "State",
                            "canonicalName": "Vault.State",
                            "members": [ { "name": "Idle" }, { "name": "Busy" } ]
                        },
                        {
                            "nodeType": "VariableDeclaration",
                            "id": 25,
                            "name": "position",
                            "stateVariable": true,
                            "mutability": "mutable",
                            "typeName": {
                                "nodeType": "UserDefinedTypeName",
                                "referencedDeclaration": 21,
                                "typeDescriptions": {
                                    "typeIdentifier": "t_struct$_Position_$21_storage_ptr",
                                    "typeString": "struct Vault.Position"
                                }
                            },
                            "typeDescriptions": {
                                "typeIdentifier": "t_struct$_Position_$21_storage",
                                "typeString": "struct Vault.Position"
                            }
                        },
                        {
                            "nodeType": "VariableDeclaration",
                            "id": 26,
                            "name": "LIMIT",
                            "stateVariable": true,
                            "constant": true,
                            "typeDescriptions": { "typeIdentifier": "t_uint256", "typeString": "uint256" }
                        },
                        { "nodeType": "FunctionDefinition", "id": 27, "name": "deposit" }
                    ]
                }
            ]
        })
    }

    fn widths(nodes: &[Declaration]) -> Vec<u64> {
        nodes
            .iter()
            .filter_map(|node| match node {
                Declaration::ElementaryVariable(v) => Some(v.width.to::<u64>()),
                _ => None,
            })
            .collect()
    }

    fn typed_var(id: AstId, name: &str, type_name: Value) -> Value {
        json!({
            "id": id,
            "nodeType": "VariableDeclaration",
            "name": name,
            "stateVariable": true,
            "mutability": "mutable",
            "typeDescriptions": type_name["typeDescriptions"].clone(),
            "typeName": type_name
        })
    }

    fn flag_type_name() -> Value {
        json!({
            "nodeType": "UserDefinedTypeName",
            "referencedDeclaration": 3,
            "typeDescriptions": { "typeIdentifier": "t_userDefinedValueType$_Flag_$3", "typeString": "Flag" }
        })
    }

    fn flag_definition() -> Value {
        json!({
            "nodeType": "UserDefinedValueTypeDefinition",
            "id": 3,
            "name": "Flag",
            "underlyingType": {
                "nodeType": "ElementaryTypeName",
                "name": "uint8",
                "typeDescriptions": { "typeIdentifier": "t_uint8", "typeString": "uint8" }
            }
        })
    }

    fn load(value: Value) -> ContractSet {
        let mut set = ContractSet::new();
        set.add_json(&value, Path::new("test.json"), &SolidityTypeSizer)
            .unwrap();
        set.resolve(&SolidityTypeSizer);
        set
    }

    #[test]
    fn test_source_unit_contracts_are_loaded() {
        let set = load(source_unit());
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["Base", "Vault"]);
        let vault = set.contract_node("Vault").unwrap();
        assert_eq!(vault.linearized_base_contracts, vec!["Vault", "Base"]);
        assert_eq!(vault.nodes.len(), 5);
    }

    #[test]
    fn test_variables_are_classified() {
        let set = load(source_unit());
        let vault = set.contract_node("Vault").unwrap();
        match &vault.nodes[2] {
            Declaration::StructVariable(v) => {
                assert_eq!(v.struct_id, 21);
                assert_eq!(v.header.name, "position");
            }
            other => panic!("expected struct variable, got {other:?}"),
        }
        match &vault.nodes[3] {
            Declaration::ElementaryVariable(v) => {
                assert_eq!(v.width, U256::from(32));
                assert_eq!(v.header.mutability, Mutability::Constant);
                assert!(!v.header.is_persistent());
            }
            other => panic!("expected elementary variable, got {other:?}"),
        }
        assert!(matches!(&vault.nodes[4], Declaration::Other(o) if o.node_type == "FunctionDefinition" && o.id == Some(27)));
    }

    #[test]
    fn test_struct_members_are_typed() {
        let set = load(source_unit());
        let vault = set.contract_node("Vault").unwrap();
        let Declaration::StructDefinition(def) = &vault.nodes[0] else {
            panic!("expected struct definition");
        };
        assert_eq!(def.canonical_name, "Vault.Position");
        assert_eq!(widths(&def.members), vec![16, 1]);
    }

    #[test]
    fn test_value_types_pack_at_underlying_width() {
        let set = load(json!({
            "nodeType": "SourceUnit",
            "nodes": [
                flag_definition(),
                {
                    "nodeType": "ContractDefinition",
                    "id": 10,
                    "name": "Flags",
                    "linearizedBaseContracts": [10],
                    "nodes": [
                        typed_var(11, "paused", flag_type_name()),
                        typed_var(12, "frozen", flag_type_name()),
                        var(13, "count", "t_uint8", "uint8"),
                        typed_var(14, "history", json!({
                            "nodeType": "ArrayTypeName",
                            "baseType": flag_type_name(),
                            "typeDescriptions": {
                                "typeIdentifier": "t_array$_t_userDefinedValueType$_Flag_$3_$40_storage",
                                "typeString": "Flag[40]"
                            }
                        }))
                    ]
                }
            ]
        }));
        let flags = set.contract_node("Flags").unwrap();
        assert_eq!(widths(&flags.nodes), vec![1, 1, 1, 64]);
    }

    #[test]
    fn test_value_type_from_another_file() {
        let mut set = ContractSet::new();
        set.add_json(
            &json!({
                "nodeType": "SourceUnit",
                "nodes": [{
                    "nodeType": "ContractDefinition",
                    "id": 10,
                    "name": "User",
                    "linearizedBaseContracts": [10],
                    "nodes": [ typed_var(11, "flag", flag_type_name()) ]
                }]
            }),
            Path::new("User.json"),
            &SolidityTypeSizer,
        )
        .unwrap();
        set.add_json(
            &json!({ "nodeType": "SourceUnit", "nodes": [flag_definition()] }),
            Path::new("Flag.json"),
            &SolidityTypeSizer,
        )
        .unwrap();
        set.resolve(&SolidityTypeSizer);
        assert_eq!(widths(&set.contract_node("User").unwrap().nodes), vec![1]);
    }

    #[test]
    fn test_struct_arrays_use_struct_size() {
        let wide = json!({
            "nodeType": "UserDefinedTypeName",
            "referencedDeclaration": 21,
            "typeDescriptions": { "typeIdentifier": "t_struct$_Wide_$21_storage_ptr", "typeString": "struct Book.Wide" }
        });
        let set = load(json!({
            "nodeType": "SourceUnit",
            "nodes": [{
                "nodeType": "ContractDefinition",
                "id": 20,
                "name": "Book",
                "linearizedBaseContracts": [20],
                "nodes": [
                    {
                        "nodeType": "StructDefinition",
                        "id": 21,
                        "name": "Wide",
                        "canonicalName": "Book.Wide",
                        "members": [
                            var(22, "a", "t_uint256", "uint256"),
                            var(23, "b", "t_uint8", "uint8")
                        ]
                    },
                    typed_var(24, "items", json!({
                        "nodeType": "ArrayTypeName",
                        "baseType": wide,
                        "typeDescriptions": {
                            "typeIdentifier": "t_array$_t_struct$_Wide_$21_storage_$3_storage",
                            "typeString": "struct Book.Wide[3]"
                        }
                    }))
                ]
            }]
        }));
        // two slots per element
        assert_eq!(widths(&set.contract_node("Book").unwrap().nodes), vec![6 * 32]);
    }

    #[test]
    fn test_array_of_missing_struct_falls_back_to_one_slot() {
        let set = load(json!({
            "nodeType": "SourceUnit",
            "nodes": [{
                "nodeType": "ContractDefinition",
                "id": 20,
                "name": "Broken",
                "linearizedBaseContracts": [20],
                "nodes": [
                    typed_var(24, "items", json!({
                        "nodeType": "ArrayTypeName",
                        "baseType": {
                            "nodeType": "UserDefinedTypeName",
                            "referencedDeclaration": 404,
                            "typeDescriptions": { "typeIdentifier": "t_struct$_Gone_$404_storage_ptr", "typeString": "struct Gone" }
                        },
                        "typeDescriptions": {
                            "typeIdentifier": "t_array$_t_struct$_Gone_$404_storage_$2_storage",
                            "typeString": "struct Gone[2]"
                        }
                    }))
                ]
            }]
        }));
        assert_eq!(widths(&set.contract_node("Broken").unwrap().nodes), vec![32]);
    }

    #[test]
    fn test_struct_array_of_itself_falls_back_to_one_slot() {
        let node = json!({
            "nodeType": "UserDefinedTypeName",
            "referencedDeclaration": 21,
            "typeDescriptions": { "typeIdentifier": "t_struct$_Node_$21_storage_ptr", "typeString": "struct Tree.Node" }
        });
        let children = |id: AstId, name: &str| {
            typed_var(id, name, json!({
                "nodeType": "ArrayTypeName",
                "baseType": node.clone(),
                "typeDescriptions": {
                    "typeIdentifier": "t_array$_t_struct$_Node_$21_storage_$2_storage",
                    "typeString": "struct Tree.Node[2]"
                }
            }))
        };
        let set = load(json!({
            "nodeType": "SourceUnit",
            "nodes": [{
                "nodeType": "ContractDefinition",
                "id": 20,
                "name": "Tree",
                "linearizedBaseContracts": [20],
                "nodes": [
                    {
                        "nodeType": "StructDefinition",
                        "id": 21,
                        "name": "Node",
                        "canonicalName": "Tree.Node",
                        "members": [children(22, "kids")]
                    },
                    children(23, "roots")
                ]
            }]
        }));
        let tree = set.contract_node("Tree").unwrap();
        assert_eq!(widths(&tree.nodes), vec![32]);
        let Declaration::StructDefinition(def) = &tree.nodes[0] else {
            panic!("expected struct definition");
        };
        assert_eq!(widths(&def.members), vec![32]);
    }

    #[test]
    fn test_free_declarations_are_collected() {
        let set = load(source_unit());
        assert_eq!(set.free_declarations().len(), 1);
        assert_eq!(set.free_declarations()[0].id(), Some(2));
    }

    #[test]
    fn test_artifact_without_ast_registers_name() {
        let set = load(json!({ "contractName": "Empty", "abi": [] }));
        assert!(set.contains("Empty"));
        assert!(set.contract_node("Empty").is_none());
    }

    #[test]
    fn test_artifact_with_ast() {
        let set = load(json!({ "contractName": "Vault", "ast": source_unit() }));
        assert!(set.contract_node("Vault").is_some());
        assert!(set.contract_node("Base").is_some());
    }

    #[test]
    fn test_standard_json_output() {
        let set = load(json!({ "sources": { "Vault.sol": { "id": 0, "ast": source_unit() } } }));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_unresolved_base_ids_become_placeholders() {
        let set = load(json!({
            "nodeType": "SourceUnit",
            "nodes": [{
                "nodeType": "ContractDefinition",
                "id": 5,
                "name": "Child",
                "linearizedBaseContracts": [5, 99],
                "nodes": []
            }]
        }));
        let child = set.contract_node("Child").unwrap();
        assert_eq!(child.linearized_base_contracts, vec!["Child", "#99"]);
    }

    #[test]
    fn test_unrecognized_json_is_rejected() {
        let mut set = ContractSet::new();
        let err = set
            .add_json(&json!({ "hello": "world" }), Path::new("x.json"), &SolidityTypeSizer)
            .unwrap_err();
        assert!(matches!(err, ArtifactError::Unrecognized(_)));
    }
}
