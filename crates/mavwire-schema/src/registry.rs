use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use mavwire_frame::{MAX_MESSAGE_ID, MAX_PAYLOAD_LEN};

use crate::config::RegistryConfig;
use crate::dialect::{compute_crc_extra, DialectDefinition, MessageDefinition};
use crate::error::{Result, SchemaError};
use crate::types::FieldType;

const COMMON_DIALECT: &str = include_str!("../dialects/common.json");

/// One field of a message, positioned in the wire layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    name: String,
    field_type: FieldType,
    offset: usize,
    extension: bool,
}

impl FieldDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Byte offset within the untruncated payload.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn width(&self) -> usize {
        self.field_type.width()
    }

    pub fn is_extension(&self) -> bool {
        self.extension
    }
}

/// Immutable layout of one message type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    id: u32,
    name: String,
    fields: Vec<FieldDef>,
    canonical_length: usize,
    crc_extra: u8,
}

impl SchemaEntry {
    fn from_definition(def: &MessageDefinition) -> Result<Self> {
        let name = def.name.trim().to_ascii_uppercase();
        if name.is_empty() {
            return Err(SchemaError::EmptyName(def.id));
        }
        if def.id > MAX_MESSAGE_ID {
            return Err(SchemaError::IdOutOfRange { name, id: def.id });
        }

        let mut seen = HashSet::new();
        let mut base = Vec::new();
        let mut extensions = Vec::new();
        for field in &def.fields {
            // Field lookups ignore ASCII case, so names must be unique under it.
            if field.name.is_empty() || !seen.insert(field.name.to_ascii_lowercase()) {
                return Err(SchemaError::InvalidFieldName {
                    message: name,
                    field: field.name.clone(),
                });
            }
            let field_type: FieldType =
                field
                    .type_name
                    .parse()
                    .map_err(|_| SchemaError::UnknownFieldType {
                        message: name.clone(),
                        field: field.name.clone(),
                        type_name: field.type_name.clone(),
                    })?;
            let parsed = FieldDef {
                name: field.name.clone(),
                field_type,
                offset: 0,
                extension: field.extension,
            };
            if field.extension {
                extensions.push(parsed);
            } else {
                base.push(parsed);
            }
        }

        // Base fields go largest element first; the sort is stable so equal
        // sizes keep declaration order. Extensions are never reordered.
        base.sort_by_key(|field| Reverse(field.field_type.scalar.size()));
        let mut fields = base;
        fields.extend(extensions);

        let mut offset = 0usize;
        for field in &mut fields {
            field.offset = offset;
            offset += field.width();
        }
        if offset > MAX_PAYLOAD_LEN {
            return Err(SchemaError::PayloadTooLarge {
                message: name,
                size: offset,
            });
        }

        let computed = compute_crc_extra(&name, &fields);
        if let Some(stated) = def.crc_extra {
            if stated != computed {
                return Err(SchemaError::CrcExtraMismatch {
                    message: name,
                    stated,
                    computed,
                });
            }
        }

        Ok(Self {
            id: def.id,
            name,
            fields,
            canonical_length: offset,
            crc_extra: computed,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in wire order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Look up a field by name, exact match first, then ignoring case.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .or_else(|| {
                self.fields
                    .iter()
                    .find(|field| field.name.eq_ignore_ascii_case(name))
            })
    }

    /// Untruncated payload size.
    pub fn canonical_length(&self) -> usize {
        self.canonical_length
    }

    /// Per-message checksum seed.
    pub fn crc_extra(&self) -> u8 {
        self.crc_extra
    }
}

/// Id- and name-keyed registry of message layouts.
///
/// Built once, then only read; share it between sessions behind an `Arc`.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    dialect: String,
    version: u32,
    by_id: BTreeMap<u32, SchemaEntry>,
    by_name: HashMap<String, u32>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            dialect: String::new(),
            version: 0,
            by_id: BTreeMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// The embedded `common` dialect.
    pub fn common() -> Result<Self> {
        Self::from_json(COMMON_DIALECT)
    }

    /// Build from a dialect definition JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let definition: DialectDefinition = serde_json::from_str(json)?;
        Self::from_definition(&definition)
    }

    /// Build from a parsed dialect definition.
    pub fn from_definition(definition: &DialectDefinition) -> Result<Self> {
        let mut registry = Self::new();
        registry.dialect = definition.dialect.clone();
        registry.version = definition.version;
        for message in &definition.messages {
            registry.register(message)?;
        }
        tracing::debug!(
            dialect = %registry.dialect,
            version = registry.version,
            messages = registry.len(),
            "dialect loaded"
        );
        Ok(registry)
    }

    /// Load a dialect definition file.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_file_with_config(path, RegistryConfig::default())
    }

    pub fn from_file_with_config(path: &Path, config: RegistryConfig) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|err| {
            SchemaError::LoadFailed(format!("failed opening {}: {err}", path.display()))
        })?;
        let metadata = file
            .metadata()
            .map_err(|err| SchemaError::LoadFailed(err.to_string()))?;
        if !metadata.is_file() {
            return Err(SchemaError::LoadFailed(format!(
                "not a regular file: {}",
                path.display()
            )));
        }
        if metadata.len() > config.max_dialect_file_size as u64 {
            return Err(SchemaError::LoadFailed(format!(
                "dialect file too large ({} bytes): {}",
                metadata.len(),
                path.display()
            )));
        }

        let max_bytes = config.max_dialect_file_size;
        let read_limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
        let mut content = String::new();
        file.take(read_limit)
            .read_to_string(&mut content)
            .map_err(|err| {
                SchemaError::LoadFailed(format!("failed reading {}: {err}", path.display()))
            })?;
        if content.len() > max_bytes {
            return Err(SchemaError::LoadFailed(format!(
                "dialect file too large while reading: {}",
                path.display()
            )));
        }

        Self::from_json(&content)
    }

    /// Register one message definition.
    pub fn register(&mut self, definition: &MessageDefinition) -> Result<()> {
        let entry = SchemaEntry::from_definition(definition)?;
        if let Some(existing) = self.by_id.get(&entry.id) {
            return Err(SchemaError::DuplicateId {
                id: entry.id,
                existing: existing.name.clone(),
                name: entry.name,
            });
        }
        if self.by_name.contains_key(&entry.name) {
            return Err(SchemaError::DuplicateName(entry.name));
        }

        self.by_name.insert(entry.name.clone(), entry.id);
        self.by_id.insert(entry.id, entry);
        Ok(())
    }

    pub fn lookup_by_id(&self, id: u32) -> Option<&SchemaEntry> {
        self.by_id.get(&id)
    }

    /// Case-insensitive lookup by message name.
    pub fn lookup_by_name(&self, name: &str) -> Option<&SchemaEntry> {
        let id = match self.by_name.get(name) {
            Some(id) => id,
            None => self.by_name.get(&name.trim().to_ascii_uppercase())?,
        };
        self.by_id.get(id)
    }

    /// Registered messages ordered by id.
    pub fn messages(&self) -> impl Iterator<Item = &SchemaEntry> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn dialect(&self) -> &str {
        &self.dialect
    }

    pub fn version(&self) -> u32 {
        self.version
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
