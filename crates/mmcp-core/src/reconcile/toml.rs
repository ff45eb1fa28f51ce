//! Minimal-diff merge of server definitions into TOML agent configs.
//!
//! The target servers are first flattened into [`Patch`]es, one per leaf
//! value, addressed by key path from the document root. The patches are then
//! applied to a `toml_edit` document in place, so every byte outside the
//! edited values (comments, blank lines, key order, unrelated tables) comes
//! back out unchanged.

use std::fmt;

use serde_json::Value;
use toml_edit::{Array, ArrayOfTables, DocumentMut, InlineTable, Item, Table};

use crate::config::ServerMap;
use crate::error::MmcpError;

/// One step of a key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => write!(f, "{key}"),
            Segment::Index(idx) => write!(f, "[{idx}]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatchValue {
    Scalar(Scalar),
    Array(Vec<Scalar>),
    /// Remove the key.
    Unset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub path: Vec<Segment>,
    pub value: PatchValue,
}

/// Merge `servers` into the `servers_table` of a TOML document.
///
/// An empty target returns `content` as is, without parsing it.
pub fn merge_toml(
    content: &str,
    servers_table: &str,
    servers: &ServerMap,
) -> Result<String, MmcpError> {
    if servers.is_empty() {
        return Ok(content.to_string());
    }

    let mut doc = content
        .parse::<DocumentMut>()
        .map_err(|e| MmcpError::invalid_agent_config("TOML document", e))?;
    let patches = build_patches(servers_table, servers)?;
    tracing::debug!(patches = patches.len(), "applying TOML patches");
    apply_patches(&mut doc, &patches)?;
    Ok(doc.to_string())
}

/// Flatten every server into leaf patches rooted at `[servers_table, name]`.
pub fn build_patches(servers_table: &str, servers: &ServerMap) -> Result<Vec<Patch>, MmcpError> {
    let mut patches = Vec::new();
    for (name, server) in servers.iter() {
        let mut path = vec![
            Segment::Key(servers_table.to_string()),
            Segment::Key(name.to_string()),
        ];
        for (field, value) in server.fields() {
            path.push(Segment::Key(field.clone()));
            walk(&mut path, value, &mut patches)?;
            path.pop();
        }
    }
    Ok(patches)
}

fn walk(path: &mut Vec<Segment>, value: &Value, out: &mut Vec<Patch>) -> Result<(), MmcpError> {
    match value {
        Value::Null => out.push(Patch {
            path: path.clone(),
            value: PatchValue::Unset,
        }),
        Value::Object(map) => {
            for (key, child) in map {
                path.push(Segment::Key(key.clone()));
                walk(path, child, out)?;
                path.pop();
            }
        }
        Value::Array(items) if items.iter().all(is_scalar) => {
            let items = items
                .iter()
                .map(|item| to_scalar(path, item))
                .collect::<Result<Vec<_>, _>>()?;
            out.push(Patch {
                path: path.clone(),
                value: PatchValue::Array(items),
            });
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                path.push(Segment::Index(idx));
                walk(path, child, out)?;
                path.pop();
            }
        }
        scalar => out.push(Patch {
            path: path.clone(),
            value: PatchValue::Scalar(to_scalar(path, scalar)?),
        }),
    }
    Ok(())
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_))
}

fn to_scalar(path: &[Segment], value: &Value) -> Result<Scalar, MmcpError> {
    match value {
        Value::String(s) => Ok(Scalar::String(s.clone())),
        Value::Bool(b) => Ok(Scalar::Boolean(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Scalar::Integer(i))
            } else if n.is_f64() {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(Scalar::Float)
                    .ok_or_else(|| shape_error(path, "number is not a finite float"))
            } else {
                Err(shape_error(path, "integer does not fit in a TOML integer"))
            }
        }
        _ => Err(shape_error(path, "expected a string, number or boolean")),
    }
}

fn shape_error(path: &[Segment], reason: &str) -> MmcpError {
    MmcpError::UnsupportedFieldShape {
        path: display_path(path),
        reason: reason.to_string(),
    }
}

fn display_path(path: &[Segment]) -> String {
    let mut out = String::new();
    for segment in path {
        if matches!(segment, Segment::Key(_)) && !out.is_empty() {
            out.push('.');
        }
        out.push_str(&segment.to_string());
    }
    out
}

/// Apply patches to a parsed document in order.
///
/// Tables created along the way are appended after all existing tables, in
/// the order they are first referenced. Tables that end up holding only
/// other tables stay implicit and get no header of their own. A path that
/// runs into a value of the wrong kind (a table where a value sits, or the
/// reverse) is an `UnsupportedFieldShape` error; nothing is overwritten.
pub fn apply_patches(doc: &mut DocumentMut, patches: &[Patch]) -> Result<(), MmcpError> {
    let mut positions = TablePositions::after(doc.as_table());
    let first_new = positions.next;
    for patch in patches {
        let Some((last, parents)) = patch.path.split_last() else {
            continue;
        };
        let mut node = Node::Table(doc.as_table_mut());
        for (depth, segment) in parents.iter().enumerate() {
            let next = &patch.path[depth + 1];
            node = node
                .descend(segment, next, &mut positions)
                .ok_or_else(|| conflict_error(&patch.path[..=depth]))?;
        }
        node.set(last, &patch.value)
            .ok_or_else(|| conflict_error(&patch.path))?;
    }
    if positions.next > first_new {
        move_trailing_comments(doc, first_new);
    }
    Ok(())
}

fn conflict_error(path: &[Segment]) -> MmcpError {
    shape_error(path, "conflicts with the kind of the existing value")
}

/// Hands out header positions past every table already in the document.
struct TablePositions {
    next: usize,
}

impl TablePositions {
    fn after(root: &Table) -> Self {
        Self {
            next: max_position(root).map_or(0, |max| max + 1),
        }
    }

    fn table(&mut self) -> Table {
        let mut table = Table::new();
        table.set_implicit(true);
        table.set_position(self.next);
        self.next += 1;
        table
    }
}

fn max_position(table: &Table) -> Option<usize> {
    let mut max = table.position();
    for (_, item) in table.iter() {
        let child = match item {
            Item::Table(child) => max_position(child),
            Item::ArrayOfTables(tables) => tables.iter().filter_map(max_position).max(),
            _ => None,
        };
        max = max.max(child);
    }
    max
}

/// Comments at the end of the file are printed after every table. Once new
/// tables are appended, hang them in front of the first new header instead
/// so they stay under the content they followed.
fn move_trailing_comments(doc: &mut DocumentMut, first_new: usize) {
    let trailing = doc.trailing().as_str().unwrap_or_default().to_owned();
    if trailing.trim().is_empty() {
        return;
    }
    let mut visible = Vec::new();
    header_positions(doc.as_table(), &mut visible);
    let Some(position) = visible.into_iter().filter(|p| *p >= first_new).min() else {
        return;
    };
    let Some(table) = table_at_mut(doc.as_table_mut(), position) else {
        return;
    };

    let mut prefix = trailing;
    if !prefix.ends_with('\n') {
        prefix.push('\n');
    }
    if !prefix.ends_with("\n\n") {
        prefix.push('\n');
    }
    table.decor_mut().set_prefix(prefix);
    doc.set_trailing("");
}

/// Positions of tables that get a `[header]` line when printed.
fn header_positions(table: &Table, out: &mut Vec<usize>) {
    let has_values = table.iter().any(|(_, item)| item.is_value());
    if let Some(position) = table.position() {
        if !table.is_implicit() || has_values {
            out.push(position);
        }
    }
    for (_, item) in table.iter() {
        if let Item::Table(child) = item {
            header_positions(child, out);
        }
    }
}

fn table_at_mut(table: &mut Table, position: usize) -> Option<&mut Table> {
    if table.position() == Some(position) {
        return Some(table);
    }
    for (_, item) in table.iter_mut() {
        if let Item::Table(child) = item {
            if let Some(found) = table_at_mut(child, position) {
                return Some(found);
            }
        }
    }
    None
}

/// A mutable container somewhere in the document.
enum Node<'a> {
    Table(&'a mut Table),
    Inline(&'a mut InlineTable),
    Array(&'a mut Array),
    Tables(&'a mut ArrayOfTables),
}

impl<'a> Node<'a> {
    /// Step into the child at `segment`, creating it only if missing. `next`
    /// decides what kind of container is expected. `None` when the existing
    /// child is of another kind.
    fn descend(
        self,
        segment: &Segment,
        next: &Segment,
        positions: &mut TablePositions,
    ) -> Option<Node<'a>> {
        let wants_index = matches!(next, Segment::Index(_));
        match (self, segment) {
            (Node::Table(table), Segment::Key(key)) => {
                if !table.contains_key(key) {
                    let item = if wants_index {
                        Item::Value(toml_edit::Value::Array(Array::new()))
                    } else {
                        Item::Table(positions.table())
                    };
                    table.insert(key, item);
                }
                match table.get_mut(key)? {
                    Item::Table(child) if !wants_index => Some(Node::Table(child)),
                    Item::ArrayOfTables(child) if wants_index => Some(Node::Tables(child)),
                    Item::Value(value) => Node::from_value(value, wants_index),
                    _ => None,
                }
            }
            (Node::Inline(table), Segment::Key(key)) => {
                if !table.contains_key(key) {
                    insert_inline(table, key, empty_container(wants_index));
                }
                Node::from_value(table.get_mut(key)?, wants_index)
            }
            (Node::Array(array), Segment::Index(idx)) => {
                let idx = *idx;
                while array.len() < idx {
                    array.push(InlineTable::new());
                }
                if idx == array.len() {
                    array.push(empty_container(wants_index));
                }
                Node::from_value(array.get_mut(idx)?, wants_index)
            }
            (Node::Tables(tables), Segment::Index(idx)) => {
                if wants_index {
                    return None;
                }
                while tables.len() <= *idx {
                    tables.push(Table::new());
                }
                tables.get_mut(*idx).map(Node::Table)
            }
            _ => None,
        }
    }

    fn from_value(value: &'a mut toml_edit::Value, wants_index: bool) -> Option<Node<'a>> {
        match value {
            toml_edit::Value::InlineTable(table) if !wants_index => Some(Node::Inline(table)),
            toml_edit::Value::Array(array) if wants_index => Some(Node::Array(array)),
            _ => None,
        }
    }

    /// Set or remove the leaf at `segment`. `None` when a table sits there.
    fn set(self, segment: &Segment, value: &PatchValue) -> Option<()> {
        match (self, segment) {
            (Node::Table(table), Segment::Key(key)) => {
                let Some(new) = to_toml_value(value) else {
                    table.remove(key);
                    return Some(());
                };
                match table.get_mut(key) {
                    None | Some(Item::None) => {
                        table.insert(key, Item::Value(new));
                    }
                    Some(Item::Value(existing)) if !existing.is_inline_table() => {
                        replace_value(existing, new)
                    }
                    Some(_) => return None,
                }
            }
            (Node::Inline(table), Segment::Key(key)) => {
                let Some(new) = to_toml_value(value) else {
                    table.remove(key);
                    return Some(());
                };
                match table.get_mut(key) {
                    None => insert_inline(table, key, new),
                    Some(existing) if !existing.is_inline_table() => replace_value(existing, new),
                    Some(_) => return None,
                }
            }
            (Node::Array(array), Segment::Index(idx)) => {
                let idx = *idx;
                let Some(new) = to_toml_value(value) else {
                    if idx < array.len() {
                        array.remove(idx);
                    }
                    return Some(());
                };
                while array.len() < idx {
                    array.push(InlineTable::new());
                }
                match array.get_mut(idx) {
                    None => array.push(new),
                    Some(existing) if !existing.is_inline_table() => replace_value(existing, new),
                    Some(_) => return None,
                }
            }
            _ => return None,
        }
        Some(())
    }
}

/// Append to an inline table, moving the closing padding (`{ a = 1 }`) from
/// the previous last value onto the new one.
fn insert_inline(table: &mut InlineTable, key: &str, mut value: toml_edit::Value) {
    if let Some((_, last)) = table.iter_mut().last() {
        let padding = last
            .decor()
            .suffix()
            .and_then(|suffix| suffix.as_str())
            .filter(|suffix| suffix.trim().is_empty())
            .map(str::to_owned);
        if let Some(padding) = padding {
            last.decor_mut().set_suffix("");
            value.decor_mut().set_suffix(padding);
        }
    }
    table.insert(key, value);
}

fn empty_container(array: bool) -> toml_edit::Value {
    if array {
        toml_edit::Value::Array(Array::new())
    } else {
        toml_edit::Value::InlineTable(InlineTable::new())
    }
}

fn to_toml_value(value: &PatchValue) -> Option<toml_edit::Value> {
    match value {
        PatchValue::Scalar(scalar) => Some(scalar_value(scalar)),
        PatchValue::Array(items) => Some(toml_edit::Value::Array(
            items.iter().map(scalar_value).collect(),
        )),
        PatchValue::Unset => None,
    }
}

fn scalar_value(scalar: &Scalar) -> toml_edit::Value {
    match scalar {
        Scalar::String(s) => toml_edit::Value::from(s.as_str()),
        Scalar::Integer(i) => toml_edit::Value::from(*i),
        Scalar::Float(f) => toml_edit::Value::from(*f),
        Scalar::Boolean(b) => toml_edit::Value::from(*b),
    }
}

/// Swap in `new` while keeping the surrounding whitespace and comments of
/// `existing`. Arrays also keep their element layout.
fn replace_value(existing: &mut toml_edit::Value, mut new: toml_edit::Value) {
    if let (toml_edit::Value::Array(old), toml_edit::Value::Array(fresh)) = (&*existing, &mut new) {
        restyle_array(old, fresh);
    }
    *new.decor_mut() = existing.decor().clone();
    *existing = new;
}

fn restyle_array(old: &Array, new: &mut Array) {
    let len = new.len();
    for (idx, value) in new.iter_mut().enumerate() {
        let source = if idx < old.len() {
            old.get(idx)
        } else if old.len() >= 2 {
            old.get(old.len() - 1)
        } else {
            None
        };
        if let Some(source) = source {
            *value.decor_mut() = source.decor().clone();
        }
    }
    new.set_trailing(old.trailing().clone());
    new.set_trailing_comma(old.trailing_comma() && len > 0);
}
