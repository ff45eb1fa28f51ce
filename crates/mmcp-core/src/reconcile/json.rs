//! Merge and replace of the servers object in JSON agent configs.

use serde_json::{Map, Value};

use super::ApplyMode;
use crate::config::{ServerDefinition, ServerMap};
use crate::error::MmcpError;

/// Reconcile the `servers_key` object of a JSON config with `servers`.
///
/// Keys other than `servers_key` are never touched. In [`ApplyMode::Merge`]
/// each target server is overlaid field by field onto the existing entry
/// (a `null` field removes it); other entries stay. In
/// [`ApplyMode::Replace`] the servers object becomes exactly the target set
/// and is dropped entirely when the target is empty.
pub fn reconcile_json(
    mut native: Map<String, Value>,
    servers_key: &str,
    servers: &ServerMap,
    mode: ApplyMode,
) -> Result<Map<String, Value>, MmcpError> {
    match mode {
        ApplyMode::Merge => {
            if servers.is_empty() {
                return Ok(native);
            }
            let container = native
                .entry(servers_key)
                .or_insert_with(|| Value::Object(Map::new()));
            let Value::Object(entries) = container else {
                return Err(MmcpError::invalid_agent_config(
                    servers_key,
                    "expected the servers entry to be an object",
                ));
            };
            for (name, server) in servers.iter() {
                match entries.get_mut(name) {
                    Some(Value::Object(existing)) => overlay(existing, server),
                    _ => {
                        entries.insert(name.to_string(), Value::Object(fresh_entry(server)));
                    }
                }
            }
        }
        ApplyMode::Replace => {
            if servers.is_empty() {
                native.shift_remove(servers_key);
            } else {
                let entries = servers
                    .iter()
                    .map(|(name, server)| (name.to_string(), Value::Object(fresh_entry(server))))
                    .collect();
                native.insert(servers_key.to_string(), Value::Object(entries));
            }
        }
    }
    Ok(native)
}

fn overlay(existing: &mut Map<String, Value>, server: &ServerDefinition) {
    for (field, value) in server.fields() {
        if value.is_null() {
            existing.shift_remove(field);
        } else {
            existing.insert(field.clone(), value.clone());
        }
    }
}

fn fresh_entry(server: &ServerDefinition) -> Map<String, Value> {
    server
        .fields()
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect()
}
