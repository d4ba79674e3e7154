//! Data source ingestion: REST JSON -> validated `OrgNode` tree.
//!
//! Three payload shapes are accepted:
//!   - a nested tree object (`{"id", "type", "children": [...]}`)
//!   - a flat array of records linked by `parentId`
//!   - paginated children pages (`{"count", "next", "results": [...]}`),
//!     fed incrementally through `TreeAssembler`
//!
//! Numeric ids are normalised to strings. Structural problems (duplicate
//! ids, parent cycles, dangling parents, several roots) are rejected here,
//! before the layout kernel ever sees the tree.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use org_layout_engine::domain::{NodeMetadata, NodeType, OrgNode};
use org_layout_engine::LayoutError;

use crate::error::{Result, RuntimeError};

// ── Field parsing ──────────────────────────────────────────────

/// String or integer id; anything else is rejected.
fn parse_id(v: &Value, field: &str) -> Result<Option<String>> {
    match v {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Some(n.to_string())),
        other => Err(RuntimeError::InvalidRecord(format!(
            "{field} must be a string or integer, got {other}"
        ))),
    }
}

/// Accepts snake_case, camelCase and a few backend aliases.
pub fn parse_node_type(raw: &str) -> Result<NodeType> {
    let normalised: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    match normalised.as_str() {
        "company" | "root" => Ok(NodeType::Company),
        "division" => Ok(NodeType::Division),
        "department" | "dept" => Ok(NodeType::Department),
        "team" => Ok(NodeType::Team),
        "person" | "employee" => Ok(NodeType::Person),
        "jobrole" | "role" => Ok(NodeType::JobRole),
        _ => Err(RuntimeError::InvalidRecord(format!(
            "unknown node type {raw:?}"
        ))),
    }
}

fn parse_metadata(v: Option<&Value>) -> NodeMetadata {
    let text = |key: &str| {
        v.and_then(|m| m.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    NodeMetadata {
        category: text("category"),
        color: text("color"),
        icon: text("icon"),
    }
}

/// Parse one node's own fields. `children` is left empty.
pub fn record_from_value(v: &Value) -> Result<OrgNode> {
    if !v.is_object() {
        return Err(RuntimeError::InvalidRecord(format!(
            "expected an object, got {v}"
        )));
    }

    let id = parse_id(v.get("id").unwrap_or(&Value::Null), "id")?
        .ok_or_else(|| RuntimeError::InvalidRecord("record without id".to_string()))?;

    let parent_id = match v.get("parentId").or_else(|| v.get("parent_id")) {
        Some(p) => parse_id(p, "parentId")?,
        None => None,
    };

    let node_type = match v.get("type").and_then(Value::as_str) {
        Some(t) => parse_node_type(t)?,
        None => {
            return Err(RuntimeError::InvalidRecord(format!(
                "record {id:?} has no type"
            )))
        }
    };

    Ok(OrgNode {
        name: v
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        id,
        node_type,
        parent_id,
        children: Vec::new(),
        metadata: parse_metadata(v.get("metadata")),
    })
}

/// Parse a nested tree object, children included.
///
/// A child without `parentId` inherits its container's id.
pub fn node_from_value(v: &Value) -> Result<OrgNode> {
    let mut root = record_from_value(v)?;
    // (json, path of child indices from root)
    let mut stack: Vec<(&Value, Vec<usize>)> = vec![(v, Vec::new())];

    while let Some((json, path)) = stack.pop() {
        let kids = match json.get("children") {
            Some(Value::Array(kids)) => kids,
            Some(Value::Null) | None => continue,
            Some(other) => {
                return Err(RuntimeError::InvalidRecord(format!(
                    "children must be an array, got {other}"
                )))
            }
        };

        let mut target = &mut root;
        for &i in &path {
            target = &mut target.children[i];
        }
        for (i, kid) in kids.iter().enumerate() {
            let mut child = record_from_value(kid)?;
            if child.parent_id.is_none() {
                child.parent_id = Some(target.id.clone());
            }
            target.children.push(child);
            let mut child_path = path.clone();
            child_path.push(i);
            stack.push((kid, child_path));
        }
    }

    Ok(root)
}

// ── Flat assembly ──────────────────────────────────────────────

/// Link flat records into one tree. Children keep their input order.
///
/// Returns `Ok(None)` for no records.
pub fn assemble_tree(records: Vec<OrgNode>) -> Result<Option<OrgNode>> {
    if records.is_empty() {
        return Ok(None);
    }

    let mut index: BTreeMap<String, usize> = BTreeMap::new();
    for (i, r) in records.iter().enumerate() {
        if index.insert(r.id.clone(), i).is_some() {
            return Err(LayoutError::DuplicateId { id: r.id.clone() }.into());
        }
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut roots: Vec<usize> = Vec::new();
    for (i, r) in records.iter().enumerate() {
        match r.parent_id.as_deref() {
            None => roots.push(i),
            Some(p) => match index.get(p) {
                Some(&pi) => children[pi].push(i),
                None => {
                    return Err(RuntimeError::MissingParent {
                        id: r.id.clone(),
                        parent: p.to_string(),
                    })
                }
            },
        }
    }

    if roots.len() > 1 {
        return Err(RuntimeError::MultipleRoots(
            roots.iter().map(|&i| records[i].id.clone()).collect(),
        ));
    }

    // Pre-order from the root; anything unreached sits on a parent cycle.
    let mut order: Vec<usize> = Vec::with_capacity(records.len());
    if let Some(&root) = roots.first() {
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            order.push(i);
            stack.extend(children[i].iter().rev());
        }
    }
    if order.len() != records.len() {
        let reached: BTreeSet<usize> = order.iter().copied().collect();
        return match (0..records.len()).find(|i| !reached.contains(i)) {
            Some(start) => Err(cycle_error(&records, &index, start)),
            None => Err(RuntimeError::NoRoot),
        };
    }

    // Build bottom-up in reverse pre-order so children are finished first.
    let mut built: Vec<Option<OrgNode>> = records.into_iter().map(Some).collect();
    for &i in order.iter().rev() {
        let kids: Vec<OrgNode> = children[i]
            .iter()
            .filter_map(|&c| built[c].take())
            .collect();
        if let Some(node) = built[i].as_mut() {
            node.children = kids;
        }
    }

    let root = built[order[0]].take().ok_or(RuntimeError::NoRoot)?;
    debug!(nodes = root.node_count(), root = %root.id, "flat records assembled");
    Ok(Some(root))
}

/// Walk parent links from `start` until an id repeats.
fn cycle_error(records: &[OrgNode], index: &BTreeMap<String, usize>, start: usize) -> RuntimeError {
    let mut path: Vec<&str> = Vec::new();
    let mut seen: BTreeSet<usize> = BTreeSet::new();
    let mut current = start;
    while seen.insert(current) {
        path.push(records[current].id.as_str());
        match records[current]
            .parent_id
            .as_deref()
            .and_then(|p| index.get(p))
        {
            Some(&p) => current = p,
            None => break,
        }
    }
    let id = records[current].id.clone();
    path.push(id.as_str());
    let detail = path.join(" -> ");
    LayoutError::Cycle { id, path: detail }.into()
}

// ── Paged loading ──────────────────────────────────────────────

/// Incremental assembly from lazily fetched pages of children.
#[derive(Debug, Default)]
pub struct TreeAssembler {
    records: Vec<OrgNode>,
    pages: usize,
}

impl TreeAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the root (or any single) record.
    pub fn add_record(&mut self, v: &Value) -> Result<()> {
        self.records.push(record_from_value(v)?);
        Ok(())
    }

    /// Add one page of children for `parent_id`. Records without their own
    /// `parentId` are stamped with `parent_id`.
    ///
    /// The page is either a bare array or a paginated object with a
    /// `results` array. Returns the `next` page URL, if any.
    pub fn add_page(&mut self, parent_id: Option<&str>, page: &Value) -> Result<Option<String>> {
        let (items, next) = match page {
            Value::Array(items) => (items.as_slice(), None),
            Value::Object(map) => {
                let items = map
                    .get("results")
                    .and_then(Value::as_array)
                    .ok_or_else(|| {
                        RuntimeError::InvalidRecord("page without results array".to_string())
                    })?;
                let next = map.get("next").and_then(Value::as_str).map(str::to_string);
                (items.as_slice(), next)
            }
            other => {
                return Err(RuntimeError::InvalidRecord(format!(
                    "page must be an array or object, got {other}"
                )))
            }
        };

        for item in items {
            let mut record = record_from_value(item)?;
            if record.parent_id.is_none() {
                record.parent_id = parent_id.map(str::to_string);
            }
            self.records.push(record);
        }
        self.pages += 1;
        debug!(page = self.pages, added = items.len(), has_next = next.is_some(), "children page added");
        Ok(next)
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn finish(self) -> Result<Option<OrgNode>> {
        assemble_tree(self.records)
    }
}

// ── Documents ──────────────────────────────────────────────────

/// Interpret a whole JSON document by shape:
/// `null` -> empty tree, array or `results` page -> flat records,
/// object -> nested tree.
pub fn parse_document(doc: &Value) -> Result<Option<OrgNode>> {
    match doc {
        Value::Null => Ok(None),
        Value::Array(_) => {
            let mut asm = TreeAssembler::new();
            asm.add_page(None, doc)?;
            asm.finish()
        }
        Value::Object(map) if map.contains_key("results") => {
            let mut asm = TreeAssembler::new();
            asm.add_page(None, doc)?;
            asm.finish()
        }
        Value::Object(_) => node_from_value(doc).map(Some),
        other => Err(RuntimeError::InvalidRecord(format!(
            "unsupported document: {other}"
        ))),
    }
}

/// Read and parse a tree document from disk.
pub fn load_tree_file(path: &Path) -> Result<Option<OrgNode>> {
    let data = fs::read_to_string(path)?;
    let doc: Value = serde_json::from_str(&data)?;
    let tree = parse_document(&doc)?;
    info!(
        path = %path.display(),
        nodes = tree.as_ref().map(OrgNode::node_count).unwrap_or(0),
        "tree loaded from file"
    );
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_ids_normalised() {
        let node = record_from_value(&json!({"id": 42, "parentId": 7, "type": "team"})).unwrap();
        assert_eq!(node.id, "42");
        assert_eq!(node.parent_id.as_deref(), Some("7"));
        assert_eq!(node.name, "");
    }

    #[test]
    fn test_node_type_aliases() {
        assert_eq!(parse_node_type("jobRole").unwrap(), NodeType::JobRole);
        assert_eq!(parse_node_type("job_role").unwrap(), NodeType::JobRole);
        assert_eq!(parse_node_type("DEPT").unwrap(), NodeType::Department);
        assert!(parse_node_type("planet").is_err());
    }

    #[test]
    fn test_nested_children_inherit_parent() {
        let doc = json!({
            "id": "c", "type": "company", "name": "ACME",
            "children": [
                {"id": "d", "type": "division", "children": [{"id": "t", "type": "team"}]},
                {"id": "e", "type": "division"}
            ]
        });
        let root = node_from_value(&doc).unwrap();
        assert_eq!(root.node_count(), 4);
        assert_eq!(root.children[0].children[0].parent_id.as_deref(), Some("d"));
        assert_eq!(root.children[1].id, "e");
    }

    #[test]
    fn test_flat_records_keep_order() {
        let records = vec![
            record_from_value(&json!({"id": "b", "parentId": "a", "type": "team"})).unwrap(),
            record_from_value(&json!({"id": "a", "type": "company"})).unwrap(),
            record_from_value(&json!({"id": "c", "parentId": "a", "type": "team"})).unwrap(),
        ];
        let root = assemble_tree(records).unwrap().unwrap();
        assert_eq!(root.id, "a");
        let ids: Vec<&str> = root.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_parent_cycle_rejected() {
        let records = vec![
            record_from_value(&json!({"id": "root", "type": "company"})).unwrap(),
            record_from_value(&json!({"id": "x", "parentId": "y", "type": "team"})).unwrap(),
            record_from_value(&json!({"id": "y", "parentId": "x", "type": "team"})).unwrap(),
        ];
        match assemble_tree(records) {
            Err(RuntimeError::Layout(LayoutError::Cycle { path, .. })) => {
                assert_eq!(path, "x -> y -> x");
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_parent_rejected() {
        let records = vec![
            record_from_value(&json!({"id": "r", "type": "company"})).unwrap(),
            record_from_value(&json!({"id": "s", "parentId": "s", "type": "team"})).unwrap(),
        ];
        assert!(matches!(
            assemble_tree(records),
            Err(RuntimeError::Layout(LayoutError::Cycle { .. }))
        ));
    }

    #[test]
    fn test_all_cyclic_is_cycle_not_panic() {
        let records = vec![
            record_from_value(&json!({"id": "x", "parentId": "y", "type": "team"})).unwrap(),
            record_from_value(&json!({"id": "y", "parentId": "x", "type": "team"})).unwrap(),
        ];
        assert!(matches!(
            assemble_tree(records),
            Err(RuntimeError::Layout(LayoutError::Cycle { .. }))
        ));
    }

    #[test]
    fn test_structural_errors() {
        let dup = vec![
            record_from_value(&json!({"id": "a", "type": "company"})).unwrap(),
            record_from_value(&json!({"id": "a", "type": "team"})).unwrap(),
        ];
        assert!(matches!(
            assemble_tree(dup),
            Err(RuntimeError::Layout(LayoutError::DuplicateId { .. }))
        ));

        let dangling = vec![
            record_from_value(&json!({"id": "a", "type": "company"})).unwrap(),
            record_from_value(&json!({"id": "b", "parentId": "zz", "type": "team"})).unwrap(),
        ];
        assert!(matches!(
            assemble_tree(dangling),
            Err(RuntimeError::MissingParent { .. })
        ));

        let two_roots = vec![
            record_from_value(&json!({"id": "a", "type": "company"})).unwrap(),
            record_from_value(&json!({"id": "b", "type": "company"})).unwrap(),
        ];
        assert!(matches!(
            assemble_tree(two_roots),
            Err(RuntimeError::MultipleRoots(_))
        ));
    }

    #[test]
    fn test_paged_assembly() {
        let mut asm = TreeAssembler::new();
        asm.add_record(&json!({"id": 1, "type": "company", "name": "HQ"})).unwrap();
        let next = asm
            .add_page(
                Some("1"),
                &json!({"count": 3, "next": "/api/org/1/children?page=2", "results": [
                    {"id": 2, "type": "division"},
                    {"id": 3, "type": "division"}
                ]}),
            )
            .unwrap();
        assert_eq!(next.as_deref(), Some("/api/org/1/children?page=2"));
        let next = asm
            .add_page(Some("1"), &json!({"count": 3, "next": null, "results": [{"id": 4, "type": "division"}]}))
            .unwrap();
        assert!(next.is_none());
        asm.add_page(Some("2"), &json!([{"id": 5, "type": "person", "name": "Kim"}])).unwrap();
        assert_eq!(asm.record_count(), 5);

        let root = asm.finish().unwrap().unwrap();
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.children[0].children[0].name, "Kim");
    }

    #[test]
    fn test_parse_document_shapes() {
        assert!(parse_document(&Value::Null).unwrap().is_none());
        assert!(parse_document(&json!([])).unwrap().is_none());
        let nested = parse_document(&json!({"id": "a", "type": "team"})).unwrap().unwrap();
        assert_eq!(nested.id, "a");
        assert!(parse_document(&json!("nope")).is_err());
    }
}
