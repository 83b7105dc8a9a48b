//! Containers: generic lists, pairlist chains and data frames.
//!
//! Lists convert their element values through the full construction cascade,
//! so nested records become nested named lists. Frames are lists that the
//! foreign runtime has blessed: construction always round-trips through an
//! evaluated `as.data.frame` call rather than setting the class attribute by
//! hand, so the runtime's own validation decides eligibility.

use rbridge_engine::engine;
use rbridge_engine::{EngineError, EngineResult, Handle, Tag};

use crate::data::{named_parts, ConvertOptions, ObjectOptions, RData, RDataNode};
use crate::error::{BridgeError, BridgeResult};
use crate::protect::ProtectScope;
use crate::robj::{child_data, object_from_entries, wrapper, RAny, RObject};

wrapper!(
    /// A generic list.
    RList,
    "list",
    Tag::List
);

impl RList {
    /// Build a list, running every value through the construction cascade.
    ///
    /// `names`, when given, must be parallel to `values`.
    pub fn new(values: Vec<RData>, names: Option<Vec<String>>) -> BridgeResult<Self> {
        if let Some(names) = &names {
            if names.len() != values.len() {
                return Err(BridgeError::BadNamesLength);
            }
        }

        let mut scope = ProtectScope::new();
        let mut handles = Vec::with_capacity(values.len());
        for value in values {
            // List construction converts nested records to nested lists,
            // unlike the generic cascade which reserves records for frames.
            let obj = match value {
                RData::Record(entries) => RObject::List(RList::from_record(entries)?),
                other => RObject::from_data(other)?,
            };
            handles.push(scope.add(obj.handle()));
        }

        let list = engine::with(|rt| -> EngineResult<Handle> {
            let list = rt.alloc_vector(Tag::List, handles.len())?;
            for (i, &h) in handles.iter().enumerate() {
                rt.set_list_elt(list, i, h)?;
            }
            Ok(list)
        })?;
        scope.add(list);

        let wrapped = RList(RAny::from_handle(list));
        if let Some(names) = names {
            let names: Vec<Option<String>> = names.into_iter().map(Some).collect();
            wrapped.set_names(Some(&names))?;
        }
        Ok(wrapped)
    }

    /// Build a named list from record entries.
    pub fn from_record(entries: Vec<(String, RData)>) -> BridgeResult<Self> {
        let (names, values) = named_parts(RData::Record(entries));
        RList::new(values, names)
    }

    /// Element at `i` (zero-based).
    pub fn elt(&self, i: usize) -> BridgeResult<RObject> {
        let h = engine::with(|rt| rt.list_elt(self.handle(), i))?;
        RObject::wrap(h)
    }

    /// Whether the foreign runtime classes this list as a data frame.
    pub fn is_data_frame(&self) -> BridgeResult<bool> {
        Ok(self
            .class()?
            .to_array()?
            .iter()
            .any(|c| c.as_deref() == Some("data.frame")))
    }

    /// Name/element pairs in order.
    pub fn entries(&self) -> BridgeResult<Vec<(Option<String>, RObject)>> {
        let n = self.len()?;
        let names = self.names()?;
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let name = names.as_ref().and_then(|names| names[i].clone());
            out.push((name, self.elt(i)?));
        }
        Ok(out)
    }

    pub(crate) fn node(&self, level: i32, opts: &ConvertOptions) -> BridgeResult<RDataNode> {
        let n = self.len()?;
        let mut values = Vec::with_capacity(n);
        for i in 0..n {
            values.push(child_data(self.elt(i)?, level + 1, opts)?);
        }
        Ok(RDataNode::List {
            names: self.names()?,
            values,
        })
    }

    /// Elements as host values, bounded by `opts.depth`.
    pub fn to_array(&self, opts: &ConvertOptions) -> BridgeResult<Vec<RData>> {
        let n = self.len()?;
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            out.push(child_data(self.elt(i)?, 1, opts)?);
        }
        Ok(out)
    }

    /// Collapse to a keyed record per `opts`.
    pub fn to_object(&self, opts: &ObjectOptions) -> BridgeResult<Vec<(String, RData)>> {
        let conv = ConvertOptions { depth: opts.depth };
        let mut entries = Vec::new();
        for (name, obj) in self.entries()? {
            entries.push((name, child_data(obj, 1, &conv)?));
        }
        object_from_entries(entries, opts)
    }

    /// Row-oriented output: one record per row, built from equal-length
    /// atomic columns.
    pub fn to_records(&self) -> BridgeResult<Vec<Vec<(String, RData)>>> {
        let mut columns: Vec<(String, Vec<RData>)> = Vec::new();
        for (name, obj) in self.entries()? {
            let name = match name {
                Some(name) if !name.is_empty() => name,
                _ => return Err(BridgeError::EmptyKey),
            };
            columns.push((name, column_scalars(&obj)?));
        }
        let n_rows = columns.first().map_or(0, |(_, v)| v.len());
        if columns.iter().any(|(_, v)| v.len() != n_rows) {
            return Err(BridgeError::NotEligibleFrame(
                "columns differ in length".to_string(),
            ));
        }
        let mut rows = Vec::with_capacity(n_rows);
        for r in 0..n_rows {
            rows.push(
                columns
                    .iter()
                    .map(|(name, values)| (name.clone(), values[r].clone()))
                    .collect(),
            );
        }
        Ok(rows)
    }
}

fn column_scalars(obj: &RObject) -> BridgeResult<Vec<RData>> {
    Ok(match obj {
        RObject::Logical(v) => v.to_array()?.into_iter().map(RData::from).collect(),
        RObject::Integer(v) => v.to_array()?.into_iter().map(RData::from).collect(),
        RObject::Double(v) => v.to_array()?.into_iter().map(RData::from).collect(),
        RObject::Complex(v) => v.to_array()?.into_iter().map(RData::from).collect(),
        RObject::Character(v) => v.to_array()?.into_iter().map(RData::from).collect(),
        RObject::Raw(v) => v
            .to_array()?
            .into_iter()
            .map(|b| RData::Int(b as i32))
            .collect(),
        _ => {
            return Err(BridgeError::NotEligibleFrame(
                "columns must be atomic vectors".to_string(),
            ))
        }
    })
}

/// Row view of a record sequence, when every record carries the same key set
/// and every value is a scalar. Key order within a record does not matter;
/// rows come back normalized to the first record's key order.
pub(crate) fn frame_rows(items: &[RData]) -> Option<Vec<Vec<(String, RData)>>> {
    let first_keys: Vec<&String> = match items.first() {
        Some(RData::Record(entries)) => entries.iter().map(|(k, _)| k).collect(),
        _ => return None,
    };
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let entries = match item {
            RData::Record(entries) => entries,
            _ => return None,
        };
        // Set inclusion in both directions.
        if entries.len() != first_keys.len()
            || entries.iter().any(|(key, _)| !first_keys.contains(&key))
        {
            return None;
        }
        let mut row = Vec::with_capacity(first_keys.len());
        for &key in &first_keys {
            let (_, value) = entries.iter().find(|(k, _)| k == key)?;
            if !value.is_scalar() {
                return None;
            }
            row.push((key.clone(), value.clone()));
        }
        rows.push(row);
    }
    Some(rows)
}

wrapper!(
    /// A pairlist chain. The empty chain is the absence object, so a null
    /// handle also wraps.
    RPairlist,
    "pairlist",
    Tag::Pairlist | Tag::Null
);

impl RPairlist {
    /// Build a pairlist, threading one cell per entry.
    pub fn new(entries: Vec<(Option<String>, RData)>) -> BridgeResult<Self> {
        let mut scope = ProtectScope::new();
        let mut items: Vec<(Option<String>, Handle)> = Vec::with_capacity(entries.len());
        for (name, value) in entries {
            let obj = RObject::from_data(value)?;
            items.push((name, scope.add(obj.handle())));
        }

        let chain = engine::with(|rt| -> EngineResult<Handle> {
            let chain = rt.alloc_list(items.len());
            let mut cur = chain;
            for (name, h) in &items {
                rt.set_car(cur, *h)?;
                if let Some(name) = name {
                    let sym = rt.install(name);
                    rt.set_tag(cur, sym)?;
                }
                cur = rt.cdr(cur)?;
            }
            Ok(chain)
        })?;
        Ok(RPairlist(RAny::from_handle(chain)))
    }

    /// First element of the head cell.
    pub fn car(&self) -> BridgeResult<RObject> {
        let h = engine::with(|rt| rt.car(self.handle()))?;
        RObject::wrap(h)
    }

    /// Rest of the chain.
    pub fn cdr(&self) -> BridgeResult<RPairlist> {
        let h = engine::with(|rt| rt.cdr(self.handle()))?;
        RPairlist::wrap(h)
    }

    /// Name tag of the head cell, if any.
    pub fn tag(&self) -> BridgeResult<Option<RObject>> {
        let h = engine::with(|rt| rt.tag_of(self.handle()))?;
        if h == Handle::NULL {
            Ok(None)
        } else {
            Ok(Some(RObject::wrap(h)?))
        }
    }

    /// Replace the first element of the head cell.
    pub fn set_car(&self, value: RAny) -> BridgeResult<()> {
        let handle = self.handle();
        engine::with(|rt| rt.set_car(handle, value.handle()))?;
        Ok(())
    }

    fn cells(&self) -> BridgeResult<Vec<(Option<String>, Handle)>> {
        let handle = self.handle();
        Ok(engine::with(|rt| -> EngineResult<Vec<(Option<String>, Handle)>> {
            let mut out = Vec::new();
            let mut cur = handle;
            while rt.type_of(cur)? != Tag::Null {
                let tag = rt.tag_of(cur)?;
                let name = if tag == Handle::NULL {
                    None
                } else {
                    Some(rt.symbol_name(tag)?)
                };
                out.push((name, rt.car(cur)?));
                cur = rt.cdr(cur)?;
            }
            Ok(out)
        })?)
    }

    /// Name/value pairs in chain order.
    pub fn entries(&self) -> BridgeResult<Vec<(Option<String>, RObject)>> {
        self.cells()?
            .into_iter()
            .map(|(name, h)| Ok((name, RObject::wrap(h)?)))
            .collect()
    }

    pub(crate) fn node(&self, level: i32, opts: &ConvertOptions) -> BridgeResult<RDataNode> {
        let entries = self.entries()?;
        let names = if entries.iter().any(|(n, _)| n.is_some()) {
            Some(entries.iter().map(|(n, _)| n.clone()).collect())
        } else {
            None
        };
        let mut values = Vec::with_capacity(entries.len());
        for (_, obj) in entries {
            values.push(child_data(obj, level + 1, opts)?);
        }
        Ok(RDataNode::Pairlist { names, values })
    }

    /// Collapse to a keyed record per `opts`.
    pub fn to_object(&self, opts: &ObjectOptions) -> BridgeResult<Vec<(String, RData)>> {
        let conv = ConvertOptions { depth: opts.depth };
        let mut entries = Vec::new();
        for (name, obj) in self.entries()? {
            entries.push((name, child_data(obj, 1, &conv)?));
        }
        object_from_entries(entries, opts)
    }
}

/// A list the foreign runtime classes as a data frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RDataFrame(RList);

impl RDataFrame {
    /// Wrap `h`, validating both the list tag and the frame class.
    pub fn wrap(h: Handle) -> BridgeResult<Self> {
        let list = RList::wrap(h)?;
        if !list.is_data_frame()? {
            return Err(BridgeError::UnexpectedType {
                expected: "data.frame",
                actual: "list".to_string(),
            });
        }
        Ok(RDataFrame(list))
    }

    /// The wrapped handle.
    pub fn handle(&self) -> Handle {
        self.0.handle()
    }

    /// The untyped view.
    pub fn any(&self) -> RAny {
        self.0 .0
    }

    /// The frame as a plain list of columns.
    pub fn list(&self) -> RList {
        self.0
    }

    /// Column-oriented construction: each entry is one named column.
    ///
    /// Every column must be a sequence or a binary buffer; bare scalars and
    /// nested records are not columns. The columns are then marshalled into
    /// a list and validated by an evaluated `as.data.frame` call; its
    /// rejections surface as eligibility errors too.
    pub fn from_record(columns: Vec<(String, RData)>) -> BridgeResult<Self> {
        if columns.is_empty() || columns.iter().any(|(name, _)| name.is_empty()) {
            return Err(BridgeError::NotEligibleFrame(
                "frame construction needs named columns".to_string(),
            ));
        }
        if columns
            .iter()
            .any(|(_, value)| !matches!(value, RData::Array(_) | RData::Bytes(_)))
        {
            return Err(BridgeError::NotEligibleFrame(
                "frame columns must be sequences".to_string(),
            ));
        }
        let list = RList::from_record(columns)?;
        let mut scope = ProtectScope::new();
        let list_h = scope.add(list.handle());

        let frame = engine::with(|rt| -> EngineResult<Handle> {
            let op = rt.install("as.data.frame");
            let call = rt.lang2(op, list_h)?;
            rt.protect(call);
            let result = rt.eval(call, rt.base_env());
            rt.unprotect(1)?;
            result
        })
        .map_err(|err| match err {
            EngineError::Eval(msg) => BridgeError::NotEligibleFrame(msg),
            other => other.into(),
        })?;
        RDataFrame::wrap(frame)
    }

    /// Row-oriented construction from consistent records.
    ///
    /// Rows must share one key set; key order within a row is free, columns
    /// are gathered by key in the first row's order.
    pub fn from_records(rows: &[Vec<(String, RData)>]) -> BridgeResult<Self> {
        let first = rows.first().ok_or_else(|| {
            BridgeError::NotEligibleFrame("no rows to build a frame from".to_string())
        })?;
        let keys: Vec<&String> = first.iter().map(|(k, _)| k).collect();

        let mut columns: Vec<(String, Vec<RData>)> = keys
            .iter()
            .map(|&k| (k.clone(), Vec::with_capacity(rows.len())))
            .collect();
        for row in rows {
            if row.len() != keys.len() || row.iter().any(|(key, _)| !keys.contains(&key)) {
                return Err(BridgeError::NotEligibleFrame(
                    "rows do not share a key set".to_string(),
                ));
            }
            for (&key, (_, column)) in keys.iter().zip(columns.iter_mut()) {
                let (_, value) = row.iter().find(|(k, _)| k == key).ok_or_else(|| {
                    BridgeError::NotEligibleFrame("rows do not share a key set".to_string())
                })?;
                column.push(value.clone());
            }
        }

        Self::from_record(
            columns
                .into_iter()
                .map(|(name, values)| (name, RData::Array(values)))
                .collect(),
        )
    }

    /// Number of rows, from the first column.
    pub fn n_rows(&self) -> BridgeResult<usize> {
        if self.0.len()? == 0 {
            return Ok(0);
        }
        self.0.elt(0)?.any().len()
    }

    /// Number of columns.
    pub fn n_cols(&self) -> BridgeResult<usize> {
        self.0.len()
    }

    /// Row-oriented output.
    pub fn to_records(&self) -> BridgeResult<Vec<Vec<(String, RData)>>> {
        self.0.to_records()
    }
}

impl std::ops::Deref for RDataFrame {
    type Target = RList;

    fn deref(&self) -> &RList {
        &self.0
    }
}

impl From<RDataFrame> for RAny {
    fn from(frame: RDataFrame) -> RAny {
        frame.any()
    }
}
