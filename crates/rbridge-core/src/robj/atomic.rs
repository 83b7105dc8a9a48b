//! Atomic vector wrappers.
//!
//! Construction is a fast path: elements are encoded host-side (including
//! each kind's missing-value encoding) and written into a freshly allocated
//! vector in one primitive call, with no evaluation. Conversion back decodes
//! the raw elements and applies a missingness mask obtained from a single
//! `is.na` evaluation per vector.

use rbridge_engine::engine;
use rbridge_engine::heap::{na_real, NA_INTEGER};
use rbridge_engine::{EngineError, EngineResult, Handle, Tag};

use crate::data::{Complex, ObjectOptions, RData, RDataNode};
use crate::error::{BridgeError, BridgeResult};
use crate::robj::{detect_missing, object_from_entries, wrapper, RAny};

fn out_of_bounds() -> BridgeError {
    BridgeError::Engine(EngineError::Eval("subscript out of bounds".to_string()))
}

fn entry_names(
    names: Option<Vec<Option<String>>>,
    len: usize,
) -> Vec<Option<String>> {
    match names {
        Some(names) => names,
        None => vec![None; len],
    }
}

wrapper!(
    /// A logical vector.
    RLogical,
    "logical vector",
    Tag::Logical
);

impl RLogical {
    /// Build a logical vector; `None` elements are missing.
    pub fn new(values: &[Option<bool>]) -> BridgeResult<Self> {
        let encoded: Vec<i32> = values
            .iter()
            .map(|v| v.map_or(NA_INTEGER, |b| b as i32))
            .collect();
        let h = engine::with(|rt| -> EngineResult<Handle> {
            let v = rt.alloc_vector(Tag::Logical, encoded.len())?;
            rt.fill_logical(v, &encoded)?;
            Ok(v)
        })?;
        Ok(RLogical(RAny::from_handle(h)))
    }

    /// Missingness mask, one `is.na` evaluation.
    pub fn detect_missing(&self) -> BridgeResult<Vec<bool>> {
        detect_missing(self.handle())
    }

    /// All elements, with missing ones as `None`.
    pub fn to_array(&self) -> BridgeResult<Vec<Option<bool>>> {
        let raw = engine::with(|rt| rt.logical_values(self.handle()))?;
        let missing = self.detect_missing()?;
        Ok(raw
            .into_iter()
            .zip(missing)
            .map(|(x, m)| if m { None } else { Some(x != 0) })
            .collect())
    }

    /// Element at `i` (zero-based).
    pub fn elt(&self, i: usize) -> BridgeResult<Option<bool>> {
        self.to_array()?.get(i).cloned().ok_or_else(out_of_bounds)
    }

    /// Narrow to a scalar: the vector must hold exactly one present element.
    pub fn to_scalar(&self) -> BridgeResult<bool> {
        let values = self.to_array()?;
        if values.len() != 1 {
            return Err(BridgeError::ScalarLength(values.len()));
        }
        values[0].ok_or(BridgeError::MissingScalar { kind: "logical" })
    }

    pub(crate) fn node(&self) -> BridgeResult<RDataNode> {
        Ok(RDataNode::Logical {
            names: self.names()?,
            values: self.to_array()?,
        })
    }

    /// Name/value pairs in element order.
    pub fn entries(&self) -> BridgeResult<Vec<(Option<String>, RData)>> {
        let values = self.to_array()?;
        let names = entry_names(self.names()?, values.len());
        Ok(names
            .into_iter()
            .zip(values)
            .map(|(n, v)| (n, RData::from(v)))
            .collect())
    }

    /// Collapse to a keyed record per `opts`.
    pub fn to_object(&self, opts: &ObjectOptions) -> BridgeResult<Vec<(String, RData)>> {
        object_from_entries(self.entries()?, opts)
    }
}

wrapper!(
    /// A 32-bit integer vector.
    RInteger,
    "integer vector",
    Tag::Integer
);

impl RInteger {
    /// Build an integer vector; `None` elements are missing.
    pub fn new(values: &[Option<i32>]) -> BridgeResult<Self> {
        let encoded: Vec<i32> = values.iter().map(|v| v.unwrap_or(NA_INTEGER)).collect();
        let h = engine::with(|rt| -> EngineResult<Handle> {
            let v = rt.alloc_vector(Tag::Integer, encoded.len())?;
            rt.fill_int(v, &encoded)?;
            Ok(v)
        })?;
        Ok(RInteger(RAny::from_handle(h)))
    }

    /// Missingness mask, one `is.na` evaluation.
    pub fn detect_missing(&self) -> BridgeResult<Vec<bool>> {
        detect_missing(self.handle())
    }

    /// All elements, with missing ones as `None`.
    pub fn to_array(&self) -> BridgeResult<Vec<Option<i32>>> {
        let raw = engine::with(|rt| rt.int_values(self.handle()))?;
        let missing = self.detect_missing()?;
        Ok(raw
            .into_iter()
            .zip(missing)
            .map(|(x, m)| if m { None } else { Some(x) })
            .collect())
    }

    /// Element at `i` (zero-based).
    pub fn elt(&self, i: usize) -> BridgeResult<Option<i32>> {
        self.to_array()?.get(i).cloned().ok_or_else(out_of_bounds)
    }

    /// Narrow to a scalar: the vector must hold exactly one present element.
    pub fn to_scalar(&self) -> BridgeResult<i32> {
        let values = self.to_array()?;
        if values.len() != 1 {
            return Err(BridgeError::ScalarLength(values.len()));
        }
        values[0].ok_or(BridgeError::MissingScalar { kind: "integer" })
    }

    pub(crate) fn node(&self) -> BridgeResult<RDataNode> {
        Ok(RDataNode::Integer {
            names: self.names()?,
            values: self.to_array()?,
        })
    }

    /// Name/value pairs in element order.
    pub fn entries(&self) -> BridgeResult<Vec<(Option<String>, RData)>> {
        let values = self.to_array()?;
        let names = entry_names(self.names()?, values.len());
        Ok(names
            .into_iter()
            .zip(values)
            .map(|(n, v)| (n, RData::from(v)))
            .collect())
    }

    /// Collapse to a keyed record per `opts`.
    pub fn to_object(&self, opts: &ObjectOptions) -> BridgeResult<Vec<(String, RData)>> {
        object_from_entries(self.entries()?, opts)
    }
}

wrapper!(
    /// A double-precision vector.
    RDouble,
    "double vector",
    Tag::Double
);

impl RDouble {
    /// Build a double vector; `None` elements are missing.
    ///
    /// A plain `NaN` is not missing and round-trips as `NaN`.
    pub fn new(values: &[Option<f64>]) -> BridgeResult<Self> {
        let encoded: Vec<f64> = values.iter().map(|v| v.unwrap_or_else(na_real)).collect();
        let h = engine::with(|rt| -> EngineResult<Handle> {
            let v = rt.alloc_vector(Tag::Double, encoded.len())?;
            rt.fill_real(v, &encoded)?;
            Ok(v)
        })?;
        Ok(RDouble(RAny::from_handle(h)))
    }

    /// Missingness mask, one `is.na` evaluation.
    pub fn detect_missing(&self) -> BridgeResult<Vec<bool>> {
        detect_missing(self.handle())
    }

    /// All elements, with missing ones as `None`.
    pub fn to_array(&self) -> BridgeResult<Vec<Option<f64>>> {
        let raw = engine::with(|rt| rt.real_values(self.handle()))?;
        let missing = self.detect_missing()?;
        Ok(raw
            .into_iter()
            .zip(missing)
            .map(|(x, m)| if m { None } else { Some(x) })
            .collect())
    }

    /// Element at `i` (zero-based).
    pub fn elt(&self, i: usize) -> BridgeResult<Option<f64>> {
        self.to_array()?.get(i).cloned().ok_or_else(out_of_bounds)
    }

    /// Narrow to a scalar: the vector must hold exactly one present element.
    pub fn to_scalar(&self) -> BridgeResult<f64> {
        let values = self.to_array()?;
        if values.len() != 1 {
            return Err(BridgeError::ScalarLength(values.len()));
        }
        values[0].ok_or(BridgeError::MissingScalar { kind: "double" })
    }

    pub(crate) fn node(&self) -> BridgeResult<RDataNode> {
        Ok(RDataNode::Double {
            names: self.names()?,
            values: self.to_array()?,
        })
    }

    /// Name/value pairs in element order.
    pub fn entries(&self) -> BridgeResult<Vec<(Option<String>, RData)>> {
        let values = self.to_array()?;
        let names = entry_names(self.names()?, values.len());
        Ok(names
            .into_iter()
            .zip(values)
            .map(|(n, v)| (n, RData::from(v)))
            .collect())
    }

    /// Collapse to a keyed record per `opts`.
    pub fn to_object(&self, opts: &ObjectOptions) -> BridgeResult<Vec<(String, RData)>> {
        object_from_entries(self.entries()?, opts)
    }
}

wrapper!(
    /// A complex vector.
    RComplex,
    "complex vector",
    Tag::Complex
);

impl RComplex {
    /// Build a complex vector; `None` elements are missing.
    pub fn new(values: &[Option<Complex>]) -> BridgeResult<Self> {
        let encoded: Vec<(f64, f64)> = values
            .iter()
            .map(|v| match v {
                Some(z) => (z.re, z.im),
                None => (na_real(), na_real()),
            })
            .collect();
        let h = engine::with(|rt| -> EngineResult<Handle> {
            let v = rt.alloc_vector(Tag::Complex, encoded.len())?;
            rt.fill_cplx(v, &encoded)?;
            Ok(v)
        })?;
        Ok(RComplex(RAny::from_handle(h)))
    }

    /// Missingness mask, one `is.na` evaluation.
    pub fn detect_missing(&self) -> BridgeResult<Vec<bool>> {
        detect_missing(self.handle())
    }

    /// All elements, with missing ones as `None`.
    pub fn to_array(&self) -> BridgeResult<Vec<Option<Complex>>> {
        let raw = engine::with(|rt| rt.cplx_values(self.handle()))?;
        let missing = self.detect_missing()?;
        Ok(raw
            .into_iter()
            .zip(missing)
            .map(|((re, im), m)| if m { None } else { Some(Complex::new(re, im)) })
            .collect())
    }

    /// Element at `i` (zero-based).
    pub fn elt(&self, i: usize) -> BridgeResult<Option<Complex>> {
        self.to_array()?.get(i).cloned().ok_or_else(out_of_bounds)
    }

    /// Narrow to a scalar: the vector must hold exactly one present element.
    pub fn to_scalar(&self) -> BridgeResult<Complex> {
        let values = self.to_array()?;
        if values.len() != 1 {
            return Err(BridgeError::ScalarLength(values.len()));
        }
        values[0].ok_or(BridgeError::MissingScalar { kind: "complex" })
    }

    pub(crate) fn node(&self) -> BridgeResult<RDataNode> {
        Ok(RDataNode::Complex {
            names: self.names()?,
            values: self.to_array()?,
        })
    }

    /// Name/value pairs in element order.
    pub fn entries(&self) -> BridgeResult<Vec<(Option<String>, RData)>> {
        let values = self.to_array()?;
        let names = entry_names(self.names()?, values.len());
        Ok(names
            .into_iter()
            .zip(values)
            .map(|(n, v)| (n, RData::from(v)))
            .collect())
    }

    /// Collapse to a keyed record per `opts`.
    pub fn to_object(&self, opts: &ObjectOptions) -> BridgeResult<Vec<(String, RData)>> {
        object_from_entries(self.entries()?, opts)
    }
}

wrapper!(
    /// A character vector.
    RCharacter,
    "character vector",
    Tag::Character
);

impl RCharacter {
    /// Build a character vector; `None` elements become the missing string.
    pub fn new(values: &[Option<String>]) -> BridgeResult<Self> {
        let h = engine::with(|rt| -> EngineResult<Handle> {
            let v = rt.alloc_vector(Tag::Character, values.len())?;
            rt.fill_character(v, values)?;
            Ok(v)
        })?;
        Ok(RCharacter(RAny::from_handle(h)))
    }

    /// Missingness mask, one `is.na` evaluation.
    pub fn detect_missing(&self) -> BridgeResult<Vec<bool>> {
        detect_missing(self.handle())
    }

    /// All elements, with missing ones as `None`.
    pub fn to_array(&self) -> BridgeResult<Vec<Option<String>>> {
        Ok(engine::with(|rt| rt.char_vec(self.handle()))?)
    }

    /// Element at `i` (zero-based).
    pub fn elt(&self, i: usize) -> BridgeResult<Option<String>> {
        self.to_array()?.get(i).cloned().ok_or_else(out_of_bounds)
    }

    /// Narrow to a scalar: the vector must hold exactly one present element.
    pub fn to_scalar(&self) -> BridgeResult<String> {
        let values = self.to_array()?;
        if values.len() != 1 {
            return Err(BridgeError::ScalarLength(values.len()));
        }
        values
            .into_iter()
            .next()
            .flatten()
            .ok_or(BridgeError::MissingScalar { kind: "string" })
    }

    pub(crate) fn node(&self) -> BridgeResult<RDataNode> {
        Ok(RDataNode::Character {
            names: self.names()?,
            values: self.to_array()?,
        })
    }

    /// Name/value pairs in element order.
    pub fn entries(&self) -> BridgeResult<Vec<(Option<String>, RData)>> {
        let values = self.to_array()?;
        let names = entry_names(self.names()?, values.len());
        Ok(names
            .into_iter()
            .zip(values)
            .map(|(n, v)| (n, RData::from(v)))
            .collect())
    }

    /// Collapse to a keyed record per `opts`.
    pub fn to_object(&self, opts: &ObjectOptions) -> BridgeResult<Vec<(String, RData)>> {
        object_from_entries(self.entries()?, opts)
    }
}

wrapper!(
    /// A raw byte vector. Raw elements have no missing encoding.
    RRaw,
    "raw vector",
    Tag::Raw
);

impl RRaw {
    /// Build a raw vector from bytes.
    pub fn new(values: &[u8]) -> BridgeResult<Self> {
        let h = engine::with(|rt| -> EngineResult<Handle> {
            let v = rt.alloc_vector(Tag::Raw, values.len())?;
            rt.fill_raw(v, values)?;
            Ok(v)
        })?;
        Ok(RRaw(RAny::from_handle(h)))
    }

    /// All bytes.
    pub fn to_array(&self) -> BridgeResult<Vec<u8>> {
        Ok(engine::with(|rt| rt.raw_values(self.handle()))?)
    }

    /// Byte at `i` (zero-based).
    pub fn elt(&self, i: usize) -> BridgeResult<u8> {
        self.to_array()?.get(i).copied().ok_or_else(out_of_bounds)
    }

    /// Narrow to a single byte.
    pub fn to_scalar(&self) -> BridgeResult<u8> {
        let values = self.to_array()?;
        if values.len() != 1 {
            return Err(BridgeError::ScalarLength(values.len()));
        }
        Ok(values[0])
    }

    /// Always all-false; raw elements cannot be missing.
    pub fn detect_missing(&self) -> BridgeResult<Vec<bool>> {
        detect_missing(self.handle())
    }

    pub(crate) fn node(&self) -> BridgeResult<RDataNode> {
        Ok(RDataNode::Raw {
            names: self.names()?,
            values: self.to_array()?,
        })
    }

    /// Name/value pairs in element order; bytes widen to integers.
    pub fn entries(&self) -> BridgeResult<Vec<(Option<String>, RData)>> {
        let values = self.to_array()?;
        let names = entry_names(self.names()?, values.len());
        Ok(names
            .into_iter()
            .zip(values)
            .map(|(n, b)| (n, RData::Int(b as i32)))
            .collect())
    }

    /// Collapse to a keyed record per `opts`.
    pub fn to_object(&self, opts: &ObjectOptions) -> BridgeResult<Vec<(String, RData)>> {
        object_from_entries(self.entries()?, opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_roundtrip_with_missing() {
        let v = RLogical::new(&[Some(true), None, Some(false)]).unwrap();
        assert_eq!(v.to_array().unwrap(), vec![Some(true), None, Some(false)]);
        assert_eq!(v.detect_missing().unwrap(), vec![false, true, false]);
        assert_eq!(v.elt(1).unwrap(), None);
    }

    #[test]
    fn test_integer_and_double_roundtrip() {
        let v = RInteger::new(&[Some(1), None]).unwrap();
        assert_eq!(v.to_array().unwrap(), vec![Some(1), None]);

        let v = RDouble::new(&[Some(1.5), None, Some(f64::NAN)]).unwrap();
        let out = v.to_array().unwrap();
        assert_eq!(out[0], Some(1.5));
        assert_eq!(out[1], None);
        // A plain NaN is a value, not a missing marker.
        assert!(out[2].is_some_and(f64::is_nan));
    }

    #[test]
    fn test_complex_roundtrip() {
        let v = RComplex::new(&[Some(Complex::new(1.0, -2.0)), None]).unwrap();
        let out = v.to_array().unwrap();
        assert_eq!(out[0], Some(Complex::new(1.0, -2.0)));
        assert_eq!(out[1], None);
    }

    #[test]
    fn test_character_roundtrip() {
        let v = RCharacter::new(&[Some("a".to_string()), None]).unwrap();
        assert_eq!(v.to_array().unwrap(), vec![Some("a".to_string()), None]);
        assert_eq!(v.to_scalar().unwrap_err().to_string(),
            BridgeError::ScalarLength(2).to_string());
    }

    #[test]
    fn test_raw_roundtrip() {
        let v = RRaw::new(&[0x00, 0xff]).unwrap();
        assert_eq!(v.to_array().unwrap(), vec![0x00, 0xff]);
        assert_eq!(v.elt(1).unwrap(), 0xff);
    }

    #[test]
    fn test_scalar_narrowing_errors() {
        let v = RDouble::new(&[Some(1.0), Some(2.0)]).unwrap();
        assert!(matches!(v.to_scalar(), Err(BridgeError::ScalarLength(2))));

        let v = RDouble::new(&[None]).unwrap();
        assert!(matches!(
            v.to_scalar(),
            Err(BridgeError::MissingScalar { kind: "double" })
        ));

        let v = RDouble::new(&[Some(4.0)]).unwrap();
        assert_eq!(v.to_scalar().unwrap(), 4.0);
    }

    #[test]
    fn test_atomic_rejects_member_access() {
        let v = RInteger::new(&[Some(1)]).unwrap();
        assert!(v.get_dollar("x").is_err());
    }

    #[test]
    fn test_wrap_validates_tag() {
        let v = RInteger::new(&[Some(1)]).unwrap();
        let err = RDouble::wrap(v.handle()).unwrap_err();
        assert!(matches!(err, BridgeError::UnexpectedType { expected: "double vector", .. }));
    }
}
