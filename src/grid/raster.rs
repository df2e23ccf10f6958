// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! In-memory raster grid representation.
//!
//! A [`Grid`] is the unit of exchange between application code and the
//! header/body codecs: a dense 2-D numeric matrix plus its coordinate axes,
//! header attributes, and (for loaded grids) the originating file paths.

use std::path::PathBuf;

use ndarray::{Array2, ArrayD};

use crate::core::error::{CodecError, Result};
use crate::grid::attrs::Attributes;

/// On-disk element type of a raster body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 4-byte IEEE single-precision float
    Float,
    /// 2-byte signed integer
    Integer,
}

impl DataType {
    /// Width of one element in bytes.
    pub fn element_size(&self) -> usize {
        match self {
            DataType::Float => 4,
            DataType::Integer => 2,
        }
    }

    /// Header string form ("float" or "integer").
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Float => "float",
            DataType::Integer => "integer",
        }
    }

    /// Map a header `Data Type` value to an element type.
    ///
    /// Any value containing "float" is treated as float; everything else is
    /// the 2-byte integer form.
    pub fn from_header_value(s: &str) -> Self {
        if s.to_lowercase().contains("float") {
            DataType::Float
        } else {
            DataType::Integer
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Byte order of a raster body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Least-significant byte first
    LittleEndian,
    /// Most-significant byte first
    BigEndian,
}

impl ByteOrder {
    /// Header string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "LITTLE_ENDIAN",
            ByteOrder::BigEndian => "BIG_ENDIAN",
        }
    }

    /// Map a header `Byte Order` value to a byte order.
    ///
    /// Returns `None` for anything outside the two recognized spellings;
    /// the caller then assumes the default (little-endian).
    pub fn from_header_value(s: &str) -> Option<Self> {
        match s {
            "LITTLE_ENDIAN" => Some(ByteOrder::LittleEndian),
            "BIG_ENDIAN" => Some(ByteOrder::BigEndian),
            _ => None,
        }
    }
}

impl std::fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dense 2-D value storage, tagged by on-disk element type.
#[derive(Debug, Clone, PartialEq)]
pub enum GridData {
    /// Single-precision float cells
    Float(Array2<f32>),
    /// 16-bit signed integer cells
    Integer(Array2<i16>),
}

impl GridData {
    /// Number of rows.
    pub fn rows(&self) -> usize {
        match self {
            GridData::Float(a) => a.nrows(),
            GridData::Integer(a) => a.nrows(),
        }
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        match self {
            GridData::Float(a) => a.ncols(),
            GridData::Integer(a) => a.ncols(),
        }
    }

    /// Total element count.
    pub fn len(&self) -> usize {
        self.rows() * self.cols()
    }

    /// Check if the grid holds no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The on-disk element type this storage maps to.
    pub fn data_type(&self) -> DataType {
        match self {
            GridData::Float(_) => DataType::Float,
            GridData::Integer(_) => DataType::Integer,
        }
    }

    /// Cell value as f64. Integer cells are widened; float NaN passes through.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        match self {
            GridData::Float(a) => a[(row, col)] as f64,
            GridData::Integer(a) => a[(row, col)] as f64,
        }
    }

    /// Minimum and maximum cell values, skipping NaN cells.
    ///
    /// Returns `None` for an empty grid or one holding only NaN.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut range: Option<(f64, f64)> = None;
        match self {
            GridData::Float(a) => {
                for &v in a.iter() {
                    if v.is_nan() {
                        continue;
                    }
                    let v = v as f64;
                    range = Some(match range {
                        Some((lo, hi)) => (lo.min(v), hi.max(v)),
                        None => (v, v),
                    });
                }
            }
            GridData::Integer(a) => {
                for &v in a.iter() {
                    let v = v as f64;
                    range = Some(match range {
                        Some((lo, hi)) => (lo.min(v), hi.max(v)),
                        None => (v, v),
                    });
                }
            }
        }
        range
    }
}

/// Coordinate axes of a grid, one monotonic sequence per dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct GridAxes {
    /// Column coordinates, length cols
    pub x: Vec<f64>,
    /// Row coordinates, length rows
    pub y: Vec<f64>,
}

/// Derive `n` coordinate samples over the half-open interval `[start, stop)`.
///
/// The interval is divided into `n` equal steps and the `stop` value itself is
/// excluded. For south=0, north=1, rows=4 this yields [0.0, 0.25, 0.5, 0.75].
pub fn half_open_axis(start: f64, stop: f64, n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let step = (stop - start) / n as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

/// File paths a loaded grid came from. Diagnostics only, excluded from
/// equality.
#[derive(Debug, Clone)]
pub struct GridOrigin {
    /// Path of the text header file
    pub header: PathBuf,
    /// Path of the binary body file
    pub body: PathBuf,
}

/// Record of the external invocation that produced a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Tool name
    pub tool: String,
    /// Serialized argument tokens passed to the tool
    pub arguments: Vec<String>,
    /// Exit status the tool reported
    pub exit_status: i32,
}

/// An in-memory 2-D raster: values, coordinate axes, and header attributes.
///
/// Grids are constructed either by the codecs reading a header/body file pair
/// or by application code wrapping a raw matrix plus attributes. Equality
/// compares values and attributes only; origin paths and invocation records
/// are diagnostics.
#[derive(Debug, Clone)]
pub struct Grid {
    data: GridData,
    axes: Option<GridAxes>,
    attrs: Attributes,
    origin: Option<GridOrigin>,
    invocation: Option<Invocation>,
}

impl Grid {
    /// Create a grid from 2-D storage and attributes.
    ///
    /// Axes are derived from the south/north/east/west bounds when all four
    /// are present in the attributes.
    pub fn new(data: GridData, attrs: Attributes) -> Self {
        let axes = derive_axes(&attrs, data.rows(), data.cols());
        Self {
            data,
            axes,
            attrs,
            origin: None,
            invocation: None,
        }
    }

    /// Create a float grid from a dynamic-dimensional array.
    ///
    /// Fails with [`CodecError::UnsupportedDimensionality`] unless the array
    /// has exactly two dimensions.
    pub fn from_dyn_float(values: ArrayD<f32>, attrs: Attributes) -> Result<Self> {
        let shape = require_2d(values.ndim(), values.shape())?;
        let arr = values
            .into_shape_with_order(shape)
            .map_err(|e| CodecError::Other(format!("Shape conversion failed: {e}")))?;
        Ok(Self::new(GridData::Float(arr), attrs))
    }

    /// Create an integer grid from a dynamic-dimensional array.
    ///
    /// Fails with [`CodecError::UnsupportedDimensionality`] unless the array
    /// has exactly two dimensions.
    pub fn from_dyn_integer(values: ArrayD<i16>, attrs: Attributes) -> Result<Self> {
        let shape = require_2d(values.ndim(), values.shape())?;
        let arr = values
            .into_shape_with_order(shape)
            .map_err(|e| CodecError::Other(format!("Shape conversion failed: {e}")))?;
        Ok(Self::new(GridData::Integer(arr), attrs))
    }

    /// The cell values.
    pub fn data(&self) -> &GridData {
        &self.data
    }

    /// Mutable cell values, for attribute filling and nodata rewrites.
    pub(crate) fn data_mut(&mut self) -> &mut GridData {
        &mut self.data
    }

    /// The coordinate axes, if bounds were available to derive them.
    pub fn axes(&self) -> Option<&GridAxes> {
        self.axes.as_ref()
    }

    /// The attribute map.
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    /// Mutable access to the attribute map.
    ///
    /// Axes are re-derived from the (possibly changed) bounds afterwards via
    /// [`Grid::refresh_axes`]; callers mutating bounds should invoke it.
    pub fn attrs_mut(&mut self) -> &mut Attributes {
        &mut self.attrs
    }

    /// Re-derive the coordinate axes from the current attributes.
    pub fn refresh_axes(&mut self) {
        self.axes = derive_axes(&self.attrs, self.data.rows(), self.data.cols());
    }

    /// Originating file paths, when the grid was loaded from disk.
    pub fn origin(&self) -> Option<&GridOrigin> {
        self.origin.as_ref()
    }

    /// Record the file paths this grid was loaded from.
    pub fn set_origin(&mut self, header: PathBuf, body: PathBuf) {
        self.origin = Some(GridOrigin { header, body });
    }

    /// The invocation record attached by the marshaller, if any.
    pub fn invocation(&self) -> Option<&Invocation> {
        self.invocation.as_ref()
    }

    /// Attach an invocation record.
    pub fn set_invocation(&mut self, invocation: Invocation) {
        self.invocation = Some(invocation);
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.data.rows()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.data.cols()
    }

    /// On-disk element type of the current storage.
    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    /// Check that the stored shape matches the declared `rows`/`cols`
    /// attributes exactly.
    pub fn validate_shape(&self) -> Result<()> {
        let declared_rows = self.attrs.get_i64("rows");
        let declared_cols = self.attrs.get_i64("cols");
        if let (Some(r), Some(c)) = (declared_rows, declared_cols) {
            let expected = (r.max(0) as usize) * (c.max(0) as usize);
            let actual = self.data.len();
            if r.max(0) as usize != self.rows() || c.max(0) as usize != self.cols() {
                return Err(CodecError::format(expected, actual));
            }
        }
        Ok(())
    }

    /// Substitute the declared nodata sentinel with NaN.
    ///
    /// Integer grids are upcast to float storage first, since integers have
    /// no native missing-value representation. A grid without a parsable
    /// `nodata` attribute is returned unchanged.
    pub fn substitute_nodata(&mut self) {
        let sentinel = match self.attrs.get_f64("nodata") {
            Some(v) => v,
            None => return,
        };
        let upcast = match &self.data {
            GridData::Integer(a) => Some(a.mapv(|v| v as f32)),
            GridData::Float(_) => None,
        };
        if let Some(arr) = upcast {
            self.data = GridData::Float(arr);
        }
        if let GridData::Float(a) = &mut self.data {
            a.mapv_inplace(|v| if v as f64 == sentinel { f32::NAN } else { v });
        }
    }
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        // origin and invocation are diagnostics, not identity
        self.data == other.data && self.attrs == other.attrs
    }
}

fn require_2d(ndim: usize, shape: &[usize]) -> Result<(usize, usize)> {
    if ndim != 2 {
        return Err(CodecError::unsupported_dimensionality(ndim));
    }
    Ok((shape[0], shape[1]))
}

fn derive_axes(attrs: &Attributes, rows: usize, cols: usize) -> Option<GridAxes> {
    let south = attrs.get_f64("south")?;
    let north = attrs.get_f64("north")?;
    let east = attrs.get_f64("east")?;
    let west = attrs.get_f64("west")?;
    Some(GridAxes {
        x: half_open_axis(east, west, cols),
        y: half_open_axis(south, north, rows),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::attrs::AttrValue;
    use ndarray::array;

    fn bounds_attrs() -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert("south", AttrValue::Float(0.0));
        attrs.insert("north", AttrValue::Float(1.0));
        attrs.insert("east", AttrValue::Float(0.0));
        attrs.insert("west", AttrValue::Float(1.0));
        attrs
    }

    #[test]
    fn test_half_open_axis_law() {
        assert_eq!(half_open_axis(0.0, 1.0, 4), vec![0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_half_open_axis_empty() {
        assert!(half_open_axis(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_half_open_axis_descending() {
        assert_eq!(half_open_axis(1.0, 0.0, 2), vec![1.0, 0.5]);
    }

    #[test]
    fn test_data_type_from_header_value() {
        assert_eq!(DataType::from_header_value("float"), DataType::Float);
        assert_eq!(DataType::from_header_value("FLOAT"), DataType::Float);
        assert_eq!(DataType::from_header_value("integer"), DataType::Integer);
        assert_eq!(DataType::from_header_value("i16"), DataType::Integer);
    }

    #[test]
    fn test_data_type_element_size() {
        assert_eq!(DataType::Float.element_size(), 4);
        assert_eq!(DataType::Integer.element_size(), 2);
    }

    #[test]
    fn test_byte_order_from_header_value() {
        assert_eq!(
            ByteOrder::from_header_value("LITTLE_ENDIAN"),
            Some(ByteOrder::LittleEndian)
        );
        assert_eq!(
            ByteOrder::from_header_value("BIG_ENDIAN"),
            Some(ByteOrder::BigEndian)
        );
        assert_eq!(ByteOrder::from_header_value("middle"), None);
        assert_eq!(ByteOrder::from_header_value(""), None);
    }

    #[test]
    fn test_grid_axes_derivation() {
        let data = GridData::Float(Array2::zeros((4, 2)));
        let grid = Grid::new(data, bounds_attrs());
        let axes = grid.axes().expect("bounds present");
        assert_eq!(axes.y, vec![0.0, 0.25, 0.5, 0.75]);
        assert_eq!(axes.x, vec![0.0, 0.5]);
    }

    #[test]
    fn test_grid_axes_absent_without_bounds() {
        let data = GridData::Float(Array2::zeros((2, 2)));
        let grid = Grid::new(data, Attributes::new());
        assert!(grid.axes().is_none());
    }

    #[test]
    fn test_from_dyn_float_rejects_3d() {
        let values = ArrayD::<f32>::zeros(ndarray::IxDyn(&[2, 2, 2]));
        let err = Grid::from_dyn_float(values, Attributes::new()).unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnsupportedDimensionality { ndim: 3 }
        ));
    }

    #[test]
    fn test_from_dyn_float_accepts_2d() {
        let values = ArrayD::<f32>::zeros(ndarray::IxDyn(&[3, 4]));
        let grid = Grid::from_dyn_float(values, Attributes::new()).unwrap();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 4);
        assert_eq!(grid.data_type(), DataType::Float);
    }

    #[test]
    fn test_nodata_substitution_upcasts_integer() {
        let mut attrs = Attributes::new();
        attrs.insert("nodata", AttrValue::Text("-9999".to_string()));
        let data = GridData::Integer(array![[1i16, -9999], [3, 4]]);
        let mut grid = Grid::new(data, attrs);
        grid.substitute_nodata();
        match grid.data() {
            GridData::Float(a) => {
                assert_eq!(a[(0, 0)], 1.0);
                assert!(a[(0, 1)].is_nan());
                assert_eq!(a[(1, 0)], 3.0);
            }
            GridData::Integer(_) => panic!("expected upcast to float storage"),
        }
    }

    #[test]
    fn test_nodata_substitution_without_sentinel() {
        let data = GridData::Integer(array![[1i16, 2], [3, 4]]);
        let mut grid = Grid::new(data.clone(), Attributes::new());
        grid.substitute_nodata();
        assert_eq!(grid.data(), &data);
    }

    #[test]
    fn test_value_range_skips_nan() {
        let data = GridData::Float(array![[1.0f32, f32::NAN], [3.0, -2.0]]);
        assert_eq!(data.value_range(), Some((-2.0, 3.0)));
    }

    #[test]
    fn test_grid_equality_ignores_origin() {
        let data = GridData::Float(array![[1.0f32, 2.0], [3.0, 4.0]]);
        let a = Grid::new(data.clone(), bounds_attrs());
        let mut b = Grid::new(data, bounds_attrs());
        b.set_origin(PathBuf::from("a.dep"), PathBuf::from("a.tas"));
        b.set_invocation(Invocation {
            tool: "Slope".to_string(),
            arguments: vec!["--dem=x.dep".to_string()],
            exit_status: 0,
        });
        assert_eq!(a, b);
    }

    #[test]
    fn test_validate_shape_mismatch() {
        let mut attrs = Attributes::new();
        attrs.insert("rows", AttrValue::Int(3));
        attrs.insert("cols", AttrValue::Int(3));
        let grid = Grid::new(GridData::Float(Array2::zeros((2, 2))), attrs);
        assert!(grid.validate_shape().is_err());
    }
}
