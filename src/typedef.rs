//! This module contains the closed code enumerations defined by the
//! supported formats. Header fields keep their raw numeric value, and
//! are mapped into these types with [`Coded`], which preserves codes
//! that the enumeration does not know about.
//!
//! [`Coded`]: ./enum.Coded.html

use num_traits::FromPrimitive;

/// A header code mapped onto a closed enumeration.
///
/// Headers in the wild often carry codes outside of their standard. These
/// are kept as `Unrecognized`, rather than being rejected at parse time.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Coded<T> {
    /// The code is part of the enumeration.
    Known(T),
    /// The raw value of a code which is not part of the enumeration.
    Unrecognized(i32),
}

impl<T: FromPrimitive> Coded<T> {
    /// Map a raw code.
    pub fn from_code<C: Into<i32>>(code: C) -> Self {
        let code = code.into();
        T::from_i32(code)
            .map(Coded::Known)
            .unwrap_or(Coded::Unrecognized(code))
    }
}

impl<T> Coded<T> {
    /// Obtain the known value, if any.
    pub fn known(self) -> Option<T> {
        match self {
            Coded::Known(t) => Some(t),
            Coded::Unrecognized(_) => None,
        }
    }
}

/// Data type for representing a NIfTI-1 value type in a volume.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, FromPrimitive)]
pub enum NiftiType {
    /// unsigned char.
    Uint8 = 2,
    /// signed short.
    Int16 = 4,
    /// signed int.
    Int32 = 8,
    /// 32 bit float.
    Float32 = 16,
    /// 64 bit complex = 2 32 bit floats.
    Complex64 = 32,
    /// 64 bit float = double.
    Float64 = 64,
    /// 3 8 bit bytes.
    Rgb24 = 128,
    /// signed char.
    Int8 = 256,
    /// unsigned short.
    Uint16 = 512,
    /// unsigned int.
    Uint32 = 768,
    /// signed long long.
    Int64 = 1024,
    /// unsigned long long.
    Uint64 = 1280,
    /// 128 bit float = long double.
    Float128 = 1536,
    /// 128 bit complex = 2 64 bit floats.
    Complex128 = 1792,
    /// 256 bit complex = 2 128 bit floats
    Complex256 = 2048,
    /// 4 8 bit bytes.
    Rgba32 = 2304,
}

impl NiftiType {
    /// Retrieve the size of an element of this data type, in bytes.
    pub fn size_of(self) -> usize {
        use NiftiType::*;
        match self {
            Int8 | Uint8 => 1,
            Int16 | Uint16 => 2,
            Rgb24 => 3,
            Int32 | Uint32 | Float32 | Rgba32 => 4,
            Int64 | Uint64 | Float64 | Complex64 => 8,
            Float128 | Complex128 => 16,
            Complex256 => 32,
        }
    }
}

/// The subset of voxel types defined by Analyze 7.5.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, FromPrimitive)]
pub enum AnalyzeType {
    /// 1 bit per voxel.
    Binary = 1,
    /// unsigned char.
    Uint8 = 2,
    /// signed short.
    Int16 = 4,
    /// signed int.
    Int32 = 8,
    /// 32 bit float.
    Float32 = 16,
    /// 64 bit complex.
    Complex64 = 32,
    /// 64 bit float.
    Float64 = 64,
    /// 3 8 bit bytes.
    Rgb24 = 128,
}

/// Slice orientation of an Analyze 7.5 volume (`orient` field).
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, FromPrimitive)]
pub enum AnalyzeOrientation {
    /// Axial slices, stored as acquired.
    TransverseUnflipped = 0,
    /// Coronal slices, stored as acquired.
    CoronalUnflipped = 1,
    /// Sagittal slices, stored as acquired.
    SagittalUnflipped = 2,
    /// Axial slices, flipped vertically.
    TransverseFlipped = 3,
    /// Coronal slices, flipped vertically.
    CoronalFlipped = 4,
    /// Sagittal slices, flipped vertically.
    SagittalFlipped = 5,
}

/// An enum type which represents a unit type.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, FromPrimitive)]
pub enum Unit {
    /// NIFTI code for unspecified units.
    Unknown = 0,
    /* Space codes are multiples of 1. */
    /// NIFTI code for meters.
    Meter = 1,
    /// NIFTI code for millimeters.
    Mm = 2,
    /// NIFTI code for micrometers.
    Micron = 3,
    /* Time codes are multiples of 8. */
    /// NIFTI code for seconds.
    Sec = 8,
    /// NIFTI code for milliseconds.
    Msec = 16,
    /// NIFTI code for microseconds.
    Usec = 24,
    /// NIFTI code for Hertz.
    Hz = 32,
    /// NIFTI code for ppm.
    Ppm = 40,
    /// NIFTI code for radians per second.
    Rads = 48,
}

impl Unit {
    /// The factor which converts a spatial length in this unit into
    /// millimetres. Unknown and non-spatial units are assumed to be
    /// millimetres already.
    pub fn millimetre_factor(self) -> f64 {
        match self {
            Unit::Meter => 1000.,
            Unit::Micron => 0.001,
            _ => 1.,
        }
    }
}

/// An enum type for representing a NIFTI intent code.
///
/// Only the intent is kept here; the interpretation of the statistical
/// parameters (`intent_p1` to `intent_p3`) is left to the consumer.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, FromPrimitive)]
pub enum Intent {
    /// No intention is indicated in the header.
    None = 0,
    /// Correlation coefficient R.
    Correl = 2,
    /// Student t statistic.
    Ttest = 3,
    /// Fisher F statistic.
    Ftest = 4,
    /// Standard normal.
    Zscore = 5,
    /// Chi-squared.
    Chisq = 6,
    /// Beta distribution.
    Beta = 7,
    /// Binomial distribution.
    Binom = 8,
    /// Gamma distribution.
    Gamma = 9,
    /// Poisson distribution.
    Poisson = 10,
    /// Normal distribution.
    Normal = 11,
    /// Noncentral F statistic.
    FtestNonc = 12,
    /// Noncentral chi-squared statistic.
    ChisqNonc = 13,
    /// Logistic distribution.
    Logistic = 14,
    /// Laplace distribution.
    Laplace = 15,
    /// Uniform distribution.
    Uniform = 16,
    /// Noncentral t statistic.
    TtestNonc = 17,
    /// Weibull distribution.
    Weibull = 18,
    /// Chi distribution.
    Chi = 19,
    /// Inverse Gaussian.
    Invgauss = 20,
    /// Extreme value type I.
    Extval = 21,
    /// Data is a p-value.
    Pval = 22,
    /// Data is ln(p-value).
    Logpval = 23,
    /// Data is log10(p-value).
    Log10pval = 24,
    /// Each voxel is an estimate of some parameter.
    Estimate = 1001,
    /// Each voxel is an index into a set of labels.
    Label = 1002,
    /// Each voxel is an index into the NeuroNames labels set.
    Neuroname = 1003,
    /// An M x N matrix at each voxel.
    Genmatrix = 1004,
    /// An N x N symmetric matrix at each voxel.
    Symmatrix = 1005,
    /// A displacement vector at each voxel.
    Dispvect = 1006,
    /// Any other vector at each voxel.
    Vector = 1007,
    /// A spatial coordinate at each voxel.
    Pointset = 1008,
    /// A triple of indexes into a pointset.
    Triangle = 1009,
    /// A quaternion at each voxel.
    Quaternion = 1010,
    /// Dimensionless value.
    Dimless = 1011,
    /// Value from a time series.
    TimeSeries = 2001,
    /// Node index of a surface dataset.
    NodeIndex = 2002,
    /// RGB triplet.
    RgbVector = 2003,
    /// RGBA vector.
    RgbaVector = 2004,
    /// Shape value, such as curvature.
    Shape = 2005,
}

impl Intent {
    /// Check whether this intent code are used for statistics.
    pub fn is_statcode(self) -> bool {
        self as i16 >= 2 && self as i16 <= 24
    }
}

/// An enum type for representing a NIFTI XForm.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, FromPrimitive)]
pub enum XForm {
    /// Arbitrary coordinates (Method 1).
    Unknown = 0,
    /// Scanner-based anatomical coordinates
    ScannerAnat = 1,
    /// Coordinates aligned to another file's,
    /// or to anatomical "truth".
    AlignedAnat = 2,
    /// Coordinates aligned to Talairach-Tournoux
    /// Atlas; (0,0,0)=AC, etc.
    Talairach = 3,
    /// MNI 152 normalized coordinates.
    Mni152 = 4,
}

/// An enum type for representing the slice order.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, FromPrimitive)]
pub enum SliceOrder {
    /// NIFTI_SLICE_UNKNOWN
    Unknown = 0,
    /// NIFTI_SLICE_SEQ_INC
    SeqInc = 1,
    /// NIFTI_SLICE_SEQ_DEC
    SeqDec = 2,
    /// NIFTI_SLICE_ALT_INC
    AltInc = 3,
    /// NIFTI_SLICE_ALT_DEC
    AltDec = 4,
    /// NIFTI_SLICE_ALT_INC2
    AltInc2 = 5,
    /// NIFTI_SLICE_ALT_DEC2
    AltDec2 = 6,
}
