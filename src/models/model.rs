//! The surrogate data contract and its validated form.
//!
//! A loader (JSON here, HDF5 or flat text elsewhere) fills a [`SurrogateData`]
//! with arrays and string tags. [`SurrogateModel::new`] checks every shape
//! invariant, parses every tag into its closed enum, and converts the basis
//! rows into nalgebra matrices. The spline interpolants used for resampling
//! are fitted there too; nothing about a model changes after that.

use nalgebra::{Complex, DMatrix};
use serde::{Deserialize, Serialize};

use crate::domain::{AffineMap, Parameterization, Representation};
use crate::error::{AppError, ErrorKind};
use crate::math::{DEFAULT_SPLINE_DEGREE, FitFunction};
use crate::surrogate::ResampleCache;

/// A complex matrix stored as row-major real and (optional) imaginary parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexRows {
    pub re: Vec<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub im: Option<Vec<Vec<f64>>>,
}

/// Everything a trained single-mode surrogate supplies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurrogateData {
    /// Native time grid, `t / M`.
    pub times: Vec<f64>,
    /// `waveform_basis` or `amp_phase_basis`.
    pub surrogate_mode_type: String,

    /// Empirical interpolant operator for `waveform_basis` (rows = times).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<ComplexRows>,
    /// Amplitude operator for `amp_phase_basis`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b_amp: Option<Vec<Vec<f64>>>,
    /// Phase operator for `amp_phase_basis`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b_phase: Option<Vec<Vec<f64>>>,

    pub fit_params_amp: Vec<Vec<f64>>,
    pub fit_params_phase: Vec<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_params_norm: Option<Vec<f64>>,

    pub fit_type_amp: String,
    pub fit_type_phase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_type_norm: Option<String>,

    pub fit_min: f64,
    pub fit_max: f64,
    pub affine_map: String,
    pub parameterization: String,

    #[serde(default)]
    pub greedy_points: Vec<f64>,
    #[serde(default)]
    pub eim_indices: Vec<usize>,
    /// Amplitude data at the EIM nodes, one row per node, one value per greedy point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eim_amp: Option<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eim_phase: Option<Vec<Vec<f64>>>,

    /// Change of basis from cardinal to orthonormal functions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<ComplexRows>,
    /// Change of basis from orthonormal functions to the greedy waveforms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<ComplexRows>,
}

/// Basis operators in their trained representation.
#[derive(Debug, Clone)]
pub enum BasisOperator {
    Waveform(DMatrix<Complex<f64>>),
    AmpPhase {
        amp: DMatrix<f64>,
        phase: DMatrix<f64>,
    },
}

impl BasisOperator {
    pub fn representation(&self) -> Representation {
        match self {
            BasisOperator::Waveform(_) => Representation::WaveformBasis,
            BasisOperator::AmpPhase { .. } => Representation::AmpPhaseBasis,
        }
    }
}

/// Norm fit; absent on models without an overall normalization.
#[derive(Debug, Clone)]
pub struct NormFit {
    pub function: FitFunction,
    pub coeffs: Vec<f64>,
}

/// Validated, immutable surrogate for one `(l, m)` mode.
#[derive(Debug, Clone)]
pub struct SurrogateModel {
    data: SurrogateData,
    basis: BasisOperator,
    amp_fit: FitFunction,
    phase_fit: FitFunction,
    norm_fit: Option<NormFit>,
    affine_map: AffineMap,
    parameterization: Parameterization,
    v: Option<DMatrix<Complex<f64>>>,
    r: Option<DMatrix<Complex<f64>>>,
    resampler: ResampleCache,
}

impl SurrogateModel {
    pub fn new(data: SurrogateData) -> Result<Self, AppError> {
        Self::with_degree(data, DEFAULT_SPLINE_DEGREE)
    }

    /// Build with a chosen interpolation degree for off-grid resampling.
    pub fn with_degree(data: SurrogateData, degree: usize) -> Result<Self, AppError> {
        validate_times(&data.times)?;

        let representation: Representation = data.surrogate_mode_type.parse()?;
        let affine_map: AffineMap = data.affine_map.parse()?;
        let parameterization: Parameterization = data.parameterization.parse()?;
        let amp_fit: FitFunction = data.fit_type_amp.parse()?;
        let phase_fit: FitFunction = data.fit_type_phase.parse()?;

        if !(data.fit_min.is_finite() && data.fit_max.is_finite() && data.fit_min < data.fit_max) {
            return Err(invalid(format!(
                "Fit interval [{}, {}] must be finite with min < max.",
                data.fit_min, data.fit_max
            )));
        }

        let dim = data.fit_params_amp.len();
        if dim == 0 {
            return Err(invalid("Surrogate has no amplitude fit parameters."));
        }
        if data.fit_params_phase.len() != dim {
            return Err(invalid(format!(
                "Amplitude and phase fits disagree on the reduced basis size ({} vs {}).",
                dim,
                data.fit_params_phase.len()
            )));
        }

        let norm_fit = match (&data.fit_params_norm, &data.fit_type_norm) {
            (None, _) => None,
            (Some(coeffs), Some(tag)) => Some(NormFit {
                function: tag.parse()?,
                coeffs: coeffs.clone(),
            }),
            (Some(_), None) => {
                return Err(invalid("Norm fit parameters given without a norm fit type."));
            }
        };

        let n_times = data.times.len();
        let basis = match representation {
            Representation::WaveformBasis => {
                let b = data
                    .b
                    .as_ref()
                    .ok_or_else(|| invalid("waveform_basis surrogate is missing its B operator."))?;
                let m = complex_matrix(b, "B")?;
                check_shape(&m.shape(), n_times, dim, "B")?;
                BasisOperator::Waveform(m)
            }
            Representation::AmpPhaseBasis => {
                let amp = data
                    .b_amp
                    .as_ref()
                    .ok_or_else(|| invalid("amp_phase_basis surrogate is missing B_amp."))?;
                let phase = data
                    .b_phase
                    .as_ref()
                    .ok_or_else(|| invalid("amp_phase_basis surrogate is missing B_phase."))?;
                let amp = real_matrix(amp, "B_amp")?;
                let phase = real_matrix(phase, "B_phase")?;
                check_shape(&amp.shape(), n_times, dim, "B_amp")?;
                check_shape(&phase.shape(), n_times, dim, "B_phase")?;
                BasisOperator::AmpPhase { amp, phase }
            }
        };

        for (name, rows) in [("eim_amp", &data.eim_amp), ("eim_phase", &data.eim_phase)] {
            if let Some(rows) = rows {
                if rows.iter().any(|r| r.len() != data.greedy_points.len()) {
                    return Err(invalid(format!(
                        "{name} rows must have one value per greedy point ({}).",
                        data.greedy_points.len()
                    )));
                }
            }
        }

        let v = data.v.as_ref().map(|v| complex_matrix(v, "V")).transpose()?;
        let r = data.r.as_ref().map(|r| complex_matrix(r, "R")).transpose()?;

        let resampler = ResampleCache::build(&data.times, &basis, degree)?;

        Ok(Self {
            data,
            basis,
            amp_fit,
            phase_fit,
            norm_fit,
            affine_map,
            parameterization,
            v,
            r,
            resampler,
        })
    }

    /// The data contract this model was built from.
    pub fn data(&self) -> &SurrogateData {
        &self.data
    }

    pub fn times(&self) -> &[f64] {
        &self.data.times
    }

    pub fn representation(&self) -> Representation {
        self.basis.representation()
    }

    pub fn basis(&self) -> &BasisOperator {
        &self.basis
    }

    /// Reduced basis size.
    pub fn dim_rb(&self) -> usize {
        self.data.fit_params_amp.len()
    }

    pub fn amp_fit(&self) -> FitFunction {
        self.amp_fit
    }

    pub fn phase_fit(&self) -> FitFunction {
        self.phase_fit
    }

    pub fn norm_fit(&self) -> Option<&NormFit> {
        self.norm_fit.as_ref()
    }

    pub fn fit_params_amp(&self) -> &[Vec<f64>] {
        &self.data.fit_params_amp
    }

    pub fn fit_params_phase(&self) -> &[Vec<f64>] {
        &self.data.fit_params_phase
    }

    pub fn fit_interval(&self) -> (f64, f64) {
        (self.data.fit_min, self.data.fit_max)
    }

    pub fn affine_map(&self) -> AffineMap {
        self.affine_map
    }

    pub fn parameterization(&self) -> Parameterization {
        self.parameterization
    }

    pub fn greedy_points(&self) -> &[f64] {
        &self.data.greedy_points
    }

    pub fn eim_indices(&self) -> &[usize] {
        &self.data.eim_indices
    }

    pub fn eim_amp(&self) -> Option<&[Vec<f64>]> {
        self.data.eim_amp.as_deref()
    }

    pub fn eim_phase(&self) -> Option<&[Vec<f64>]> {
        self.data.eim_phase.as_deref()
    }

    pub fn v(&self) -> Option<&DMatrix<Complex<f64>>> {
        self.v.as_ref()
    }

    pub fn r(&self) -> Option<&DMatrix<Complex<f64>>> {
        self.r.as_ref()
    }

    pub fn resampler(&self) -> &ResampleCache {
        &self.resampler
    }
}

/// Agreement of one data-contract field between two surrogates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldComparison {
    pub field: &'static str,
    pub agrees: bool,
}

/// Compare two surrogates field by field.
///
/// Array fields must match exactly; tag fields by string equality.
pub fn compare_models(a: &SurrogateData, b: &SurrogateData) -> Vec<FieldComparison> {
    let field = |field: &'static str, agrees: bool| FieldComparison { field, agrees };
    vec![
        field("times", a.times == b.times),
        field("B", a.b == b.b),
        field("B_amp", a.b_amp == b.b_amp),
        field("B_phase", a.b_phase == b.b_phase),
        field("V", a.v == b.v),
        field("R", a.r == b.r),
        field("fit_params_amp", a.fit_params_amp == b.fit_params_amp),
        field("fit_params_phase", a.fit_params_phase == b.fit_params_phase),
        field("fit_params_norm", a.fit_params_norm == b.fit_params_norm),
        field("greedy_points", a.greedy_points == b.greedy_points),
        field("eim_indices", a.eim_indices == b.eim_indices),
        field("fit_type_amp", a.fit_type_amp == b.fit_type_amp),
        field("fit_type_phase", a.fit_type_phase == b.fit_type_phase),
        field("fit_type_norm", a.fit_type_norm == b.fit_type_norm),
    ]
}

fn invalid(message: impl Into<String>) -> AppError {
    AppError::new(ErrorKind::InvalidModel, message)
}

fn validate_times(times: &[f64]) -> Result<(), AppError> {
    if times.is_empty() {
        return Err(invalid("Surrogate time grid is empty."));
    }
    if times.iter().any(|t| !t.is_finite()) {
        return Err(invalid("Surrogate time grid contains non-finite values."));
    }
    if let Some(i) = times.windows(2).position(|w| w[1] <= w[0]) {
        return Err(invalid(format!(
            "Surrogate time grid is not strictly increasing at index {}.",
            i + 1
        )));
    }
    Ok(())
}

fn real_matrix(rows: &[Vec<f64>], name: &str) -> Result<DMatrix<f64>, AppError> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != ncols) {
        return Err(invalid(format!("{name} rows have unequal lengths.")));
    }
    Ok(DMatrix::from_fn(nrows, ncols, |i, j| rows[i][j]))
}

fn complex_matrix(rows: &ComplexRows, name: &str) -> Result<DMatrix<Complex<f64>>, AppError> {
    let re = real_matrix(&rows.re, name)?;
    let Some(im_rows) = &rows.im else {
        return Ok(re.map(|x| Complex::new(x, 0.0)));
    };
    let im = real_matrix(im_rows, name)?;
    if im.shape() != re.shape() {
        return Err(invalid(format!(
            "{name} real and imaginary parts have different shapes."
        )));
    }
    Ok(re.zip_map(&im, Complex::new))
}

fn check_shape(shape: &(usize, usize), rows: usize, cols: usize, name: &str) -> Result<(), AppError> {
    if shape.0 != rows {
        return Err(invalid(format!(
            "{name} has {} rows but the time grid has {rows} samples.",
            shape.0
        )));
    }
    if shape.1 != cols {
        return Err(invalid(format!(
            "{name} has {} columns but the reduced basis size is {cols}.",
            shape.1
        )));
    }
    Ok(())
}
