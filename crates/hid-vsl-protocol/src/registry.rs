//! Parameter calibration records and the read-only registry

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{MAX_ENCODED_INT, PARAM_GAIN_CH1, PARAM_HPF_FREQ_CH1, VslError, VslResult};

/// Which calibration curve a parameter uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Exponential taper, decoded approximately in dB.
    Gain,
    /// Log2 taper between two positive frequencies.
    Frequency,
    /// Plain normalized position.
    Raw,
}

impl UnitKind {
    /// Label used for decoded values of this kind.
    pub fn unit_label(&self) -> &'static str {
        match self {
            Self::Gain => "dB",
            Self::Frequency => "Hz",
            Self::Raw => "Norm",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gain => "Gain",
            Self::Frequency => "Frequency",
            Self::Raw => "Raw",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Calibration record for one addressable DSP control.
///
/// Records are plain data: build them with the constructors below or
/// deserialize them from configuration, then hand them to [`Registry::new`],
/// which runs [`ParameterSpec::validate`] once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub id: u16,
    pub name: String,
    pub unit_kind: UnitKind,
    #[serde(default)]
    pub curve_offset_a: f64,
    #[serde(default)]
    pub curve_c1: f64,
    #[serde(default)]
    pub log_factor: f64,
    /// Normalized input domain of the gain curve (`min`, `max`).
    #[serde(default = "unit_interval")]
    pub curve_domain: (f64, f64),
    /// Valid Hz range for frequency parameters (`min`, `max`).
    #[serde(default)]
    pub freq_range: (f64, f64),
    /// User-facing range targeted by the approximate gain decode.
    #[serde(default = "unit_interval")]
    pub display_range: (f64, f64),
    #[serde(default = "default_max_encoded_int")]
    pub max_encoded_int: u16,
}

fn unit_interval() -> (f64, f64) {
    (0.0, 1.0)
}

fn default_max_encoded_int() -> u16 {
    MAX_ENCODED_INT
}

impl ParameterSpec {
    fn base(id: u16, name: impl Into<String>, unit_kind: UnitKind) -> Self {
        Self {
            id,
            name: name.into(),
            unit_kind,
            curve_offset_a: 0.0,
            curve_c1: 0.0,
            log_factor: 0.0,
            curve_domain: unit_interval(),
            freq_range: (0.0, 0.0),
            display_range: unit_interval(),
            max_encoded_int: MAX_ENCODED_INT,
        }
    }

    /// Gain parameter with `encoded = offset_a + c1 * exp(norm * log_factor)`.
    pub fn gain(
        id: u16,
        name: impl Into<String>,
        offset_a: f64,
        c1: f64,
        log_factor: f64,
    ) -> Self {
        Self {
            curve_offset_a: offset_a,
            curve_c1: c1,
            log_factor,
            ..Self::base(id, name, UnitKind::Gain)
        }
    }

    pub fn frequency(id: u16, name: impl Into<String>, min_hz: f64, max_hz: f64) -> Self {
        Self {
            freq_range: (min_hz, max_hz),
            ..Self::base(id, name, UnitKind::Frequency)
        }
    }

    pub fn raw(id: u16, name: impl Into<String>) -> Self {
        Self::base(id, name, UnitKind::Raw)
    }

    pub fn with_curve_domain(mut self, min: f64, max: f64) -> Self {
        self.curve_domain = (min, max);
        self
    }

    pub fn with_display_range(mut self, min: f64, max: f64) -> Self {
        self.display_range = (min, max);
        self
    }

    pub fn with_max_encoded_int(mut self, max_encoded_int: u16) -> Self {
        self.max_encoded_int = max_encoded_int;
        self
    }

    /// Checks the record's structural invariants.
    ///
    /// Frequency bounds that are non-positive or inverted yield
    /// [`VslError::InvalidRange`]; every other violation yields
    /// [`VslError::InvalidParameter`].
    pub fn validate(&self) -> VslResult<()> {
        if self.max_encoded_int == 0 {
            return Err(self.invalid_parameter("max_encoded_int must be > 0"));
        }

        let coefficients = [self.curve_offset_a, self.curve_c1, self.log_factor];
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(self.invalid_parameter("curve coefficients must be finite"));
        }

        let (domain_min, domain_max) = self.curve_domain;
        if !domain_min.is_finite() || !domain_max.is_finite() {
            return Err(self.invalid_parameter("curve domain must be finite"));
        }
        if domain_max < domain_min {
            return Err(self.invalid_parameter("curve domain max must be >= min"));
        }

        let (display_min, display_max) = self.display_range;
        if !display_min.is_finite() || !display_max.is_finite() {
            return Err(self.invalid_parameter("display range must be finite"));
        }

        if self.unit_kind == UnitKind::Frequency {
            let (min_hz, max_hz) = checked_freq_range(self)?;
            if max_hz <= min_hz {
                return Err(VslError::InvalidRange {
                    param_id: self.id,
                    reason: format!("freq_max ({max_hz}) must be > freq_min ({min_hz})"),
                });
            }
        }

        Ok(())
    }

    fn invalid_parameter(&self, reason: &str) -> VslError {
        VslError::InvalidParameter {
            param_id: self.id,
            reason: reason.to_string(),
        }
    }
}

/// Returns `(min_hz, max_hz)` when both bounds are positive, finite and not
/// inverted. Equal bounds pass; they describe a single-point range.
pub(crate) fn checked_freq_range(spec: &ParameterSpec) -> VslResult<(f64, f64)> {
    let (min_hz, max_hz) = spec.freq_range;
    if !(min_hz > 0.0 && max_hz > 0.0) || !min_hz.is_finite() || !max_hz.is_finite() {
        return Err(VslError::InvalidRange {
            param_id: spec.id,
            reason: format!("frequency bounds must be > 0 for log mapping, got [{min_hz}, {max_hz}]"),
        });
    }
    if max_hz < min_hz {
        return Err(VslError::InvalidRange {
            param_id: spec.id,
            reason: format!("frequency range inverted: [{min_hz}, {max_hz}]"),
        });
    }
    Ok((min_hz, max_hz))
}

/// Read-only collection of parameter specs keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    params: BTreeMap<u16, ParameterSpec>,
}

impl Registry {
    /// Validates every spec and rejects duplicate ids.
    pub fn new(specs: impl IntoIterator<Item = ParameterSpec>) -> VslResult<Self> {
        let mut params = BTreeMap::new();
        for spec in specs {
            spec.validate()?;
            if params.contains_key(&spec.id) {
                return Err(spec.invalid_parameter("duplicate parameter id"));
            }
            params.insert(spec.id, spec);
        }
        Ok(Self { params })
    }

    /// The parameters known from the vendor driver, built on first use.
    ///
    /// The table goes through [`Registry::new`] like any configured one.
    pub fn builtin() -> &'static Registry {
        static BUILTIN: LazyLock<Registry> =
            LazyLock::new(|| Registry::new_or_empty(builtin_specs()));
        &BUILTIN
    }

    /// Like [`Registry::new`], but logs a rejected table and returns an
    /// empty registry instead.
    fn new_or_empty(specs: impl IntoIterator<Item = ParameterSpec>) -> Self {
        match Self::new(specs) {
            Ok(registry) => registry,
            Err(e) => {
                error!("Rejected built-in parameter table: {e}");
                Self::default()
            }
        }
    }

    pub fn get(&self, id: u16) -> Option<&ParameterSpec> {
        self.params.get(&id)
    }

    /// Looks up a spec, failing with [`VslError::UnknownParameter`].
    pub fn require(&self, id: u16) -> VslResult<&ParameterSpec> {
        self.get(id).ok_or(VslError::UnknownParameter(id))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&ParameterSpec> {
        self.params
            .values()
            .find(|spec| spec.name.eq_ignore_ascii_case(name))
    }

    pub fn contains(&self, id: u16) -> bool {
        self.params.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.params.values()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Calibration table recovered from the vendor driver.
///
/// `GAIN_CH1` coefficients reproduce the one confirmed hardware point
/// (75% -> 40793); its display range is the -10..+10 dB span the analyzer
/// reports.
pub fn builtin_specs() -> Vec<ParameterSpec> {
    vec![
        ParameterSpec::gain(PARAM_GAIN_CH1, "GAIN_CH1", -10.0, 20.0, 4.60517)
            .with_display_range(-10.0, 10.0),
        ParameterSpec::frequency(PARAM_HPF_FREQ_CH1, "HPF_FREQ_CH1", 20.0, 20000.0),
    ]
}
