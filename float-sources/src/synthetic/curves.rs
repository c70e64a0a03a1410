//! Climatology-shaped curves per variable.
//!
//! Shapes only need to be plausible: a warm mixed layer over a thermocline,
//! fresher Bay of Bengal and saltier Arabian Sea surface water, an oxygen
//! minimum at intermediate depth, nutrients rising with depth.

use std::f64::consts::PI;

use ocean_model::{NamedSea, Variable};

/// Mixed-layer depth below which temperature starts relaxing (m).
pub const MIXED_LAYER_M: f64 = 50.0;
/// e-folding scale of the thermocline (m).
pub const THERMOCLINE_EFOLD_M: f64 = 350.0;
/// Abyssal temperature the profile relaxes to (°C).
pub const DEEP_TEMPERATURE_C: f64 = 2.0;
/// Salinity of intermediate/deep water (PSU).
pub const DEEP_SALINITY_PSU: f64 = 34.7;

/// Where and when a value is evaluated.
#[derive(Debug, Clone, Copy)]
pub struct Site {
    pub latitude: f64,
    pub depth: f64,
    pub day_of_year: u32,
    pub sea: Option<NamedSea>,
}

/// Noise-free value of `variable` at `site`.
pub fn baseline(variable: Variable, site: Site) -> f64 {
    let d = site.depth.max(0.0);
    match variable {
        Variable::Temperature => {
            let surface = surface_temperature(site);
            let below = (d - MIXED_LAYER_M).max(0.0);
            DEEP_TEMPERATURE_C + (surface - DEEP_TEMPERATURE_C) * (-below / THERMOCLINE_EFOLD_M).exp()
        }
        Variable::Salinity => {
            let surface = match site.sea {
                Some(NamedSea::BayOfBengal) => 33.5,
                Some(NamedSea::ArabianSea) => 36.5,
                _ => 35.0,
            };
            DEEP_SALINITY_PSU + (surface - DEEP_SALINITY_PSU) * (-d / 300.0).exp()
        }
        Variable::Oxygen => {
            let surface = if site.latitude.abs() > 30.0 { 280.0 } else { 250.0 };
            let omz_strength = match site.sea {
                Some(NamedSea::ArabianSea) => 0.9,
                Some(NamedSea::BayOfBengal) => 0.8,
                _ => 0.6,
            };
            // Minimum centered near 600 m, spanning roughly 100-1500 m.
            let dip = (-((d - 600.0) / 450.0).powi(2)).exp();
            surface * (0.55 + 0.45 * (-d / 800.0).exp()) * (1.0 - omz_strength * dip)
        }
        Variable::Pressure => d * 1.01,
        Variable::Chlorophyll => {
            let coastal = match site.sea {
                Some(NamedSea::BayOfBengal | NamedSea::ArabianSea) => 1.5,
                _ => 1.0,
            };
            0.01 + 0.3 * coastal * (-d / 60.0).exp()
        }
        Variable::Nitrate => 35.0 * (1.0 - (-d / 400.0).exp()),
        Variable::Ph => 7.75 + 0.35 * (-d / 500.0).exp(),
        Variable::Density => 1022.0 + 5.5 * (1.0 - (-d / 300.0).exp()),
    }
}

fn surface_temperature(site: Site) -> f64 {
    let lat = site.latitude;
    let regional = match site.sea {
        Some(NamedSea::BayOfBengal) => 1.0,
        Some(NamedSea::ArabianSea) => 0.5,
        Some(NamedSea::SouthernOcean) => -2.0,
        _ => 0.0,
    };
    // Warmest around day 110 in the north, opposite phase in the south.
    let phase = 2.0 * PI * (site.day_of_year as f64 - 20.0) / 365.0;
    let seasonal = 1.5 * phase.sin() * lat.signum() * (lat.abs() / 30.0).min(1.0);
    28.0 - 0.0045 * lat * lat + regional + seasonal
}

/// Amplitude of the perturbation added to the baseline.
pub fn noise_amplitude(variable: Variable) -> f64 {
    match variable {
        Variable::Temperature => 0.3,
        Variable::Salinity => 0.05,
        Variable::Oxygen => 5.0,
        Variable::Pressure => 0.5,
        Variable::Chlorophyll => 0.02,
        Variable::Nitrate => 0.5,
        Variable::Ph => 0.01,
        Variable::Density => 0.05,
    }
}

/// Physically plausible bounds every generated value is clamped into.
pub fn plausible_range(variable: Variable) -> (f64, f64) {
    match variable {
        Variable::Temperature => (-2.0, 35.0),
        Variable::Salinity => (30.0, 40.0),
        Variable::Oxygen => (0.0, 400.0),
        Variable::Pressure => (0.0, 11_200.0),
        Variable::Chlorophyll => (0.0, 20.0),
        Variable::Nitrate => (0.0, 45.0),
        Variable::Ph => (7.5, 8.4),
        Variable::Density => (1020.0, 1029.0),
    }
}
