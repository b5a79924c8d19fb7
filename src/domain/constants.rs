//! Physical constants in SI units.

/// Newton's gravitational constant, m^3 kg^-1 s^-2.
pub const G_SI: f64 = 6.674_30e-11;

/// Speed of light in vacuum, m / s.
pub const C_SI: f64 = 299_792_458.0;

/// Solar mass, kg.
pub const MSUN_SI: f64 = 1.988_409_902_147_041_6e30;

/// One megaparsec, m.
pub const MPC_SI: f64 = 3.085_677_581_491_367_3e22;

/// Geometrized solar mass in seconds, `G M_sun / c^3`.
pub const MTSUN_SI: f64 = 4.925_490_947_641_267e-6;

/// Strain amplitude scale `G M / (c^2 D)` for a total mass (solar masses)
/// at a distance (megaparsecs).
pub fn strain_scale(total_mass: f64, distance_mpc: f64) -> f64 {
    (total_mass * MSUN_SI) / (distance_mpc * MPC_SI) * (G_SI / (C_SI * C_SI))
}

/// Seconds per unit of geometric time `t / M` for a total mass in solar masses.
pub fn time_scale(total_mass: f64) -> f64 {
    MTSUN_SI * total_mass
}
