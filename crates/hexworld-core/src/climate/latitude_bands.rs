//! Latitude profiles for heat and zonal moisture.
//!
//! Zonal moisture follows Earth-like bands:
//!   - ITCZ equatorial peak  (0–10°)
//!   - Subtropical arid belt (≈25–35°)
//!   - Temperate westerlies  (≈45–55°)
//!   - Polar minimum         (>65°)

/// Normalised latitude of row `r`: 0 on the equator, 1 at either pole.
pub fn latitude(r: u32, height: u32) -> f64 {
    (2.0 * (r as f64 + 0.5) / height as f64 - 1.0).abs()
}

/// Sea-level heat at normalised latitude `lat`.
pub fn base_heat(lat: f64) -> f32 {
    (1.0 - lat.clamp(0.0, 1.0).powf(1.25)) as f32
}

/// Heat after the altitude lapse, clamped to `[0, 1]`.
pub fn heat(lat: f64, height: f32, lapse_rate: f32) -> f32 {
    (base_heat(lat) - lapse_rate * height.max(0.0)).clamp(0.0, 1.0)
}

/// Zonal precipitation profile in mm/yr at `lat_deg` (−90 to +90).
pub fn zonal_profile_mm(lat_deg: f64) -> f64 {
    let lat_abs = lat_deg.abs();

    // ITCZ: Gaussian peak centred on equator, σ ≈ 12°.
    let equatorial = 2200.0 * (-lat_abs * lat_abs / 288.0_f64).exp();

    // Subtropical arid belt: negative Gaussian centred at 28°, σ ≈ 8°.
    let subtropical_arid = -800.0 * (-(lat_abs - 28.0).powi(2) / 128.0_f64).exp();

    // Temperate westerlies: secondary peak centred at 50°, σ ≈ 15°.
    let temperate = 600.0 * (-(lat_abs - 50.0).powi(2) / 450.0_f64).exp();

    let polar_base = 200.0_f64;

    (equatorial + subtropical_arid + temperate + polar_base).max(80.0)
}

/// Reference precipitation mapped to zonal moisture 1.0.
const ZONAL_REFERENCE_MM: f64 = 2400.0;

/// Zonal moisture term in `[0, 1]` at normalised latitude `lat`.
pub fn zonal_moisture(lat: f64) -> f32 {
    (zonal_profile_mm(lat * 90.0) / ZONAL_REFERENCE_MM).clamp(0.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn latitude_is_symmetric_about_the_equator() {
        let h = 64;
        for r in 0..h / 2 {
            assert_abs_diff_eq!(latitude(r, h), latitude(h - 1 - r, h), epsilon = 1e-12);
        }
        assert!(latitude(0, h) > 0.95);
        assert!(latitude(h / 2, h) < 0.05);
    }

    #[test]
    fn heat_falls_toward_poles_and_with_altitude() {
        assert_abs_diff_eq!(base_heat(0.0), 1.0);
        assert_abs_diff_eq!(base_heat(1.0), 0.0);
        assert!(base_heat(0.3) > base_heat(0.6));
        assert!(heat(0.2, 0.8, 0.6) < heat(0.2, 0.0, 0.6));
        // Below sea level the lapse does not warm the cell.
        assert_abs_diff_eq!(heat(0.2, -0.5, 0.6), base_heat(0.2));
        assert_abs_diff_eq!(heat(1.0, 1.0, 0.6), 0.0);
    }

    #[test]
    fn equator_is_wetter_than_subtropics() {
        let equatorial = zonal_profile_mm(5.0);
        let subtropical = zonal_profile_mm(28.0);
        assert!(equatorial > 1500.0);
        assert!(subtropical < equatorial);
        assert!(zonal_moisture(0.0) > zonal_moisture(28.0 / 90.0));
    }

    #[test]
    fn zonal_moisture_stays_in_unit_range() {
        for k in 0..=100 {
            let m = zonal_moisture(k as f64 / 100.0);
            assert!((0.0..=1.0).contains(&m), "lat {k}%: {m}");
        }
    }

    #[test]
    fn profile_is_symmetric() {
        for lat in [10.0_f64, 30.0, 50.0, 70.0] {
            assert_abs_diff_eq!(zonal_profile_mm(lat), zonal_profile_mm(-lat), epsilon = 1e-9);
        }
    }
}
