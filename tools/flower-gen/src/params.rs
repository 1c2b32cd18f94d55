//! Generation parameters
//!
//! [`PetalParams`] shape the 2D pattern; [`FlowerParameters`] size the 3D
//! model built from it. Both are plain serde structs so they can live in a
//! TOML or JSON file and be overridden field by field.

use crate::error::{FlowerError, Result};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;

/// Which reproductive parts a 3D flower carries
///
/// Stored as its numeric code (0 male, 1 female, 2 both); the variant name
/// is accepted on input too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sex {
    /// Stamens only
    Male,
    /// Pistil only
    Female,
    /// Pistil and stamens
    #[default]
    Both,
}

impl Sex {
    const NAMES: &'static [&'static str] = &["Male", "Female", "Both"];

    pub fn code(self) -> u8 {
        match self {
            Sex::Male => 0,
            Sex::Female => 1,
            Sex::Both => 2,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Sex::Male),
            1 => Some(Sex::Female),
            2 => Some(Sex::Both),
            _ => None,
        }
    }

    pub fn has_pistil(self) -> bool {
        matches!(self, Sex::Female | Sex::Both)
    }

    pub fn has_stamens(self) -> bool {
        matches!(self, Sex::Male | Sex::Both)
    }
}

impl Serialize for Sex {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.code())
    }
}

struct SexVisitor;

impl<'de> Visitor<'de> for SexVisitor {
    type Value = Sex;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("0 (Male), 1 (Female), 2 (Both) or one of those names")
    }

    fn visit_u64<E>(self, value: u64) -> std::result::Result<Sex, E>
    where
        E: de::Error,
    {
        Sex::from_code(value)
            .ok_or_else(|| de::Error::invalid_value(de::Unexpected::Unsigned(value), &self))
    }

    fn visit_i64<E>(self, value: i64) -> std::result::Result<Sex, E>
    where
        E: de::Error,
    {
        u64::try_from(value)
            .ok()
            .and_then(Sex::from_code)
            .ok_or_else(|| de::Error::invalid_value(de::Unexpected::Signed(value), &self))
    }

    fn visit_str<E>(self, value: &str) -> std::result::Result<Sex, E>
    where
        E: de::Error,
    {
        match value {
            "Male" => Ok(Sex::Male),
            "Female" => Ok(Sex::Female),
            "Both" => Ok(Sex::Both),
            _ => Err(de::Error::unknown_variant(value, Sex::NAMES)),
        }
    }
}

impl<'de> Deserialize<'de> for Sex {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(SexVisitor)
    }
}

/// Shape of the painted flower pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PetalParams {
    /// Outer petal radius in pixels
    pub radius: i32,
    /// Index of the outermost layer; layers run from `num_layers` down to 0
    #[serde(rename = "numLayers")]
    pub num_layers: i32,
    /// Angular frequency of the pattern
    #[serde(rename = "P")]
    pub p: f32,
    /// Constant fed to the pattern function
    pub bias: f32,
}

impl Default for PetalParams {
    fn default() -> Self {
        Self {
            radius: 64,
            num_layers: 3,
            p: 6.0,
            bias: 1.0,
        }
    }
}

impl PetalParams {
    /// Reject values that cannot produce an image
    pub fn validate(&self) -> Result<()> {
        if self.radius <= 0 {
            return Err(FlowerError::InvalidArgument(format!(
                "petals.radius must be positive, got {}",
                self.radius
            )));
        }
        if self.num_layers < 0 {
            return Err(FlowerError::InvalidArgument(format!(
                "petals.numLayers must not be negative, got {}",
                self.num_layers
            )));
        }
        Ok(())
    }
}

/// Dimensions and switches for 3D flower assembly (world units are meters)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlowerParameters {
    pub sex: Sex,
    /// Attach a procedural normal map to every petal layer
    pub use_normals: bool,
    /// Attach an emissive map and point-light hints to every petal layer
    pub use_emissive: bool,

    // Stem
    pub stem_height: f32,
    pub stem_radius: f32,
    pub stem_segments: u32,

    // Pistil
    pub pistil_style_height: f32,
    pub pistil_style_radius: f32,
    pub pistil_stigma_radial_segments: u32,
    pub pistil_stigma_height: f32,
    pub pistil_stigma_max_width_factor: f32,
    pub pistil_stigma_tip_narrow_factor: f32,

    // Stamens
    pub stamen_count: u32,
    /// Distance of each stamen from the flower axis
    pub stamen_ring_radius: f32,
    pub stamen_filament_radial_segments: u32,
    pub stamen_filament_height: f32,
    pub stamen_filament_radius: f32,
    pub stamen_anther_radial_segments: u32,
    pub stamen_anther_height: f32,

    // Petals
    /// World units per source pixel
    pub petal_scale_factor: f32,
    /// Inner ring radius in source pixels
    pub connection_radius_px: f32,
    /// Radius in source pixels where droop begins
    pub droop_start_radius_px: f32,
    pub peak_height_offset: f32,
    pub petal_droop_factor: f32,
    pub layer_vertical_spacing: f32,
    pub connection_vertical_offset: f32,

    // Reconstruction
    pub contour_simplification_tolerance: f32,
    pub alpha_threshold: u8,
}

impl Default for FlowerParameters {
    fn default() -> Self {
        Self {
            sex: Sex::Both,
            use_normals: true,
            use_emissive: false,
            stem_height: 0.5,
            stem_radius: 0.005,
            stem_segments: 12,
            pistil_style_height: 0.050,
            pistil_style_radius: 0.0005,
            pistil_stigma_radial_segments: 12,
            pistil_stigma_height: 0.002,
            pistil_stigma_max_width_factor: 2.0,
            pistil_stigma_tip_narrow_factor: 0.01,
            stamen_count: 6,
            stamen_ring_radius: 0.0025,
            stamen_filament_radial_segments: 12,
            stamen_filament_height: 0.052,
            stamen_filament_radius: 0.0005,
            stamen_anther_radial_segments: 12,
            stamen_anther_height: 0.002,
            petal_scale_factor: 0.008,
            connection_radius_px: 0.2,
            droop_start_radius_px: 0.4,
            peak_height_offset: 0.04,
            petal_droop_factor: 0.30,
            layer_vertical_spacing: 0.004,
            connection_vertical_offset: -0.0469,
            contour_simplification_tolerance: 0.5,
            alpha_threshold: 10,
        }
    }
}

impl FlowerParameters {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load from a `.toml` or `.json` file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "toml" => Self::from_toml_str(&text),
            "json" => Self::from_json_str(&text),
            _ => Err(FlowerError::InvalidArgument(format!(
                "unsupported parameter file {:?} (use .toml or .json)",
                path
            ))),
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = FlowerParameters::default();
        assert_eq!(params.sex, Sex::Both);
        assert_eq!(params.stem_segments, 12);
        assert_eq!(params.stamen_count, 6);
        assert_eq!(params.alpha_threshold, 10);
        assert_eq!(PetalParams::default().num_layers, 3);
    }

    #[test]
    fn test_partial_toml_override() {
        let params = FlowerParameters::from_toml_str(
            r#"
            sex = "Female"
            stemHeight = 0.25
            useEmissive = true
            "#,
        )
        .unwrap();

        assert_eq!(params.sex, Sex::Female);
        assert_eq!(params.stem_height, 0.25);
        assert!(params.use_emissive);
        assert_eq!(params.stem_radius, 0.005);
    }

    #[test]
    fn test_json_round_trip_keys() {
        let value = FlowerParameters::default().to_json().unwrap();
        assert!(value.get("petalScaleFactor").is_some());
        assert_eq!(value["sex"], serde_json::json!(2));
        assert!(value.get("contourSimplificationTolerance").is_some());

        let back: FlowerParameters = serde_json::from_value(value).unwrap();
        assert_eq!(back, FlowerParameters::default());
    }

    #[test]
    fn test_petal_params_field_names() {
        let petals: PetalParams =
            serde_json::from_str(r#"{"radius": 32, "numLayers": 2, "P": 4.0, "bias": 0.5}"#)
                .unwrap();
        assert_eq!(petals.radius, 32);
        assert_eq!(petals.num_layers, 2);
        assert_eq!(petals.p, 4.0);
        assert!(petals.validate().is_ok());

        let bad = PetalParams { radius: 0, ..petals };
        assert!(matches!(bad.validate(), Err(FlowerError::InvalidArgument(_))));
    }

    #[test]
    fn test_sex_parts() {
        assert!(Sex::Male.has_stamens() && !Sex::Male.has_pistil());
        assert!(Sex::Female.has_pistil() && !Sex::Female.has_stamens());
        assert!(Sex::Both.has_pistil() && Sex::Both.has_stamens());
    }

    #[test]
    fn test_sex_accepts_numeric_codes() {
        let json = FlowerParameters::from_json_str(r#"{"sex": 2}"#).unwrap();
        assert_eq!(json.sex, Sex::Both);

        let toml = FlowerParameters::from_toml_str("sex = 0").unwrap();
        assert_eq!(toml.sex, Sex::Male);

        let named = FlowerParameters::from_json_str(r#"{"sex": "Female"}"#).unwrap();
        assert_eq!(named.sex, Sex::Female);

        assert!(FlowerParameters::from_json_str(r#"{"sex": 3}"#).is_err());
        assert!(FlowerParameters::from_toml_str("sex = -1").is_err());
        assert!(FlowerParameters::from_json_str(r#"{"sex": "Neither"}"#).is_err());
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.yaml");
        std::fs::write(&path, "stemHeight: 1").unwrap();
        assert!(matches!(
            FlowerParameters::load(&path),
            Err(FlowerError::InvalidArgument(_))
        ));
    }
}
