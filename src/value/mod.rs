use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ConversionError, LookupError};

pub mod sequence;

pub use sequence::*;

/// Name of the RF raster time definition (seconds).
pub const RF_RASTER_TIME: &str = "RadiofrequencyRasterTime";
/// Name of the gradient raster time definition (seconds).
pub const GRADIENT_RASTER_TIME: &str = "GradientRasterTime";
/// Name of the block duration raster definition (seconds).
pub const BLOCK_DURATION_RASTER: &str = "BlockDurationRaster";
/// Name of the ADC raster time definition (seconds), optional.
pub const ADC_RASTER_TIME: &str = "AdcRasterTime";

/// Global named definitions of a sequence, written to `[DEFINITIONS]`.
///
/// Backed by a [`BTreeMap`] so iteration (and therefore the file) is sorted by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Definitions(pub BTreeMap<String, Definition>);

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Typed lookup of a definition, see [`Definition`] for the supported types.
    pub fn get<T>(&self, key: &str) -> Result<T, LookupError>
    where
        T: TryFrom<Definition, Error = ConversionError>,
    {
        match self.0.get(key) {
            Some(value) => value
                .clone()
                .try_into()
                .map_err(LookupError::ConversionError),
            None => Err(LookupError::KeyError),
        }
    }

    /// Numeric lookup which accepts both `Int` and `Float` definitions.
    pub fn get_number(&self, key: &str) -> Result<f64, LookupError> {
        match self.0.get(key) {
            Some(Definition::Int(x)) => Ok(*x as f64),
            Some(other) => {
                f64::try_from(other.clone()).map_err(LookupError::ConversionError)
            }
            None => Err(LookupError::KeyError),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Definition>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Definition)> {
        self.0.iter()
    }

    /// The typical raster times of a Siemens scanner, as used by most Pulseq sequences.
    pub fn with_default_rasters() -> Self {
        let mut defs = Self::new();
        defs.insert(ADC_RASTER_TIME, 100e-9)
            .insert(BLOCK_DURATION_RASTER, 10e-6)
            .insert(GRADIENT_RASTER_TIME, 10e-6)
            .insert(RF_RASTER_TIME, 1e-6);
        defs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Definition {
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<f64>),
}

// ===========================================================
// CONVERSION: Dynamic typed Definition <-> Static typed Rust
// ===========================================================

impl Definition {
    fn type_name(&self) -> &'static str {
        use std::any::type_name_of_val;

        match self {
            Definition::Int(x) => type_name_of_val(x),
            Definition::Float(x) => type_name_of_val(x),
            Definition::Str(x) => type_name_of_val(x),
            Definition::List(x) => type_name_of_val(x),
        }
    }
}

macro_rules! impl_definition {
    ($rust_type:ty, $def_type:ident) => {
        impl From<$rust_type> for Definition {
            fn from(value: $rust_type) -> Self {
                Definition::$def_type(value)
            }
        }

        impl TryFrom<Definition> for $rust_type {
            type Error = ConversionError;

            fn try_from(value: Definition) -> Result<Self, Self::Error> {
                match value {
                    Definition::$def_type(value) => Ok(value),
                    _ => Err(ConversionError {
                        from: value.type_name(),
                        into: std::any::type_name::<$rust_type>(),
                    }),
                }
            }
        }
    };
}

impl_definition!(i64, Int);
impl_definition!(f64, Float);
impl_definition!(String, Str);
impl_definition!(Vec<f64>, List);

impl From<&str> for Definition {
    fn from(value: &str) -> Self {
        Definition::Str(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_lookup() {
        let mut defs = Definitions::new();
        defs.insert("Name", "spin echo")
            .insert("FOV", vec![0.2, 0.2, 0.005]);

        assert_eq!(defs.get::<String>("Name").unwrap(), "spin echo");
        assert_eq!(defs.get::<Vec<f64>>("FOV").unwrap(), vec![0.2, 0.2, 0.005]);
        assert!(matches!(defs.get::<f64>("Missing"), Err(LookupError::KeyError)));
    }

    #[test]
    fn wrong_type_names_both_sides() {
        let mut defs = Definitions::new();
        defs.insert("Name", "gre");

        let Err(LookupError::ConversionError(err)) = defs.get::<f64>("Name") else {
            panic!("expected a conversion error");
        };
        assert_eq!(err.from, "alloc::string::String");
        assert_eq!(err.into, "f64");
    }

    #[test]
    fn numbers_accept_ints() {
        let mut defs = Definitions::new();
        defs.insert("Repetitions", 3i64).insert(GRADIENT_RASTER_TIME, 10e-6);

        assert_eq!(defs.get_number("Repetitions").unwrap(), 3.0);
        assert_eq!(defs.get_number(GRADIENT_RASTER_TIME).unwrap(), 10e-6);
    }

    #[test]
    fn default_rasters_are_sorted() {
        let defs = Definitions::with_default_rasters();
        let names: Vec<_> = defs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            [
                ADC_RASTER_TIME,
                BLOCK_DURATION_RASTER,
                GRADIENT_RASTER_TIME,
                RF_RASTER_TIME
            ]
        );
    }
}
