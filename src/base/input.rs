use super::{Config, ParamLaminate, StrainPath};
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Holds the input data of a strain-path simulation on a single macro integration point
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StrainPathInput {
    /// Configuration of the homogenization engine
    pub config: Config,

    /// Parameters of the laminated microstructure
    pub laminate: ParamLaminate,

    /// Macro strain path
    pub path: StrainPath,
}

impl StrainPathInput {
    /// Reads a JSON file containing the input data
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn from<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let file = File::open(&path).map_err(|_| "file not found")?;
        let reader = BufReader::new(file);
        let input = serde_json::from_reader(reader).map_err(|_| "deserialize failed")?;
        Ok(input)
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        if let Some(msg) = self.config.validate() {
            return Some(msg);
        }
        if let Some(msg) = self.laminate.validate() {
            return Some(msg);
        }
        self.path.validate(self.config.nvoi())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
