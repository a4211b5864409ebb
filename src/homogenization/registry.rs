use super::GaussPointRecord;
use crate::StrError;
use std::collections::HashMap;

/// Holds the Gauss point records keyed by the identifier given by the macro-scale caller
///
/// Iteration follows the insertion order.
pub struct Registry {
    /// Number of Voigt components
    nvoi: usize,

    /// All records in insertion order
    records: Vec<GaussPointRecord>,

    /// Maps id to position in records
    index: HashMap<usize, usize>,
}

impl Registry {
    /// Allocates a new (empty) instance
    pub fn new(nvoi: usize) -> Self {
        Registry {
            nvoi,
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Returns the number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns true if a record with the given id exists
    pub fn contains(&self, id: usize) -> bool {
        self.index.contains_key(&id)
    }

    /// Overwrites the strain of an existing record or inserts a new (elastic) record
    ///
    /// Returns true if a new record has been inserted.
    pub fn upsert(&mut self, id: usize, strain: &[f64]) -> Result<bool, StrError> {
        if strain.len() != self.nvoi {
            return Err("strain vector must have nvoi components");
        }
        match self.index.get(&id) {
            Some(pos) => {
                self.records[*pos].set_macro_strain(strain);
                Ok(false)
            }
            None => {
                self.index.insert(id, self.records.len());
                self.records.push(GaussPointRecord::new(id, strain));
                Ok(true)
            }
        }
    }

    /// Returns an access to a record
    pub fn get(&self, id: usize) -> Result<&GaussPointRecord, StrError> {
        let pos = self.index.get(&id).ok_or("cannot find Gauss point with the given id")?;
        Ok(&self.records[*pos])
    }

    /// Returns a mutable access to a record
    pub fn get_mut(&mut self, id: usize) -> Result<&mut GaussPointRecord, StrError> {
        let pos = self.index.get(&id).ok_or("cannot find Gauss point with the given id")?;
        Ok(&mut self.records[*pos])
    }

    /// Returns an iterator over the records in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, GaussPointRecord> {
        self.records.iter()
    }

    /// Returns a mutable iterator over the records in insertion order
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, GaussPointRecord> {
        self.records.iter_mut()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
