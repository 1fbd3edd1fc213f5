use std::sync::Arc;

use crate::bits;
use crate::core_api::{CoreError, Result};
use crate::field::{Field, FieldTable};

/// Fixed-length lsb0 bit buffer addressed through a [`FieldTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitStructure {
    bits: Vec<bool>,
    fields: Arc<FieldTable>,
}

impl BitStructure {
    pub fn new(fields: Arc<FieldTable>) -> Result<Self> {
        fields.validate()?;
        Ok(Self {
            bits: vec![false; fields.total_bits()],
            fields,
        })
    }

    pub fn from_bits(fields: Arc<FieldTable>, bits: Vec<bool>) -> Result<Self> {
        fields.validate()?;
        if bits.len() != fields.total_bits() {
            return Err(CoreError::invalid(format!(
                "expected {} payload bits for {}, got {}",
                fields.total_bits(),
                fields.name(),
                bits.len()
            )));
        }
        Ok(Self { bits, fields })
    }

    pub fn fields(&self) -> &FieldTable {
        &self.fields
    }

    pub fn total_bits(&self) -> usize {
        self.fields.total_bits()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        bits::to_bytes(&self.bits)
    }

    pub fn get(&self, id: &str) -> Result<i64> {
        let field = self.fields.field(id)?;
        Ok((self.read_raw(field) as i64).wrapping_add(field.numeric_offset))
    }

    pub fn set(&mut self, id: &str, value: i64) -> Result<()> {
        let field = self.fields.field(id)?;
        if value < field.min_value() || value > field.max_value() {
            return Err(CoreError::range(
                id,
                value,
                field.min_value(),
                field.max_value(),
            ));
        }
        let raw = (value - field.numeric_offset) as u64;
        let range = field.slice();
        for (k, bit) in self.bits[range].iter_mut().enumerate() {
            *bit = (raw >> k) & 1 == 1;
        }
        Ok(())
    }

    fn read_raw(&self, field: &Field) -> u64 {
        self.bits[field.slice()]
            .iter()
            .enumerate()
            .fold(0u64, |acc, (k, &bit)| acc | (u64::from(bit) << k))
    }
}
