//! Capture list handed to a matching route body.

use std::any::type_name;
use std::ops::Deref;
use std::str::FromStr;

use crate::routing::error::CaptureError;

/// Values extracted by the guards of one attempt, in capture order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures(Vec<String>);

impl Captures {
    /// Raw capture at `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Parse the capture at `index` into `T`.
    pub fn parse<T: FromStr>(&self, index: usize) -> Result<T, CaptureError> {
        let value = self.get(index).ok_or(CaptureError::Missing(index))?;
        value.parse().map_err(|_| CaptureError::Parse {
            index,
            value: value.to_string(),
            expected: type_name::<T>(),
        })
    }

    /// Take ownership of the underlying values.
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl Deref for Captures {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for Captures {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl IntoIterator for Captures {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
