// ============================================================
// Layer 3 — WidthSchedule
// ============================================================
// The ordered list of layer widths [w0, w1, ..., wk] that fixes
// the whole autoencoder topology:
//
//   encoder:  input_width → w0 → w1 → ... → wk   (wk = embedding)
//   decoder:  wk → ... → w1 → w0 → input_width
//
// w0 is the first hidden width, never the raw input width.
// At least two widths are required so that the stack after the
// input projection has at least one transform to mirror.

use serde::{Deserialize, Serialize};

use crate::domain::error::{AutoEncoderError, ModelResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct WidthSchedule(Vec<usize>);

impl WidthSchedule {
    /// Validate and wrap a list of widths.
    pub fn new(widths: Vec<usize>) -> ModelResult<Self> {
        if widths.len() < 2 {
            return Err(AutoEncoderError::configuration(format!(
                "width schedule needs at least 2 widths, got {:?}",
                widths
            )));
        }
        if let Some(pos) = widths.iter().position(|&w| w == 0) {
            return Err(AutoEncoderError::configuration(format!(
                "width schedule {:?} has a zero width at position {}",
                widths, pos
            )));
        }
        Ok(Self(widths))
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// First hidden width, the target of the input projection.
    pub fn first(&self) -> usize {
        self.0[0]
    }

    /// Last width, the embedding dimensionality.
    pub fn embedding_width(&self) -> usize {
        self.0[self.0.len() - 1]
    }

    /// The mirrored schedule the decoder is built from.
    pub fn reversed(&self) -> WidthSchedule {
        let mut widths = self.0.clone();
        widths.reverse();
        WidthSchedule(widths)
    }
}

impl TryFrom<Vec<usize>> for WidthSchedule {
    type Error = AutoEncoderError;

    fn try_from(widths: Vec<usize>) -> ModelResult<Self> {
        Self::new(widths)
    }
}

impl From<WidthSchedule> for Vec<usize> {
    fn from(s: WidthSchedule) -> Self {
        s.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_single_width() {
        let err = WidthSchedule::new(vec![10]).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_rejects_empty() {
        assert!(WidthSchedule::new(vec![]).unwrap_err().is_configuration());
    }

    #[test]
    fn test_rejects_zero_width() {
        let err = WidthSchedule::new(vec![500, 0, 10]).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("position 1"));
    }

    #[test]
    fn test_accessors() {
        let s = WidthSchedule::new(vec![500, 500, 2000, 10]).unwrap();
        assert_eq!(s.first(), 500);
        assert_eq!(s.embedding_width(), 10);
        assert_eq!(s.reversed().as_slice(), &[10, 2000, 500, 500]);
    }

    #[test]
    fn test_serde_validates() {
        let ok: WidthSchedule = serde_json::from_str("[64, 8]").unwrap();
        assert_eq!(ok.as_slice(), &[64, 8]);
        assert!(serde_json::from_str::<WidthSchedule>("[64]").is_err());
    }
}
