//! Split-Payload Reassembler
//!
//! A reference payload too large for one request arrives in two parts. The
//! raw text of both parts is concatenated before anything is decoded.

use crate::error::AppError;

/// Phase flag carried by each compare request (`isBigUrlDone`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Payload complete in this request
    Single,
    /// First part of a two-part payload
    First,
    /// Final part of a two-part payload
    Final,
}

impl TryFrom<i64> for Phase {
    type Error = AppError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Phase::Single),
            1 => Ok(Phase::First),
            2 => Ok(Phase::Final),
            other => Err(AppError::InvalidPhase(other)),
        }
    }
}

/// Outcome of feeding one request into the assembler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assembly {
    /// First part stored; nothing to compare yet
    Pending,
    /// Complete payload text, ready to decode
    Complete(String),
}

/// Accumulates the first part of a split payload
#[derive(Debug, Default)]
pub struct PayloadAssembler {
    partial: Option<String>,
}

impl PayloadAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a first part is waiting for its completion
    pub fn is_pending(&self) -> bool {
        self.partial.is_some()
    }

    /// Feed the raw payload text of one request
    ///
    /// A final part without a stored first part is rejected rather than
    /// compared against stale or empty text.
    pub fn accept(&mut self, phase: Phase, text: String) -> Result<Assembly, AppError> {
        match phase {
            Phase::First => {
                if self.is_pending() {
                    tracing::warn!("Replacing unfinished split payload with a new first part");
                }
                self.partial = Some(text);
                Ok(Assembly::Pending)
            }
            Phase::Final => {
                let mut combined = self.partial.take().ok_or(AppError::MissingFirstPhase)?;
                combined.push_str(&text);
                Ok(Assembly::Complete(combined))
            }
            Phase::Single => {
                if self.partial.take().is_some() {
                    tracing::warn!("Discarding unfinished split payload, got a complete one");
                }
                Ok(Assembly::Complete(text))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::ReferenceBlob;

    #[test]
    fn test_phase_parsing() {
        assert_eq!(Phase::try_from(0).unwrap(), Phase::Single);
        assert_eq!(Phase::try_from(1).unwrap(), Phase::First);
        assert_eq!(Phase::try_from(2).unwrap(), Phase::Final);
        assert!(matches!(Phase::try_from(3), Err(AppError::InvalidPhase(3))));
        assert!(matches!(Phase::try_from(-1), Err(AppError::InvalidPhase(-1))));
    }

    #[test]
    fn test_single_phase() {
        let mut assembler = PayloadAssembler::new();
        let result = assembler.accept(Phase::Single, "QUJD".into()).unwrap();
        assert_eq!(result, Assembly::Complete("QUJD".into()));
        assert!(!assembler.is_pending());
    }

    #[test]
    fn test_two_phase_concatenation() {
        let mut assembler = PayloadAssembler::new();

        let first = assembler
            .accept(Phase::First, "data:video/mp4;base64,QU".into())
            .unwrap();
        assert_eq!(first, Assembly::Pending);
        assert!(assembler.is_pending());

        let Assembly::Complete(text) = assembler.accept(Phase::Final, "JD".into()).unwrap() else {
            panic!("expected a complete payload");
        };
        assert_eq!(text, "data:video/mp4;base64,QUJD");
        assert!(!assembler.is_pending());

        // Decoding happens on the full text only
        assert_eq!(ReferenceBlob::from_base64(&text).unwrap().data(), b"ABC");
    }

    #[test]
    fn test_final_without_first_is_rejected() {
        let mut assembler = PayloadAssembler::new();
        let result = assembler.accept(Phase::Final, "JD".into());
        assert!(matches!(result, Err(AppError::MissingFirstPhase)));
    }

    #[test]
    fn test_final_consumes_first() {
        let mut assembler = PayloadAssembler::new();
        assembler.accept(Phase::First, "QU".into()).unwrap();
        assembler.accept(Phase::Final, "JD".into()).unwrap();

        // A second final part has nothing to complete
        assert!(assembler.accept(Phase::Final, "JD".into()).is_err());
    }

    #[test]
    fn test_single_discards_partial() {
        let mut assembler = PayloadAssembler::new();
        assembler.accept(Phase::First, "stale".into()).unwrap();

        let result = assembler.accept(Phase::Single, "QUJD".into()).unwrap();
        assert_eq!(result, Assembly::Complete("QUJD".into()));
        assert!(!assembler.is_pending());
    }

    #[test]
    fn test_first_replaces_first() {
        let mut assembler = PayloadAssembler::new();
        assembler.accept(Phase::First, "old".into()).unwrap();
        assembler.accept(Phase::First, "QU".into()).unwrap();

        let result = assembler.accept(Phase::Final, "JD".into()).unwrap();
        assert_eq!(result, Assembly::Complete("QUJD".into()));
    }
}
