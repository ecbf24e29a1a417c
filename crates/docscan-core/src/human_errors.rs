// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for people scanning a page.
//
// Each scan failure maps to plain English with a clear suggestion, so a display
// layer can tell "this file is unreadable" apart from "retake the photo".

use crate::error::ScanError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// User must do something (retake the photo, change the background).
    ActionRequired,
    /// Retrying the same input will never work.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `ScanError` into a `HumanError`.
pub fn humanize_error(err: &ScanError) -> HumanError {
    match err {
        ScanError::LoadFailure(detail) => HumanError {
            message: "We couldn't open this image.".into(),
            suggestion: format!(
                "The file may be missing, damaged, or not a picture. Try saving it as a JPEG or PNG first. ({detail})"
            ),
            severity: Severity::Permanent,
        },
        ScanError::NoDocumentFound(_) => HumanError {
            message: "We couldn't find the edges of a page in this photo.".into(),
            suggestion: "Place the page on a darker, plain surface so all four corners are visible, then take the photo again.".into(),
            severity: Severity::ActionRequired,
        },
    }
}
