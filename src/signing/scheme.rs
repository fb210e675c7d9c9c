//! Signing schemes: which variants a dispatch attempts, and in what order.

use crate::config::schema::{SigningConfig, SigningMode};
use crate::signing::variant::SigningVariant;

/// The rule set that decides which signing variants are attempted.
pub trait SigningScheme: Send + Sync {
    /// Label for logs.
    fn name(&self) -> &'static str;

    /// Variants in attempt order. Never empty.
    fn variants(&self) -> &[SigningVariant];
}

/// Tries every known variant in the fixed order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackScheme;

impl SigningScheme for FallbackScheme {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn variants(&self) -> &[SigningVariant] {
        &SigningVariant::ALL
    }
}

/// A single, confirmed variant.
#[derive(Debug, Clone, Copy)]
pub struct FixedScheme {
    variant: [SigningVariant; 1],
}

impl FixedScheme {
    pub fn new(variant: SigningVariant) -> Self {
        Self { variant: [variant] }
    }
}

impl SigningScheme for FixedScheme {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn variants(&self) -> &[SigningVariant] {
        &self.variant
    }
}

/// Build the scheme described by configuration.
///
/// Unknown variant names are rejected during config validation, so this falls
/// back to the first variant only for configs that skipped validation.
pub fn from_config(config: &SigningConfig) -> Box<dyn SigningScheme> {
    match config.mode {
        SigningMode::Fallback => Box::new(FallbackScheme),
        SigningMode::Fixed => {
            let variant = config
                .variant
                .parse()
                .unwrap_or(SigningVariant::MS_WITH_QUERY);
            Box::new(FixedScheme::new(variant))
        }
    }
}
