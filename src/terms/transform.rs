//! Monotonic transformations applied to quantitative terms.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Function applied after the shift and scale of a variable.
#[derive(Debug, Clone, Copy, Default)]
pub enum Transform {
    #[default]
    Identity,
    /// Real power `v^p`.
    Power(f64),
    Log,
    Log10,
    Log2,
    Exp,
    Sqrt,
}

impl Transform {
    /// Apply the function to a single value.
    pub fn apply(&self, v: f64) -> f64 {
        match self {
            Transform::Identity => v,
            Transform::Power(p) => v.powf(*p),
            Transform::Log => v.ln(),
            Transform::Log10 => v.log10(),
            Transform::Log2 => v.log2(),
            Transform::Exp => v.exp(),
            Transform::Sqrt => v.sqrt(),
        }
    }

    /// Inverse of [`Transform::apply`].
    pub fn invert(&self, v: f64) -> f64 {
        match self {
            Transform::Identity => v,
            Transform::Power(p) => v.powf(1.0 / p),
            Transform::Log => v.exp(),
            Transform::Log10 => 10f64.powf(v),
            Transform::Log2 => v.exp2(),
            Transform::Exp => v.ln(),
            Transform::Sqrt => v * v,
        }
    }

    fn key(&self) -> (u8, u64) {
        match self {
            Transform::Identity => (0, 0),
            Transform::Power(p) => (1, p.to_bits()),
            Transform::Log => (2, 0),
            Transform::Log10 => (3, 0),
            Transform::Log2 => (4, 0),
            Transform::Exp => (5, 0),
            Transform::Sqrt => (6, 0),
        }
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Transform {}

impl Hash for Transform {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// `f((v + shift) * coefficient)` for a function `f`.
#[derive(Debug, Clone, Copy)]
pub struct Transformation {
    pub function: Transform,
    pub shift: f64,
    pub coefficient: f64,
}

impl Default for Transformation {
    fn default() -> Self {
        Self {
            function: Transform::Identity,
            shift: 0.0,
            coefficient: 1.0,
        }
    }
}

impl Transformation {
    /// True when the transformation leaves values unchanged.
    pub fn is_identity(&self) -> bool {
        self.function == Transform::Identity && self.shift == 0.0 && self.coefficient == 1.0
    }

    /// Transform a raw value.
    pub fn apply(&self, v: f64) -> f64 {
        self.function.apply((v + self.shift) * self.coefficient)
    }

    /// Map a transformed value back to the raw scale.
    pub fn untransform(&self, v: f64) -> f64 {
        self.function.invert(v) / self.coefficient - self.shift
    }

    /// Replace the function, composing powers. A unit power is the identity.
    pub(crate) fn with_function(mut self, function: Transform) -> Self {
        self.function = match (self.function, function) {
            (Transform::Power(a), Transform::Power(b)) => Transform::Power(a * b),
            (_, f) => f,
        };
        if self.function == Transform::Power(1.0) {
            self.function = Transform::Identity;
        }
        self
    }

    /// Label of the transformed variable, e.g. `log((x + 1))` or `x^2`.
    pub fn label(&self, name: &str) -> String {
        let mut inner = name.to_string();
        if self.shift != 0.0 {
            inner = if self.shift > 0.0 {
                format!("({inner} + {})", self.shift)
            } else {
                format!("({inner} - {})", -self.shift)
            };
        }
        if self.coefficient != 1.0 {
            inner = format!("{}*{inner}", self.coefficient);
        }
        match self.function {
            Transform::Identity => inner,
            Transform::Power(p) if p == 1.0 => inner,
            Transform::Power(p) => format!("{inner}^{p}"),
            Transform::Log => format!("log({inner})"),
            Transform::Log10 => format!("log10({inner})"),
            Transform::Log2 => format!("log2({inner})"),
            Transform::Exp => format!("exp({inner})"),
            Transform::Sqrt => format!("sqrt({inner})"),
        }
    }

    fn key(&self) -> ((u8, u64), u64, u64) {
        // -0.0 and 0.0 are the same shift
        let shift = if self.shift == 0.0 { 0.0 } else { self.shift };
        (self.function.key(), shift.to_bits(), self.coefficient.to_bits())
    }
}

impl PartialEq for Transformation {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Transformation {}

impl Hash for Transformation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Identity => write!(f, "identity"),
            Transform::Power(p) => write!(f, "power({p})"),
            Transform::Log => write!(f, "log"),
            Transform::Log10 => write!(f, "log10"),
            Transform::Log2 => write!(f, "log2"),
            Transform::Exp => write!(f, "exp"),
            Transform::Sqrt => write!(f, "sqrt"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_apply_and_untransform() {
        let t = Transformation {
            function: Transform::Log,
            shift: 1.0,
            coefficient: 2.0,
        };
        let v = t.apply(3.0);
        assert_relative_eq!(v, 8.0_f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(t.untransform(v), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_power_inverse() {
        let t = Transformation::default().with_function(Transform::Power(2.0));
        assert_eq!(t.apply(3.0), 9.0);
        assert_relative_eq!(t.untransform(9.0), 3.0, epsilon = 1e-12);

        let composed = t.with_function(Transform::Power(0.5));
        assert_eq!(composed.function, Transform::Identity);
        assert!(composed.is_identity());
        assert_eq!(Transformation::default().with_function(Transform::Power(1.0)), Transformation::default());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Transformation::default().label("x"), "x");

        let log_shift = Transformation {
            function: Transform::Log,
            shift: 1.0,
            coefficient: 1.0,
        };
        assert_eq!(log_shift.label("x"), "log((x + 1))");

        let square = Transformation::default().with_function(Transform::Power(2.0));
        assert_eq!(square.label("x"), "x^2");

        let scaled = Transformation {
            function: Transform::Identity,
            shift: -2.5,
            coefficient: 3.0,
        };
        assert_eq!(scaled.label("z"), "3*(z - 2.5)");
    }

    #[test]
    fn test_equality_by_value() {
        let a = Transformation::default().with_function(Transform::Power(2.0));
        let b = Transformation::default().with_function(Transform::Power(2.0));
        assert_eq!(a, b);
        assert_ne!(a, Transformation::default());
        assert!(Transformation::default().is_identity());
    }
}
