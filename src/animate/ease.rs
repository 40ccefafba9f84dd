//! Easing curves. Each maps linear progress `t` in `[0, 1]` to eased progress
//! with `f(0) = 0` and `f(1) = 1`.
//!
//! Wrap one with [`crate::descriptor::Easing::new`] to use it on a descriptor:
//!
//! ```ignore
//! ElementDescriptor::new("rect").ease(Easing::new(ease::cubic_out))
//! ```

pub fn linear(t: f64) -> f64 {
    t
}

/// Symmetric quadratic.
pub fn quad_in_out(t: f64) -> f64 {
    let t = t * 2.0;
    if t <= 1.0 {
        t * t / 2.0
    } else {
        let t = t - 1.0;
        (t * (2.0 - t) + 1.0) / 2.0
    }
}

/// Symmetric cubic. The default easing of [`super::Timeline`].
pub fn cubic_in_out(t: f64) -> f64 {
    let t = t * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

pub fn cubic_out(t: f64) -> f64 {
    let t = t - 1.0;
    t * t * t + 1.0
}
